use axum::routing::{get, post};
use axum::Router;

use crate::handlers::generations;
use crate::state::AppState;

/// Mount generation pipeline routes (nested under `/generations`).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/analyze", post(generations::analyze))
        .route("/", get(generations::list_generations))
        .route("/{id}", get(generations::get_generation))
        .route(
            "/{id}/select-framework",
            post(generations::select_framework),
        )
        .route("/{id}/images", post(generations::generate_image))
        .route(
            "/{id}/images/{image_type}/regenerate",
            post(generations::regenerate_image),
        )
}
