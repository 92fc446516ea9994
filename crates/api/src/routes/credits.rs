use axum::routing::get;
use axum::Router;

use crate::handlers::credits;
use crate::state::AppState;

/// Mount credit routes (nested under `/credits`).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/packages", get(credits::list_packages))
        .route("/balance", get(credits::get_balance))
        .route("/transactions", get(credits::list_transactions))
}
