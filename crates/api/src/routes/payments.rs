use axum::routing::post;
use axum::Router;

use crate::handlers::payments;
use crate::state::AppState;

/// Mount payment routes (nested under `/payments`).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(payments::create_checkout))
        .route("/webhook", post(payments::stripe_webhook))
}
