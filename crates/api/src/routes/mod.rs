pub mod credits;
pub mod generations;
pub mod health;
pub mod payments;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /generations/analyze                              start analysis (POST)
/// /generations                                      history list (GET)
/// /generations/{id}                                 detail with slots (GET)
/// /generations/{id}/select-framework                select + synthesize prompts (POST)
/// /generations/{id}/images                          generate one slot (POST)
/// /generations/{id}/images/{image_type}/regenerate  new version (POST)
///
/// /credits/packages                                 catalog (GET, public)
/// /credits/balance                                  current balance (GET)
/// /credits/transactions                             ledger history (GET)
///
/// /payments/checkout                                create checkout session (POST)
/// /payments/webhook                                 Stripe webhook (POST, signature auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Generation pipeline: analysis, selection, rendering.
        .nest("/generations", generations::router())
        // Credit balance, packages, and transaction history.
        .nest("/credits", credits::router())
        // Stripe checkout and webhook.
        .nest("/payments", payments::router())
}
