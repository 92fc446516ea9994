use std::sync::Arc;

use listcraft_payments::StripeClient;
use listcraft_pipeline::Pipeline;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already
/// `Clone`). All external clients are constructed in `main.rs` and
/// injected here; nothing below this crate reaches for globals.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: listcraft_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Generation pipeline orchestrator.
    pub pipeline: Arc<Pipeline>,
    /// Stripe REST client for checkout and webhook verification.
    pub stripe: Arc<StripeClient>,
}
