//! Credit balance, package catalog, and transaction history handlers.

use axum::extract::State;
use axum::Json;
use listcraft_db::models::credit::CreditTransaction;
use listcraft_db::repositories::CreditLedgerRepo;
use listcraft_payments::{CreditPackage, CREDIT_PACKAGES};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub credits: i32,
}

/// GET /api/v1/credits/packages
///
/// Public catalog; no auth required.
pub async fn list_packages() -> Json<DataResponse<&'static [CreditPackage]>> {
    Json(DataResponse {
        data: &CREDIT_PACKAGES,
    })
}

/// GET /api/v1/credits/balance
pub async fn get_balance(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<BalanceResponse>>> {
    let credits = CreditLedgerRepo::balance(&state.pool, user.user_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;
    Ok(Json(DataResponse {
        data: BalanceResponse { credits },
    }))
}

/// GET /api/v1/credits/transactions
pub async fn list_transactions(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<CreditTransaction>>>> {
    let transactions = CreditLedgerRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: transactions }))
}
