//! Credit transaction entity model.

use listcraft_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Immutable ledger entry from the `credit_transactions` table.
///
/// `amount` is signed: debits are negative, credits positive. The signed
/// sum of a user's rows equals `profiles.credits`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CreditTransaction {
    pub id: DbId,
    pub user_id: DbId,
    pub amount: i32,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub description: Option<String>,
    pub generation_id: Option<DbId>,
    pub stripe_payment_id: Option<String>,
    pub created_at: Timestamp,
}
