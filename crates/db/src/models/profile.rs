//! Profile entity model and DTOs.

use listcraft_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full profile row from the `profiles` table.
///
/// Profiles are created by the external signup flow; this core only
/// mutates `credits` (through the ledger) and `stripe_customer_id`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Profile {
    pub id: DbId,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub credits: i32,
    pub stripe_customer_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a profile (used by tests and signup sync).
#[derive(Debug, Deserialize)]
pub struct CreateProfile {
    pub id: DbId,
    pub email: String,
    pub full_name: Option<String>,
}
