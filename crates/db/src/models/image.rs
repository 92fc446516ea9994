//! Generated-image entity model and DTOs.

use listcraft_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One render attempt for a `(generation_id, image_type)` slot.
///
/// Attempts are append-only: regeneration inserts a new row with an
/// incremented `version` and a fresh `storage_path`; the row with the
/// highest version is the slot's active state.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GeneratedImage {
    pub id: DbId,
    pub generation_id: DbId,
    pub image_type: String,
    pub storage_path: Option<String>,
    pub prompt_used: Option<String>,
    pub version: i32,
    pub status: String,
    pub error: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for recording a render attempt (successful or failed).
#[derive(Debug, Deserialize)]
pub struct CreateGeneratedImage {
    pub generation_id: DbId,
    pub image_type: String,
    pub storage_path: Option<String>,
    pub prompt_used: Option<String>,
    pub version: i32,
    pub status: String,
    pub error: Option<String>,
}
