//! Generation entity model and DTOs.

use listcraft_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full generation row from the `generations` table.
///
/// `framework_data` holds the full analysis result (product analysis plus
/// candidate frameworks); `selected_framework` and `image_prompts` are set
/// when the user picks a framework.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Generation {
    pub id: DbId,
    pub user_id: DbId,
    pub product_title: String,
    pub product_description: Option<String>,
    pub features: Option<Vec<String>>,
    pub target_audience: Option<String>,
    pub brand_name: Option<String>,
    pub status: String,
    pub framework_data: Option<serde_json::Value>,
    pub selected_framework: Option<serde_json::Value>,
    pub image_prompts: Option<serde_json::Value>,
    pub color_mode: Option<String>,
    pub locked_colors: Option<Vec<String>>,
    pub style_reference_path: Option<String>,
    pub global_note: Option<String>,
    pub credits_used: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new generation (created directly in `analyzing`,
/// analysis having already succeeded).
#[derive(Debug, Deserialize)]
pub struct CreateGeneration {
    pub user_id: DbId,
    pub product_title: String,
    pub product_description: Option<String>,
    pub features: Option<Vec<String>>,
    pub target_audience: Option<String>,
    pub brand_name: Option<String>,
    pub framework_data: serde_json::Value,
    pub color_mode: Option<String>,
    pub locked_colors: Option<Vec<String>>,
    pub style_reference_path: Option<String>,
}
