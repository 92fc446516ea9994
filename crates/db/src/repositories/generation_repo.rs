//! Repository for the `generations` table.
//!
//! Status transitions are guarded in SQL (`WHERE status = <expected>`), so
//! a stale or duplicate stage call observes zero rows affected instead of
//! regressing the state machine.

use listcraft_core::types::DbId;
use sqlx::PgPool;

use crate::models::generation::{CreateGeneration, Generation};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, product_title, product_description, features, \
    target_audience, brand_name, status, framework_data, selected_framework, \
    image_prompts, color_mode, locked_colors, style_reference_path, global_note, \
    credits_used, created_at, updated_at";

/// Provides persistence for generations and their stage transitions.
pub struct GenerationRepo;

impl GenerationRepo {
    /// Insert a new generation in `analyzing` status with its framework
    /// candidates attached, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateGeneration,
    ) -> Result<Generation, sqlx::Error> {
        let query = format!(
            "INSERT INTO generations
                 (user_id, product_title, product_description, features, target_audience,
                  brand_name, status, framework_data, color_mode, locked_colors,
                  style_reference_path)
             VALUES ($1, $2, $3, $4, $5, $6, 'analyzing', $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Generation>(&query)
            .bind(input.user_id)
            .bind(&input.product_title)
            .bind(&input.product_description)
            .bind(&input.features)
            .bind(&input.target_audience)
            .bind(&input.brand_name)
            .bind(&input.framework_data)
            .bind(&input.color_mode)
            .bind(&input.locked_colors)
            .bind(&input.style_reference_path)
            .fetch_one(pool)
            .await
    }

    /// Find a generation by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Generation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM generations WHERE id = $1");
        sqlx::query_as::<_, Generation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a generation only if it belongs to `user_id`. The ownership
    /// check lives in the query so handlers cannot forget it.
    pub async fn find_owned(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Generation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM generations WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Generation>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's generations, most recent first.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Generation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM generations WHERE user_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Generation>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Record the chosen framework and its synthesized prompts, advancing
    /// `analyzing -> generating`.
    ///
    /// Guarded: returns `None` if the generation is not in `analyzing`
    /// (framework already selected, or generation failed), leaving state
    /// untouched.
    pub async fn select_framework(
        pool: &PgPool,
        id: DbId,
        selected_framework: &serde_json::Value,
        image_prompts: &serde_json::Value,
        global_note: Option<&str>,
    ) -> Result<Option<Generation>, sqlx::Error> {
        let query = format!(
            "UPDATE generations SET
                selected_framework = $2,
                image_prompts = $3,
                global_note = $4,
                status = 'generating',
                updated_at = NOW()
             WHERE id = $1 AND status = 'analyzing'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Generation>(&query)
            .bind(id)
            .bind(selected_framework)
            .bind(image_prompts)
            .bind(global_note)
            .fetch_optional(pool)
            .await
    }

    /// Advance `generating -> completed`. Returns `true` if the row moved;
    /// idempotent under repeated completion checks.
    pub async fn mark_completed(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE generations SET status = 'completed', updated_at = NOW()
             WHERE id = $1 AND status = 'generating'",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a generation `failed`. Only non-terminal rows move; per-image
    /// failures never route through here.
    pub async fn mark_failed(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE generations SET status = 'failed', updated_at = NOW()
             WHERE id = $1 AND status IN ('pending', 'analyzing', 'generating')",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
