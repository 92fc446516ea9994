//! Repository for the `generated_images` table.

use listcraft_core::types::DbId;
use sqlx::PgPool;

use crate::models::image::{CreateGeneratedImage, GeneratedImage};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, generation_id, image_type, storage_path, prompt_used, version, status, error, created_at";

/// Provides persistence for render attempts.
pub struct GeneratedImageRepo;

impl GeneratedImageRepo {
    /// Record a render attempt, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateGeneratedImage,
    ) -> Result<GeneratedImage, sqlx::Error> {
        let query = format!(
            "INSERT INTO generated_images
                 (generation_id, image_type, storage_path, prompt_used, version, status, error)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GeneratedImage>(&query)
            .bind(input.generation_id)
            .bind(&input.image_type)
            .bind(&input.storage_path)
            .bind(&input.prompt_used)
            .bind(input.version)
            .bind(&input.status)
            .bind(&input.error)
            .fetch_one(pool)
            .await
    }

    /// The latest attempt for one slot, if any.
    pub async fn latest_for_slot(
        pool: &PgPool,
        generation_id: DbId,
        image_type: &str,
    ) -> Result<Option<GeneratedImage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM generated_images
             WHERE generation_id = $1 AND image_type = $2
             ORDER BY version DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, GeneratedImage>(&query)
            .bind(generation_id)
            .bind(image_type)
            .fetch_optional(pool)
            .await
    }

    /// The latest attempt per image type for a generation. Drives both slot
    /// display and the all-slots-terminal completion check.
    pub async fn latest_per_type(
        pool: &PgPool,
        generation_id: DbId,
    ) -> Result<Vec<GeneratedImage>, sqlx::Error> {
        let query = format!(
            "SELECT DISTINCT ON (image_type) {COLUMNS}
             FROM generated_images
             WHERE generation_id = $1
             ORDER BY image_type, version DESC"
        );
        sqlx::query_as::<_, GeneratedImage>(&query)
            .bind(generation_id)
            .fetch_all(pool)
            .await
    }

    /// Full attempt history for a generation, oldest first.
    pub async fn list_by_generation(
        pool: &PgPool,
        generation_id: DbId,
    ) -> Result<Vec<GeneratedImage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM generated_images
             WHERE generation_id = $1
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, GeneratedImage>(&query)
            .bind(generation_id)
            .fetch_all(pool)
            .await
    }
}
