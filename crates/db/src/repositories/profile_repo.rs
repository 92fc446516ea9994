//! Repository for the `profiles` table.

use listcraft_core::types::DbId;
use sqlx::PgPool;

use crate::models::profile::{CreateProfile, Profile};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, full_name, avatar_url, credits, stripe_customer_id, \
    created_at, updated_at";

/// Provides read access to profiles plus the two writes this core owns.
///
/// Balance mutations go through
/// [`CreditLedgerRepo`](crate::repositories::CreditLedgerRepo), never here.
pub struct ProfileRepo;

impl ProfileRepo {
    /// Insert a new profile, returning the created row. The `credits`
    /// column takes its signup-bonus default from the schema.
    pub async fn create(pool: &PgPool, input: &CreateProfile) -> Result<Profile, sqlx::Error> {
        let query = format!(
            "INSERT INTO profiles (id, email, full_name)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(input.id)
            .bind(&input.email)
            .bind(&input.full_name)
            .fetch_one(pool)
            .await
    }

    /// Find a profile by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Store the Stripe customer id minted for this profile. Returns `true`
    /// if the row was updated.
    pub async fn set_stripe_customer_id(
        pool: &PgPool,
        id: DbId,
        customer_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE profiles SET stripe_customer_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(customer_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
