//! The credit ledger: the only code path that mutates a balance.
//!
//! Every mutation updates `profiles.credits` and appends an immutable
//! `credit_transactions` row inside one database transaction, so the
//! cached balance and the transaction log can never diverge. Debits are a
//! single atomic check-and-decrement (no read-then-write pair); credits
//! carrying an external payment id are exactly-once, arbitrated by the
//! partial unique index on `stripe_payment_id`.

use listcraft_core::credits::TransactionType;
use listcraft_core::types::DbId;
use sqlx::PgPool;

use crate::models::credit::CreditTransaction;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, amount, type, description, generation_id, \
    stripe_payment_id, created_at";

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The balance cannot cover the requested debit. No mutation occurred.
    #[error("Insufficient credits: need {required}, have {available}")]
    InsufficientCredits { required: i32, available: i32 },

    /// Ledger amounts are supplied positive; the ledger applies the sign.
    #[error("Ledger amount must be positive, got {0}")]
    InvalidAmount(i32),

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Result of a credit operation.
#[derive(Debug)]
pub struct CreditOutcome {
    pub transaction: CreditTransaction,
    /// `false` when an idempotency key matched a prior transaction and the
    /// call was a no-op returning that prior row.
    pub applied: bool,
}

/// Provides balance reads and the debit/credit mutations.
pub struct CreditLedgerRepo;

impl CreditLedgerRepo {
    /// Atomically debit `amount` credits from a user.
    ///
    /// The balance check and decrement are one guarded UPDATE; concurrent
    /// debits for the same user are linearized by the row lock, so the sum
    /// of successful debits never exceeds the balance and the CHECK
    /// constraint never fires. When `generation_id` is supplied the
    /// transaction is tagged with it and the generation's `credits_used`
    /// counter advances in the same database transaction.
    pub async fn debit(
        pool: &PgPool,
        user_id: DbId,
        amount: i32,
        description: &str,
        generation_id: Option<DbId>,
    ) -> Result<CreditTransaction, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let mut tx = pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE profiles SET credits = credits - $2, updated_at = NOW()
             WHERE id = $1 AND credits >= $2",
        )
        .bind(user_id)
        .bind(amount)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            let available: Option<(i32,)> =
                sqlx::query_as("SELECT credits FROM profiles WHERE id = $1")
                    .bind(user_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            return match available {
                Some((available,)) => Err(LedgerError::InsufficientCredits {
                    required: amount,
                    available,
                }),
                None => Err(LedgerError::Db(sqlx::Error::RowNotFound)),
            };
        }

        let query = format!(
            "INSERT INTO credit_transactions (user_id, amount, type, description, generation_id)
             VALUES ($1, $2, 'usage', $3, $4)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, CreditTransaction>(&query)
            .bind(user_id)
            .bind(-amount)
            .bind(description)
            .bind(generation_id)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(generation_id) = generation_id {
            sqlx::query(
                "UPDATE generations SET credits_used = credits_used + $2, updated_at = NOW()
                 WHERE id = $1",
            )
            .bind(generation_id)
            .bind(amount)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(row)
    }

    /// Grant `amount` credits to a user.
    ///
    /// When `stripe_payment_id` is supplied the operation is idempotent:
    /// a transaction already carrying that id short-circuits to the prior
    /// row with `applied = false`. The ledger row is inserted before the
    /// balance update so that under a redelivery race the unique index
    /// aborts the losing transaction before it touches the balance.
    pub async fn credit(
        pool: &PgPool,
        user_id: DbId,
        amount: i32,
        transaction_type: TransactionType,
        stripe_payment_id: Option<&str>,
        description: Option<&str>,
    ) -> Result<CreditOutcome, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }

        if let Some(payment_id) = stripe_payment_id {
            if let Some(existing) = Self::find_by_payment_id(pool, payment_id).await? {
                return Ok(CreditOutcome {
                    transaction: existing,
                    applied: false,
                });
            }
        }

        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO credit_transactions
                 (user_id, amount, type, description, stripe_payment_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, CreditTransaction>(&query)
            .bind(user_id)
            .bind(amount)
            .bind(transaction_type.as_str())
            .bind(description)
            .bind(stripe_payment_id)
            .fetch_one(&mut *tx)
            .await;

        let row = match inserted {
            Ok(row) => row,
            Err(err) if is_payment_id_conflict(&err) => {
                // Lost the redelivery race: the other delivery's row is the
                // canonical one.
                drop(tx);
                let payment_id = stripe_payment_id.unwrap_or_default();
                let existing = Self::find_by_payment_id(pool, payment_id)
                    .await?
                    .ok_or(sqlx::Error::RowNotFound)?;
                return Ok(CreditOutcome {
                    transaction: existing,
                    applied: false,
                });
            }
            Err(err) => return Err(err.into()),
        };

        sqlx::query(
            "UPDATE profiles SET credits = credits + $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .bind(amount)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(CreditOutcome {
            transaction: row,
            applied: true,
        })
    }

    /// Current balance, or `None` for an unknown user.
    pub async fn balance(pool: &PgPool, user_id: DbId) -> Result<Option<i32>, sqlx::Error> {
        let row: Option<(i32,)> = sqlx::query_as("SELECT credits FROM profiles WHERE id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(|(credits,)| credits))
    }

    /// All transactions for a user, most recent first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<CreditTransaction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM credit_transactions
             WHERE user_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, CreditTransaction>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Signed sum of a user's transactions. Reconciliation helper: this
    /// equals the cached balance minus the schema-default signup bonus,
    /// which has no ledger row.
    pub async fn transaction_sum(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(amount), 0) FROM credit_transactions WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Find the transaction recorded for an external payment id, if any.
    pub async fn find_by_payment_id(
        pool: &PgPool,
        payment_id: &str,
    ) -> Result<Option<CreditTransaction>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM credit_transactions WHERE stripe_payment_id = $1");
        sqlx::query_as::<_, CreditTransaction>(&query)
            .bind(payment_id)
            .fetch_optional(pool)
            .await
    }
}

/// PostgreSQL unique violation (23505) on the payment-id index.
fn is_payment_id_conflict(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some("23505")
                && db_err.constraint() == Some("uq_credit_transactions_stripe_payment_id")
        }
        _ => false,
    }
}
