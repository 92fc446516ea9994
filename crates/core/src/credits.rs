//! Credit accounting rules.
//!
//! One credit buys one rendered image. Balances live on `profiles.credits`
//! and every mutation is mirrored by an immutable `credit_transactions`
//! row; the signed sum of a user's transactions equals their balance.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Cost of rendering one image.
pub const CREDITS_PER_IMAGE: i32 = 1;

/// Starting balance granted to new profiles by the signup trigger.
pub const SIGNUP_BONUS_CREDITS: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Purchase,
    Usage,
    Refund,
    Bonus,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Purchase => "purchase",
            TransactionType::Usage => "usage",
            TransactionType::Refund => "refund",
            TransactionType::Bonus => "bonus",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "purchase" => Ok(TransactionType::Purchase),
            "usage" => Ok(TransactionType::Usage),
            "refund" => Ok(TransactionType::Refund),
            "bonus" => Ok(TransactionType::Bonus),
            other => Err(CoreError::Validation(format!(
                "Invalid transaction type '{other}'"
            ))),
        }
    }
}

/// Validate an amount for a debit or credit operation. Ledger amounts are
/// always supplied positive; the ledger applies the sign.
pub fn validate_amount(amount: i32) -> Result<(), CoreError> {
    if amount <= 0 {
        return Err(CoreError::Validation(format!(
            "Credit amount must be positive, got {amount}"
        )));
    }
    Ok(())
}
