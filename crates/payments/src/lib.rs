//! Payment bridge: credit packages, Stripe checkout, and webhook
//! signature verification.
//!
//! The ledger itself lives in `listcraft-db`; this crate only talks to
//! Stripe and proves that webhook payloads really came from it.

pub mod checkout;
pub mod events;
pub mod packages;
pub mod webhook;

pub use checkout::{CheckoutSession, StripeClient, StripeConfig, StripeError};
pub use events::{CheckoutSessionCompleted, CreditGrant, StripeEvent};
pub use packages::{package_by_id, CreditPackage, CREDIT_PACKAGES};
pub use webhook::{verify_signature, SignatureError, SIGNATURE_TOLERANCE_SECS};
