//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod credit_ledger_repo;
pub mod generated_image_repo;
pub mod generation_repo;
pub mod profile_repo;

pub use credit_ledger_repo::{CreditLedgerRepo, CreditOutcome, LedgerError};
pub use generated_image_repo::GeneratedImageRepo;
pub use generation_repo::GenerationRepo;
pub use profile_repo::ProfileRepo;
