//! Mapping component errors into the core taxonomy.
//!
//! Free functions rather than `From` impls: both sides of each
//! conversion live in other crates.

use listcraft_core::error::CoreError;
use listcraft_gemini::AdapterError;
use listcraft_storage::StorageError;

/// Repository failures inside the pipeline are persistence failures; the
/// not-found, conflict, and insufficient-credit cases are handled
/// explicitly before this point.
pub fn from_db(err: sqlx::Error) -> CoreError {
    CoreError::Persistence(err.to_string())
}

pub fn from_adapter(err: AdapterError) -> CoreError {
    CoreError::Analysis(err.to_string())
}

pub fn from_storage(err: StorageError) -> CoreError {
    CoreError::Persistence(err.to_string())
}
