//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts
//! - Update DTOs scoped to one mutation each (no catch-all patches)

pub mod credit;
pub mod generation;
pub mod image;
pub mod profile;
