//! Domain types and rules shared across the Listcraft workspace.
//!
//! This crate is I/O-free: the generation state machine, the design
//! framework model, the credit rules, and the error taxonomy live here so
//! the persistence, adapter, and HTTP layers all agree on the same
//! vocabulary.

pub mod credits;
pub mod error;
pub mod framework;
pub mod generation;
pub mod image_type;
pub mod types;
