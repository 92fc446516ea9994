//! Generation pipeline orchestrator.
//!
//! [`Pipeline`] sequences the durable store, the analysis adapter, and
//! the object store for the four listing-image operations: analysis,
//! framework selection, per-image generation, and regeneration. All
//! business rules (ownership, credit gating, status transitions,
//! completion detection) live here; the HTTP layer only translates.

pub mod error;
pub mod pipeline;

pub use pipeline::{
    AnalysisOutcome, Pipeline, RenderOutcome, SelectOutcome, StartAnalysisInput,
};
