//! Generation lifecycle: the status machine and artifact naming.
//!
//! A generation moves `pending -> analyzing -> generating -> completed`,
//! with `failed` reachable from `analyzing` or `generating` for failures of
//! the generation-level operation itself. Per-image failures are recorded
//! on the slot and never fail the parent.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::image_type::ImageType;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Generation status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    Pending,
    Analyzing,
    Generating,
    Completed,
    Failed,
}

impl GenerationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GenerationStatus::Pending => "pending",
            GenerationStatus::Analyzing => "analyzing",
            GenerationStatus::Generating => "generating",
            GenerationStatus::Completed => "completed",
            GenerationStatus::Failed => "failed",
        }
    }

    /// Whether this status admits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, GenerationStatus::Completed | GenerationStatus::Failed)
    }

    /// Whether the machine may move from `self` to `next`.
    ///
    /// Forward-only: `pending -> analyzing -> generating -> completed`, and
    /// `failed` from any non-terminal state. No stage may be skipped.
    pub fn can_transition_to(self, next: GenerationStatus) -> bool {
        use GenerationStatus::*;
        matches!(
            (self, next),
            (Pending, Analyzing)
                | (Analyzing, Generating)
                | (Generating, Completed)
                | (Pending, Failed)
                | (Analyzing, Failed)
                | (Generating, Failed)
        )
    }
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(GenerationStatus::Pending),
            "analyzing" => Ok(GenerationStatus::Analyzing),
            "generating" => Ok(GenerationStatus::Generating),
            "completed" => Ok(GenerationStatus::Completed),
            "failed" => Ok(GenerationStatus::Failed),
            other => Err(CoreError::Validation(format!(
                "Invalid generation status '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Per-slot attempt status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSlotStatus {
    Pending,
    Generating,
    Completed,
    Failed,
}

impl ImageSlotStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageSlotStatus::Pending => "pending",
            ImageSlotStatus::Generating => "generating",
            ImageSlotStatus::Completed => "completed",
            ImageSlotStatus::Failed => "failed",
        }
    }

    /// A terminal attempt counts toward set completion whether it rendered
    /// or failed; partial completion is a valid end state for the parent.
    pub fn is_terminal(self) -> bool {
        matches!(self, ImageSlotStatus::Completed | ImageSlotStatus::Failed)
    }
}

impl FromStr for ImageSlotStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ImageSlotStatus::Pending),
            "generating" => Ok(ImageSlotStatus::Generating),
            "completed" => Ok(ImageSlotStatus::Completed),
            "failed" => Ok(ImageSlotStatus::Failed),
            other => Err(CoreError::Validation(format!(
                "Invalid image status '{other}'"
            ))),
        }
    }
}

impl fmt::Display for ImageSlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Artifact naming
// ---------------------------------------------------------------------------

/// Object key for a rendered image.
///
/// Versions are append-only: each regeneration writes a new key, so prior
/// binaries are retained and the latest version per slot is authoritative.
pub fn artifact_path(generation_id: DbId, image_type: ImageType, version: i32) -> String {
    format!("{generation_id}/{image_type}_v{version}.png")
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// Validate the inputs required to start analysis.
pub fn validate_analysis_start(product_name: &str, image_len: usize) -> Result<(), CoreError> {
    if product_name.trim().is_empty() {
        return Err(CoreError::Validation(
            "productName must not be empty".to_string(),
        ));
    }
    if image_len == 0 {
        return Err(CoreError::Validation(
            "At least one product image is required".to_string(),
        ));
    }
    Ok(())
}
