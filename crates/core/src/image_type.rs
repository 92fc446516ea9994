//! The five listing-image slots every generation produces.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One of the five image types in a listing set.
///
/// Each `(generation, image_type)` pair is an independently retriable slot;
/// the set is complete when every slot has a terminal attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ImageType {
    /// Hero shot on white.
    #[serde(rename = "main")]
    Main,
    /// First feature infographic.
    #[serde(rename = "infographic_1")]
    Infographic1,
    /// Second feature infographic.
    #[serde(rename = "infographic_2")]
    Infographic2,
    /// Product in use, in context.
    #[serde(rename = "lifestyle")]
    Lifestyle,
    /// Us-versus-them comparison panel.
    #[serde(rename = "comparison")]
    Comparison,
}

impl ImageType {
    /// All five slots, in listing order.
    pub const ALL: [ImageType; 5] = [
        ImageType::Main,
        ImageType::Infographic1,
        ImageType::Infographic2,
        ImageType::Lifestyle,
        ImageType::Comparison,
    ];

    /// Stable identifier used in storage paths, API payloads, and the
    /// `generated_images.image_type` column.
    pub fn as_str(self) -> &'static str {
        match self {
            ImageType::Main => "main",
            ImageType::Infographic1 => "infographic_1",
            ImageType::Infographic2 => "infographic_2",
            ImageType::Lifestyle => "lifestyle",
            ImageType::Comparison => "comparison",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" => Ok(ImageType::Main),
            "infographic_1" => Ok(ImageType::Infographic1),
            "infographic_2" => Ok(ImageType::Infographic2),
            "lifestyle" => Ok(ImageType::Lifestyle),
            "comparison" => Ok(ImageType::Comparison),
            other => Err(CoreError::Validation(format!(
                "Invalid image type '{other}'. Must be one of: main, infographic_1, \
                 infographic_2, lifestyle, comparison"
            ))),
        }
    }
}
