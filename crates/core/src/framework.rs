//! The design framework model: structured proposals the analysis adapter
//! produces and the user picks from.
//!
//! Frameworks are immutable once produced. The shapes here mirror the
//! schema the adapter is instructed to emit, so a framework that survives
//! deserialization is structurally sound; [`validate_framework`] adds the
//! palette checks deserialization cannot express.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// What the vision model saw in the product image(s).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductAnalysis {
    pub what_i_see: String,
    pub visual_characteristics: String,
    pub product_category: String,
    pub natural_mood: String,
    pub ideal_customer: String,
}

/// One entry of the five-color palette.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteColor {
    /// `#rrggbb` hex code.
    pub hex: String,
    pub name: String,
    /// Role in the 60/30/10 system: primary, secondary, accent,
    /// text_dark, or text_light.
    pub role: String,
    pub usage: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Typography {
    pub headline_font: String,
    pub headline_weight: String,
    pub body_font: String,
}

/// Narrative beats, one per image slot, plus the connecting theme.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryArc {
    pub theme: String,
    pub hook: String,
    pub reveal: String,
    pub proof: String,
    pub dream: String,
    pub close: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageCopy {
    pub image_number: u32,
    pub image_type: String,
    pub headline: String,
    #[serde(default)]
    pub subhead: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualTreatment {
    pub lighting_style: String,
    pub background_treatment: String,
    pub mood_keywords: Vec<String>,
}

/// A complete design proposal. One of the candidates returned by analysis
/// becomes the generation's selected framework.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignFramework {
    pub framework_id: String,
    pub framework_name: String,
    pub framework_type: String,
    pub design_philosophy: String,
    pub colors: Vec<PaletteColor>,
    pub typography: Typography,
    pub story_arc: StoryArc,
    pub image_copy: Vec<ImageCopy>,
    pub brand_voice: String,
    pub visual_treatment: VisualTreatment,
    pub rationale: String,
}

/// Analysis output: the product read plus candidate frameworks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameworkAnalysis {
    pub product_analysis: ProductAnalysis,
    pub frameworks: Vec<DesignFramework>,
}

/// Number of palette entries every framework carries.
pub const PALETTE_SIZE: usize = 5;

/// Check a `#rrggbb` hex color code.
pub fn is_hex_color(s: &str) -> bool {
    let Some(digits) = s.strip_prefix('#') else {
        return false;
    };
    digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Validate a framework beyond its serde shape: a full five-entry palette
/// with well-formed hex codes.
pub fn validate_framework(framework: &DesignFramework) -> Result<(), CoreError> {
    if framework.colors.len() != PALETTE_SIZE {
        return Err(CoreError::Validation(format!(
            "Framework '{}' has {} palette colors, expected {PALETTE_SIZE}",
            framework.framework_name,
            framework.colors.len()
        )));
    }
    for color in &framework.colors {
        if !is_hex_color(&color.hex) {
            return Err(CoreError::Validation(format!(
                "Framework '{}' palette color '{}' has invalid hex code '{}'",
                framework.framework_name, color.name, color.hex
            )));
        }
    }
    Ok(())
}
