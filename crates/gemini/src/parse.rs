//! Extracting structured payloads out of model text.
//!
//! The model is instructed to return JSON but regularly wraps it in prose
//! or code fences. We take the span from the first `{` to the last `}`
//! and parse that; anything that fails becomes
//! [`AdapterError::Malformed`] rather than a panic or a silent default.

use listcraft_core::framework::FrameworkAnalysis;
use serde::Deserialize;

use crate::adapter::{AdapterError, ImagePrompt};

/// Slice the first-`{`-to-last-`}` span out of model output.
pub fn extract_json(text: &str) -> Result<&str, AdapterError> {
    let start = text
        .find('{')
        .ok_or_else(|| AdapterError::Malformed("No JSON object found in response".into()))?;
    let end = text
        .rfind('}')
        .ok_or_else(|| AdapterError::Malformed("No JSON object found in response".into()))?;
    if end < start {
        return Err(AdapterError::Malformed(
            "No JSON object found in response".into(),
        ));
    }
    Ok(&text[start..=end])
}

/// Parse the analysis response. Rejects payloads with zero frameworks.
pub fn parse_framework_analysis(text: &str) -> Result<FrameworkAnalysis, AdapterError> {
    let json = extract_json(text)?;
    let analysis: FrameworkAnalysis = serde_json::from_str(json)
        .map_err(|e| AdapterError::Malformed(format!("Unparseable analysis JSON: {e}")))?;
    if analysis.frameworks.is_empty() {
        return Err(AdapterError::Malformed(
            "Analysis response contains no frameworks".into(),
        ));
    }
    Ok(analysis)
}

#[derive(Deserialize)]
struct GenerationPrompts {
    generation_prompts: Vec<ImagePrompt>,
}

/// Parse the prompt-synthesis response. Rejects payloads missing or with
/// an empty `generation_prompts` array.
pub fn parse_image_prompts(text: &str) -> Result<Vec<ImagePrompt>, AdapterError> {
    let json = extract_json(text)?;
    let parsed: GenerationPrompts = serde_json::from_str(json)
        .map_err(|e| AdapterError::Malformed(format!("Unparseable prompts JSON: {e}")))?;
    if parsed.generation_prompts.is_empty() {
        return Err(AdapterError::Malformed(
            "Prompts response contains no generation_prompts".into(),
        ));
    }
    Ok(parsed.generation_prompts)
}
