//! The adapter trait and its request/response shapes.

use async_trait::async_trait;
use listcraft_core::framework::{DesignFramework, FrameworkAnalysis};
use listcraft_core::image_type::ImageType;
use serde::{Deserialize, Serialize};

/// One image supplied to or returned by the adapter, as raw bytes. The
/// wire encoding (base64 inline data) is the implementation's concern.
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Inputs for product analysis and framework proposal.
#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub product_image: InlineImage,
    pub product_name: String,
    pub brand_name: Option<String>,
    pub features: Vec<String>,
    pub target_audience: Option<String>,
    pub primary_color: Option<String>,
    pub additional_images: Vec<InlineImage>,
    /// When set, the adapter extracts (or is told) the visual style from
    /// this image and proposes a single matching framework.
    pub style_reference: Option<InlineImage>,
    /// With a style reference: use exactly these colors instead of
    /// extracting a palette from the reference.
    pub locked_colors: Vec<String>,
}

/// Inputs for per-image prompt synthesis from a chosen framework.
#[derive(Debug, Clone)]
pub struct PromptSynthesisRequest {
    pub framework: DesignFramework,
    pub product_name: String,
    pub features: Vec<String>,
    /// Free-text instruction folded into every prompt.
    pub global_note: Option<String>,
}

/// One synthesized generation prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagePrompt {
    pub image_type: ImageType,
    pub image_number: u32,
    pub prompt: String,
    #[serde(default)]
    pub design_notes: Option<String>,
}

/// Inputs for rendering one image.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub prompt: String,
    pub reference_image: Option<InlineImage>,
}

/// One rendered image.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Failures at the adapter boundary. All variants surface to callers as
/// an analysis failure; `Malformed` specifically covers responses the
/// model produced but we could not use.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// Transport-level failure (connect, timeout, non-2xx status).
    #[error("Adapter request failed: {0}")]
    Http(String),

    /// The model responded, but the payload is unusable: no JSON found,
    /// unparseable JSON, zero frameworks, missing prompt entries, or a
    /// response with no image data.
    #[error("Malformed adapter response: {0}")]
    Malformed(String),
}

/// External AI capability boundary: vision analysis, prompt synthesis,
/// and image rendering. Stateless; every call is independent.
#[async_trait]
pub trait AnalysisAdapter: Send + Sync {
    /// Analyze product image(s) and propose candidate design frameworks.
    async fn analyze_product(
        &self,
        request: &AnalyzeRequest,
    ) -> Result<FrameworkAnalysis, AdapterError>;

    /// Synthesize one generation prompt per image type from a framework.
    async fn synthesize_prompts(
        &self,
        request: &PromptSynthesisRequest,
    ) -> Result<Vec<ImagePrompt>, AdapterError>;

    /// Render one image from a prompt (plus optional reference image).
    async fn render_image(&self, request: &RenderRequest) -> Result<RenderedImage, AdapterError>;
}
