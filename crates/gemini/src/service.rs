//! Production [`AnalysisAdapter`] over the Gemini API.

use std::collections::HashMap;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use listcraft_core::framework::FrameworkAnalysis;

use crate::adapter::{
    AdapterError, AnalysisAdapter, AnalyzeRequest, ImagePrompt, InlineImage,
    PromptSynthesisRequest, RenderRequest, RenderedImage,
};
use crate::api::{Content, GenerateContentRequest, GenerationConfig, Part};
use crate::client::GeminiClient;
use crate::parse::{parse_framework_analysis, parse_image_prompts};
use crate::prompts::{
    fill_template, FRAMEWORK_ANALYSIS_PROMPT, IMAGE_PROMPTS_GENERATION, STYLE_REFERENCE_PROMPT,
};

/// Calls the Gemini `generateContent` endpoint for all three adapter
/// capabilities. Stateless apart from the shared HTTP client.
pub struct GeminiService {
    client: GeminiClient,
}

impl GeminiService {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }

    fn image_part(image: &InlineImage) -> Part {
        Part::inline_data(image.mime_type.clone(), BASE64.encode(&image.bytes))
    }

    /// With a style reference the model gets a different prompt: an
    /// inventory of the attached images plus either a locked palette or
    /// an instruction to extract one from the reference.
    fn analysis_prompt(request: &AnalyzeRequest) -> String {
        let features = if request.features.is_empty() {
            "Not specified".to_string()
        } else {
            request.features.join(", ")
        };
        let brand_name = request
            .brand_name
            .clone()
            .unwrap_or_else(|| "Not specified".into());
        let target_audience = request
            .target_audience
            .clone()
            .unwrap_or_else(|| "General consumers".into());

        if request.style_reference.is_some() {
            let image_count = 1 + request.additional_images.len() + 1;
            let mut inventory = format!(
                "=== IMAGE INVENTORY ===\nI'm showing you {image_count} image(s):\n\
                 - Image 1: PRIMARY PRODUCT IMAGE\n"
            );
            for i in 0..request.additional_images.len() {
                inventory.push_str(&format!("- Image {}: ADDITIONAL PRODUCT IMAGE\n", i + 2));
            }
            inventory.push_str(&format!(
                "- Image {image_count}: STYLE REFERENCE IMAGE - the EXACT visual style to follow\n"
            ));

            let color_mode = if request.locked_colors.is_empty() {
                "EXTRACT COLORS: Study the style reference and extract its color palette."
                    .to_string()
            } else {
                format!(
                    "LOCKED PALETTE MODE: Use EXACTLY these colors: {}",
                    request.locked_colors.join(", ")
                )
            };

            let vars = HashMap::from([
                ("image_inventory", inventory),
                ("product_name", request.product_name.clone()),
                ("brand_name", brand_name),
                ("features", features),
                ("target_audience", target_audience),
                ("color_mode_instructions", color_mode),
            ]);
            fill_template(STYLE_REFERENCE_PROMPT, &vars)
        } else {
            let primary_color = request
                .primary_color
                .clone()
                .unwrap_or_else(|| "AI to determine based on product image".into());
            let vars = HashMap::from([
                ("product_name", request.product_name.clone()),
                ("brand_name", brand_name),
                ("features", features),
                ("target_audience", target_audience),
                ("primary_color", primary_color),
            ]);
            fill_template(FRAMEWORK_ANALYSIS_PROMPT, &vars)
        }
    }
}

#[async_trait]
impl AnalysisAdapter for GeminiService {
    async fn analyze_product(
        &self,
        request: &AnalyzeRequest,
    ) -> Result<FrameworkAnalysis, AdapterError> {
        let mut parts = vec![
            Part::text(Self::analysis_prompt(request)),
            Self::image_part(&request.product_image),
        ];
        for image in &request.additional_images {
            parts.push(Self::image_part(image));
        }
        // The prompt's image inventory numbers the style reference last.
        if let Some(reference) = &request.style_reference {
            parts.push(Self::image_part(reference));
        }

        let api_request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".into()),
                parts,
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(0.8),
                max_output_tokens: Some(8000),
            }),
        };

        let response = self
            .client
            .generate_content(&self.client.config().text_model, &api_request)
            .await?;
        let analysis = parse_framework_analysis(&response.text())?;
        tracing::info!(
            frameworks = analysis.frameworks.len(),
            product_name = %request.product_name,
            "Product analysis complete"
        );
        Ok(analysis)
    }

    async fn synthesize_prompts(
        &self,
        request: &PromptSynthesisRequest,
    ) -> Result<Vec<ImagePrompt>, AdapterError> {
        let framework_json = serde_json::to_string_pretty(&request.framework)
            .map_err(|e| AdapterError::Malformed(format!("Unserializable framework: {e}")))?;
        let features = if request.features.is_empty() {
            "Not specified".to_string()
        } else {
            request.features.join(", ")
        };
        let vars = HashMap::from([
            ("framework_json", framework_json),
            ("product_name", request.product_name.clone()),
            ("features", features),
        ]);
        let mut prompt = fill_template(IMAGE_PROMPTS_GENERATION, &vars);
        if let Some(note) = &request.global_note {
            prompt.push_str(&format!(
                "\n\nUSER'S ADDITIONAL INSTRUCTIONS (apply to ALL images):\n{note}"
            ));
        }

        let api_request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".into()),
                parts: vec![Part::text(prompt)],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(0.7),
                max_output_tokens: Some(8000),
            }),
        };

        let response = self
            .client
            .generate_content(&self.client.config().text_model, &api_request)
            .await?;
        parse_image_prompts(&response.text())
    }

    async fn render_image(&self, request: &RenderRequest) -> Result<RenderedImage, AdapterError> {
        let mut parts = vec![Part::text(request.prompt.clone())];
        if let Some(reference) = &request.reference_image {
            parts.push(Self::image_part(reference));
        }

        let api_request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".into()),
                parts,
            }],
            generation_config: None,
        };

        let response = self
            .client
            .generate_content(&self.client.config().image_model, &api_request)
            .await?;

        let inline = response.first_inline_data().ok_or_else(|| {
            AdapterError::Malformed("No image data in generation response".into())
        })?;
        let bytes = BASE64
            .decode(&inline.data)
            .map_err(|e| AdapterError::Malformed(format!("Invalid base64 image data: {e}")))?;
        Ok(RenderedImage {
            bytes,
            mime_type: inline.mime_type.clone(),
        })
    }
}
