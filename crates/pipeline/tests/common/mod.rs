//! Shared fixtures: a scriptable fake adapter and seed helpers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use listcraft_core::framework::{
    DesignFramework, FrameworkAnalysis, ImageCopy, PaletteColor, ProductAnalysis, StoryArc,
    Typography, VisualTreatment,
};
use listcraft_core::image_type::ImageType;
use listcraft_db::models::profile::CreateProfile;
use listcraft_db::repositories::ProfileRepo;
use listcraft_gemini::{
    AdapterError, AnalysisAdapter, AnalyzeRequest, ImagePrompt, InlineImage,
    PromptSynthesisRequest, RenderRequest, RenderedImage,
};
use listcraft_pipeline::StartAnalysisInput;
use sqlx::PgPool;
use uuid::Uuid;

pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G'];

pub async fn seed_profile(pool: &PgPool, credits: i32) -> Uuid {
    let profile = ProfileRepo::create(
        pool,
        &CreateProfile {
            id: Uuid::new_v4(),
            email: "seller@example.com".into(),
            full_name: None,
        },
    )
    .await
    .unwrap();
    sqlx::query("UPDATE profiles SET credits = $2 WHERE id = $1")
        .bind(profile.id)
        .bind(credits)
        .execute(pool)
        .await
        .unwrap();
    profile.id
}

pub fn sample_framework(framework_id: &str) -> DesignFramework {
    let roles = ["primary", "secondary", "accent", "text_dark", "text_light"];
    DesignFramework {
        framework_id: framework_id.into(),
        framework_name: "Safe Excellence".into(),
        framework_type: "safe_excellence".into(),
        design_philosophy: "Professional and polished".into(),
        colors: roles
            .iter()
            .map(|role| PaletteColor {
                hex: "#1a6b54".into(),
                name: "Deep Teal".into(),
                role: (*role).into(),
                usage: "Backgrounds".into(),
            })
            .collect(),
        typography: Typography {
            headline_font: "Montserrat".into(),
            headline_weight: "700".into(),
            body_font: "Inter".into(),
        },
        story_arc: StoryArc {
            theme: "Everyday upgrade".into(),
            hook: "Stop scrubbing".into(),
            reveal: "Self-draining design".into(),
            proof: "304 steel".into(),
            dream: "A clear counter".into(),
            close: "Ships assembled".into(),
        },
        image_copy: vec![ImageCopy {
            image_number: 1,
            image_type: "main".into(),
            headline: String::new(),
            subhead: None,
        }],
        brand_voice: "Confident".into(),
        visual_treatment: VisualTreatment {
            lighting_style: "Soft studio".into(),
            background_treatment: "Seamless white".into(),
            mood_keywords: vec!["clean".into()],
        },
        rationale: "Most likely to convert".into(),
    }
}

pub fn sample_analysis() -> FrameworkAnalysis {
    FrameworkAnalysis {
        product_analysis: ProductAnalysis {
            what_i_see: "A stainless steel dish rack".into(),
            visual_characteristics: "Brushed metal, compact".into(),
            product_category: "Kitchen storage".into(),
            natural_mood: "Utilitarian".into(),
            ideal_customer: "Home cooks with small kitchens".into(),
        },
        frameworks: vec![
            sample_framework("framework_1"),
            sample_framework("framework_2"),
        ],
    }
}

pub fn sample_prompts() -> Vec<ImagePrompt> {
    ImageType::ALL
        .iter()
        .enumerate()
        .map(|(i, ty)| ImagePrompt {
            image_type: *ty,
            image_number: (i + 1) as u32,
            prompt: format!("Render the {ty} image on #1a6b54"),
            design_notes: None,
        })
        .collect()
}

pub fn start_input() -> StartAnalysisInput {
    StartAnalysisInput {
        product_title: "Stainless Dish Rack".into(),
        product_description: Some("Self-draining dish rack".into()),
        features: vec!["304 steel".into(), "Self-draining".into()],
        target_audience: Some("Home cooks".into()),
        brand_name: Some("RackCo".into()),
        primary_color: None,
        product_image: InlineImage {
            bytes: PNG_BYTES.to_vec(),
            mime_type: "image/png".into(),
        },
        additional_images: vec![],
        style_reference: None,
        locked_colors: vec![],
    }
}

/// Fake adapter with per-capability failure switches and call counters.
#[derive(Default)]
pub struct FakeAdapter {
    pub fail_analysis: bool,
    pub fail_render: bool,
    pub render_calls: Arc<AtomicUsize>,
    /// Renders that carried a reference image.
    pub reference_renders: Arc<AtomicUsize>,
}

impl FakeAdapter {
    pub fn failing_render() -> Self {
        FakeAdapter {
            fail_render: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl AnalysisAdapter for FakeAdapter {
    async fn analyze_product(
        &self,
        _request: &AnalyzeRequest,
    ) -> Result<FrameworkAnalysis, AdapterError> {
        if self.fail_analysis {
            return Err(AdapterError::Malformed(
                "No JSON object found in response".into(),
            ));
        }
        Ok(sample_analysis())
    }

    async fn synthesize_prompts(
        &self,
        _request: &PromptSynthesisRequest,
    ) -> Result<Vec<ImagePrompt>, AdapterError> {
        Ok(sample_prompts())
    }

    async fn render_image(&self, request: &RenderRequest) -> Result<RenderedImage, AdapterError> {
        self.render_calls.fetch_add(1, Ordering::SeqCst);
        if request.reference_image.is_some() {
            self.reference_renders.fetch_add(1, Ordering::SeqCst);
        }
        if self.fail_render {
            return Err(AdapterError::Http("render timed out".into()));
        }
        Ok(RenderedImage {
            bytes: format!("rendered: {}", request.prompt).into_bytes(),
            mime_type: "image/png".into(),
        })
    }
}
