//! Shared test fixtures: app builder with fakes, request helpers, seeds.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use listcraft_api::auth::jwt::{generate_access_token, JwtConfig};
use listcraft_api::config::ServerConfig;
use listcraft_api::router::build_app_router;
use listcraft_api::state::AppState;
use listcraft_core::framework::{
    DesignFramework, FrameworkAnalysis, ImageCopy, PaletteColor, ProductAnalysis, StoryArc,
    Typography, VisualTreatment,
};
use listcraft_core::image_type::ImageType;
use listcraft_db::models::profile::CreateProfile;
use listcraft_db::repositories::ProfileRepo;
use listcraft_gemini::{
    AdapterError, AnalysisAdapter, AnalyzeRequest, ImagePrompt, PromptSynthesisRequest,
    RenderRequest, RenderedImage,
};
use listcraft_payments::{StripeClient, StripeConfig};
use listcraft_pipeline::Pipeline;
use listcraft_storage::MemoryStore;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";
pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        body_limit_bytes: 20 * 1024 * 1024,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// Build the full application router backed by a fake adapter and an
/// in-memory object store, via the same [`build_app_router`] the binary
/// uses so tests exercise the production middleware stack.
pub fn build_test_app(pool: PgPool, adapter: FakeAdapter) -> Router {
    let config = test_config();
    let stripe = StripeClient::new(StripeConfig {
        secret_key: "sk_test_unused".to_string(),
        webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
        app_url: "http://localhost:3000".to_string(),
    });
    let pipeline = Pipeline::new(pool.clone(), Arc::new(adapter), Arc::new(MemoryStore::new()));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        pipeline: Arc::new(pipeline),
        stripe: Arc::new(stripe),
    };

    build_app_router(state, &config)
}

/// Seed a profile with the given balance, returning its id.
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

/// Mint a bearer token for the given user with the test secret.
pub fn token_for(user_id: Uuid) -> String {
    let config = JwtConfig {
        secret: TEST_JWT_SECRET.to_string(),
        access_token_expiry_mins: 60,
    };
    generate_access_token(user_id, "seller@example.com", &config).unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, path: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(path)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn get_auth(app: Router, path: &str, token: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(path)
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json(
    app: Router,
    path: &str,
    token: &str,
    body: &serde_json::Value,
) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(path)
            .header("authorization", format!("Bearer {token}"))
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = http_body_util::BodyExt::collect(response.into_body())
        .await
        .unwrap()
        .to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Flow helpers
// ---------------------------------------------------------------------------

/// A minimal valid analyze request body.
pub fn analyze_body() -> serde_json::Value {
    use base64::Engine;
    let data = base64::engine::general_purpose::STANDARD.encode([0x89u8, b'P', b'N', b'G']);
    serde_json::json!({
        "productName": "Stainless Dish Rack",
        "features": ["304 steel", "Self-draining"],
        "productImage": { "data": data, "mimeType": "image/png" }
    })
}

/// Drive a generation through analysis and framework selection over
/// HTTP, returning its id.
pub async fn analyzed_and_selected(app: &Router, token: &str) -> Uuid {
    let response = post_json(app.clone(), "/api/v1/generations/analyze", token, &analyze_body()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let generation_id: Uuid = json["data"]["generationId"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();

    let response = post_json(
        app.clone(),
        &format!("/api/v1/generations/{generation_id}/select-framework"),
        token,
        &serde_json::json!({ "frameworkId": "framework_1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    generation_id
}

// ---------------------------------------------------------------------------
// Fake adapter
// ---------------------------------------------------------------------------

fn sample_framework(framework_id: &str) -> DesignFramework {
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

/// Fake adapter with per-capability failure switches and call counters.
#[derive(Default)]
pub struct FakeAdapter {
    pub fail_render: bool,
    pub render_calls: Arc<AtomicUsize>,
    /// Renders that carried a reference image.
    pub reference_renders: Arc<AtomicUsize>,
}

#[async_trait]
impl AnalysisAdapter for FakeAdapter {
    async fn analyze_product(
        &self,
        _request: &AnalyzeRequest,
    ) -> Result<FrameworkAnalysis, AdapterError> {
        Ok(FrameworkAnalysis {
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
        })
    }

    async fn synthesize_prompts(
        &self,
        _request: &PromptSynthesisRequest,
    ) -> Result<Vec<ImagePrompt>, AdapterError> {
        Ok(ImageType::ALL
            .iter()
            .enumerate()
            .map(|(i, ty)| ImagePrompt {
                image_type: *ty,
                image_number: (i + 1) as u32,
                prompt: format!("Render the {ty} image on #1a6b54"),
                design_notes: None,
            })
            .collect())
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
