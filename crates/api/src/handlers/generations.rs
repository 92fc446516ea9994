//! Generation lifecycle handlers: analysis, selection, rendering.

use axum::extract::{Path, State};
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use listcraft_core::framework::{DesignFramework, ProductAnalysis};
use listcraft_core::types::{DbId, Timestamp};
use listcraft_db::models::generation::Generation;
use listcraft_db::repositories::GenerationRepo;
use listcraft_gemini::{ImagePrompt, InlineImage};
use listcraft_pipeline::{RenderOutcome, StartAnalysisInput};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response shapes
// ---------------------------------------------------------------------------

/// Base64-encoded image in a request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    /// Base64-encoded bytes (no data-URL prefix).
    pub data: String,
    pub mime_type: String,
}

impl ImagePayload {
    fn decode(&self) -> Result<InlineImage, AppError> {
        let bytes = BASE64
            .decode(&self.data)
            .map_err(|e| AppError::BadRequest(format!("Invalid base64 image data: {e}")))?;
        Ok(InlineImage {
            bytes,
            mime_type: self.mime_type.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeBody {
    pub product_name: String,
    #[serde(default)]
    pub product_description: Option<String>,
    #[serde(default)]
    pub brand_name: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub target_audience: Option<String>,
    #[serde(default)]
    pub primary_color: Option<String>,
    pub product_image: ImagePayload,
    #[serde(default)]
    pub additional_images: Vec<ImagePayload>,
    #[serde(default)]
    pub style_reference: Option<ImagePayload>,
    #[serde(default)]
    pub locked_colors: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub generation_id: DbId,
    pub product_analysis: ProductAnalysis,
    pub frameworks: Vec<DesignFramework>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectFrameworkBody {
    pub framework_id: String,
    #[serde(default)]
    pub global_note: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectFrameworkResponse {
    pub generation_id: DbId,
    pub status: String,
    pub prompts: Vec<ImagePrompt>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageBody {
    pub image_type: String,
    /// Overrides the slot's synthesized prompt when present.
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub reference_image: Option<ImagePayload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateBody {
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImageResponse {
    pub image_id: DbId,
    pub image_type: String,
    pub version: i32,
    pub storage_path: String,
    pub image_url: String,
    pub credits_used: i32,
}

impl From<RenderOutcome> for GeneratedImageResponse {
    fn from(outcome: RenderOutcome) -> Self {
        GeneratedImageResponse {
            image_id: outcome.image.id,
            image_type: outcome.image.image_type,
            version: outcome.image.version,
            storage_path: outcome.image.storage_path.unwrap_or_default(),
            image_url: outcome.image_url,
            credits_used: outcome.credits_used,
        }
    }
}

/// One row in the generation history list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSummary {
    pub id: DbId,
    pub product_title: String,
    pub status: String,
    pub credits_used: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Generation> for GenerationSummary {
    fn from(g: Generation) -> Self {
        GenerationSummary {
            id: g.id,
            product_title: g.product_title,
            status: g.status,
            credits_used: g.credits_used,
            created_at: g.created_at,
            updated_at: g.updated_at,
        }
    }
}

/// The latest attempt for one image slot, with a download URL when the
/// attempt rendered.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    pub image_id: DbId,
    pub image_type: String,
    pub version: i32,
    pub status: String,
    pub error: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationDetail {
    #[serde(flatten)]
    pub summary: GenerationSummary,
    pub selected_framework: Option<serde_json::Value>,
    pub images: Vec<SlotView>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/generations/analyze
pub async fn analyze(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<AnalyzeBody>,
) -> AppResult<Json<DataResponse<AnalyzeResponse>>> {
    let product_image = body.product_image.decode()?;
    let additional_images = body
        .additional_images
        .iter()
        .map(ImagePayload::decode)
        .collect::<Result<Vec<_>, _>>()?;
    let style_reference = body
        .style_reference
        .as_ref()
        .map(ImagePayload::decode)
        .transpose()?;

    let outcome = state
        .pipeline
        .start_analysis(
            user.user_id,
            StartAnalysisInput {
                product_title: body.product_name,
                product_description: body.product_description,
                features: body.features,
                target_audience: body.target_audience,
                brand_name: body.brand_name,
                primary_color: body.primary_color,
                product_image,
                additional_images,
                style_reference,
                locked_colors: body.locked_colors,
            },
        )
        .await?;

    Ok(Json(DataResponse {
        data: AnalyzeResponse {
            generation_id: outcome.generation.id,
            product_analysis: outcome.analysis.product_analysis,
            frameworks: outcome.analysis.frameworks,
        },
    }))
}

/// GET /api/v1/generations
pub async fn list_generations(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<GenerationSummary>>>> {
    let generations = GenerationRepo::list_by_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse {
        data: generations.into_iter().map(GenerationSummary::from).collect(),
    }))
}

/// GET /api/v1/generations/{id}
pub async fn get_generation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<GenerationDetail>>> {
    let generation = GenerationRepo::find_owned(&state.pool, id, user.user_id)
        .await?
        .ok_or(listcraft_core::error::CoreError::NotFound {
            entity: "generation",
            id,
        })?;

    let images = state
        .pipeline
        .slot_summaries(id)
        .await?
        .into_iter()
        .map(|(image, url)| SlotView {
            image_id: image.id,
            image_type: image.image_type,
            version: image.version,
            status: image.status,
            error: image.error,
            image_url: url,
        })
        .collect();

    Ok(Json(DataResponse {
        data: GenerationDetail {
            selected_framework: generation.selected_framework.clone(),
            summary: GenerationSummary::from(generation),
            images,
        },
    }))
}

/// POST /api/v1/generations/{id}/select-framework
pub async fn select_framework(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(body): Json<SelectFrameworkBody>,
) -> AppResult<Json<DataResponse<SelectFrameworkResponse>>> {
    let outcome = state
        .pipeline
        .select_framework(user.user_id, id, &body.framework_id, body.global_note)
        .await?;

    Ok(Json(DataResponse {
        data: SelectFrameworkResponse {
            generation_id: outcome.generation.id,
            status: outcome.generation.status,
            prompts: outcome.prompts,
        },
    }))
}

/// POST /api/v1/generations/{id}/images
pub async fn generate_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(body): Json<GenerateImageBody>,
) -> AppResult<Json<DataResponse<GeneratedImageResponse>>> {
    let image_type = body.image_type.parse()?;
    let reference_image = body
        .reference_image
        .as_ref()
        .map(ImagePayload::decode)
        .transpose()?;
    let outcome = state
        .pipeline
        .generate_one(user.user_id, id, image_type, body.prompt, reference_image)
        .await?;
    Ok(Json(DataResponse {
        data: outcome.into(),
    }))
}

/// POST /api/v1/generations/{id}/images/{image_type}/regenerate
pub async fn regenerate_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, image_type)): Path<(DbId, String)>,
    body: Option<Json<RegenerateBody>>,
) -> AppResult<Json<DataResponse<GeneratedImageResponse>>> {
    let image_type = image_type.parse()?;
    let note = body.and_then(|Json(b)| b.note);
    let outcome = state
        .pipeline
        .regenerate(user.user_id, id, image_type, note.as_deref())
        .await?;
    Ok(Json(DataResponse {
        data: outcome.into(),
    }))
}
