//! The orchestrator itself.

use std::sync::Arc;

use listcraft_core::credits::CREDITS_PER_IMAGE;
use listcraft_core::error::CoreError;
use listcraft_core::framework::{validate_framework, DesignFramework, FrameworkAnalysis};
use listcraft_core::generation::{
    artifact_path, validate_analysis_start, GenerationStatus, ImageSlotStatus,
};
use listcraft_core::image_type::ImageType;
use listcraft_core::types::DbId;
use listcraft_db::models::generation::{CreateGeneration, Generation};
use listcraft_db::models::image::{CreateGeneratedImage, GeneratedImage};
use listcraft_db::repositories::{CreditLedgerRepo, GeneratedImageRepo, GenerationRepo};
use listcraft_gemini::{
    AnalysisAdapter, AnalyzeRequest, ImagePrompt, InlineImage, PromptSynthesisRequest,
    RenderRequest,
};
use listcraft_storage::{
    ObjectStore, GENERATED_BUCKET, SIGNED_URL_TTL_SECS, STYLE_REFERENCES_BUCKET,
};
use sqlx::PgPool;

use crate::error::{from_adapter, from_db, from_storage};

/// Inputs for starting a new generation.
#[derive(Debug)]
pub struct StartAnalysisInput {
    pub product_title: String,
    pub product_description: Option<String>,
    pub features: Vec<String>,
    pub target_audience: Option<String>,
    pub brand_name: Option<String>,
    pub primary_color: Option<String>,
    pub product_image: InlineImage,
    pub additional_images: Vec<InlineImage>,
    pub style_reference: Option<InlineImage>,
    pub locked_colors: Vec<String>,
}

#[derive(Debug)]
pub struct AnalysisOutcome {
    pub generation: Generation,
    pub analysis: FrameworkAnalysis,
}

#[derive(Debug)]
pub struct SelectOutcome {
    pub generation: Generation,
    pub prompts: Vec<ImagePrompt>,
}

#[derive(Debug)]
pub struct RenderOutcome {
    pub image: GeneratedImage,
    /// Time-limited download URL for the rendered binary.
    pub image_url: String,
    pub credits_used: i32,
}

/// Sequences analysis, selection, and rendering across the durable
/// store, the adapter, and the object store.
pub struct Pipeline {
    pool: PgPool,
    adapter: Arc<dyn AnalysisAdapter>,
    store: Arc<dyn ObjectStore>,
}

impl Pipeline {
    pub fn new(pool: PgPool, adapter: Arc<dyn AnalysisAdapter>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            pool,
            adapter,
            store,
        }
    }

    /// Analyze the product image(s) and persist a new generation holding
    /// the candidate frameworks.
    ///
    /// Validation and analysis failures leave no record behind; the row
    /// is only inserted once the adapter has produced usable frameworks.
    pub async fn start_analysis(
        &self,
        user_id: DbId,
        input: StartAnalysisInput,
    ) -> Result<AnalysisOutcome, CoreError> {
        let image_count = usize::from(!input.product_image.bytes.is_empty());
        validate_analysis_start(&input.product_title, image_count)?;

        let analysis = self
            .adapter
            .analyze_product(&AnalyzeRequest {
                product_image: input.product_image,
                product_name: input.product_title.clone(),
                brand_name: input.brand_name.clone(),
                features: input.features.clone(),
                target_audience: input.target_audience.clone(),
                primary_color: input.primary_color.clone(),
                additional_images: input.additional_images,
                style_reference: input.style_reference.clone(),
                locked_colors: input.locked_colors.clone(),
            })
            .await
            .map_err(from_adapter)?;

        for framework in &analysis.frameworks {
            validate_framework(framework).map_err(|e| CoreError::Analysis(e.to_string()))?;
        }

        // Upload the style reference only once the adapter has succeeded,
        // so a failed analysis leaves no orphaned object behind.
        let style_reference_path = match &input.style_reference {
            Some(reference) => {
                let key = format!("{user_id}/{}.png", DbId::new_v4());
                self.store
                    .put(
                        STYLE_REFERENCES_BUCKET,
                        &key,
                        reference.bytes.clone(),
                        &reference.mime_type,
                    )
                    .await
                    .map_err(from_storage)?;
                Some(key)
            }
            None => None,
        };

        let color_mode = if style_reference_path.is_some() {
            if input.locked_colors.is_empty() {
                Some("extract".to_string())
            } else {
                Some("locked".to_string())
            }
        } else {
            None
        };

        let framework_data = serde_json::to_value(&analysis)
            .map_err(|e| CoreError::Internal(format!("Unserializable analysis: {e}")))?;
        let generation = GenerationRepo::create(
            &self.pool,
            &CreateGeneration {
                user_id,
                product_title: input.product_title,
                product_description: input.product_description,
                features: Some(input.features),
                target_audience: input.target_audience,
                brand_name: input.brand_name,
                framework_data,
                color_mode,
                locked_colors: if input.locked_colors.is_empty() {
                    None
                } else {
                    Some(input.locked_colors)
                },
                style_reference_path,
            },
        )
        .await
        .map_err(from_db)?;

        tracing::info!(
            generation_id = %generation.id,
            frameworks = analysis.frameworks.len(),
            "Generation created"
        );
        Ok(AnalysisOutcome {
            generation,
            analysis,
        })
    }

    /// Record the chosen framework, synthesize the five image prompts,
    /// and advance `analyzing -> generating`.
    pub async fn select_framework(
        &self,
        user_id: DbId,
        generation_id: DbId,
        framework_id: &str,
        global_note: Option<String>,
    ) -> Result<SelectOutcome, CoreError> {
        let generation = self.find_owned(generation_id, user_id).await?;

        let framework = match framework_candidate(&generation, framework_id) {
            Ok(framework) => framework,
            Err(err) => {
                // Missing or corrupt candidate data can never be selected
                // from; the generation is permanently stuck.
                if matches!(err, CoreError::Internal(_)) {
                    GenerationRepo::mark_failed(&self.pool, generation_id)
                        .await
                        .map_err(from_db)?;
                }
                return Err(err);
            }
        };

        let prompts = self
            .adapter
            .synthesize_prompts(&PromptSynthesisRequest {
                framework: framework.clone(),
                product_name: generation.product_title.clone(),
                features: generation.features.clone().unwrap_or_default(),
                global_note: global_note.clone(),
            })
            .await
            .map_err(from_adapter)?;

        let selected = serde_json::to_value(&framework)
            .map_err(|e| CoreError::Internal(format!("Unserializable framework: {e}")))?;
        let prompts_value = serde_json::to_value(&prompts)
            .map_err(|e| CoreError::Internal(format!("Unserializable prompts: {e}")))?;

        let generation = GenerationRepo::select_framework(
            &self.pool,
            generation_id,
            &selected,
            &prompts_value,
            global_note.as_deref(),
        )
        .await
        .map_err(from_db)?
        .ok_or_else(|| {
            CoreError::Conflict("A framework has already been selected for this generation".into())
        })?;

        Ok(SelectOutcome {
            generation,
            prompts,
        })
    }

    /// Render one image slot. The slot's synthesized prompt is the
    /// default; a caller-supplied prompt and reference image take
    /// precedence. Credits are gated before rendering and debited only
    /// after the artifact is stored and recorded.
    pub async fn generate_one(
        &self,
        user_id: DbId,
        generation_id: DbId,
        image_type: ImageType,
        prompt: Option<String>,
        reference_image: Option<InlineImage>,
    ) -> Result<RenderOutcome, CoreError> {
        let generation = self.find_owned(generation_id, user_id).await?;
        ensure_renderable(&generation)?;

        let prompt = match prompt {
            Some(prompt) => prompt,
            None => prompt_for_slot(&generation, image_type)?,
        };
        self.render_slot(&generation, image_type, prompt, reference_image)
            .await
    }

    /// Re-render a slot as a new version. Reuses the slot's last prompt
    /// (the prior attempt's, falling back to the synthesized one), with
    /// the optional note appended.
    pub async fn regenerate(
        &self,
        user_id: DbId,
        generation_id: DbId,
        image_type: ImageType,
        note: Option<&str>,
    ) -> Result<RenderOutcome, CoreError> {
        let generation = self.find_owned(generation_id, user_id).await?;
        ensure_renderable(&generation)?;

        let last_attempt =
            GeneratedImageRepo::latest_for_slot(&self.pool, generation_id, image_type.as_str())
                .await
                .map_err(from_db)?;
        let mut prompt = match last_attempt.and_then(|a| a.prompt_used) {
            Some(prompt) => prompt,
            None => prompt_for_slot(&generation, image_type)?,
        };
        if let Some(note) = note {
            prompt.push_str(&format!("\n\nADDITIONAL INSTRUCTIONS:\n{note}"));
        }

        self.render_slot(&generation, image_type, prompt, None).await
    }

    /// The latest attempt per slot with signed URLs, for history/detail
    /// views.
    pub async fn slot_summaries(
        &self,
        generation_id: DbId,
    ) -> Result<Vec<(GeneratedImage, Option<String>)>, CoreError> {
        let images = GeneratedImageRepo::latest_per_type(&self.pool, generation_id)
            .await
            .map_err(from_db)?;
        let mut summaries = Vec::with_capacity(images.len());
        for image in images {
            let url = match &image.storage_path {
                Some(path) => Some(
                    self.store
                        .signed_url(GENERATED_BUCKET, path, SIGNED_URL_TTL_SECS)
                        .await
                        .map_err(from_storage)?,
                ),
                None => None,
            };
            summaries.push((image, url));
        }
        Ok(summaries)
    }

    async fn find_owned(&self, generation_id: DbId, user_id: DbId) -> Result<Generation, CoreError> {
        GenerationRepo::find_owned(&self.pool, generation_id, user_id)
            .await
            .map_err(from_db)?
            .ok_or(CoreError::NotFound {
                entity: "generation",
                id: generation_id,
            })
    }

    async fn render_slot(
        &self,
        generation: &Generation,
        image_type: ImageType,
        prompt: String,
        reference_image: Option<InlineImage>,
    ) -> Result<RenderOutcome, CoreError> {
        // Gate on balance before any expensive work. The debit itself
        // re-checks atomically, so a concurrent spender cannot push the
        // balance negative; this check just fails fast.
        let available = CreditLedgerRepo::balance(&self.pool, generation.user_id)
            .await
            .map_err(from_db)?
            .ok_or(CoreError::NotFound {
                entity: "profile",
                id: generation.user_id,
            })?;
        if available < CREDITS_PER_IMAGE {
            return Err(CoreError::InsufficientCredits {
                required: CREDITS_PER_IMAGE,
                available,
            });
        }

        let mut version = GeneratedImageRepo::latest_for_slot(
            &self.pool,
            generation.id,
            image_type.as_str(),
        )
        .await
        .map_err(from_db)?
        .map(|a| a.version + 1)
        .unwrap_or(1);

        let rendered = match self
            .adapter
            .render_image(&RenderRequest {
                prompt: prompt.clone(),
                reference_image,
            })
            .await
        {
            Ok(rendered) => rendered,
            Err(err) => {
                self.record_failed_attempt(generation.id, image_type, &prompt, version, &err.to_string())
                    .await?;
                return Err(from_adapter(err));
            }
        };

        // Store and record the attempt, re-reading the version when a
        // concurrent render of the same slot claims it first.
        let mut retries = 2;
        let (image, path) = loop {
            let path = artifact_path(generation.id, image_type, version);
            if let Err(err) = self
                .store
                .put(GENERATED_BUCKET, &path, rendered.bytes.clone(), &rendered.mime_type)
                .await
            {
                self.record_failed_attempt(generation.id, image_type, &prompt, version, &err.to_string())
                    .await?;
                return Err(from_storage(err));
            }

            match GeneratedImageRepo::create(
                &self.pool,
                &CreateGeneratedImage {
                    generation_id: generation.id,
                    image_type: image_type.as_str().to_string(),
                    storage_path: Some(path.clone()),
                    prompt_used: Some(prompt.clone()),
                    version,
                    status: ImageSlotStatus::Completed.as_str().to_string(),
                    error: None,
                },
            )
            .await
            {
                Ok(image) => break (image, path),
                Err(err) if retries > 0 && is_slot_version_conflict(&err) => {
                    retries -= 1;
                    version = GeneratedImageRepo::latest_for_slot(
                        &self.pool,
                        generation.id,
                        image_type.as_str(),
                    )
                    .await
                    .map_err(from_db)?
                    .map(|a| a.version + 1)
                    .unwrap_or(version + 1);
                }
                Err(err) => return Err(from_db(err)),
            }
        };

        // debit-after-delivery: the image is already stored and recorded,
        // so a failed debit is logged for reconciliation, never surfaced
        // and never reversed.
        if let Err(err) = CreditLedgerRepo::debit(
            &self.pool,
            generation.user_id,
            CREDITS_PER_IMAGE,
            &format!("Generated {image_type} image"),
            Some(generation.id),
        )
        .await
        {
            tracing::error!(
                generation_id = %generation.id,
                user_id = %generation.user_id,
                %image_type,
                error = %err,
                "debit-after-delivery: credit debit failed after image delivery, \
                 flagged for reconciliation"
            );
        }

        self.check_completion(generation.id).await?;

        let image_url = self
            .store
            .signed_url(GENERATED_BUCKET, &path, SIGNED_URL_TTL_SECS)
            .await
            .map_err(from_storage)?;

        Ok(RenderOutcome {
            image,
            image_url,
            credits_used: CREDITS_PER_IMAGE,
        })
    }

    async fn record_failed_attempt(
        &self,
        generation_id: DbId,
        image_type: ImageType,
        prompt: &str,
        version: i32,
        error: &str,
    ) -> Result<(), CoreError> {
        GeneratedImageRepo::create(
            &self.pool,
            &CreateGeneratedImage {
                generation_id,
                image_type: image_type.as_str().to_string(),
                storage_path: None,
                prompt_used: Some(prompt.to_string()),
                version,
                status: ImageSlotStatus::Failed.as_str().to_string(),
                error: Some(error.to_string()),
            },
        )
        .await
        .map_err(from_db)?;
        // A failed slot never fails the parent; completion still counts
        // it as terminal.
        self.check_completion(generation_id).await
    }

    /// Advance the generation to `completed` once every slot's latest
    /// attempt is terminal. Idempotent; the guarded update ignores
    /// generations that already left `generating`.
    async fn check_completion(&self, generation_id: DbId) -> Result<(), CoreError> {
        let latest = GeneratedImageRepo::latest_per_type(&self.pool, generation_id)
            .await
            .map_err(from_db)?;
        if latest.len() < ImageType::ALL.len() {
            return Ok(());
        }
        let all_terminal = latest.iter().all(|image| {
            image
                .status
                .parse::<ImageSlotStatus>()
                .map(ImageSlotStatus::is_terminal)
                .unwrap_or(false)
        });
        if all_terminal && GenerationRepo::mark_completed(&self.pool, generation_id)
            .await
            .map_err(from_db)?
        {
            tracing::info!(%generation_id, "Generation completed");
        }
        Ok(())
    }
}

/// Look up a candidate framework by id in the stored analysis result.
fn framework_candidate(
    generation: &Generation,
    framework_id: &str,
) -> Result<DesignFramework, CoreError> {
    let data = generation.framework_data.as_ref().ok_or_else(|| {
        CoreError::Internal("Generation has no framework candidates".to_string())
    })?;
    let analysis: FrameworkAnalysis = serde_json::from_value(data.clone())
        .map_err(|e| CoreError::Internal(format!("Corrupt framework data: {e}")))?;
    analysis
        .frameworks
        .into_iter()
        .find(|f| f.framework_id == framework_id)
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "Unknown framework id '{framework_id}' for this generation"
            ))
        })
}

/// Resolve the synthesized prompt for one slot.
fn prompt_for_slot(generation: &Generation, image_type: ImageType) -> Result<String, CoreError> {
    let value = generation.image_prompts.as_ref().ok_or_else(|| {
        CoreError::Conflict("Select a framework before generating images".to_string())
    })?;
    let prompts: Vec<ImagePrompt> = serde_json::from_value(value.clone())
        .map_err(|e| CoreError::Internal(format!("Corrupt image prompts: {e}")))?;
    prompts
        .into_iter()
        .find(|p| p.image_type == image_type)
        .map(|p| p.prompt)
        .ok_or_else(|| {
            CoreError::Validation(format!("No prompt synthesized for image type '{image_type}'"))
        })
}

/// PostgreSQL unique violation (23505) on the per-slot version constraint.
fn is_slot_version_conflict(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some("23505")
                && db_err.constraint() == Some("uq_generated_images_slot_version")
        }
        _ => false,
    }
}

/// Images can only render after a framework is selected; a failed
/// generation never renders again. `completed` stays renderable so users
/// can regenerate individual slots.
fn ensure_renderable(generation: &Generation) -> Result<(), CoreError> {
    let status: GenerationStatus = generation.status.parse()?;
    match status {
        GenerationStatus::Generating | GenerationStatus::Completed => Ok(()),
        GenerationStatus::Pending | GenerationStatus::Analyzing => Err(CoreError::Conflict(
            "Select a framework before generating images".to_string(),
        )),
        GenerationStatus::Failed => Err(CoreError::Conflict(
            "This generation has failed and cannot render images".to_string(),
        )),
    }
}
