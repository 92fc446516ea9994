//! End-to-end pipeline tests against Postgres, with a fake adapter and
//! an in-memory object store.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use common::{seed_profile, start_input, FakeAdapter, PNG_BYTES};
use listcraft_core::error::CoreError;
use listcraft_core::framework::FrameworkAnalysis;
use listcraft_core::image_type::ImageType;
use listcraft_db::models::image::CreateGeneratedImage;
use listcraft_db::repositories::{CreditLedgerRepo, GeneratedImageRepo, GenerationRepo};
use listcraft_gemini::{
    AdapterError, AnalysisAdapter, AnalyzeRequest, ImagePrompt, InlineImage,
    PromptSynthesisRequest, RenderRequest, RenderedImage,
};
use listcraft_pipeline::Pipeline;
use listcraft_storage::MemoryStore;
use sqlx::PgPool;
use uuid::Uuid;

fn pipeline(pool: PgPool, adapter: FakeAdapter) -> (Pipeline, MemoryStore) {
    let store = MemoryStore::new();
    (
        Pipeline::new(pool, Arc::new(adapter), Arc::new(store.clone())),
        store,
    )
}

async fn generating_setup(pool: &PgPool, credits: i32) -> (Pipeline, MemoryStore, Uuid, Uuid) {
    let user = seed_profile(pool, credits).await;
    let (pipeline, store) = self::pipeline(pool.clone(), FakeAdapter::default());
    let analysis = pipeline.start_analysis(user, start_input()).await.unwrap();
    let selected = pipeline
        .select_framework(user, analysis.generation.id, "framework_1", None)
        .await
        .unwrap();
    (pipeline, store, user, selected.generation.id)
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn analysis_creates_generation_with_candidates(pool: PgPool) {
    let user = seed_profile(&pool, 10).await;
    let (pipeline, _) = self::pipeline(pool.clone(), FakeAdapter::default());

    let outcome = pipeline.start_analysis(user, start_input()).await.unwrap();

    assert_eq!(outcome.generation.status, "analyzing");
    assert_eq!(outcome.analysis.frameworks.len(), 2);
    let stored = GenerationRepo::find_by_id(&pool, outcome.generation.id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.framework_data.is_some());
    assert_eq!(stored.credits_used, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn validation_failure_creates_no_record(pool: PgPool) {
    let user = seed_profile(&pool, 10).await;
    let (pipeline, _) = self::pipeline(pool.clone(), FakeAdapter::default());

    let mut input = start_input();
    input.product_title = "   ".into();
    let err = pipeline.start_analysis(user, input).await.unwrap_err();

    assert_matches!(err, CoreError::Validation(_));
    assert!(GenerationRepo::list_by_user(&pool, user)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn analysis_failure_creates_no_record(pool: PgPool) {
    let user = seed_profile(&pool, 10).await;
    let adapter = FakeAdapter {
        fail_analysis: true,
        ..Default::default()
    };
    let (pipeline, _) = self::pipeline(pool.clone(), adapter);

    let err = pipeline.start_analysis(user, start_input()).await.unwrap_err();

    assert_matches!(err, CoreError::Analysis(_));
    assert!(GenerationRepo::list_by_user(&pool, user)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn select_framework_stores_prompts(pool: PgPool) {
    let (_, _, _, generation_id) = generating_setup(&pool, 10).await;

    let generation = GenerationRepo::find_by_id(&pool, generation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(generation.status, "generating");
    assert!(generation.selected_framework.is_some());
    let prompts = generation.image_prompts.unwrap();
    assert_eq!(prompts.as_array().unwrap().len(), 5);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_framework_id_rejected(pool: PgPool) {
    let user = seed_profile(&pool, 10).await;
    let (pipeline, _) = self::pipeline(pool.clone(), FakeAdapter::default());
    let analysis = pipeline.start_analysis(user, start_input()).await.unwrap();

    let err = pipeline
        .select_framework(user, analysis.generation.id, "framework_99", None)
        .await
        .unwrap_err();

    assert_matches!(err, CoreError::Validation(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_selection_conflicts(pool: PgPool) {
    let user = seed_profile(&pool, 10).await;
    let (pipeline, _) = self::pipeline(pool.clone(), FakeAdapter::default());
    let analysis = pipeline.start_analysis(user, start_input()).await.unwrap();

    pipeline
        .select_framework(user, analysis.generation.id, "framework_1", None)
        .await
        .unwrap();
    let err = pipeline
        .select_framework(user, analysis.generation.id, "framework_2", None)
        .await
        .unwrap_err();

    assert_matches!(err, CoreError::Conflict(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn generate_stores_artifact_and_debits_once(pool: PgPool) {
    let (pipeline, store, user, generation_id) = generating_setup(&pool, 10).await;

    let outcome = pipeline
        .generate_one(user, generation_id, ImageType::Main, None, None)
        .await
        .unwrap();

    assert_eq!(outcome.credits_used, 1);
    assert_eq!(outcome.image.version, 1);
    let path = outcome.image.storage_path.as_deref().unwrap();
    assert_eq!(path, &format!("{generation_id}/main_v1.png"));
    assert!(store.contains("generated-images", path).await);
    assert!(outcome.image_url.contains(path));

    assert_eq!(CreditLedgerRepo::balance(&pool, user).await.unwrap(), Some(9));
    let transactions = CreditLedgerRepo::list_for_user(&pool, user).await.unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].amount, -1);
    assert_eq!(transactions[0].generation_id, Some(generation_id));

    let generation = GenerationRepo::find_by_id(&pool, generation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(generation.credits_used, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn render_failure_records_slot_and_debits_nothing(pool: PgPool) {
    let (_, _, user, generation_id) = generating_setup(&pool, 10).await;
    let (pipeline, store) = self::pipeline(pool.clone(), FakeAdapter::failing_render());

    let err = pipeline
        .generate_one(user, generation_id, ImageType::Main, None, None)
        .await
        .unwrap_err();

    assert_matches!(err, CoreError::Analysis(_));
    let attempt = GeneratedImageRepo::latest_for_slot(&pool, generation_id, "main")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(attempt.status, "failed");
    assert!(attempt.storage_path.is_none());
    assert!(attempt.error.is_some());

    assert!(store.is_empty().await);
    assert_eq!(CreditLedgerRepo::balance(&pool, user).await.unwrap(), Some(10));

    // The parent survives a slot failure.
    let generation = GenerationRepo::find_by_id(&pool, generation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(generation.status, "generating");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn zero_balance_blocks_before_render(pool: PgPool) {
    let (_, _, user, generation_id) = generating_setup(&pool, 1).await;
    sqlx::query("UPDATE profiles SET credits = 0 WHERE id = $1")
        .bind(user)
        .execute(&pool)
        .await
        .unwrap();
    let adapter = FakeAdapter::default();
    let render_calls = adapter.render_calls.clone();
    let (pipeline, store) = self::pipeline(pool.clone(), adapter);

    let err = pipeline
        .generate_one(user, generation_id, ImageType::Main, None, None)
        .await
        .unwrap_err();

    assert_matches!(
        err,
        CoreError::InsufficientCredits {
            required: 1,
            available: 0
        }
    );
    assert_eq!(render_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert!(store.is_empty().await);
    assert!(GeneratedImageRepo::latest_for_slot(&pool, generation_id, "main")
        .await
        .unwrap()
        .is_none());
    assert!(CreditLedgerRepo::list_for_user(&pool, user)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn wrong_owner_sees_not_found(pool: PgPool) {
    let (pipeline, _, _, generation_id) = generating_setup(&pool, 10).await;
    let other = seed_profile(&pool, 10).await;

    let err = pipeline
        .generate_one(other, generation_id, ImageType::Main, None, None)
        .await
        .unwrap_err();

    assert_matches!(err, CoreError::NotFound { entity: "generation", .. });
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn generating_before_selection_conflicts(pool: PgPool) {
    let user = seed_profile(&pool, 10).await;
    let (pipeline, _) = self::pipeline(pool.clone(), FakeAdapter::default());
    let analysis = pipeline.start_analysis(user, start_input()).await.unwrap();

    let err = pipeline
        .generate_one(user, analysis.generation.id, ImageType::Main, None, None)
        .await
        .unwrap_err();

    assert_matches!(err, CoreError::Conflict(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn five_terminal_slots_complete_the_generation(pool: PgPool) {
    let (pipeline, _, user, generation_id) = generating_setup(&pool, 10).await;

    for ty in ImageType::ALL {
        pipeline.generate_one(user, generation_id, ty, None, None).await.unwrap();
    }

    let generation = GenerationRepo::find_by_id(&pool, generation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(generation.status, "completed");
    assert_eq!(generation.credits_used, 5);
    assert_eq!(CreditLedgerRepo::balance(&pool, user).await.unwrap(), Some(5));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_slot_counts_toward_completion(pool: PgPool) {
    let (pipeline, _, user, generation_id) = generating_setup(&pool, 10).await;
    for ty in [
        ImageType::Main,
        ImageType::Infographic1,
        ImageType::Infographic2,
        ImageType::Lifestyle,
    ] {
        pipeline.generate_one(user, generation_id, ty, None, None).await.unwrap();
    }

    let (failing, _) = self::pipeline(pool.clone(), FakeAdapter::failing_render());
    failing
        .generate_one(user, generation_id, ImageType::Comparison, None, None)
        .await
        .unwrap_err();

    let generation = GenerationRepo::find_by_id(&pool, generation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(generation.status, "completed");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn regenerate_appends_version_and_keeps_prior_artifact(pool: PgPool) {
    let (pipeline, store, user, generation_id) = generating_setup(&pool, 10).await;
    let first = pipeline
        .generate_one(user, generation_id, ImageType::Main, None, None)
        .await
        .unwrap();

    let second = pipeline
        .regenerate(user, generation_id, ImageType::Main, Some("warmer lighting"))
        .await
        .unwrap();

    assert_eq!(second.image.version, 2);
    assert_eq!(
        second.image.storage_path.as_deref().unwrap(),
        &format!("{generation_id}/main_v2.png")
    );
    // Prior version binaries are retained.
    assert!(store
        .contains("generated-images", first.image.storage_path.as_deref().unwrap())
        .await);
    // Both attempts stay in the slot's history.
    let history = GeneratedImageRepo::list_by_generation(&pool, generation_id)
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].version, 1);
    assert_eq!(history[1].version, 2);
    assert!(second
        .image
        .prompt_used
        .as_deref()
        .unwrap()
        .contains("warmer lighting"));
    assert_eq!(CreditLedgerRepo::balance(&pool, user).await.unwrap(), Some(8));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn regenerate_after_failed_attempt_reuses_prompt(pool: PgPool) {
    let (_, _, user, generation_id) = generating_setup(&pool, 10).await;
    let (failing, _) = self::pipeline(pool.clone(), FakeAdapter::failing_render());
    failing
        .generate_one(user, generation_id, ImageType::Lifestyle, None, None)
        .await
        .unwrap_err();

    let (pipeline, _) = self::pipeline(pool.clone(), FakeAdapter::default());
    let outcome = pipeline
        .regenerate(user, generation_id, ImageType::Lifestyle, None)
        .await
        .unwrap();

    assert_eq!(outcome.image.version, 2);
    assert_eq!(outcome.image.status, "completed");
    assert!(outcome
        .image
        .prompt_used
        .as_deref()
        .unwrap()
        .contains("lifestyle"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn slot_summaries_return_latest_with_urls(pool: PgPool) {
    let (pipeline, _, user, generation_id) = generating_setup(&pool, 10).await;
    pipeline
        .generate_one(user, generation_id, ImageType::Main, None, None)
        .await
        .unwrap();
    pipeline
        .regenerate(user, generation_id, ImageType::Main, None)
        .await
        .unwrap();

    let summaries = pipeline.slot_summaries(generation_id).await.unwrap();

    assert_eq!(summaries.len(), 1);
    let (image, url) = &summaries[0];
    assert_eq!(image.version, 2);
    assert!(url.as_deref().unwrap().contains("main_v2.png"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn caller_prompt_and_reference_reach_the_render(pool: PgPool) {
    let (_, _, user, generation_id) = generating_setup(&pool, 10).await;
    let adapter = FakeAdapter::default();
    let reference_renders = adapter.reference_renders.clone();
    let (pipeline, _) = self::pipeline(pool.clone(), adapter);

    let outcome = pipeline
        .generate_one(
            user,
            generation_id,
            ImageType::Main,
            Some("Amended: move the logo top-left".into()),
            Some(InlineImage {
                bytes: PNG_BYTES.to_vec(),
                mime_type: "image/png".into(),
            }),
        )
        .await
        .unwrap();

    assert_eq!(
        outcome.image.prompt_used.as_deref(),
        Some("Amended: move the logo top-left")
    );
    assert_eq!(
        reference_renders.load(std::sync::atomic::Ordering::SeqCst),
        1
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn analysis_failure_uploads_no_style_reference(pool: PgPool) {
    let user = seed_profile(&pool, 10).await;
    let adapter = FakeAdapter {
        fail_analysis: true,
        ..Default::default()
    };
    let (pipeline, store) = self::pipeline(pool.clone(), adapter);

    let mut input = start_input();
    input.style_reference = Some(InlineImage {
        bytes: PNG_BYTES.to_vec(),
        mime_type: "image/png".into(),
    });
    let err = pipeline.start_analysis(user, input).await.unwrap_err();

    assert_matches!(err, CoreError::Analysis(_));
    assert!(store.is_empty().await);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn corrupt_candidate_data_fails_the_generation(pool: PgPool) {
    let user = seed_profile(&pool, 10).await;
    let (pipeline, _) = self::pipeline(pool.clone(), FakeAdapter::default());
    let analysis = pipeline.start_analysis(user, start_input()).await.unwrap();
    sqlx::query("UPDATE generations SET framework_data = $2 WHERE id = $1")
        .bind(analysis.generation.id)
        .bind(serde_json::json!({"bogus": true}))
        .execute(&pool)
        .await
        .unwrap();

    let err = pipeline
        .select_framework(user, analysis.generation.id, "framework_1", None)
        .await
        .unwrap_err();

    assert_matches!(err, CoreError::Internal(_));
    let generation = GenerationRepo::find_by_id(&pool, analysis.generation.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(generation.status, "failed");
}

/// Delegating adapter that empties the user's balance while rendering,
/// standing in for a concurrent spender landing between the balance gate
/// and the debit.
struct DrainingAdapter {
    inner: FakeAdapter,
    pool: PgPool,
    user: Uuid,
}

#[async_trait]
impl AnalysisAdapter for DrainingAdapter {
    async fn analyze_product(
        &self,
        request: &AnalyzeRequest,
    ) -> Result<FrameworkAnalysis, AdapterError> {
        self.inner.analyze_product(request).await
    }

    async fn synthesize_prompts(
        &self,
        request: &PromptSynthesisRequest,
    ) -> Result<Vec<ImagePrompt>, AdapterError> {
        self.inner.synthesize_prompts(request).await
    }

    async fn render_image(&self, request: &RenderRequest) -> Result<RenderedImage, AdapterError> {
        sqlx::query("UPDATE profiles SET credits = 0 WHERE id = $1")
            .bind(self.user)
            .execute(&self.pool)
            .await
            .unwrap();
        self.inner.render_image(request).await
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_debit_after_render_still_delivers_the_image(pool: PgPool) {
    let (_, _, user, generation_id) = generating_setup(&pool, 1).await;
    let adapter = DrainingAdapter {
        inner: FakeAdapter::default(),
        pool: pool.clone(),
        user,
    };
    let store = MemoryStore::new();
    let pipeline = Pipeline::new(pool.clone(), Arc::new(adapter), Arc::new(store.clone()));

    let outcome = pipeline
        .generate_one(user, generation_id, ImageType::Main, None, None)
        .await
        .unwrap();

    // The render was delivered even though the debit found no credits.
    assert_eq!(outcome.image.status, "completed");
    assert!(store
        .contains(
            "generated-images",
            outcome.image.storage_path.as_deref().unwrap()
        )
        .await);

    // No usage row and no balance change; the shortfall is left to
    // reconciliation.
    assert_eq!(CreditLedgerRepo::balance(&pool, user).await.unwrap(), Some(0));
    assert!(CreditLedgerRepo::list_for_user(&pool, user)
        .await
        .unwrap()
        .is_empty());
    let generation = GenerationRepo::find_by_id(&pool, generation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(generation.credits_used, 0);
}

/// Delegating adapter that claims the slot's next version while rendering,
/// standing in for a concurrent render of the same slot winning the
/// insert race.
struct RivalAdapter {
    inner: FakeAdapter,
    pool: PgPool,
    generation_id: Uuid,
}

#[async_trait]
impl AnalysisAdapter for RivalAdapter {
    async fn analyze_product(
        &self,
        request: &AnalyzeRequest,
    ) -> Result<FrameworkAnalysis, AdapterError> {
        self.inner.analyze_product(request).await
    }

    async fn synthesize_prompts(
        &self,
        request: &PromptSynthesisRequest,
    ) -> Result<Vec<ImagePrompt>, AdapterError> {
        self.inner.synthesize_prompts(request).await
    }

    async fn render_image(&self, request: &RenderRequest) -> Result<RenderedImage, AdapterError> {
        GeneratedImageRepo::create(
            &self.pool,
            &CreateGeneratedImage {
                generation_id: self.generation_id,
                image_type: "main".into(),
                storage_path: Some(format!("{}/main_v1.png", self.generation_id)),
                prompt_used: Some("rival render".into()),
                version: 1,
                status: "completed".into(),
                error: None,
            },
        )
        .await
        .unwrap();
        self.inner.render_image(request).await
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_slot_claim_bumps_the_version(pool: PgPool) {
    let (_, _, user, generation_id) = generating_setup(&pool, 10).await;
    let adapter = RivalAdapter {
        inner: FakeAdapter::default(),
        pool: pool.clone(),
        generation_id,
    };
    let store = MemoryStore::new();
    let pipeline = Pipeline::new(pool.clone(), Arc::new(adapter), Arc::new(store.clone()));

    let outcome = pipeline
        .generate_one(user, generation_id, ImageType::Main, None, None)
        .await
        .unwrap();

    assert_eq!(outcome.image.version, 2);
    assert!(outcome
        .image
        .storage_path
        .as_deref()
        .unwrap()
        .ends_with("main_v2.png"));
    let history = GeneratedImageRepo::list_by_generation(&pool, generation_id)
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
}
