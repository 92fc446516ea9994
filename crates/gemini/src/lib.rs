//! Analysis Adapter: the external AI capability boundary.
//!
//! The [`AnalysisAdapter`] trait covers the three capabilities the
//! pipeline needs -- vision analysis, prompt synthesis, and image
//! rendering. [`GeminiService`] is the production implementation over the
//! Gemini REST API; tests substitute fakes.

pub mod adapter;
pub mod api;
pub mod client;
pub mod parse;
pub mod prompts;
pub mod service;

pub use adapter::{
    AdapterError, AnalysisAdapter, AnalyzeRequest, ImagePrompt, InlineImage,
    PromptSynthesisRequest, RenderRequest, RenderedImage,
};
pub use client::{GeminiClient, GeminiConfig};
pub use service::GeminiService;
