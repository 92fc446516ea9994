//! HTTP surface for the listing-image generation service.
//!
//! Thin translation layer: handlers decode requests, call the pipeline /
//! repositories / payment bridge, and encode responses. Business rules
//! live below this crate.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
