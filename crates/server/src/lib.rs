//! Server crate for the ReelRecs content recommendation service.
//!
//! This crate contains the orchestrator that joins similarity scores back
//! to movie documents, plus the environment-driven settings.

pub mod config;
pub mod orchestrator;

pub use config::Settings;
pub use orchestrator::{MovieRecommendation, RecommendationOrchestrator, RecommendationSource};
