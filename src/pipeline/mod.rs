//! Generation orchestration.
//!
//! [`Pipeline::run`] takes a [`PipelineConfig`], makes sure templates are
//! available, asks the [`Detector`](crate::detection::Detector) for a pack
//! and has it write the selected artifacts, returning an
//! [`AnalysisResult`].

pub mod config;
pub mod orchestrator;
pub mod result;

pub use config::{GeneratorSet, PipelineConfig, DEFAULT_ENVIRONMENT, DEFAULT_GENERATORS};
pub use orchestrator::{Pipeline, Stage};
pub use result::AnalysisResult;
