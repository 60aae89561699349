//! Orchestrator - the grounded generation pipeline
//!
//! This module contains:
//! - `config`: deadline and excerpt settings
//! - `core`: `GroundingOrchestrator` and its builder methods
//! - `run`: one request end to end, plus bounded batch runs
//! - `types`: `GroundedResult`

mod config;
mod core;
mod run;
mod types;


pub use self::config::OrchestratorConfig;
pub use self::core::GroundingOrchestrator;
pub use self::types::GroundedResult;
