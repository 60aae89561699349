//! PromptForge Core - Grounding Orchestrator
//!
//! This crate wires the pieces of `promptforge-llm` and `promptforge-replay`
//! into one fail-fast pipeline:
//! - Resolve: capability lookup for the provider/model pair
//! - Translate: canonical request to provider-native payload
//! - Send: bounded by a caller deadline
//! - Validate and audit: every request that reached the transport is recorded
//! - Batch: bounded concurrent runs of independent requests

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod orchestrator;

pub use error::{Error, ErrorKind, GroundingError, Result};
pub use orchestrator::{GroundedResult, GroundingOrchestrator, OrchestratorConfig};
