//! PromptForge LLM - Grounded Generation Plumbing
//!
//! This crate provides everything needed to ask a provider for grounded,
//! reasoning-bearing output and to check that it actually delivered:
//! - Capability: static whitelist plus single-flight live probing
//! - Providers: one request translator per provider family
//! - Transport: HTTP exchange with timeout, retry and authentication
//! - Validate: provider-agnostic evidence scanning and enforcement
//! - Cost: token usage extraction and pricing

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod capability;
pub mod cost;
pub mod error;
pub mod providers;
pub mod request;
pub mod transport;
pub mod util;
pub mod validate;

pub use capability::{
    CapabilityProbe, CapabilityRecord, CapabilityRegistry, CapabilitySource, LiveProbe,
    WHITELIST_VERSION,
};
pub use cost::{ModelPricing, PricingTable, TokenUsage};
pub use error::{Error, Result};
pub use providers::{
    adapter_for, GroundingMechanism, ProviderAdapter, ProviderFamily, ProviderPayload,
};
pub use request::{CanonicalRequest, ReasoningLevel, RequestSummary};
pub use transport::{
    Endpoints, HttpExchange, ProviderEndpoint, RawResponse, ReqwestExchange, SendResult,
    Transport, TransportClient, TransportConfig, TransportError, TransportErrorKind,
};
pub use validate::{validate, validate_response, OutcomeTag, Source, ValidationOutcome};
