//! CLI module for PromptForge
//!
//! Provides commands:
//! - `run`: one grounded request from a system file and user files
//! - `batch`: one grounded request per file in a directory, concurrently
//! - `capabilities`: print the capability whitelist

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use promptforge_core::{GroundingError, GroundingOrchestrator, OrchestratorConfig};
use promptforge_llm::{
    CanonicalRequest, CapabilityRegistry, Endpoints, LiveProbe, PricingTable, ReasoningLevel,
    Transport, TransportClient,
};
use promptforge_replay::{AuditWriter, FileAuditStore};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

use crate::settings::{load_config, AppConfig};

pub mod batch;
pub mod capabilities;
pub mod run;

/// PromptForge CLI
#[derive(Parser, Debug)]
#[command(name = "promptforge")]
#[command(about = "Grounded, reasoning-bearing generation with enforced provider-side search")]
#[command(version)]
pub struct Cli {
    /// Configuration file layered over the defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one grounded request
    Run(run::RunArgs),
    /// Run one grounded request per input file
    Batch(batch::BatchArgs),
    /// Show known provider/model capabilities
    Capabilities(capabilities::CapabilitiesArgs),
}

/// Per-invocation request overrides
#[derive(Args, Debug, Clone, Default)]
pub struct RequestOverrides {
    /// Provider id (openai, google, openrouter)
    #[arg(long)]
    pub provider: Option<String>,

    /// Model id
    #[arg(long)]
    pub model: Option<String>,

    /// Reasoning level (low, medium, high)
    #[arg(long)]
    pub reasoning_level: Option<ReasoningLevel>,

    /// Maximum search results the provider should consult
    #[arg(long)]
    pub max_results: Option<u32>,
}

impl RequestOverrides {
    /// Build a canonical request from config plus overrides
    pub fn request(&self, config: &AppConfig, system: String, user: String) -> CanonicalRequest {
        let provider = self
            .provider
            .clone()
            .unwrap_or_else(|| config.provider.id.clone());
        let model = self
            .model
            .clone()
            .unwrap_or_else(|| config.provider.model.clone());

        CanonicalRequest::new(provider, model, system, user)
            .with_max_results(self.max_results.unwrap_or(config.grounding.max_results))
            .with_search_prompt(config.grounding.search_prompt.clone())
            .with_reasoning_level(
                self.reasoning_level
                    .unwrap_or(config.grounding.reasoning_level),
            )
    }
}

/// Wire transport, registry, audit store and pricing from configuration
pub fn build_orchestrator(config: &AppConfig) -> Result<GroundingOrchestrator> {
    let endpoints = Endpoints::from_env();
    info!(configured = ?endpoints.configured(), "provider endpoints");

    let client = TransportClient::new(endpoints, config.transport.to_transport_config())
        .context("Failed to create HTTP client")?;
    let transport: Arc<dyn Transport> = Arc::new(client);

    let registry = if config.capability.probe_enabled {
        CapabilityRegistry::with_probe(Arc::new(LiveProbe::new(transport.clone())))
    } else {
        CapabilityRegistry::new()
    };

    let pricing = match &config.pricing.index {
        Some(path) => PricingTable::load_index(path)
            .with_context(|| format!("Failed to load pricing index {}", path.display()))?,
        None => PricingTable::builtin(),
    };

    let audit_dir = config.audit.dir();
    info!(audit_dir = %audit_dir.display(), "audit store");
    let audit = AuditWriter::new(Arc::new(FileAuditStore::new(audit_dir)));

    Ok(
        GroundingOrchestrator::new(Arc::new(registry), transport, audit)
            .with_pricing(pricing)
            .with_config(OrchestratorConfig::new().with_deadline(config.transport.deadline())),
    )
}

/// Log and print a failed run, returning its exit status
pub fn report_failure(label: &str, err: &GroundingError) -> u8 {
    error!(
        input = label,
        kind = %err.kind,
        audit_reference = err.audit_reference.as_deref().unwrap_or("-"),
        "grounded run failed: {}",
        err.detail
    );
    eprintln!("{label}: {err}");
    if let Some(reference) = &err.audit_reference {
        eprintln!("{label}: audit record {reference}");
    }
    err.exit_code()
}

/// Run the CLI command
pub async fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Some(Commands::Capabilities(args)) => capabilities::run(args),
        Some(Commands::Run(args)) => {
            let config = load_config(cli.config.as_deref())?;
            run::run(args, &config).await
        }
        Some(Commands::Batch(args)) => {
            let config = load_config(cli.config.as_deref())?;
            batch::run(args, &config).await
        }
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::try_parse_from([
            "promptforge",
            "run",
            "--system",
            "sys.md",
            "--user",
            "a.md",
            "b.md",
            "--provider",
            "google",
            "--reasoning-level",
            "medium",
            "--json-logs",
        ])
        .unwrap();

        assert!(cli.json_logs);
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.user, vec![PathBuf::from("a.md"), PathBuf::from("b.md")]);
        assert_eq!(args.overrides.provider.as_deref(), Some("google"));
        assert_eq!(args.overrides.reasoning_level, Some(ReasoningLevel::Medium));
    }

    #[test]
    fn test_cli_rejects_unknown_reasoning_level() {
        assert!(Cli::try_parse_from([
            "promptforge",
            "run",
            "--system",
            "s",
            "--user",
            "u",
            "--reasoning-level",
            "extreme",
        ])
        .is_err());
    }

    #[test]
    fn test_overrides_fall_back_to_config() {
        let config = AppConfig::default();
        let request = RequestOverrides::default().request(&config, "sys".into(), "user".into());
        assert_eq!(request.provider_id(), "openai");
        assert_eq!(request.model_id(), "gpt-5");
        assert_eq!(request.max_results(), config.grounding.max_results);
        assert_eq!(request.reasoning_level(), ReasoningLevel::High);

        let overrides = RequestOverrides {
            model: Some("o3".into()),
            max_results: Some(2),
            ..Default::default()
        };
        let request = overrides.request(&config, "sys".into(), "user".into());
        assert_eq!(request.model_id(), "o3");
        assert_eq!(request.max_results(), 2);
    }
}
