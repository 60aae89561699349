//! `promptforge run`

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use super::{build_orchestrator, report_failure, RequestOverrides};
use crate::compose::{compose_user_prompt, default_output_path, read_system_prompt, render};
use crate::settings::AppConfig;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// System prompt file, passed verbatim
    #[arg(long)]
    pub system: PathBuf,

    /// User prompt files, concatenated in order
    #[arg(long, required = true, num_args = 1..)]
    pub user: Vec<PathBuf>,

    /// Output file (default: <last user file>.fpf.response.txt)
    #[arg(long)]
    pub out: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: RequestOverrides,
}

pub async fn run(args: RunArgs, config: &AppConfig) -> Result<ExitCode> {
    let last = args
        .user
        .last()
        .context("At least one --user file is required")?;
    let out = args.out.clone().unwrap_or_else(|| default_output_path(last));

    let system = read_system_prompt(&args.system)?;
    let user = compose_user_prompt(&args.user)?;
    let request = args.overrides.request(config, system, user);
    let label = last.display().to_string();

    let orchestrator = build_orchestrator(config)?;
    match orchestrator.run(request).await {
        Ok(result) => {
            write_output(&out, &render(&result)).await?;
            info!(
                output = %out.display(),
                sources = result.sources.len(),
                audit_reference = %result.audit_reference,
                "response written"
            );
            println!("{}", out.display());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Ok(ExitCode::from(report_failure(&label, &e))),
    }
}

/// Write an accepted response
pub async fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("Failed to write output {}", path.display()))
}
