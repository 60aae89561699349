//! `promptforge batch`
//!
//! One request per regular file in the input directory. Each accepted
//! response lands beside its input as `<name>.fpf.response.txt`.

use anyhow::{bail, Context, Result};
use clap::Args;
use promptforge_core::{GroundedResult, GroundingError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

use super::run::write_output;
use super::{build_orchestrator, report_failure, RequestOverrides};
use crate::compose::{
    compose_user_prompt, default_output_path, is_output_file, read_system_prompt, render,
};
use crate::settings::AppConfig;

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// System prompt file, shared by every request
    #[arg(long)]
    pub system: PathBuf,

    /// Directory of user prompt files
    #[arg(long)]
    pub inputs: PathBuf,

    /// Maximum requests in flight (default: [batch] max_concurrent)
    #[arg(long)]
    pub max_concurrent: Option<usize>,

    #[command(flatten)]
    pub overrides: RequestOverrides,
}

/// Regular, non-hidden files that are not previous outputs, sorted
pub fn collect_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read input directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read input directory {}", dir.display()))?
            .path();
        let hidden = path
            .file_name()
            .map(|n| n.to_string_lossy().starts_with('.'))
            .unwrap_or(true);
        if path.is_file() && !hidden && !is_output_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub async fn run(args: BatchArgs, config: &AppConfig) -> Result<ExitCode> {
    let inputs = collect_inputs(&args.inputs)?;
    if inputs.is_empty() {
        bail!("No input files in {}", args.inputs.display());
    }

    let system = read_system_prompt(&args.system)?;
    let mut jobs = Vec::with_capacity(inputs.len());
    for input in &inputs {
        let user = compose_user_prompt(std::slice::from_ref(input))?;
        let request = args.overrides.request(config, system.clone(), user);
        jobs.push((input.clone(), request));
    }

    let max_concurrent = args.max_concurrent.unwrap_or(config.batch.max_concurrent);
    let orchestrator = build_orchestrator(config)?;
    let mut results = orchestrator.run_batch(jobs, max_concurrent).await;
    results.sort_by(|a, b| a.0.cmp(&b.0));

    let status = write_results(&results).await;
    Ok(ExitCode::from(status))
}

/// Write accepted outputs and report failures, in input order.
///
/// Every result is handled even when an earlier output write fails. Returns
/// the exit status of the first failing input, or 0.
pub async fn write_results(results: &[(PathBuf, Result<GroundedResult, GroundingError>)]) -> u8 {
    let mut status = 0u8;
    let mut failed = 0usize;
    for (input, result) in results {
        let label = input.display().to_string();
        let code = match result {
            Ok(result) => {
                let out = default_output_path(input);
                match write_output(&out, &render(result)).await {
                    Ok(()) => {
                        println!("{}", out.display());
                        continue;
                    }
                    Err(e) => {
                        error!(
                            input = %label,
                            audit_reference = %result.audit_reference,
                            "output write failed: {e:#}"
                        );
                        eprintln!("{label}: {e:#}");
                        eprintln!("{label}: audit record {}", result.audit_reference);
                        1
                    }
                }
            }
            Err(e) => report_failure(&label, e),
        };
        if failed == 0 {
            status = code;
        }
        failed += 1;
    }

    info!(
        total = results.len(),
        accepted = results.len() - failed,
        failed,
        "batch finished"
    );
    status
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_inputs_skips_outputs_and_hidden() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.md"), "b").unwrap();
        std::fs::write(dir.path().join("a.md"), "a").unwrap();
        std::fs::write(dir.path().join("a.md.fpf.response.txt"), "old").unwrap();
        std::fs::write(dir.path().join(".hidden"), "x").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let files = collect_inputs(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.md", "b.md"]);
    }

    #[test]
    fn test_collect_inputs_missing_dir() {
        assert!(collect_inputs(Path::new("/nonexistent/inputs")).is_err());
    }

    fn accepted(text: &str) -> GroundedResult {
        GroundedResult {
            text: text.to_string(),
            sources: Vec::new(),
            reasoning_excerpt: "searched".to_string(),
            audit_reference: "/audit/x/record.json".to_string(),
            usage: None,
            cost_usd: None,
        }
    }

    #[tokio::test]
    async fn test_write_failure_does_not_stop_batch() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.md");
        let b = dir.path().join("b.md");
        let c = dir.path().join("c.md");
        // a directory where a's output should go makes that write fail
        std::fs::create_dir(default_output_path(&a)).unwrap();

        let results = vec![
            (a, Ok(accepted("first"))),
            (
                b.clone(),
                Err(GroundingError::new(
                    promptforge_core::ErrorKind::RejectedNoTool,
                    "no tool evidence",
                )
                .with_audit_reference("/audit/b/record.json")),
            ),
            (c.clone(), Ok(accepted("third"))),
        ];

        let status = write_results(&results).await;

        assert_eq!(status, 1);
        assert!(!default_output_path(&b).exists());
        let written = std::fs::read_to_string(default_output_path(&c)).unwrap();
        assert!(written.starts_with("third"));
    }

    #[tokio::test]
    async fn test_first_failure_sets_status() {
        let dir = tempfile::tempdir().unwrap();
        let results = vec![
            (dir.path().join("a.md"), Ok(accepted("ok"))),
            (
                dir.path().join("b.md"),
                Err(GroundingError::new(
                    promptforge_core::ErrorKind::Capability,
                    "no web search",
                )),
            ),
            (
                dir.path().join("c.md"),
                Err(GroundingError::new(
                    promptforge_core::ErrorKind::Transport,
                    "timeout",
                )),
            ),
        ];

        assert_eq!(write_results(&results).await, 2);
        assert!(default_output_path(&dir.path().join("a.md")).exists());
    }
}
