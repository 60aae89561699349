//! `promptforge capabilities`

use anyhow::Result;
use clap::Args;
use promptforge_llm::capability::{canonical_provider, WhitelistEntry, WHITELIST};
use promptforge_llm::{Endpoints, WHITELIST_VERSION};
use std::process::ExitCode;

#[derive(Args, Debug)]
pub struct CapabilitiesArgs {
    /// Only show one provider
    #[arg(long)]
    pub provider: Option<String>,
}

pub fn run(args: CapabilitiesArgs) -> Result<ExitCode> {
    let filter = args.provider.as_deref().map(canonical_provider);
    let rows: Vec<&WhitelistEntry> = WHITELIST
        .iter()
        .filter(|e| filter.as_deref().is_none_or(|p| e.provider == p))
        .collect();

    let configured = Endpoints::from_env().configured();
    println!("whitelist {WHITELIST_VERSION}");
    println!(
        "configured providers: {}",
        if configured.is_empty() {
            "none".to_string()
        } else {
            configured.join(", ")
        }
    );
    println!();
    print!("{}", render_table(&rows));
    Ok(ExitCode::SUCCESS)
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn render_table(rows: &[&WhitelistEntry]) -> String {
    let width = rows
        .iter()
        .map(|e| e.model.len())
        .max()
        .unwrap_or(0)
        .max("MODEL".len());

    let mut out = format!(
        "{:<12} {:<width$} {:<10} {:<9} {:<8} {:>10}\n",
        "PROVIDER", "MODEL", "WEB_SEARCH", "REASONING", "PER_CALL", "MAX_OUTPUT"
    );
    for e in rows {
        out.push_str(&format!(
            "{:<12} {:<width$} {:<10} {:<9} {:<8} {:>10}\n",
            e.provider,
            e.model,
            yes_no(e.web_search),
            yes_no(e.reasoning),
            yes_no(e.per_call_tool),
            e.max_output_tokens
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table() {
        let rows: Vec<&WhitelistEntry> = WHITELIST
            .iter()
            .filter(|e| e.provider == "google")
            .collect();
        let table = render_table(&rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), rows.len() + 1);
        assert!(lines[0].starts_with("PROVIDER"));
        assert!(table.contains("gemini-2.5-pro"));
        assert!(!table.contains("openrouter"));
    }

    #[test]
    fn test_gemini_alias_filters_google() {
        let filter = canonical_provider("gemini");
        assert!(WHITELIST.iter().any(|e| e.provider == filter));
    }
}
