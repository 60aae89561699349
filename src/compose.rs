//! Prompt composition and output rendering
//!
//! The user prompt is the user files concatenated in argument order, each
//! under a `# File: <name>` heading. The accepted output is the answer text
//! followed by a `## Sources` list.

use anyhow::{Context, Result};
use promptforge_core::GroundedResult;
use promptforge_llm::util::domain_of;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Suffix appended to the input file name for the default output path
pub const OUTPUT_SUFFIX: &str = ".fpf.response.txt";

/// Join named parts under `# File:` headings
pub fn compose_parts(parts: &[(String, String)]) -> String {
    parts
        .iter()
        .map(|(name, content)| format!("# File: {name}\n\n{}", content.trim_end()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Read user files and compose the user prompt
pub fn compose_user_prompt(files: &[PathBuf]) -> Result<String> {
    let mut parts = Vec::with_capacity(files.len());
    for file in files {
        let content = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read user prompt file {}", file.display()))?;
        parts.push((display_name(file), content));
    }
    Ok(compose_parts(&parts))
}

/// Read the system prompt verbatim
pub fn read_system_prompt(file: &Path) -> Result<String> {
    std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read system prompt file {}", file.display()))
}

/// `<input>.fpf.response.txt` beside the input
pub fn default_output_path(input: &Path) -> PathBuf {
    let mut name = input
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(OUTPUT_SUFFIX);
    input.with_file_name(name)
}

/// Whether a path is itself a PromptForge output
pub fn is_output_file(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().ends_with(OUTPUT_SUFFIX))
        .unwrap_or(false)
}

/// Answer text plus a `## Sources` list of domain-named links
pub fn render(result: &GroundedResult) -> String {
    let mut out = result.text.trim_end().to_string();
    if !result.sources.is_empty() {
        out.push_str("\n\n## Sources\n\n");
        for source in &result.sources {
            if source.url.is_empty() {
                let _ = writeln!(out, "- {}", source.title);
            } else {
                let _ = writeln!(out, "- [{}]({})", domain_of(&source.url), source.url);
            }
        }
    }
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptforge_llm::Source;

    fn result(sources: Vec<Source>) -> GroundedResult {
        GroundedResult {
            text: "The answer.\n".to_string(),
            sources,
            reasoning_excerpt: "why".to_string(),
            audit_reference: "/tmp/record.json".to_string(),
            usage: None,
            cost_usd: None,
        }
    }

    #[test]
    fn test_compose_parts_in_order() {
        let prompt = compose_parts(&[
            ("a.md".to_string(), "first\n".to_string()),
            ("b.md".to_string(), "second".to_string()),
        ]);
        assert_eq!(prompt, "# File: a.md\n\nfirst\n\n# File: b.md\n\nsecond");
    }

    #[test]
    fn test_compose_user_prompt_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("context.txt");
        let b = dir.path().join("question.md");
        std::fs::write(&a, "background").unwrap();
        std::fs::write(&b, "what now?").unwrap();

        let prompt = compose_user_prompt(&[a, b]).unwrap();
        assert!(prompt.starts_with("# File: context.txt"));
        assert!(prompt.find("context.txt").unwrap() < prompt.find("question.md").unwrap());
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = compose_user_prompt(&[PathBuf::from("/nonexistent/q.md")]).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/q.md"));
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/work/question.md")),
            PathBuf::from("/work/question.md.fpf.response.txt")
        );
        assert!(is_output_file(Path::new("/work/question.md.fpf.response.txt")));
        assert!(!is_output_file(Path::new("/work/question.md")));
    }

    #[test]
    fn test_render_with_sources() {
        let rendered = render(&result(vec![
            Source::from_url("https://www.nytimes.com/x"),
            Source::from_url("https://example.org/a?b=c").with_title("Example"),
        ]));
        assert_eq!(
            rendered,
            "The answer.\n\n## Sources\n\n- [nytimes.com](https://www.nytimes.com/x)\n- [example.org](https://example.org/a?b=c)\n"
        );
    }

    #[test]
    fn test_render_without_sources() {
        assert_eq!(render(&result(Vec::new())), "The answer.\n");
    }
}
