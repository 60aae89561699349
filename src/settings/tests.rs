use super::loader::DEFAULT_CONFIG;
use super::*;
use promptforge_llm::ReasoningLevel;
use std::io::Write;
use std::time::Duration;

#[test]
fn test_embedded_defaults_parse() {
    let config: AppConfig = ::config::Config::builder()
        .add_source(::config::File::from_str(
            DEFAULT_CONFIG,
            ::config::FileFormat::Toml,
        ))
        .build()
        .unwrap()
        .try_deserialize()
        .unwrap();

    assert_eq!(config.provider.id, "openai");
    assert_eq!(config.provider.model, "gpt-5");
    assert_eq!(config.grounding.max_results, 5);
    assert_eq!(config.grounding.reasoning_level, ReasoningLevel::High);
    assert!(!config.grounding.search_prompt.is_empty());
    assert_eq!(config.transport.max_attempts, 3);
    assert!(!config.capability.probe_enabled);
    assert_eq!(config.batch.max_concurrent, 4);
    assert!(config.pricing.index.is_none());
    assert!(config.audit.dir().ends_with(".promptforge/audit"));
}

#[test]
fn test_explicit_file_overrides_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        "[provider]\nid = \"openrouter\"\nmodel = \"openai/gpt-5\"\n\n[transport]\ndeadline_secs = 0\n\n[audit]\ndir = \"/tmp/pf-audit\""
    )
    .unwrap();

    let config = load_config(Some(file.path())).unwrap();

    assert_eq!(config.provider.id, "openrouter");
    assert_eq!(config.provider.model, "openai/gpt-5");
    assert_eq!(config.transport.deadline(), None);
    assert_eq!(config.transport.timeout_secs, 600);
    assert_eq!(config.audit.dir(), std::path::PathBuf::from("/tmp/pf-audit"));
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    assert!(load_config(Some(std::path::Path::new("/nonexistent/promptforge.toml"))).is_err());
}

#[test]
fn test_transport_settings_conversion() {
    let config = AppConfig::default();
    let transport = config.transport.to_transport_config();
    assert_eq!(transport.timeout, Duration::from_secs(600));
    assert_eq!(transport.max_attempts, 3);
    assert_eq!(transport.initial_backoff, Duration::from_millis(1000));
    assert_eq!(config.transport.deadline(), Some(Duration::from_secs(1860)));
    assert!(
        config.transport.deadline().unwrap() >= config.transport.to_transport_config().worst_case()
    );
}
