//! Tests for validate module

use super::*;
use crate::transport::{TransportError, TransportErrorKind};
use serde_json::json;

fn ok(body: Value) -> RawResponse {
    RawResponse::new(200, body.to_string())
}

// ============================================================================
// Generic shapes
// ============================================================================

#[test]
fn test_scenario_tools_citations_reasoning_accepted() {
    let raw = ok(json!({
        "tools_invoked": ["web_search"],
        "citations": [{"url": "https://nytimes.com/x"}],
        "reasoning": "step1..."
    }));

    assert_eq!(
        validate_response(&raw),
        ValidationOutcome::Accepted {
            reasoning_text: "step1...".to_string(),
            sources: vec![Source::from_url("https://nytimes.com/x")],
        }
    );
}

#[test]
fn test_scenario_empty_tools_rejected() {
    let raw = ok(json!({"tools_invoked": [], "citations": []}));
    assert_eq!(validate_response(&raw), ValidationOutcome::RejectedNoTool);
}

#[test]
fn test_no_tool_regardless_of_text_length() {
    let long_answer = "A very detailed answer. ".repeat(2000);
    let raw = ok(json!({
        "output_text": long_answer,
        "reasoning": "I thought hard about it."
    }));
    assert_eq!(validate_response(&raw), ValidationOutcome::RejectedNoTool);

    let plain = RawResponse::new(200, "just some text, not json");
    assert_eq!(validate_response(&plain), ValidationOutcome::RejectedNoTool);
}

#[test]
fn test_tool_evidence_without_reasoning() {
    let raw = ok(json!({
        "tools_invoked": ["web_search"],
        "output_text": "The answer is 42."
    }));
    assert_eq!(validate_response(&raw), ValidationOutcome::RejectedNoReasoning);
}

#[test]
fn test_reasoning_equal_to_answer_is_not_reasoning() {
    let raw = ok(json!({
        "grounded": true,
        "output_text": "Paris is the capital.",
        "reasoning": "  Paris is the capital.  "
    }));
    assert_eq!(validate_response(&raw), ValidationOutcome::RejectedNoReasoning);
}

#[test]
fn test_grounded_marker_counts_as_tool_evidence() {
    let raw = ok(json!({"grounded": true, "reasoning": "checked sources"}));
    assert!(validate_response(&raw).is_accepted());

    let raw = ok(json!({"grounded": false, "reasoning": "checked sources"}));
    assert_eq!(validate_response(&raw), ValidationOutcome::RejectedNoTool);
}

#[test]
fn test_validate_is_idempotent() {
    let raw = ok(json!({
        "sources": [{"title": "BBC", "url": "https://bbc.co.uk/a"}],
        "reasoning": "compared two reports"
    }));
    let first = validate_response(&raw);
    let second = validate_response(&raw);
    assert_eq!(first, second);
    assert_eq!(validate(&Ok(raw.clone())), first);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_transport_failure_is_transport_error() {
    let result: SendResult = Err(TransportError::new(
        TransportErrorKind::Timeout,
        "operation timed out",
        3,
    ));
    match validate(&result) {
        ValidationOutcome::TransportError { detail } => {
            assert!(detail.contains("3 attempt"));
            assert!(detail.contains("timed out"));
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[test]
fn test_non_2xx_is_provider_error() {
    let raw = RawResponse::new(
        400,
        json!({"error": {"message": "Tool web_search_preview is not supported", "type": "invalid_request_error"}})
            .to_string(),
    );
    match validate_response(&raw) {
        ValidationOutcome::ProviderError { detail } => {
            assert!(detail.starts_with("HTTP 400"));
            assert!(detail.contains("not supported"));
        }
        other => panic!("expected provider error, got {other:?}"),
    }
}

#[test]
fn test_provider_error_detail_is_sanitized() {
    let raw = RawResponse::new(401, json!({"error": {"message": "Incorrect API key provided: sk-abc"}}).to_string());
    match validate_response(&raw) {
        ValidationOutcome::ProviderError { detail } => assert!(!detail.contains("sk-abc")),
        other => panic!("expected provider error, got {other:?}"),
    }
}

#[test]
fn test_error_object_with_2xx_is_provider_error() {
    let raw = ok(json!({
        "error": {"code": 502, "message": "upstream provider failed"},
        "citations": ["https://example.com"]
    }));
    assert!(matches!(
        validate_response(&raw),
        ValidationOutcome::ProviderError { .. }
    ));
}

#[test]
fn test_null_error_field_is_ignored() {
    let raw = ok(json!({
        "error": null,
        "citations": ["https://example.com/page"],
        "reasoning": "looked it up"
    }));
    assert!(validate_response(&raw).is_accepted());
}

// ============================================================================
// OpenAI Responses
// ============================================================================

#[test]
fn test_openai_responses_shape() {
    let raw = ok(json!({
        "id": "resp_1",
        "object": "response",
        "error": null,
        "reasoning": {"effort": "high", "summary": "auto"},
        "tools": [{"type": "web_search_preview"}],
        "output": [
            {"type": "reasoning", "id": "rs_1", "summary": [
                {"type": "summary_text", "text": "Searched for the latest figures."},
                {"type": "summary_text", "text": "Compared two sources."}
            ]},
            {"type": "web_search_call", "id": "ws_1", "status": "completed",
             "action": {"type": "search", "query": "gdp 2025",
                        "sources": [{"type": "url", "url": "https://imf.org/weo"}]}},
            {"type": "message", "role": "assistant", "content": [
                {"type": "output_text", "text": "GDP grew 3%.", "annotations": [
                    {"type": "url_citation", "url": "https://imf.org/weo", "title": "IMF WEO",
                     "start_index": 0, "end_index": 10},
                    {"type": "url_citation", "url": "https://worldbank.org/x", "title": "World Bank"}
                ]}
            ]}
        ],
        "usage": {"input_tokens": 10, "output_tokens": 20}
    }));

    let evidence = scan(&raw.json().unwrap());
    assert_eq!(evidence.tool_calls, vec!["web_search_call"]);
    assert_eq!(evidence.answer_text(), "GDP grew 3%.");
    assert_eq!(evidence.usage.unwrap().output_tokens, 20);

    match validate_response(&raw) {
        ValidationOutcome::Accepted {
            reasoning_text,
            sources,
        } => {
            assert_eq!(
                reasoning_text,
                "Searched for the latest figures.\n\nCompared two sources."
            );
            let urls: Vec<&str> = sources.iter().map(|s| s.url.as_str()).collect();
            assert_eq!(urls, vec!["https://imf.org/weo", "https://worldbank.org/x"]);
        }
        other => panic!("expected accepted, got {other:?}"),
    }
}

#[test]
fn test_openai_request_echo_is_not_evidence() {
    // tools and reasoning config echoed back, but nothing actually ran
    let raw = ok(json!({
        "reasoning": {"effort": "high", "summary": "auto"},
        "tools": [{"type": "web_search_preview"}],
        "output": [
            {"type": "message", "content": [{"type": "output_text", "text": "From memory.", "annotations": []}]}
        ]
    }));
    assert_eq!(validate_response(&raw), ValidationOutcome::RejectedNoTool);
}

#[test]
fn test_openai_search_without_reasoning_summary() {
    let raw = ok(json!({
        "output": [
            {"type": "reasoning", "summary": []},
            {"type": "web_search_call", "status": "completed"},
            {"type": "message", "content": [{"type": "output_text", "text": "Answer."}]}
        ]
    }));
    assert_eq!(validate_response(&raw), ValidationOutcome::RejectedNoReasoning);
}

#[test]
fn test_openai_failed_search_call_is_no_tool() {
    for status in ["failed", "incomplete", "in_progress"] {
        let raw = ok(json!({
            "output": [
                {"type": "web_search_call", "status": status,
                 "action": {"type": "search", "sources": [{"type": "url", "url": "https://imf.org/weo"}]}},
                {"type": "reasoning", "summary": [{"type": "summary_text", "text": "I will answer from memory."}]},
                {"type": "message", "content": [{"type": "output_text", "text": "Answer from training data."}]}
            ]
        }));
        assert_eq!(
            validate_response(&raw),
            ValidationOutcome::RejectedNoTool,
            "status {status}"
        );
    }

    // status omitted still counts
    let raw = ok(json!({
        "output": [
            {"type": "web_search_call"},
            {"type": "reasoning", "summary": [{"type": "summary_text", "text": "Searched first."}]},
            {"type": "message", "content": [{"type": "output_text", "text": "Answer."}]}
        ]
    }));
    assert!(validate_response(&raw).is_accepted());
}

// ============================================================================
// Chat completions / OpenRouter
// ============================================================================

#[test]
fn test_openrouter_chat_shape() {
    let raw = ok(json!({
        "id": "gen-1",
        "choices": [{
            "message": {
                "role": "assistant",
                "content": "Rates were held.",
                "reasoning": "Checked the central bank statement.",
                "reasoning_details": [
                    {"type": "reasoning.text", "text": "Checked the central bank statement."},
                    {"type": "reasoning.encrypted", "data": "opaque"}
                ],
                "annotations": [
                    {"type": "url_citation", "url_citation": {
                        "url": "https://ecb.europa.eu/press", "title": "ECB press",
                        "content": "The Governing Council decided..."}}
                ]
            }
        }],
        "usage": {"prompt_tokens": 5, "completion_tokens": 7}
    }));

    match validate_response(&raw) {
        ValidationOutcome::Accepted {
            reasoning_text,
            sources,
        } => {
            assert_eq!(reasoning_text, "Checked the central bank statement.");
            assert_eq!(
                sources,
                vec![Source::from_url("https://ecb.europa.eu/press")
                    .with_title("ECB press")
                    .with_snippet("The Governing Council decided...")]
            );
        }
        other => panic!("expected accepted, got {other:?}"),
    }
}

#[test]
fn test_chat_tool_calls_and_string_citations() {
    let raw = ok(json!({
        "citations": ["https://a.example/1", "https://a.example/1", "https://b.example/2"],
        "choices": [{"message": {
            "content": "Done.",
            "reasoning_content": "Used the search tool.",
            "tool_calls": [{"id": "call_1", "type": "function", "function": {"name": "web_search", "arguments": "{}"}}]
        }}]
    }));

    let evidence = scan(&raw.json().unwrap());
    assert_eq!(evidence.tool_calls, vec!["web_search"]);
    assert_eq!(evidence.sources.len(), 2);
    assert!(validate_response(&raw).is_accepted());
}

// ============================================================================
// Gemini
// ============================================================================

#[test]
fn test_gemini_shape() {
    let raw = ok(json!({
        "candidates": [{
            "content": {"role": "model", "parts": [
                {"text": "Looking up the schedule first.", "thought": true},
                {"text": "The launch is "},
                {"text": "on Friday."}
            ]},
            "groundingMetadata": {
                "webSearchQueries": ["launch schedule"],
                "groundingChunks": [
                    {"web": {"uri": "https://vertexaisearch.example/redirect/1", "title": "nasa.gov"}},
                    {"web": {"uri": "https://vertexaisearch.example/redirect/1", "title": "nasa.gov"}}
                ],
                "searchEntryPoint": {"renderedContent": "<div/>"}
            }
        }],
        "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 4}
    }));

    let evidence = scan(&raw.json().unwrap());
    assert_eq!(evidence.answer_text(), "The launch is on Friday.");
    assert_eq!(evidence.tool_calls, vec!["google_search"]);
    assert!(evidence.grounded);

    match validate_response(&raw) {
        ValidationOutcome::Accepted {
            reasoning_text,
            sources,
        } => {
            assert_eq!(reasoning_text, "Looking up the schedule first.");
            assert_eq!(sources.len(), 1);
            assert_eq!(sources[0].title, "nasa.gov");
        }
        other => panic!("expected accepted, got {other:?}"),
    }
}

#[test]
fn test_gemini_without_thoughts_is_no_reasoning() {
    let raw = ok(json!({
        "candidates": [{
            "content": {"parts": [{"text": "Answer only."}]},
            "groundingMetadata": {"webSearchQueries": ["q"]}
        }]
    }));
    assert_eq!(validate_response(&raw), ValidationOutcome::RejectedNoReasoning);
}

#[test]
fn test_gemini_empty_grounding_metadata_is_no_tool() {
    let raw = ok(json!({
        "candidates": [{
            "content": {"parts": [{"text": "thinking", "thought": true}, {"text": "Answer."}]},
            "groundingMetadata": {}
        }]
    }));
    assert_eq!(validate_response(&raw), ValidationOutcome::RejectedNoTool);
}

#[test]
fn test_outcome_tags() {
    assert_eq!(ValidationOutcome::RejectedNoTool.tag().as_str(), "REJECTED_NO_TOOL");
    let json = serde_json::to_value(ValidationOutcome::ProviderError {
        detail: "x".to_string(),
    })
    .unwrap();
    assert_eq!(json["outcome"], "PROVIDER_ERROR");
    assert_eq!(
        serde_json::to_value(OutcomeTag::RejectedNoReasoning).unwrap(),
        "REJECTED_NO_REASONING"
    );
}
