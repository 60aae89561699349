//! Provider-agnostic evidence scanning
//!
//! Walks a response body looking for tool calls, citations, grounding markers,
//! reasoning and answer text. Knows the OpenAI Responses, chat completions
//! (OpenAI/OpenRouter), Gemini and a few generic shapes.

use super::Source;
use crate::cost::TokenUsage;
use serde_json::{Map, Value};

/// Everything found in one response body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evidence {
    /// Names of invoked tools
    pub tool_calls: Vec<String>,
    /// De-duplicated sources in first-seen order
    pub sources: Vec<Source>,
    /// Explicit grounding marker present
    pub grounded: bool,
    /// Reasoning segments in document order
    pub reasoning: Vec<String>,
    /// Answer segments in document order
    pub text: Vec<String>,
    /// Token usage, when reported
    pub usage: Option<TokenUsage>,
}

impl Evidence {
    /// A tool call, a source or a grounding marker was found
    pub fn has_tool_evidence(&self) -> bool {
        !self.tool_calls.is_empty() || !self.sources.is_empty() || self.grounded
    }

    /// Answer text, segments separated by blank lines
    pub fn answer_text(&self) -> String {
        self.text.join("\n\n").trim().to_string()
    }

    /// Reasoning text, if non-empty and not just the answer repeated
    pub fn reasoning_text(&self) -> Option<String> {
        let reasoning = self.reasoning.join("\n\n").trim().to_string();
        if reasoning.is_empty() || reasoning == self.answer_text() {
            None
        } else {
            Some(reasoning)
        }
    }

    fn push_tool(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() {
            self.tool_calls.push(name.to_string());
        }
    }

    fn push_reasoning(&mut self, text: &str) {
        let text = text.trim();
        // chat replies often carry the same text in `reasoning` and `reasoning_details`
        if !text.is_empty() && !self.reasoning.iter().any(|r| r == text) {
            self.reasoning.push(text.to_string());
        }
    }

    fn push_text(&mut self, text: &str) {
        if !text.trim().is_empty() {
            self.text.push(text.trim().to_string());
        }
    }

    fn push_source(&mut self, source: Source) {
        let url = source.url.trim();
        let title = source.title.trim();
        if url.is_empty() && title.is_empty() {
            return;
        }
        let duplicate = self.sources.iter().any(|s| {
            if url.is_empty() {
                s.url.is_empty() && s.title == title
            } else {
                s.url == url
            }
        });
        if !duplicate {
            self.sources.push(Source {
                title: title.to_string(),
                url: url.to_string(),
                snippet: source.snippet.trim().to_string(),
            });
        }
    }

    fn push_sources(&mut self, list: Option<&Value>) {
        for item in list.and_then(Value::as_array).into_iter().flatten() {
            if let Some(source) = source_from(item) {
                self.push_source(source);
            }
        }
    }
}

/// Scan a response body
#[must_use]
pub fn scan(root: &Value) -> Evidence {
    let mut evidence = Evidence::default();
    match root {
        Value::Object(obj) => scan_object(obj, &mut evidence),
        Value::Array(items) => {
            for obj in items.iter().filter_map(Value::as_object) {
                scan_object(obj, &mut evidence);
            }
        }
        _ => {}
    }
    evidence
}

fn scan_object(obj: &Map<String, Value>, ev: &mut Evidence) {
    // OpenAI Responses
    match obj.get("output") {
        Some(Value::Array(items)) => {
            for item in items.iter().filter_map(Value::as_object) {
                scan_output_item(item, ev);
            }
        }
        Some(Value::String(text)) => ev.push_text(text),
        _ => {}
    }

    // Chat completions
    for choice in array(obj.get("choices")) {
        if let Some(message) = choice
            .get("message")
            .or_else(|| choice.get("delta"))
            .and_then(Value::as_object)
        {
            scan_chat_message(message, ev);
        }
    }

    // Gemini
    for candidate in array(obj.get("candidates")).filter_map(Value::as_object) {
        scan_candidate(candidate, ev);
    }

    // Generic shapes
    for tool in array(obj.get("tools_invoked")) {
        match tool {
            Value::String(name) => ev.push_tool(name),
            Value::Object(map) => ev.push_tool(&tool_name(map)),
            _ => {}
        }
    }
    scan_tool_calls(obj.get("tool_calls"), ev);
    ev.push_sources(obj.get("citations"));
    ev.push_sources(obj.get("sources"));
    ev.push_sources(obj.get("search_results"));
    if obj.get("grounded").and_then(Value::as_bool) == Some(true) {
        ev.grounded = true;
    }
    if let Some(metadata) = obj
        .get("groundingMetadata")
        .or_else(|| obj.get("grounding_metadata"))
        .and_then(Value::as_object)
    {
        scan_grounding_metadata(metadata, ev);
    }

    match obj.get("reasoning") {
        Some(Value::String(text)) => ev.push_reasoning(text),
        // Responses echo the request config here ({"effort", "summary": "auto"})
        Some(Value::Object(map)) => scan_reasoning_object(map, ev),
        Some(Value::Array(items)) => {
            for item in items {
                match item {
                    Value::String(text) => ev.push_reasoning(text),
                    Value::Object(map) => scan_reasoning_object(map, ev),
                    _ => {}
                }
            }
        }
        _ => {}
    }
    for key in ["reasoning_text", "reasoning_content", "explanation", "thinking"] {
        if let Some(text) = obj.get(key).and_then(Value::as_str) {
            ev.push_reasoning(text);
        }
    }

    // Convenience text fields duplicate structured content when both exist
    if ev.text.is_empty() {
        for key in ["output_text", "text", "answer", "content"] {
            if let Some(text) = obj.get(key).and_then(Value::as_str) {
                ev.push_text(text);
                break;
            }
        }
    }

    if ev.usage.is_none() {
        ev.usage = TokenUsage::from_response(obj);
    }
}

fn scan_output_item(item: &Map<String, Value>, ev: &mut Evidence) {
    let item_type = item.get("type").and_then(Value::as_str).unwrap_or_default();

    let is_call = item_type.ends_with("_call") || item_type.contains("web_search");
    // a failed or incomplete call proves nothing was retrieved
    if is_call && !call_completed(item) {
        return;
    }

    match item_type {
        t if t.contains("web_search") || t.ends_with("search_call") => {
            ev.push_tool(t);
            if let Some(action) = item.get("action").and_then(Value::as_object) {
                ev.push_sources(action.get("sources"));
            }
        }
        "function_call" | "tool_call" | "mcp_call" | "code_interpreter_call" | "computer_call" => {
            ev.push_tool(&tool_name(item));
        }
        "reasoning" => {
            for part in array(item.get("summary")).chain(array(item.get("content"))) {
                match part {
                    Value::String(text) => ev.push_reasoning(text),
                    Value::Object(map) => {
                        if let Some(text) = map.get("text").and_then(Value::as_str) {
                            ev.push_reasoning(text);
                        }
                    }
                    _ => {}
                }
            }
        }
        "message" => {
            let mut segment = String::new();
            for part in array(item.get("content")).filter_map(Value::as_object) {
                let part_type = part.get("type").and_then(Value::as_str).unwrap_or_default();
                let text = part.get("text").and_then(Value::as_str).unwrap_or_default();
                match part_type {
                    "reasoning" | "explanation" | "analysis" => ev.push_reasoning(text),
                    _ => segment.push_str(text),
                }
                for annotation in array(part.get("annotations")) {
                    if let Some(source) = source_from(annotation) {
                        ev.push_source(source);
                    }
                }
            }
            ev.push_text(&segment);
        }
        _ => {
            if let Some(text) = item.get("text").and_then(Value::as_str) {
                ev.push_text(text);
            }
        }
    }
}

fn scan_chat_message(message: &Map<String, Value>, ev: &mut Evidence) {
    match message.get("content") {
        Some(Value::String(text)) => ev.push_text(text),
        Some(Value::Array(parts)) => {
            let segment: String = parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect();
            ev.push_text(&segment);
        }
        _ => {}
    }

    for key in ["reasoning", "reasoning_content"] {
        if let Some(text) = message.get(key).and_then(Value::as_str) {
            ev.push_reasoning(text);
        }
    }
    for detail in array(message.get("reasoning_details")).filter_map(Value::as_object) {
        for key in ["text", "summary"] {
            if let Some(text) = detail.get(key).and_then(Value::as_str) {
                ev.push_reasoning(text);
            }
        }
    }

    for annotation in array(message.get("annotations")) {
        if let Some(source) = source_from(annotation) {
            ev.push_source(source);
        }
    }
    scan_tool_calls(message.get("tool_calls"), ev);
}

fn scan_candidate(candidate: &Map<String, Value>, ev: &mut Evidence) {
    let mut segment = String::new();
    let parts = candidate
        .get("content")
        .and_then(|c| c.get("parts"));
    for part in array(parts).filter_map(Value::as_object) {
        let text = part.get("text").and_then(Value::as_str).unwrap_or_default();
        if part.get("thought").and_then(Value::as_bool) == Some(true) {
            ev.push_reasoning(text);
        } else {
            segment.push_str(text);
        }
        if let Some(call) = part.get("functionCall").and_then(Value::as_object) {
            ev.push_tool(&tool_name(call));
        }
    }
    ev.push_text(&segment);

    if let Some(metadata) = candidate
        .get("groundingMetadata")
        .and_then(Value::as_object)
    {
        scan_grounding_metadata(metadata, ev);
    }
    if let Some(citations) = candidate.get("citationMetadata") {
        ev.push_sources(citations.get("citations"));
        ev.push_sources(citations.get("citationSources"));
    }
}

fn scan_grounding_metadata(metadata: &Map<String, Value>, ev: &mut Evidence) {
    let searched = array(metadata.get("webSearchQueries"))
        .any(|q| q.as_str().is_some_and(|q| !q.trim().is_empty()));
    if searched {
        ev.push_tool("google_search");
    }
    for chunk in array(metadata.get("groundingChunks")) {
        let inner = chunk
            .get("web")
            .or_else(|| chunk.get("retrievedContext"))
            .unwrap_or(chunk);
        if let Some(source) = source_from(inner) {
            ev.push_source(source);
        }
    }
    if metadata.get("searchEntryPoint").is_some_and(|v| !v.is_null())
        || array(metadata.get("groundingSupports")).next().is_some()
    {
        ev.grounded = true;
    }
}

fn scan_reasoning_object(map: &Map<String, Value>, ev: &mut Evidence) {
    for key in ["text", "content"] {
        if let Some(text) = map.get(key).and_then(Value::as_str) {
            ev.push_reasoning(text);
        }
    }
    for part in array(map.get("summary")) {
        match part {
            Value::String(text) => ev.push_reasoning(text),
            Value::Object(inner) => {
                if let Some(text) = inner.get("text").and_then(Value::as_str) {
                    ev.push_reasoning(text);
                }
            }
            _ => {}
        }
    }
}

fn scan_tool_calls(calls: Option<&Value>, ev: &mut Evidence) {
    for call in array(calls).filter_map(Value::as_object) {
        ev.push_tool(&tool_name(call));
        if let Some(output) = call.get("output").and_then(Value::as_object) {
            for list in output.values().filter(|v| v.is_array()) {
                ev.push_sources(Some(list));
            }
        }
        ev.push_sources(call.get("results"));
    }
}

/// Status is absent or `completed`
fn call_completed(item: &Map<String, Value>) -> bool {
    item.get("status")
        .and_then(Value::as_str)
        .is_none_or(|status| status == "completed")
}

fn tool_name(map: &Map<String, Value>) -> String {
    map.get("function")
        .and_then(|f| f.get("name"))
        .or_else(|| map.get("name"))
        .or_else(|| map.get("type"))
        .and_then(Value::as_str)
        .unwrap_or("tool")
        .to_string()
}

/// Read a citation in any of the known shapes
fn source_from(value: &Value) -> Option<Source> {
    match value {
        Value::String(s) if s.contains("://") => Some(Source::from_url(s.trim())),
        Value::String(s) if !s.trim().is_empty() => Some(Source::default().with_title(s.trim())),
        Value::Object(map) => {
            // chat annotations nest the citation: {"type":"url_citation","url_citation":{...}}
            if let Some(inner) = map.get("url_citation").filter(|v| v.is_object()) {
                return source_from(inner);
            }
            let field = |keys: &[&str]| {
                keys.iter()
                    .find_map(|k| map.get(*k).and_then(Value::as_str))
                    .unwrap_or_default()
                    .to_string()
            };
            let source = Source {
                url: field(&["url", "uri", "link", "href"]),
                title: field(&["title", "name"]),
                snippet: field(&["snippet", "content", "text", "description"]),
            };
            (!source.url.is_empty() || !source.title.is_empty()).then_some(source)
        }
        _ => None,
    }
}

fn array(value: Option<&Value>) -> impl Iterator<Item = &Value> {
    value.and_then(Value::as_array).into_iter().flatten()
}
