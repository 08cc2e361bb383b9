//! crates/auramind_core/src/interpret.rs
//!
//! Best-effort decoding of structured data embedded in free-text model replies.

use crate::domain::{AnalysisResult, Concept, DiagramResult};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// First `{` through the last `}`, across newlines.
static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("JSON object pattern is valid"));

/// Outcome of looking for a JSON object in a reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Interpreted {
    Decoded(Map<String, Value>),
    Fallback(String),
}

pub fn extract_json(raw: &str) -> Interpreted {
    let decoded = JSON_OBJECT
        .find(raw)
        .and_then(|m| serde_json::from_str::<Value>(m.as_str()).ok());

    match decoded {
        Some(Value::Object(fields)) => Interpreted::Decoded(fields),
        _ => Interpreted::Fallback(raw.to_string()),
    }
}

pub fn interpret_analysis(raw: &str) -> AnalysisResult {
    match extract_json(raw) {
        Interpreted::Decoded(fields) => AnalysisResult {
            summary: string_field(&fields, "summary"),
            concepts: fields.get("concepts").and_then(Value::as_array).map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        Some(Concept {
                            time: item.get("time")?.as_f64()?,
                            concept: item.get("concept")?.as_str()?.to_string(),
                        })
                    })
                    .collect()
            }),
            topics: string_list(&fields, "topics"),
        },
        Interpreted::Fallback(text) => AnalysisResult {
            summary: Some(text),
            ..Default::default()
        },
    }
}

pub fn interpret_diagram(raw: &str) -> DiagramResult {
    match extract_json(raw) {
        Interpreted::Decoded(fields) => DiagramResult {
            description: string_field(&fields, "description"),
            elements: string_list(&fields, "elements"),
            relationships: string_list(&fields, "relationships"),
            visual_prompt: string_field(&fields, "visualPrompt"),
        },
        Interpreted::Fallback(text) => DiagramResult {
            description: Some(text),
            ..Default::default()
        },
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Models sometimes return objects where strings were asked for; those are kept as compact JSON.
fn string_list(fields: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    fields.get(key).and_then(Value::as_array).map(|items| {
        items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Object(_) => Some(item.to_string()),
                _ => None,
            })
            .collect()
    })
}
