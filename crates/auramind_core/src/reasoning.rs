//! crates/auramind_core/src/reasoning.rs
//!
//! The scripted "thinking" feed. These lines are presentation, not a trace of
//! what the model did; the orchestrator asks for them at fixed points.

use crate::domain::{AnalysisResult, ReasoningKind};

pub type ScriptLine = (ReasoningKind, String);

/// Which kind of request a script belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedTask {
    Analysis,
    Chat,
    Diagram,
}

/// Lines appended before any network work begins.
pub fn on_start(task: ScriptedTask, user_text: Option<&str>) -> Vec<ScriptLine> {
    let line = match task {
        ScriptedTask::Analysis => "YouTube video detected. Initializing analysis...".to_string(),
        ScriptedTask::Chat | ScriptedTask::Diagram => {
            let preview: String = user_text.unwrap_or_default().chars().take(30).collect();
            format!("Processing query: \"{}...\"", preview)
        }
    };
    vec![(ReasoningKind::Thinking, line)]
}

/// Lines appended after a successful exchange, in order.
pub fn on_success(task: ScriptedTask, analysis: Option<&AnalysisResult>) -> Vec<ScriptLine> {
    match task {
        ScriptedTask::Analysis => {
            let insight = match analysis.and_then(|a| a.concepts.as_ref()) {
                Some(concepts) => format!("Found {} key concepts", concepts.len()),
                None => "Video content analyzed successfully".to_string(),
            };
            vec![
                (
                    ReasoningKind::Analyzing,
                    "Video analysis complete. Extracted key concepts...".to_string(),
                ),
                (ReasoningKind::Insight, insight),
                (
                    ReasoningKind::Conclusion,
                    "Ready for interactive tutoring!".to_string(),
                ),
            ]
        }
        ScriptedTask::Chat => vec![
            (
                ReasoningKind::Analyzing,
                "Retrieving relevant context from video...".to_string(),
            ),
            (
                ReasoningKind::Insight,
                "Found relevant information in video content".to_string(),
            ),
            (
                ReasoningKind::Conclusion,
                "Answer ready.".to_string(),
            ),
        ],
        ScriptedTask::Diagram => vec![
            (
                ReasoningKind::Analyzing,
                "Generating visual diagram...".to_string(),
            ),
            (
                ReasoningKind::Insight,
                "Mapped key elements and their relationships".to_string(),
            ),
            (
                ReasoningKind::Conclusion,
                "Diagram added to the gallery.".to_string(),
            ),
        ],
    }
}
