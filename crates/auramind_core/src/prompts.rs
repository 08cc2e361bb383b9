//! crates/auramind_core/src/prompts.rs
//!
//! Builds the natural-language prompts sent to the model for each task.

/// One entry per content element of a `generateContent` request.
pub type PromptParts = Vec<String>;

/// The three things the tutor asks the model for.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptTask {
    Analyze {
        video_id: String,
    },
    Chat {
        message: String,
        video_id: Option<String>,
        video_type: Option<String>,
        summary: Option<String>,
    },
    Diagram {
        concept: String,
        context: Option<String>,
    },
}

impl PromptTask {
    pub fn name(&self) -> &'static str {
        match self {
            PromptTask::Analyze { .. } => "analyze",
            PromptTask::Chat { .. } => "chat",
            PromptTask::Diagram { .. } => "diagram",
        }
    }
}

const ANALYZE_TEMPLATE: &str = r#"Analyze this YouTube video (ID: {video_id}). Provide:
1. A detailed summary of the video content
2. Key concepts discussed with approximate timestamps
3. Main topics covered

Video URL: https://www.youtube.com/watch?v={video_id}

Format your response as JSON with: summary, concepts (array of {time: number, concept: string}), topics (array of strings)."#;

const TUTOR_PREAMBLE: &str =
    "You are AuraMind, an AI tutor that helps students learn from educational videos. ";

const TUTOR_INSTRUCTIONS: &str = "Answer the user's question based on the video content. Be helpful, clear, and provide specific details when possible.";

const DIAGRAM_INSTRUCTIONS: &str = r#"Provide:
1. A detailed description of what the diagram should show
2. Key elements to include
3. Relationships between elements
4. A prompt that could be used to generate the visual diagram

Format as JSON with: description, elements (array), relationships (array), visualPrompt"#;

pub fn build_prompt(task: &PromptTask) -> PromptParts {
    match task {
        PromptTask::Analyze { video_id } => {
            vec![ANALYZE_TEMPLATE.replace("{video_id}", video_id)]
        }
        PromptTask::Chat {
            message,
            video_id,
            video_type,
            summary,
        } => {
            let mut preamble = String::from(TUTOR_PREAMBLE);
            if let Some(video_id) = non_empty(video_id) {
                let video_type = non_empty(video_type).unwrap_or("video");
                preamble.push_str(&format!(
                    "The user is asking about a {} (ID: {}). ",
                    video_type, video_id
                ));
            }
            if let Some(summary) = non_empty(summary) {
                preamble.push_str(&format!("Video summary: {}\n\n", summary));
            }
            preamble.push_str(TUTOR_INSTRUCTIONS);
            vec![preamble, message.clone()]
        }
        PromptTask::Diagram { concept, context } => {
            let mut prompt = format!(
                "Generate a detailed visual diagram description for this concept: \"{}\"\n\n",
                concept
            );
            if let Some(context) = non_empty(context) {
                prompt.push_str(&format!("Context from video: {}\n\n", context));
            }
            prompt.push_str(DIAGRAM_INSTRUCTIONS);
            vec![prompt]
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
