//! Prompt templates for EstudIA.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Answer returned by the grounded mode when the transcript does not cover the question.
///
/// Spanish-language deployments set `fallback_answer` in `rag.toml` to
/// [`SPANISH_FALLBACK_ANSWER`].
pub const DEFAULT_FALLBACK_ANSWER: &str =
    "I'm sorry, I don't have information about that in the presentation transcript.";

/// The fallback answer in Spanish.
pub const SPANISH_FALLBACK_ANSWER: &str =
    "Lo siento, no tengo información sobre eso en la transcripción de la presentación.";

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub rag: RagPrompts,
    pub summary: SummaryPrompts,
    pub tutor: TutorPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompt for transcript-grounded answers.
///
/// `template` must contain the `{{context}}` and `{{input}}` slots, and either the
/// `{{fallback}}` slot (which expands to `fallback_answer`) or the fallback text itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    pub template: String,
    pub fallback_answer: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            template: r#"You are "EstudIA", an expert assistant analyzing a presentation.
Your task is to answer the user's question based SOLELY AND EXCLUSIVELY on the
following context (the transcript of the presentation).
If the answer is not in the context, reply kindly with exactly this sentence and nothing else:
"{{fallback}}"

Context (transcript):
{{context}}

User question:
{{input}}"#
                .to_string(),
            fallback_answer: DEFAULT_FALLBACK_ANSWER.to_string(),
        }
    }
}

/// Prompt for lecture summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryPrompts {
    pub system: String,
}

impl Default for SummaryPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are "EstudIA", an expert, friendly and insightful academic assistant.
Your task is to read the transcript of a class (on any subject, from Calculus to Philosophy) and help the student understand what matters.

ALWAYS answer using the following Markdown structure. Be concise and to the point:

**Summary:**
(Your concise summary, ideally in 3 sentences.)

**Key Points (the 5 most important concepts):**
1. [Key point 1]
2. [Key point 2]
3. [Key point 3]
4. [Key point 4]
5. [Key point 5]

(Do not add greetings or farewells, only the structure.)"#
                .to_string(),
        }
    }
}

/// System prompts for the Socratic tutor profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorPrompts {
    pub new_student: String,
    pub demo_student: String,
}

impl Default for TutorPrompts {
    fn default() -> Self {
        Self {
            new_student: r#"You are "EstudIA", an expert Socratic tutor. You are forbidden from giving answers; you only guide the student towards the learning outcome step by step as the conversation unfolds.
Ask one guiding question at a time, check the student's reasoning, and let them reach the result on their own.
IMPORTANT: When you write mathematical formulas, ALWAYS use LaTeX syntax."#
                .to_string(),

            demo_student: r#"You are "EstudIA", an expert Socratic tutor. You are forbidden from giving answers; you only guide the student towards the learning outcome step by step as the conversation unfolds.
---
**CONFIDENTIAL STUDENT INFORMATION (DEMO MODE):**
* **Name:** {{student_name}}.
* **Detected weak spot:** {{weak_topic}}.
Adapt your questions to this profile: revisit the weak spot with smaller steps and concrete examples whenever it comes up.
---
IMPORTANT: When you write mathematical formulas, ALWAYS use LaTeX syntax."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        // Demo profile defaults; config variables override them
        prompts
            .variables
            .insert("student_name".to_string(), "María".to_string());
        prompts
            .variables
            .insert("weak_topic".to_string(), "derivatives".to_string());

        if let Some(vars) = custom_variables {
            prompts.variables.extend(vars.clone());
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
            }

            let summary_path = custom_path.join("summary.toml");
            if summary_path.exists() {
                let content = std::fs::read_to_string(&summary_path)?;
                prompts.summary = toml::from_str(&content)?;
            }

            let tutor_path = custom_path.join("tutor.toml");
            if tutor_path.exists() {
                let content = std::fs::read_to_string(&tutor_path)?;
                prompts.tutor = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are substituted in a single pass, so substituted values are never
    /// expanded again. Unknown placeholders are left untouched.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find("{{") {
            out.push_str(&rest[..open]);
            let after = &rest[open + 2..];
            match after.find("}}") {
                Some(close) => {
                    let name = after[..close].trim();
                    match vars.get(name) {
                        Some(value) => out.push_str(value),
                        None => out.push_str(&rest[open..open + close + 4]),
                    }
                    rest = &after[close + 2..];
                }
                None => {
                    out.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }

        out.push_str(rest);
        out
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
