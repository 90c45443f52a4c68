//! The grounded-answer prompt.

use crate::config::{Prompts, RagPrompts};
use crate::error::{EstudiaError, Result};
use std::collections::HashMap;

/// Prompt template that restricts answers to the retrieved transcript context.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundedPrompt {
    template: String,
    fallback_answer: String,
}

impl GroundedPrompt {
    /// Create a prompt, requiring the `{{context}}` and `{{input}}` slots.
    ///
    /// The template must also tell the model the fallback reply, either through the
    /// `{{fallback}}` slot or by quoting `fallback_answer` literally.
    pub fn new(template: impl Into<String>, fallback_answer: impl Into<String>) -> Result<Self> {
        let template = template.into();
        let fallback_answer = fallback_answer.into();

        for slot in ["{{context}}", "{{input}}"] {
            if !template.contains(slot) {
                return Err(EstudiaError::Config(format!(
                    "grounded prompt template is missing the {} slot",
                    slot
                )));
            }
        }
        if fallback_answer.trim().is_empty() {
            return Err(EstudiaError::Config(
                "grounded prompt needs a fallback answer".to_string(),
            ));
        }
        if !template.contains("{{fallback}}") && !template.contains(fallback_answer.trim()) {
            return Err(EstudiaError::Config(
                "grounded prompt template must contain the {{fallback}} slot or the fallback answer"
                    .to_string(),
            ));
        }

        Ok(Self {
            template,
            fallback_answer,
        })
    }

    pub fn from_prompts(prompts: &RagPrompts) -> Result<Self> {
        Self::new(prompts.template.clone(), prompts.fallback_answer.clone())
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// The fixed reply for questions the transcript does not answer.
    pub fn fallback_answer(&self) -> &str {
        &self.fallback_answer
    }

    /// Fill the template with retrieved context and the user's question.
    pub fn render(&self, context: &str, input: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), context.to_string());
        vars.insert("input".to_string(), input.to_string());
        vars.insert("fallback".to_string(), self.fallback_answer.clone());
        Prompts::render(&self.template, &vars)
    }

    /// Whether a generated answer is the fallback reply.
    pub fn is_fallback(&self, answer: &str) -> bool {
        let trimmed = answer.trim().trim_matches('"').trim();
        trimmed == self.fallback_answer.trim()
    }
}

impl Default for GroundedPrompt {
    fn default() -> Self {
        let prompts = RagPrompts::default();
        Self {
            template: prompts.template,
            fallback_answer: prompts.fallback_answer,
        }
    }
}
