//! Socratic tutoring over a chat history.

use crate::config::Prompts;
use crate::error::{EstudiaError, Result};
use crate::generation::{ChatMessage, Generator};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Which student the tutor is talking to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TutorProfile {
    /// No prior knowledge about the student.
    #[default]
    NewStudent,
    /// A demo student whose name and weak topic are known.
    DemoStudent,
}

impl TutorProfile {
    /// The rendered system prompt for this profile.
    pub fn system_prompt(&self, prompts: &Prompts) -> String {
        let template = match self {
            TutorProfile::NewStudent => &prompts.tutor.new_student,
            TutorProfile::DemoStudent => &prompts.tutor.demo_student,
        };
        prompts.render_with_custom(template, &HashMap::new())
    }
}

impl FromStr for TutorProfile {
    type Err = EstudiaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "new_student" | "new" => Ok(TutorProfile::NewStudent),
            "demo_student" | "demo" => Ok(TutorProfile::DemoStudent),
            _ => Err(EstudiaError::InvalidInput(format!(
                "unknown tutor profile: {} (expected new_student or demo_student)",
                s
            ))),
        }
    }
}

impl fmt::Display for TutorProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TutorProfile::NewStudent => write!(f, "new_student"),
            TutorProfile::DemoStudent => write!(f, "demo_student"),
        }
    }
}

/// A tutor bound to one profile's system prompt.
pub struct Tutor {
    generator: Arc<dyn Generator>,
    system_prompt: String,
    max_history: usize,
}

impl Tutor {
    pub fn new(generator: Arc<dyn Generator>, system_prompt: impl Into<String>, max_history: usize) -> Self {
        Self {
            generator,
            system_prompt: system_prompt.into(),
            max_history,
        }
    }

    /// Create a tutor for `profile` using the configured prompts.
    pub fn for_profile(
        generator: Arc<dyn Generator>,
        profile: TutorProfile,
        prompts: &Prompts,
        max_history: usize,
    ) -> Self {
        Self::new(generator, profile.system_prompt(prompts), max_history)
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Continue the conversation with the student's `input`.
    ///
    /// Only the last `max_history` messages of `history` are sent.
    #[instrument(skip_all, fields(history = history.len()))]
    pub async fn reply(&self, history: &[ChatMessage], input: &str) -> Result<String> {
        if input.trim().is_empty() {
            return Err(EstudiaError::EmptyInput("empty message".to_string()));
        }

        let recent = &history[history.len().saturating_sub(self.max_history)..];
        let mut messages = Vec::with_capacity(recent.len() + 2);
        messages.push(ChatMessage::system(self.system_prompt.clone()));
        messages.extend_from_slice(recent);
        messages.push(ChatMessage::user(input));

        let reply = self.generator.generate(&messages).await?;
        debug!("Tutor replied with {} characters", reply.len());

        Ok(normalize_latex(&reply))
    }
}

/// Rewrite LaTeX bracket delimiters as dollar delimiters.
///
/// `\[`/`\]` become `$$` and `\(`/`\)` become `$`, which Markdown math renderers expect.
pub fn normalize_latex(text: &str) -> String {
    text.replace("\\[", "$$")
        .replace("\\]", "$$")
        .replace("\\(", "$")
        .replace("\\)", "$")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedGenerator {
        seen: Mutex<Vec<ChatMessage>>,
    }

    #[async_trait]
    impl Generator for ScriptedGenerator {
        async fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
            *self.seen.lock().unwrap() = messages.to_vec();
            Ok("What is \\(f'(x)\\) when \\[f(x) = x^2\\]?".to_string())
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    #[test]
    fn test_normalize_latex() {
        assert_eq!(normalize_latex("\\(x^2\\)"), "$x^2$");
        assert_eq!(normalize_latex("\\[\\int_0^1 x\\,dx\\]"), "$$\\int_0^1 x\\,dx$$");
        assert_eq!(normalize_latex("no math"), "no math");
    }

    #[test]
    fn test_demo_profile_renders_student() {
        let prompts = Prompts::load(None, None).unwrap();
        let prompt = TutorProfile::DemoStudent.system_prompt(&prompts);

        assert!(prompt.contains("María"));
        assert!(prompt.contains("derivatives"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_profile_parsing() {
        assert_eq!("demo".parse::<TutorProfile>().unwrap(), TutorProfile::DemoStudent);
        assert_eq!(
            "new-student".parse::<TutorProfile>().unwrap(),
            TutorProfile::NewStudent
        );
        assert!("professor".parse::<TutorProfile>().is_err());
    }

    #[tokio::test]
    async fn test_reply_sends_recent_history() {
        let generator = Arc::new(ScriptedGenerator::default());
        let tutor = Tutor::new(generator.clone(), "Be Socratic.", 2);
        let history = vec![
            ChatMessage::user("first"),
            ChatMessage::assistant("second"),
            ChatMessage::user("third"),
        ];

        let reply = tutor.reply(&history, "help").await.unwrap();
        assert_eq!(reply, "What is $f'(x)$ when $$f(x) = x^2$$?");

        let seen = generator.seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                ChatMessage::system("Be Socratic."),
                ChatMessage::assistant("second"),
                ChatMessage::user("third"),
                ChatMessage::user("help"),
            ]
        );
    }
}
