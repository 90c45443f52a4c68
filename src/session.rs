//! Per-user study sessions.

use crate::document::Document;
use crate::error::{EstudiaError, Result};
use crate::generation::{ChatMessage, Role};
use crate::tutor::TutorProfile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// The chat a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatMode {
    /// Socratic tutor, new student profile.
    NewStudent,
    /// Socratic tutor, demo student profile.
    DemoStudent,
    /// Answers grounded on the session transcript.
    Transcript,
}

impl ChatMode {
    /// The tutor profile for tutoring modes.
    pub fn tutor_profile(&self) -> Option<TutorProfile> {
        match self {
            ChatMode::NewStudent => Some(TutorProfile::NewStudent),
            ChatMode::DemoStudent => Some(TutorProfile::DemoStudent),
            ChatMode::Transcript => None,
        }
    }
}

impl From<TutorProfile> for ChatMode {
    fn from(profile: TutorProfile) -> Self {
        match profile {
            TutorProfile::NewStudent => ChatMode::NewStudent,
            TutorProfile::DemoStudent => ChatMode::DemoStudent,
        }
    }
}

impl FromStr for ChatMode {
    type Err = EstudiaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "transcript" | "rag" => Ok(ChatMode::Transcript),
            other => other
                .parse::<TutorProfile>()
                .map(ChatMode::from)
                .map_err(|_| EstudiaError::InvalidInput(format!("unknown chat mode: {}", s))),
        }
    }
}

impl fmt::Display for ChatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatMode::NewStudent => write!(f, "new_student"),
            ChatMode::DemoStudent => write!(f, "demo_student"),
            ChatMode::Transcript => write!(f, "transcript"),
        }
    }
}

/// One message in a session's chat history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            at: Utc::now(),
        }
    }
}

impl From<&ConversationTurn> for ChatMessage {
    fn from(turn: &ConversationTurn) -> Self {
        ChatMessage {
            role: turn.role,
            content: turn.content.clone(),
        }
    }
}

/// State of one study session.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    document: Option<Document>,
    /// Bumped on every `set_document`.
    document_version: u64,
    summary: Option<String>,
    histories: HashMap<ChatMode, Vec<ConversationTurn>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            document: None,
            document_version: 0,
            summary: None,
            histories: HashMap::new(),
        }
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// The session transcript, required by the transcript chat mode.
    pub fn require_document(&self) -> Result<&Document> {
        self.document.as_ref().ok_or_else(|| {
            EstudiaError::InvalidInput("upload a recording or transcript first".to_string())
        })
    }

    /// A copy of the transcript and its version, for work done without the session lock.
    ///
    /// Pass the version back to [`Session::record_transcript_exchange`].
    pub fn document_snapshot(&self) -> Result<(Document, u64)> {
        Ok((self.require_document()?.clone(), self.document_version))
    }

    pub fn document_version(&self) -> u64 {
        self.document_version
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Replace the session transcript.
    ///
    /// The transcript chat refers to the old document, so its history is cleared.
    pub fn set_document(&mut self, document: Document, summary: Option<String>) {
        self.document = Some(document);
        self.document_version += 1;
        self.summary = summary;
        self.histories.remove(&ChatMode::Transcript);
    }

    pub fn history(&self, mode: ChatMode) -> &[ConversationTurn] {
        self.histories.get(&mode).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The history of `mode` as generator messages.
    pub fn messages(&self, mode: ChatMode) -> Vec<ChatMessage> {
        self.history(mode).iter().map(ChatMessage::from).collect()
    }

    /// Append a question and its reply to the history of `mode`.
    pub fn record_exchange(&mut self, mode: ChatMode, question: &str, reply: &str) {
        let history = self.histories.entry(mode).or_default();
        history.push(ConversationTurn::new(Role::User, question));
        history.push(ConversationTurn::new(Role::Assistant, reply));
    }

    /// Record a transcript-mode exchange answered from version `version` of the transcript.
    ///
    /// Nothing is recorded if the transcript has been replaced since.
    pub fn record_transcript_exchange(
        &mut self,
        version: u64,
        question: &str,
        reply: &str,
    ) -> Result<()> {
        if version != self.document_version {
            return Err(EstudiaError::DocumentChanged(
                "the transcript was replaced while the answer was generated".to_string(),
            ));
        }
        self.record_exchange(ChatMode::Transcript, question, reply);
        Ok(())
    }
}

/// Sessions of the HTTP server, isolated by id.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty session and return its id.
    pub async fn create(&self) -> Uuid {
        let session = Session::new();
        let id = session.id;
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(session)));
        id
    }

    pub async fn get(&self, id: Uuid) -> Result<Arc<Mutex<Session>>> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| EstudiaError::SessionNotFound(id.to_string()))
    }

    pub async fn remove(&self, id: Uuid) -> Result<()> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| EstudiaError::SessionNotFound(id.to_string()))
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
