//! HTTP API server for integration with other systems.
//!
//! Provides per-session REST endpoints for uploading lectures, grounded questions and
//! Socratic tutoring.

use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::document::Document;
use crate::error::EstudiaError;
use crate::orchestrator::Orchestrator;
use crate::session::{ChatMode, ConversationTurn, SessionStore};
use crate::tutor::TutorProfile;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use uuid::Uuid;

/// Shared application state.
pub struct AppState {
    orchestrator: Orchestrator,
    sessions: SessionStore,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            sessions: SessionStore::new(),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    // Slightly above the upload limit so oversized recordings get a descriptive error
    let body_limit = state.orchestrator.settings().transcription.max_upload_bytes + 1024 * 1024;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", delete(delete_session))
        .route("/sessions/{id}/document", put(set_document))
        .route("/sessions/{id}/recording", post(upload_recording))
        .route("/sessions/{id}/ask", post(ask))
        .route("/sessions/{id}/tutor", post(tutor))
        .route("/sessions/{id}/history/{mode}", get(history))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    let orchestrator = super::start(Operation::Serve, settings)?;
    let app = router(Arc::new(AppState::new(orchestrator)));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    Output::header("EstudIA API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET    /health");
    Output::kv("New session", "POST   /sessions");
    Output::kv("End session", "DELETE /sessions/{id}");
    Output::kv("Set transcript", "PUT    /sessions/{id}/document");
    Output::kv("Upload recording", "POST   /sessions/{id}/recording?filename=...");
    Output::kv("Ask (transcript)", "POST   /sessions/{id}/ask");
    Output::kv("Tutor", "POST   /sessions/{id}/tutor");
    Output::kv("History", "GET    /sessions/{id}/history/{mode}");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Errors ===

/// An [`EstudiaError`] rendered as a JSON error response.
struct ApiError(EstudiaError);

impl From<EstudiaError> for ApiError {
    fn from(err: EstudiaError) -> Self {
        Self(err)
    }
}

/// HTTP status for a failed request.
pub fn status_for(err: &EstudiaError) -> StatusCode {
    match err.root_cause() {
        EstudiaError::Config(_) | EstudiaError::EmptyInput(_) | EstudiaError::InvalidInput(_) => {
            StatusCode::BAD_REQUEST
        }
        EstudiaError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        EstudiaError::DocumentChanged(_) => StatusCode::CONFLICT,
        EstudiaError::Provider(_) | EstudiaError::Http(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            warn!("Request failed: {}", self.0);
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

// === Request/Response Types ===

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct SessionCreated {
    id: Uuid,
}

#[derive(Deserialize)]
struct DocumentRequest {
    text: String,
    #[serde(default)]
    source: Option<String>,
    /// Generate a summary of the transcript.
    #[serde(default)]
    summarize: bool,
}

#[derive(Serialize)]
struct DocumentResponse {
    characters: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
}

#[derive(Deserialize)]
struct RecordingQuery {
    filename: String,
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
}

#[derive(Serialize)]
struct AskResponse {
    answer: String,
    not_found: bool,
    sources: Vec<SourceInfo>,
}

#[derive(Serialize)]
struct SourceInfo {
    chunk: usize,
    start: usize,
    end: usize,
    distance: f32,
    content: String,
}

#[derive(Deserialize)]
struct TutorRequest {
    message: String,
    #[serde(default)]
    profile: TutorProfile,
}

#[derive(Serialize)]
struct ReplyResponse {
    reply: String,
}

#[derive(Serialize)]
struct HistoryResponse {
    mode: ChatMode,
    turns: Vec<ConversationTurn>,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let id = state.sessions.create().await;
    (StatusCode::CREATED, Json(SessionCreated { id }))
}

async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<DocumentRequest>,
) -> ApiResult<Json<DocumentResponse>> {
    let session = state.sessions.get(id).await?;

    let mut document = Document::new(req.text);
    if let Some(source) = req.source {
        document = document.with_source(source);
    }
    if document.is_blank() {
        return Err(EstudiaError::EmptyInput("transcript text is empty".to_string()).into());
    }

    let summary = if req.summarize {
        Some(state.orchestrator.summarize(&document).await?)
    } else {
        None
    };

    let characters = document.char_len();
    session.lock().await.set_document(document, summary.clone());

    Ok(Json(DocumentResponse {
        characters,
        summary,
    }))
}

async fn upload_recording(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<RecordingQuery>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> ApiResult<Json<DocumentResponse>> {
    let body = body.map_err(|rejection| {
        EstudiaError::InvalidInput(format!("could not read {}: {}", query.filename, rejection))
    })?;
    let session = state.sessions.get(id).await?;

    let lecture = state
        .orchestrator
        .process_recording(body.to_vec(), &query.filename)
        .await?;

    let characters = lecture.document.char_len();
    session
        .lock()
        .await
        .set_document(lecture.document, lecture.summary.clone());

    Ok(Json(DocumentResponse {
        characters,
        summary: lecture.summary,
    }))
}

async fn ask(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<AskRequest>,
) -> ApiResult<Json<AskResponse>> {
    let session = state.sessions.get(id).await?;
    let (document, version) = session.lock().await.document_snapshot()?;

    let response = state.orchestrator.ask(&document, &req.question).await?;

    session
        .lock()
        .await
        .record_transcript_exchange(version, &req.question, &response.answer)?;

    Ok(Json(AskResponse {
        answer: response.answer,
        not_found: response.not_found,
        sources: response
            .sources
            .into_iter()
            .map(|s| SourceInfo {
                chunk: s.chunk.index,
                start: s.chunk.start,
                end: s.chunk.end,
                distance: s.distance,
                content: s.chunk.text,
            })
            .collect(),
    }))
}

async fn tutor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<TutorRequest>,
) -> ApiResult<Json<ReplyResponse>> {
    let session = state.sessions.get(id).await?;
    let mode = ChatMode::from(req.profile);
    let history = session.lock().await.messages(mode);

    let reply = state
        .orchestrator
        .tutor_reply(req.profile, &history, &req.message)
        .await?;

    session
        .lock()
        .await
        .record_exchange(mode, &req.message, &reply);

    Ok(Json(ReplyResponse { reply }))
}

async fn history(
    State(state): State<Arc<AppState>>,
    Path((id, mode)): Path<(Uuid, String)>,
) -> ApiResult<Json<HistoryResponse>> {
    let mode: ChatMode = mode.parse()?;
    let session = state.sessions.get(id).await?;
    let turns = session.lock().await.history(mode).to_vec();

    Ok(Json(HistoryResponse { mode, turns }))
}
