//! HTTP API server for integration with other systems.
//!
//! Exposes the three features as REST endpoints: direct chat, video Q&A,
//! and document Q&A via multipart upload.

use crate::chat::ChatClient;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::error::SvarError;
use crate::orchestrator::Orchestrator;
use crate::rag::RagResponse;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
    chat_client: ChatClient,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Chat) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings.clone())?;
    let prompts = Prompts::load(Some(&settings.prompts.variables))?;
    let chat_client = ChatClient::new(&settings.chat.model).with_prompts(prompts);

    let state = Arc::new(AppState {
        orchestrator,
        chat_client,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/video/index", post(video_index))
        .route("/video/ask", post(video_ask))
        .route("/pdf/ask", post(pdf_ask))
        .route("/sources", get(list_sources))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Svar API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Chat", "POST /chat");
    Output::kv("Index Video", "POST /video/index");
    Output::kv("Ask Video", "POST /video/ask");
    Output::kv("Ask PDF", "POST /pdf/ask (multipart: file, question)");
    Output::kv("List Sources", "GET  /sources");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ChatRequest {
    prompt: String,
}

#[derive(Serialize)]
struct ChatResponse {
    answer: String,
}

#[derive(Deserialize)]
struct VideoIndexRequest {
    /// Full YouTube link
    url: String,
    /// Force rebuilding even if an index already exists
    #[serde(default)]
    force: bool,
}

#[derive(Serialize)]
struct VideoIndexResponse {
    source_id: String,
    chunks_indexed: usize,
    reused: bool,
}

#[derive(Deserialize)]
struct VideoAskRequest {
    url: String,
    question: String,
}

#[derive(Serialize)]
struct AskResponse {
    answer: String,
    sources: Vec<SourceInfo>,
}

#[derive(Serialize)]
struct SourceInfo {
    source_id: String,
    sequence_index: i32,
    score: f32,
    content: String,
}

#[derive(Serialize)]
struct SourceListResponse {
    sources: Vec<SourceSummary>,
    total: usize,
}

#[derive(Serialize)]
struct SourceSummary {
    source_id: String,
    chunk_count: u32,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl From<RagResponse> for AskResponse {
    fn from(response: RagResponse) -> Self {
        Self {
            answer: response.answer,
            sources: response
                .sources
                .into_iter()
                .map(|s| SourceInfo {
                    source_id: s.source_id,
                    sequence_index: s.sequence_index,
                    score: s.score,
                    content: s.content,
                })
                .collect(),
        }
    }
}

/// Map an error to a response with a matching status code.
fn error_response(error: &SvarError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match error {
        SvarError::InvalidSource(_) | SvarError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        SvarError::IndexNotFound(_) | SvarError::SourceUnavailable(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> impl IntoResponse {
    match state.chat_client.complete(&req.prompt).await {
        Ok(answer) => Json(ChatResponse { answer }).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

async fn video_index(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VideoIndexRequest>,
) -> impl IntoResponse {
    match state.orchestrator.index_video(&req.url, req.force).await {
        Ok(result) => Json(VideoIndexResponse {
            source_id: result.source_id,
            chunks_indexed: result.chunks_indexed,
            reused: result.reused,
        })
        .into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

async fn video_ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VideoAskRequest>,
) -> impl IntoResponse {
    match state.orchestrator.ask_video(&req.url, &req.question).await {
        Ok(response) => Json(AskResponse::from(response)).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

/// Document Q&A: a multipart request carrying the PDF bytes in a `file`
/// field and the question in a `question` field. The index built from the
/// upload lives only for this request.
async fn pdf_ask(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut file_name = "document".to_string();
    let mut question: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: format!("Invalid multipart request: {}", e),
                    }),
                )
                    .into_response()
            }
        };

        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("file") => {
                if let Some(name) = field.file_name() {
                    file_name = name.trim_end_matches(".pdf").to_string();
                }
                match field.bytes().await {
                    Ok(bytes) => file_bytes = Some(bytes.to_vec()),
                    Err(e) => {
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(ErrorResponse {
                                error: format!("Failed to read upload: {}", e),
                            }),
                        )
                            .into_response()
                    }
                }
            }
            Some("question") => match field.text().await {
                Ok(text) => question = Some(text),
                Err(e) => {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(ErrorResponse {
                            error: format!("Failed to read question: {}", e),
                        }),
                    )
                        .into_response()
                }
            },
            _ => {}
        }
    }

    let (Some(bytes), Some(question)) = (file_bytes, question) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Both 'file' and 'question' fields are required".to_string(),
            }),
        )
            .into_response();
    };

    let session = match state.orchestrator.load_pdf_bytes(&file_name, &bytes).await {
        Ok(session) => session,
        Err(e) => return error_response(&e).into_response(),
    };

    match session.ask(&question).await {
        Ok(response) => Json(AskResponse::from(response)).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

async fn list_sources(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.orchestrator.list_sources() {
        Ok(sources) => Json(SourceListResponse {
            total: sources.len(),
            sources: sources
                .into_iter()
                .map(|s| SourceSummary {
                    source_id: s.source_id,
                    chunk_count: s.chunk_count,
                })
                .collect(),
        })
        .into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}
