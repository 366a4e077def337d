//! HTTP transport
//!
//! Two endpoints:
//! - `GET /`: static banner with the current pipeline stage
//! - `POST /query`: `{question, user_role}` -> `{question, user_role, answer, sources}`
//!
//! Failures are returned as `{code, detail}` with 503 (not ready), 400 (bad
//! request) or 500 (retrieval/generation failure).

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info_span, warn, Instrument};

use crate::errors::RagError;
use crate::rag::Query;
use crate::service::{PipelineStage, PipelineState};

/// Banner returned by the root endpoint
pub const BANNER: &str = "RBAC RAG API is running. Use the /query endpoint to ask questions.";

/// Handler state shared by all requests
#[derive(Clone)]
pub struct AppState {
    pub pipeline: PipelineState,
    /// Per-request deadline; `None` disables it
    pub request_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(pipeline: PipelineState, request_timeout: Option<Duration>) -> Self {
        Self {
            pipeline,
            request_timeout,
        }
    }
}

/// Inbound query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    pub user_role: String,
}

/// Successful query response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub question: String,
    pub user_role: String,
    pub answer: String,
    /// Newline-joined citation lines; may be empty
    pub sources: String,
}

/// Root endpoint body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoResponse {
    pub message: String,
    pub status: String,
}

/// Error body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub detail: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(info))
        .route("/query", post(query))
        .with_state(state)
}

pub async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    let status = match state.pipeline.stage() {
        PipelineStage::Uninitialized => "starting",
        PipelineStage::Ready => "ready",
        PipelineStage::Failed => "failed",
    };

    Json(InfoResponse {
        message: BANNER.to_string(),
        status: status.to_string(),
    })
}

pub async fn query(
    State(state): State<AppState>,
    req: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(req) = req.map_err(|rejection| {
        json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", rejection.body_text())
    })?;

    let span = info_span!("query", role = %req.user_role);
    let query = Query::new(req.question.clone(), req.user_role.clone());

    let outcome = async {
        match state.request_timeout {
            Some(limit) => tokio::time::timeout(limit, state.pipeline.handle(&query))
                .await
                .unwrap_or_else(|_| {
                    Err(RagError::Timeout {
                        duration_ms: limit.as_millis() as u64,
                    })
                }),
            None => state.pipeline.handle(&query).await,
        }
    }
    .instrument(span)
    .await;

    match outcome {
        Ok(answer) => Ok(Json(QueryResponse {
            question: req.question,
            user_role: req.user_role,
            sources: answer.sources_text(),
            answer: answer.text,
        })),
        Err(err) => {
            warn!(role = %req.user_role, error = %err, "Query failed");
            Err(error_response(&err))
        }
    }
}

/// Map a pipeline error to its HTTP response
pub fn error_response(err: &RagError) -> ApiError {
    let status = StatusCode::from_u16(err.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    json_error(status, error_code(err), err.to_string())
}

fn error_code(err: &RagError) -> &'static str {
    match err {
        RagError::NotReady(_) => "NOT_READY",
        RagError::InvalidQuery(_) => "INVALID_REQUEST",
        RagError::EmbeddingError(_) => "EMBEDDING_FAILED",
        RagError::GenerationError(_) => "GENERATION_FAILED",
        RagError::Timeout { .. } => "TIMEOUT",
        _ => "INTERNAL",
    }
}

fn json_error(status: StatusCode, code: &str, detail: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            code: code.to_string(),
            detail: detail.into(),
        }),
    )
}
