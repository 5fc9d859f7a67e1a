//! HTTP routes
//!
//! A small JSON API over the session controller plus the single page that
//! drives it. Every mutating route answers with the refreshed session view so
//! the page can redraw from one response.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::core::{SessionError, SessionView, StoreError};
use crate::AppState;

const INDEX_HTML: &str = include_str!("../../static/index.html");

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    provider: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct NewChatRequest {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct SwitchChatRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub text: String,
}

/// Error body; carries the session view so the page can show the notice
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    session: SessionView,
}

struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    fn new(err: SessionError, state: &AppState) -> Self {
        let status = match &err {
            SessionError::Store(StoreError::DuplicateTitle(_)) | SessionError::Busy(_) => {
                StatusCode::CONFLICT
            }
            SessionError::Store(StoreError::EmptyTitle) | SessionError::EmptyMessage => {
                StatusCode::BAD_REQUEST
            }
            SessionError::Provider(_) => StatusCode::BAD_GATEWAY,
        };

        Self {
            status,
            body: ErrorResponse {
                error: err.to_string(),
                session: state.controller.view(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        provider: state.provider_name,
    })
}

async fn session(State(state): State<AppState>) -> Json<SessionView> {
    Json(state.controller.view())
}

async fn start_new_chat(
    State(state): State<AppState>,
    Json(request): Json<NewChatRequest>,
) -> Result<Json<SessionView>, ApiError> {
    state
        .controller
        .start_new_chat(&request.title)
        .map_err(|e| ApiError::new(e, &state))?;

    Ok(Json(state.controller.view()))
}

async fn switch_chat(
    State(state): State<AppState>,
    Json(request): Json<SwitchChatRequest>,
) -> Json<SessionView> {
    state.controller.switch_chat(&request.title);
    Json(state.controller.view())
}

async fn clear_current_chat(State(state): State<AppState>) -> Result<Json<SessionView>, ApiError> {
    state
        .controller
        .clear_current_chat()
        .map_err(|e| ApiError::new(e, &state))?;

    Ok(Json(state.controller.view()))
}

async fn send_message(
    State(state): State<AppState>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<SessionView>, ApiError> {
    state
        .controller
        .send_message(&request.text)
        .await
        .map_err(|e| ApiError::new(e, &state))?;

    Ok(Json(state.controller.view()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/session", get(session))
        .route("/api/chats", post(start_new_chat))
        .route("/api/chats/current", put(switch_chat))
        .route("/api/chats/current/messages", delete(clear_current_chat))
        .route("/api/messages", post(send_message))
}
