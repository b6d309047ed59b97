use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use chatrelay_persist::{Sender, SessionSummary, Turn};
use crate::{error::ApiResult, state::AppState};

// Missing fields deserialize as empty and are rejected by the relay's own
// validation, so every request error surfaces as the same 400 body.

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewChatRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewChatResponse {
    pub success: bool,
    pub session_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UrlEntry {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub success: bool,
    pub response: String,
    pub title: String,
    pub urls: Vec<UrlEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Present only when the reply could not be saved to history
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub session_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TurnResponse {
    #[schema(value_type = String, example = "user")]
    pub sender: Sender,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl From<Turn> for TurnResponse {
    fn from(turn: Turn) -> Self {
        Self {
            sender: turn.sender,
            message: turn.message,
            timestamp: turn.timestamp,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryResponse {
    pub success: bool,
    pub conversation: Vec<TurnResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListChatsRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub offset: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatEntry {
    pub session_id: String,
    pub title: String,
}

impl From<SessionSummary> for ChatEntry {
    fn from(summary: SessionSummary) -> Self {
        Self {
            session_id: summary.session_id,
            title: summary.title,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListChatsResponse {
    pub success: bool,
    pub chat_list: Vec<ChatEntry>,
    /// Offset of the next page
    pub offset: u64,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RenameResponse {
    pub success: bool,
    pub title: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub success: bool,
    pub session_id: String,
}

/// Create a new chat session
///
/// Checks that the generation backend is reachable first; the first message
/// is sent by a follow-up call to `/api/message`.
#[utoipa::path(
    post,
    path = "/api/new",
    request_body = NewChatRequest,
    responses(
        (status = 201, description = "Session created", body = NewChatResponse),
        (status = 400, description = "Missing userId"),
        (status = 503, description = "Generation backend unavailable")
    ),
    tag = "chats"
)]
pub async fn new_chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewChatRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<NewChatResponse>)> {
    let Json(req) = payload?;
    let created = state.relay.create_session(&req.user_id, &req.message).await?;

    Ok((
        StatusCode::CREATED,
        Json(NewChatResponse {
            success: true,
            session_id: created.session_id,
        }),
    ))
}

/// Send a message and receive the generated reply
#[utoipa::path(
    post,
    path = "/api/message",
    request_body = MessageRequest,
    responses(
        (status = 200, description = "Generated reply", body = MessageResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Session not found"),
        (status = 503, description = "Generation backend unavailable, do not retry now"),
        (status = 500, description = "Generation or storage failure, safe to regenerate")
    ),
    tag = "chats"
)]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MessageRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(req) = payload?;
    let outcome = state
        .relay
        .add_message(&req.user_id, &req.session_id, &req.message)
        .await?;

    Ok(Json(MessageResponse {
        success: true,
        response: outcome.response,
        title: outcome.title,
        urls: outcome
            .urls
            .into_iter()
            .map(|link| UrlEntry { name: link.name, url: link.url })
            .collect(),
        context: outcome.context,
        warning: outcome.warning,
    }))
}

/// Get the ordered conversation of a session
#[utoipa::path(
    post,
    path = "/api/history",
    request_body = SessionRequest,
    responses(
        (status = 200, description = "Conversation history", body = HistoryResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Session not found")
    ),
    tag = "chats"
)]
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SessionRequest>, JsonRejection>,
) -> ApiResult<Json<HistoryResponse>> {
    let Json(req) = payload?;
    let conversation = state.relay.get_history(&req.user_id, &req.session_id).await?;

    Ok(Json(HistoryResponse {
        success: true,
        conversation: conversation.into_iter().map(TurnResponse::from).collect(),
    }))
}

/// List a user's sessions, ten per page, most recently active first
#[utoipa::path(
    post,
    path = "/api/chats",
    request_body = ListChatsRequest,
    responses(
        (status = 200, description = "One page of sessions", body = ListChatsResponse),
        (status = 400, description = "Invalid request")
    ),
    tag = "chats"
)]
pub async fn list_chats(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ListChatsRequest>, JsonRejection>,
) -> ApiResult<Json<ListChatsResponse>> {
    let Json(req) = payload?;
    let page = state.listing.list_chats(&req.user_id, req.offset).await?;

    Ok(Json(ListChatsResponse {
        success: true,
        chat_list: page.chats.into_iter().map(ChatEntry::from).collect(),
        offset: page.next_offset,
    }))
}

/// Rename a session; the title is then locked against generated titles
#[utoipa::path(
    post,
    path = "/api/title",
    request_body = RenameRequest,
    responses(
        (status = 200, description = "Session renamed", body = RenameResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Session not found")
    ),
    tag = "chats"
)]
pub async fn rename_chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RenameRequest>, JsonRejection>,
) -> ApiResult<Json<RenameResponse>> {
    let Json(req) = payload?;
    let title = state
        .listing
        .rename_chat(&req.user_id, &req.session_id, &req.title)
        .await?;

    Ok(Json(RenameResponse { success: true, title }))
}

/// Permanently delete a session
#[utoipa::path(
    post,
    path = "/api/delete",
    request_body = SessionRequest,
    responses(
        (status = 200, description = "Session deleted", body = DeleteResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Session not found")
    ),
    tag = "chats"
)]
pub async fn delete_chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SessionRequest>, JsonRejection>,
) -> ApiResult<Json<DeleteResponse>> {
    let Json(req) = payload?;
    let session_id = state.listing.delete_chat(&req.user_id, &req.session_id).await?;

    Ok(Json(DeleteResponse { success: true, session_id }))
}
