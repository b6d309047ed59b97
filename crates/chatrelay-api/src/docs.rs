use utoipa::OpenApi;

use crate::routes::{chats, health};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        chats::new_chat,
        chats::send_message,
        chats::get_history,
        chats::list_chats,
        chats::rename_chat,
        chats::delete_chat,
    ),
    components(schemas(
        health::HealthResponse,
        chats::NewChatRequest,
        chats::NewChatResponse,
        chats::MessageRequest,
        chats::MessageResponse,
        chats::UrlEntry,
        chats::SessionRequest,
        chats::TurnResponse,
        chats::HistoryResponse,
        chats::ListChatsRequest,
        chats::ListChatsResponse,
        chats::ChatEntry,
        chats::RenameRequest,
        chats::RenameResponse,
        chats::DeleteResponse,
    )),
    tags(
        (name = "chats", description = "Session lifecycle and messaging"),
        (name = "health", description = "Liveness and dependency status")
    )
)]
pub struct ApiDoc;
