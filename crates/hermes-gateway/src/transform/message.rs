//! Message shapes.

use async_graphql::ID;

use super::pagination::saturating_i32;
use crate::backend::{BackendMessage, MessagePage, SendMessageRequest, SuccessPayload};
use crate::model::{
    DateTime, Message, MessageDto, MessageHistory, MessageHistoryResponse, MessageResponse,
    SendMessageInput,
};

/// `SendMessageInput` to the backend body.
pub fn send_message_request(input: &SendMessageInput) -> SendMessageRequest {
    SendMessageRequest {
        recipient: input.receiver_username.clone(),
        content: input.content.clone(),
    }
}

/// Backend message to `Message`. `sender` falls back to `senderId`.
pub fn message(m: &BackendMessage) -> Message {
    Message {
        thread_id: m.thread_id.clone().unwrap_or_default(),
        sender: first(&[&m.sender, &m.sender_id, &m.sender_username]),
        content: m.content.clone().unwrap_or_default(),
        timestamp: DateTime::from_json(&m.timestamp),
    }
}

/// Backend message to `MessageDto`.
///
/// Stored messages carry only `sender`, which then stands in for both the
/// sender id and the sender username.
pub fn message_dto(m: &BackendMessage) -> MessageDto {
    MessageDto {
        id: ID(m.id.clone().unwrap_or_default()),
        thread_id: m.thread_id.clone().unwrap_or_default(),
        sender_id: first(&[&m.sender_id, &m.sender]),
        sender_username: first(&[&m.sender_username, &m.sender]),
        content: m.content.clone().unwrap_or_default(),
        timestamp: DateTime::from_json(&m.timestamp),
    }
}

/// History page to `MessageHistory`.
pub fn message_history(page: &MessagePage) -> MessageHistory {
    MessageHistory {
        data: page.data.iter().map(message_dto).collect(),
        total: saturating_i32(page.total),
        limit: saturating_i32(page.limit),
        offset: saturating_i32(page.offset),
    }
}

/// Envelope of `sendMessage`.
pub fn message_response(payload: SuccessPayload<BackendMessage>) -> MessageResponse {
    MessageResponse {
        success: payload.success,
        message: payload.message,
        data: payload.data.as_ref().map(message),
    }
}

/// Envelope of `getMessageHistory`.
pub fn message_history_response(payload: SuccessPayload<MessagePage>) -> MessageHistoryResponse {
    MessageHistoryResponse {
        success: payload.success,
        message: payload.message,
        data: payload.data.as_ref().map(message_history),
    }
}

fn first(candidates: &[&Option<String>]) -> String {
    candidates
        .iter()
        .find_map(|c| c.as_deref().filter(|v| !v.is_empty()))
        .unwrap_or_default()
        .to_string()
}
