//! Message handlers: list, get, create, edit, delete.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::MessageContentRequest;
use crate::app_state::AppState;
use crate::auth::AuthenticatedUser;
use crate::domain::{Message, MessageId};
use crate::error::{BoardError, ErrorResponse};
use crate::service::message_service::validate_content;
use crate::sse::handler::stream_messages;

/// Parses a path id. Ids that do not parse cannot name a live message.
fn parse_id(raw: &str) -> Result<MessageId, BoardError> {
    raw.parse()
        .map_err(|_| BoardError::MessageNotFound(raw.to_string()))
}

/// `GET /messages` — All messages, newest-first.
///
/// # Errors
///
/// Returns [`BoardError::Unauthorized`] without a valid identity.
#[utoipa::path(
    get,
    path = "/api/v1/messages",
    tag = "Messages",
    summary = "List messages",
    description = "Returns every live message, newest first.",
    responses(
        (status = 200, description = "Message list", body = Vec<Message>),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
    )
)]
pub async fn list_messages(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, BoardError> {
    Ok(Json(state.message_service.list_messages().await))
}

/// `GET /messages/:id` — A single message.
///
/// # Errors
///
/// Returns [`BoardError::MessageNotFound`] if the message does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/messages/{id}",
    tag = "Messages",
    summary = "Get a message",
    params(
        ("id" = String, Path, description = "Message id"),
    ),
    responses(
        (status = 200, description = "Message", body = Message),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 404, description = "Message not found", body = ErrorResponse),
    )
)]
pub async fn get_message(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, BoardError> {
    let id = parse_id(&id)?;
    Ok(Json(state.message_service.get_message(id).await?))
}

/// `POST /messages` — Post a new message.
///
/// # Errors
///
/// Returns [`BoardError`] on blank content, missing identity, or a
/// backing store failure.
#[utoipa::path(
    post,
    path = "/api/v1/messages",
    tag = "Messages",
    summary = "Post a message",
    description = "Appends a message authored by the caller and broadcasts a `new-message` event.",
    request_body = MessageContentRequest,
    responses(
        (status = 201, description = "Message created", body = Message),
        (status = 400, description = "Blank content or malformed body", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 500, description = "Backing store failure", body = ErrorResponse),
    )
)]
pub async fn create_message(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    body: Result<Json<MessageContentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, BoardError> {
    let Json(req) = body?;
    let message = state
        .message_service
        .create_message(&identity, &req.content)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// `PATCH /messages/:id` — Edit one of the caller's messages.
///
/// # Errors
///
/// Returns [`BoardError`] on blank content, unknown id, foreign
/// ownership, or a backing store failure.
#[utoipa::path(
    patch,
    path = "/api/v1/messages/{id}",
    tag = "Messages",
    summary = "Edit a message",
    description = "Replaces the content of a message owned by the caller and broadcasts an `edit-message` event.",
    params(
        ("id" = String, Path, description = "Message id"),
    ),
    request_body = MessageContentRequest,
    responses(
        (status = 200, description = "Message updated", body = Message),
        (status = 400, description = "Blank content or malformed body", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Caller is not the author", body = ErrorResponse),
        (status = 404, description = "Message not found", body = ErrorResponse),
    )
)]
pub async fn edit_message(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<String>,
    body: Result<Json<MessageContentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, BoardError> {
    let Json(req) = body?;
    validate_content(&req.content)?;
    let id = parse_id(&id)?;
    let message = state
        .message_service
        .edit_message(&identity, id, &req.content)
        .await?;
    Ok(Json(message))
}

/// `DELETE /messages/:id` — Delete one of the caller's messages.
///
/// # Errors
///
/// Returns [`BoardError`] on unknown id, foreign ownership, or a backing
/// store failure.
#[utoipa::path(
    delete,
    path = "/api/v1/messages/{id}",
    tag = "Messages",
    summary = "Delete a message",
    description = "Removes a message owned by the caller and broadcasts a `delete-message` event.",
    params(
        ("id" = String, Path, description = "Message id"),
    ),
    responses(
        (status = 204, description = "Message deleted"),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Caller is not the author", body = ErrorResponse),
        (status = 404, description = "Message not found", body = ErrorResponse),
    )
)]
pub async fn delete_message(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, BoardError> {
    let id = parse_id(&id)?;
    state
        .message_service
        .delete_message(&identity, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Message routes, including the event stream.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/messages", get(list_messages).post(create_message))
        .route("/messages/stream", get(stream_messages))
        .route(
            "/messages/{id}",
            get(get_message).patch(edit_message).delete(delete_message),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparseable_id_is_not_found() {
        let result = parse_id("abc");
        assert!(matches!(result, Err(BoardError::MessageNotFound(raw)) if raw == "abc"));
    }

    #[test]
    fn valid_id_parses() {
        let id = MessageId::new();
        assert_eq!(parse_id(&id.to_string()).ok(), Some(id));
    }
}
