//! Axum handler for the message event stream.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use futures_util::{Stream, StreamExt};

use crate::app_state::AppState;
use crate::auth::AuthenticatedUser;
use crate::domain::Frame;
use crate::error::{BoardError, ErrorResponse};

/// Comment text of keep-alive frames (`: ping`).
pub const KEEP_ALIVE_COMMENT: &str = "ping";

/// `GET /messages/stream` — Subscribe to live board changes.
///
/// The first event is always `initial`; `new-message`, `edit-message`
/// and `delete-message` follow as they happen, interleaved with `: ping`
/// comments. Dropping the connection deregisters the subscriber.
///
/// # Errors
///
/// Returns [`BoardError::Unauthorized`] without a valid identity.
#[utoipa::path(
    get,
    path = "/api/v1/messages/stream",
    tag = "Messages",
    summary = "Live message stream",
    description = "Server-sent event stream. Each data frame is a JSON envelope with a `type` field; comment frames are keep-alives.",
    responses(
        (status = 200, description = "Event stream", content_type = "text/event-stream", body = String),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
    )
)]
pub async fn stream_messages(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, BoardError> {
    let subscription = state.message_service.subscribe().await?;
    tracing::debug!(
        subscriber_id = %subscription.id(),
        user_id = %identity.user_id,
        "event stream opened"
    );

    Ok(Sse::new(subscription.map(|frame| Ok(into_event(frame)))))
}

/// Maps a hub frame onto an SSE event.
#[must_use]
pub fn into_event(frame: Frame) -> Event {
    match frame {
        Frame::Data(json) => Event::default().data(&*json),
        Frame::KeepAlive => Event::default().comment(KEEP_ALIVE_COMMENT),
    }
}
