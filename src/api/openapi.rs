//! OpenAPI document for the REST and streaming surface.

use utoipa::OpenApi;

use crate::api::dto::MessageContentRequest;
use crate::api::handlers::{message, system};
use crate::domain::{Message, MessageId};
use crate::error::{ErrorBody, ErrorResponse};
use crate::sse::handler as sse;

/// Path of the generated OpenAPI JSON document.
pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

/// Generated OpenAPI description of the board.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "board-gateway",
        description = "Real-time message board with server-sent event synchronization"
    ),
    paths(
        message::list_messages,
        message::get_message,
        message::create_message,
        message::edit_message,
        message::delete_message,
        sse::stream_messages,
        system::health_handler,
    ),
    components(schemas(
        Message,
        MessageId,
        MessageContentRequest,
        ErrorResponse,
        ErrorBody,
        system::HealthResponse,
    )),
    tags(
        (name = "Messages", description = "Board messages and live stream"),
        (name = "System", description = "Operational endpoints"),
    )
)]
pub struct ApiDoc;
