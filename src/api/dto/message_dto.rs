//! Message request bodies.

use serde::Deserialize;
use utoipa::ToSchema;

/// Request body for `POST /messages` and `PATCH /messages/:id`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MessageContentRequest {
    /// Message text. Must not be blank.
    #[serde(default)]
    pub content: String,
}
