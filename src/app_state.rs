//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::auth::Authenticator;
use crate::domain::BroadcastHub;
use crate::service::MessageService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Message service for all mutations and subscriptions.
    pub message_service: Arc<MessageService>,
    /// Broadcast hub, for shutdown and health reporting.
    pub hub: BroadcastHub,
    /// External identity verification.
    pub authenticator: Arc<dyn Authenticator>,
}

impl AppState {
    /// Builds the state around `message_service`, sharing its hub.
    #[must_use]
    pub fn new(message_service: Arc<MessageService>, authenticator: Arc<dyn Authenticator>) -> Self {
        let hub = message_service.hub().clone();
        Self {
            message_service,
            hub,
            authenticator,
        }
    }
}
