//! The external authenticator seam and a trusted-proxy implementation.

use async_trait::async_trait;
use axum::http::HeaderMap;

use super::{Identity, Profile};

/// Header carrying the verified user id. Required.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the user's given name.
pub const FIRST_NAME_HEADER: &str = "x-user-first-name";
/// Header carrying the user's family name.
pub const LAST_NAME_HEADER: &str = "x-user-last-name";
/// Header carrying the user's handle.
pub const USERNAME_HEADER: &str = "x-user-username";
/// Header carrying the user's avatar URL.
pub const IMAGE_URL_HEADER: &str = "x-user-image-url";

/// Resolves the caller of a request.
///
/// Implementations may perform network calls; the board never checks
/// credentials itself.
#[async_trait]
pub trait Authenticator: Send + Sync + std::fmt::Debug {
    /// Returns the verified identity, or `None` if the request is
    /// unauthenticated.
    async fn authenticate(&self, headers: &HeaderMap) -> Option<Identity>;
}

/// Trusts identity headers injected by an upstream auth proxy.
///
/// Only deploy behind a proxy that strips these headers from client
/// requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderAuthenticator;

impl HeaderAuthenticator {
    /// Creates the authenticator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl Authenticator for HeaderAuthenticator {
    async fn authenticate(&self, headers: &HeaderMap) -> Option<Identity> {
        let user_id = header(headers, USER_ID_HEADER)?;
        Some(Identity {
            user_id,
            profile: Profile {
                first_name: header(headers, FIRST_NAME_HEADER),
                last_name: header(headers, LAST_NAME_HEADER),
                username: header(headers, USERNAME_HEADER),
                image_url: header(headers, IMAGE_URL_HEADER),
            },
        })
    }
}
