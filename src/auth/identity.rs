//! Verified identity and display profile.

use serde::{Deserialize, Serialize};

/// Display name used when a profile carries no usable name.
pub const ANONYMOUS: &str = "Anonymous";

/// Display profile as reported by the identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Account handle.
    pub username: Option<String>,
    /// Avatar image URL.
    pub image_url: Option<String>,
}

impl Profile {
    /// Returns the name shown next to the user's messages.
    ///
    /// `"first last"` trimmed, else the username, else [`ANONYMOUS`].
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        );
        let full = full.trim();
        if !full.is_empty() {
            return full.to_string();
        }
        self.username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(ANONYMOUS)
            .to_string()
    }
}

/// A verified caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user identifier issued by the identity provider.
    pub user_id: String,
    /// Current display profile.
    pub profile: Profile,
}
