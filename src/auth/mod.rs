//! Identity seam: who is making a request.
//!
//! Credentials are verified by an external identity provider. The board
//! only consumes its verdict through the [`Authenticator`] trait and the
//! [`AuthenticatedUser`] extractor.

pub mod authenticator;
pub mod extractor;
pub mod identity;

pub use authenticator::{Authenticator, HeaderAuthenticator};
pub use extractor::AuthenticatedUser;
pub use identity::{Identity, Profile};
