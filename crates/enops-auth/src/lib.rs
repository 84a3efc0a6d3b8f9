//! # enops-auth: dashboard sign-in
//!
//! The session is an explicit [`Session`] value owned by the caller. Whether a
//! real login happens is an explicit [`AuthMode`]:
//!
//! - [`AuthMode::Demo`] signs every visitor in as a fixed demo user,
//! - [`AuthMode::OAuth`] runs the authorization-code flow ([`OAuthClient`])
//!   against Google using `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET` and
//!   `OAUTH_REDIRECT_URI`.

pub mod config;
pub mod error;
pub mod gate;
pub mod oauth;
pub mod session;

pub use config::{AuthMode, OAuthConfig};
pub use error::{AuthError, AuthResult};
pub use gate::{require_login, Callback, LoginOutcome};
pub use oauth::OAuthClient;
pub use session::{Handshake, Session, User};
