use tracing::debug;

use crate::config::{AuthMode, ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_REDIRECT_URI};
use crate::error::{AuthError, AuthResult};
use crate::oauth::OAuthClient;
use crate::session::{Session, User};

/// Query parameters the provider sends back to the redirect URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callback {
    pub code: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated(User),
    /// The visitor must be sent to the provider first.
    LoginRequired { authorization_url: String },
}

impl LoginOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, LoginOutcome::Authenticated(_))
    }
}

/// Gate a page behind a login.
///
/// In [`AuthMode::Demo`] the demo user is signed in on first use. In
/// [`AuthMode::OAuth`] a pending callback is completed first, then an existing
/// sign-in is reused, and otherwise a fresh authorization URL is issued.
pub fn require_login(
    session: &mut Session,
    mode: AuthMode,
    client: Option<&OAuthClient>,
    callback: Option<&Callback>,
) -> AuthResult<LoginOutcome> {
    match mode {
        AuthMode::Demo => {
            if !session.is_authenticated() {
                debug!("demo mode: signing in the demo user");
                session.sign_in(User::demo());
            }
            let user = session.user().cloned().unwrap_or_else(User::demo);
            Ok(LoginOutcome::Authenticated(user))
        }
        AuthMode::OAuth => {
            let client = client.ok_or_else(|| {
                AuthError::MissingConfig(vec![ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_REDIRECT_URI])
            })?;
            if let Some(callback) = callback {
                let user = client.complete(session, &callback.code, &callback.state)?;
                return Ok(LoginOutcome::Authenticated(user));
            }
            if let Some(user) = session.user().filter(|_| session.is_authenticated()) {
                return Ok(LoginOutcome::Authenticated(user.clone()));
            }
            // A page load without a callback abandons any half-finished login.
            session.clear_handshake();
            let authorization_url = client.authorization_url(session)?;
            Ok(LoginOutcome::LoginRequired { authorization_url })
        }
    }
}
