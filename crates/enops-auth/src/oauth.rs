//! Authorization-code login against an OAuth 2 provider.
//!
//! **Flow:**
//! 1. [`OAuthClient::authorization_url`] issues a random state token, records
//!    it in the [`Session`] with its issue time and returns the provider URL.
//! 2. The provider redirects back with `code` and `state`.
//! 3. [`OAuthClient::complete`] checks the state against the pending
//!    handshake, exchanges the code for an access token, fetches the profile
//!    and signs the user in.
//!
//! A failed check clears the handshake, so a state token is single-use.

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::OAuthConfig;
use crate::error::{describe, AuthError, AuthResult};
use crate::session::{Session, User};

const STATE_LEN: usize = 43;
pub const SCOPE: &str = "email profile";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
    #[serde(default)]
    verified_email: bool,
}

pub fn generate_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LEN)
        .map(char::from)
        .collect()
}

#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: OAuthConfig,
}

impl OAuthClient {
    pub fn new(config: OAuthConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    pub fn authorization_url(&self, session: &mut Session) -> AuthResult<String> {
        self.authorization_url_at(session, Utc::now())
    }

    pub fn authorization_url_at(
        &self,
        session: &mut Session,
        now: DateTime<Utc>,
    ) -> AuthResult<String> {
        let state = generate_state();
        let url = ureq::get(&self.config.auth_endpoint)
            .query("client_id", &self.config.client_id)
            .query("redirect_uri", &self.config.redirect_uri)
            .query("response_type", "code")
            .query("scope", SCOPE)
            .query("state", &state)
            .query("access_type", "online")
            .request_url()
            .map_err(|err| AuthError::Endpoint(err.to_string()))?
            .as_url()
            .as_str()
            .to_string();
        session.begin_handshake(state, now);
        debug!("issued OAuth state token");
        Ok(url)
    }

    pub fn complete(&self, session: &mut Session, code: &str, state: &str) -> AuthResult<User> {
        self.complete_at(session, code, state, Utc::now())
    }

    /// Finish a login started by [`authorization_url`](Self::authorization_url).
    pub fn complete_at(
        &self,
        session: &mut Session,
        code: &str,
        state: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<User> {
        let Some(handshake) = session.handshake().cloned() else {
            return Err(AuthError::NoPendingLogin);
        };
        if handshake.state != state {
            warn!("OAuth callback state mismatch");
            session.clear_handshake();
            return Err(AuthError::InvalidState);
        }
        if handshake.is_expired(now, self.config.state_ttl) {
            warn!("OAuth state token expired");
            session.clear_handshake();
            return Err(AuthError::ExpiredState);
        }

        let result = self.exchange_code(code).and_then(|token| self.fetch_user(token));
        session.clear_handshake();
        let user = result?;
        info!("signed in {}", user.email);
        session.sign_in(user.clone());
        Ok(user)
    }

    fn exchange_code(&self, code: &str) -> AuthResult<String> {
        let response = ureq::post(&self.config.token_endpoint)
            .send_form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ])
            .map_err(|err| AuthError::TokenExchange(describe(err)))?;
        let token: TokenResponse = response
            .into_json()
            .map_err(|err| AuthError::TokenExchange(err.to_string()))?;
        Ok(token.access_token)
    }

    fn fetch_user(&self, access_token: String) -> AuthResult<User> {
        let response = ureq::get(&self.config.userinfo_endpoint)
            .set("Authorization", &format!("Bearer {access_token}"))
            .call()
            .map_err(|err| AuthError::UserInfo(describe(err)))?;
        let info: UserInfo = response
            .into_json()
            .map_err(|err| AuthError::UserInfo(err.to_string()))?;
        let email = info
            .email
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AuthError::UserInfo("profile has no email".to_string()))?;
        Ok(User {
            email,
            name: info.name,
            picture: info.picture,
            verified_email: info.verified_email,
            access_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn client() -> OAuthClient {
        OAuthClient::new(OAuthConfig::google(
            "client-1".into(),
            "secret".into(),
            "http://localhost:8501/".into(),
        ))
    }

    #[test]
    fn test_authorization_url_records_state() {
        let mut session = Session::new();
        let url = client().authorization_url(&mut session).unwrap();
        let state = &session.handshake().unwrap().state;
        assert_eq!(state.len(), STATE_LEN);
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/auth?"));
        assert!(url.contains("client_id=client-1"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("access_type=online"));
        assert!(url.contains(&format!("state={state}")));
        assert!(url.contains("scope=email"));
    }

    #[test]
    fn test_fresh_url_replaces_previous_state() {
        let mut session = Session::new();
        let client = client();
        client.authorization_url(&mut session).unwrap();
        let first = session.handshake().unwrap().state.clone();
        client.authorization_url(&mut session).unwrap();
        assert_ne!(session.handshake().unwrap().state, first);
    }

    #[test]
    fn test_state_mismatch_clears_handshake() {
        let mut session = Session::new();
        let client = client();
        client.authorization_url(&mut session).unwrap();
        let err = client.complete(&mut session, "code", "forged").unwrap_err();
        assert!(matches!(err, AuthError::InvalidState));
        assert!(session.handshake().is_none());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_expired_state_is_rejected() {
        let mut session = Session::new();
        let client = client();
        let issued = Utc::now();
        client.authorization_url_at(&mut session, issued).unwrap();
        let state = session.handshake().unwrap().state.clone();
        let err = client
            .complete_at(&mut session, "code", &state, issued + Duration::minutes(11))
            .unwrap_err();
        assert!(matches!(err, AuthError::ExpiredState));
        assert!(session.handshake().is_none());
    }

    #[test]
    fn test_callback_without_login_in_progress() {
        let mut session = Session::new();
        assert!(matches!(
            client().complete(&mut session, "code", "state"),
            Err(AuthError::NoPendingLogin)
        ));
    }
}
