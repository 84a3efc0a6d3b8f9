use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

pub const ENV_CLIENT_ID: &str = "GOOGLE_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "GOOGLE_CLIENT_SECRET";
pub const ENV_REDIRECT_URI: &str = "OAUTH_REDIRECT_URI";

pub const GOOGLE_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/auth";
pub const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

pub const DEFAULT_STATE_TTL_MINUTES: i64 = 10;

/// Whether the dashboard asks for a real login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Every visitor is signed in as the demo user.
    #[default]
    Demo,
    OAuth,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::Demo => "demo",
            AuthMode::OAuth => "oauth",
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "demo" => Ok(AuthMode::Demo),
            "oauth" => Ok(AuthMode::OAuth),
            other => Err(format!("unknown auth mode '{other}'; use demo or oauth")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
    /// How long an issued state token stays valid.
    pub state_ttl: Duration,
}

impl OAuthConfig {
    /// Google endpoints with the given client credentials.
    pub fn google(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri,
            auth_endpoint: GOOGLE_AUTH_ENDPOINT.to_string(),
            token_endpoint: GOOGLE_TOKEN_ENDPOINT.to_string(),
            userinfo_endpoint: GOOGLE_USERINFO_ENDPOINT.to_string(),
            state_ttl: Duration::minutes(DEFAULT_STATE_TTL_MINUTES),
        }
    }

    pub fn from_env() -> AuthResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> AuthResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let (id, secret, redirect) = (
            get(ENV_CLIENT_ID),
            get(ENV_CLIENT_SECRET),
            get(ENV_REDIRECT_URI),
        );
        match (id, secret, redirect) {
            (Some(id), Some(secret), Some(redirect)) => Ok(Self::google(id, secret, redirect)),
            (id, secret, redirect) => {
                let missing = [
                    (ENV_CLIENT_ID, id.is_none()),
                    (ENV_CLIENT_SECRET, secret.is_none()),
                    (ENV_REDIRECT_URI, redirect.is_none()),
                ]
                .into_iter()
                .filter_map(|(key, absent)| absent.then_some(key))
                .collect();
                Err(AuthError::MissingConfig(missing))
            }
        }
    }
}
