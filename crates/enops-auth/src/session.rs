use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
    #[serde(default)]
    pub verified_email: bool,
    #[serde(skip_serializing, default)]
    pub access_token: String,
}

impl User {
    /// The fixed identity used when authentication is switched off.
    pub fn demo() -> Self {
        Self {
            email: "demo@energy-ops.com".to_string(),
            name: Some("Demo User".to_string()),
            picture: None,
            verified_email: true,
            access_token: "demo_token".to_string(),
        }
    }
}

/// A login that has been started but not yet completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    pub state: String,
    pub issued_at: DateTime<Utc>,
}

impl Handshake {
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.issued_at > ttl
    }
}

/// Per-visitor authentication state. Owned by the caller; nothing here is
/// global.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<User>,
    handshake: Option<Handshake>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.as_ref().is_some_and(|u| !u.email.is_empty())
    }

    pub fn sign_in(&mut self, user: User) {
        self.user = Some(user);
        self.handshake = None;
    }

    pub fn sign_out(&mut self) {
        self.user = None;
    }

    pub fn handshake(&self) -> Option<&Handshake> {
        self.handshake.as_ref()
    }

    pub fn begin_handshake(&mut self, state: String, issued_at: DateTime<Utc>) {
        self.handshake = Some(Handshake { state, issued_at });
    }

    pub fn clear_handshake(&mut self) {
        self.handshake = None;
    }
}
