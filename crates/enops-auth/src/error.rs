use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("OAuth configuration missing: set {}", .0.join(", "))]
    MissingConfig(Vec<&'static str>),

    /// The callback's state does not match the pending handshake.
    #[error("invalid state parameter")]
    InvalidState,

    #[error("login attempt expired; start again")]
    ExpiredState,

    #[error("no login in progress")]
    NoPendingLogin,

    #[error("invalid OAuth endpoint: {0}")]
    Endpoint(String),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("failed to get user info: {0}")]
    UserInfo(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Describe a ureq failure without the response body.
pub(crate) fn describe(err: ureq::Error) -> String {
    match err {
        ureq::Error::Status(code, _) => format!("HTTP {code}"),
        ureq::Error::Transport(transport) => transport.to_string(),
    }
}
