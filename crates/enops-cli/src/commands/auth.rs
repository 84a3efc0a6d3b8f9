use anyhow::Result;
use enops_auth::{require_login, AuthMode, LoginOutcome, OAuthClient, OAuthConfig, Session};
use enops_cli::cli::AuthCommands;
use enops_cli::config::EnopsConfig;

pub fn handle(command: &AuthCommands, config: &EnopsConfig) -> Result<()> {
    match command {
        AuthCommands::Status { mode } => {
            let mode = mode.unwrap_or(config.auth.mode);
            let client = match mode {
                AuthMode::Demo => None,
                AuthMode::OAuth => Some(OAuthClient::new(OAuthConfig::from_env()?)),
            };
            let mut session = Session::new();
            match require_login(&mut session, mode, client.as_ref(), None)? {
                LoginOutcome::Authenticated(user) => {
                    println!("Signed in as {} ({} mode)", user.email, mode);
                }
                LoginOutcome::LoginRequired { authorization_url } => {
                    println!("Login required: {authorization_url}");
                }
            }
            Ok(())
        }
    }
}
