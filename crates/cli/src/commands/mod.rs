//! Command implementations.
//!
//! Every command runs against a [`Context`] built from the environment: the
//! client configuration, a file-backed session store and the auth session
//! resolved from it.

use std::io::BufRead;
use std::sync::Arc;

use secrecy::SecretString;
use thiserror::Error;
use village_water_client::{
    ApiClient, ApiError, AuthSession, ClientConfig, ConfigError, FileSessionStore, LoginError,
    RegisterError, SessionStore,
};
use village_water_core::{BillGenerationError, Capabilities};

pub mod auth;
pub mod open;
pub mod resources;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Login failed: {0}")]
    Login(#[from] LoginError),

    #[error(transparent)]
    Register(#[from] RegisterError),

    #[error("{}", .0.message())]
    Api(#[from] ApiError),

    /// The signed-in user's role does not allow the command.
    #[error("Permission denied: {0}")]
    Forbidden(&'static str),

    /// The command needs a session and there is none.
    #[error("Not logged in. Run `vws login <username>` first.")]
    NotLoggedIn,

    #[error("Cannot generate bills: {0}")]
    BillGeneration(#[from] BillGenerationError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Could not read from stdin: {0}")]
    Stdin(#[from] std::io::Error),
}

/// Everything a command needs.
pub struct Context {
    pub auth: AuthSession,
}

impl Context {
    /// Build the context from `VWS_*` environment variables and resolve the
    /// stored session.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Config` if the environment is invalid.
    pub fn from_env() -> Result<Self, CommandError> {
        let config = ClientConfig::from_env()?;
        tracing::debug!(
            base_url = %config.api_base_url,
            session_file = %config.session_file.display(),
            "Loaded configuration"
        );

        let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(config.session_file.clone()));
        let client = ApiClient::from_config(&config, store)?;
        let auth = AuthSession::new(client);
        auth.resolve();

        Ok(Self { auth })
    }

    pub const fn client(&self) -> &ApiClient {
        self.auth.client()
    }

    /// Capabilities of the signed-in user, or `NotLoggedIn`.
    pub fn require_login(&self) -> Result<Capabilities, CommandError> {
        let caps = self.auth.capabilities();
        if caps.is_authenticated {
            Ok(caps)
        } else {
            Err(CommandError::NotLoggedIn)
        }
    }

    /// Capabilities of a signed-in Admin or Manager.
    pub fn require_staff(&self, command: &'static str) -> Result<Capabilities, CommandError> {
        let caps = self.require_login()?;
        if caps.is_manager_or_admin {
            Ok(caps)
        } else {
            Err(CommandError::Forbidden(command))
        }
    }
}

/// Use `given` if present, otherwise read one line from stdin.
pub fn read_secret(given: Option<String>, prompt: &str) -> Result<SecretString, CommandError> {
    if let Some(value) = given {
        return Ok(SecretString::from(value));
    }
    crate::output::prompt(prompt);
    read_secret_from(&mut std::io::stdin().lock())
}

fn read_secret_from(input: &mut impl BufRead) -> Result<SecretString, CommandError> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    let value = line.trim_end_matches(['\r', '\n']);
    if value.is_empty() {
        return Err(CommandError::InvalidInput("empty password".to_owned()));
    }
    Ok(SecretString::from(value.to_owned()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_read_secret_strips_newline() {
        let mut input = "hunter22\r\n".as_bytes();
        let secret = read_secret_from(&mut input).unwrap();
        assert_eq!(secret.expose_secret(), "hunter22");
    }

    #[test]
    fn test_read_secret_rejects_empty() {
        let mut input = "\n".as_bytes();
        assert!(matches!(
            read_secret_from(&mut input),
            Err(CommandError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_given_secret_wins() {
        let secret = read_secret(Some("from-flag".to_owned()), "unused").unwrap();
        assert_eq!(secret.expose_secret(), "from-flag");
    }
}
