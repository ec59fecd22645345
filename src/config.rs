//! Deployment configuration: the two gateway credentials, from env.

use crate::auth::AuthTokens;
use crate::error::ConfigError;

pub const WRITE_TOKEN_ENV: &str = "BASIC_DB_WRITE_TOKEN";
pub const READ_TOKEN_ENV: &str = "BASIC_DB_READ_TOKEN";

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub write_token: String,
    pub read_token: String,
}

impl GatewayConfig {
    /// Read both credentials from `BASIC_DB_WRITE_TOKEN` / `BASIC_DB_READ_TOKEN`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(GatewayConfig {
            write_token: read_credential(WRITE_TOKEN_ENV)?,
            read_token: read_credential(READ_TOKEN_ENV)?,
        })
    }

    pub fn auth_tokens(&self) -> AuthTokens {
        AuthTokens {
            write_token: self.write_token.clone(),
            read_token: self.read_token.clone(),
        }
    }
}

fn read_credential(name: &'static str) -> Result<String, ConfigError> {
    let value = std::env::var(name).map_err(|_| ConfigError::MissingEnv(name))?;
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyCredential(name));
    }
    Ok(value)
}
