use anyhow::{Result, bail};

use crate::constants::*;

/// Runtime configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_path: String,
    pub token_secret: String,
}

impl Config {
    /// Load and validate configuration from the environment.
    ///
    /// `HOST`, `PORT` and `DATA_PATH` have defaults; `TOKEN_SECRET` is
    /// required and must be long enough to sign tokens with.
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());

        let port = std::env::var("PORT").unwrap_or_else(|_| DEFAULT_PORT.to_string());
        let port: u16 = match port.parse() {
            Ok(port) => port,
            Err(_) => bail!("PORT must be a number between 1 and 65535, got '{}'", port),
        };

        let data_path = std::env::var("DATA_PATH").unwrap_or_else(|_| DEFAULT_DATA_PATH.to_string());

        let token_secret = match std::env::var("TOKEN_SECRET") {
            Ok(secret) => secret,
            Err(_) => bail!("TOKEN_SECRET must be set"),
        };

        if token_secret.len() < MIN_TOKEN_SECRET_LENGTH {
            bail!(
                "TOKEN_SECRET must be at least {} bytes long",
                MIN_TOKEN_SECRET_LENGTH
            );
        }

        Ok(Self {
            host,
            port,
            data_path,
            token_secret,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
