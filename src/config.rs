// src/config.rs
//! Process-wide relay configuration, read once at startup.

use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use axum::http::HeaderValue;
use thiserror::Error;

use crate::services::persona::Persona;

pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_PORT_FALLBACK_ATTEMPTS: u16 = 10;
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: u32 = 250;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_STATIC_DIR: &str = "public";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY is missing. Set it in the environment or in a .env file")]
    MissingApiKey,

    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Controls how much provider detail reaches the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentMode {
    Production,
    Development,
}

impl DeploymentMode {
    /// Reads `APP_ENV`, falling back to `NODE_ENV`. Unset means development.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (var, raw) = match non_blank(&lookup, "APP_ENV") {
            Some(v) => ("APP_ENV", v),
            None => match non_blank(&lookup, "NODE_ENV") {
                Some(v) => ("NODE_ENV", v),
                None => return Ok(Self::Development),
            },
        };

        match raw.to_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            _ => Err(ConfigError::Invalid {
                var,
                value: raw,
                reason: "expected `production` or `development`".to_string(),
            }),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// CORS origin allow-list. `*` in the configured list means any origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

impl AllowedOrigins {
    /// Every listed origin must be usable as a header value, and the list may not be empty.
    pub fn parse(var: &'static str, raw: &str) -> Result<Self, ConfigError> {
        let origins: Vec<String> = raw
            .split(',')
            .map(|o| o.trim().trim_end_matches('/'))
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        if origins.is_empty() {
            return Err(ConfigError::Invalid {
                var,
                value: raw.to_string(),
                reason: "no origins listed".to_string(),
            });
        }

        if let Some(bad) = origins
            .iter()
            .find(|o| o.as_str() != "*" && HeaderValue::from_str(o).is_err())
        {
            return Err(ConfigError::Invalid {
                var,
                value: bad.clone(),
                reason: "not a valid header value".to_string(),
            });
        }

        if origins.iter().any(|o| o == "*") {
            Ok(Self::Any)
        } else {
            Ok(Self::List(origins))
        }
    }

    pub fn permits(&self, origin: &str) -> bool {
        match self {
            Self::Any => true,
            Self::List(list) => list.iter().any(|o| o == origin),
        }
    }
}

/// Outbound completion-provider settings.
#[derive(Clone)]
pub struct ProviderSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Optional deadline for the outbound call. Unset leaves it to the client.
    pub timeout: Option<Duration>,
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub mode: DeploymentMode,
    pub bind_host: String,
    pub port: u16,
    pub port_fallback_attempts: u16,
    pub allowed_origins: AllowedOrigins,
    pub static_dir: PathBuf,
    pub provider: ProviderSettings,
    pub persona: Persona,
    /// Replaces the rendered persona when set.
    pub system_prompt: Option<String>,
}

impl RelayConfig {
    /// Reads configuration from environment variables.
    ///
    /// | Variable                 | Default                     |
    /// |--------------------------|-----------------------------|
    /// | `OPENAI_API_KEY`         | required                    |
    /// | `PORT`                   | `5001`                      |
    /// | `PORT_FALLBACK_ATTEMPTS` | `10`                        |
    /// | `BIND_HOST`              | `0.0.0.0`                   |
    /// | `ALLOWED_ORIGINS`        | `http://localhost:3000`     |
    /// | `APP_ENV` / `NODE_ENV`   | `development`               |
    /// | `OPENAI_BASE_URL`        | `https://api.openai.com/v1` |
    /// | `OPENAI_MODEL`           | `gpt-3.5-turbo`             |
    /// | `MAX_TOKENS`             | `250`                       |
    /// | `TEMPERATURE`            | `0.7`                       |
    /// | `PROVIDER_TIMEOUT_SECS`  | unset                       |
    /// | `STATIC_DIR`             | `public`                    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = non_blank(&lookup, "OPENAI_API_KEY").ok_or(ConfigError::MissingApiKey)?;
        let mode = DeploymentMode::from_lookup(&lookup)?;

        let allowed_origins = match non_blank(&lookup, "ALLOWED_ORIGINS") {
            Some(raw) => AllowedOrigins::parse("ALLOWED_ORIGINS", &raw)?,
            None => match non_blank(&lookup, "FRONTEND_URL") {
                Some(raw) => AllowedOrigins::parse("FRONTEND_URL", &raw)?,
                None => AllowedOrigins::parse("ALLOWED_ORIGINS", DEFAULT_ALLOWED_ORIGIN)?,
            },
        };

        let temperature: f32 = parse_or(&lookup, "TEMPERATURE", DEFAULT_TEMPERATURE)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::Invalid {
                var: "TEMPERATURE",
                value: temperature.to_string(),
                reason: "must be between 0 and 2".to_string(),
            });
        }

        let max_tokens: u32 = parse_or(&lookup, "MAX_TOKENS", DEFAULT_MAX_TOKENS)?;
        if max_tokens == 0 {
            return Err(ConfigError::Invalid {
                var: "MAX_TOKENS",
                value: "0".to_string(),
                reason: "must be positive".to_string(),
            });
        }

        let timeout = match non_blank(&lookup, "PROVIDER_TIMEOUT_SECS") {
            Some(_) => {
                let secs: u64 = parse_or(&lookup, "PROVIDER_TIMEOUT_SECS", 0)?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        var: "PROVIDER_TIMEOUT_SECS",
                        value: "0".to_string(),
                        reason: "must be positive; leave unset for no deadline".to_string(),
                    });
                }
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            mode,
            bind_host: non_blank(&lookup, "BIND_HOST").unwrap_or_else(|| DEFAULT_BIND_HOST.to_string()),
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            port_fallback_attempts: parse_or(
                &lookup,
                "PORT_FALLBACK_ATTEMPTS",
                DEFAULT_PORT_FALLBACK_ATTEMPTS,
            )?,
            allowed_origins,
            static_dir: non_blank(&lookup, "STATIC_DIR")
                .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string())
                .into(),
            provider: ProviderSettings {
                api_key,
                base_url: non_blank(&lookup, "OPENAI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                model: non_blank(&lookup, "OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                max_tokens,
                temperature,
                timeout,
            },
            persona: Persona::from_lookup(&lookup),
            system_prompt: non_blank(&lookup, "SYSTEM_PROMPT"),
        })
    }

    /// The system-role text prepended to every outbound call.
    pub fn system_instruction(&self) -> String {
        match &self.system_prompt {
            Some(prompt) => prompt.clone(),
            None => self.persona.render(),
        }
    }
}

pub(crate) fn non_blank<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match non_blank(lookup, var) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
