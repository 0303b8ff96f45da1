// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
const DEFAULT_FREE_CREDENTIAL_LIMIT: usize = 1;
const DEFAULT_MAX_CERTIFICATE_BYTES: usize = 10 * 1024 * 1024;

/// Offsets beyond a full day are certainly a typo.
const MAX_UTC_OFFSET_MINUTES: i32 = 24 * 60;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Offset from UTC (minutes) used to decide what "today" is
    pub utc_offset_minutes: i32,
    /// Number of credentials a free-tier user may track
    pub free_credential_limit: usize,
    /// Upper bound on uploaded certificate size
    pub max_certificate_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honoured for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let utc_offset_minutes: i32 = parse_var("UTC_OFFSET_MINUTES", 0)?;
        if !(-MAX_UTC_OFFSET_MINUTES..=MAX_UTC_OFFSET_MINUTES).contains(&utc_offset_minutes) {
            return Err(ConfigError::Invalid {
                name: "UTC_OFFSET_MINUTES",
                value: utc_offset_minutes.to_string(),
            });
        }

        Ok(Self {
            port: parse_var("PORT", DEFAULT_PORT)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string()),
            utc_offset_minutes,
            free_credential_limit: parse_var(
                "FREE_CREDENTIAL_LIMIT",
                DEFAULT_FREE_CREDENTIAL_LIMIT,
            )?,
            max_certificate_bytes: parse_var(
                "MAX_CERTIFICATE_BYTES",
                DEFAULT_MAX_CERTIFICATE_BYTES,
            )?,
        })
    }

    /// Config for tests: UTC, one free credential.
    pub fn test_default() -> Self {
        Self {
            port: DEFAULT_PORT,
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            utc_offset_minutes: 0,
            free_credential_limit: DEFAULT_FREE_CREDENTIAL_LIMIT,
            max_certificate_bytes: 1024 * 1024,
        }
    }
}

/// Read an optional variable, falling back to `default` when unset.
fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            value: raw.clone(),
        }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
