//! Application configuration loaded from environment variables.
//!
//! `Config::from_env` is what the binary uses; `Config::from_source` takes any
//! lookup function so tests never touch the process environment.

use std::env;
use std::time::Duration;

use crate::auth::exempt::ExemptRoutes;
use crate::error::AppError;
use crate::state::security_config::{SecurityConfig, SignaturePolicy};

/// Shortest HMAC secret accepted at startup.
pub const MIN_SECRET_LEN: usize = 32;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server configuration
    pub host: String,
    pub port: u16,

    // Security configuration
    pub security: SecurityConfig,

    /// Exempt routes: built-in defaults plus `AUTH_ANONYMOUS_ROUTES`
    pub exempt_routes: ExemptRoutes,
}

impl Config {
    /// Load and validate all configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_source(|name| env::var(name).ok())
    }

    pub fn from_source<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("BACKEND_HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port_str = lookup("BACKEND_PORT").unwrap_or_else(|| "3001".to_string());
        let port = port_str.trim().parse::<u16>().map_err(|_| {
            AppError::config(format!(
                "BACKEND_PORT must be a valid port number, got '{port_str}'"
            ))
        })?;

        let jwt_secret = match lookup("BACKEND_JWT_SECRET") {
            Some(secret) if secret.len() >= MIN_SECRET_LEN => secret,
            Some(_) => {
                return Err(AppError::config(format!(
                    "BACKEND_JWT_SECRET is too short. It should be at least {MIN_SECRET_LEN} characters."
                )))
            }
            None => return Err(AppError::config("BACKEND_JWT_SECRET must be set.")),
        };

        let signature = match lookup("AUTH_SIGNATURE_POLICY") {
            Some(raw) => SignaturePolicy::parse(&raw).ok_or_else(|| {
                AppError::config(format!(
                    "AUTH_SIGNATURE_POLICY must be 'verify' or 'decode-only', got '{raw}'"
                ))
            })?,
            None => SignaturePolicy::Verify,
        };

        let access_ttl = seconds(
            &lookup,
            "AUTH_ACCESS_TOKEN_TTL_SECS",
            SecurityConfig::DEFAULT_ACCESS_TTL,
        )?;
        if access_ttl.is_zero() {
            return Err(AppError::config(
                "AUTH_ACCESS_TOKEN_TTL_SECS must be greater than zero",
            ));
        }
        let refresh_window = seconds(
            &lookup,
            "AUTH_REFRESH_WINDOW_SECS",
            SecurityConfig::DEFAULT_REFRESH_WINDOW,
        )?;

        let security = SecurityConfig::new(jwt_secret.into_bytes())
            .with_signature(signature)
            .with_access_ttl(access_ttl)
            .with_refresh_window(refresh_window);

        let extra_routes = lookup("AUTH_ANONYMOUS_ROUTES").unwrap_or_default();
        let exempt_routes = ExemptRoutes::with_defaults().allow_all(extra_routes.split(','));

        Ok(Config {
            host,
            port,
            security,
            exempt_routes,
        })
    }
}

fn seconds<F>(lookup: &F, name: &str, default: Duration) -> Result<Duration, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| AppError::config(format!("{name} must be a whole number of seconds, got '{raw}'"))),
        None => Ok(default),
    }
}
