use anyhow::{Context, Result, anyhow};
use std::collections::HashMap;
use std::env;

use crate::database::models::LeaveType;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub client_base_url: String,
    /// Raw `LEAVE_QUOTAS` value, e.g. `paid=25,rtt=10`.
    pub leave_quotas: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_env_only()
    }

    /// Load configuration from environment variables only (without loading .env files)
    /// This is useful for testing where you want to control the environment directly
    pub fn from_env_only() -> Result<Self> {
        let config = Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://@localhost:5432/conges".to_string()),
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                "your-super-secret-jwt-key-change-this-in-production-12345".to_string()
            }),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            client_base_url: env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            leave_quotas: env::var("LEAVE_QUOTAS")
                .ok()
                .filter(|raw| !raw.trim().is_empty()),
        };

        // Surface a malformed quota table at startup rather than on first use.
        config.leave_quotas()?;

        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Yearly quota per leave type. Empty when `LEAVE_QUOTAS` is unset.
    pub fn leave_quotas(&self) -> Result<HashMap<LeaveType, i32>> {
        match &self.leave_quotas {
            Some(raw) => parse_leave_quotas(raw),
            None => Ok(HashMap::new()),
        }
    }
}

fn parse_leave_quotas(raw: &str) -> Result<HashMap<LeaveType, i32>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (leave_type, days) = entry
                .split_once('=')
                .ok_or_else(|| anyhow!("LEAVE_QUOTAS entry '{}' is not type=days", entry))?;
            let leave_type = leave_type
                .parse::<LeaveType>()
                .map_err(|e| anyhow!("LEAVE_QUOTAS: {}", e))?;
            let days = days
                .trim()
                .parse::<i32>()
                .with_context(|| format!("LEAVE_QUOTAS: invalid day count in '{}'", entry))?;
            if days < 0 {
                return Err(anyhow!("LEAVE_QUOTAS: negative quota in '{}'", entry));
            }
            Ok((leave_type, days))
        })
        .collect()
}
