use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
}

/// Argon2 work factor.
#[derive(Debug, Clone, Deserialize)]
pub struct HashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub hashing: HashConfig,
    pub host: String,
    pub port: u16,
    /// Mount point for the API routes, e.g. `/api`. Empty mounts at the root.
    pub api_prefix: String,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_connect_retry: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).with_context(|| format!("{key} is not set"));
        let parsed = |key: &str, default: u32| -> anyhow::Result<u32> {
            match lookup(key) {
                Some(v) => v
                    .trim()
                    .parse::<u32>()
                    .with_context(|| format!("{key} must be a non-negative integer")),
                None => Ok(default),
            }
        };

        let hash_defaults = HashConfig::default();
        let hashing = HashConfig {
            memory_kib: parsed("HASH_MEMORY_KIB", hash_defaults.memory_kib)?,
            iterations: parsed("HASH_ITERATIONS", hash_defaults.iterations)?,
            parallelism: parsed("HASH_PARALLELISM", hash_defaults.parallelism)?,
        };

        let port = match lookup("APP_PORT") {
            Some(v) => v.trim().parse::<u16>().context("APP_PORT must be a port number")?,
            None => 8080,
        };

        let api_prefix = lookup("API_PREFIX")
            .map(|p| p.trim().trim_end_matches('/').to_string())
            .unwrap_or_default();
        if !api_prefix.is_empty() && !api_prefix.starts_with('/') {
            anyhow::bail!("API_PREFIX must start with '/'");
        }

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt: JwtConfig {
                secret: required("JWT_SECRET")?,
            },
            hashing,
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            api_prefix,
            cors_origins,
            db_max_connections: parsed("DB_MAX_CONNECTIONS", 10)?,
            db_connect_retry: Duration::from_secs(parsed("DB_CONNECT_RETRY_SECS", 5)?.into()),
        })
    }
}
