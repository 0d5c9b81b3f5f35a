//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use keydrop_core::RoleId;
use keydrop_infra::SupersedePolicy;
use keydrop_observability::LogFormat;

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_CATALOG_PATH: &str = "product_links.json";
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub bind: SocketAddr,
    pub catalog_path: PathBuf,
    /// Members holding this role may register, grant and revoke.
    pub admin_role: RoleId,
    pub jwt_secret: String,
    pub supersede: SupersedePolicy,
    pub log_format: LogFormat,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind = get("KEYDROP_BIND")
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
            .parse()
            .map_err(|e| invalid("KEYDROP_BIND", e))?;

        let catalog_path = get("KEYDROP_CATALOG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_PATH));

        let admin_role = get("KEYDROP_ADMIN_ROLE_ID")
            .ok_or(ConfigError::Missing("KEYDROP_ADMIN_ROLE_ID"))?
            .parse()
            .map_err(|e| invalid("KEYDROP_ADMIN_ROLE_ID", e))?;

        let jwt_secret = get("KEYDROP_JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_string());

        let supersede = match get("KEYDROP_SUPERSEDE") {
            Some(v) => v.parse().map_err(|e| invalid("KEYDROP_SUPERSEDE", e))?,
            None => SupersedePolicy::default(),
        };

        let log_format = match get("KEYDROP_LOG_FORMAT") {
            Some(v) => v.parse().map_err(|e| invalid("KEYDROP_LOG_FORMAT", e))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind,
            catalog_path,
            admin_role,
            jwt_secret,
            supersede,
            log_format,
        })
    }

    pub fn uses_default_jwt_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

fn invalid(key: &'static str, err: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        key,
        message: err.to_string(),
    }
}
