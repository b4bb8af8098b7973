use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/events";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";
const DEFAULT_BLOB_STORAGE_DIR: &str = "./storage/eventimages";
const DEFAULT_BLOB_PUBLIC_BASE_URL: &str = "http://localhost:3001/images";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Clone)]
pub struct BlobSettings {
    pub storage_dir: PathBuf,
    pub public_base_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub bind_addr: SocketAddr,
    pub jwt: JwtSettings,
    pub blob: BlobSettings,
    pub cors_allowed_origins: Option<String>,
    pub production: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| optional(name).ok_or(ConfigError::Missing(name));

        let max_connections = match optional("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "DATABASE_MAX_CONNECTIONS",
                value: raw,
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let bind_raw = optional("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            name: "BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        let public_base_url = optional("BLOB_PUBLIC_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BLOB_PUBLIC_BASE_URL.to_string());
        if url::Url::parse(&public_base_url).is_err() {
            return Err(ConfigError::Invalid {
                name: "BLOB_PUBLIC_BASE_URL",
                value: public_base_url,
            });
        }

        Ok(Self {
            database_url: optional("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            max_connections,
            bind_addr,
            jwt: JwtSettings {
                secret: required("JWT_SECRET")?,
                issuer: required("JWT_ISSUER")?,
                audience: required("JWT_AUDIENCE")?,
            },
            blob: BlobSettings {
                storage_dir: optional("BLOB_STORAGE_DIR")
                    .unwrap_or_else(|| DEFAULT_BLOB_STORAGE_DIR.to_string())
                    .into(),
                public_base_url,
            },
            cors_allowed_origins: optional("CORS_ALLOWED_ORIGINS"),
            production: optional("RUST_ENV")
                .map(|v| v.to_lowercase() == "production")
                .unwrap_or(false),
        })
    }
}
