use std::env;

use super::{env_parse, parse_list};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins, parsed from `AIMINDER_ALLOWED_ORIGINS` (comma-separated).
    /// When empty, any origin is allowed.
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: env::var("AIMINDER_API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_parse("AIMINDER_API_PORT", 8080),
            allowed_origins: parse_list(&env::var("AIMINDER_ALLOWED_ORIGINS").unwrap_or_default()),
        }
    }
}
