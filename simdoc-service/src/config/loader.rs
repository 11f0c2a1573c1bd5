//! Configuration loading from files and environment variables.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};

use crate::error::{ServiceError, ServiceResult};

use super::ServiceConfig;

/// Flat environment variables accepted for compatibility with existing
/// deployments. They take precedence over the file and `SIMDOC__*` values.
#[derive(Debug, Clone, Default)]
pub struct LegacyEnv {
    pub backend_url: Option<String>,
    pub host: Option<String>,
    pub port: Option<String>,
    pub transport: Option<String>,
}

impl LegacyEnv {
    pub fn from_env() -> Self {
        Self {
            backend_url: std::env::var("BACKEND_URL").ok(),
            host: std::env::var("HOST").ok(),
            port: std::env::var("PORT").ok(),
            transport: std::env::var("TRANSPORT").ok(),
        }
    }
}

/// Load configuration from `config.*`, `SIMDOC__*` env vars and the legacy
/// flat variables, in increasing order of precedence.
pub fn load_config(legacy: LegacyEnv) -> ServiceResult<ServiceConfig> {
    let builder = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(
            Environment::with_prefix("SIMDOC")
                .separator("__")
                .try_parsing(true),
        );

    from_builder(builder, legacy)
}

fn from_builder(
    builder: ConfigBuilder<DefaultState>,
    legacy: LegacyEnv,
) -> ServiceResult<ServiceConfig> {
    let config: ServiceConfig = builder
        .set_override_option("backend.base_url", legacy.backend_url)
        .and_then(|b| b.set_override_option("server.host", legacy.host))
        .and_then(|b| b.set_override_option("server.port", legacy.port))
        .and_then(|b| {
            b.set_override_option(
                "mcp.transport",
                legacy.transport.map(|t| t.trim().to_lowercase()),
            )
        })
        .map_err(|e| ServiceError::Config {
            message: format!("Failed to apply environment overrides: {}", e),
        })?
        .build()
        .map_err(|e| ServiceError::Config {
            message: format!("Failed to build config: {}", e),
        })?
        .try_deserialize()
        .map_err(|e| ServiceError::Config {
            message: format!("Failed to deserialize config: {}", e),
        })?;

    normalize(config)
}

fn normalize(mut config: ServiceConfig) -> ServiceResult<ServiceConfig> {
    config.backend.base_url = config.backend.base_url.trim_end_matches('/').to_string();
    if config.backend.base_url.is_empty() {
        return Err(ServiceError::Config {
            message: "backend.base_url must not be empty".to_string(),
        });
    }
    if config.backend.timeout_secs == 0 {
        return Err(ServiceError::Config {
            message: "backend.timeout_secs must be greater than zero".to_string(),
        });
    }
    if config.backend.max_connections == 0 {
        return Err(ServiceError::Config {
            message: "backend.max_connections must be greater than zero".to_string(),
        });
    }

    // Nested routes need a leading slash and no trailing one
    let path = config.mcp.path.trim_matches('/');
    config.mcp.path = format!("/{}", path);

    Ok(config)
}
