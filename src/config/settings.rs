use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppSettings {
    pub server: ServerConfig,
    pub api_keys: ApiKeysConfig,
    pub rate_limit: RateLimitConfig,
    pub upstream: UpstreamConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiKeysConfig {
    pub vision_api_key: String,
    pub openai_api_key: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub cooldown_ms: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub vision_base_url: String,
    pub openai_base_url: String,
    pub chat_model: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl AppSettings {
    pub fn from_env() -> Result<Self, AppError> {
        // Server config
        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|_| {
                AppError::Configuration("SERVER_PORT must be a valid port number".to_string())
            })?;

        // CORS origins
        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        // API keys - both upstreams are mandatory, fail fast instead of
        // producing confusing upstream 401s later
        let vision_api_key = env::var("GOOGLE_CLOUD_VISION_API_KEY").map_err(|_| {
            AppError::Configuration("GOOGLE_CLOUD_VISION_API_KEY must be set".to_string())
        })?;

        let openai_api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| AppError::Configuration("OPENAI_API_KEY must be set".to_string()))?;

        // Cooldown between accepted requests, shared across all endpoints
        let cooldown_ms = env::var("COOLDOWN_MS")
            .unwrap_or_else(|_| "10000".to_string())
            .parse::<u64>()
            .map_err(|_| {
                AppError::Configuration("COOLDOWN_MS must be a valid number".to_string())
            })?;

        // Upstream endpoints; overridable so tests and staging can point at
        // a local mock server
        let vision_base_url = env::var("VISION_API_BASE_URL")
            .unwrap_or_else(|_| "https://vision.googleapis.com".to_string());

        let openai_base_url = env::var("OPENAI_API_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com".to_string());

        let chat_model =
            env::var("OPENAI_CHAT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let timeout_secs = env::var("UPSTREAM_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .map_err(|_| {
                AppError::Configuration("UPSTREAM_TIMEOUT_SECS must be a valid number".to_string())
            })?;

        let connect_timeout_secs = env::var("UPSTREAM_CONNECT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .map_err(|_| {
                AppError::Configuration(
                    "UPSTREAM_CONNECT_TIMEOUT_SECS must be a valid number".to_string(),
                )
            })?;

        Ok(Self {
            server: ServerConfig {
                host: server_host,
                port: server_port,
                cors_origins,
            },
            api_keys: ApiKeysConfig {
                vision_api_key,
                openai_api_key,
            },
            rate_limit: RateLimitConfig { cooldown_ms },
            upstream: UpstreamConfig {
                vision_base_url,
                openai_base_url,
                chat_model,
                timeout_secs,
                connect_timeout_secs,
            },
        })
    }
}

#[cfg(test)]
pub fn test_settings(vision_base_url: &str, openai_base_url: &str) -> AppSettings {
    AppSettings {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        api_keys: ApiKeysConfig {
            vision_api_key: "test-vision-key".to_string(),
            openai_api_key: "test-openai-key".to_string(),
        },
        rate_limit: RateLimitConfig { cooldown_ms: 10_000 },
        upstream: UpstreamConfig {
            vision_base_url: vision_base_url.to_string(),
            openai_base_url: openai_base_url.to_string(),
            chat_model: "gpt-4o-mini".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        },
    }
}
