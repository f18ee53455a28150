use anyhow::Result;
use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }

    #[allow(dead_code)]
    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub server_addr: String,

    // Civic-data discovery service
    pub discover_base_url: String,
    pub discover_timeout_seconds: u64,
    pub discover_per_category_limit: u32,

    // Redis (last-query persistence)
    pub redis_url: String,

    // CORS
    pub cors_allow_origins: Vec<String>,

    // Generative provider (Anthropic Messages API).
    // An absent key means the gateway fails fast with `Unconfigured`
    // before any network call.
    pub anthropic_api_key: Option<String>,
    pub anthropic_base_url: String,
    pub generative_model: String,
    pub generative_max_tokens: u32,
    pub generative_temperature: f32,
    pub generative_timeout_seconds: u64,

    // Officials reference dataset override (JSON file)
    pub officials_file: Option<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        // Discovery service
        let discover_base_url =
            env::var("DISCOVER_BASE_URL").unwrap_or_else(|_| "http://localhost:5001".to_string());
        let discover_timeout_seconds = env::var("DISCOVER_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);
        let discover_per_category_limit = env::var("DISCOVER_PER_CATEGORY_LIMIT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);
        if discover_per_category_limit == 0 {
            anyhow::bail!("DISCOVER_PER_CATEGORY_LIMIT must be a positive integer");
        }

        // Redis
        let redis_url =
            env::var("REDIS_URL").unwrap_or_else(|_| "redis://redis:6379/0".to_string());

        // CORS
        let cors_allow_origins = env::var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Generative provider
        let anthropic_api_key = env::var("ANTHROPIC_API_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let anthropic_base_url = env::var("ANTHROPIC_BASE_URL")
            .unwrap_or_else(|_| "https://api.anthropic.com".to_string());
        let generative_model = env::var("GENERATIVE_MODEL")
            .unwrap_or_else(|_| "claude-sonnet-4-20250514".to_string());
        let generative_max_tokens = env::var("GENERATIVE_MAX_TOKENS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(2048);
        let generative_temperature = env::var("GENERATIVE_TEMPERATURE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.7);
        // Generation latency runs higher than discovery latency, so the
        // bound is more generous (45s vs 30s).
        let generative_timeout_seconds = env::var("GENERATIVE_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(45);

        let officials_file = env::var("OFFICIALS_FILE").ok().filter(|s| !s.is_empty());

        Ok(Settings {
            env,
            server_addr,
            discover_base_url,
            discover_timeout_seconds,
            discover_per_category_limit,
            redis_url,
            cors_allow_origins,
            anthropic_api_key,
            anthropic_base_url,
            generative_model,
            generative_max_tokens,
            generative_temperature,
            generative_timeout_seconds,
            officials_file,
        })
    }
}
