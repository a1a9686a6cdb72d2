use clap::Parser;
use secrecy::SecretString;
use std::time::Duration;

use crate::error::ConfigError;
use crate::models::GenerationConfig;

pub const DEFAULT_UPSTREAM_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// Accepted names for each secret, first match wins
const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];
const AUTH_TOKEN_VARS: &[&str] = &["SECRET_AUTH_TOKEN", "AUTH_SECRET"];

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "gemini-relay")]
#[command(about = "Authenticated, rate limited relay in front of the Gemini API")]
pub struct Args {
    // Address to bind
    #[arg(long, env = "RELAY_HOST", default_value = "0.0.0.0")]
    pub host: String,

    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // Gemini model identifier
    #[arg(short, long, env = "GEMINI_MODEL", default_value = "gemini-1.5-flash")]
    pub model: String,

    // Base URL of the generative-language API
    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_UPSTREAM_URL)]
    pub upstream_url: String,

    // Upstream request timeout in seconds
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 30)]
    pub upstream_timeout: u64,

    // Sampling temperature sent as generationConfig.temperature
    #[arg(long, env = "GEMINI_TEMPERATURE")]
    pub temperature: Option<f32>,

    // Sent as generationConfig.maxOutputTokens
    #[arg(long, env = "GEMINI_MAX_OUTPUT_TOKENS")]
    pub max_output_tokens: Option<u32>,

    // Rate limit max requests per window, 0 disables it
    #[arg(long, env = "RATE_LIMIT", default_value_t = 10)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, env = "RATE_WINDOW_SECS", default_value_t = 60)]
    pub rate_window: u64,

    // Allowed CORS origins (comma-separated), empty allows any
    #[arg(long, env = "CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    // Proxies in front of the relay that append to X-Forwarded-For, 0 ignores the header
    #[arg(long, env = "TRUSTED_PROXY_HOPS", default_value_t = 0)]
    pub trusted_proxy_hops: usize,

    // Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,
}

impl Args {
    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout)
    }

    /// Generation parameters, or `None` when neither was configured.
    pub fn generation_config(&self) -> Option<GenerationConfig> {
        if self.temperature.is_none() && self.max_output_tokens.is_none() {
            return None;
        }
        Some(GenerationConfig {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        })
    }
}

/// Credentials read from the environment at startup.
#[derive(Debug)]
pub struct Secrets {
    pub api_key: SecretString,
    pub auth_token: SecretString,
}

impl Secrets {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            api_key: first_present(&lookup, API_KEY_VARS)?,
            auth_token: first_present(&lookup, AUTH_TOKEN_VARS)?,
        })
    }
}

fn first_present<F>(lookup: &F, keys: &'static [&'static str]) -> Result<SecretString, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    keys.iter()
        .filter_map(|key| lookup(*key))
        .find(|value| !value.trim().is_empty())
        .map(SecretString::new)
        .ok_or(ConfigError::MissingEnv(keys))
}
