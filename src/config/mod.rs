//! Configuration module for the VREPS backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for API authentication (required in production)
    pub api_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Base URL of the Ollama server
    pub ollama_url: String,
    /// Model tried first
    pub model: String,
    /// Model tried when the primary fails
    pub fallback_model: String,
    /// Documents included in chat context
    pub chat_context_limit: usize,
    /// Documents included in dashboard and chart context
    pub dashboard_context_limit: usize,
    /// Per-request model timeout; unset means no client-side limit
    pub model_timeout: Option<Duration>,
    /// Stored turns replayed when a chat request carries no history
    pub history_limit: usize,
    /// Variables that were set but ignored because they did not parse
    pub invalid_vars: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut vars = EnvReader {
            lookup,
            invalid: Vec::new(),
        };

        let api_psk = vars.get("VREPS_API_PSK");

        let db_path = vars
            .get("VREPS_DB_PATH")
            .unwrap_or_else(|| "./data/knowledge.sqlite".to_string())
            .into();

        let bind_addr = vars
            .get("VREPS_BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8000".to_string())
            .parse()
            .expect("Invalid VREPS_BIND_ADDR format");

        let log_level = vars
            .get("VREPS_LOG_LEVEL")
            .unwrap_or_else(|| "info".to_string());

        let ollama_url = vars
            .get("VREPS_OLLAMA_URL")
            .unwrap_or_else(|| "http://127.0.0.1:11434".to_string());
        let model = vars
            .get("VREPS_MODEL")
            .unwrap_or_else(|| "llama3.2".to_string());
        let fallback_model = vars
            .get("VREPS_FALLBACK_MODEL")
            .unwrap_or_else(|| "llama3.1:8b".to_string());

        let model_timeout = vars
            .parse::<u64>("VREPS_MODEL_TIMEOUT_SECS")
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Self {
            api_psk,
            db_path,
            bind_addr,
            log_level,
            ollama_url,
            model,
            fallback_model,
            chat_context_limit: vars.parse("VREPS_CHAT_CONTEXT_LIMIT").unwrap_or(10),
            dashboard_context_limit: vars.parse("VREPS_DASHBOARD_CONTEXT_LIMIT").unwrap_or(50),
            model_timeout,
            history_limit: vars.parse("VREPS_HISTORY_LIMIT").unwrap_or(20),
            invalid_vars: vars.invalid,
        }
    }
}

struct EnvReader<F> {
    lookup: F,
    invalid: Vec<String>,
}

impl<F: Fn(&str) -> Option<String>> EnvReader<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
    }

    /// Parse an optional numeric variable. Values that do not parse fall back
    /// to the default and are recorded.
    fn parse<T: std::str::FromStr>(&mut self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match raw.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                self.invalid.push(format!("{}={:?}", key, raw));
                None
            }
        }
    }
}
