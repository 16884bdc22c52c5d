use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Runtime configuration for the external service clients.
///
/// Loaded from `~/.docchat/config.json` when present, then overridden by
/// `DOCCHAT_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Base URL of the message persistence API.
    pub message_api_base: String,
    /// Base URL of the RAG query service.
    pub rag_api_base: String,
    /// Identifier of the indexed document conversations are grounded in.
    #[serde(default)]
    pub document_id: Option<String>,
    /// Per-request timeout for the HTTP clients, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Maximum transient-failure retries for persistence writes.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Minimum spacing between lightweight saves (branch navigation), in
    /// milliseconds.
    #[serde(default = "default_save_min_interval_ms")]
    pub save_min_interval_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_save_min_interval_ms() -> u64 {
    500
}

const DEFAULT_MESSAGE_API_BASE: &str = "http://localhost:3000/api";
const DEFAULT_RAG_API_BASE: &str = "http://localhost:8000";

fn docchat_dir() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
        .join(".docchat")
}

fn docchat_config_json_path() -> PathBuf {
    docchat_dir().join("config.json")
}

fn parse_u64_env(value: &str) -> Option<u64> {
    value.trim().parse().ok()
}

fn parse_u32_env(value: &str) -> Option<u32> {
    value.trim().parse().ok()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            message_api_base: DEFAULT_MESSAGE_API_BASE.to_string(),
            rag_api_base: DEFAULT_RAG_API_BASE.to_string(),
            document_id: None,
            request_timeout_ms: default_request_timeout_ms(),
            max_retries: default_max_retries(),
            save_min_interval_ms: default_save_min_interval_ms(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let mut config = Config::default();

        let json_path = docchat_config_json_path();
        if json_path.exists() {
            if let Ok(content) = std::fs::read_to_string(&json_path) {
                match serde_json::from_str::<Config>(&content) {
                    Ok(file_config) => config = file_config,
                    Err(err) => {
                        tracing::warn!(
                            path = %json_path.display(),
                            error = %err,
                            "ignoring unreadable config file"
                        );
                    }
                }
            }
        }

        if let Ok(base) = std::env::var("DOCCHAT_MESSAGE_API_BASE") {
            config.message_api_base = base;
        }
        if let Ok(base) = std::env::var("DOCCHAT_RAG_API_BASE") {
            config.rag_api_base = base;
        }
        if let Ok(document_id) = std::env::var("DOCCHAT_DOCUMENT_ID") {
            config.document_id = Some(document_id);
        }
        if let Some(timeout) = std::env::var("DOCCHAT_REQUEST_TIMEOUT_MS")
            .ok()
            .as_deref()
            .and_then(parse_u64_env)
        {
            config.request_timeout_ms = timeout;
        }
        if let Some(retries) = std::env::var("DOCCHAT_MAX_RETRIES")
            .ok()
            .as_deref()
            .and_then(parse_u32_env)
        {
            config.max_retries = retries;
        }
        if let Some(interval) = std::env::var("DOCCHAT_SAVE_MIN_INTERVAL_MS")
            .ok()
            .as_deref()
            .and_then(parse_u64_env)
        {
            config.save_min_interval_ms = interval;
        }
        config
    }
}
