use std::env;
use std::path::PathBuf;

use crate::error::AppError;
use crate::notify::PushPermission;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub data_path: PathBuf,
    pub session_path: PathBuf,
    /// Simulated remote-store latency applied to every blob operation.
    pub store_latency_ms: u64,
    pub notify_queue_size: usize,
    pub event_buffer_size: usize,
    pub banner_dismiss_ms: u64,
    pub push_permission: PushPermission,
    pub gemini_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            data_path: env::var("DATA_PATH")
                .unwrap_or_else(|_| "data/haulboard.json".to_string())
                .into(),
            session_path: env::var("SESSION_PATH")
                .unwrap_or_else(|_| "data/session.json".to_string())
                .into(),
            store_latency_ms: parse_or_default("STORE_LATENCY_MS", 600)?,
            notify_queue_size: parse_or_default("NOTIFY_QUEUE_SIZE", 1024)?,
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", 1024)?,
            banner_dismiss_ms: parse_or_default("BANNER_DISMISS_MS", 6_000)?,
            push_permission: parse_or_default("PUSH_PERMISSION", PushPermission::Prompt)?,
            gemini_api_key: env::var("GEMINI_API_KEY").ok().filter(|key| !key.is_empty()),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 3000,
            log_level: "info".to_string(),
            data_path: "data/haulboard.json".into(),
            session_path: "data/session.json".into(),
            store_latency_ms: 600,
            notify_queue_size: 1024,
            event_buffer_size: 1024,
            banner_dismiss_ms: 6_000,
            push_permission: PushPermission::Prompt,
            gemini_api_key: None,
        }
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
