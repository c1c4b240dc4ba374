//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use quizroom_engine::EngineSettings;

use crate::error::AppError;

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Preferred scenario file; `scenario.yaml` and `scenario.json` are the
    /// fallbacks.
    pub scenario_path: PathBuf,
    /// Bot bridge endpoint. Without it prompts are only logged.
    pub bot_webhook_url: Option<String>,
    /// Pause between two participant messages.
    pub send_delay_ms: u64,
    /// Per-connection display buffer.
    pub display_buffer: usize,
    /// OTLP collector; tracing export is off when unset.
    pub otlp_endpoint: Option<String>,
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a numeric variable does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Ok(Self {
            host: non_empty("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port: parse_or(non_empty("PORT"), "PORT", 3000)?,
            scenario_path: non_empty("SCENARIO_PATH")
                .map_or_else(|| PathBuf::from("scenario.yaml"), PathBuf::from),
            bot_webhook_url: non_empty("BOT_WEBHOOK_URL"),
            send_delay_ms: parse_or(non_empty("SEND_DELAY_MS"), "SEND_DELAY_MS", 50)?,
            display_buffer: parse_or(non_empty("DISPLAY_BUFFER"), "DISPLAY_BUFFER", 32)?,
            otlp_endpoint: non_empty("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }

    /// The address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }

    #[must_use]
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            scenario_path: self.scenario_path.clone(),
            send_delay: Duration::from_millis(self.send_delay_ms),
            display_buffer: self.display_buffer,
        }
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} must be a valid number: {e}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_apply_when_environment_is_empty() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.scenario_path, PathBuf::from("scenario.yaml"));
        assert_eq!(config.bot_webhook_url, None);
        assert_eq!(config.send_delay_ms, 50);
        assert_eq!(config.display_buffer, 32);
        assert_eq!(config.otlp_endpoint, None);
    }

    #[test]
    fn test_values_are_read_and_blank_ones_ignored() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("SCENARIO_PATH", "event.json"),
            ("BOT_WEBHOOK_URL", "http://bot:9000/send"),
            ("OTEL_EXPORTER_OTLP_ENDPOINT", "  "),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.scenario_path, PathBuf::from("event.json"));
        assert_eq!(config.bot_webhook_url.as_deref(), Some("http://bot:9000/send"));
        assert_eq!(config.otlp_endpoint, None);
        assert_eq!(config.socket_addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_invalid_port_is_a_config_error() {
        let result = config_from(&[("PORT", "eighty")]);

        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
