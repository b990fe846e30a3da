use serde::{Deserialize, Serialize};
use sky_core::OperatingMode;
use std::{env, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Local,
    Dev,
    Test,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_env(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "dev" | "development" => Self::Dev,
            "test" | "testing" => Self::Test,
            "staging" => Self::Staging,
            "prod" | "production" => Self::Prod,
            _ => Self::Local,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Self::Local => "local",
            Self::Dev => "dev",
            Self::Test => "test",
            Self::Staging => "staging",
            Self::Prod => "prod",
        };
        write!(f, "{}", value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub service_name: String,
    pub environment: Environment,
    pub region: Option<String>,
    pub metrics_addr: Option<String>,
    pub log_level: String,
}

impl ServiceConfig {
    pub fn from_env(default_service_name: &str) -> Self {
        Self::from_source(default_service_name, |key| env::var(key).ok())
    }

    pub fn from_source(
        default_service_name: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let source = Source(&lookup);
        Self {
            service_name: source.string("SKY_SERVICE_NAME", default_service_name),
            environment: Environment::from_env(&source.string("SKY_ENV", "local")),
            region: source.optional("SKY_REGION"),
            metrics_addr: source.optional("SKY_METRICS_ADDR"),
            log_level: source.string("SKY_LOG_LEVEL", "info"),
        }
    }
}

/// Settings for the dashboard polling workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub api_base_url: String,
    pub poll_interval_ms: u64,
    pub page_size: u32,
    pub operating_mode: OperatingMode,
    pub manual_delay_minutes: u32,
    pub speech_idle_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            poll_interval_ms: 2000,
            page_size: 20,
            operating_mode: OperatingMode::Auto,
            manual_delay_minutes: 60,
            speech_idle_secs: 30,
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        Self::from_source(|key| env::var(key).ok())
    }

    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let source = Source(&lookup);
        let defaults = Self::default();
        Self {
            api_base_url: source.string("SKY_API_BASE_URL", &defaults.api_base_url),
            poll_interval_ms: source
                .parsed("SKY_POLL_INTERVAL_MS", defaults.poll_interval_ms)
                .max(100),
            page_size: source.parsed("SKY_PAGE_SIZE", defaults.page_size).max(1),
            operating_mode: source
                .optional("SKY_OPERATING_MODE")
                .and_then(|value| value.parse().ok())
                .unwrap_or(defaults.operating_mode),
            manual_delay_minutes: source
                .parsed("SKY_MANUAL_DELAY_MINUTES", defaults.manual_delay_minutes),
            speech_idle_secs: source
                .parsed("SKY_SPEECH_IDLE_SECS", defaults.speech_idle_secs)
                .max(1),
        }
    }
}

struct Source<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Source<'_, F> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T: std::str::FromStr>(&self, key: &str, default: T) -> T {
        self.optional(key)
            .and_then(|value| value.parse::<T>().ok())
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn dashboard_defaults_when_unset() {
        let config = DashboardConfig::from_source(lookup(&[]));
        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.poll_interval_ms, 2000);
        assert_eq!(config.page_size, 20);
        assert_eq!(config.operating_mode, OperatingMode::Auto);
        assert_eq!(config.manual_delay_minutes, 60);
    }

    #[test]
    fn dashboard_reads_overrides_and_ignores_garbage() {
        let config = DashboardConfig::from_source(lookup(&[
            ("SKY_API_BASE_URL", "https://ops.example.net"),
            ("SKY_POLL_INTERVAL_MS", "abc"),
            ("SKY_PAGE_SIZE", "0"),
            ("SKY_OPERATING_MODE", "manual"),
            ("SKY_MANUAL_DELAY_MINUTES", "45"),
        ]));
        assert_eq!(config.api_base_url, "https://ops.example.net");
        assert_eq!(config.poll_interval_ms, 2000);
        assert_eq!(config.page_size, 1);
        assert_eq!(config.operating_mode, OperatingMode::Manual);
        assert_eq!(config.manual_delay_minutes, 45);
    }

    #[test]
    fn service_config_environment_aliases() {
        let config = ServiceConfig::from_source(
            "sky-console",
            lookup(&[("SKY_ENV", "production"), ("SKY_LOG_LEVEL", "debug")]),
        );
        assert_eq!(config.service_name, "sky-console");
        assert_eq!(config.environment, Environment::Prod);
        assert_eq!(config.log_level, "debug");
        assert!(config.metrics_addr.is_none());
    }
}
