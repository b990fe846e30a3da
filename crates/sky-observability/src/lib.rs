use metrics_exporter_prometheus::PrometheusBuilder;
use sky_config::ServiceConfig;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub service_name: String,
    pub environment: String,
    pub log_level: String,
    pub metrics_addr: Option<String>,
}

impl From<&ServiceConfig> for ObservabilityConfig {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            service_name: config.service_name.clone(),
            environment: config.environment.to_string(),
            log_level: config.log_level.clone(),
            metrics_addr: config.metrics_addr.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ObservabilityHandle {
    pub service_name: String,
    pub metrics_enabled: bool,
}

/// Installs the global tracing subscriber and, when an address is configured,
/// the Prometheus exporter. Logs go to stderr so stdout stays free for the board.
pub fn init(config: &ObservabilityConfig) -> ObservabilityHandle {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);

    let metrics_enabled = init_metrics(config);

    ObservabilityHandle {
        service_name: config.service_name.clone(),
        metrics_enabled,
    }
}

pub fn log_startup(handle: &ObservabilityHandle, environment: &str) {
    tracing::info!(
        service = %handle.service_name,
        environment = %environment,
        metrics_enabled = handle.metrics_enabled,
        "SkyCopilot console starting"
    );
}

fn init_metrics(config: &ObservabilityConfig) -> bool {
    let Some(addr) = config.metrics_addr.as_ref() else {
        return false;
    };
    let addr: SocketAddr = match addr.parse() {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::warn!(
                service = %config.service_name,
                error = %err,
                "Invalid SKY_METRICS_ADDR value"
            );
            return false;
        }
    };

    let builder = PrometheusBuilder::new()
        .with_http_listener(addr)
        .add_global_label("service", config.service_name.clone())
        .add_global_label("environment", config.environment.clone());

    match builder.install() {
        Ok(()) => {
            describe_metrics();
            true
        }
        Err(err) => {
            tracing::warn!(
                service = %config.service_name,
                error = %err,
                "Failed to initialize Prometheus exporter"
            );
            false
        }
    }
}

fn describe_metrics() {
    metrics::describe_counter!(
        "sky_poll_failures_total",
        "Backend reads that failed during a poll cycle, by source"
    );
    metrics::describe_counter!(
        "sky_remediation_requests_total",
        "Remediation computations requested from the backend"
    );
    metrics::describe_counter!(
        "sky_resolutions_total",
        "Remediation options submitted for resolution, by action type"
    );
    metrics::describe_counter!(
        "sky_voice_commands_total",
        "Voice transcripts interpreted by the backend, by returned action"
    );
}
