mod capture;
mod commands;
mod render;
mod tools;

use capture::{StdinCapture, StdinRouter};
use clap::{Parser, Subcommand};
use render::Renderer;
use sky_client::{ApiClient, Backend, FaultType, SimulationRequest};
use sky_config::{DashboardConfig, ServiceConfig};
use sky_core::{FlightId, OperatingMode};
use sky_dashboard::{Dashboard, RuntimeChannels, SpeechSession};
use sky_observability::{ObservabilityConfig, init, log_startup};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tools::{AnalyticsCommand, CrewCommand, PassengerCommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "SkyCopilot operations console", long_about = None)]
struct Args {
    /// Backend base URL (overrides SKY_API_BASE_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Operating mode: auto, co-pilot or manual (overrides SKY_OPERATING_MODE)
    #[arg(long, value_parser = parse_mode)]
    mode: Option<OperatingMode>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Live board with crisis handling; type :help once running
    Watch {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Print the current system health
    Status,
    /// Reset the backend dataset
    Seed,
    /// Inject a fault scenario
    Simulate {
        fault: FaultType,
        /// Target one flight; omitted targets every flight at the airport
        #[arg(long)]
        flight: Option<String>,
        #[arg(long, default_value = "DEL")]
        airport: String,
        #[arg(long, default_value = "HIGH")]
        severity: String,
        #[arg(long)]
        scenario: Option<String>,
    },
    /// Interpret a spoken command and show the backend's answer
    Voice { text: Vec<String> },
    #[command(subcommand)]
    Passenger(PassengerCommand),
    #[command(subcommand)]
    Crew(CrewCommand),
    #[command(subcommand)]
    Analytics(AnalyticsCommand),
}

fn parse_mode(value: &str) -> Result<OperatingMode, String> {
    value
        .parse()
        .map_err(|()| format!("unknown mode '{value}', expected auto, co-pilot or manual"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = ServiceConfig::from_env("sky-console");
    let obs_config = ObservabilityConfig::from(&config);
    let handle = init(&obs_config);
    log_startup(&handle, &obs_config.environment);

    let mut dashboard_config = DashboardConfig::from_env();
    if let Some(url) = args.api_url {
        dashboard_config.api_base_url = url;
    }
    if let Some(mode) = args.mode {
        dashboard_config.operating_mode = mode;
    }
    let client = ApiClient::from_config(&dashboard_config)?;
    tracing::info!(api = %client.base_url(), mode = %dashboard_config.operating_mode, "backend configured");

    match args.command.unwrap_or(Command::Watch { page: 1 }) {
        Command::Watch { page } => {
            run_watch(client, &dashboard_config, page).await;
            // The stdin reader may still be parked in a blocking read.
            std::process::exit(0);
        }
        Command::Status => {
            let status = client.fetch_status().await?;
            println!("{status}");
        }
        Command::Seed => {
            client.seed().await?;
            println!("backend reseeded");
        }
        Command::Simulate {
            fault,
            flight,
            airport,
            severity,
            scenario,
        } => {
            let mut request = SimulationRequest::new(fault).targeting(flight.map(FlightId::new));
            request.airport = airport;
            request.severity = severity;
            if let Some(scenario) = scenario {
                request.scenario = scenario;
            }
            client.simulate(&request).await?;
            println!("{} fault injected", request.fault);
        }
        Command::Voice { text } => {
            let response = client.interpret_command(&text.join(" ")).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Passenger(command) => tools::passenger(&client, command).await?,
        Command::Crew(command) => tools::crew(&client, command).await?,
        Command::Analytics(command) => tools::analytics(&client, command).await?,
    }

    Ok(())
}

async fn run_watch(client: ApiClient, config: &DashboardConfig, page: u32) {
    let (action_tx, action_rx) = mpsc::channel(32);
    let (speech_tx, speech_rx) = mpsc::channel(32);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let active = Arc::new(AtomicBool::new(false));

    let ctrl_c = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, shutting down");
            let _ = ctrl_c.send(true);
        }
    });

    StdinRouter {
        active: active.clone(),
        idle: Duration::from_secs(config.speech_idle_secs),
        actions: action_tx,
        speech: speech_tx.clone(),
        shutdown: shutdown_tx,
    }
    .spawn();

    let mut speech = SpeechSession::new(Box::new(StdinCapture::new(active, speech_tx)));
    let mut dashboard = Dashboard::new(client, config);
    if page > 1 {
        dashboard.set_page(page).await;
    }

    eprintln!("{}", commands::HELP);
    let mut renderer = Renderer::default();
    sky_dashboard::run(
        &mut dashboard,
        &mut speech,
        Duration::from_millis(config.poll_interval_ms),
        RuntimeChannels {
            actions: action_rx,
            speech: speech_rx,
            shutdown: shutdown_rx,
        },
        |dashboard, listening, notice| renderer.update(dashboard.state(), listening, notice),
    )
    .await;
}
