//! One-shot side-channel commands: passenger portal, crew management and
//! analytics reads.

use clap::Subcommand;
use sky_client::{ApiClient, GENERAL_INQUIRY};
use sky_core::{FlightId, PilotId, SkyError};
use std::error::Error;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::macros::format_description;

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Subcommand, Debug)]
pub enum PassengerCommand {
    /// Look up a flight the way a passenger sees it
    Lookup { flight: String },
    /// Ask the support assistant, optionally about one flight
    Support {
        #[arg(long)]
        flight: Option<String>,
        message: Vec<String>,
    },
    Feedback {
        flight: String,
        #[arg(value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: u8,
        comment: Vec<String>,
    },
    RequestOption {
        flight: String,
        option: String,
        email: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CrewCommand {
    /// Record a completed rest period for a pilot
    Rest { pilot: String },
    /// Cost of extending a pilot's duty
    Cost { pilot: String, minutes: i64 },
}

#[derive(Subcommand, Debug)]
pub enum AnalyticsCommand {
    Overview,
    FatigueTrends,
    Predictions,
    /// Save the executive briefing as markdown
    Report {
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

impl AnalyticsCommand {
    fn endpoint(&self) -> Option<&'static str> {
        match self {
            Self::Overview => Some("overview"),
            Self::FatigueTrends => Some("fatigue_trends"),
            Self::Predictions => Some("predictions"),
            Self::Report { .. } => None,
        }
    }
}

pub async fn passenger(client: &ApiClient, command: PassengerCommand) -> CliResult {
    match command {
        PassengerCommand::Lookup { flight } => {
            let details = client.passenger_flight(&FlightId::new(flight)).await?;
            println!("{}", serde_json::to_string_pretty(&details)?);
            println!("{}", details.support_context());
        }
        PassengerCommand::Support { flight, message } => {
            let message = message.join(" ");
            if message.trim().is_empty() {
                return Err(SkyError::invalid_input("support message is empty").into());
            }
            let context = match flight {
                Some(flight) => client
                    .passenger_flight(&FlightId::new(flight))
                    .await?
                    .support_context(),
                None => GENERAL_INQUIRY.to_string(),
            };
            println!("{}", client.passenger_support(&message, &context).await?);
        }
        PassengerCommand::Feedback {
            flight,
            rating,
            comment,
        } => {
            client
                .passenger_feedback(&FlightId::new(flight), rating, &comment.join(" "))
                .await?;
            println!("feedback recorded");
        }
        PassengerCommand::RequestOption {
            flight,
            option,
            email,
        } => {
            client
                .passenger_request_option(&FlightId::new(flight), &option, &email)
                .await?;
            println!("request sent, confirmation goes to {email}");
        }
    }
    Ok(())
}

pub async fn crew(client: &ApiClient, command: CrewCommand) -> CliResult {
    match command {
        CrewCommand::Rest { pilot } => {
            client.crew_update_rest(&PilotId::new(pilot.as_str())).await?;
            println!("rest recorded for {pilot}");
        }
        CrewCommand::Cost { pilot, minutes } => {
            let cost = client
                .crew_calculate_cost(&PilotId::new(pilot), minutes)
                .await?;
            println!("{}", serde_json::to_string_pretty(&cost)?);
        }
    }
    Ok(())
}

pub async fn analytics(client: &ApiClient, command: AnalyticsCommand) -> CliResult {
    if let Some(endpoint) = command.endpoint() {
        let report = client.analytics(endpoint).await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    let AnalyticsCommand::Report { out } = command else {
        return Ok(());
    };
    let markdown = client.ai_report().await?;
    let path = briefing_path(out.as_deref(), OffsetDateTime::now_utc())?;
    std::fs::write(&path, markdown)?;
    println!("briefing saved to {}", path.display());
    Ok(())
}

/// `Executive_Briefing_<date>.md`, inside `dir` when given.
pub fn briefing_path(dir: Option<&Path>, now: OffsetDateTime) -> Result<PathBuf, Box<dyn Error>> {
    let date = now
        .date()
        .format(format_description!("[year]-[month]-[day]"))?;
    let name = format!("Executive_Briefing_{date}.md");
    Ok(match dir {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    })
}
