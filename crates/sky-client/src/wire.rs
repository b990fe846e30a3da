//! Request and response bodies exchanged with the SkyCopilot backend.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use sky_core::{
    FlightId, FlightSnapshot, HealthStatus, OperatingMode, PilotId, PilotReadiness,
    RemediationOption,
};
use std::fmt;
use std::str::FromStr;

pub const OPTIONS_GENERATED: &str = "OPTIONS_GENERATED";

fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Combined `/data` page: flights, crew readiness, and agent activity.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DataSnapshot {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub flights: Vec<FlightSnapshot>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub pilot_readiness: Vec<PilotReadiness>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub agent_logs: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatusResponse {
    pub status: HealthStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealRequest {
    pub mode: OperatingMode,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HealResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub options: Vec<RemediationOption>,
    #[serde(default)]
    pub recommended_strategy: Option<RemediationOption>,
}

impl HealResponse {
    /// Options plus the recommended one, only when the backend actually generated a set.
    pub fn into_generated(self) -> Option<(Vec<RemediationOption>, RemediationOption)> {
        if self.status != OPTIONS_GENERATED || self.options.is_empty() {
            return None;
        }
        let recommended = self.recommended_strategy?;
        Some((self.options, recommended))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolveRequest<'a> {
    pub option: &'a RemediationOption,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommandRequest<'a> {
    pub command: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CommandResponse {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FaultType {
    Weather,
    Technical,
    Atc,
    Crew,
}

impl FaultType {
    pub fn default_scenario(self) -> &'static str {
        match self {
            Self::Weather => "Fog",
            Self::Technical => "Technical",
            Self::Atc | Self::Crew => "Generic",
        }
    }
}

impl fmt::Display for FaultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Self::Weather => "WEATHER",
            Self::Technical => "TECHNICAL",
            Self::Atc => "ATC",
            Self::Crew => "CREW",
        };
        f.write_str(value)
    }
}

impl FromStr for FaultType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "weather" => Ok(Self::Weather),
            "technical" => Ok(Self::Technical),
            "atc" => Ok(Self::Atc),
            "crew" => Ok(Self::Crew),
            other => Err(format!("unknown fault type '{other}'")),
        }
    }
}

/// Fault injection for the simulation console. A missing flight targets every
/// flight departing the given airport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationRequest {
    #[serde(rename = "type")]
    pub fault: FaultType,
    #[serde(rename = "subType")]
    pub scenario: String,
    pub flight_id: Option<FlightId>,
    pub airport: String,
    pub severity: String,
}

impl SimulationRequest {
    pub fn new(fault: FaultType) -> Self {
        Self {
            fault,
            scenario: fault.default_scenario().to_string(),
            flight_id: None,
            airport: "DEL".to_string(),
            severity: "HIGH".to_string(),
        }
    }

    pub fn targeting(mut self, flight_id: Option<FlightId>) -> Self {
        self.flight_id = flight_id;
        self
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PassengerFlight {
    #[serde(default)]
    pub flight_id: Option<FlightId>,
    #[serde(default)]
    pub flight_number: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub delay_minutes: Option<i64>,
    #[serde(default)]
    pub plain_reason_desc: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PassengerFlight {
    pub fn support_context(&self) -> String {
        format!(
            "Flight {} is {} (Delay: {}m). Reason: {}.",
            self.flight_number,
            self.status,
            self.delay_minutes.unwrap_or(0),
            self.plain_reason_desc.as_deref().unwrap_or("unknown"),
        )
    }
}

pub const GENERAL_INQUIRY: &str = "General inquiry.";

#[derive(Debug, Clone, Serialize)]
pub struct SupportRequest<'a> {
    pub message: &'a str,
    pub context: &'a str,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SupportResponse {
    #[serde(default)]
    pub response: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackRequest<'a> {
    pub flight_id: &'a FlightId,
    pub rating: u8,
    pub comment: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionRequest<'a> {
    pub flight_id: &'a FlightId,
    pub option_id: &'a str,
    pub email: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrewRestRequest<'a> {
    pub pilot_id: &'a PilotId,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrewCostRequest<'a> {
    pub pilot_id: &'a PilotId,
    pub additional_minutes: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AiReport {
    #[serde(default)]
    pub report_markdown: Option<String>,
}
