use crate::ids::{FlightId, OptionId, PilotId};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

// Backend enums are open: unknown tags survive as `Other` instead of failing the poll.
macro_rules! open_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Other(value) => value.as_str(),
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                let known = match value.as_str() {
                    $($wire => Some(Self::$variant),)+
                    _ => None,
                };
                known.unwrap_or_else(|| Self::Other(value))
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::from(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Other(value) => value,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

open_enum!(
    FlightStatus {
        OnTime => "ON_TIME",
        Scheduled => "SCHEDULED",
        Delayed => "DELAYED",
        Warning => "WARNING",
        Critical => "CRITICAL",
        Cancelled => "CANCELLED",
        Swapped => "SWAPPED",
        Unassigned => "UNASSIGNED",
    }
);

open_enum!(
    PilotStatus {
        Available => "AVAILABLE",
        Sick => "SICK",
    }
);

open_enum!(
    /// System health as reported by `/status`; anything but `Valid` is a crisis.
    HealthStatus {
        Valid => "VALID",
        Crisis => "CRISIS",
        Infeasible => "INFEASIBLE",
    }
);

open_enum!(
    ActionType {
        DelayManual => "DELAY_MANUAL",
        DelayApply => "DELAY_APPLY",
    }
);

open_enum!(
    ImpactLevel {
        High => "HIGH",
        Medium => "MEDIUM",
        Low => "LOW",
    }
);

impl HealthStatus {
    pub fn is_nominal(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self::Valid
    }
}

impl ActionType {
    /// Tag for options the backend sent without one.
    pub fn unspecified() -> Self {
        Self::Other(String::new())
    }
}

// Null numbers read as their default; minute counts may arrive fractional.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawMinutes {
    Whole(i64),
    Fractional(f64),
}

impl RawMinutes {
    fn rounded(self) -> i64 {
        match self {
            Self::Whole(value) => value,
            Self::Fractional(value) => value.round() as i64,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn minutes<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawMinutes>::deserialize(deserializer)?.map_or(0, RawMinutes::rounded))
}

fn optional_minutes<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawMinutes>::deserialize(deserializer)?.map(RawMinutes::rounded))
}

/// Fatigue score above which a pilot is flagged.
pub const FATIGUE_ALERT_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSnapshot {
    #[serde(rename = "_id")]
    pub id: FlightId,
    #[serde(default)]
    pub flight_number: String,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub scheduled_departure: Option<String>,
    pub status: FlightStatus,
    #[serde(default)]
    pub assigned_pilot_id: Option<PilotId>,
    #[serde(default, deserialize_with = "optional_minutes")]
    pub delay_minutes: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub predicted_failure: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PilotReadiness {
    #[serde(rename = "_id")]
    pub id: PilotId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fatigue_score: f64,
    #[serde(rename = "currentDutyMinutes", default, deserialize_with = "minutes")]
    pub duty_minutes: i64,
    #[serde(rename = "weekly_flight_minutes", default, deserialize_with = "minutes")]
    pub weekly_minutes: i64,
    pub status: PilotStatus,
}

impl PilotReadiness {
    pub fn is_sick(&self) -> bool {
        self.status == PilotStatus::Sick
    }

    pub fn is_fatigued(&self) -> bool {
        self.fatigue_score > FATIGUE_ALERT_THRESHOLD
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Co2Impact {
    pub score: ImpactLevel,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub value: Value,
}

/// A corrective action proposed by the backend. Unknown fields are kept so the
/// option can be echoed back to `/resolve` unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<OptionId>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default = "ActionType::unspecified")]
    pub action_type: ActionType,
    #[serde(default)]
    pub payload: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co2_impact: Option<Co2Impact>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RemediationOption {
    pub fn new(action_type: ActionType, payload: Map<String, Value>) -> Self {
        Self {
            id: None,
            title: String::new(),
            description: String::new(),
            action_type,
            payload,
            co2_impact: None,
            extra: Map::new(),
        }
    }

    pub fn requires_delay_input(&self) -> bool {
        self.action_type == ActionType::DelayManual
    }

    pub fn flight_id(&self) -> Option<&Value> {
        self.payload.get("flight_id")
    }
}

/// Statuses an operator (or a voice command) can narrow the board to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterTarget {
    Delayed,
    Critical,
    Cancelled,
    Swapped,
    OnTime,
}

impl FilterTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delayed => "DELAYED",
            Self::Critical => "CRITICAL",
            Self::Cancelled => "CANCELLED",
            Self::Swapped => "SWAPPED",
            Self::OnTime => "ON_TIME",
        }
    }

    /// `Delayed` also surfaces critical flights; the rest match exactly.
    pub fn matches(self, status: &FlightStatus) -> bool {
        match self {
            Self::Delayed => matches!(status, FlightStatus::Delayed | FlightStatus::Critical),
            Self::Critical => *status == FlightStatus::Critical,
            Self::Cancelled => *status == FlightStatus::Cancelled,
            Self::Swapped => *status == FlightStatus::Swapped,
            Self::OnTime => *status == FlightStatus::OnTime,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisplayFilter {
    #[default]
    All,
    Status(FilterTarget),
}

impl DisplayFilter {
    pub fn matches(self, status: &FlightStatus) -> bool {
        match self {
            Self::All => true,
            Self::Status(target) => target.matches(status),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Status(target) => target.as_str(),
        }
    }
}

impl fmt::Display for DisplayFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayFilter {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().replace([' ', '-'], "_").as_str() {
            "" | "ALL" => Ok(Self::All),
            "DELAYED" => Ok(Self::Status(FilterTarget::Delayed)),
            "CRITICAL" => Ok(Self::Status(FilterTarget::Critical)),
            "CANCELLED" => Ok(Self::Status(FilterTarget::Cancelled)),
            "SWAPPED" => Ok(Self::Status(FilterTarget::Swapped)),
            "ON_TIME" => Ok(Self::Status(FilterTarget::OnTime)),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_statuses_survive_round_trip() {
        let status: FlightStatus = serde_json::from_value(json!("DIVERTED")).unwrap();
        assert_eq!(status, FlightStatus::Other("DIVERTED".to_string()));
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("DIVERTED"));
        let status: HealthStatus = serde_json::from_value(json!("INFEASIBLE")).unwrap();
        assert!(!status.is_nominal());
    }

    #[test]
    fn flight_snapshot_reads_backend_field_names() {
        let flight: FlightSnapshot = serde_json::from_value(json!({
            "_id": "f1",
            "flightNumber": "FLY12",
            "origin": "DEL",
            "destination": "BOM",
            "scheduledDeparture": "2025-01-04T09:30:00",
            "status": "DELAYED",
            "assignedPilotId": "p9",
            "delayMinutes": 45,
            "predictedFailure": true
        }))
        .unwrap();
        assert_eq!(flight.flight_number, "FLY12");
        assert_eq!(flight.status, FlightStatus::Delayed);
        assert_eq!(flight.assigned_pilot_id, Some(PilotId::new("p9")));
        assert_eq!(flight.delay_minutes, Some(45));
        assert!(flight.predicted_failure);
    }

    #[test]
    fn pilot_readiness_flags() {
        let pilot: PilotReadiness = serde_json::from_value(json!({
            "_id": "p1",
            "name": "R. Iyer",
            "base": "DEL",
            "fatigue_score": 0.82,
            "currentDutyMinutes": 410,
            "weekly_flight_minutes": 1800,
            "status": "AVAILABLE"
        }))
        .unwrap();
        assert!(pilot.is_fatigued());
        assert!(!pilot.is_sick());
        assert_eq!(pilot.duty_minutes, 410);
    }

    #[test]
    fn remediation_option_keeps_unknown_fields() {
        let option: RemediationOption = serde_json::from_value(json!({
            "id": "opt-2",
            "title": "Swap crew",
            "description": "Assign standby pilot",
            "action_type": "SWAP_CREW",
            "payload": {"flight_id": "f1", "pilot_id": "p4"},
            "score": 61
        }))
        .unwrap();
        assert_eq!(option.action_type, ActionType::Other("SWAP_CREW".to_string()));
        assert!(!option.requires_delay_input());
        let echoed = serde_json::to_value(&option).unwrap();
        assert_eq!(echoed["score"], json!(61));
        assert_eq!(echoed["action_type"], json!("SWAP_CREW"));
    }

    #[test]
    fn malformed_numbers_fall_back_instead_of_failing() {
        let pilot: PilotReadiness = serde_json::from_value(json!({
            "_id": "p2",
            "fatigue_score": null,
            "currentDutyMinutes": 412.6,
            "weekly_flight_minutes": null,
            "status": "AVAILABLE"
        }))
        .unwrap();
        assert_eq!(pilot.fatigue_score, 0.0);
        assert_eq!(pilot.duty_minutes, 413);
        assert_eq!(pilot.weekly_minutes, 0);

        let flight: FlightSnapshot = serde_json::from_value(json!({
            "_id": 44,
            "flightNumber": "FLY44",
            "status": "DELAYED",
            "delayMinutes": 12.5,
            "predictedFailure": null
        }))
        .unwrap();
        assert_eq!(flight.delay_minutes, Some(13));
        assert!(!flight.predicted_failure);

        let flight: FlightSnapshot =
            serde_json::from_value(json!({"_id": "f9", "status": "ON_TIME", "delayMinutes": null}))
                .unwrap();
        assert_eq!(flight.delay_minutes, None);
    }

    #[test]
    fn option_without_action_type_still_decodes() {
        let option: RemediationOption = serde_json::from_value(json!({
            "id": "opt-9",
            "title": "Hold at gate",
            "payload": {"flight_id": "f1"}
        }))
        .unwrap();
        assert_eq!(option.action_type, ActionType::unspecified());
        assert!(!option.requires_delay_input());
    }

    #[test]
    fn ad_hoc_option_serializes_only_what_it_carries() {
        let mut payload = Map::new();
        payload.insert("flight_id".to_string(), json!("f3"));
        let option = RemediationOption::new(ActionType::DelayManual, payload);
        assert_eq!(
            serde_json::to_value(&option).unwrap(),
            json!({"action_type": "DELAY_MANUAL", "payload": {"flight_id": "f3"}})
        );

        let impact = Co2Impact {
            score: ImpactLevel::Low,
            value: Value::Null,
        };
        assert_eq!(serde_json::to_value(&impact).unwrap(), json!({"score": "LOW"}));
    }

    #[test]
    fn delayed_filter_includes_critical() {
        let filter: DisplayFilter = "delayed".parse().unwrap();
        assert!(filter.matches(&FlightStatus::Critical));
        assert!(filter.matches(&FlightStatus::Delayed));
        assert!(!filter.matches(&FlightStatus::OnTime));
        assert_eq!("on time".parse(), Ok(DisplayFilter::Status(FilterTarget::OnTime)));
        assert_eq!("ALL".parse(), Ok(DisplayFilter::All));
        assert!("boarding".parse::<DisplayFilter>().is_err());
    }
}
