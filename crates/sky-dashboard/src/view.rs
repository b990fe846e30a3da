//! Pure projection of the flight board: filter, then stable sort.

use sky_core::{DisplayFilter, FlightSnapshot, FlightStatus};
use std::fmt;
use std::str::FromStr;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    Time,
    Severity,
    #[default]
    FlightNumber,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Time => "TIME",
            Self::Severity => "STATUS",
            Self::FlightNumber => "FLIGHT_NUM",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "time" | "departure" => Ok(Self::Time),
            "status" | "severity" | "priority" => Ok(Self::Severity),
            "flight_num" | "flight" | "number" => Ok(Self::FlightNumber),
            _ => Err(()),
        }
    }
}

pub fn project<'a>(
    flights: &'a [FlightSnapshot],
    filter: DisplayFilter,
    sort: SortKey,
) -> Vec<&'a FlightSnapshot> {
    let mut view: Vec<&FlightSnapshot> = flights
        .iter()
        .filter(|flight| filter.matches(&flight.status))
        .collect();
    match sort {
        SortKey::Time => view.sort_by_key(|flight| {
            let departure = departure_nanos(flight.scheduled_departure.as_deref());
            (departure.is_none(), departure.unwrap_or_default())
        }),
        SortKey::Severity => view.sort_by_key(|flight| severity_rank(&flight.status)),
        SortKey::FlightNumber => view.sort_by_key(|flight| flight_number_key(&flight.flight_number)),
    }
    view
}

/// CRITICAL < DELAYED < WARNING < ON_TIME < CANCELLED < everything else.
pub fn severity_rank(status: &FlightStatus) -> u8 {
    match status {
        FlightStatus::Critical => 0,
        FlightStatus::Delayed => 1,
        FlightStatus::Warning => 2,
        FlightStatus::OnTime => 3,
        FlightStatus::Cancelled => 4,
        _ => 5,
    }
}

/// Digits of the flight number read as one integer; no digits reads as zero.
pub fn flight_number_key(flight_number: &str) -> u128 {
    let digits: String = flight_number.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u128::MAX)
}

fn departure_nanos(value: Option<&str>) -> Option<i128> {
    let value = value?.trim();
    if let Ok(parsed) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(parsed.unix_timestamp_nanos());
    }
    let naive = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
    );
    PrimitiveDateTime::parse(value, naive)
        .ok()
        .map(|parsed| parsed.assume_utc().unix_timestamp_nanos())
}
