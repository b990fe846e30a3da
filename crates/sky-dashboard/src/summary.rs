use crate::state::DashboardState;
use serde::Serialize;
use sky_core::{FlightStatus, PilotReadiness};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrewBreakdown {
    pub available: usize,
    pub fatigued: usize,
    pub sick: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub active_flights: usize,
    pub active_disruptions: usize,
    pub fatigue_alerts: usize,
    pub human_decisions: usize,
    pub crew: CrewBreakdown,
}

impl DashboardSummary {
    pub fn from_state(state: &DashboardState) -> Self {
        let disrupted = state
            .flights
            .iter()
            .filter(|flight| matches!(flight.status, FlightStatus::Delayed | FlightStatus::Cancelled))
            .count();
        Self {
            active_flights: state.flights.len(),
            active_disruptions: disrupted + usize::from(state.is_crisis()),
            fatigue_alerts: state.pilots.iter().filter(|pilot| pilot.is_fatigued()).count(),
            human_decisions: state
                .logs
                .iter()
                .filter(|line| line.contains("MANUAL:") || line.contains("CO-PILOT:"))
                .count(),
            crew: summarize_crew(&state.pilots),
        }
    }
}

fn summarize_crew(pilots: &[PilotReadiness]) -> CrewBreakdown {
    let mut summary = CrewBreakdown {
        available: 0,
        fatigued: 0,
        sick: 0,
    };
    for pilot in pilots {
        if pilot.is_sick() {
            summary.sick += 1;
        } else if pilot.is_fatigued() {
            summary.fatigued += 1;
        } else {
            summary.available += 1;
        }
    }
    summary
}
