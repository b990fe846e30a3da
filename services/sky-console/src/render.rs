use sky_core::{FlightSnapshot, RemediationOption};
use sky_dashboard::view::project;
use sky_dashboard::{DashboardState, DashboardSummary, ListeningState};
use std::fmt::Write as _;

const LOG_TAIL: usize = 5;

/// Prints a frame only when it differs from the last one printed.
#[derive(Default)]
pub struct Renderer {
    last: String,
}

impl Renderer {
    pub fn update(&mut self, state: &DashboardState, listening: ListeningState, notice: Option<&str>) {
        if let Some(notice) = notice {
            println!(">> {notice}");
        }
        let frame = frame(state, listening);
        if frame != self.last {
            println!("{frame}");
            self.last = frame;
        }
    }
}

pub fn frame(state: &DashboardState, listening: ListeningState) -> String {
    let mut out = String::new();
    let summary = DashboardSummary::from_state(state);
    let mic = match listening {
        ListeningState::Listening => "on",
        ListeningState::Stopped => "off",
    };

    let _ = writeln!(
        out,
        "== SkyCopilot | health {} | mode {} | page {} | filter {} | sort {} | mic {}",
        state.health, state.mode, state.page, state.filter, state.sort, mic
    );
    let _ = writeln!(
        out,
        "flights {} | disruptions {} | fatigue alerts {} | human decisions {} | crew {} ok / {} fatigued / {} sick",
        summary.active_flights,
        summary.active_disruptions,
        summary.fatigue_alerts,
        summary.human_decisions,
        summary.crew.available,
        summary.crew.fatigued,
        summary.crew.sick,
    );

    if state.has_remediation() {
        write_remediation(&mut out, state);
    }

    let board = project(&state.flights, state.filter, state.sort);
    if board.is_empty() {
        let _ = writeln!(out, "  (no flights)");
    }
    for flight in board {
        let _ = writeln!(out, "{}", flight_row(flight));
    }

    let skip = state.logs.len().saturating_sub(LOG_TAIL);
    for line in &state.logs[skip..] {
        let _ = writeln!(out, "  | {line}");
    }
    out.trim_end().to_string()
}

fn write_remediation(out: &mut String, state: &DashboardState) {
    let _ = writeln!(out, "-- {} remediation --", state.health);
    if let Some(recommended) = &state.recommendation {
        let _ = writeln!(out, "  recommended: {}", option_line(recommended));
    }
    for option in &state.options {
        let _ = writeln!(out, "  option: {}", option_line(option));
    }
    match &state.pending_delay {
        Some(pending) => {
            let _ = writeln!(
                out,
                "  manual delay pending: {} min (:delay <n>, :confirm, :cancel)",
                pending.minutes
            );
        }
        None => {
            let _ = writeln!(out, "  :apply [id] | :reject");
        }
    }
}

fn option_line(option: &RemediationOption) -> String {
    let id = option.id.as_ref().map_or("-", |id| id.as_str());
    let mut line = format!("[{id}] {} ({})", option.title, option.action_type);
    if let Some(impact) = &option.co2_impact {
        let _ = write!(line, " co2 {}", impact.score);
    }
    line
}

fn flight_row(flight: &FlightSnapshot) -> String {
    let delay = match flight.delay_minutes {
        Some(minutes) if minutes > 0 => format!("+{minutes}m"),
        _ => String::new(),
    };
    let pilot = flight
        .assigned_pilot_id
        .as_ref()
        .map_or("unassigned", |id| id.as_str());
    format!(
        "  {:<8} {:>4} -> {:<4} {:<20} {:<11} {:<6} {}{}",
        flight.flight_number,
        flight.origin,
        flight.destination,
        flight.scheduled_departure.as_deref().unwrap_or("-"),
        flight.status.as_str(),
        delay,
        pilot,
        if flight.predicted_failure { " !" } else { "" },
    )
}
