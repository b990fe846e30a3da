//! Operator lines typed into the watch console. Lines start with `:`;
//! anything else is treated as spoken input while the microphone is on.

use sky_client::{FaultType, SimulationRequest};
use sky_core::{DisplayFilter, FlightId, OperatingMode, OptionId, SkyError, SkyResult};
use sky_dashboard::{OperatorAction, SortKey};

pub const HELP: &str = "\
:refresh                 poll now
:page <n>                show page n
:mode <auto|co-pilot|manual>
:apply [option-id]       apply an option (recommendation by default)
:reject                  reject the recommendation and delay manually
:delay <minutes>         set the pending manual delay
:confirm | :cancel       submit or drop the pending manual delay
:filter [status]         DELAYED, CRITICAL, CANCELLED, SWAPPED, ON_TIME or ALL
:sort <time|status|flight>
:say <text>              send a voice command as text
:mic                     toggle the microphone
:seed                    reset the backend dataset
:simulate <weather|technical|atc|crew> [flight-id]
:help | :quit";

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleInput {
    Action(OperatorAction),
    Help,
    Quit,
}

/// Parses one `:` line. Returns `Ok(None)` for lines that are not commands.
pub fn parse_line(line: &str) -> SkyResult<Option<ConsoleInput>> {
    let Some(command) = line.trim().strip_prefix(':') else {
        return Ok(None);
    };
    let mut words = command.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let action = match verb.to_ascii_lowercase().as_str() {
        "help" | "h" | "?" => return Ok(Some(ConsoleInput::Help)),
        "quit" | "q" | "exit" => return Ok(Some(ConsoleInput::Quit)),
        "refresh" | "r" => OperatorAction::Refresh,
        "page" => OperatorAction::SetPage(number(&rest, "page")?),
        "mode" => {
            let value = required(&rest, "mode")?;
            let mode = value
                .parse::<OperatingMode>()
                .map_err(|()| SkyError::invalid_input(format!("unknown mode '{value}'")))?;
            OperatorAction::SetMode(mode)
        }
        "apply" | "resolve" => OperatorAction::Resolve(rest.first().map(|id| OptionId::new(*id))),
        "reject" => OperatorAction::RejectRecommendation,
        "delay" => OperatorAction::SetDelayMinutes(number(&rest, "delay")?),
        "confirm" => OperatorAction::ConfirmDelay,
        "cancel" => OperatorAction::CancelDelay,
        "filter" => {
            let value = rest.join(" ");
            let filter = value
                .parse::<DisplayFilter>()
                .map_err(|()| SkyError::invalid_input(format!("unknown filter '{value}'")))?;
            OperatorAction::SetFilter(filter)
        }
        "sort" => {
            let value = required(&rest, "sort")?;
            let sort = value
                .parse::<SortKey>()
                .map_err(|()| SkyError::invalid_input(format!("unknown sort key '{value}'")))?;
            OperatorAction::SetSort(sort)
        }
        "say" => {
            if rest.is_empty() {
                return Err(SkyError::invalid_input("say needs some text"));
            }
            OperatorAction::Transcript(rest.join(" "))
        }
        "mic" | "listen" => OperatorAction::ToggleListening,
        "seed" => OperatorAction::Seed,
        "simulate" | "sim" => {
            let fault = required(&rest, "simulate")?
                .parse::<FaultType>()
                .map_err(SkyError::invalid_input)?;
            let target = rest.get(1).map(|id| FlightId::new(*id));
            OperatorAction::Simulate(SimulationRequest::new(fault).targeting(target))
        }
        other => {
            return Err(SkyError::invalid_input(format!(
                "unknown command ':{other}', try :help"
            )));
        }
    };
    Ok(Some(ConsoleInput::Action(action)))
}

fn required<'a>(rest: &[&'a str], verb: &str) -> SkyResult<&'a str> {
    rest.first()
        .copied()
        .ok_or_else(|| SkyError::invalid_input(format!(":{verb} needs a value")))
}

fn number(rest: &[&str], verb: &str) -> SkyResult<u32> {
    let value = required(rest, verb)?;
    value
        .parse()
        .map_err(|_| SkyError::invalid_input(format!(":{verb} expects a number, got '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sky_core::{ErrorCode, FilterTarget};

    fn action(line: &str) -> OperatorAction {
        match parse_line(line) {
            Ok(Some(ConsoleInput::Action(action))) => action,
            other => panic!("unexpected parse of {line:?}: {other:?}"),
        }
    }

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(parse_line("show delayed flights").unwrap(), None);
        assert_eq!(parse_line(":").unwrap(), None);
    }

    #[test]
    fn parses_resolution_commands() {
        assert_eq!(action(":apply"), OperatorAction::Resolve(None));
        assert_eq!(
            action(":apply opt-3"),
            OperatorAction::Resolve(Some(OptionId::new("opt-3")))
        );
        assert_eq!(action(":delay 90"), OperatorAction::SetDelayMinutes(90));
        assert_eq!(action(":reject"), OperatorAction::RejectRecommendation);
        assert_eq!(action(" :confirm "), OperatorAction::ConfirmDelay);
    }

    #[test]
    fn parses_view_and_mode_commands() {
        assert_eq!(action(":mode co-pilot"), OperatorAction::SetMode(OperatingMode::CoPilot));
        assert_eq!(
            action(":filter on time"),
            OperatorAction::SetFilter(DisplayFilter::Status(FilterTarget::OnTime))
        );
        assert_eq!(action(":filter"), OperatorAction::SetFilter(DisplayFilter::All));
        assert_eq!(action(":sort status"), OperatorAction::SetSort(SortKey::Severity));
        assert_eq!(action(":say show critical"), OperatorAction::Transcript("show critical".to_string()));
    }

    #[test]
    fn simulate_targets_optional_flight() {
        match action(":simulate weather f12") {
            OperatorAction::Simulate(request) => {
                assert_eq!(request.fault, FaultType::Weather);
                assert_eq!(request.scenario, "Fog");
                assert_eq!(request.flight_id, Some(FlightId::new("f12")));
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn bad_input_is_reported_as_invalid() {
        for line in [":page two", ":mode turbo", ":sort gate", ":simulate meteor", ":launch", ":say"] {
            let err = parse_line(line).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidInput, "{line}");
        }
        assert_eq!(parse_line(":quit").unwrap(), Some(ConsoleInput::Quit));
    }
}
