//! Client-side mirror of backend state plus the operator's local view settings.

use crate::crisis::{self, CrisisPhase, Transition};
use crate::view::SortKey;
use serde_json::Value;
use sky_client::DataSnapshot;
use sky_core::{
    ActionType, DisplayFilter, EpochMillis, FlightSnapshot, HealthStatus, OperatingMode,
    PilotReadiness, RemediationOption,
};

/// A manual-delay option waiting for the operator to enter a duration.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDelay {
    pub option: RemediationOption,
    pub minutes: u32,
}

impl PendingDelay {
    /// The option to submit: entered minutes merged into the payload and the
    /// action retagged from "ask for input" to "apply".
    pub fn to_apply_option(&self) -> RemediationOption {
        let mut option = self.option.clone();
        option.action_type = ActionType::DelayApply;
        option
            .payload
            .insert("minutes".to_string(), Value::from(self.minutes));
        option
    }
}

/// Options and recommendation taken out of state while a resolution is in flight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeldRemediation {
    pub options: Vec<RemediationOption>,
    pub recommendation: Option<RemediationOption>,
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    pub flights: Vec<FlightSnapshot>,
    pub pilots: Vec<PilotReadiness>,
    pub logs: Vec<String>,
    pub health: HealthStatus,
    pub phase: CrisisPhase,
    pub mode: OperatingMode,
    pub page: u32,
    pub options: Vec<RemediationOption>,
    pub recommendation: Option<RemediationOption>,
    pub pending_delay: Option<PendingDelay>,
    pub filter: DisplayFilter,
    pub sort: SortKey,
    pub last_snapshot_ms: Option<EpochMillis>,
}

impl DashboardState {
    pub fn new(mode: OperatingMode) -> Self {
        Self {
            flights: Vec::new(),
            pilots: Vec::new(),
            logs: Vec::new(),
            health: HealthStatus::Valid,
            phase: CrisisPhase::Nominal,
            mode,
            page: 1,
            options: Vec::new(),
            recommendation: None,
            pending_delay: None,
            filter: DisplayFilter::All,
            sort: SortKey::default(),
            last_snapshot_ms: None,
        }
    }

    pub fn is_crisis(&self) -> bool {
        self.phase.is_crisis()
    }

    pub fn apply_snapshot(&mut self, snapshot: DataSnapshot, received_at: EpochMillis) {
        self.flights = snapshot.flights;
        self.pilots = snapshot.pilot_readiness;
        self.logs = snapshot.agent_logs;
        self.last_snapshot_ms = Some(received_at);
    }

    /// Records the polled status and advances the crisis phase. Recovery drops
    /// held options unless the operator is curating them in manual mode.
    pub fn observe_health(&mut self, status: HealthStatus) -> Transition {
        let (phase, transition) = crisis::observe(&self.phase, status.clone());
        self.health = status;
        self.phase = phase;
        if transition == Transition::Recovered && !self.mode.retains_options() {
            self.clear_remediation();
        }
        transition
    }

    /// Replaces (never merges) the held option set.
    pub fn store_remediation(
        &mut self,
        options: Vec<RemediationOption>,
        recommendation: RemediationOption,
    ) {
        self.options = options;
        self.recommendation = Some(recommendation);
        self.pending_delay = None;
    }

    pub fn clear_remediation(&mut self) {
        self.options.clear();
        self.recommendation = None;
    }

    pub fn take_remediation(&mut self) -> HeldRemediation {
        HeldRemediation {
            options: std::mem::take(&mut self.options),
            recommendation: self.recommendation.take(),
        }
    }

    pub fn restore_remediation(&mut self, held: HeldRemediation) {
        self.options = held.options;
        self.recommendation = held.recommendation;
    }

    pub fn has_remediation(&self) -> bool {
        self.recommendation.is_some() || !self.options.is_empty()
    }

    pub fn begin_manual_delay(&mut self, option: RemediationOption, default_minutes: u32) {
        self.pending_delay = Some(PendingDelay {
            option,
            minutes: default_minutes,
        });
    }

    pub fn set_delay_minutes(&mut self, minutes: u32) -> bool {
        match self.pending_delay.as_mut() {
            Some(pending) => {
                pending.minutes = minutes;
                true
            }
            None => false,
        }
    }

    pub fn take_pending_delay(&mut self) -> Option<PendingDelay> {
        self.pending_delay.take()
    }

    pub fn restore_pending_delay(&mut self, pending: PendingDelay) {
        self.pending_delay = Some(pending);
    }

    pub fn find_option(&self, id: &str) -> Option<&RemediationOption> {
        self.options
            .iter()
            .chain(self.recommendation.iter())
            .find(|option| option.id.as_ref().is_some_and(|value| value.as_str() == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};
    use sky_core::OptionId;

    fn option(id: &str, action: &str) -> RemediationOption {
        let mut option = RemediationOption::new(ActionType::from(action), Map::new());
        option.id = Some(OptionId::new(id));
        option
    }

    #[test]
    fn recovery_clears_options_outside_manual_mode() {
        for mode in [OperatingMode::Auto, OperatingMode::CoPilot] {
            let mut state = DashboardState::new(mode);
            state.observe_health(HealthStatus::Crisis);
            state.store_remediation(vec![option("a", "DELAY")], option("a", "DELAY"));
            assert_eq!(state.observe_health(HealthStatus::Valid), Transition::Recovered);
            assert!(!state.has_remediation());
        }
    }

    #[test]
    fn recovery_keeps_options_in_manual_mode() {
        let mut state = DashboardState::new(OperatingMode::Manual);
        state.observe_health(HealthStatus::Crisis);
        state.store_remediation(vec![option("a", "DELAY")], option("a", "DELAY"));
        state.observe_health(HealthStatus::Valid);
        assert_eq!(state.options.len(), 1);
        assert!(state.recommendation.is_some());
    }

    #[test]
    fn new_option_set_replaces_previous_and_closes_prompt() {
        let mut state = DashboardState::new(OperatingMode::Auto);
        state.store_remediation(vec![option("a", "X"), option("b", "X")], option("a", "X"));
        state.begin_manual_delay(option("m", "DELAY_MANUAL"), 60);
        state.store_remediation(vec![option("c", "X")], option("c", "X"));
        assert_eq!(state.options.len(), 1);
        assert!(state.find_option("a").is_none());
        assert!(state.find_option("c").is_some());
        assert!(state.pending_delay.is_none());
    }

    #[test]
    fn pending_delay_merges_minutes_and_retags() {
        let mut payload = Map::new();
        payload.insert("flight_id".to_string(), json!("f7"));
        let pending = PendingDelay {
            option: RemediationOption::new(ActionType::DelayManual, payload),
            minutes: 90,
        };
        let applied = pending.to_apply_option();
        assert_eq!(applied.action_type, ActionType::DelayApply);
        assert_eq!(applied.payload["minutes"], json!(90));
        assert_eq!(applied.payload["flight_id"], json!("f7"));
    }

    #[test]
    fn snapshot_records_receipt_time() {
        let mut state = DashboardState::new(OperatingMode::Auto);
        assert!(state.last_snapshot_ms.is_none());
        state.apply_snapshot(DataSnapshot::default(), 42);
        assert_eq!(state.last_snapshot_ms, Some(42));
    }
}
