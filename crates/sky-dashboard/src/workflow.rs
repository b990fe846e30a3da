//! The polling and crisis-resolution workflow over a [`Backend`].

use crate::crisis::Transition;
use crate::state::DashboardState;
use crate::summary::DashboardSummary;
use crate::view::{self, SortKey};
use crate::voice::{self, VoiceDirective};
use serde_json::Map;
use sky_client::{ApiError, Backend, SimulationRequest};
use sky_config::DashboardConfig;
use sky_core::{
    ActionType, DisplayFilter, FlightSnapshot, OperatingMode, RemediationOption, age_millis,
    now_epoch_millis,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemediationOutcome {
    OptionsGenerated,
    NothingToShow,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    NothingToResolve,
    AwaitingDelayInput,
    Submitted,
}

pub struct Dashboard<B> {
    backend: B,
    page_size: u32,
    default_delay_minutes: u32,
    state: DashboardState,
}

impl<B: Backend> Dashboard<B> {
    pub fn new(backend: B, config: &DashboardConfig) -> Self {
        Self {
            backend,
            page_size: config.page_size.max(1),
            default_delay_minutes: config.manual_delay_minutes,
            state: DashboardState::new(config.operating_mode),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary::from_state(&self.state)
    }

    pub fn board(&self) -> Vec<&FlightSnapshot> {
        view::project(&self.state.flights, self.state.filter, self.state.sort)
    }

    /// One fetch cycle followed by remediation when it entered a crisis or the
    /// crisis kind changed.
    pub async fn poll(&mut self) {
        if matches!(
            self.refresh().await,
            Transition::EnteredCrisis | Transition::KindChanged
        ) {
            self.request_remediation().await;
        }
    }

    /// Issues the snapshot and status reads concurrently. A failed read keeps
    /// the previous mirror and is only logged; the next tick retries.
    async fn refresh(&mut self) -> Transition {
        let page = self.state.page;
        let (snapshot, status) = futures_util::join!(
            self.backend.fetch_snapshot(page, self.page_size),
            self.backend.fetch_status(),
        );

        match snapshot {
            Ok(snapshot) => self.state.apply_snapshot(snapshot, now_epoch_millis()),
            Err(err) => {
                metrics::counter!("sky_poll_failures_total", "source" => "data").increment(1);
                let stale_ms = self
                    .state
                    .last_snapshot_ms
                    .map(|received| age_millis(received, now_epoch_millis()));
                tracing::warn!(error = %err, page, ?stale_ms, "snapshot fetch failed, keeping last data");
            }
        }

        match status {
            Ok(status) => {
                let transition = self.state.observe_health(status);
                match transition {
                    Transition::EnteredCrisis => {
                        tracing::warn!(status = %self.state.health, mode = %self.state.mode, "crisis detected");
                    }
                    Transition::Recovered => {
                        tracing::info!(
                            kept_options = self.state.has_remediation(),
                            "system health back to nominal"
                        );
                    }
                    Transition::KindChanged => {
                        tracing::warn!(status = %self.state.health, mode = %self.state.mode, "crisis kind changed");
                    }
                    Transition::Unchanged => {}
                }
                transition
            }
            Err(err) => {
                metrics::counter!("sky_poll_failures_total", "source" => "status").increment(1);
                tracing::warn!(error = %err, "status fetch failed, keeping last status");
                Transition::Unchanged
            }
        }
    }

    /// Asks the backend for options under the current mode, then refreshes.
    pub async fn request_remediation(&mut self) -> RemediationOutcome {
        let mode = self.state.mode;
        metrics::counter!("sky_remediation_requests_total").increment(1);
        let outcome = match self.backend.request_remediation(mode).await {
            Ok(response) => match response.into_generated() {
                Some((options, recommended)) => {
                    tracing::info!(
                        options = options.len(),
                        recommended = %recommended.title,
                        "remediation options generated"
                    );
                    self.state.store_remediation(options, recommended);
                    RemediationOutcome::OptionsGenerated
                }
                None => {
                    if !mode.retains_options() {
                        self.state.clear_remediation();
                    }
                    RemediationOutcome::NothingToShow
                }
            },
            Err(err) => {
                tracing::warn!(error = %err, mode = %mode, "remediation request failed");
                RemediationOutcome::Failed
            }
        };
        self.refresh().await;
        outcome
    }

    /// Applies `choice`, or the recommended option when none is given.
    /// Manual-delay options open the duration prompt instead of submitting.
    pub async fn resolve(
        &mut self,
        choice: Option<RemediationOption>,
    ) -> Result<ResolveOutcome, ApiError> {
        let Some(option) = choice.or_else(|| self.state.recommendation.clone()) else {
            return Ok(ResolveOutcome::NothingToResolve);
        };
        if option.requires_delay_input() {
            self.state
                .begin_manual_delay(option, self.default_delay_minutes);
            return Ok(ResolveOutcome::AwaitingDelayInput);
        }
        self.submit(option).await
    }

    /// Resolves a held option by id. Unknown ids are a no-op: the option set
    /// they came from has already been resolved or replaced.
    pub async fn resolve_by_id(&mut self, id: &str) -> Result<ResolveOutcome, ApiError> {
        match self.state.find_option(id).cloned() {
            Some(option) => self.resolve(Some(option)).await,
            None => Ok(ResolveOutcome::NothingToResolve),
        }
    }

    /// Rejects the recommendation in favour of a manual delay on its flight.
    pub async fn reject_recommendation(&mut self) -> Result<ResolveOutcome, ApiError> {
        let Some(recommended) = self.state.recommendation.as_ref() else {
            return Ok(ResolveOutcome::NothingToResolve);
        };
        let mut payload = Map::new();
        if let Some(flight_id) = recommended.flight_id() {
            payload.insert("flight_id".to_string(), flight_id.clone());
        }
        let option = RemediationOption::new(ActionType::DelayManual, payload);
        self.resolve(Some(option)).await
    }

    pub fn set_delay_minutes(&mut self, minutes: u32) -> bool {
        self.state.set_delay_minutes(minutes)
    }

    pub fn cancel_manual_delay(&mut self) {
        if self.state.take_pending_delay().is_some() {
            tracing::debug!("manual delay prompt cancelled");
        }
    }

    pub async fn confirm_manual_delay(&mut self) -> Result<ResolveOutcome, ApiError> {
        let Some(pending) = self.state.take_pending_delay() else {
            return Ok(ResolveOutcome::NothingToResolve);
        };
        let option = pending.to_apply_option();
        match self.submit(option).await {
            Err(err) => {
                self.state.restore_pending_delay(pending);
                Err(err)
            }
            outcome => outcome,
        }
    }

    // Held options leave state before the submission is awaited, so a repeated
    // request finds nothing to act on.
    async fn submit(&mut self, option: RemediationOption) -> Result<ResolveOutcome, ApiError> {
        let held = self.state.take_remediation();
        if let Err(err) = self.backend.resolve(&option).await {
            tracing::warn!(error = %err, action = %option.action_type, "resolution submit failed");
            self.state.restore_remediation(held);
            return Err(err);
        }
        metrics::counter!("sky_resolutions_total", "action" => option.action_type.to_string())
            .increment(1);
        tracing::info!(
            action = %option.action_type,
            title = %option.title,
            mode = %self.state.mode,
            "resolution submitted"
        );
        self.poll().await;
        Ok(ResolveOutcome::Submitted)
    }

    /// Switching mode mid-crisis asks for options computed under the new mode.
    pub async fn set_mode(&mut self, mode: OperatingMode) -> Option<RemediationOutcome> {
        if self.state.mode == mode {
            return None;
        }
        tracing::info!(from = %self.state.mode, to = %mode, "operating mode changed");
        self.state.mode = mode;
        if self.state.is_crisis() {
            return Some(self.request_remediation().await);
        }
        None
    }

    pub async fn set_page(&mut self, page: u32) {
        let page = page.max(1);
        if self.state.page != page {
            self.state.page = page;
            self.poll().await;
        }
    }

    pub fn set_filter(&mut self, filter: DisplayFilter) {
        self.state.filter = filter;
    }

    pub fn clear_filter(&mut self) {
        self.state.filter = DisplayFilter::All;
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.state.sort = sort;
    }

    /// Sends a transcript for interpretation and applies any display directive.
    /// Returns the backend's message for the operator, if any.
    pub async fn handle_transcript(&mut self, transcript: &str) -> Result<Option<String>, ApiError> {
        let Some(command) = voice::normalize_transcript(transcript) else {
            return Ok(None);
        };
        let response = self.backend.interpret_command(command).await?;
        metrics::counter!("sky_voice_commands_total", "action" => voice::action_label(&response))
            .increment(1);
        match voice::directive_for(&response) {
            VoiceDirective::SetFilter(filter) => self.set_filter(filter),
            VoiceDirective::Reset => self.clear_filter(),
            VoiceDirective::Ignored => {}
        }
        tracing::info!(command = %command, action = %response.action, "voice command handled");
        Ok(response.message)
    }

    pub async fn seed(&mut self) -> Result<(), ApiError> {
        self.backend.seed().await?;
        tracing::info!("backend dataset reseeded");
        self.poll().await;
        Ok(())
    }

    pub async fn simulate(&mut self, request: &SimulationRequest) -> Result<(), ApiError> {
        self.backend.simulate(request).await?;
        tracing::info!(fault = %request.fault, scenario = %request.scenario, "fault injected");
        Ok(())
    }
}
