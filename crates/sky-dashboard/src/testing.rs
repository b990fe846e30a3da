use async_trait::async_trait;
use serde_json::{Map, Value, json};
use sky_client::{ApiError, Backend, CommandResponse, DataSnapshot, HealResponse, SimulationRequest};
use sky_core::{
    ActionType, FlightId, FlightSnapshot, FlightStatus, HealthStatus, OperatingMode, OptionId,
    RemediationOption,
};
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    snapshot: DataSnapshot,
    status: HealthStatus,
    heal_results: VecDeque<Result<HealResponse, ApiError>>,
    command_results: VecDeque<CommandResponse>,
    fail_snapshot: bool,
    fail_status: bool,
    fail_resolve: bool,
    snapshot_calls: usize,
    status_calls: usize,
    seed_calls: usize,
    pages: Vec<u32>,
    heal_modes: Vec<OperatingMode>,
    resolved: Vec<RemediationOption>,
    commands: Vec<String>,
    simulations: Vec<SimulationRequest>,
}

/// In-memory backend that records every call the workflow makes.
#[derive(Default)]
pub(crate) struct FakeBackend {
    inner: Mutex<Inner>,
}

impl FakeBackend {
    fn with<T>(&self, f: impl FnOnce(&mut Inner) -> T) -> T {
        let mut inner = self.inner.lock().unwrap();
        f(&mut inner)
    }

    pub fn set_snapshot(&self, snapshot: DataSnapshot) {
        self.with(|inner| inner.snapshot = snapshot);
    }

    pub fn set_status(&self, status: HealthStatus) {
        self.with(|inner| inner.status = status);
    }

    pub fn push_heal(&self, result: Result<HealResponse, ApiError>) {
        self.with(|inner| inner.heal_results.push_back(result));
    }

    pub fn push_command(&self, action: &str, payload: Value, message: Option<&str>) {
        self.with(|inner| {
            inner.command_results.push_back(CommandResponse {
                action: action.to_string(),
                payload,
                message: message.map(str::to_string),
            })
        });
    }

    pub fn fail_next_snapshot(&self) {
        self.with(|inner| inner.fail_snapshot = true);
    }

    pub fn fail_next_status(&self) {
        self.with(|inner| inner.fail_status = true);
    }

    pub fn fail_next_resolve(&self) {
        self.with(|inner| inner.fail_resolve = true);
    }

    pub fn snapshot_calls(&self) -> usize {
        self.with(|inner| inner.snapshot_calls)
    }

    pub fn status_calls(&self) -> usize {
        self.with(|inner| inner.status_calls)
    }

    pub fn seed_calls(&self) -> usize {
        self.with(|inner| inner.seed_calls)
    }

    pub fn heal_calls(&self) -> usize {
        self.with(|inner| inner.heal_modes.len())
    }

    pub fn last_heal_mode(&self) -> Option<OperatingMode> {
        self.with(|inner| inner.heal_modes.last().copied())
    }

    pub fn last_page(&self) -> Option<u32> {
        self.with(|inner| inner.pages.last().copied())
    }

    pub fn resolved(&self) -> Vec<RemediationOption> {
        self.with(|inner| inner.resolved.clone())
    }

    pub fn commands(&self) -> Vec<String> {
        self.with(|inner| inner.commands.clone())
    }

    pub fn simulations(&self) -> Vec<SimulationRequest> {
        self.with(|inner| inner.simulations.clone())
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn fetch_snapshot(&self, page: u32, _limit: u32) -> Result<DataSnapshot, ApiError> {
        self.with(|inner| {
            inner.snapshot_calls += 1;
            inner.pages.push(page);
            if std::mem::take(&mut inner.fail_snapshot) {
                return Err(ApiError::Empty { endpoint: "data" });
            }
            Ok(inner.snapshot.clone())
        })
    }

    async fn fetch_status(&self) -> Result<HealthStatus, ApiError> {
        self.with(|inner| {
            inner.status_calls += 1;
            if std::mem::take(&mut inner.fail_status) {
                return Err(ApiError::Empty { endpoint: "status" });
            }
            Ok(inner.status.clone())
        })
    }

    async fn request_remediation(&self, mode: OperatingMode) -> Result<HealResponse, ApiError> {
        self.with(|inner| {
            inner.heal_modes.push(mode);
            inner
                .heal_results
                .pop_front()
                .unwrap_or_else(|| Ok(HealResponse::default()))
        })
    }

    async fn resolve(&self, option: &RemediationOption) -> Result<(), ApiError> {
        self.with(|inner| {
            if std::mem::take(&mut inner.fail_resolve) {
                return Err(ApiError::Empty { endpoint: "resolve" });
            }
            inner.resolved.push(option.clone());
            Ok(())
        })
    }

    async fn interpret_command(&self, command: &str) -> Result<CommandResponse, ApiError> {
        self.with(|inner| {
            inner.commands.push(command.to_string());
            Ok(inner.command_results.pop_front().unwrap_or_default())
        })
    }

    async fn seed(&self) -> Result<(), ApiError> {
        self.with(|inner| inner.seed_calls += 1);
        Ok(())
    }

    async fn simulate(&self, request: &SimulationRequest) -> Result<(), ApiError> {
        self.with(|inner| inner.simulations.push(request.clone()));
        Ok(())
    }
}

pub(crate) fn flight(id: &str, number: &str, status: FlightStatus) -> FlightSnapshot {
    FlightSnapshot {
        id: FlightId::new(id),
        flight_number: number.to_string(),
        origin: "DEL".to_string(),
        destination: "BLR".to_string(),
        scheduled_departure: None,
        status,
        assigned_pilot_id: None,
        delay_minutes: None,
        predicted_failure: false,
    }
}

/// An option whose payload targets `flight-{id}`.
pub(crate) fn option(id: &str, action: &str) -> RemediationOption {
    let mut payload = Map::new();
    payload.insert("flight_id".to_string(), json!(format!("flight-{id}")));
    let mut option = RemediationOption::new(ActionType::from(action), payload);
    option.id = Some(OptionId::new(id));
    option.title = format!("Option {id}");
    option
}
