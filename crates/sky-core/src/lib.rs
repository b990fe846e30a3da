pub mod domain;
pub mod error;
pub mod ids;
pub mod mode;
pub mod time;

pub use domain::{
    ActionType, Co2Impact, DisplayFilter, FATIGUE_ALERT_THRESHOLD, FilterTarget, FlightSnapshot,
    FlightStatus, HealthStatus, ImpactLevel, PilotReadiness, PilotStatus, RemediationOption,
};
pub use error::{ErrorCode, SkyError, SkyResult};
pub use ids::{FlightId, OptionId, PilotId};
pub use mode::OperatingMode;
pub use time::{EpochMillis, age_millis, now_epoch_millis};
