//! Polling, crisis detection and remediation workflow for the SkyCopilot console.

mod crisis;
pub mod runtime;
pub mod speech;
pub mod state;
pub mod summary;
pub mod view;
pub mod voice;
mod workflow;

#[cfg(test)]
mod testing;

pub use crisis::{CrisisPhase, Transition};
pub use runtime::{OperatorAction, RuntimeChannels, run};
pub use speech::{CaptureError, ListeningState, SpeechCapture, SpeechEvent, SpeechSession};
pub use state::{DashboardState, PendingDelay};
pub use summary::{CrewBreakdown, DashboardSummary};
pub use view::SortKey;
pub use workflow::{Dashboard, RemediationOutcome, ResolveOutcome};
