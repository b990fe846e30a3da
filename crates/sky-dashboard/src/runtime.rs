//! The event loop: one poll per tick, operator actions and speech events in
//! between, all applied to a single [`Dashboard`] so updates never interleave.

use crate::speech::{ListeningState, SpeechEvent, SpeechSession};
use crate::view::SortKey;
use crate::workflow::{Dashboard, RemediationOutcome, ResolveOutcome};
use sky_client::{ApiError, Backend, SimulationRequest};
use sky_core::{DisplayFilter, OperatingMode, OptionId};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{MissedTickBehavior, interval};

#[derive(Debug, Clone, PartialEq)]
pub enum OperatorAction {
    Refresh,
    SetPage(u32),
    SetMode(OperatingMode),
    /// Apply the given option, or the recommendation when `None`.
    Resolve(Option<OptionId>),
    RejectRecommendation,
    SetDelayMinutes(u32),
    ConfirmDelay,
    CancelDelay,
    SetFilter(DisplayFilter),
    SetSort(SortKey),
    Transcript(String),
    ToggleListening,
    Seed,
    Simulate(SimulationRequest),
}

pub struct RuntimeChannels {
    pub actions: mpsc::Receiver<OperatorAction>,
    pub speech: mpsc::Receiver<SpeechEvent>,
    pub shutdown: watch::Receiver<bool>,
}

/// Drives `dashboard` until shutdown is signalled or the action channel closes.
/// `on_update` sees the dashboard after every handled event, with a notice
/// for the operator when there is one.
pub async fn run<B, F>(
    dashboard: &mut Dashboard<B>,
    speech: &mut SpeechSession,
    poll_interval: Duration,
    channels: RuntimeChannels,
    mut on_update: F,
) where
    B: Backend,
    F: FnMut(&Dashboard<B>, ListeningState, Option<&str>),
{
    let RuntimeChannels {
        mut actions,
        speech: mut speech_events,
        mut shutdown,
    } = channels;
    let mut ticker = interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut speech_open = true;

    tracing::info!(interval_ms = poll_interval.as_millis() as u64, "dashboard loop started");
    loop {
        let notice = tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
                continue;
            }
            _ = ticker.tick() => {
                dashboard.poll().await;
                None
            }
            action = actions.recv() => match action {
                Some(action) => apply_action(dashboard, speech, action).await,
                None => break,
            },
            event = speech_events.recv(), if speech_open => match event {
                Some(event) => apply_speech_event(dashboard, speech, event).await,
                None => {
                    speech_open = false;
                    continue;
                }
            },
        };
        on_update(dashboard, speech.state(), notice.as_deref());
    }

    speech.teardown();
    tracing::info!("dashboard loop stopped");
}

async fn apply_action<B: Backend>(
    dashboard: &mut Dashboard<B>,
    speech: &mut SpeechSession,
    action: OperatorAction,
) -> Option<String> {
    match action {
        OperatorAction::Refresh => {
            dashboard.poll().await;
            None
        }
        OperatorAction::SetPage(page) => {
            dashboard.set_page(page).await;
            None
        }
        OperatorAction::SetMode(mode) => match dashboard.set_mode(mode).await {
            Some(RemediationOutcome::Failed) => {
                Some(format!("mode set to {mode}, options could not be refreshed"))
            }
            _ => Some(format!("mode set to {mode}")),
        },
        OperatorAction::Resolve(None) => resolution_notice(dashboard.resolve(None).await),
        OperatorAction::Resolve(Some(id)) => {
            resolution_notice(dashboard.resolve_by_id(id.as_str()).await)
        }
        OperatorAction::RejectRecommendation => {
            resolution_notice(dashboard.reject_recommendation().await)
        }
        OperatorAction::SetDelayMinutes(minutes) => {
            (!dashboard.set_delay_minutes(minutes)).then(|| "no delay awaiting input".to_string())
        }
        OperatorAction::ConfirmDelay => resolution_notice(dashboard.confirm_manual_delay().await),
        OperatorAction::CancelDelay => {
            dashboard.cancel_manual_delay();
            None
        }
        OperatorAction::SetFilter(filter) => {
            dashboard.set_filter(filter);
            None
        }
        OperatorAction::SetSort(sort) => {
            dashboard.set_sort(sort);
            None
        }
        OperatorAction::Transcript(text) => voice_notice(dashboard.handle_transcript(&text).await),
        OperatorAction::ToggleListening => match speech.toggle() {
            ListeningState::Listening => Some("listening".to_string()),
            ListeningState::Stopped => Some("microphone off".to_string()),
        },
        OperatorAction::Seed => match dashboard.seed().await {
            Ok(()) => Some("backend reseeded".to_string()),
            Err(err) => Some(err.to_string()),
        },
        OperatorAction::Simulate(request) => match dashboard.simulate(&request).await {
            Ok(()) => Some(format!("{} fault injected", request.fault)),
            Err(err) => Some(err.to_string()),
        },
    }
}

async fn apply_speech_event<B: Backend>(
    dashboard: &mut Dashboard<B>,
    speech: &mut SpeechSession,
    event: SpeechEvent,
) -> Option<String> {
    match event {
        SpeechEvent::Started => {
            speech.on_started();
            None
        }
        SpeechEvent::Ended => {
            speech.on_ended();
            None
        }
        SpeechEvent::Failed(reason) => {
            speech.on_failed(&reason);
            Some(format!("speech capture failed: {reason}"))
        }
        SpeechEvent::Transcript(text) => match speech.on_transcript(&text) {
            Some(command) => voice_notice(dashboard.handle_transcript(command).await),
            None => None,
        },
    }
}

fn resolution_notice(result: Result<ResolveOutcome, ApiError>) -> Option<String> {
    match result {
        Ok(ResolveOutcome::Submitted) => Some("resolution applied".to_string()),
        Ok(ResolveOutcome::AwaitingDelayInput) => {
            Some("enter delay minutes, then confirm".to_string())
        }
        Ok(ResolveOutcome::NothingToResolve) => None,
        Err(err) => Some(format!("resolution failed: {err}")),
    }
}

fn voice_notice(result: Result<Option<String>, ApiError>) -> Option<String> {
    match result {
        Ok(message) => message,
        Err(err) => {
            tracing::warn!(error = %err, "voice command failed");
            Some(format!("voice command failed: {err}"))
        }
    }
}
