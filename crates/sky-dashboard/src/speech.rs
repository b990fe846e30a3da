//! Continuous speech capture as an explicit {STOPPED, LISTENING} machine.
//!
//! Capture sources stop on their own (idle timeouts, dropped sessions). The
//! session keeps a separate `desired` flag so an unexpected end restarts
//! capture while an operator stop does not.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("speech capture permission denied")]
    PermissionDenied,
    #[error("speech capture already running")]
    AlreadyRunning,
    #[error("speech capture unavailable: {0}")]
    Unavailable(String),
}

/// A source of recognized speech. Lifecycle events (`Started`, `Ended`,
/// transcripts) arrive separately as [`SpeechEvent`]s.
pub trait SpeechCapture: Send {
    fn start(&mut self) -> Result<(), CaptureError>;
    fn stop(&mut self);
    fn abort(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    Started,
    Ended,
    Transcript(String),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListeningState {
    Stopped,
    Listening,
}

pub struct SpeechSession {
    capture: Box<dyn SpeechCapture>,
    state: ListeningState,
    desired: bool,
    torn_down: bool,
}

impl SpeechSession {
    pub fn new(capture: Box<dyn SpeechCapture>) -> Self {
        Self {
            capture,
            state: ListeningState::Stopped,
            desired: false,
            torn_down: false,
        }
    }

    pub fn state(&self) -> ListeningState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == ListeningState::Listening
    }

    pub fn desired(&self) -> bool {
        self.desired
    }

    pub fn toggle(&mut self) -> ListeningState {
        if self.torn_down {
            return self.state;
        }
        if self.is_listening() {
            self.desired = false;
            self.state = ListeningState::Stopped;
            self.capture.stop();
        } else {
            self.desired = true;
            self.try_start();
        }
        self.state
    }

    pub fn on_started(&mut self) {
        if !self.torn_down {
            self.state = ListeningState::Listening;
        }
    }

    pub fn on_ended(&mut self) -> ListeningState {
        if should_restart(self.desired, self.torn_down) {
            tracing::debug!("speech capture ended unexpectedly, restarting");
            self.try_start();
        } else {
            self.state = ListeningState::Stopped;
        }
        self.state
    }

    pub fn on_failed(&mut self, reason: &str) {
        tracing::warn!(reason = %reason, "speech capture failed");
        self.desired = false;
        self.state = ListeningState::Stopped;
    }

    pub fn on_transcript<'a>(&self, transcript: &'a str) -> Option<&'a str> {
        if self.torn_down {
            return None;
        }
        crate::voice::normalize_transcript(transcript)
    }

    /// Stops capture for good; later events are ignored.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.desired = false;
        self.state = ListeningState::Stopped;
        self.capture.abort();
    }

    fn try_start(&mut self) {
        match self.capture.start() {
            Ok(()) => self.state = ListeningState::Listening,
            Err(err) => {
                tracing::warn!(error = %err, "speech capture could not start");
                self.desired = false;
                self.state = ListeningState::Stopped;
            }
        }
    }
}

impl Drop for SpeechSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn should_restart(desired: bool, torn_down: bool) -> bool {
    desired && !torn_down
}
