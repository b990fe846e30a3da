//! Terminal stand-in for a microphone: while capture is active, plain stdin
//! lines become transcripts, and a quiet stretch ends the capture the way a
//! recognizer does on silence.

use crate::commands::{ConsoleInput, HELP, parse_line};
use sky_dashboard::{CaptureError, OperatorAction, SpeechCapture, SpeechEvent};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

pub struct StdinCapture {
    active: Arc<AtomicBool>,
    events: mpsc::Sender<SpeechEvent>,
}

impl StdinCapture {
    pub fn new(active: Arc<AtomicBool>, events: mpsc::Sender<SpeechEvent>) -> Self {
        Self { active, events }
    }

    fn notify(&self, event: SpeechEvent) {
        if let Err(err) = self.events.try_send(event) {
            tracing::debug!(error = %err, "speech event dropped");
        }
    }
}

impl SpeechCapture for StdinCapture {
    fn start(&mut self) -> Result<(), CaptureError> {
        if self.events.is_closed() {
            return Err(CaptureError::Unavailable("input closed".to_string()));
        }
        if self.active.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::AlreadyRunning);
        }
        self.notify(SpeechEvent::Started);
        Ok(())
    }

    fn stop(&mut self) {
        if self.active.swap(false, Ordering::SeqCst) {
            self.notify(SpeechEvent::Ended);
        }
    }

    fn abort(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

pub struct StdinRouter {
    pub active: Arc<AtomicBool>,
    pub idle: Duration,
    pub actions: mpsc::Sender<OperatorAction>,
    pub speech: mpsc::Sender<SpeechEvent>,
    pub shutdown: watch::Sender<bool>,
}

impl StdinRouter {
    /// Reads stdin until EOF or `:quit`. Dropping the action sender on exit
    /// stops the dashboard loop.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                let line = match tokio::time::timeout(self.idle, lines.next_line()).await {
                    Err(_) => {
                        self.end_idle_capture();
                        continue;
                    }
                    Ok(Ok(Some(line))) => line,
                    Ok(Ok(None)) => break,
                    Ok(Err(err)) => {
                        tracing::warn!(error = %err, "stdin read failed");
                        break;
                    }
                };
                if !self.route(&line).await {
                    break;
                }
            }
            tracing::debug!("stdin closed");
        })
    }

    async fn route(&self, line: &str) -> bool {
        match parse_line(line) {
            Ok(Some(ConsoleInput::Action(action))) => self.actions.send(action).await.is_ok(),
            Ok(Some(ConsoleInput::Help)) => {
                eprintln!("{HELP}");
                true
            }
            Ok(Some(ConsoleInput::Quit)) => {
                let _ = self.shutdown.send(true);
                false
            }
            Ok(None) if self.active.load(Ordering::SeqCst) => self
                .speech
                .send(SpeechEvent::Transcript(line.to_string()))
                .await
                .is_ok(),
            Ok(None) => {
                if !line.trim().is_empty() {
                    eprintln!("microphone is off; use :mic or :say <text>");
                }
                true
            }
            Err(err) => {
                eprintln!("{}", err.message);
                true
            }
        }
    }

    fn end_idle_capture(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Err(err) = self.speech.try_send(SpeechEvent::Ended) {
            tracing::debug!(error = %err, "idle end event dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_and_stop_emit_lifecycle_events() {
        let active = Arc::new(AtomicBool::new(false));
        let (tx, mut rx) = mpsc::channel(4);
        let mut capture = StdinCapture::new(active.clone(), tx);

        capture.start().unwrap();
        assert_eq!(capture.start(), Err(CaptureError::AlreadyRunning));
        capture.stop();
        capture.stop();

        assert_eq!(rx.try_recv().unwrap(), SpeechEvent::Started);
        assert_eq!(rx.try_recv().unwrap(), SpeechEvent::Ended);
        assert!(rx.try_recv().is_err());
        assert!(!active.load(Ordering::SeqCst));
    }

    #[test]
    fn closed_channel_cannot_start() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let mut capture = StdinCapture::new(Arc::new(AtomicBool::new(false)), tx);
        assert!(matches!(capture.start(), Err(CaptureError::Unavailable(_))));
    }

    #[test]
    fn abort_is_silent() {
        let active = Arc::new(AtomicBool::new(true));
        let (tx, mut rx) = mpsc::channel(1);
        let mut capture = StdinCapture::new(active.clone(), tx);
        capture.abort();
        assert!(!active.load(Ordering::SeqCst));
        assert!(rx.try_recv().is_err());
    }
}
