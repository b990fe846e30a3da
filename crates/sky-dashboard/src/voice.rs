//! Local handling of interpreted voice commands. The backend parses the
//! transcript; this layer only understands the two display directives.

use sky_client::CommandResponse;
use sky_core::DisplayFilter;

pub const ACTION_FILTER: &str = "FILTER";
pub const ACTION_RESET: &str = "RESET";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceDirective {
    SetFilter(DisplayFilter),
    Reset,
    Ignored,
}

pub fn directive_for(response: &CommandResponse) -> VoiceDirective {
    match response.action.as_str() {
        ACTION_RESET => VoiceDirective::Reset,
        ACTION_FILTER => match response.payload.as_str().map(str::parse::<DisplayFilter>) {
            Some(Ok(filter)) => VoiceDirective::SetFilter(filter),
            _ => {
                tracing::warn!(payload = %response.payload, "voice filter payload not recognized");
                VoiceDirective::Ignored
            }
        },
        _ => VoiceDirective::Ignored,
    }
}

/// Trimmed transcript, or `None` when there is nothing worth sending.
pub fn normalize_transcript(transcript: &str) -> Option<&str> {
    let trimmed = transcript.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

pub(crate) fn action_label(response: &CommandResponse) -> String {
    match response.action.as_str() {
        "" => "NONE".to_string(),
        action => action.to_string(),
    }
}
