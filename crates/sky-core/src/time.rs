use std::time::{SystemTime, UNIX_EPOCH};

pub type EpochMillis = u64;

pub fn now_epoch_millis() -> EpochMillis {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as EpochMillis)
        .unwrap_or(0)
}

/// Milliseconds elapsed since `since`, saturating at zero for clock skew.
pub fn age_millis(since: EpochMillis, now: EpochMillis) -> EpochMillis {
    now.saturating_sub(since)
}
