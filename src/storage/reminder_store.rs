//! Reminder state persistence adapter

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::warn;

use super::KeyValueStore;
use crate::{
    error::StoreError,
    state::{ArmedContest, ReminderState},
};

pub const KEY_ENABLED: &str = "reminder_enabled";
pub const KEY_ARMED_ID: &str = "armed_contest_id";
pub const KEY_ARMED_START: &str = "armed_contest_start_time_seconds";

const ALL_KEYS: [&str; 3] = [KEY_ENABLED, KEY_ARMED_ID, KEY_ARMED_START];
const ARMED_KEYS: [&str; 2] = [KEY_ARMED_ID, KEY_ARMED_START];

/// Partial update to the reminder record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReminderPatch {
    pub enabled: Option<bool>,
    pub armed: Option<ArmedContest>,
}

impl ReminderPatch {
    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            armed: None,
        }
    }

    pub fn armed(contest: ArmedContest) -> Self {
        Self {
            enabled: None,
            armed: Some(contest),
        }
    }
}

/// Reads and writes [`ReminderState`] through a [`KeyValueStore`].
///
/// The armed id and start time are always written in one `set` and removed
/// in one `remove`, so the store never holds one without the other.
#[derive(Clone)]
pub struct ReminderStore {
    kv: Arc<dyn KeyValueStore>,
}

impl ReminderStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    pub async fn get(&self) -> Result<ReminderState, StoreError> {
        let values = self.kv.get(&ALL_KEYS).await?;

        let enabled = values
            .get(KEY_ENABLED)
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let id = values.get(KEY_ARMED_ID).and_then(Value::as_u64);
        let start = values.get(KEY_ARMED_START).and_then(Value::as_i64);

        let armed = match (id, start) {
            (Some(id), Some(start)) => Some(ArmedContest::new(id, start)),
            (None, None) => None,
            (id, start) => {
                warn!(
                    "Ignoring half-written armed contest (id={:?}, start={:?})",
                    id, start
                );
                None
            }
        };

        Ok(ReminderState { enabled, armed })
    }

    pub async fn set(&self, patch: ReminderPatch) -> Result<(), StoreError> {
        let mut entries = Map::new();
        if let Some(enabled) = patch.enabled {
            entries.insert(KEY_ENABLED.to_string(), Value::from(enabled));
        }
        if let Some(contest) = patch.armed {
            entries.insert(KEY_ARMED_ID.to_string(), Value::from(contest.id));
            entries.insert(
                KEY_ARMED_START.to_string(),
                Value::from(contest.start_time_seconds),
            );
        }

        if entries.is_empty() {
            return Ok(());
        }
        self.kv.set(entries).await
    }

    pub async fn clear_armed(&self) -> Result<(), StoreError> {
        self.kv.remove(&ARMED_KEYS).await
    }

    /// Overwrite the stored record with `state`
    pub async fn save(&self, state: &ReminderState) -> Result<(), StoreError> {
        match state.armed {
            Some(contest) => {
                self.set(ReminderPatch {
                    enabled: Some(state.enabled),
                    armed: Some(contest),
                })
                .await
            }
            None => {
                self.clear_armed().await?;
                self.set(ReminderPatch::enabled(state.enabled)).await
            }
        }
    }
}
