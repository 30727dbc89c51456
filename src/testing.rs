//! In-process fakes for the scheduler's collaborators

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;

use crate::{
    directory::{Contest, ContestDirectory},
    error::DirectoryError,
    services::{AlarmFacility, AlarmId, AlarmSchedule, Notification, Notifier},
};

/// Directory that always answers with a preset next contest
#[derive(Debug, Default)]
pub struct FakeDirectory {
    next: Mutex<Option<Contest>>,
    calls: AtomicUsize,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_next(&self, next: Option<Contest>) {
        if let Ok(mut slot) = self.next.lock() {
            *slot = next;
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContestDirectory for FakeDirectory {
    async fn fetch_contests(&self) -> Result<Vec<Contest>, DirectoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .next
            .lock()
            .map(|next| next.iter().cloned().collect())
            .unwrap_or_default())
    }
}

/// Alarm facility that only records what is scheduled
#[derive(Debug, Default)]
pub struct RecordingAlarms {
    active: Mutex<HashMap<String, (AlarmSchedule, AlarmId)>>,
    created: Mutex<Vec<String>>,
}

impl RecordingAlarms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<AlarmSchedule> {
        self.active.lock().ok().and_then(|a| a.get(name).map(|(s, _)| *s))
    }

    /// Id handed out for the current arming of `name`
    pub fn generation(&self, name: &str) -> Option<AlarmId> {
        self.active.lock().ok().and_then(|a| a.get(name).map(|(_, id)| *id))
    }

    pub fn active_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .active
            .lock()
            .map(|a| a.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// How many times `name` was created
    pub fn created(&self, name: &str) -> usize {
        self.created
            .lock()
            .map(|c| c.iter().filter(|n| n.as_str() == name).count())
            .unwrap_or(0)
    }
}

impl AlarmFacility for RecordingAlarms {
    fn create(&self, name: &str, schedule: AlarmSchedule) -> AlarmId {
        let generation = match self.created.lock() {
            Ok(mut created) => {
                created.push(name.to_string());
                created.len() as AlarmId
            }
            Err(_) => 0,
        };
        if let Ok(mut active) = self.active.lock() {
            active.insert(name.to_string(), (schedule, generation));
        }
        generation
    }

    fn clear(&self, name: &str) -> bool {
        self.active
            .lock()
            .map(|mut a| a.remove(name).is_some())
            .unwrap_or(false)
    }
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    shown: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Vec<Notification> {
        self.shown.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn show(&self, notification: &Notification) {
        if let Ok(mut shown) = self.shown.lock() {
            shown.push(notification.clone());
        }
    }
}
