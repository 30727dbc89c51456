//! Named one-shot and recurring alarms on top of tokio timers

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{interval_at, sleep, Instant, MissedTickBehavior},
};
use tracing::{debug, warn};

use crate::{clock::Clock, scheduler::SchedulerEvent};

/// Longest single sleep while waiting for an absolute deadline.
///
/// The monotonic clock can stall across system suspend, so the wall clock is
/// re-read at least this often.
const MAX_SLEEP_SLICE: Duration = Duration::from_secs(30);

/// When an alarm goes off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmSchedule {
    /// Once, at an absolute epoch-millisecond instant.
    At(i64),
    /// After `delay`, then every `period`.
    Every { delay: Duration, period: Duration },
}

/// Identifies one arming of a named alarm; every `create` hands out a new one.
pub type AlarmId = u64;

/// Host timer facility.
///
/// Alarms are keyed by name; creating an alarm replaces any existing alarm
/// with the same name.
pub trait AlarmFacility: Send + Sync {
    /// Arm `name`, returning the id its fired events will carry.
    fn create(&self, name: &str, schedule: AlarmSchedule) -> AlarmId;

    /// Returns whether an alarm was removed.
    fn clear(&self, name: &str) -> bool;
}

struct Entry {
    generation: AlarmId,
    handle: JoinHandle<()>,
}

type Registry = Arc<Mutex<HashMap<String, Entry>>>;

/// [`AlarmFacility`] that posts [`SchedulerEvent::AlarmFired`] to the scheduler
pub struct TokioAlarms {
    timers: Registry,
    events: mpsc::Sender<SchedulerEvent>,
    clock: Arc<dyn Clock>,
    next_generation: AtomicU64,
}

impl TokioAlarms {
    pub fn new(events: mpsc::Sender<SchedulerEvent>, clock: Arc<dyn Clock>) -> Self {
        Self {
            timers: Arc::new(Mutex::new(HashMap::new())),
            events,
            clock,
            next_generation: AtomicU64::new(0),
        }
    }

    /// Names of alarms currently scheduled
    pub fn active(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .timers
            .lock()
            .map(|timers| timers.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}

impl AlarmFacility for TokioAlarms {
    fn create(&self, name: &str, schedule: AlarmSchedule) -> AlarmId {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let name_owned = name.to_string();
        let events = self.events.clone();
        let clock = Arc::clone(&self.clock);
        let timers = Arc::clone(&self.timers);

        // Held across the spawn so a deadline already in the past cannot fire
        // before the entry is registered.
        let mut registry = match self.timers.lock() {
            Ok(registry) => registry,
            Err(e) => {
                warn!("Failed to lock alarm registry: {}", e);
                return generation;
            }
        };

        let handle = tokio::spawn(async move {
            match schedule {
                AlarmSchedule::At(at_ms) => {
                    sleep_until_wall_clock(clock.as_ref(), at_ms).await;
                    // One-shot alarms leave the registry as they fire.
                    if let Ok(mut timers) = timers.lock() {
                        if timers
                            .get(&name_owned)
                            .is_some_and(|e| e.generation == generation)
                        {
                            timers.remove(&name_owned);
                        }
                    }
                    debug!("Alarm '{}' fired", name_owned);
                    if events
                        .send(SchedulerEvent::AlarmFired {
                            name: name_owned.clone(),
                            generation,
                        })
                        .await
                        .is_err()
                    {
                        warn!("Alarm '{}' fired but scheduler is gone", name_owned);
                    }
                }
                AlarmSchedule::Every { delay, period } => {
                    let mut ticker = interval_at(Instant::now() + delay, period);
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                    loop {
                        ticker.tick().await;
                        debug!("Recurring alarm '{}' fired", name_owned);
                        if events
                            .send(SchedulerEvent::AlarmFired {
                            name: name_owned.clone(),
                            generation,
                        })
                            .await
                            .is_err()
                        {
                            warn!("Scheduler is gone, stopping alarm '{}'", name_owned);
                            break;
                        }
                    }
                }
            }
        });

        if let Some(previous) = registry.insert(name.to_string(), Entry { generation, handle }) {
            previous.handle.abort();
            debug!("Replaced alarm '{}'", name);
        }
        generation
    }

    fn clear(&self, name: &str) -> bool {
        match self.timers.lock() {
            Ok(mut timers) => match timers.remove(name) {
                Some(entry) => {
                    entry.handle.abort();
                    debug!("Cleared alarm '{}'", name);
                    true
                }
                None => false,
            },
            Err(e) => {
                warn!("Failed to lock alarm registry: {}", e);
                false
            }
        }
    }
}

impl Drop for TokioAlarms {
    fn drop(&mut self) {
        if let Ok(mut timers) = self.timers.lock() {
            for (_, entry) in timers.drain() {
                entry.handle.abort();
            }
        }
    }
}

async fn sleep_until_wall_clock(clock: &dyn Clock, at_ms: i64) {
    loop {
        let remaining = at_ms - clock.now_ms();
        if remaining <= 0 {
            return;
        }
        let slice = Duration::from_millis(remaining as u64).min(MAX_SLEEP_SLICE);
        sleep(slice).await;
    }
}
