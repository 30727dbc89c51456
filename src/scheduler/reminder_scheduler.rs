//! Effect executor around the reminder state machine

use std::sync::Arc;

use chrono::SecondsFormat;
use tracing::{debug, error, info, warn};

use super::machine::{transition, Effect, Event, Note, Transition, POLL_ALARM, REMINDER_ALARM};
use crate::{
    clock::Clock,
    directory::ContestDirectory,
    error::{SchedulerError, StoreError},
    services::{AlarmFacility, AlarmId, AlarmSchedule, Notifier},
    state::{status::utc_from_ms, ReminderState, SchedulerStatus},
    storage::{ReminderPatch, ReminderStore},
};

/// Process-wide reminder controller.
///
/// Owns the in-memory [`ReminderState`]. Every public method is one
/// transition; callers must not run two at once (the scheduler task
/// guarantees this by handling one event at a time).
pub struct ReminderScheduler {
    directory: Arc<dyn ContestDirectory>,
    store: ReminderStore,
    alarms: Arc<dyn AlarmFacility>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    poll_schedule: AlarmSchedule,
    state: ReminderState,
    // Last write failed; disk may lag behind `state`.
    dirty: bool,
    // Persisted record has been read (or overridden by a user command).
    loaded: bool,
    reminder_alarm: Option<AlarmId>,
}

impl ReminderScheduler {
    pub fn new(
        directory: Arc<dyn ContestDirectory>,
        store: ReminderStore,
        alarms: Arc<dyn AlarmFacility>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        poll_schedule: AlarmSchedule,
    ) -> Self {
        Self {
            directory,
            store,
            alarms,
            notifier,
            clock,
            poll_schedule,
            state: ReminderState::default(),
            dirty: false,
            loaded: false,
            reminder_alarm: None,
        }
    }

    pub fn state(&self) -> ReminderState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus::from_state(&self.state, self.dirty)
    }

    /// Process startup: load state, recover, start polling.
    pub async fn start(&mut self) -> Result<(), SchedulerError> {
        self.alarms.create(POLL_ALARM, self.poll_schedule);
        debug!("Poll alarm scheduled: {:?}", self.poll_schedule);

        self.poll_tick().await
    }

    pub async fn enable(&mut self) -> Result<(), SchedulerError> {
        info!("Enabling contest reminders");
        self.load_before_command().await;
        let mut result = self.apply(Event::Enable).await;
        let next = self.directory.fetch_next_upcoming_contest().await;
        keep_first(&mut result, self.apply(Event::Polled(next)).await);
        result
    }

    pub async fn disable(&mut self) -> Result<(), SchedulerError> {
        info!("Disabling contest reminders");
        self.load_before_command().await;
        self.apply(Event::Disable).await
    }

    /// Refresh the directory and re-arm. Does nothing while disabled.
    ///
    /// Retries loading the persisted state first if it has not been read yet.
    pub async fn poll_tick(&mut self) -> Result<(), SchedulerError> {
        let loaded = self.load().await;
        if !self.state.enabled {
            debug!("Reminders disabled, skipping poll");
            return loaded;
        }

        let next = self.directory.fetch_next_upcoming_contest().await;
        let mut result = loaded;
        keep_first(&mut result, self.apply(Event::Polled(next)).await);
        result
    }

    /// Dispatch a fired alarm by name.
    ///
    /// A reminder alarm whose `generation` is not the one currently armed was
    /// replaced or cleared after it fired and is ignored.
    pub async fn timer_fired(
        &mut self,
        name: &str,
        generation: AlarmId,
    ) -> Result<(), SchedulerError> {
        match name {
            REMINDER_ALARM if self.reminder_alarm != Some(generation) => {
                debug!(
                    "Ignoring stale reminder alarm (generation {}, armed {:?})",
                    generation, self.reminder_alarm
                );
                Ok(())
            }
            REMINDER_ALARM => {
                info!("Contest reminder alarm fired");
                self.apply(Event::ReminderFired).await
            }
            POLL_ALARM => {
                debug!("Poll alarm fired");
                self.poll_tick().await
            }
            other => {
                warn!("Ignoring unknown alarm '{}'", other);
                Ok(())
            }
        }
    }

    /// Detect a reminder window that passed while the process was down.
    pub async fn on_restart_recovery_check(&mut self) -> Result<(), SchedulerError> {
        self.apply(Event::Restarted).await
    }

    /// Read the persisted record once; until that succeeds the scheduler
    /// stays disabled and every poll retries.
    async fn load(&mut self) -> Result<(), SchedulerError> {
        if self.loaded {
            return Ok(());
        }

        let state = match self.store.get().await {
            Ok(state) => state,
            Err(e) => {
                error!("Failed to load reminder state, staying disabled: {}", e);
                return Err(e.into());
            }
        };

        info!(
            "Loaded reminder state: {} (armed contest: {:?})",
            state.phase().name(),
            state.armed.map(|c| c.id)
        );
        self.state = state;
        self.loaded = true;
        self.on_restart_recovery_check().await
    }

    /// A user command makes the in-memory record authoritative when the
    /// store still cannot be read; the whole record is written on the next
    /// transition.
    async fn load_before_command(&mut self) {
        if self.load().await.is_err() {
            self.loaded = true;
            self.dirty = true;
        }
    }

    async fn apply(&mut self, event: Event) -> Result<(), SchedulerError> {
        let resynced = self.resync().await;

        let now_ms = self.clock.now_ms();
        let Transition {
            state,
            effects,
            note,
        } = transition(&self.state, event, now_ms);

        if let Some(note) = note {
            log_note(note);
        }
        if state.phase() != self.state.phase() {
            info!(
                "Reminder scheduler: {} -> {}",
                self.state.phase().name(),
                state.phase().name()
            );
        }
        self.state = state;

        let persisted = self.execute(effects).await;

        match resynced.and(persisted) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.dirty = true;
                warn!("Reminder state not persisted, will retry on next transition: {}", e);
                Err(e.into())
            }
        }
    }

    /// Write the whole in-memory record if an earlier write failed
    async fn resync(&mut self) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }

        self.store.save(&self.state).await?;
        self.dirty = false;
        info!("Reminder state reconciled with store");
        Ok(())
    }

    /// Run effects in order. Store failures do not stop later effects; the
    /// first one is returned.
    async fn execute(&mut self, effects: Vec<Effect>) -> Result<(), StoreError> {
        let mut result = Ok(());

        for effect in effects {
            match effect {
                Effect::ClearReminderAlarm => {
                    self.alarms.clear(REMINDER_ALARM);
                    self.reminder_alarm = None;
                }
                Effect::ArmReminderAlarm {
                    contest_id,
                    fire_at_ms,
                } => {
                    self.reminder_alarm =
                        Some(self.alarms.create(REMINDER_ALARM, AlarmSchedule::At(fire_at_ms)));
                    info!(
                        "Reminder armed for contest {} at {}",
                        contest_id,
                        format_ms(fire_at_ms)
                    );
                }
                Effect::Notify(notification) => {
                    self.notifier.show(&notification).await;
                }
                Effect::SaveEnabled(enabled) => {
                    keep_first(&mut result, self.store.set(ReminderPatch::enabled(enabled)).await);
                }
                Effect::SaveArmed(contest) => {
                    keep_first(&mut result, self.store.set(ReminderPatch::armed(contest)).await);
                }
                Effect::ClearArmed => {
                    keep_first(&mut result, self.store.clear_armed().await);
                }
            }
        }

        result
    }
}

fn keep_first<E>(slot: &mut Result<(), E>, next: Result<(), E>) {
    if slot.is_ok() {
        *slot = next;
    }
}

fn format_ms(ms: i64) -> String {
    utc_from_ms(ms)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| format!("{ms}ms"))
}

fn log_note(note: Note) {
    match note {
        Note::StaleArming {
            contest_id,
            fire_at_ms,
        } => info!(
            "Reminder time {} for contest {} already passed, not arming",
            format_ms(fire_at_ms),
            contest_id
        ),
        Note::NoUpcomingContest => debug!("No upcoming contest this cycle"),
        Note::IgnoredWhileDisabled => debug!("Poll result ignored, reminders disabled"),
        Note::FiredWhileDisabled => warn!("Reminder alarm fired while disabled, suppressing"),
        Note::MissedReminder { contest_id } => {
            warn!("Missed the reminder for contest {} while not running", contest_id)
        }
        Note::ExpiredArming { contest_id } => {
            info!("Contest {} already started, dropping stale reminder", contest_id)
        }
    }
}
