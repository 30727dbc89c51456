//! Pure reminder state machine
//!
//! ```text
//!             Enable                Polled(future contest)
//!  Disabled ──────────► Idle ─────────────────────────────► Armed
//!     ▲                  ▲                                   │
//!     │                  └────────── ReminderFired ──────────┘
//!     │
//!     └──────────────── Disable (from any state)
//! ```
//!
//! [`transition`] never performs I/O. It returns the next state and the
//! effects the caller must carry out, in order.

use crate::{
    directory::Contest,
    services::Notification,
    state::{fire_time_ms, ArmedContest, ReminderState},
};

/// Alarm name for the 5-minutes-before reminder
pub const REMINDER_ALARM: &str = "contest-reminder";
/// Alarm name for the recurring directory refresh
pub const POLL_ALARM: &str = "contest-poll-refresh";

/// Inputs to the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Enable,
    Disable,
    /// Result of a directory refresh. Only meaningful while enabled.
    Polled(Option<Contest>),
    ReminderFired,
    /// Process came up with state loaded from disk.
    Restarted,
}

/// Side effects requested by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ClearReminderAlarm,
    ArmReminderAlarm { contest_id: u64, fire_at_ms: i64 },
    Notify(Notification),
    SaveEnabled(bool),
    SaveArmed(ArmedContest),
    ClearArmed,
}

/// Why a transition did nothing, or something worth logging about it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Note {
    /// Fire time already passed when we tried to arm.
    StaleArming { contest_id: u64, fire_at_ms: i64 },
    NoUpcomingContest,
    /// Poll result arrived while reminders are off.
    IgnoredWhileDisabled,
    /// Reminder alarm fired but reminders are off.
    FiredWhileDisabled,
    MissedReminder { contest_id: u64 },
    /// Persisted contest has already started; dropped without notifying.
    ExpiredArming { contest_id: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: ReminderState,
    pub effects: Vec<Effect>,
    pub note: Option<Note>,
}

impl Transition {
    fn unchanged(state: &ReminderState, note: Option<Note>) -> Self {
        Self {
            state: *state,
            effects: Vec::new(),
            note,
        }
    }
}

/// Compute the next state for `event` at wall-clock time `now_ms`
pub fn transition(state: &ReminderState, event: Event, now_ms: i64) -> Transition {
    match event {
        Event::Enable => Transition {
            state: ReminderState {
                enabled: true,
                armed: state.armed,
            },
            effects: vec![Effect::SaveEnabled(true)],
            note: None,
        },

        Event::Disable => Transition {
            state: ReminderState::default(),
            effects: vec![
                Effect::ClearReminderAlarm,
                Effect::SaveEnabled(false),
                Effect::ClearArmed,
            ],
            note: None,
        },

        Event::Polled(_) if !state.enabled => {
            Transition::unchanged(state, Some(Note::IgnoredWhileDisabled))
        }

        // An armed contest is kept until a later poll replaces it or its alarm fires.
        Event::Polled(None) => Transition::unchanged(state, Some(Note::NoUpcomingContest)),

        Event::Polled(Some(contest)) => {
            let Some(start_time_seconds) = contest.start_time_seconds else {
                return Transition::unchanged(state, Some(Note::NoUpcomingContest));
            };

            let fire_at_ms = fire_time_ms(start_time_seconds);
            if fire_at_ms <= now_ms {
                return Transition::unchanged(
                    state,
                    Some(Note::StaleArming {
                        contest_id: contest.id,
                        fire_at_ms,
                    }),
                );
            }

            let armed = ArmedContest::new(contest.id, start_time_seconds);
            Transition {
                state: ReminderState {
                    enabled: true,
                    armed: Some(armed),
                },
                effects: vec![
                    Effect::ClearReminderAlarm,
                    Effect::ArmReminderAlarm {
                        contest_id: contest.id,
                        fire_at_ms,
                    },
                    Effect::SaveArmed(armed),
                ],
                note: None,
            }
        }

        Event::ReminderFired => {
            let mut effects = Vec::with_capacity(3);
            let note = if state.enabled {
                effects.push(Effect::Notify(Notification::contest_starting()));
                None
            } else {
                Some(Note::FiredWhileDisabled)
            };
            effects.push(Effect::ClearReminderAlarm);
            effects.push(Effect::ClearArmed);

            Transition {
                state: ReminderState {
                    enabled: state.enabled,
                    armed: None,
                },
                effects,
                note,
            }
        }

        Event::Restarted => restarted(state, now_ms),
    }
}

fn restarted(state: &ReminderState, now_ms: i64) -> Transition {
    let Some(armed) = state.armed else {
        return Transition::unchanged(state, None);
    };

    let cleared = ReminderState {
        enabled: state.enabled,
        armed: None,
    };

    if !state.enabled {
        return Transition {
            state: cleared,
            effects: vec![Effect::ClearArmed],
            note: None,
        };
    }

    let fire_at_ms = armed.fire_at_ms();
    if fire_at_ms > now_ms {
        // In-process alarms do not survive a restart; put it back.
        return Transition {
            state: *state,
            effects: vec![
                Effect::ClearReminderAlarm,
                Effect::ArmReminderAlarm {
                    contest_id: armed.id,
                    fire_at_ms,
                },
            ],
            note: None,
        };
    }

    if fire_at_ms < now_ms && now_ms < armed.start_ms() {
        return Transition {
            state: cleared,
            effects: vec![
                Effect::Notify(Notification::missed_reminder()),
                Effect::ClearArmed,
            ],
            note: Some(Note::MissedReminder {
                contest_id: armed.id,
            }),
        };
    }

    Transition {
        state: cleared,
        effects: vec![Effect::ClearArmed],
        note: Some(Note::ExpiredArming {
            contest_id: armed.id,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::contest::contest;
    use crate::directory::ContestPhase;
    use crate::state::SchedulerPhase;

    const MINUTE_MS: i64 = 60_000;

    fn enabled() -> ReminderState {
        ReminderState {
            enabled: true,
            armed: None,
        }
    }

    fn upcoming(id: u64, start_time_seconds: i64) -> Contest {
        contest(id, ContestPhase::Before, start_time_seconds)
    }

    fn armed_effects(t: &Transition) -> Vec<(u64, i64)> {
        t.effects
            .iter()
            .filter_map(|e| match e {
                Effect::ArmReminderAlarm {
                    contest_id,
                    fire_at_ms,
                } => Some((*contest_id, *fire_at_ms)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn poll_arms_five_minutes_before_start() {
        let now_ms = 999_999_000 * 1000;
        let t = transition(
            &enabled(),
            Event::Polled(Some(upcoming(42, 1_000_000_000))),
            now_ms,
        );

        assert_eq!(armed_effects(&t), vec![(42, 999_999_700_000)]);
        assert_eq!(
            t.effects.first(),
            Some(&Effect::ClearReminderAlarm),
            "previous alarm must be cleared before re-arming"
        );
        assert!(t
            .effects
            .contains(&Effect::SaveArmed(ArmedContest::new(42, 1_000_000_000))));
        assert_eq!(
            t.state.phase(),
            SchedulerPhase::Armed(ArmedContest::new(42, 1_000_000_000))
        );
    }

    #[test]
    fn poll_never_arms_in_the_past() {
        let start = 1_000_000_000;
        let fire = fire_time_ms(start);

        for now_ms in [fire, fire + 1, start * 1000, start * 1000 + MINUTE_MS] {
            let t = transition(&enabled(), Event::Polled(Some(upcoming(1, start))), now_ms);
            assert!(t.effects.is_empty(), "armed at now={now_ms}");
            assert_eq!(t.state, enabled());
            assert!(matches!(t.note, Some(Note::StaleArming { .. })));
        }
    }

    #[test]
    fn stale_poll_keeps_existing_arming() {
        let existing = ReminderState {
            enabled: true,
            armed: Some(ArmedContest::new(9, 2_000_000_000)),
        };
        let start = 1_000_000_000;
        let t = transition(
            &existing,
            Event::Polled(Some(upcoming(1, start))),
            start * 1000,
        );
        assert_eq!(t.state, existing);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn poll_while_disabled_does_nothing() {
        let t = transition(
            &ReminderState::default(),
            Event::Polled(Some(upcoming(1, 2_000_000_000))),
            0,
        );
        assert!(t.effects.is_empty());
        assert_eq!(t.state.phase(), SchedulerPhase::Disabled);
        assert_eq!(t.note, Some(Note::IgnoredWhileDisabled));
    }

    #[test]
    fn empty_poll_leaves_arming_alone() {
        let existing = ReminderState {
            enabled: true,
            armed: Some(ArmedContest::new(9, 2_000_000_000)),
        };
        let t = transition(&existing, Event::Polled(None), 0);
        assert_eq!(t.state, existing);
        assert!(t.effects.is_empty());
        assert_eq!(t.note, Some(Note::NoUpcomingContest));
    }

    #[test]
    fn second_poll_replaces_first_arming() {
        let now_ms = 1_000;
        let first = transition(&enabled(), Event::Polled(Some(upcoming(1, 5_000))), now_ms);
        let second = transition(
            &first.state,
            Event::Polled(Some(upcoming(2, 4_000))),
            now_ms,
        );

        assert_eq!(second.state.armed, Some(ArmedContest::new(2, 4_000)));
        assert_eq!(second.effects[0], Effect::ClearReminderAlarm);
        assert_eq!(armed_effects(&second), vec![(2, fire_time_ms(4_000))]);
    }

    #[test]
    fn enable_persists_flag_and_keeps_arming() {
        let t = transition(&ReminderState::default(), Event::Enable, 0);
        assert_eq!(t.state, enabled());
        assert_eq!(t.effects, vec![Effect::SaveEnabled(true)]);
    }

    #[test]
    fn disable_clears_everything() {
        let armed = ReminderState {
            enabled: true,
            armed: Some(ArmedContest::new(3, 4)),
        };
        let t = transition(&armed, Event::Disable, 0);
        assert_eq!(t.state, ReminderState::default());
        assert_eq!(
            t.effects,
            vec![
                Effect::ClearReminderAlarm,
                Effect::SaveEnabled(false),
                Effect::ClearArmed
            ]
        );
    }

    #[test]
    fn fire_notifies_and_returns_to_idle() {
        let armed = ReminderState {
            enabled: true,
            armed: Some(ArmedContest::new(3, 4)),
        };
        let t = transition(&armed, Event::ReminderFired, 0);
        assert_eq!(t.state.phase(), SchedulerPhase::Idle);
        assert_eq!(
            t.effects,
            vec![
                Effect::Notify(Notification::contest_starting()),
                Effect::ClearReminderAlarm,
                Effect::ClearArmed
            ]
        );
    }

    #[test]
    fn fire_while_disabled_is_silent() {
        let t = transition(&ReminderState::default(), Event::ReminderFired, 0);
        assert!(!t.effects.iter().any(|e| matches!(e, Effect::Notify(_))));
        assert_eq!(t.note, Some(Note::FiredWhileDisabled));
    }

    #[test]
    fn restart_inside_missed_window_notifies_once() {
        let now_ms: i64 = 1_700_000_000_000;
        // Starts in 2 minutes, so the fire time was 3 minutes ago.
        let start_seconds = (now_ms + 2 * MINUTE_MS) / 1000;
        let state = ReminderState {
            enabled: true,
            armed: Some(ArmedContest::new(77, start_seconds)),
        };
        let t = transition(&state, Event::Restarted, now_ms);

        let notifications: Vec<_> = t
            .effects
            .iter()
            .filter(|e| matches!(e, Effect::Notify(_)))
            .collect();
        assert_eq!(
            notifications,
            vec![&Effect::Notify(Notification::missed_reminder())]
        );
        assert!(t.effects.contains(&Effect::ClearArmed));
        assert_eq!(t.state.phase(), SchedulerPhase::Idle);
        assert_eq!(t.note, Some(Note::MissedReminder { contest_id: 77 }));
    }

    #[test]
    fn restart_after_contest_started_is_silent() {
        let now_ms: i64 = 1_700_000_000_000;
        let start_seconds = (now_ms - MINUTE_MS) / 1000;
        let state = ReminderState {
            enabled: true,
            armed: Some(ArmedContest::new(77, start_seconds)),
        };
        let t = transition(&state, Event::Restarted, now_ms);

        assert_eq!(t.effects, vec![Effect::ClearArmed]);
        assert_eq!(t.note, Some(Note::ExpiredArming { contest_id: 77 }));
    }

    #[test]
    fn restart_before_fire_time_rearms() {
        let now_ms: i64 = 1_700_000_000_000;
        let start_seconds = (now_ms + 60 * MINUTE_MS) / 1000;
        let state = ReminderState {
            enabled: true,
            armed: Some(ArmedContest::new(5, start_seconds)),
        };
        let t = transition(&state, Event::Restarted, now_ms);

        assert_eq!(t.state, state);
        assert_eq!(armed_effects(&t), vec![(5, fire_time_ms(start_seconds))]);
        assert!(!t.effects.iter().any(|e| matches!(e, Effect::Notify(_))));
    }

    #[test]
    fn restart_while_disabled_drops_leftover_arming() {
        let state = ReminderState {
            enabled: false,
            armed: Some(ArmedContest::new(5, 2_000_000_000)),
        };
        let t = transition(&state, Event::Restarted, 0);
        assert_eq!(t.state, ReminderState::default());
        assert_eq!(t.effects, vec![Effect::ClearArmed]);
    }

    #[test]
    fn restart_with_nothing_armed_is_noop() {
        let t = transition(&enabled(), Event::Restarted, 0);
        assert!(t.effects.is_empty());
        assert_eq!(t.state, enabled());
    }
}
