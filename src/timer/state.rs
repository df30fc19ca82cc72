use chrono::{DateTime, Duration, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use super::TimerReadout;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Work,
    Break,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Work => "WORK",
            Phase::Break => "BREAK",
        }
    }
}

/// Running timers know when they end; paused timers know how much is left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Running { deadline: DateTime<Utc> },
    Paused { remaining: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    pub phase: Phase,
    pub countdown: Countdown,
}

impl TimerState {
    /// A fresh, paused work interval.
    pub fn ready(durations: &TimerDurations) -> Self {
        Self {
            phase: Phase::Work,
            countdown: Countdown::Paused {
                remaining: durations.work,
            },
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.countdown, Countdown::Running { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerDurations {
    pub work: Duration,
    pub rest: Duration,
}

impl Default for TimerDurations {
    fn default() -> Self {
        Self {
            work: Duration::minutes(20),
            rest: Duration::minutes(5),
        }
    }
}

/// Automatic transition fired by [`Timer::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseChange {
    /// Work ran out; the break countdown started on its own.
    BreakStarted { deadline: DateTime<Utc> },
    /// The break ran out; a fresh work interval waits, paused.
    WorkReady,
}

/// Work/break interval timer. Every operation is a total function of the
/// current state and the `now` it is given.
#[derive(Debug, Clone)]
pub struct Timer {
    state: TimerState,
    durations: TimerDurations,
}

impl Timer {
    pub fn new(durations: TimerDurations) -> Self {
        Self {
            state: TimerState::ready(&durations),
            durations,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn durations(&self) -> TimerDurations {
        self.durations
    }

    /// Level-triggered expiry check; call it every tick before reading.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Option<PhaseChange> {
        let Countdown::Running { deadline } = self.state.countdown else {
            return None;
        };
        if now < deadline {
            return None;
        }

        let change = match self.state.phase {
            Phase::Work => {
                let deadline = now + self.durations.rest;
                self.state = TimerState {
                    phase: Phase::Break,
                    countdown: Countdown::Running { deadline },
                };
                PhaseChange::BreakStarted { deadline }
            }
            Phase::Break => {
                self.state = TimerState::ready(&self.durations);
                PhaseChange::WorkReady
            }
        };

        info!(
            "Timer switched to {} ({})",
            self.state.phase.as_str(),
            if self.state.is_running() { "running" } else { "paused" }
        );
        Some(change)
    }

    /// Pauses a running countdown or resumes a paused one, keeping the phase.
    pub fn toggle(&mut self, now: DateTime<Utc>) {
        self.state.countdown = match self.state.countdown {
            Countdown::Running { deadline } => Countdown::Paused {
                remaining: deadline - now,
            },
            Countdown::Paused { remaining } => Countdown::Running {
                deadline: now + remaining,
            },
        };
    }

    /// Drops whatever interval was in progress.
    pub fn reset(&mut self) {
        self.state = TimerState::ready(&self.durations);
    }

    pub fn readout(&self, now: DateTime<Utc>) -> TimerReadout {
        let (running, remaining) = match self.state.countdown {
            Countdown::Running { deadline } => (true, deadline - now),
            Countdown::Paused { remaining } => (false, remaining),
        };
        TimerReadout {
            phase: self.state.phase,
            running,
            remaining: remaining.max(Duration::zero()),
        }
    }
}
