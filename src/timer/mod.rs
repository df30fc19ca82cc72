pub mod readout;
pub mod state;

pub use readout::{blink_on, digits_visible, paused_label_visible, TimerReadout};
pub use state::{Countdown, Phase, PhaseChange, Timer, TimerDurations, TimerState};
