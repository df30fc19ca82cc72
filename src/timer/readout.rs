use std::fmt;

use chrono::{DateTime, Duration, Utc};

use super::Phase;

/// What the timer panel shows at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerReadout {
    pub phase: Phase,
    pub running: bool,
    /// Never negative.
    pub remaining: Duration,
}

impl TimerReadout {
    pub fn display_seconds(&self) -> i64 {
        self.remaining.num_seconds()
    }

    pub fn minutes(&self) -> i64 {
        self.display_seconds() / 60
    }

    pub fn seconds(&self) -> i64 {
        self.display_seconds() % 60
    }
}

impl fmt::Display for TimerReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes(), self.seconds())
    }
}

/// One-second blink phase: on for even Unix seconds.
pub fn blink_on(now: DateTime<Utc>) -> bool {
    now.timestamp().rem_euclid(2) == 0
}

pub fn digits_visible(readout: &TimerReadout, now: DateTime<Utc>) -> bool {
    readout.running || blink_on(now)
}

pub fn paused_label_visible(readout: &TimerReadout, now: DateTime<Utc>) -> bool {
    !readout.running && blink_on(now)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn readout(running: bool, seconds: i64) -> TimerReadout {
        TimerReadout {
            phase: Phase::Work,
            running,
            remaining: Duration::seconds(seconds),
        }
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(readout(true, 20 * 60).to_string(), "20:00");
        assert_eq!(readout(true, 4 * 60 + 7).to_string(), "04:07");
        assert_eq!(readout(false, 0).to_string(), "00:00");
    }

    #[test]
    fn sub_second_remainder_is_truncated() {
        let almost = TimerReadout {
            remaining: Duration::milliseconds(59_999),
            ..readout(true, 0)
        };

        assert_eq!(almost.display_seconds(), 59);
        assert_eq!(almost.to_string(), "00:59");
    }

    #[test]
    fn paused_display_blinks_on_second_parity() {
        let even = Utc.timestamp_opt(1_700_000_000, 500_000_000).unwrap();
        let odd = Utc.timestamp_opt(1_700_000_001, 0).unwrap();
        let paused = readout(false, 90);

        assert!(digits_visible(&paused, even));
        assert!(!digits_visible(&paused, odd));
        assert!(paused_label_visible(&paused, even));
        assert!(!paused_label_visible(&paused, odd));
    }

    #[test]
    fn running_display_never_blinks() {
        let odd = Utc.timestamp_opt(1_700_000_001, 0).unwrap();
        let running = readout(true, 90);

        assert!(digits_visible(&running, odd));
        assert!(!paused_label_visible(&running, odd));
    }

    #[test]
    fn blink_handles_pre_epoch_instants() {
        assert!(!blink_on(Utc.timestamp_opt(-1, 0).unwrap()));
        assert!(blink_on(Utc.timestamp_opt(-2, 0).unwrap()));
    }
}
