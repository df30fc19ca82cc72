use chrono::{DateTime, TimeZone, Timelike};

/// The clock panel: 12-hour time and whether it is still morning, which the
/// view uses to pick its colour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockFace {
    pub text: String,
    pub morning: bool,
}

impl ClockFace {
    pub fn at<Tz: TimeZone>(now: DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            text: now.format("%I:%M:%S %p").to_string(),
            morning: now.hour() < 12,
        }
    }
}
