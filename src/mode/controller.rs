use std::fmt;

use chrono::{DateTime, Local, Utc};
use log::debug;

use crate::{
    timer::{digits_visible, paused_label_visible, Timer, TimerReadout},
    weather::{LoadError, WeatherReader, WeatherView},
};

use super::{ClockFace, InputEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Clock,
    Weather,
    Timer,
}

impl Mode {
    pub fn next(self) -> Self {
        match self {
            Mode::Clock => Mode::Weather,
            Mode::Weather => Mode::Timer,
            Mode::Timer => Mode::Clock,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerPanel {
    pub readout: TimerReadout,
    pub digits_visible: bool,
    pub paused_label_visible: bool,
}

/// Data for the one panel on screen this tick.
#[derive(Debug, Clone)]
pub enum Frame {
    Clock(ClockFace),
    Weather(WeatherView),
    Timer(TimerPanel),
}

/// Routes input and ticks to whichever panel is showing.
pub struct ModeController {
    mode: Mode,
    timer: Timer,
    weather: WeatherReader,
}

impl ModeController {
    pub fn new(timer: Timer, weather: WeatherReader) -> Self {
        Self {
            mode: Mode::Clock,
            timer,
            weather,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn cycle(&mut self) {
        self.mode = self.mode.next();
        debug!("Switched to {:?} panel", self.mode);
    }

    /// Timer buttons only act while the timer panel is showing. Any expiry due
    /// by `now` is applied first.
    pub fn handle(&mut self, event: InputEvent, now: DateTime<Utc>) -> Flow {
        self.timer.advance(now);

        match event {
            InputEvent::Cycle => self.cycle(),
            InputEvent::Toggle if self.mode == Mode::Timer => self.timer.toggle(now),
            InputEvent::Reset if self.mode == Mode::Timer => self.timer.reset(),
            InputEvent::Toggle | InputEvent::Reset => {}
            InputEvent::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Advances the timer whatever the panel, then reads the visible panel.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Frame {
        self.timer.advance(now);

        match self.mode {
            Mode::Clock => Frame::Clock(ClockFace::at(now.with_timezone(&Local))),
            Mode::Weather => Frame::Weather(self.weather.current()),
            Mode::Timer => {
                let readout = self.timer.readout(now);
                Frame::Timer(TimerPanel {
                    readout,
                    digits_visible: digits_visible(&readout, now),
                    paused_label_visible: paused_label_visible(&readout, now),
                })
            }
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Clock(face) => write!(f, "{}", face.text),
            Frame::Weather(Ok(snapshot)) => {
                let current = &snapshot.current;
                write!(
                    f,
                    "Current Temperature: {} {} / {}%",
                    current.temperature, current.unit, current.humidity
                )?;
                for period in snapshot.displayed_periods() {
                    write!(
                        f,
                        " | {}: {} {} - {}",
                        period.label, period.temperature, period.unit, period.short_forecast
                    )?;
                }
                write!(f, " | Weather last fetched: {}", snapshot.fetched_label())
            }
            Frame::Weather(Err(LoadError::NoDataYet)) => write!(f, "No weather data available"),
            Frame::Weather(Err(_)) => write!(f, "Failed to load weather data"),
            Frame::Timer(panel) => {
                let label = if panel.paused_label_visible {
                    "Paused"
                } else {
                    "      "
                };
                if panel.digits_visible {
                    write!(f, "[{}] {} {}", panel.readout.phase.as_str(), panel.readout, label)
                } else {
                    write!(f, "[{}]       {}", panel.readout.phase.as_str(), label)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, Duration, FixedOffset, TimeZone};
    use tokio::sync::watch;

    use super::*;
    use crate::{
        timer::{Phase, TimerDurations},
        weather::{CurrentConditions, DailyPeriod, WeatherSnapshot},
    };

    fn even_second() -> DateTime<Utc> {
        Utc.timestamp_opt(1_714_600_000, 0).unwrap()
    }

    fn controller_with(view: WeatherView) -> (ModeController, watch::Sender<WeatherView>) {
        let (tx, rx) = watch::channel(view);
        let controller =
            ModeController::new(Timer::new(TimerDurations::default()), WeatherReader::new(rx));
        (controller, tx)
    }

    fn snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            current: CurrentConditions {
                starts_at: DateTime::<FixedOffset>::parse_from_rfc3339("2024-05-01T18:00:00-04:00")
                    .unwrap(),
                temperature: 72,
                unit: "F".into(),
                humidity: 55,
            },
            daily_periods: vec![DailyPeriod {
                label: "Tonight".into(),
                temperature: 60,
                unit: "F".into(),
                short_forecast: "Clear".into(),
            }],
            forecast_updated: None,
            fetched_at: even_second(),
        }
    }

    #[test]
    fn cycles_clock_weather_timer() {
        let (mut controller, _tx) = controller_with(Err(LoadError::NoDataYet));
        assert_eq!(controller.mode(), Mode::Clock);

        let mut seen = Vec::new();
        for _ in 0..3 {
            controller.handle(InputEvent::Cycle, even_second());
            seen.push(controller.mode());
        }

        assert_eq!(seen, [Mode::Weather, Mode::Timer, Mode::Clock]);
    }

    #[test]
    fn timer_buttons_ignored_on_other_panels() {
        let (mut controller, _tx) = controller_with(Err(LoadError::NoDataYet));
        let before = controller.timer().state();

        controller.handle(InputEvent::Toggle, even_second());
        controller.handle(InputEvent::Reset, even_second());

        assert_eq!(controller.timer().state(), before);
    }

    #[test]
    fn timer_panel_shows_running_countdown() {
        let (mut controller, _tx) = controller_with(Err(LoadError::NoDataYet));
        controller.cycle();
        controller.cycle();
        controller.handle(InputEvent::Toggle, even_second());

        let frame = controller.tick(even_second() + Duration::seconds(61));

        match &frame {
            Frame::Timer(panel) => {
                assert!(panel.readout.running);
                assert_eq!(panel.readout.phase, Phase::Work);
                assert_eq!(panel.readout.to_string(), "18:59");
                assert!(panel.digits_visible);
                assert!(!panel.paused_label_visible);
            }
            other => panic!("expected timer frame, got {other:?}"),
        }
        assert_eq!(frame.to_string(), "[WORK] 18:59       ");
    }

    #[test]
    fn paused_timer_frame_blinks() {
        let (mut controller, _tx) = controller_with(Err(LoadError::NoDataYet));
        controller.cycle();
        controller.cycle();

        let on = controller.tick(even_second()).to_string();
        let off = controller.tick(even_second() + Duration::seconds(1)).to_string();

        assert_eq!(on, "[WORK] 20:00 Paused");
        assert_eq!(off, format!("[WORK]{}", " ".repeat(13)));
    }

    #[test]
    fn timer_advances_while_hidden() {
        let (mut controller, _tx) = controller_with(Err(LoadError::NoDataYet));
        controller.cycle();
        controller.cycle();
        controller.handle(InputEvent::Toggle, even_second());
        controller.cycle();

        controller.tick(even_second() + Duration::minutes(20));

        assert_eq!(controller.timer().state().phase, Phase::Break);
        assert!(controller.timer().state().is_running());
    }

    #[test]
    fn toggle_after_missed_deadline_starts_break_first() {
        let (mut controller, _tx) = controller_with(Err(LoadError::NoDataYet));
        controller.cycle();
        controller.cycle();
        controller.handle(InputEvent::Toggle, even_second());
        controller.tick(even_second() + Duration::minutes(20) - Duration::milliseconds(100));

        let late = even_second() + Duration::minutes(20) + Duration::milliseconds(100);
        controller.handle(InputEvent::Toggle, late);

        let state = controller.timer().state();
        assert_eq!(state.phase, Phase::Break);
        assert!(!state.is_running());
        assert_eq!(
            controller.timer().readout(late).remaining,
            Duration::minutes(5)
        );
    }

    #[test]
    fn weather_panel_reads_latest_published_view() {
        let (mut controller, tx) = controller_with(Err(LoadError::NoDataYet));
        controller.cycle();

        let empty = controller.tick(even_second());
        assert_eq!(empty.to_string(), "No weather data available");

        tx.send_replace(Ok(Arc::new(snapshot())));
        let frame = controller.tick(even_second());

        match &frame {
            Frame::Weather(Ok(snapshot)) => assert_eq!(snapshot.current.humidity, 55),
            other => panic!("expected weather frame, got {other:?}"),
        }
        assert!(frame
            .to_string()
            .starts_with("Current Temperature: 72 F / 55% | Tonight: 60 F - Clear | Weather last fetched: "));
    }

    #[test]
    fn corrupt_cache_renders_failure_message() {
        let (mut controller, _tx) =
            controller_with(Err(LoadError::CorruptCache("bad bytes".into())));
        controller.cycle();

        assert_eq!(
            controller.tick(even_second()).to_string(),
            "Failed to load weather data"
        );
    }

    #[test]
    fn quit_stops_the_loop() {
        let (mut controller, _tx) = controller_with(Err(LoadError::NoDataYet));

        assert_eq!(controller.handle(InputEvent::Quit, even_second()), Flow::Quit);
        assert_eq!(controller.handle(InputEvent::Cycle, even_second()), Flow::Continue);
    }
}
