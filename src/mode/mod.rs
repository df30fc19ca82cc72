pub mod clock_face;
pub mod controller;
pub mod input;

pub use clock_face::ClockFace;
pub use controller::{Flow, Frame, Mode, ModeController, TimerPanel};
pub use input::InputEvent;
