/// Input the display reacts to. The windowed build maps mouse buttons onto
/// these; the terminal front-end maps typed lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Primary click: next panel.
    Cycle,
    /// Start or pause the timer.
    Toggle,
    /// Back to a fresh work interval.
    Reset,
    Quit,
}

impl InputEvent {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "c" | "1" | "" => Some(InputEvent::Cycle),
            "t" | "3" => Some(InputEvent::Toggle),
            "r" | "4" => Some(InputEvent::Reset),
            "q" | "2" | "6" | "esc" | "quit" => Some(InputEvent::Quit),
            _ => None,
        }
    }
}
