//! Port traits: the hexagonal boundary between control logic and hardware.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService / Worker (domain)
//! ```
//!
//! Driven adapters (analog input, PWM, display, touch panel, timers,
//! event sinks) implement these traits.  The control core consumes them
//! via generics and never touches a peripheral directly.
//!
//! Sensor and PWM accesses are treated as infallible.  Adapters that wrap
//! a fallible HAL log the failure and carry on.

use embassy_time::Duration;

use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Analog input (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Raw analog channel, read as a normalised voltage.
pub trait AnalogInput {
    fn read_raw(&mut self) -> f32;
}

// ───────────────────────────────────────────────────────────────
// PWM output (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Fan PWM channel.  Duty is a fraction in `[0.0, 1.0]`; callers clamp.
pub trait PwmOutput {
    fn set_duty(&mut self, duty: f32);

    /// Last commanded duty.
    fn duty(&self) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Display and touch (driven adapters: main context only)
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    White,
    Blue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    /// 20 px proportional font used for every label.
    Size20,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Minimal immediate-mode display surface.
pub trait Display {
    fn clear(&mut self, color: Color);
    fn set_font(&mut self, font: Font);
    fn set_text_color(&mut self, color: Color);
    fn draw_text_at(&mut self, x: u16, y: u16, text: &str, align: Align);
    /// Fill a rectangle in the current text colour.
    fn fill_rect(&mut self, x: u16, y: u16, w: u16, h: u16);
    fn width(&self) -> u16;
    fn height(&self) -> u16;
}

/// One poll of the touch controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchState {
    pub detected: bool,
    pub x: i32,
    pub y: i32,
}

/// Capacitive or resistive touch panel.
pub trait TouchPanel {
    /// Calibrate the panel to the display resolution.
    fn init(&mut self, width: u16, height: u16);
    fn state(&mut self) -> TouchState;
}

// ───────────────────────────────────────────────────────────────
// Timers (driven adapters: their expiry posts onto the EventQueue)
// ───────────────────────────────────────────────────────────────

/// A one-shot hardware timer bound to a single event at construction.
///
/// `arm` restarts the countdown if already armed.  Both calls take `&self`
/// because the timer is shared between the context that arms it and the
/// interrupt that fires it.
pub trait OneShotTimer {
    fn arm(&self, after: Duration);
    fn disarm(&self);
}

/// A periodic hardware timer bound to a single event at construction.
pub trait PeriodicTimer {
    fn start(&self, period: Duration);
    fn stop(&self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.  Adapters
/// decide where they go (serial log, a test recorder, a radio link).
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}
