//! Screen layout and rendering helpers.
//!
//! ```text
//!  (0,60)  Sensor: 24.5C
//!  (0,80)  Thresh: 26.0C
//!
//!     ┌────────┐                        ┌────────┐
//!     │  hit   │ 65 < y < 125           │  hit   │
//!     └────────┘                        └────────┘
//!    20 < x < 80                      w-80 < x < w-20
//!
//!        ┃                                                glyphs at
//!     ━━━╋━━━                             ━━━━━━━         y = 195..255
//!        ┃
//! ```
//!
//! The touch regions and the drawn glyphs do not overlap.  That mismatch
//! is inherited from the panel layout this device ships with and is kept
//! as-is.

use core::fmt::Write;

use heapless::String;

use super::ports::{Align, Color, Display, Font};
use crate::fsm::context::Readings;

pub const FONT: Font = Font::Size20;
pub const TEXT_COLOR: Color = Color::Blue;
pub const BACKGROUND: Color = Color::White;

const SENSOR_LINE: (u16, u16) = (0, 60);
const THRESH_LINE: (u16, u16) = (0, 80);

/// Room for a label, a sign, ten integer digits and one decimal.
pub type Label = String<24>;

/// Format `"<label> <t>C"` with one decimal, truncating toward zero.
/// A value that truncates to zero prints without a sign.
pub fn format_celsius(label: &str, value_c: f32) -> Label {
    let tenths = (value_c * 10.0).trunc() as i32;
    let sign = if tenths < 0 { "-" } else { "" };
    let magnitude = tenths.unsigned_abs();
    let mut out = Label::new();
    // Capacity covers the widest i32; a failed write only shortens the text.
    let _ = write!(out, "{label} {sign}{}.{}C", magnitude / 10, magnitude % 10);
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Increase,
    Decrease,
}

/// Button geometry for a given display width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    width: i32,
}

impl Layout {
    pub fn new(width: u16) -> Self {
        Self {
            width: width as i32,
        }
    }

    /// Which button, if any, a touch at `(x, y)` lands on.  All bounds
    /// are exclusive.
    pub fn hit(&self, x: i32, y: i32) -> Option<Button> {
        if !(y > 65 && y < 125) {
            return None;
        }
        if x > 20 && x < 80 {
            Some(Button::Increase)
        } else if x > self.width - 80 && x < self.width - 20 {
            Some(Button::Decrease)
        } else {
            None
        }
    }

    fn right_column(&self) -> u16 {
        (self.width - 80).max(0) as u16
    }
}

/// Wipe the screen to the background colour.
pub fn clear_screen<D: Display>(display: &mut D) {
    display.clear(BACKGROUND);
}

/// Draw both reading lines over whatever is on screen.
pub fn draw_readings<D: Display>(display: &mut D, readings: &Readings) {
    let sensor = format_celsius("Sensor:", readings.temperature_c);
    let thresh = format_celsius("Thresh:", readings.threshold_c);
    display.draw_text_at(SENSOR_LINE.0, SENSOR_LINE.1, &sensor, Align::Left);
    display.draw_text_at(THRESH_LINE.0, THRESH_LINE.1, &thresh, Align::Left);
}

/// "+" and "−" glyphs, drawn when no touch was accepted.
pub fn draw_buttons<D: Display>(display: &mut D, layout: &Layout) {
    // +
    display.fill_rect(20, 220, 60, 10);
    display.fill_rect(45, 195, 10, 60);
    // −
    display.fill_rect(layout.right_column(), 220, 60, 10);
}

/// Solid block over a pressed button.
pub fn draw_pressed<D: Display>(display: &mut D, layout: &Layout, button: Button) {
    match button {
        Button::Increase => display.fill_rect(20, 190, 60, 65),
        Button::Decrease => display.fill_rect(layout.right_column(), 190, 60, 65),
    }
}
