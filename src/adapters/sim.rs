//! Simulated peripherals for the host build.
//!
//! | Type            | Implements     | Behaviour                          |
//! |-----------------|----------------|------------------------------------|
//! | `SimAnalog`     | AnalogInput    | value set from another thread      |
//! | `SimPwm`        | PwmOutput      | remembers duty, logs changes       |
//! | `LogDisplay`    | Display        | logs text lines                    |
//! | `ScriptedTouch` | TouchPanel     | replays taps against a clock       |
//! | `LogPin`        | OutputPin      | logs level changes                 |

use std::collections::VecDeque;
use std::convert::Infallible;
use std::sync::Arc;

use embedded_hal::digital::{ErrorType, OutputPin};
use log::{debug, info, trace};

use super::virtual_timer::VirtualClock;
use crate::app::ports::{AnalogInput, Align, Color, Display, Font, PwmOutput, TouchPanel, TouchState};
use crate::fsm::context::AtomicF32;

// ───────────────────────────────────────────────────────────────
// Analog input
// ───────────────────────────────────────────────────────────────

/// Clones share the same level, so one copy can live in the worker while
/// another drives a temperature profile.
#[derive(Debug, Clone)]
pub struct SimAnalog {
    level: Arc<AtomicF32>,
}

impl SimAnalog {
    pub fn new(raw: f32) -> Self {
        Self {
            level: Arc::new(AtomicF32::new(raw)),
        }
    }

    pub fn set_raw(&self, raw: f32) {
        self.level.store(raw);
    }

    /// Convenience for a 10 mV/°C sensor.
    pub fn set_celsius(&self, celsius: f32) {
        self.set_raw(celsius * 0.01);
    }
}

impl AnalogInput for SimAnalog {
    fn read_raw(&mut self) -> f32 {
        self.level.load()
    }
}

// ───────────────────────────────────────────────────────────────
// PWM
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct SimPwm {
    duty: f32,
    writes: u32,
}

impl SimPwm {
    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl PwmOutput for SimPwm {
    fn set_duty(&mut self, duty: f32) {
        if (duty - self.duty).abs() > f32::EPSILON {
            debug!("FAN | duty {:.2} -> {:.2}", self.duty, duty);
        }
        self.duty = duty;
        self.writes = self.writes.wrapping_add(1);
    }

    fn duty(&self) -> f32 {
        self.duty
    }
}

// ───────────────────────────────────────────────────────────────
// Display
// ───────────────────────────────────────────────────────────────

/// Logs text at `info` only when a position shows something new; the
/// main loop redraws the same readings on every pass.
#[derive(Debug)]
pub struct LogDisplay {
    width: u16,
    height: u16,
    frames: u32,
    shown: Vec<((u16, u16), String)>,
}

impl LogDisplay {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            frames: 0,
            shown: Vec::new(),
        }
    }

    /// Text currently drawn at `(x, y)`.
    pub fn text_at(&self, x: u16, y: u16) -> Option<&str> {
        self.shown
            .iter()
            .find(|(at, _)| *at == (x, y))
            .map(|(_, text)| text.as_str())
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }
}

impl Display for LogDisplay {
    fn clear(&mut self, _color: Color) {
        self.frames = self.frames.wrapping_add(1);
    }

    fn set_font(&mut self, font: Font) {
        debug!("display font {:?}", font);
    }

    fn set_text_color(&mut self, color: Color) {
        debug!("display text colour {:?}", color);
    }

    fn draw_text_at(&mut self, x: u16, y: u16, text: &str, _align: Align) {
        match self.shown.iter_mut().find(|(at, _)| *at == (x, y)) {
            Some((_, old)) if old.as_str() == text => trace!("LCD | ({},{}) {}", x, y, text),
            Some((_, old)) => {
                info!("LCD | ({},{}) {}", x, y, text);
                text.clone_into(old);
            }
            None => {
                info!("LCD | ({},{}) {}", x, y, text);
                self.shown.push(((x, y), text.to_owned()));
            }
        }
    }

    fn fill_rect(&mut self, x: u16, y: u16, w: u16, h: u16) {
        trace!("LCD | rect ({},{}) {}x{}", x, y, w, h);
    }

    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u16 {
        self.height
    }
}

// ───────────────────────────────────────────────────────────────
// Touch
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Tap {
    at_ms: u64,
    hold_ms: u64,
    x: i32,
    y: i32,
}

/// Replays a list of taps.  A tap reads as touched from `at_ms` for
/// `hold_ms` of virtual time.
pub struct ScriptedTouch {
    clock: Arc<VirtualClock>,
    taps: VecDeque<Tap>,
}

impl ScriptedTouch {
    pub fn new(clock: Arc<VirtualClock>) -> Self {
        Self {
            clock,
            taps: VecDeque::new(),
        }
    }

    /// Queue a tap.  Taps must be added in time order.
    pub fn tap(mut self, at_ms: u64, hold_ms: u64, x: i32, y: i32) -> Self {
        self.taps.push_back(Tap { at_ms, hold_ms, x, y });
        self
    }
}

impl TouchPanel for ScriptedTouch {
    fn init(&mut self, width: u16, height: u16) {
        info!("touch panel calibrated to {}x{}", width, height);
    }

    fn state(&mut self) -> TouchState {
        let now = self.clock.now_ms();
        while self
            .taps
            .front()
            .is_some_and(|t| now >= t.at_ms + t.hold_ms)
        {
            self.taps.pop_front();
        }
        match self.taps.front() {
            Some(t) if now >= t.at_ms => TouchState {
                detected: true,
                x: t.x,
                y: t.y,
            },
            _ => TouchState::default(),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Digital output
// ───────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct LogPin {
    name: &'static str,
    high: bool,
}

impl LogPin {
    pub fn new(name: &'static str) -> Self {
        Self { name, high: false }
    }

    pub fn is_high(&self) -> bool {
        self.high
    }

    fn drive(&mut self, high: bool) {
        if high != self.high {
            debug!("PIN | {} {}", self.name, if high { "on" } else { "off" });
        }
        self.high = high;
    }
}

impl ErrorType for LogPin {
    type Error = Infallible;
}

impl OutputPin for LogPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }
}
