//! Feedback indicators.
//!
//! Two digital outputs.  They show ramp progress (`A` lit while the fan
//! is climbing, `B` lit at full speed) and are cleared whenever the
//! controller returns to idle.  The pins are written from both the main
//! loop and the worker, so they sit behind a critical-section mutex; an
//! atomic mirror of each level lets readers skip the lock.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};

use critical_section::Mutex;
use embedded_hal::digital::OutputPin;
use log::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// Output A: lit while ramping.
    Ramp,
    /// Output B: lit at full speed.
    Max,
}

impl Indicator {
    fn index(self) -> usize {
        match self {
            Self::Ramp => 0,
            Self::Max => 1,
        }
    }
}

pub struct FeedbackOutputs<L> {
    pins: Mutex<RefCell<[L; 2]>>,
    levels: [AtomicBool; 2],
}

impl<L: OutputPin> FeedbackOutputs<L> {
    pub fn new(a: L, b: L) -> Self {
        Self {
            pins: Mutex::new(RefCell::new([a, b])),
            levels: [AtomicBool::new(false), AtomicBool::new(false)],
        }
    }

    pub fn set(&self, which: Indicator, on: bool) {
        let i = which.index();
        critical_section::with(|cs| {
            let mut pins = self.pins.borrow_ref_mut(cs);
            let result = if on { pins[i].set_high() } else { pins[i].set_low() };
            if result.is_err() {
                warn!("indicator {:?} write failed", which);
            }
        });
        self.levels[i].store(on, Ordering::Relaxed);
    }

    /// Both outputs off.
    pub fn clear(&self) {
        self.set(Indicator::Ramp, false);
        self.set(Indicator::Max, false);
    }

    pub fn is_on(&self, which: Indicator) -> bool {
        self.levels[which.index()].load(Ordering::Relaxed)
    }
}
