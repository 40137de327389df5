//! Shared state and the context threaded through every FSM handler.
//!
//! [`SharedState`] is the blackboard that the main context, the worker and
//! the timer-driven ramp all meet on.  Every field is an atomic and has a
//! documented owner:
//!
//! | Field             | Writer(s)                          | Readers            |
//! |-------------------|------------------------------------|--------------------|
//! | `temperature`     | worker (sensor refresh)            | main loop, FSM     |
//! | `threshold`       | main loop (accepted touch)         | FSM, renderer      |
//! | `state`           | FSM tick (main), ramp step (worker)| everyone           |
//! | `display_invalid` | worker sets, main loop clears      | main loop          |
//! | `samples`         | worker                             | telemetry          |
//!
//! `state` is the only field with two writers.  Both sides change it with a
//! compare-and-swap from the value they observed, inside a critical section
//! that also covers the matching duty write.
//!
//! [`ControlContext`] bundles the shared state with the fan, the feedback
//! outputs, the ramp and the debounce gate.  It is built once and then
//! only ever borrowed immutably; interior mutability lives in the
//! atomics and the critical-section mutexes of the parts.

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

use embedded_hal::digital::OutputPin;

use super::ControlState;
use crate::app::ports::{OneShotTimer, PwmOutput};
use crate::config::SystemConfig;
use crate::control::debounce::DebounceGate;
use crate::control::ramp::RampController;
use crate::drivers::fan::ActuatorSink;
use crate::drivers::indicator::FeedbackOutputs;

// ---------------------------------------------------------------------------
// AtomicF32
// ---------------------------------------------------------------------------

/// `f32` stored as its bit pattern in an `AtomicU32`.
/// Loads and stores are single 32-bit operations, so readers never see a
/// torn value.
#[derive(Debug)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub const fn zero() -> Self {
        Self(AtomicU32::new(0))
    }

    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Acquire))
    }

    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// Readings (per-tick snapshot)
// ---------------------------------------------------------------------------

/// Temperature and threshold as seen by one FSM tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Readings {
    pub temperature_c: f32,
    pub threshold_c: f32,
}

impl Readings {
    /// The activation guard shared by every state.
    pub fn over_threshold(&self) -> bool {
        self.temperature_c > self.threshold_c
    }
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Cross-context scalar state.  See the module docs for the writer rules.
#[derive(Debug)]
pub struct SharedState {
    temperature: AtomicF32,
    threshold: AtomicF32,
    state: AtomicU8,
    display_invalid: AtomicBool,
    samples: AtomicU32,
}

impl SharedState {
    pub fn new(temperature_c: f32, threshold_c: f32) -> Self {
        Self {
            temperature: AtomicF32::new(temperature_c),
            threshold: AtomicF32::new(threshold_c),
            state: AtomicU8::new(ControlState::Idle as u8),
            display_invalid: AtomicBool::new(true),
            samples: AtomicU32::new(0),
        }
    }

    // -- Temperature (worker writes) --

    pub fn temperature(&self) -> f32 {
        self.temperature.load()
    }

    /// Store a fresh sensor reading.  Worker context only.
    pub fn record_sample(&self, temperature_c: f32) {
        self.temperature.store(temperature_c);
        self.samples.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of sensor refreshes completed since boot.
    pub fn samples(&self) -> u32 {
        self.samples.load(Ordering::Relaxed)
    }

    // -- Threshold (main loop writes) --

    pub fn threshold(&self) -> f32 {
        self.threshold.load()
    }

    /// Add `delta_c` to the threshold and return the new value.
    /// Main context only; single writer, so load + store is enough.
    pub fn adjust_threshold(&self, delta_c: f32) -> f32 {
        let next = self.threshold.load() + delta_c;
        self.threshold.store(next);
        next
    }

    pub fn readings(&self) -> Readings {
        Readings {
            temperature_c: self.temperature(),
            threshold_c: self.threshold(),
        }
    }

    // -- Control state (two writers, CAS only) --

    pub fn state(&self) -> ControlState {
        ControlState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Move from `from` to `to` if the state is still `from`.
    /// Returns `false` when another context got there first.
    pub fn transition(&self, from: ControlState, to: ControlState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    // -- Display invalidation (worker sets, main clears) --

    pub fn invalidate_display(&self) {
        self.display_invalid.store(true, Ordering::Release);
    }

    /// Consume a pending invalidation.  Returns `true` at most once per
    /// `invalidate_display()` call.
    pub fn take_display_invalid(&self) -> bool {
        self.display_invalid.swap(false, Ordering::AcqRel)
    }
}

// ---------------------------------------------------------------------------
// ControlContext
// ---------------------------------------------------------------------------

/// Everything the FSM handlers, the ramp and the worker act on.
///
/// `P` is the fan PWM, `L` the feedback LED pin type, `T` the one-shot
/// timer type used by both the ramp and the debounce gate.
pub struct ControlContext<P, L, T> {
    pub shared: SharedState,
    pub fan: ActuatorSink<P>,
    pub feedback: FeedbackOutputs<L>,
    pub ramp: RampController<T>,
    pub gate: DebounceGate<T>,
}

impl<P, L, T> ControlContext<P, L, T>
where
    P: PwmOutput,
    L: OutputPin,
    T: OneShotTimer,
{
    /// Assemble the context.  `first_reading_c` is the synchronous
    /// start-up sample; the threshold is derived from it.
    pub fn new(
        config: &SystemConfig,
        first_reading_c: f32,
        pwm: P,
        leds: (L, L),
        ramp_timer: T,
        gate_timer: T,
    ) -> Self {
        Self {
            shared: SharedState::new(first_reading_c, config.initial_threshold(first_reading_c)),
            fan: ActuatorSink::new(pwm),
            feedback: FeedbackOutputs::new(leds.0, leds.1),
            ramp: RampController::new(ramp_timer, config),
            gate: DebounceGate::new(gate_timer, config.debounce_window()),
        }
    }

    pub fn readings(&self) -> Readings {
        self.shared.readings()
    }
}
