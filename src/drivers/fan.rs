//! Fan PWM driver.
//!
//! [`ActuatorSink`] is the single place a duty cycle reaches the fan.  It
//! owns the PWM behind a critical-section mutex because two contexts write
//! it: the FSM (main loop) and the ramp (worker).  Every value goes through
//! [`DutyCycle`], so nothing outside `[0.0, 1.0]` ever reaches hardware.
//!
//! [`HalPwm`] adapts any `embedded-hal` 1.0 `SetDutyCycle` channel to the
//! [`PwmOutput`] port.

use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::app::ports::PwmOutput;

// ---------------------------------------------------------------------------
// DutyCycle
// ---------------------------------------------------------------------------

/// Fan duty as a fraction of full scale, always within `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DutyCycle(f32);

impl DutyCycle {
    pub const ZERO: Self = Self(0.0);
    pub const FULL: Self = Self(1.0);

    /// Clamp into range.  NaN maps to zero (fan off).
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn get(self) -> f32 {
        self.0
    }

    pub fn is_full(self) -> bool {
        self.0 >= 1.0
    }
}

// ---------------------------------------------------------------------------
// ActuatorSink
// ---------------------------------------------------------------------------

pub struct ActuatorSink<P> {
    pwm: Mutex<RefCell<P>>,
}

impl<P: PwmOutput> ActuatorSink<P> {
    pub fn new(pwm: P) -> Self {
        Self {
            pwm: Mutex::new(RefCell::new(pwm)),
        }
    }

    /// Command the fan.  Safe from any context.
    pub fn write(&self, duty: DutyCycle) {
        critical_section::with(|cs| self.pwm.borrow_ref_mut(cs).set_duty(duty.get()));
    }

    /// Last commanded duty, read back from the PWM.
    pub fn read(&self) -> DutyCycle {
        critical_section::with(|cs| DutyCycle::new(self.pwm.borrow_ref(cs).duty()))
    }

    /// Run `f` against the underlying PWM (tests and diagnostics).
    pub fn with_pwm<R>(&self, f: impl FnOnce(&P) -> R) -> R {
        critical_section::with(|cs| f(&self.pwm.borrow_ref(cs)))
    }
}

// ---------------------------------------------------------------------------
// embedded-hal adapter
// ---------------------------------------------------------------------------

/// Wraps an `embedded-hal` PWM channel.  The channel's integer range is
/// mapped from the fractional duty; the fraction is kept for read-back.
pub struct HalPwm<C> {
    channel: C,
    last: f32,
}

impl<C: SetDutyCycle> HalPwm<C> {
    pub fn new(channel: C) -> Self {
        Self { channel, last: 0.0 }
    }

    pub fn release(self) -> C {
        self.channel
    }
}

impl<C: SetDutyCycle> PwmOutput for HalPwm<C> {
    fn set_duty(&mut self, duty: f32) {
        let max = self.channel.max_duty_cycle();
        let raw = (duty.clamp(0.0, 1.0) * max as f32 + 0.5) as u16;
        if let Err(e) = self.channel.set_duty_cycle(raw.min(max)) {
            warn!("fan PWM write failed: {:?}", e);
            return;
        }
        self.last = duty;
    }

    fn duty(&self) -> f32 {
        self.last
    }
}
