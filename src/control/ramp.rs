//! Fan ramp: a self-rescheduling one-shot timer chain.
//!
//! Entering Accelerating writes the initial duty and arms the timer.  Each
//! firing (delivered to the worker as `Event::RampStep`) adds one step and
//! re-arms, until the duty reaches full scale; that firing moves the state
//! to MaxSpeed and the chain ends.
//!
//! The whole step runs inside one critical section: the state check, the
//! duty write and the saturation swap cannot interleave with an FSM
//! transition.  If the FSM has already left Accelerating the step is a
//! no-op, which is how an in-flight firing aborts itself.

use embassy_time::Duration;
use embedded_hal::digital::OutputPin;
use log::debug;

use crate::app::ports::{OneShotTimer, PwmOutput};
use crate::config::SystemConfig;
use crate::drivers::fan::{ActuatorSink, DutyCycle};
use crate::drivers::indicator::{FeedbackOutputs, Indicator};
use crate::fsm::ControlState;
use crate::fsm::context::SharedState;

/// A step landing this close to 1.0 counts as full scale.
const SATURATION_EPSILON: f32 = 1e-4;

/// Result of one ramp firing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RampOutcome {
    /// State was no longer Accelerating; nothing happened.
    Stale,
    /// Duty advanced and the timer was re-armed.
    Advanced(DutyCycle),
    /// Duty hit 1.0 and the state moved to MaxSpeed.
    Saturated,
}

pub struct RampController<T> {
    timer: T,
    initial: DutyCycle,
    step: f32,
    interval: Duration,
}

impl<T: OneShotTimer> RampController<T> {
    pub fn new(timer: T, config: &SystemConfig) -> Self {
        Self {
            timer,
            initial: DutyCycle::new(config.ramp_initial_duty),
            step: config.ramp_step,
            interval: config.ramp_interval(),
        }
    }

    /// Write the initial duty and arm the first firing.
    pub fn start<P: PwmOutput>(&self, fan: &ActuatorSink<P>) {
        fan.write(self.initial);
        self.timer.arm(self.interval);
        debug!("ramp start at {:.2}", self.initial.get());
    }

    /// Cancel the pending firing.  A firing already queued still runs and
    /// finds the state changed.
    pub fn stop(&self) {
        self.timer.disarm();
    }

    /// One firing of the chain.  Worker context.
    pub fn step<P: PwmOutput, L: OutputPin>(
        &self,
        shared: &SharedState,
        fan: &ActuatorSink<P>,
        feedback: &FeedbackOutputs<L>,
    ) -> RampOutcome {
        let outcome = critical_section::with(|_| {
            if shared.state() != ControlState::Accelerating {
                return RampOutcome::Stale;
            }

            let next = fan.read().get() + self.step;
            if next >= 1.0 - SATURATION_EPSILON {
                fan.write(DutyCycle::FULL);
                shared.transition(ControlState::Accelerating, ControlState::MaxSpeed);
                feedback.set(Indicator::Ramp, false);
                feedback.set(Indicator::Max, true);
                return RampOutcome::Saturated;
            }

            let duty = DutyCycle::new(next);
            fan.write(duty);
            feedback.set(Indicator::Ramp, true);
            feedback.set(Indicator::Max, false);
            self.timer.arm(self.interval);
            RampOutcome::Advanced(duty)
        });

        match outcome {
            RampOutcome::Stale => debug!("ramp step stale, ignored"),
            RampOutcome::Advanced(d) => debug!("ramp step -> {:.2}", d.get()),
            RampOutcome::Saturated => debug!("ramp saturated at 1.00"),
        }
        outcome
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }
}
