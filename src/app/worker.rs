//! The worker: single consumer of timer events.
//!
//! Timer callbacks post to the [`EventQueue`]; this context does the
//! actual work.  It is the only reader of the sensor and the only place
//! ramp steps and gate resets execute.

use embedded_hal::digital::OutputPin;
use log::debug;

use crate::app::ports::{AnalogInput, OneShotTimer, PwmOutput};
use crate::control::ramp::RampOutcome;
use crate::events::{Event, EventQueue};
use crate::fsm::context::ControlContext;
use crate::sensors::temperature::SensorSource;

pub struct Worker<'a, A, P, L, T> {
    sensor: SensorSource<A>,
    ctx: &'a ControlContext<P, L, T>,
    handled: u32,
}

impl<'a, A, P, L, T> Worker<'a, A, P, L, T>
where
    A: AnalogInput,
    P: PwmOutput,
    L: OutputPin,
    T: OneShotTimer,
{
    pub fn new(sensor: SensorSource<A>, ctx: &'a ControlContext<P, L, T>) -> Self {
        Self {
            sensor,
            ctx,
            handled: 0,
        }
    }

    pub fn handle(&mut self, event: Event) {
        self.handled = self.handled.wrapping_add(1);
        match event {
            Event::SensorRefresh => {
                let t = self.sensor.read();
                self.ctx.shared.record_sample(t);
                self.ctx.shared.invalidate_display();
            }
            Event::RampStep => {
                let outcome = self
                    .ctx
                    .ramp
                    .step(&self.ctx.shared, &self.ctx.fan, &self.ctx.feedback);
                if outcome == RampOutcome::Saturated {
                    debug!("worker: ramp chain finished");
                }
            }
            Event::GateReset => {
                self.ctx.gate.release();
                debug!("touch gate reopened");
            }
        }
    }

    /// Handle everything queued right now.  Returns the number handled.
    pub fn run_pending(&mut self, queue: &EventQueue) -> usize {
        let mut n = 0;
        while let Some(event) = queue.try_next() {
            self.handle(event);
            n += 1;
        }
        n
    }

    /// Wait for events forever.
    pub async fn run(&mut self, queue: &EventQueue) {
        loop {
            let event = queue.receive().await;
            self.handle(event);
        }
    }

    /// Events handled since construction.
    pub fn handled(&self) -> u32 {
        self.handled
    }
}
