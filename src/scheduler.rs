//! Periodic sensor sampling.
//!
//! ```text
//!  PeriodicTimer ──(every 500 ms)──▶ Event::SensorRefresh ──▶ Worker
//!                                                              │
//!                                     read sensor, store, invalidate display
//! ```
//!
//! The scheduler owns the timer and its period, nothing else.  The timer
//! adapter posts the event itself; no sensor access happens in the timer
//! callback.

use embassy_time::Duration;
use log::info;

use crate::app::ports::PeriodicTimer;
use crate::config::SystemConfig;

pub struct SamplingScheduler<T> {
    timer: T,
    period: Duration,
    running: bool,
}

impl<T: PeriodicTimer> SamplingScheduler<T> {
    pub fn new(timer: T, config: &SystemConfig) -> Self {
        Self {
            timer,
            period: config.sample_period(),
            running: false,
        }
    }

    pub fn start(&mut self) {
        self.timer.start(self.period);
        self.running = true;
        info!("sampling started, period {} ms", self.period.as_millis());
    }

    pub fn stop(&mut self) {
        self.timer.stop();
        self.running = false;
        info!("sampling stopped");
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
