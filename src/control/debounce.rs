//! Touch input debounce gate.
//!
//! A single flag: open means the next touch is accepted.  Accepting closes
//! it and arms a one-shot; the worker reopens it on `Event::GateReset`.
//! The close is a compare-and-swap, so of any number of concurrent
//! attempts exactly one wins.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_time::Duration;
use log::debug;

use crate::app::ports::OneShotTimer;

pub struct DebounceGate<T> {
    open: AtomicBool,
    timer: T,
    window: Duration,
}

impl<T: OneShotTimer> DebounceGate<T> {
    pub fn new(timer: T, window: Duration) -> Self {
        Self {
            open: AtomicBool::new(true),
            timer,
            window,
        }
    }

    /// Close the gate if open.  Only the winner arms the reset timer.
    pub fn try_accept(&self) -> bool {
        let won = self
            .open
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            self.timer.arm(self.window);
            debug!("touch accepted, gate closed for {} ms", self.window.as_millis());
        }
        won
    }

    /// Reopen unconditionally.  Worker context.
    pub fn release(&self) {
        self.open.store(true, Ordering::Release);
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }
}
