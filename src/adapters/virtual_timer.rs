//! Deterministic timer bank for host simulation and tests.
//!
//! ```text
//!  VirtualClock ── advance(dt) ──▶ due slots ──▶ EventQueue::post
//!     │
//!     ├─ slot 0: periodic  SensorRefresh  (500 ms)
//!     ├─ slot 1: one-shot  RampStep
//!     └─ slot 2: one-shot  GateReset
//! ```
//!
//! Time only moves when [`VirtualClock::advance`] is called.  Each
//! [`VirtualTimer`] owns one slot and is bound to one [`Event`], like a
//! hardware timer whose callback posts a fixed intent.
//!
//! Lock order: the clock mutex is never held while posting.  Arming
//! happens from inside critical sections (ramp step, FSM transition) and
//! posting takes the queue's critical section, so holding both the other
//! way round would deadlock.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use embassy_time::Duration;

use crate::app::ports::{OneShotTimer, PeriodicTimer};
use crate::events::{Event, EventQueue};

#[derive(Debug)]
struct Slot {
    event: Event,
    deadline_ms: Option<u64>,
    period_ms: Option<u64>,
}

#[derive(Debug, Default)]
struct ClockState {
    now_ms: u64,
    slots: Vec<Slot>,
}

#[derive(Debug, Default)]
pub struct VirtualClock {
    state: Mutex<ClockState>,
}

impl VirtualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A disarmed one-shot timer that posts `event` when it expires.
    pub fn one_shot(self: &Arc<Self>, event: Event) -> VirtualTimer {
        self.register(event)
    }

    /// A stopped periodic timer that posts `event` every period.
    pub fn periodic(self: &Arc<Self>, event: Event) -> VirtualTimer {
        self.register(event)
    }

    pub fn now_ms(&self) -> u64 {
        self.lock().now_ms
    }

    /// Move time forward by `dt`, posting every expiry on the way in
    /// deadline order.  Returns the number of events posted (including
    /// any the queue dropped).
    pub fn advance(&self, dt: Duration, queue: &EventQueue) -> usize {
        let target = self.lock().now_ms + dt.as_millis();
        let mut fired = 0;
        loop {
            let due = {
                let mut st = self.lock();
                match Self::next_due(&mut st, target) {
                    Some(event) => event,
                    None => {
                        st.now_ms = target;
                        break;
                    }
                }
            };
            queue.post(due);
            fired += 1;
        }
        fired
    }

    // ── Internal ──────────────────────────────────────────────

    fn register(self: &Arc<Self>, event: Event) -> VirtualTimer {
        let mut st = self.lock();
        st.slots.push(Slot {
            event,
            deadline_ms: None,
            period_ms: None,
        });
        VirtualTimer {
            clock: Arc::clone(self),
            slot: st.slots.len() - 1,
        }
    }

    /// Pop the earliest expiry at or before `target`, moving `now` to it.
    fn next_due(st: &mut ClockState, target: u64) -> Option<Event> {
        let (idx, deadline) = st
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.deadline_ms.map(|d| (i, d)))
            .filter(|&(_, d)| d <= target)
            .min_by_key(|&(i, d)| (d, i))?;

        st.now_ms = st.now_ms.max(deadline);
        let slot = &mut st.slots[idx];
        slot.deadline_ms = slot.period_ms.map(|p| deadline + p);
        Some(slot.event)
    }

    fn lock(&self) -> MutexGuard<'_, ClockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_slot<R>(&self, slot: usize, f: impl FnOnce(u64, &mut Slot) -> R) -> R {
        let mut st = self.lock();
        let now = st.now_ms;
        f(now, &mut st.slots[slot])
    }
}

/// Handle to one slot of a [`VirtualClock`].
#[derive(Debug)]
pub struct VirtualTimer {
    clock: Arc<VirtualClock>,
    slot: usize,
}

impl VirtualTimer {
    pub fn is_armed(&self) -> bool {
        self.clock.with_slot(self.slot, |_, s| s.deadline_ms.is_some())
    }

    /// Absolute expiry time, if armed.
    pub fn deadline_ms(&self) -> Option<u64> {
        self.clock.with_slot(self.slot, |_, s| s.deadline_ms)
    }
}

impl OneShotTimer for VirtualTimer {
    fn arm(&self, after: Duration) {
        self.clock.with_slot(self.slot, |now, s| {
            s.deadline_ms = Some(now + after.as_millis());
            s.period_ms = None;
        });
    }

    fn disarm(&self) {
        self.clock.with_slot(self.slot, |_, s| s.deadline_ms = None);
    }
}

impl PeriodicTimer for VirtualTimer {
    fn start(&self, period: Duration) {
        let p = period.as_millis().max(1);
        self.clock.with_slot(self.slot, |now, s| {
            s.deadline_ms = Some(now + p);
            s.period_ms = Some(p);
        });
    }

    fn stop(&self) {
        self.clock.with_slot(self.slot, |_, s| {
            s.deadline_ms = None;
            s.period_ms = None;
        });
    }
}
