//! Cross-context event queue.
//!
//! Events are produced by timer callbacks (interrupt context) and consumed
//! by the single worker context.  A callback never does the work itself:
//! it posts an intent and returns.
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Sampling timer   │────▶│              │     │              │
//! │ Ramp timer       │────▶│  EventQueue  │────▶│    Worker    │
//! │ Debounce timer   │────▶│  (bounded)   │     │  (consumer)  │
//! └──────────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! Posting is non-blocking: a full queue drops the event and bumps a
//! counter that the main context reports later.  Producers never log.

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

/// Maximum number of pending events.
pub const EVENT_QUEUE_CAP: usize = 16;

/// Work items posted by timer callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Event {
    /// Sampling timer fired: read the sensor, invalidate the display.
    SensorRefresh = 0,
    /// Ramp one-shot fired: advance the fan duty by one step.
    RampStep = 1,
    /// Debounce one-shot fired: reopen the input gate.
    GateReset = 2,
}

/// Bounded multi-producer, single-consumer queue between interrupt
/// context and the worker.
pub struct EventQueue {
    channel: Channel<CriticalSectionRawMutex, Event, EVENT_QUEUE_CAP>,
    dropped: AtomicU32,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Post an event.  Safe to call from interrupt context.
    /// Returns `false` if the queue is full (event dropped).
    pub fn post(&self, event: Event) -> bool {
        if self.channel.try_send(event).is_ok() {
            true
        } else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Pop the next event without waiting.
    pub fn try_next(&self) -> Option<Event> {
        self.channel.try_receive().ok()
    }

    /// Wait for the next event.
    pub async fn receive(&self) -> Event {
        self.channel.receive().await
    }

    /// Drain all pending events into a callback, in FIFO order.
    pub fn drain(&self, mut handler: impl FnMut(Event)) {
        while let Some(event) = self.try_next() {
            handler(event);
        }
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    /// Events dropped because the queue was full, since boot.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}
