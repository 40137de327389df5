//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::fsm::ControlState;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The main loop has started.
    Started {
        state: ControlState,
        threshold_c: f32,
    },

    /// The control state changed, whichever context moved it.
    StateChanged { from: ControlState, to: ControlState },

    /// An accepted touch moved the activation threshold.
    ThresholdChanged { threshold_c: f32 },

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),

    /// The event queue dropped events since the last report.
    EventsDropped(u32),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryData {
    pub state: ControlState,
    pub temperature_c: f32,
    pub threshold_c: f32,
    pub duty: f32,
    pub samples: u32,
    pub dropped_events: u32,
}
