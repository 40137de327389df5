//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART on hardware, `env_logger` on the host).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | state={:?} | T={:.1}\u{00b0}C thr={:.1}\u{00b0}C | duty={:.0}% | \
                     samples={} dropped={}",
                    t.state,
                    t.temperature_c,
                    t.threshold_c,
                    t.duty * 100.0,
                    t.samples,
                    t.dropped_events,
                );
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::ThresholdChanged { threshold_c } => {
                info!("THRESH | {:.1}C", threshold_c);
            }
            AppEvent::EventsDropped(n) => {
                warn!("QUEUE | {} events dropped", n);
            }
            AppEvent::Started { state, threshold_c } => {
                info!(
                    "START | initial_state={:?} threshold={:.1}C",
                    state, threshold_c
                );
            }
        }
    }
}
