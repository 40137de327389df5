//! Application core: control orchestration, zero direct I/O.
//!
//! [`service`] is the main-context loop (FSM ticks, touch input, display),
//! [`worker`] is the single consumer of timer events, and [`ui`] holds the
//! screen layout.  All hardware goes through the [`ports`] traits, keeping
//! this layer testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
pub mod ui;
pub mod worker;
