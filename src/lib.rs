//! ThermoFan firmware library.
//!
//! Closed-loop fan control: a periodically sampled temperature is compared
//! against a touch-adjustable threshold, and a three-state machine drives
//! a PWM fan through a timer-paced ramp.
//!
//! ```text
//!  timers ──▶ EventQueue ──▶ Worker ──▶ SharedState ◀── AppService (main loop)
//!                               │                          │
//!                               └──── RampController ──────┴── ControlStateMachine
//! ```
//!
//! Hardware is reached only through the port traits in [`app::ports`];
//! [`adapters`] holds the host-side implementations.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod events;
pub mod fsm;
pub mod scheduler;
pub mod sensors;
