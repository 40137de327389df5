//! Control primitives shared by the FSM and the worker.

pub mod debounce;
pub mod ramp;
