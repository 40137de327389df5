//! Actuator drivers: the fan PWM and the two feedback outputs.

pub mod fan;
pub mod indicator;
