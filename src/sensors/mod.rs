//! Sensor drivers.  Only the worker reads sensors; the main context sees
//! the result through the shared temperature.

pub mod temperature;
