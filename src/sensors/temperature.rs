//! Linear analog temperature sensor (LM35 style, 10 mV/°C).
//!
//! The analog port yields a normalised voltage; dividing by the
//! volts-per-degree constant gives °C.  There is no error path: a
//! disconnected sensor just reads as 0 °C.

use log::trace;

use crate::app::ports::AnalogInput;
use crate::config::SystemConfig;

pub struct SensorSource<A> {
    input: A,
    volts_per_degree: f32,
}

impl<A: AnalogInput> SensorSource<A> {
    pub fn new(input: A, config: &SystemConfig) -> Self {
        Self {
            input,
            volts_per_degree: config.sensor_volts_per_degree,
        }
    }

    /// Sample the input and convert to °C.
    pub fn read(&mut self) -> f32 {
        let raw = self.input.read_raw();
        let celsius = raw / self.volts_per_degree;
        trace!("sensor raw={:.4} -> {:.2}C", raw, celsius);
        celsius
    }
}
