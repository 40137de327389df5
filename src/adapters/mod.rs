//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter         | Implements                      | Connects to              |
//! |-----------------|---------------------------------|--------------------------|
//! | `log_sink`      | EventSink                       | Serial / host log output |
//! | `sim`           | AnalogInput, PwmOutput, Display | Host simulation          |
//! |                 | TouchPanel, OutputPin           |                          |
//! | `virtual_timer` | OneShotTimer, PeriodicTimer     | Deterministic clock      |
//!
//! The fan PWM adapter for real `embedded-hal` channels lives with the
//! driver in [`crate::drivers::fan::HalPwm`].

pub mod log_sink;
pub mod sim;
pub mod virtual_timer;
