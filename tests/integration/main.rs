//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a subsystem against
//! mock adapters and a virtual clock.  All tests run on the host with no
//! real hardware required.

mod control_loop_tests;
mod debounce_tests;
mod mock_hw;
