//! Concrete state handler functions and table builder.
//!
//! Each state is three plain `fn` pointers: no closures, no dynamic
//! dispatch, no heap.
//!
//! ```text
//!  IDLE ──[T > thr]──▶ ACCELERATING ──[ramp saturates]──▶ MAX_SPEED
//!    ▲                      │                                  │
//!    └──────[T <= thr]──────┘                                  │
//!    └──────────────────────────[T <= thr]─────────────────────┘
//! ```
//!
//! The ACCELERATING → MAX_SPEED edge belongs to the ramp (worker context),
//! not to this table.

use embedded_hal::digital::OutputPin;
use log::debug;

use super::context::{ControlContext, Readings};
use super::{ControlState, StateDescriptor};
use crate::app::ports::{OneShotTimer, PwmOutput};
use crate::drivers::fan::DutyCycle;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the state table.  Called once at startup.
pub fn build_state_table<P, L, T>() -> [StateDescriptor<P, L, T>; ControlState::COUNT]
where
    P: PwmOutput,
    L: OutputPin,
    T: OneShotTimer,
{
    [
        // 0: Idle
        StateDescriptor {
            id: ControlState::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // 1: Accelerating
        StateDescriptor {
            id: ControlState::Accelerating,
            name: "Accelerating",
            on_enter: Some(accelerating_enter),
            on_exit: Some(accelerating_exit),
            on_update: accelerating_update,
        },
        // 2: MaxSpeed
        StateDescriptor {
            id: ControlState::MaxSpeed,
            name: "MaxSpeed",
            on_enter: Some(max_speed_enter),
            on_exit: None,
            on_update: max_speed_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state
// ═══════════════════════════════════════════════════════════════════════════

fn fan_off<P: PwmOutput, L: OutputPin, T>(ctx: &ControlContext<P, L, T>) {
    ctx.fan.write(DutyCycle::ZERO);
    ctx.feedback.clear();
}

fn idle_enter<P: PwmOutput, L: OutputPin, T>(ctx: &ControlContext<P, L, T>) {
    fan_off(ctx);
}

/// Re-asserts fan off every tick, then checks the activation guard.
fn idle_update<P: PwmOutput, L: OutputPin, T>(
    ctx: &ControlContext<P, L, T>,
    r: &Readings,
) -> Option<ControlState> {
    fan_off(ctx);
    if r.over_threshold() {
        debug!(
            "Idle: {:.2}C above threshold {:.2}C",
            r.temperature_c, r.threshold_c
        );
        return Some(ControlState::Accelerating);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  ACCELERATING state
// ═══════════════════════════════════════════════════════════════════════════

fn accelerating_enter<P: PwmOutput, L, T: OneShotTimer>(ctx: &ControlContext<P, L, T>) {
    ctx.ramp.start(&ctx.fan);
}

fn accelerating_exit<P, L, T: OneShotTimer>(ctx: &ControlContext<P, L, T>) {
    ctx.ramp.stop();
}

/// Duty belongs to the ramp here; only the abort guard runs.
fn accelerating_update<P, L, T>(
    _ctx: &ControlContext<P, L, T>,
    r: &Readings,
) -> Option<ControlState> {
    if r.over_threshold() {
        None
    } else {
        Some(ControlState::Idle)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  MAX_SPEED state
// ═══════════════════════════════════════════════════════════════════════════

fn max_speed_enter<P: PwmOutput, L, T>(ctx: &ControlContext<P, L, T>) {
    ctx.fan.write(DutyCycle::FULL);
}

fn max_speed_update<P: PwmOutput, L, T>(
    ctx: &ControlContext<P, L, T>,
    r: &Readings,
) -> Option<ControlState> {
    if !r.over_threshold() {
        return Some(ControlState::Idle);
    }
    ctx.fan.write(DutyCycle::FULL);
    None
}
