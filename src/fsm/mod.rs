//! Function-pointer finite state machine engine for the fan controller.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  StateTable                                                      │
//! │  ┌──────────────┬───────────┬──────────┬──────────────────────┐  │
//! │  │ ControlState │ on_enter  │ on_exit  │ on_update            │  │
//! │  ├──────────────┼───────────┼──────────┼──────────────────────┤  │
//! │  │ Idle         │ fn(ctx)   │ -        │ fn(ctx, r)->Option<> │  │
//! │  │ Accelerating │ fn(ctx)   │ fn(ctx)  │ fn(ctx, r)->Option<> │  │
//! │  │ MaxSpeed     │ fn(ctx)   │ -        │ fn(ctx, r)->Option<> │  │
//! │  └──────────────┴───────────┴──────────┴──────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine reads the current state from [`SharedState`],
//! calls its `on_update` with a fresh [`Readings`] snapshot, and if that
//! returns `Some(next)` commits the move with a compare-and-swap.  Only a
//! successful swap runs `on_exit(current)` then `on_enter(next)`.
//!
//! The ramp (worker context) can move Accelerating → MaxSpeed between two
//! ticks.  The engine does not own that edge; it just sees a different
//! state on the next tick.  A tick racing that edge loses its swap and
//! re-evaluates next time round.
//!
//! [`SharedState`]: context::SharedState

pub mod context;
pub mod states;

use context::{ControlContext, Readings};
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// The three control states.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ControlState {
    Idle = 0,
    Accelerating = 1,
    MaxSpeed = 2,
}

impl ControlState {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 3;

    /// Decode the atomic representation.  Only this module stores into the
    /// state atomic, so an unknown value is a bug: panics in debug builds,
    /// falls back to `Idle` (fan off) in release.
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Idle,
            1 => Self::Accelerating,
            2 => Self::MaxSpeed,
            _ => {
                debug_assert!(false, "invalid control state: {raw}");
                Self::Idle
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn<P, L, T> = fn(&ControlContext<P, L, T>);

/// Per-tick guard.  Returns `Some(next)` to request a transition.
pub type StateUpdateFn<P, L, T> = fn(&ControlContext<P, L, T>, &Readings) -> Option<ControlState>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single state.
pub struct StateDescriptor<P, L, T> {
    pub id: ControlState,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn<P, L, T>>,
    pub on_exit: Option<StateActionFn<P, L, T>>,
    pub on_update: StateUpdateFn<P, L, T>,
}

/// A committed state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ControlState,
    pub to: ControlState,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The control state machine.  Lives in the main context; the state value
/// itself lives in the shared context so the ramp can see it.
pub struct ControlStateMachine<P, L, T> {
    /// Fixed-size table indexed by `ControlState as usize`.
    table: [StateDescriptor<P, L, T>; ControlState::COUNT],
    /// Monotonic tick counter.
    tick_count: u64,
    /// Tick at which this engine last committed a transition.
    last_transition_tick: u64,
}

impl<P, L, T> ControlStateMachine<P, L, T> {
    pub fn new(table: [StateDescriptor<P, L, T>; ControlState::COUNT]) -> Self {
        Self {
            table,
            tick_count: 0,
            last_transition_tick: 0,
        }
    }

    /// Run `on_enter` for whatever state the context is in.
    /// Call once before the first `tick()`.
    pub fn start(&mut self, ctx: &ControlContext<P, L, T>) {
        let current = ctx.shared.state();
        info!("FSM starting in state: {}", self.name(current));
        if let Some(enter) = self.table[current as usize].on_enter {
            enter(ctx);
        }
    }

    /// Advance by one tick.  Returns the transition this tick committed,
    /// if any.
    pub fn tick(&mut self, ctx: &ControlContext<P, L, T>) -> Option<Transition> {
        self.tick_count += 1;
        let current = ctx.shared.state();
        let readings = ctx.shared.readings();

        let next = (self.table[current as usize].on_update)(ctx, &readings)?;
        self.transition(current, next, ctx)
    }

    /// Jump to `next` regardless of guards (bring-up and tests).
    pub fn force_transition(
        &mut self,
        next: ControlState,
        ctx: &ControlContext<P, L, T>,
    ) -> Option<Transition> {
        let current = ctx.shared.state();
        if current == next {
            return None;
        }
        self.transition(current, next, ctx)
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Ticks since this engine last committed a transition.
    pub fn ticks_since_transition(&self) -> u64 {
        self.tick_count - self.last_transition_tick
    }

    pub fn name(&self, state: ControlState) -> &'static str {
        self.table[state as usize].name
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(
        &mut self,
        from: ControlState,
        to: ControlState,
        ctx: &ControlContext<P, L, T>,
    ) -> Option<Transition> {
        // Swap, exit and enter form one critical section so a ramp step
        // cannot slip a duty write in between the swap and on_enter.
        let committed = critical_section::with(|_| {
            if !ctx.shared.transition(from, to) {
                return false;
            }
            if let Some(exit) = self.table[from as usize].on_exit {
                exit(ctx);
            }
            if let Some(enter) = self.table[to as usize].on_enter {
                enter(ctx);
            }
            true
        });

        if !committed {
            info!(
                "FSM transition {} -> {} lost to a concurrent change",
                self.name(from),
                self.name(to)
            );
            return None;
        }

        info!("FSM transition: {} -> {}", self.name(from), self.name(to));
        self.last_transition_tick = self.tick_count;
        Some(Transition { from, to })
    }
}
