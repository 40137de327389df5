//! Application service: the main-context loop.
//!
//! [`AppService`] owns the FSM, the display and the touch panel, and
//! borrows the [`ControlContext`] it shares with the worker.  One call to
//! [`run_once`](AppService::run_once) is one main-loop iteration:
//!
//! ```text
//!  ┌─ (a) render readings (cleared first when DisplayInvalid)
//!  ├─ (b) poll touch
//!  ├─ (c) touch && gate.try_accept() ── threshold ± step, indicator, pressed block
//!  ├─ (d) otherwise ────────────────── indicators off, draw buttons
//!  └─ (e) FSM tick
//! ```
//!
//! After the tick the service reports state changes (its own and the
//! ramp's), dropped queue events and periodic telemetry to the
//! [`EventSink`].

use embedded_hal::digital::OutputPin;
use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::drivers::indicator::Indicator;
use crate::events::EventQueue;
use crate::fsm::context::ControlContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{ControlState, ControlStateMachine};

use super::events::{AppEvent, TelemetryData};
use super::ports::{Display, EventSink, OneShotTimer, PwmOutput, TouchPanel};
use super::ui::{self, Button, Layout};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService<'a, D, Tp, P, L, T> {
    ctx: &'a ControlContext<P, L, T>,
    queue: &'a EventQueue,
    fsm: ControlStateMachine<P, L, T>,
    display: D,
    touch: Tp,
    layout: Layout,
    threshold_step_c: f32,
    /// Sensor refreshes between telemetry events.
    samples_per_telemetry: u32,
    last_telemetry_sample: u32,
    /// State as last reported to the sink.
    last_state: ControlState,
    reported_drops: u32,
    iterations: u64,
}

impl<'a, D, Tp, P, L, T> AppService<'a, D, Tp, P, L, T>
where
    D: Display,
    Tp: TouchPanel,
    P: PwmOutput,
    L: OutputPin,
    T: OneShotTimer,
{
    /// Construct the service.  Does **not** start the FSM; call
    /// [`start`](Self::start) next.
    pub fn new(
        ctx: &'a ControlContext<P, L, T>,
        queue: &'a EventQueue,
        display: D,
        touch: Tp,
        config: &SystemConfig,
    ) -> Self {
        let layout = Layout::new(display.width());
        let samples_per_telemetry = config
            .telemetry_interval()
            .as_millis()
            .checked_div(config.sample_period().as_millis())
            .map_or(1, |n| n.clamp(1, u64::from(u32::MAX)) as u32);
        Self {
            ctx,
            queue,
            fsm: ControlStateMachine::new(build_state_table()),
            display,
            touch,
            layout,
            threshold_step_c: config.threshold_step_c,
            samples_per_telemetry,
            last_telemetry_sample: 0,
            last_state: ctx.shared.state(),
            reported_drops: 0,
            iterations: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Bring up the touch panel and display style, enter the initial
    /// state.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        let (w, h) = (self.display.width(), self.display.height());
        self.touch.init(w, h);
        self.display.set_font(ui::FONT);
        self.display.set_text_color(ui::TEXT_COLOR);

        self.fsm.start(self.ctx);
        self.last_state = self.ctx.shared.state();

        let threshold_c = self.ctx.shared.threshold();
        sink.emit(&AppEvent::Started {
            state: self.last_state,
            threshold_c,
        });
        info!(
            "AppService started in {:?}, threshold {:.1}C, display {}x{}",
            self.last_state, threshold_c, w, h
        );
    }

    // ── Per-iteration orchestration ───────────────────────────

    pub fn run_once(&mut self, sink: &mut impl EventSink) {
        self.iterations += 1;

        // (a) Readings every pass; the periodic refresh also wipes the screen.
        if self.ctx.shared.take_display_invalid() {
            ui::clear_screen(&mut self.display);
        }
        ui::draw_readings(&mut self.display, &self.ctx.readings());

        // (b) + (c) + (d) Touch input.
        let touch = self.touch.state();
        if touch.detected && self.ctx.gate.try_accept() {
            self.on_touch_accepted(touch.x, touch.y, sink);
        } else {
            self.ctx.feedback.clear();
            ui::draw_buttons(&mut self.display, &self.layout);
        }

        // The ramp may have moved the state since the last iteration.
        self.report_state(self.ctx.shared.state(), sink);

        // (e) FSM tick.
        if let Some(t) = self.fsm.tick(self.ctx) {
            self.report_state(t.from, sink);
            sink.emit(&AppEvent::StateChanged {
                from: t.from,
                to: t.to,
            });
            self.last_state = t.to;
        }

        self.report_drops(sink);
        self.maybe_emit_telemetry(sink);
    }

    /// Loop forever with no waits.
    pub fn run_forever(&mut self, sink: &mut impl EventSink) -> ! {
        loop {
            self.run_once(sink);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Read-only status snapshot.
    pub fn snapshot(&self) -> TelemetryData {
        let r = self.ctx.readings();
        TelemetryData {
            state: self.ctx.shared.state(),
            temperature_c: r.temperature_c,
            threshold_c: r.threshold_c,
            duty: self.ctx.fan.read().get(),
            samples: self.ctx.shared.samples(),
            dropped_events: self.queue.dropped(),
        }
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn fsm(&self) -> &ControlStateMachine<P, L, T> {
        &self.fsm
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn touch_mut(&mut self) -> &mut Tp {
        &mut self.touch
    }

    // ── Internal ──────────────────────────────────────────────

    fn on_touch_accepted(&mut self, x: i32, y: i32, sink: &mut impl EventSink) {
        let (button, delta, indicator) = match self.layout.hit(x, y) {
            Some(Button::Increase) => (Button::Increase, self.threshold_step_c, Indicator::Ramp),
            Some(Button::Decrease) => (Button::Decrease, -self.threshold_step_c, Indicator::Max),
            None => {
                debug!("touch at ({}, {}) outside buttons", x, y);
                return;
            }
        };

        let threshold_c = self.ctx.shared.adjust_threshold(delta);
        self.ctx.feedback.set(indicator, true);
        ui::draw_pressed(&mut self.display, &self.layout, button);
        debug!("touch {:?} at ({}, {})", button, x, y);
        info!("threshold -> {:.1}C", threshold_c);
        sink.emit(&AppEvent::ThresholdChanged { threshold_c });
    }

    fn report_state(&mut self, now: ControlState, sink: &mut impl EventSink) {
        if now != self.last_state {
            sink.emit(&AppEvent::StateChanged {
                from: self.last_state,
                to: now,
            });
            self.last_state = now;
        }
    }

    fn report_drops(&mut self, sink: &mut impl EventSink) {
        let dropped = self.queue.dropped();
        if dropped > self.reported_drops {
            let fresh = dropped - self.reported_drops;
            warn!("event queue full: {} events dropped ({} total)", fresh, dropped);
            sink.emit(&AppEvent::EventsDropped(fresh));
            self.reported_drops = dropped;
        }
    }

    fn maybe_emit_telemetry(&mut self, sink: &mut impl EventSink) {
        let samples = self.ctx.shared.samples();
        if samples.wrapping_sub(self.last_telemetry_sample) >= self.samples_per_telemetry {
            self.last_telemetry_sample = samples;
            sink.emit(&AppEvent::Telemetry(self.snapshot()));
        }
    }
}
