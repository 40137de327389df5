//! Mock hardware and a test rig for integration tests.
//!
//! The mocks record every call so tests can assert on the full command
//! history.  [`Rig`] wires them to the real control core, a
//! [`VirtualClock`] and a synchronous worker, and steps all three
//! together in fixed slices of virtual time.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use embassy_time::Duration;

use thermofan::adapters::sim::{LogPin, SimAnalog};
use thermofan::adapters::virtual_timer::{VirtualClock, VirtualTimer};
use thermofan::app::events::AppEvent;
use thermofan::app::ports::{
    Align, Color, Display, EventSink, Font, PwmOutput, TouchPanel, TouchState,
};
use thermofan::app::service::AppService;
use thermofan::app::worker::Worker;
use thermofan::config::SystemConfig;
use thermofan::events::{Event, EventQueue};
use thermofan::fsm::ControlState;
use thermofan::fsm::context::ControlContext;
use thermofan::scheduler::SamplingScheduler;
use thermofan::sensors::temperature::SensorSource;

// ── RecordingPwm ──────────────────────────────────────────────

/// Every duty written, shared with the test through a cloned handle.
#[derive(Clone, Default)]
pub struct RecordingPwm {
    history: Arc<Mutex<Vec<f32>>>,
}

#[allow(dead_code)]
impl RecordingPwm {
    pub fn history(&self) -> Vec<f32> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    /// Forget the history but keep the current duty.
    pub fn clear(&self) {
        if let Ok(mut h) = self.history.lock() {
            let current = h.last().copied();
            h.clear();
            h.extend(current);
        }
    }
}

impl PwmOutput for RecordingPwm {
    fn set_duty(&mut self, duty: f32) {
        if let Ok(mut h) = self.history.lock() {
            h.push(duty);
        }
    }

    fn duty(&self) -> f32 {
        self.history
            .lock()
            .ok()
            .and_then(|h| h.last().copied())
            .unwrap_or(0.0)
    }
}

// ── RecordingDisplay ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear(Color),
    Font(Font),
    TextColor(Color),
    Text { x: u16, y: u16, text: String },
    Rect { x: u16, y: u16, w: u16, h: u16 },
}

pub struct RecordingDisplay {
    pub ops: Vec<DrawOp>,
    width: u16,
}

#[allow(dead_code)]
impl RecordingDisplay {
    pub fn new(width: u16) -> Self {
        Self {
            ops: Vec::new(),
            width,
        }
    }

    pub fn clears(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, DrawOp::Clear(_))).count()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn has_rect(&self, rect: (u16, u16, u16, u16)) -> bool {
        self.ops.contains(&DrawOp::Rect {
            x: rect.0,
            y: rect.1,
            w: rect.2,
            h: rect.3,
        })
    }
}

impl Display for RecordingDisplay {
    fn clear(&mut self, color: Color) {
        self.ops.push(DrawOp::Clear(color));
    }
    fn set_font(&mut self, font: Font) {
        self.ops.push(DrawOp::Font(font));
    }
    fn set_text_color(&mut self, color: Color) {
        self.ops.push(DrawOp::TextColor(color));
    }
    fn draw_text_at(&mut self, x: u16, y: u16, text: &str, _align: Align) {
        self.ops.push(DrawOp::Text {
            x,
            y,
            text: text.to_owned(),
        });
    }
    fn fill_rect(&mut self, x: u16, y: u16, w: u16, h: u16) {
        self.ops.push(DrawOp::Rect { x, y, w, h });
    }
    fn width(&self) -> u16 {
        self.width
    }
    fn height(&self) -> u16 {
        240
    }
}

// ── MockTouch ─────────────────────────────────────────────────

/// Touch panel whose state the test sets through a shared cell.
#[allow(dead_code)]
pub struct MockTouch {
    state: Rc<Cell<TouchState>>,
    pub init_size: Option<(u16, u16)>,
}

impl TouchPanel for MockTouch {
    fn init(&mut self, width: u16, height: u16) {
        self.init_size = Some((width, height));
    }
    fn state(&mut self) -> TouchState {
        self.state.get()
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn state_changes(&self) -> Vec<(ControlState, ControlState)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::StateChanged { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Rig ───────────────────────────────────────────────────────

pub type TestContext = ControlContext<RecordingPwm, LogPin, VirtualTimer>;

pub const DISPLAY_WIDTH: u16 = 320;
/// Virtual time per rig slice.
const SLICE_MS: u64 = 10;

#[allow(dead_code)]
pub struct Rig {
    pub clock: Arc<VirtualClock>,
    pub queue: &'static EventQueue,
    pub ctx: &'static TestContext,
    pub analog: SimAnalog,
    pub pwm: RecordingPwm,
    pub touch: Rc<Cell<TouchState>>,
    pub worker: Worker<'static, SimAnalog, RecordingPwm, LogPin, VirtualTimer>,
    pub app: AppService<'static, RecordingDisplay, MockTouch, RecordingPwm, LogPin, VirtualTimer>,
    pub sink: RecordingSink,
    pub sampler: SamplingScheduler<VirtualTimer>,
}

#[allow(dead_code)]
impl Rig {
    /// Boot with `first_reading_c` as the synchronous start-up sample.
    /// The threshold becomes `round(first_reading_c) + 1`.
    pub fn boot(first_reading_c: f32) -> Self {
        let config = SystemConfig::default();
        let clock = VirtualClock::new();
        // Leaked so the service and worker can borrow for 'static, as
        // firmware statics would.
        let queue: &'static EventQueue = Box::leak(Box::new(EventQueue::new()));

        let analog = SimAnalog::new(0.0);
        analog.set_celsius(first_reading_c);
        let mut sensor = SensorSource::new(analog.clone(), &config);
        let first = sensor.read();

        let pwm = RecordingPwm::default();
        let ctx: &'static TestContext = Box::leak(Box::new(ControlContext::new(
            &config,
            first,
            pwm.clone(),
            (LogPin::new("A"), LogPin::new("B")),
            clock.one_shot(Event::RampStep),
            clock.one_shot(Event::GateReset),
        )));

        let touch = Rc::new(Cell::new(TouchState::default()));
        let mut app = AppService::new(
            ctx,
            queue,
            RecordingDisplay::new(DISPLAY_WIDTH),
            MockTouch {
                state: Rc::clone(&touch),
                init_size: None,
            },
            &config,
        );
        let mut sink = RecordingSink::default();
        app.start(&mut sink);

        let mut sampler = SamplingScheduler::new(clock.periodic(Event::SensorRefresh), &config);
        sampler.start();

        Self {
            worker: Worker::new(sensor, ctx),
            clock,
            queue,
            ctx,
            analog,
            pwm,
            touch,
            app,
            sink,
            sampler,
        }
    }

    /// Advance virtual time by `ms`, draining the worker and running one
    /// main-loop iteration per slice.
    pub fn step(&mut self, ms: u64) {
        let mut left = ms;
        while left > 0 {
            let dt = left.min(SLICE_MS);
            self.clock.advance(Duration::from_millis(dt), self.queue);
            self.worker.run_pending(self.queue);
            self.app.run_once(&mut self.sink);
            left -= dt;
        }
    }

    /// One main-loop iteration without moving time.
    pub fn iterate(&mut self) {
        self.app.run_once(&mut self.sink);
    }

    pub fn set_temperature(&self, celsius: f32) {
        self.analog.set_celsius(celsius);
    }

    pub fn press(&self, x: i32, y: i32) {
        self.touch.set(TouchState {
            detected: true,
            x,
            y,
        });
    }

    pub fn release(&self) {
        self.touch.set(TouchState::default());
    }

    pub fn state(&self) -> ControlState {
        self.ctx.shared.state()
    }

    pub fn duty(&self) -> f32 {
        self.ctx.fan.read().get()
    }

    pub fn threshold(&self) -> f32 {
        self.ctx.shared.threshold()
    }

    pub fn display(&self) -> &RecordingDisplay {
        self.app.display()
    }

    /// Run until the next sensor refresh has been applied.
    pub fn settle_sample(&mut self) {
        let before = self.ctx.shared.samples();
        while self.ctx.shared.samples() == before {
            self.step(SLICE_MS);
        }
        self.iterate();
    }
}
