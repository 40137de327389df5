//! ThermoFan host simulation entry point.
//!
//! Wires the control core to simulated peripherals and a virtual clock.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  main thread      AppService::run_once  (FSM, touch, display)  │
//! │  worker thread    Worker::run           (sensor, ramp, gate)   │
//! │  clock thread     VirtualClock::advance + temperature profile  │
//! │                                                                │
//! │  timers ──post──▶ static EventQueue ──receive──▶ worker        │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Environment:
//! - `RUST_LOG` filters output (default `info`).
//! - `THERMOFAN_CONFIG` names a JSON config file; missing fields default.
//! - `THERMOFAN_SIM_SECS` sets how long to simulate (default 60).

use std::sync::Arc;
use std::thread;
use std::time::Duration as StdDuration;

use anyhow::{Context, Result};
use embassy_time::Duration;
use log::{error, info, warn};

use thermofan::adapters::log_sink::LogEventSink;
use thermofan::adapters::sim::{LogDisplay, LogPin, ScriptedTouch, SimAnalog, SimPwm};
use thermofan::adapters::virtual_timer::VirtualClock;
use thermofan::app::ports::EventSink;
use thermofan::app::service::AppService;
use thermofan::app::worker::Worker;
use thermofan::config::SystemConfig;
use thermofan::error::Error;
use thermofan::events::{Event, EventQueue};
use thermofan::fsm::context::ControlContext;
use thermofan::scheduler::SamplingScheduler;
use thermofan::sensors::temperature::SensorSource;

static QUEUE: EventQueue = EventQueue::new();

const CLOCK_TICK_MS: u64 = 10;
const DISPLAY_WIDTH: u16 = 320;
const DISPLAY_HEIGHT: u16 = 240;

// ── Temperature profile ───────────────────────────────────────

/// Warm up from 24 °C to 32 °C, hold, then cool to 22 °C.
fn profile_celsius(t_ms: u64) -> f32 {
    let t = t_ms as f32 / 1000.0;
    match t {
        t if t < 4.0 => 24.0,
        t if t < 20.0 => 24.0 + (t - 4.0) * 0.5,
        t if t < 30.0 => 32.0,
        t if t < 50.0 => 32.0 - (t - 30.0) * 0.5,
        _ => 22.0,
    }
}

// ── Config ────────────────────────────────────────────────────

fn load_config() -> SystemConfig {
    let Ok(path) = std::env::var("THERMOFAN_CONFIG") else {
        info!("Using default config");
        return SystemConfig::default();
    };
    let loaded = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {path}"))
        .and_then(|text| SystemConfig::from_json(&text).map_err(anyhow::Error::from));
    match loaded {
        Ok(cfg) => {
            info!("Config loaded from {}", path);
            cfg
        }
        Err(e) => {
            warn!("Config load failed ({:#}), using defaults", e);
            SystemConfig::default()
        }
    }
}

// ── Threads ───────────────────────────────────────────────────

fn spawn_named<F>(name: &'static str, body: F) -> thermofan::error::Result<()>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name(name.into())
        .spawn(body)
        .map(|_| ())
        .map_err(|e| {
            error!("{} thread spawn failed: {}", name, e);
            Error::Init(name)
        })
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  ThermoFan sim v{}                ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = load_config();
    let sim_secs: u64 = std::env::var("THERMOFAN_SIM_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(60);

    // ── 1. Peripherals ────────────────────────────────────────
    let clock = VirtualClock::new();
    let analog = SimAnalog::new(0.0);
    analog.set_raw(profile_celsius(0) * config.sensor_volts_per_degree);

    // ── 2. First reading sets the threshold ───────────────────
    let mut sensor = SensorSource::new(analog.clone(), &config);
    let first_reading = sensor.read();

    let ctx: &'static _ = Box::leak(Box::new(ControlContext::new(
        &config,
        first_reading,
        SimPwm::default(),
        (LogPin::new("A"), LogPin::new("B")),
        clock.one_shot(Event::RampStep),
        clock.one_shot(Event::GateReset),
    )));

    // ── 3. Worker ─────────────────────────────────────────────
    spawn_named("worker", move || {
        let mut worker = Worker::new(sensor, ctx);
        futures_lite::future::block_on(worker.run(&QUEUE));
    })?;

    // ── 4. Clock + environment ────────────────────────────────
    {
        let clock = Arc::clone(&clock);
        let volts_per_degree = config.sensor_volts_per_degree;
        spawn_named("clock", move || {
            loop {
                thread::sleep(StdDuration::from_millis(CLOCK_TICK_MS));
                clock.advance(Duration::from_millis(CLOCK_TICK_MS), &QUEUE);
                analog.set_raw(profile_celsius(clock.now_ms()) * volts_per_degree);
            }
        })?;
    }

    // ── 5. Main loop ──────────────────────────────────────────
    // A double tap on "+" (the second lands inside the debounce window),
    // then one "-".
    let touch = ScriptedTouch::new(Arc::clone(&clock))
        .tap(35_000, 150, 50, 100)
        .tap(35_300, 150, 50, 100)
        .tap(40_000, 150, i32::from(DISPLAY_WIDTH) - 50, 100);

    let mut sink = LogEventSink::new();
    let mut app = AppService::new(
        ctx,
        &QUEUE,
        LogDisplay::new(DISPLAY_WIDTH, DISPLAY_HEIGHT),
        touch,
        &config,
    );
    app.start(&mut sink);

    let mut sampler = SamplingScheduler::new(clock.periodic(Event::SensorRefresh), &config);
    sampler.start();

    let end_ms = sim_secs * 1000;
    while clock.now_ms() < end_ms {
        app.run_once(&mut sink);
        // Host only: keeps the busy loop from pinning a core.
        thread::sleep(StdDuration::from_millis(1));
    }

    sampler.stop();
    sink.emit(&thermofan::app::events::AppEvent::Telemetry(app.snapshot()));
    info!(
        "Simulation finished after {} s ({} iterations, {} frames, {} fan writes)",
        sim_secs,
        app.iterations(),
        app.display().frames(),
        ctx.fan.with_pwm(SimPwm::writes)
    );
    Ok(())
}
