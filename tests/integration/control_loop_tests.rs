//! End-to-end control loop: timers → worker → FSM → fan.
//!
//! Every test boots a [`Rig`] at 24 °C, so the threshold starts at 25 °C.

use float_eq::assert_float_eq;

use crate::mock_hw::Rig;
use thermofan::app::events::AppEvent;
use thermofan::app::ports::OneShotTimer;
use thermofan::fsm::ControlState;

fn boot_hot() -> Rig {
    let mut rig = Rig::boot(24.0);
    rig.set_temperature(30.0);
    rig.settle_sample();
    rig
}

#[test]
fn boots_idle_with_derived_threshold() {
    let mut rig = Rig::boot(24.0);
    rig.iterate();
    assert_eq!(rig.state(), ControlState::Idle);
    assert_float_eq!(rig.threshold(), 25.0, abs <= 1e-6);
    assert_eq!(rig.duty(), 0.0);
    assert!(rig.display().texts().contains(&"Thresh: 25.0C"));
    assert!(matches!(
        rig.sink.events[0],
        AppEvent::Started {
            state: ControlState::Idle,
            ..
        }
    ));
}

#[test]
fn hot_sample_starts_ramp_at_initial_duty() {
    let rig = boot_hot();
    assert_eq!(rig.state(), ControlState::Accelerating);
    assert_float_eq!(rig.duty(), 0.1, abs <= 1e-5);
    assert!(rig.ctx.ramp.timer().is_armed());
}

#[test]
fn ramp_climbs_monotonically_to_max_speed() {
    let mut rig = boot_hot();
    rig.pwm.clear();

    // 18 steps of 100 ms, plus slack.
    rig.step(2_000);
    assert_eq!(rig.state(), ControlState::MaxSpeed);
    assert_eq!(rig.duty(), 1.0);

    let history = rig.pwm.history();
    assert!(history.windows(2).all(|w| w[1] >= w[0]), "{history:?}");
    assert!(history.iter().all(|d| (0.1 - 1e-5..=1.0).contains(d)));
    assert!(!rig.ctx.ramp.timer().is_armed());
}

#[test]
fn ramp_is_paced_by_its_timer() {
    let mut rig = boot_hot();
    rig.step(500);
    // 0.1 + 5 × 0.05
    assert_float_eq!(rig.duty(), 0.35, abs <= 1e-4);
    assert_eq!(rig.state(), ControlState::Accelerating);
}

#[test]
fn cooling_at_max_speed_returns_to_idle() {
    let mut rig = boot_hot();
    rig.step(2_000);
    assert_eq!(rig.state(), ControlState::MaxSpeed);

    rig.set_temperature(20.0);
    rig.settle_sample();
    assert_eq!(rig.state(), ControlState::Idle);
    assert_eq!(rig.duty(), 0.0);

    assert_eq!(
        rig.sink.state_changes(),
        [
            (ControlState::Idle, ControlState::Accelerating),
            (ControlState::Accelerating, ControlState::MaxSpeed),
            (ControlState::MaxSpeed, ControlState::Idle),
        ]
    );
}

#[test]
fn cooling_mid_ramp_aborts_and_stays_off() {
    let mut rig = boot_hot();
    rig.step(300);
    assert!(rig.duty() > 0.1);

    rig.set_temperature(20.0);
    rig.settle_sample();
    assert_eq!(rig.state(), ControlState::Idle);
    assert_eq!(rig.duty(), 0.0);
    assert!(!rig.ctx.ramp.timer().is_armed());

    rig.step(1_000);
    assert_eq!(rig.duty(), 0.0);
    assert_eq!(rig.state(), ControlState::Idle);
}

#[test]
fn stale_ramp_firing_is_a_no_op() {
    let mut rig = boot_hot();
    rig.set_temperature(20.0);
    rig.settle_sample();
    assert_eq!(rig.state(), ControlState::Idle);

    // Re-arm by hand as if a disarm had raced the expiry.
    rig.ctx.ramp.timer().arm(embassy_time::Duration::from_millis(10));
    rig.step(20);
    assert_eq!(rig.duty(), 0.0);
    assert_eq!(rig.state(), ControlState::Idle);
}

#[test]
fn equal_temperature_does_not_activate() {
    let mut rig = Rig::boot(24.0);
    rig.set_temperature(25.0);
    rig.step(1_000);
    assert_eq!(rig.state(), ControlState::Idle);
    assert_eq!(rig.duty(), 0.0);
}

#[test]
fn each_sample_redraws_the_screen() {
    let mut rig = Rig::boot(24.0);
    rig.iterate();
    let first = rig.display().clears();
    assert_eq!(first, 1);
    rig.step(1_500);
    assert_eq!(rig.display().clears(), first + 3);
}

#[test]
fn telemetry_every_ten_samples() {
    let mut rig = Rig::boot(24.0);
    rig.step(5_000);
    let telemetry: Vec<_> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Telemetry(t) => Some(*t),
            _ => None,
        })
        .collect();
    assert_eq!(telemetry.len(), 1);
    assert_eq!(telemetry[0].samples, 10);
    assert_eq!(telemetry[0].state, ControlState::Idle);
    assert_eq!(telemetry[0].dropped_events, 0);
}
