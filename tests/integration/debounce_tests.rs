//! Touch input through the debounce gate.

use float_eq::assert_float_eq;

use crate::mock_hw::{DISPLAY_WIDTH, Rig};
use thermofan::app::events::AppEvent;
use thermofan::drivers::indicator::Indicator;
use thermofan::fsm::ControlState;

const PLUS: (i32, i32) = (50, 100);
const MINUS: (i32, i32) = (DISPLAY_WIDTH as i32 - 50, 100);

#[test]
fn held_touch_repeats_only_after_window() {
    let mut rig = Rig::boot(24.0);
    rig.press(PLUS.0, PLUS.1);
    rig.iterate();
    assert_float_eq!(rig.threshold(), 25.5, abs <= 1e-6);

    // Still held 100 ms later: gate closed.
    rig.step(100);
    assert_float_eq!(rig.threshold(), 25.5, abs <= 1e-6);

    // The gate reopens at 500 ms and the held touch is taken again.
    rig.step(400);
    assert_float_eq!(rig.threshold(), 26.0, abs <= 1e-6);
}

#[test]
fn tap_release_tap_within_window_is_ignored() {
    let mut rig = Rig::boot(24.0);
    rig.press(PLUS.0, PLUS.1);
    rig.iterate();
    rig.release();
    rig.step(200);
    rig.press(PLUS.0, PLUS.1);
    rig.iterate();
    assert_float_eq!(rig.threshold(), 25.5, abs <= 1e-6);

    rig.release();
    rig.step(400);
    assert!(rig.ctx.gate.is_open());
    rig.press(PLUS.0, PLUS.1);
    rig.iterate();
    assert_float_eq!(rig.threshold(), 26.0, abs <= 1e-6);
}

#[test]
fn minus_lowers_threshold() {
    let mut rig = Rig::boot(24.0);
    rig.press(MINUS.0, MINUS.1);
    rig.iterate();
    assert_float_eq!(rig.threshold(), 24.5, abs <= 1e-6);
    assert!(rig.display().has_rect((DISPLAY_WIDTH - 80, 190, 60, 65)));
    assert!(rig
        .sink
        .events
        .contains(&AppEvent::ThresholdChanged { threshold_c: 24.5 }));
}

#[test]
fn accepted_touch_lights_indicator_until_next_iteration() {
    let mut rig = Rig::boot(24.0);
    rig.set_temperature(30.0);
    rig.settle_sample();
    assert_eq!(rig.state(), ControlState::Accelerating);

    rig.press(PLUS.0, PLUS.1);
    rig.iterate();
    assert!(rig.ctx.feedback.is_on(Indicator::Ramp));
    assert!(rig.display().has_rect((20, 190, 60, 65)));

    rig.release();
    rig.iterate();
    assert!(!rig.ctx.feedback.is_on(Indicator::Ramp));
    assert!(rig.display().has_rect((45, 195, 10, 60)));
}

#[test]
fn idle_tick_clears_touch_indicator() {
    let mut rig = Rig::boot(24.0);
    rig.press(MINUS.0, MINUS.1);
    rig.iterate();
    assert!(!rig.ctx.feedback.is_on(Indicator::Max));
}

#[test]
fn touch_outside_buttons_still_closes_gate() {
    let mut rig = Rig::boot(24.0);
    rig.press(160, 100);
    rig.iterate();
    assert_float_eq!(rig.threshold(), 25.0, abs <= 1e-6);
    assert!(!rig.ctx.gate.is_open());

    // A real press inside the window is swallowed.
    rig.press(PLUS.0, PLUS.1);
    rig.step(100);
    assert_float_eq!(rig.threshold(), 25.0, abs <= 1e-6);
}

#[test]
fn lowering_threshold_below_temperature_starts_fan() {
    let mut rig = Rig::boot(24.0);
    rig.set_temperature(24.8);
    rig.settle_sample();
    assert_eq!(rig.duty(), 0.0);

    rig.press(MINUS.0, MINUS.1);
    rig.iterate();
    rig.release();
    rig.iterate();
    assert_eq!(rig.state(), ControlState::Accelerating);
    assert_float_eq!(rig.duty(), 0.1, abs <= 1e-5);
}

#[test]
fn accepted_press_is_drawn_on_the_following_pass() {
    let mut rig = Rig::boot(24.0);
    rig.iterate();
    let clears = rig.display().clears();

    rig.press(PLUS.0, PLUS.1);
    rig.iterate();
    rig.release();
    let drawn = rig.display().texts().len();
    rig.iterate();

    let texts = rig.display().texts();
    assert_eq!(texts.len(), drawn + 2);
    assert!(texts[drawn].starts_with("Sensor: "));
    assert_eq!(texts[drawn + 1], "Thresh: 25.5C");
    // Redrawn without waiting for the next sample.
    assert_eq!(rig.display().clears(), clears);
}
