//! Integration tests for the adaptive frame pacer driving a full board.
//!
//! These tests verify:
//! 1. The calls-per-frame estimate converges under a steady synthetic clock
//! 2. Visual refresh happens at most once per frame interval
//! 3. Simulation speed changes are tracked without reconfiguration

use vboard_core::board::{Board, HostInput, TARGET_FPS, View};
use vboard_core::pacer::{FramePacer, Pacing, WallClock};

const INTERVAL: u64 = 1_000_000 / TARGET_FPS as u64;

/// Wall clock advanced explicitly by the test harness.
struct ScriptedClock {
    now: u64,
}

impl WallClock for ScriptedClock {
    fn now_micros(&mut self) -> u64 {
        self.now
    }
}

/// Shared handle so the test can advance the clock the board owns.
struct SharedClock(std::rc::Rc<std::cell::Cell<u64>>);

impl WallClock for SharedClock {
    fn now_micros(&mut self) -> u64 {
        self.0.get()
    }
}

#[derive(Default)]
struct FrameRecorder {
    frame_times: Vec<u64>,
    now: std::rc::Rc<std::cell::Cell<u64>>,
}

impl View for FrameRecorder {
    fn poll_events(&mut self, _host: HostInput<'_>) {}

    fn refresh(&mut self, _board: &Board) -> bool {
        self.frame_times.push(self.now.get());
        false
    }

    fn present(&mut self) {}
}

#[test]
fn pacer_converges_at_one_step_per_microsecond() {
    let mut pacer = FramePacer::new(TARGET_FPS);
    let mut clock = ScriptedClock { now: 0 };

    for _ in 0..500_000u64 {
        clock.now += 1;
        pacer.poll(&mut clock);
    }

    let cpf = pacer.cpf() as u64;
    assert!(cpf.abs_diff(INTERVAL) <= 2, "cpf {cpf} far from {INTERVAL}");
}

#[test]
fn board_refreshes_at_most_once_per_interval() {
    let now = std::rc::Rc::new(std::cell::Cell::new(0u64));
    let mut board = Board::with_clock(
        1,
        TARGET_FPS,
        Box::new(SharedClock(std::rc::Rc::clone(&now))),
    );
    let mut view = FrameRecorder {
        now: std::rc::Rc::clone(&now),
        ..Default::default()
    };

    for _ in 0..500_000u64 {
        now.set(now.get() + 1);
        board.step(&mut view);
    }

    assert!(
        (55..=62).contains(&view.frame_times.len()),
        "got {} frames in 500 ms",
        view.frame_times.len()
    );
    for pair in view.frame_times.windows(2) {
        assert!(
            pair[1] - pair[0] > INTERVAL,
            "frames {} and {} closer than the interval",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn frozen_clock_defers_pacing_without_state_changes() {
    let mut pacer = FramePacer::new(TARGET_FPS);
    let mut clock = ScriptedClock { now: 0 };

    for _ in 0..100 {
        assert_eq!(pacer.poll(&mut clock), Pacing::Skipped);
    }
    assert_eq!(pacer.cpf(), 1);

    clock.now = INTERVAL + 1;
    assert_eq!(pacer.poll(&mut clock), Pacing::Frame);
}

#[test]
fn speed_change_retargets_the_estimate() {
    let mut pacer = FramePacer::new(TARGET_FPS);
    let mut clock = ScriptedClock { now: 0 };

    for _ in 0..300_000u64 {
        clock.now += 2;
        pacer.poll(&mut clock);
    }
    let half_speed = pacer.cpf() as u64;
    assert!(half_speed.abs_diff(INTERVAL / 2) <= 2);

    for _ in 0..300_000u64 {
        clock.now += 1;
        pacer.poll(&mut clock);
    }
    let full_speed = pacer.cpf() as u64;
    assert!(full_speed.abs_diff(INTERVAL) <= 2);
}
