use std::time::Instant;

/// Source of monotonic wall-clock time in microseconds.
///
/// The pacer only ever looks at differences, so the epoch is arbitrary.
/// Production code uses [`SystemClock`]; tests drive a synthetic clock.
pub trait WallClock {
    fn now_micros(&mut self) -> u64;
}

/// `WallClock` backed by `std::time::Instant`.
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl WallClock for SystemClock {
    fn now_micros(&mut self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }
}

/// Outcome of one pacing poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Countdown not yet expired; nothing was checked.
    Idle,
    /// Countdown expired but no wall time elapsed since the last check;
    /// the cycle is deferred to the next step.
    Skipped,
    /// The estimate was updated but the frame interval has not elapsed.
    Calibrated,
    /// A frame boundary was reached; visual work should run now.
    Frame,
}

/// Closed-loop frame rate limiter.
///
/// Instead of consulting a timer on every simulation step, the pacer counts
/// steps and only reads the clock when `countdown` expires. Each check
/// re-estimates `cpf` (calls per frame): how many steps elapse per target
/// frame interval, derived from the observed ratio of wall time to steps
/// consumed. The correction is folded into the running countdown so pacing
/// adjusts smoothly, and the estimate keeps tracking the simulation speed
/// even when it changes at runtime.
pub struct FramePacer {
    target_fps: u64,
    last_frame_time: u64,
    cpf: i64,
    countdown: i64,
}

impl FramePacer {
    pub fn new(target_fps: u32) -> Self {
        assert!(target_fps > 0, "target fps must be nonzero");
        Self {
            target_fps: u64::from(target_fps),
            last_frame_time: 0,
            cpf: 1,
            countdown: 0,
        }
    }

    /// Minimum wall-clock distance between two frames, in microseconds.
    pub fn frame_interval_micros(&self) -> u64 {
        1_000_000 / self.target_fps
    }

    /// Current calls-per-frame estimate.
    pub fn cpf(&self) -> i64 {
        self.cpf
    }

    /// Advance the pacer by one simulation step.
    pub fn poll(&mut self, clock: &mut dyn WallClock) -> Pacing {
        self.countdown -= 1;
        if self.countdown >= 0 {
            return Pacing::Idle;
        }

        let now = clock.now_micros();
        let diff = now - self.last_frame_time;
        if diff == 0 {
            // Timer resolution limit, not a fault. Retry next step without
            // touching the estimate.
            return Pacing::Skipped;
        }

        let cpf_new = ((self.cpf as u64 * 1_000_000) / (diff * self.target_fps)) as i64;
        self.countdown += cpf_new - self.cpf;
        self.cpf = cpf_new;

        if diff > self.frame_interval_micros() {
            self.last_frame_time = now;
            self.countdown = self.cpf;
            Pacing::Frame
        } else {
            Pacing::Calibrated
        }
    }
}
