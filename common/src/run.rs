//! Fixed-timestep scheduling: the world advances in ticks of exactly
//! [`DT`](crate::consts::DT) seconds no matter how fast the outer loop
//! spins. Leftover wall-clock time becomes the interpolation fraction
//! handed to the frame hook.

use crate::consts::DT;
use std::{
    thread,
    time::{Duration, Instant},
};

const CLOCK_SMOOTHING: f64 = 0.9;

/// Wall-clock frames longer than this are treated as a hitch (debugger,
/// laptop lid) and clamped, so the loop does not spiral trying to catch up.
const MAX_FRAME_TIME: f64 = 0.25;

/// Measures frame deltas and optionally sleeps away surplus frame time to
/// hold a target rate.
pub struct Clock {
    last_time: Instant,
    last_delta: Option<Duration>,
    running_delta_average: f64,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    pub fn new() -> Self {
        Self {
            last_time: Instant::now(),
            last_delta: None,
            running_delta_average: 0.0,
        }
    }

    pub fn last_delta(&self) -> Duration {
        self.last_delta.unwrap_or(Duration::ZERO)
    }

    /// Smoothed frames per second, `0.0` until enough frames have passed.
    pub fn fps(&self) -> f64 {
        if self.running_delta_average > 0.0 {
            1.0 / self.running_delta_average
        } else {
            0.0
        }
    }

    /// Sleeps out whatever remains of `tgt` since the previous call, then
    /// returns the measured delta. A zero `tgt` never sleeps.
    pub fn frame_delta(&mut self, tgt: Duration) -> Duration {
        let elapsed = self.last_time.elapsed();
        if let Some(sleep_dur) = tgt.checked_sub(elapsed) {
            thread::sleep(sleep_dur);
        }
        let delta = self.last_time.elapsed();
        self.last_time = Instant::now();
        self.last_delta = Some(delta);
        self.running_delta_average = CLOCK_SMOOTHING * self.running_delta_average
            + (1.0 - CLOCK_SMOOTHING) * delta.as_secs_f64();
        delta
    }
}

/// The hooks a frontend or server hangs off the loop. Only `tick` runs at
/// the fixed rate; everything else runs once per wall-clock frame.
pub trait LoopHandler {
    /// Device and network polling, before any tick of this frame.
    fn poll(&mut self) {}

    fn pre_tick(&mut self) {}

    fn tick(&mut self, tick: u64);

    fn post_tick(&mut self) {}

    /// After the frame's ticks. `alpha` in `0..=1` is how far the next tick
    /// has progressed, for interpolating renders between ticks.
    fn frame(&mut self, _alpha: f32, _fps: f64) {}

    fn should_stop(&self) -> bool {
        false
    }
}

/// Accumulator-driven fixed-timestep driver.
pub struct WorldLoop {
    accumulator: f64,
    tick: u64,
    paused: bool,
    fps_cap: u32,
}

impl WorldLoop {
    /// `fps_cap` bounds how often the outer loop spins; `0` means
    /// uncapped. The simulation rate is unaffected either way.
    pub fn new(fps_cap: u32) -> Self {
        Self { accumulator: 0.0, tick: 0, paused: false, fps_cap }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    /// Pausing freezes simulation time; accumulated backlog is discarded so
    /// unpausing resumes cleanly instead of fast-forwarding.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Advances by one wall-clock frame of length `frame_dt` seconds,
    /// running however many fixed ticks fit. This is the whole scheduling
    /// policy; [`Self::run`] only feeds it real time.
    pub fn step_frame(&mut self, frame_dt: f64, fps: f64, handler: &mut impl LoopHandler) {
        handler.poll();

        self.accumulator += frame_dt.min(MAX_FRAME_TIME);
        if self.paused {
            self.accumulator = 0.0;
        }
        while self.accumulator >= DT {
            handler.pre_tick();
            handler.tick(self.tick);
            handler.post_tick();
            self.tick += 1;
            self.accumulator -= DT;
        }

        let alpha = (self.accumulator / DT).clamp(0.0, 1.0) as f32;
        handler.frame(alpha, fps);
    }

    /// Drives `handler` against real time until it asks to stop.
    pub fn run(&mut self, handler: &mut impl LoopHandler) {
        let mut clock = Clock::new();
        let tgt = if self.fps_cap == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(1.0 / self.fps_cap as f64)
        };
        while !handler.should_stop() {
            let frame_dt = clock.frame_delta(tgt).as_secs_f64();
            self.step_frame(frame_dt, clock.fps(), handler);
        }
    }
}
