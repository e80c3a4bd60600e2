//! Interactive playback over an immutable execution trace.
//!
//! `Playback` turns a finished [`ExecutionTrace`] into a steppable,
//! pausable, speed-controlled session. It never recomputes anything:
//! stepping in either direction only moves a cursor, so pausing and
//! resuming cannot lose or half-apply a step. The host owns the timer; it
//! calls [`Playback::advance_if_playing`] at whatever cadence
//! [`Playback::step_interval`] suggests.

use std::time::Duration;

use crate::simulate::{ExecutionStep, ExecutionTrace};

/// Playback session over one trace.
#[derive(Debug, Clone)]
pub struct Playback {
    trace: ExecutionTrace,
    cursor: usize,
    playing: bool,
    paused: bool,
    step_interval: Duration,
}

impl Playback {
    /// Slow preset step interval.
    pub const SLOW: Duration = Duration::from_millis(1500);
    /// Medium preset step interval, the default.
    pub const MEDIUM: Duration = Duration::from_millis(500);
    /// Fast preset step interval.
    pub const FAST: Duration = Duration::from_millis(150);

    /// Lower bound for [`Playback::set_step_interval`].
    pub const MIN_INTERVAL: Duration = Duration::from_millis(100);
    /// Upper bound for [`Playback::set_step_interval`].
    pub const MAX_INTERVAL: Duration = Duration::from_millis(2000);

    /// Create a stopped session positioned at step 0.
    pub fn new(trace: ExecutionTrace) -> Self {
        Self {
            trace,
            cursor: 0,
            playing: false,
            paused: false,
            step_interval: Self::MEDIUM,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The underlying trace.
    pub fn trace(&self) -> &ExecutionTrace {
        &self.trace
    }

    /// The step under the cursor. `None` only for error traces with zero
    /// steps.
    pub fn current_step(&self) -> Option<&ExecutionStep> {
        self.trace.steps.get(self.cursor)
    }

    /// Current cursor position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Total number of steps in the trace.
    pub fn total_steps(&self) -> usize {
        self.trace.steps.len()
    }

    /// Whether the cursor sits on step 0.
    pub fn is_at_start(&self) -> bool {
        self.cursor == 0
    }

    /// Whether the cursor sits on the last step.
    pub fn is_at_end(&self) -> bool {
        self.cursor + 1 >= self.trace.steps.len()
    }

    /// Whether a playback session is running.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether the running session is paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Time the host should wait between automatic advances.
    pub fn step_interval(&self) -> Duration {
        self.step_interval
    }

    // =========================================================================
    // Cursor controls
    // =========================================================================

    /// Move one step forward. Returns whether the cursor moved.
    pub fn step_forward(&mut self) -> bool {
        if self.cursor + 1 < self.trace.steps.len() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Move one step backward. Returns whether the cursor moved.
    pub fn step_backward(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to a step, clamping into the valid range.
    pub fn jump_to(&mut self, index: usize) {
        self.cursor = index.min(self.trace.steps.len().saturating_sub(1));
    }

    /// Rewind to step 0.
    pub fn go_to_start(&mut self) {
        self.cursor = 0;
    }

    /// Jump to the last step.
    pub fn go_to_end(&mut self) {
        self.cursor = self.trace.steps.len().saturating_sub(1);
    }

    // =========================================================================
    // Session controls
    // =========================================================================

    /// Start playing from step 0.
    pub fn play(&mut self) {
        self.playing = true;
        self.paused = false;
        self.cursor = 0;
    }

    /// Pause automatic advancement; the cursor stays put.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume automatic advancement.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Stop the session and rewind to step 0.
    pub fn stop(&mut self) {
        self.playing = false;
        self.paused = false;
        self.cursor = 0;
    }

    /// Set the interval between automatic advances, clamped to
    /// [`Playback::MIN_INTERVAL`]..=[`Playback::MAX_INTERVAL`].
    pub fn set_step_interval(&mut self, interval: Duration) {
        self.step_interval = interval.clamp(Self::MIN_INTERVAL, Self::MAX_INTERVAL);
    }

    /// Timer tick entry point: advance one step while playing and not
    /// paused. The session ends (playing becomes `false`, cursor stays on
    /// the last step) when there is nothing left to advance to. Safe to
    /// call at any time.
    pub fn advance_if_playing(&mut self) -> Option<&ExecutionStep> {
        if !self.playing || self.paused {
            return None;
        }
        if !self.step_forward() {
            self.playing = false;
            return None;
        }
        self.current_step()
    }
}
