//! Smooth scroll animation

use std::time::Duration;

/// An eased scroll from one offset to another
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SmoothScroll {
    pub from: f64,
    pub to: f64,
    pub duration: Duration,
}

impl SmoothScroll {
    pub fn new(from: f64, to: f64, duration: Duration) -> Self {
        Self { from, to, duration }
    }

    /// Scroll offset after `elapsed`, clamped to the target once finished
    pub fn position_at(&self, elapsed: Duration) -> f64 {
        if self.is_finished(elapsed) {
            return self.to;
        }
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.from + (self.to - self.from) * ease_in_out(t)
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        self.duration.is_zero() || elapsed >= self.duration
    }
}

// Cubic ease-in-out over [0, 1]
fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}
