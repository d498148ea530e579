//! Smooth-scroll driving.
//!
//! A `ScrollDriver` turns discrete wheel input into one eased scroll position
//! per frame. `SmoothScroll` damps the position towards its target with a
//! frame-rate independent exponential lerp.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The smooth-scroll capability the showcase consumes.
pub trait ScrollDriver {
    fn start(&mut self);

    fn stop(&mut self);

    fn is_running(&self) -> bool;

    /// Advances to `now_ms` and returns the eased position, or `None` while
    /// stopped.
    fn raf(&mut self, now_ms: f64) -> Option<f64>;

    /// Feeds one wheel delta, in pixels.
    fn wheel(&mut self, delta: f64);

    fn scroll_to(&mut self, target: f64, immediate: bool);

    /// Largest reachable scroll position.
    fn set_limit(&mut self, limit: f64);

    fn position(&self) -> f64;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmoothScrollConfig {
    /// Fraction of the remaining distance covered per 60 Hz frame.
    pub lerp: f64,
    pub smooth_wheel: bool,
    pub wheel_multiplier: f64,
}

impl Default for SmoothScrollConfig {
    fn default() -> Self {
        Self {
            lerp: 0.07,
            smooth_wheel: true,
            wheel_multiplier: 1.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SmoothScroll {
    config: SmoothScrollConfig,
    value: f64,
    target: f64,
    limit: f64,
    last_ms: Option<f64>,
    running: bool,
}

fn damp(x: f64, y: f64, lambda: f64, dt: f64) -> f64 {
    let t = 1.0 - (-lambda * dt).exp();
    x + (y - x) * t
}

impl SmoothScroll {
    pub fn new(config: SmoothScrollConfig) -> Self {
        Self {
            config,
            value: 0.0,
            target: 0.0,
            limit: 0.0,
            last_ms: None,
            running: true,
        }
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn limit(&self) -> f64 {
        self.limit
    }

    /// True while the position is still easing towards its target.
    pub fn is_animating(&self) -> bool {
        self.value != self.target
    }
}

impl Default for SmoothScroll {
    fn default() -> Self {
        Self::new(SmoothScrollConfig::default())
    }
}

impl ScrollDriver for SmoothScroll {
    fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.last_ms = None;
            debug!("smooth scroll started");
        }
    }

    fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.target = self.value;
            debug!(position = self.value, "smooth scroll stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn raf(&mut self, now_ms: f64) -> Option<f64> {
        if !self.running {
            return None;
        }
        let dt = match self.last_ms.replace(now_ms) {
            Some(last) => ((now_ms - last) / 1000.0).max(0.0),
            None => 0.0,
        };

        if self.is_animating() && dt > 0.0 {
            self.value = damp(self.value, self.target, self.config.lerp * 60.0, dt);
            if (self.value - self.target).abs() < 0.5 {
                self.value = self.target;
            }
        }
        Some(self.value)
    }

    fn wheel(&mut self, delta: f64) {
        if !self.running {
            warn!(delta, "wheel input ignored while smooth scroll is stopped");
            return;
        }
        let target = self.target + delta * self.config.wheel_multiplier;
        self.scroll_to(target, !self.config.smooth_wheel);
    }

    fn scroll_to(&mut self, target: f64, immediate: bool) {
        if !self.running {
            return;
        }
        self.target = target.clamp(0.0, self.limit);
        if immediate {
            self.value = self.target;
        }
    }

    fn set_limit(&mut self, limit: f64) {
        self.limit = limit.max(0.0);
        self.target = self.target.min(self.limit);
        self.value = self.value.min(self.limit);
    }

    fn position(&self) -> f64 {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver() -> SmoothScroll {
        let mut d = SmoothScroll::default();
        d.set_limit(10_000.0);
        d
    }

    #[test]
    fn wheel_input_eases_towards_target() {
        let mut d = driver();
        assert_eq!(d.raf(0.0), Some(0.0));
        d.wheel(1000.0);

        let first = d.raf(16.0).unwrap();
        // One 60 Hz frame covers roughly `lerp` of the distance.
        assert!(first > 60.0 && first < 80.0, "first frame moved to {first}");

        let mut now = 16.0;
        let mut last = first;
        while d.is_animating() {
            now += 16.0;
            let pos = d.raf(now).unwrap();
            assert!(pos >= last);
            last = pos;
            assert!(now < 10_000.0, "never settled");
        }
        assert_eq!(d.position(), 1000.0);
    }

    #[test]
    fn damping_is_frame_rate_independent() {
        let mut fast = driver();
        let mut slow = driver();
        fast.raf(0.0);
        slow.raf(0.0);
        fast.wheel(500.0);
        slow.wheel(500.0);

        for step in 1..=4 {
            fast.raf(step as f64 * 8.0);
        }
        slow.raf(32.0);
        assert!((fast.position() - slow.position()).abs() < 1e-6);
    }

    #[test]
    fn targets_are_clamped_to_the_limit() {
        let mut d = driver();
        d.wheel(-300.0);
        assert_eq!(d.target(), 0.0);
        d.scroll_to(50_000.0, true);
        assert_eq!(d.position(), 10_000.0);
        d.set_limit(2_000.0);
        assert_eq!(d.position(), 2_000.0);
    }

    #[test]
    fn disabling_smooth_wheel_jumps_immediately() {
        let mut d = SmoothScroll::new(SmoothScrollConfig {
            smooth_wheel: false,
            ..SmoothScrollConfig::default()
        });
        d.set_limit(1_000.0);
        d.wheel(250.0);
        assert_eq!(d.raf(0.0), Some(250.0));
    }

    #[test]
    fn stopped_driver_ignores_input_and_yields_nothing() {
        let mut d = driver();
        d.stop();
        assert!(!d.is_running());
        d.wheel(400.0);
        assert_eq!(d.raf(16.0), None);
        assert_eq!(d.target(), 0.0);

        d.start();
        assert_eq!(d.raf(32.0), Some(0.0));
    }

    #[test]
    fn fractional_targets_snap_within_half_a_pixel() {
        let mut d = driver();
        d.raf(0.0);
        d.wheel(333.3);

        let mut now = 0.0;
        let mut previous = 0.0;
        while d.is_animating() {
            previous = d.position();
            now += 16.0;
            d.raf(now);
            assert!(now < 10_000.0, "never settled");
        }
        assert_eq!(d.position(), 333.3);
        assert!(333.3 - previous >= 0.5, "snapped from {previous}");
    }
}
