//! # Scroll Triggers
//!
//! Maps a scroll position onto timeline progress for one stage region.
//!
//! ## Responsibilities
//! - **Markers**: Parse `"top top"`, `"top 80%"`, `"+=580vh"` style start/end markers.
//! - **Progress**: Resolve markers against stage geometry into a scroll range.
//! - **Pinning**: Hold the region in place across the range and report pin spacing.
//! - **Scrub**: Let the playhead follow progress immediately or with a lag.
//! - **Registry**: `TriggerSet`, the instance-scoped collection of live triggers.

use crate::animation::{Animated, EasingType};
use crate::error::{Result, StackError};
use crate::stage::{NodeId, Stage};
use std::str::FromStr;
use tracing::debug;

/// A point along an element or the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Anchor {
    /// Fraction of the extent, `top` = 0, `center` = 0.5, `bottom` = 1.
    Fraction(f32),
    Px(f32),
}

impl Anchor {
    fn resolve(self, extent: f32) -> f32 {
        match self {
            Anchor::Fraction(f) => f * extent,
            Anchor::Px(px) => px,
        }
    }
}

impl FromStr for Anchor {
    type Err = &'static str;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "top" => Ok(Anchor::Fraction(0.0)),
            "center" => Ok(Anchor::Fraction(0.5)),
            "bottom" => Ok(Anchor::Fraction(1.0)),
            _ => {
                if let Some(pct) = s.strip_suffix('%') {
                    pct.parse::<f32>()
                        .map(|p| Anchor::Fraction(p / 100.0))
                        .map_err(|_| "percentage is not a number")
                } else {
                    s.strip_suffix("px")
                        .unwrap_or(s)
                        .parse::<f32>()
                        .map(Anchor::Px)
                        .map_err(|_| "expected top, center, bottom, a percentage or pixels")
                }
            }
        }
    }
}

/// "when `trigger` of the region meets `viewport` of the scroll port".
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Marker {
    pub trigger: Anchor,
    pub viewport: Anchor,
}

impl Marker {
    pub const TOP_TOP: Marker = Marker {
        trigger: Anchor::Fraction(0.0),
        viewport: Anchor::Fraction(0.0),
    };
}

impl FromStr for Marker {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split_whitespace();
        let err = |reason| StackError::Marker {
            input: s.to_string(),
            reason,
        };
        let trigger = parts.next().ok_or_else(|| err("marker is empty"))?;
        let viewport = parts.next().unwrap_or(trigger);
        if parts.next().is_some() {
            return Err(err("expected at most two anchors"));
        }
        Ok(Marker {
            trigger: trigger.parse().map_err(err)?,
            viewport: viewport.parse().map_err(err)?,
        })
    }
}

/// A scroll distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Distance {
    Px(f64),
    /// Viewport-height units, `100` is one viewport.
    Vh(f64),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EndMarker {
    At(Marker),
    /// Distance past the start position, written `+=<distance>`.
    After(Distance),
}

impl FromStr for EndMarker {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self> {
        let Some(rest) = s.trim().strip_prefix("+=") else {
            return s.parse().map(EndMarker::At);
        };
        let err = |reason| StackError::Marker {
            input: s.to_string(),
            reason,
        };
        let distance = if let Some(vh) = rest.strip_suffix("vh") {
            Distance::Vh(vh.parse().map_err(|_| err("distance is not a number"))?)
        } else {
            Distance::Px(
                rest.strip_suffix("px")
                    .unwrap_or(rest)
                    .parse()
                    .map_err(|_| err("distance is not a number"))?,
            )
        };
        Ok(EndMarker::After(distance))
    }
}

/// How the playhead follows scroll progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scrub {
    Immediate,
    /// Seconds the playhead takes to catch up with progress.
    Lag(f64),
}

impl Scrub {
    pub fn from_lag(seconds: f64) -> Self {
        if seconds > 0.0 {
            Scrub::Lag(seconds)
        } else {
            Scrub::Immediate
        }
    }
}

/// Registration payload for a scroll-driven timeline.
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollPin {
    pub region: NodeId,
    pub pin: bool,
    pub start: Marker,
    pub end: EndMarker,
    pub scrub: Scrub,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TriggerId(pub u64);

#[derive(Clone, Debug, Default)]
struct Playhead {
    current: f64,
    target: Option<f64>,
    /// Frame time of the previous advance.
    last_ms: Option<f64>,
    catch_up: Option<(Animated<f64>, f64)>,
}

impl Playhead {
    fn advance(&mut self, target: f64, now_ms: f64, scrub: Scrub) -> f64 {
        match (scrub, self.target) {
            (Scrub::Immediate, _) | (Scrub::Lag(_), None) => {
                self.current = target;
                self.catch_up = None;
            }
            (Scrub::Lag(seconds), Some(previous)) => {
                if previous != target {
                    // Continue from last frame's position and time.
                    let mut tween = Animated::new(self.current);
                    tween.add_keyframe(target, seconds, EasingType::Power3Out);
                    self.catch_up = Some((tween, self.last_ms.unwrap_or(now_ms).min(now_ms)));
                }
                if let Some((tween, started)) = self.catch_up.as_mut() {
                    tween.update(((now_ms - *started) / 1000.0).max(0.0));
                    self.current = tween.current_value;
                }
            }
        }
        self.target = Some(target);
        self.last_ms = Some(now_ms);
        self.current
    }
}

/// A live trigger: its registration plus the scrub state.
#[derive(Clone, Debug)]
pub struct ScrollTrigger {
    pub pin: ScrollPin,
    progress: f64,
    playhead: Playhead,
}

impl ScrollTrigger {
    pub fn new(pin: ScrollPin) -> Self {
        Self {
            pin,
            progress: 0.0,
            playhead: Playhead::default(),
        }
    }

    /// Scroll positions where the trigger starts and ends, or `None` when the
    /// region is not on the stage.
    pub fn bounds(&self, stage: &Stage) -> Option<(f64, f64)> {
        let region = stage.get_node(self.pin.region)?;
        let vh = stage.viewport.height;
        let edge = |marker: &Marker| {
            (region.top + marker.trigger.resolve(region.size.y) - marker.viewport.resolve(vh)) as f64
        };
        let start = edge(&self.pin.start);
        let end = match self.pin.end {
            EndMarker::At(marker) => edge(&marker),
            EndMarker::After(Distance::Px(px)) => start + px,
            EndMarker::After(Distance::Vh(units)) => start + stage.viewport.vh(units),
        };
        Some((start, end))
    }

    /// Extra scroll length the pin adds to the document.
    pub fn pin_spacing(&self, stage: &Stage) -> f64 {
        match (self.pin.pin, self.bounds(stage)) {
            (true, Some((start, end))) => (end - start).max(0.0),
            _ => 0.0,
        }
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Updates progress for `scroll` and returns the playhead time for a
    /// timeline lasting `duration` seconds. Writes the pin offset when pinned.
    pub fn update(&mut self, scroll: f64, now_ms: f64, duration: f64, stage: &mut Stage) -> Option<f64> {
        let (start, end) = self.bounds(stage)?;
        self.progress = if end > start {
            ((scroll - start) / (end - start)).clamp(0.0, 1.0)
        } else if scroll >= start {
            1.0
        } else {
            0.0
        };

        if self.pin.pin {
            let offset = (scroll - start).clamp(0.0, (end - start).max(0.0));
            stage.set_pin_offset(self.pin.region, offset as f32);
        }

        Some(self.playhead.advance(self.progress * duration, now_ms, self.pin.scrub))
    }
}

/// Triggers owned by one timeline, addressed by the ids handed out at
/// registration.
#[derive(Clone, Debug, Default)]
pub struct TriggerSet {
    next_id: u64,
    live: Vec<(TriggerId, ScrollTrigger)>,
}

impl TriggerSet {
    pub fn register(&mut self, pin: ScrollPin) -> TriggerId {
        let id = TriggerId(self.next_id);
        self.next_id += 1;
        debug!(trigger = id.0, region = pin.region, pin = pin.pin, "scroll trigger registered");
        self.live.push((id, ScrollTrigger::new(pin)));
        id
    }

    pub fn kill(&mut self, id: TriggerId) -> bool {
        let before = self.live.len();
        self.live.retain(|(live, _)| *live != id);
        before != self.live.len()
    }

    /// Removes every trigger and returns how many were live.
    pub fn kill_all(&mut self) -> usize {
        let count = self.live.len();
        self.live.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScrollTrigger> {
        self.live.iter().map(|(_, t)| t)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ScrollTrigger> {
        self.live.iter_mut().map(|(_, t)| t)
    }
}
