//! Tweenable view attributes.
//!
//! `Pose` is the fully resolved paint state of one node; `TweenVars` is the
//! partial set of attributes a segment sets or animates.

use keyframe::CanTween;
use serde::{Deserialize, Serialize};

/// A length that is either absolute or relative to the target's own extent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Length {
    Px(f32),
    Percent(f32),
}

impl Length {
    pub fn resolve(self, extent: f32) -> f32 {
        match self {
            Length::Px(px) => px,
            Length::Percent(pct) => extent * pct / 100.0,
        }
    }
}

/// A vertical drop shadow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Shadow {
    pub offset_y: f32,
    pub blur: f32,
    pub alpha: f32,
}

impl Shadow {
    pub const NONE: Shadow = Shadow {
        offset_y: 0.0,
        blur: 0.0,
        alpha: 0.0,
    };

    /// Resting card shadow before any settle: `0 20px 25px rgba(0,0,0,0.1)`.
    pub const RESTING: Shadow = Shadow {
        offset_y: 20.0,
        blur: 25.0,
        alpha: 0.1,
    };

    /// Shadow of a card pushed back into the stack: `0 20px 40px rgba(0,0,0,0.4)`.
    pub const STACKED: Shadow = Shadow {
        offset_y: 20.0,
        blur: 40.0,
        alpha: 0.4,
    };
}

impl CanTween for Shadow {
    fn ease(from: Self, to: Self, time: impl keyframe::num_traits::Float) -> Self {
        let t = time.to_f32().unwrap_or(1.0);
        Shadow {
            offset_y: f32::ease(from.offset_y, to.offset_y, t),
            blur: f32::ease(from.blur, to.blur, t),
            alpha: f32::ease(from.alpha, to.alpha, t),
        }
    }
}

/// Resolved paint state of a stage node.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Pose {
    /// Vertical translation in pixels, positive is downwards.
    pub translate_y: f32,
    pub scale: f32,
    pub opacity: f32,
    pub shadow: Shadow,
    pub z_index: i32,
    /// Radius of the clip circle, in percent of the node's size.
    pub clip_radius: f32,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            translate_y: 0.0,
            scale: 1.0,
            opacity: 1.0,
            shadow: Shadow::NONE,
            z_index: 0,
            clip_radius: 100.0,
        }
    }
}

/// Attributes touched by a segment. `None` leaves the attribute alone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TweenVars {
    pub translate_y: Option<Length>,
    pub scale: Option<f32>,
    pub opacity: Option<f32>,
    pub shadow: Option<Shadow>,
    pub z_index: Option<i32>,
    pub clip_radius: Option<f32>,
}

impl TweenVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn y(mut self, y: Length) -> Self {
        self.translate_y = Some(y);
        self
    }

    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn shadow(mut self, shadow: Shadow) -> Self {
        self.shadow = Some(shadow);
        self
    }

    pub fn z_index(mut self, z: i32) -> Self {
        self.z_index = Some(z);
        self
    }

    pub fn clip_radius(mut self, radius: f32) -> Self {
        self.clip_radius = Some(radius);
        self
    }

    /// Sets every present attribute on `pose`. `height` resolves percentages.
    pub fn apply_onto(&self, mut pose: Pose, height: f32) -> Pose {
        if let Some(y) = self.translate_y {
            pose.translate_y = y.resolve(height);
        }
        if let Some(scale) = self.scale {
            pose.scale = scale;
        }
        if let Some(opacity) = self.opacity {
            pose.opacity = opacity;
        }
        if let Some(shadow) = self.shadow {
            pose.shadow = shadow;
        }
        if let Some(z) = self.z_index {
            pose.z_index = z;
        }
        if let Some(radius) = self.clip_radius {
            pose.clip_radius = radius;
        }
        pose
    }

    /// Moves every present attribute of `pose` from its value in `start`
    /// towards this target by the eased `progress`. The z-index is discrete
    /// and is set outright.
    pub fn blend_onto(&self, mut pose: Pose, start: &Pose, height: f32, progress: f32) -> Pose {
        if let Some(y) = self.translate_y {
            pose.translate_y = f32::ease(start.translate_y, y.resolve(height), progress);
        }
        if let Some(scale) = self.scale {
            pose.scale = f32::ease(start.scale, scale, progress);
        }
        if let Some(opacity) = self.opacity {
            pose.opacity = f32::ease(start.opacity, opacity, progress);
        }
        if let Some(shadow) = self.shadow {
            pose.shadow = Shadow::ease(start.shadow, shadow, progress);
        }
        if let Some(z) = self.z_index {
            pose.z_index = z;
        }
        if let Some(radius) = self.clip_radius {
            pose.clip_radius = f32::ease(start.clip_radius, radius, progress);
        }
        pose
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_lengths_resolve_against_extent() {
        assert_eq!(Length::Percent(100.0).resolve(630.0), 630.0);
        assert_eq!(Length::Percent(-50.0).resolve(200.0), -100.0);
        assert_eq!(Length::Px(-150.0).resolve(630.0), -150.0);
    }

    #[test]
    fn apply_only_touches_present_attributes() {
        let base = Pose {
            opacity: 0.3,
            ..Pose::default()
        };
        let pose = TweenVars::new()
            .y(Length::Percent(100.0))
            .z_index(105)
            .apply_onto(base, 400.0);
        assert_eq!(pose.translate_y, 400.0);
        assert_eq!(pose.z_index, 105);
        assert_eq!(pose.opacity, 0.3);
        assert_eq!(pose.scale, 1.0);
    }

    #[test]
    fn blend_interpolates_from_start_and_keeps_untouched_fields() {
        let start = Pose {
            translate_y: 100.0,
            scale: 1.2,
            opacity: 0.0,
            ..Pose::default()
        };
        let current = Pose {
            opacity: 0.75,
            ..start
        };
        let vars = TweenVars::new().y(Length::Px(0.0)).scale(1.0);

        let half = vars.blend_onto(current, &start, 0.0, 0.5);
        assert!((half.translate_y - 50.0).abs() < 1e-4);
        assert!((half.scale - 1.1).abs() < 1e-4);
        assert_eq!(half.opacity, 0.75);

        let done = vars.blend_onto(current, &start, 0.0, 1.0);
        assert_eq!(done.translate_y, 0.0);
        assert_eq!(done.scale, 1.0);
    }

    #[test]
    fn shadows_tween_component_wise() {
        let mid = Shadow::ease(Shadow::RESTING, Shadow::STACKED, 0.5f32);
        assert!((mid.blur - 32.5).abs() < 1e-4);
        assert!((mid.alpha - 0.25).abs() < 1e-4);
        assert_eq!(mid.offset_y, 20.0);
    }
}
