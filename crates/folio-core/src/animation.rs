//! # Animation Primitives
//!
//! Easing curves and keyframed values shared by the timeline engine and the
//! scroll triggers.
//!
//! ## Key Types
//! - `EasingType`: the curves segments may name, including the `powerN` family.
//! - `Animated<T>`: a value driven by a `keyframe::AnimationSequence`.

use keyframe::{AnimationSequence, CanTween, EasingFunction, Keyframe};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Easing curves available to segments.
///
/// The `PowerN` variants follow the usual web-animation naming, where
/// `power1` is quadratic, `power2` cubic and `power3` quartic.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    #[serde(alias = "none")]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    #[serde(alias = "power1.in")]
    Power1In,
    #[serde(alias = "power1.out")]
    Power1Out,
    #[serde(alias = "power1.inOut")]
    Power1InOut,
    #[serde(alias = "power2.in")]
    Power2In,
    #[serde(alias = "power2.out")]
    Power2Out,
    #[serde(alias = "power2.inOut")]
    Power2InOut,
    #[serde(alias = "power3.in")]
    Power3In,
    #[serde(alias = "power3.out", alias = "power3")]
    Power3Out,
    #[serde(alias = "power3.inOut")]
    Power3InOut,
}

impl EasingFunction for EasingType {
    fn y(&self, x: f64) -> f64 {
        use keyframe::functions as f;
        match self {
            EasingType::Linear => f::Linear.y(x),
            EasingType::EaseIn => f::EaseIn.y(x),
            EasingType::EaseOut => f::EaseOut.y(x),
            EasingType::EaseInOut => f::EaseInOut.y(x),
            EasingType::Power1In => f::EaseInQuad.y(x),
            EasingType::Power1Out => f::EaseOutQuad.y(x),
            EasingType::Power1InOut => f::EaseInOutQuad.y(x),
            EasingType::Power2In => f::EaseInCubic.y(x),
            EasingType::Power2Out => f::EaseOutCubic.y(x),
            EasingType::Power2InOut => f::EaseInOutCubic.y(x),
            EasingType::Power3In => f::EaseInQuart.y(x),
            EasingType::Power3Out => f::EaseOutQuart.y(x),
            EasingType::Power3InOut => f::EaseInOutQuart.y(x),
        }
    }
}

impl EasingType {
    /// Evaluates the curve at `x`, clamped to the unit interval.
    pub fn eval(&self, x: f32) -> f32 {
        self.y(x.clamp(0.0, 1.0) as f64) as f32
    }
}

/// A value animated through a keyframe sequence.
///
/// Each keyframe stores the easing of the span that *leaves* it, so
/// `add_keyframe(target, duration, easing)` rewrites the easing of the current
/// last keyframe before appending the target.
#[derive(Clone)]
pub struct Animated<T>
where
    T: Clone + CanTween + Default,
{
    raw_keyframes: Vec<(T, f64, EasingType)>,
    sequence: AnimationSequence<T>,
    pub current_value: T,
}

impl<T> Animated<T>
where
    T: Clone + CanTween + Default,
{
    pub fn new(initial: T) -> Self {
        let kf = Keyframe::new(initial.clone(), 0.0, EasingType::Linear);
        Self {
            raw_keyframes: vec![(initial.clone(), 0.0, EasingType::Linear)],
            sequence: AnimationSequence::from(vec![kf]),
            current_value: initial,
        }
    }

    pub fn add_keyframe(&mut self, target: T, duration: f64, easing: EasingType) {
        let new_time = self.sequence.duration() + duration.max(0.0);
        if let Some(last) = self.raw_keyframes.last_mut() {
            last.2 = easing;
        }
        self.raw_keyframes
            .push((target, new_time, EasingType::Linear));

        let frames: Vec<Keyframe<T>> = self
            .raw_keyframes
            .iter()
            .map(|(val, time, ease)| Keyframe::new(val.clone(), *time, *ease))
            .collect();
        self.sequence = AnimationSequence::from(frames);
    }

    pub fn duration(&self) -> f64 {
        self.sequence.duration()
    }

    /// Moves to `time` seconds into the sequence and refreshes `current_value`.
    pub fn update(&mut self, time: f64) {
        self.sequence.advance_to(time);
        self.current_value = self.sequence.now();
    }
}

impl<T> fmt::Debug for Animated<T>
where
    T: Clone + CanTween + Default + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animated")
            .field("current_value", &self.current_value)
            .field("keyframes", &self.raw_keyframes.len())
            .finish()
    }
}
