//! Horizontally looping text banner.

use crate::stage::Viewport;

/// Viewports at most this wide scroll the banner slower.
pub const NARROW_VIEWPORT: f32 = 640.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Marquee {
    text: String,
    /// Width of the doubled content strip, padding included.
    content_width: f32,
    period_ms: f64,
    padding_right: f32,
}

impl Marquee {
    /// `text_width` is the rendered width of one copy of `text`.
    pub fn new(text: impl Into<String>, text_width: f32, viewport: &Viewport) -> Self {
        let narrow = viewport.width <= NARROW_VIEWPORT;
        let (period_ms, padding_right) = if narrow { (25_000.0, 100.0) } else { (15_000.0, 200.0) };
        Self {
            text: text.into(),
            content_width: text_width * 2.0 + padding_right,
            period_ms,
            padding_right,
        }
    }

    /// The strip as laid out: the text twice, so the loop point is seamless.
    pub fn content(&self) -> String {
        format!("{0}\u{a0}\u{a0}\u{a0}\u{a0}{0}", self.text)
    }

    pub fn period_ms(&self) -> f64 {
        self.period_ms
    }

    pub fn padding_right(&self) -> f32 {
        self.padding_right
    }

    /// Horizontal translation at `now_ms`, moving linearly from 0 to half the
    /// strip and wrapping.
    pub fn offset_at(&self, now_ms: f64) -> f32 {
        let phase = (now_ms / self.period_ms).rem_euclid(1.0);
        -(self.content_width / 2.0) * phase as f32
    }
}
