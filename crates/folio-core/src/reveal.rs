//! Backdrop reveal: a clip circle that opens as the showcase scrolls into view.

use crate::config::RevealConfig;
use crate::error::Result;
use crate::timeline::{Position, Segment, SegmentKind, TweenEngine};
use crate::trigger::{ScrollPin, Scrub, TriggerId};
use crate::tween::TweenVars;
use crate::view::ShowcaseView;
use tracing::debug;

/// Builds the reveal onto `engine`. Returns `None` when the reveal is disabled.
pub fn build_reveal<E: TweenEngine>(
    engine: &mut E,
    view: &ShowcaseView,
    config: &RevealConfig,
) -> Result<Option<TriggerId>> {
    if !config.enabled {
        return Ok(None);
    }
    let pin = ScrollPin {
        region: view.region,
        pin: false,
        start: config.start.parse()?,
        end: config.end.parse()?,
        scrub: Scrub::Immediate,
    };

    engine.add_segment(
        Segment::from_to(
            view.backdrop,
            SegmentKind::Reveal,
            TweenVars::new().clip_radius(config.from_radius),
            TweenVars::new().clip_radius(config.to_radius),
        )
        .easing(config.easing)
        .duration(1.0),
        Position::At(0.0),
    );
    let id = engine.register_scroll_pin(pin);
    debug!(backdrop = view.backdrop, "backdrop reveal built");
    Ok(Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Deck;
    use crate::config::LayoutConfig;
    use crate::stage::{Stage, Viewport};
    use crate::timeline::Timeline;

    #[test]
    fn clip_opens_between_the_reveal_markers() {
        let mut stage = Stage::new(Viewport {
            width: 1000.0,
            height: 1000.0,
        });
        let view = ShowcaseView::build(&mut stage, &Deck::default(), &LayoutConfig::default());
        let mut engine = Timeline::new();
        assert!(build_reveal(&mut engine, &view, &RevealConfig::default()).unwrap().is_some());

        // Region top 1000: starts at 200, ends at 900.
        engine.sync(0.0, 0.0, &mut stage);
        assert_eq!(stage.pose(view.backdrop).unwrap().clip_radius, 0.0);

        engine.sync(550.0, 16.0, &mut stage);
        assert!((stage.pose(view.backdrop).unwrap().clip_radius - 75.0).abs() < 1e-3);

        engine.sync(2000.0, 32.0, &mut stage);
        assert_eq!(stage.pose(view.backdrop).unwrap().clip_radius, 150.0);
        assert_eq!(engine.pin_spacing(&stage), 0.0);
    }

    #[test]
    fn disabled_reveal_registers_nothing() {
        let mut stage = Stage::new(Viewport::default());
        let view = ShowcaseView::build(&mut stage, &Deck::default(), &LayoutConfig::default());
        let mut engine = Timeline::new();
        let config = RevealConfig {
            enabled: false,
            ..RevealConfig::default()
        };
        assert_eq!(build_reveal(&mut engine, &view, &config).unwrap(), None);
        assert_eq!(engine.trigger_count(), 0);
    }

    #[test]
    fn bad_markers_are_reported() {
        let mut stage = Stage::new(Viewport::default());
        let view = ShowcaseView::build(&mut stage, &Deck::default(), &LayoutConfig::default());
        let config = RevealConfig {
            start: "sideways".into(),
            ..RevealConfig::default()
        };
        assert!(build_reveal(&mut Timeline::new(), &view, &config).is_err());
    }
}
