//! # Scroll Stack Animator
//!
//! Builds the stacking-card timeline for a deck and keeps it in sync with a
//! smooth-scroll driver, one frame at a time.
//!
//! ## Responsibilities
//! - **Layout**: Per-card depth, resting scale and offset (`StackLayout`).
//! - **Timeline**: An entrance per card and a settle for every card but the
//!   last processed, chained through labels (`build_stack`).
//! - **Lifecycle**: `mount` registers the frame callback and triggers,
//!   `unmount` (or drop) tears all of them down and stops the driver.
//!
//! Cards are processed in reverse deck order. For processing position `i`
//! the card's deck position (`card_index`) is `n - 1 - i`.

use crate::card::Deck;
use crate::config::{ShowcaseConfig, StackConfig};
use crate::error::{Result, StackError};
use crate::frame::{FrameHandle, FrameLoop};
use crate::reveal::build_reveal;
use crate::scroll::{ScrollDriver, SmoothScroll};
use crate::stage::{NodeId, Stage};
use crate::timeline::{Position, Segment, SegmentKind, Timeline, TimelineOutline, TweenEngine};
use crate::trigger::{Distance, EndMarker, ScrollPin, Scrub, TriggerId};
use crate::tween::{Length, Pose, Shadow, TweenVars};
use crate::view::ShowcaseView;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info};

/// Terminal placement of one card in the stack.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StackLayout {
    /// Processing position, 0 = first processed.
    pub stack_index: usize,
    /// Position of the card in the deck.
    pub card_index: usize,
    pub depth: i32,
    pub scale: f32,
    /// Upward offset in px.
    pub offset: f32,
}

impl StackLayout {
    pub fn for_position(stack_index: usize, n: usize, config: &StackConfig) -> Self {
        let steps = n.saturating_sub(1 + stack_index);
        Self {
            stack_index,
            card_index: steps,
            depth: config.depth_base + stack_index as i32 * config.depth_step,
            scale: (1.0 - steps as f32 * config.scale_step).max(config.scale_floor),
            offset: steps as f32 * config.offset_step,
        }
    }

    pub fn has_settle(&self, n: usize) -> bool {
        self.stack_index + 1 < n
    }
}

/// Pinned scroll distance for `n` cards, in viewport-height units.
pub fn scroll_distance_vh(n: usize, config: &StackConfig) -> f64 {
    n as f64 * config.scroll_per_card_vh + config.scroll_base_vh
}

fn start_label(card_index: usize) -> String {
    format!("card-start-{card_index}")
}

fn stack_label(card_index: usize) -> String {
    format!("card-stack-{card_index}")
}

/// Builds the stacking timeline onto `engine`.
///
/// `view.cards` is indexed by deck position. An empty view builds nothing and
/// registers no trigger.
pub fn build_stack<E: TweenEngine>(
    engine: &mut E,
    view: &ShowcaseView,
    config: &StackConfig,
) -> Result<Option<TriggerId>> {
    let n = view.cards.len();
    if n == 0 {
        debug!("empty deck, stacking timeline left empty");
        return Ok(None);
    }

    let pin = ScrollPin {
        region: view.region,
        pin: true,
        start: config.pin_start.parse()?,
        end: EndMarker::After(Distance::Vh(scroll_distance_vh(n, config))),
        scrub: Scrub::from_lag(config.scrub_lag),
    };

    for i in 0..n {
        let layout = StackLayout::for_position(i, n, config);
        let ci = layout.card_index;
        let target = view.cards[ci];

        let entrance = Segment::from_to(
            target,
            SegmentKind::Entrance,
            TweenVars::new()
                .y(Length::Percent(100.0))
                .scale(1.2)
                .opacity(0.0)
                .z_index(layout.depth),
            TweenVars::new().y(Length::Px(0.0)).scale(1.0).opacity(1.0),
        )
        .easing(config.entrance.easing)
        .duration(config.entrance.duration);
        let position = if i == 0 {
            Position::label("start")
        } else {
            Position::label(start_label(ci))
        };
        engine.add_segment(entrance, position);

        if layout.has_settle(n) {
            engine.add_label(&stack_label(ci), Position::after(start_label(ci), config.settle_delay));
            let settle = Segment::to(
                target,
                SegmentKind::Settle,
                TweenVars::new()
                    .y(Length::Px(-layout.offset))
                    .scale(layout.scale)
                    .shadow(Shadow::STACKED),
            )
            .easing(config.settle.easing)
            .duration(config.settle.duration);
            engine.add_segment(settle, Position::label(stack_label(ci)));
            engine.add_label(
                &start_label(ci - 1),
                Position::after(stack_label(ci), config.next_entrance_delay),
            );
        }
    }

    Ok(Some(engine.register_scroll_pin(pin)))
}

/// State shared between the animator and its frame callback.
struct Runtime<E, D> {
    driver: D,
    stage: Option<Rc<RefCell<Stage>>>,
    stack: Option<E>,
    reveal: Option<E>,
}

impl<E: TweenEngine, D: ScrollDriver> Runtime<E, D> {
    fn frame(&mut self, now_ms: f64) {
        let Some(position) = self.driver.raf(now_ms) else {
            return;
        };
        let Some(stage) = self.stage.as_ref() else {
            return;
        };
        let mut stage = stage.borrow_mut();
        if let Some(engine) = self.reveal.as_mut() {
            engine.sync(position, now_ms, &mut stage);
        }
        if let Some(engine) = self.stack.as_mut() {
            engine.sync(position, now_ms, &mut stage);
        }
    }

    fn teardown(&mut self) {
        for engine in [self.stack.as_mut(), self.reveal.as_mut()].into_iter().flatten() {
            engine.teardown();
        }
        self.stack = None;
        self.reveal = None;
        self.stage = None;
        self.driver.stop();
    }
}

struct Mounted {
    frame: FrameHandle,
    /// Node poses from before mount, restored on unmount.
    snapshot: Vec<(NodeId, Pose)>,
    region: NodeId,
}

/// The stacking-card showcase: a deck, its timelines and the scroll driver.
pub struct ScrollStackAnimator<E = Timeline, D = SmoothScroll>
where
    E: TweenEngine + Default + 'static,
    D: ScrollDriver + 'static,
{
    deck: Deck,
    config: ShowcaseConfig,
    runtime: Rc<RefCell<Runtime<E, D>>>,
    mounted: Option<Mounted>,
}

impl ScrollStackAnimator {
    /// An animator with the built-in timeline and smooth scroll.
    pub fn with_defaults(deck: Deck, config: ShowcaseConfig) -> Self {
        let driver = SmoothScroll::new(config.scroll.clone());
        Self::new(deck, config, driver)
    }
}

impl<E, D> ScrollStackAnimator<E, D>
where
    E: TweenEngine + Default + 'static,
    D: ScrollDriver + 'static,
{
    pub fn new(deck: Deck, config: ShowcaseConfig, mut driver: D) -> Self {
        driver.stop();
        Self {
            deck,
            config,
            runtime: Rc::new(RefCell::new(Runtime {
                driver,
                stage: None,
                stack: None,
                reveal: None,
            })),
            mounted: None,
        }
    }

    /// Builds the timelines against `view`, starts the driver and registers
    /// the frame callback on `frames`.
    pub fn mount(&mut self, stage: Rc<RefCell<Stage>>, frames: &mut FrameLoop, view: &ShowcaseView) -> Result<()> {
        if self.mounted.is_some() {
            return Err(StackError::AlreadyMounted);
        }
        if view.cards.len() != self.deck.len() {
            return Err(StackError::DeckMismatch {
                expected: self.deck.len(),
                found: view.cards.len(),
            });
        }

        let (snapshot, limit, stack, reveal) = {
            let mut stage_ref = stage.borrow_mut();
            if stage_ref.get_node(view.region).is_none() {
                return Err(StackError::MissingTriggerRegion(view.region));
            }
            let mut snapshot = Vec::with_capacity(view.cards.len() + 2);
            for &id in view.cards.iter().chain([&view.region, &view.backdrop]) {
                let pose = stage_ref.pose(id).ok_or(StackError::MissingCardNode(id))?;
                snapshot.push((id, pose));
            }

            let mut stack = E::default();
            build_stack(&mut stack, view, &self.config.stack)?;
            let mut reveal = E::default();
            build_reveal(&mut reveal, view, &self.config.reveal)?;

            let spacing = stack.pin_spacing(&stage_ref) + reveal.pin_spacing(&stage_ref);
            let limit = stage_ref.content_height() as f64 + spacing - stage_ref.viewport.height as f64;

            // First render, before any scroll input.
            reveal.sync(0.0, 0.0, &mut stage_ref);
            stack.sync(0.0, 0.0, &mut stage_ref);
            (snapshot, limit, stack, reveal)
        };

        info!(
            cards = self.deck.len(),
            duration = stack.duration(),
            scroll_limit = limit,
            "showcase mounted"
        );

        {
            let mut runtime = self.runtime.borrow_mut();
            runtime.driver.start();
            runtime.driver.set_limit(limit);
            runtime.driver.scroll_to(0.0, true);
            runtime.stage = Some(stage);
            runtime.stack = Some(stack);
            runtime.reveal = Some(reveal);
        }

        let runtime = Rc::downgrade(&self.runtime);
        let frame = frames.request_while(move |now_ms| match runtime.upgrade() {
            Some(runtime) => {
                runtime.borrow_mut().frame(now_ms);
                true
            }
            None => false,
        });
        self.mounted = Some(Mounted {
            frame,
            snapshot,
            region: view.region,
        });
        Ok(())
    }

    /// Cancels the frame callback, kills every trigger, stops the driver and
    /// restores the poses the view had before mount.
    pub fn unmount(&mut self, frames: &mut FrameLoop) {
        let Some(mounted) = self.mounted.take() else {
            return;
        };
        frames.cancel(mounted.frame);

        let mut runtime = self.runtime.borrow_mut();
        if let Some(stage) = runtime.stage.clone() {
            let mut stage = stage.borrow_mut();
            for (id, pose) in &mounted.snapshot {
                stage.set_pose(*id, *pose);
            }
            stage.set_pin_offset(mounted.region, 0.0);
        }
        runtime.teardown();
        info!("showcase unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn wheel(&self, delta: f64) {
        self.runtime.borrow_mut().driver.wheel(delta);
    }

    pub fn scroll_to(&self, target: f64, immediate: bool) {
        self.runtime.borrow_mut().driver.scroll_to(target, immediate);
    }

    pub fn position(&self) -> f64 {
        self.runtime.borrow().driver.position()
    }

    pub fn driver_running(&self) -> bool {
        self.runtime.borrow().driver.is_running()
    }

    /// Structure of the stacking timeline; empty while unmounted.
    pub fn outline(&self) -> TimelineOutline {
        self.runtime
            .borrow()
            .stack
            .as_ref()
            .map(TweenEngine::outline)
            .unwrap_or_default()
    }

    pub fn duration(&self) -> f64 {
        self.runtime.borrow().stack.as_ref().map_or(0.0, TweenEngine::duration)
    }

    pub fn playhead(&self) -> Option<f64> {
        self.runtime.borrow().stack.as_ref().and_then(TweenEngine::playhead)
    }

    /// Live triggers across the stack and reveal timelines.
    pub fn trigger_count(&self) -> usize {
        let runtime = self.runtime.borrow();
        [runtime.stack.as_ref(), runtime.reveal.as_ref()]
            .into_iter()
            .flatten()
            .map(TweenEngine::trigger_count)
            .sum()
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn config(&self) -> &ShowcaseConfig {
        &self.config
    }
}

impl<E, D> Drop for ScrollStackAnimator<E, D>
where
    E: TweenEngine + Default + 'static,
    D: ScrollDriver + 'static,
{
    fn drop(&mut self) {
        // The frame callback only holds a weak handle and drops out of the
        // loop on its next tick.
        if let Ok(mut runtime) = self.runtime.try_borrow_mut() {
            runtime.teardown();
        }
    }
}
