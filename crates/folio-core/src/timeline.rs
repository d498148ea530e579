//! # Timeline Engine
//!
//! A labeled sequence of tween segments, evaluated against a scroll-driven
//! playhead once per frame.
//!
//! ## Responsibilities
//! - **Placement**: Resolve `Position`s (absolute, label, label + offset, end).
//!   A label that does not exist yet is created at the current end.
//! - **Evaluation**: Fold every segment touching a node, in insertion order,
//!   into that node's `Pose` for the playhead time.
//! - **Scroll Pins**: Own the triggers that drive the playhead.
//!
//! ## Key Types
//! - `TweenEngine`: the seam the showcase builds against.
//! - `Timeline`: the built-in engine.
//! - `TimelineOutline`: a serializable snapshot of labels and segments.

use crate::animation::EasingType;
use crate::stage::{NodeId, Stage};
use crate::trigger::{ScrollPin, TriggerId, TriggerSet};
use crate::tween::{Pose, TweenVars};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Where a segment or label lands on the timeline.
#[derive(Clone, Debug, PartialEq)]
pub enum Position {
    /// The current end of the timeline.
    End,
    At(f64),
    Label(String),
    /// A label's time plus `offset` seconds.
    After { label: String, offset: f64 },
}

impl Position {
    pub fn label(name: impl Into<String>) -> Self {
        Position::Label(name.into())
    }

    pub fn after(label: impl Into<String>, offset: f64) -> Self {
        Position::After {
            label: label.into(),
            offset,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Entrance,
    Settle,
    Reveal,
}

/// One declarative animation instruction.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub target: NodeId,
    pub kind: SegmentKind,
    /// Explicit start values. `None` captures them from the node when the
    /// segment starts.
    pub from: Option<TweenVars>,
    pub to: TweenVars,
    pub easing: EasingType,
    /// Seconds of timeline time.
    pub duration: f64,
}

impl Segment {
    pub fn from_to(target: NodeId, kind: SegmentKind, from: TweenVars, to: TweenVars) -> Self {
        Self {
            target,
            kind,
            from: Some(from),
            to,
            easing: EasingType::Linear,
            duration: 0.5,
        }
    }

    pub fn to(target: NodeId, kind: SegmentKind, to: TweenVars) -> Self {
        Self {
            target,
            kind,
            from: None,
            to,
            easing: EasingType::Linear,
            duration: 0.5,
        }
    }

    pub fn easing(mut self, easing: EasingType) -> Self {
        self.easing = easing;
        self
    }

    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration = seconds.max(0.0);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LabelMark {
    pub name: String,
    pub time: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SegmentMark {
    pub target: NodeId,
    pub kind: SegmentKind,
    pub start: f64,
    pub duration: f64,
    pub easing: EasingType,
}

/// Structure of a built timeline, for inspection and comparison.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TimelineOutline {
    pub duration: f64,
    pub labels: Vec<LabelMark>,
    pub segments: Vec<SegmentMark>,
    pub triggers: usize,
}

/// The timeline/tween engine capability the showcase is built against.
pub trait TweenEngine {
    /// Places (or moves) a label and returns its time.
    fn add_label(&mut self, name: &str, position: Position) -> f64;

    /// Places a segment and returns its start time.
    fn add_segment(&mut self, segment: Segment, position: Position) -> f64;

    fn register_scroll_pin(&mut self, pin: ScrollPin) -> TriggerId;

    fn kill_trigger(&mut self, id: TriggerId) -> bool;

    /// Kills every trigger this engine registered and returns how many were live.
    fn kill_triggers(&mut self) -> usize;

    fn trigger_count(&self) -> usize;

    /// Scroll length added to the document by pinned triggers.
    fn pin_spacing(&self, stage: &Stage) -> f64;

    fn duration(&self) -> f64;

    /// Time last rendered, if the engine has rendered at all.
    fn playhead(&self) -> Option<f64>;

    /// Re-evaluates every trigger and segment against one scroll position.
    fn sync(&mut self, scroll: f64, now_ms: f64, stage: &mut Stage);

    /// Drops triggers and segments. Later syncs are no-ops.
    fn teardown(&mut self);

    fn outline(&self) -> TimelineOutline;
}

#[derive(Clone, Debug)]
struct Placed {
    segment: Segment,
    start: f64,
}

impl Placed {
    fn end(&self) -> f64 {
        self.start + self.segment.duration
    }
}

#[derive(Clone, Debug, Default)]
pub struct Timeline {
    labels: Vec<LabelMark>,
    segments: Vec<Placed>,
    triggers: TriggerSet,
    /// Pose of each target when it was first rendered.
    bases: HashMap<NodeId, Pose>,
    playhead: Option<f64>,
    torn_down: bool,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label_time(&self, name: &str) -> Option<f64> {
        self.labels.iter().find(|l| l.name == name).map(|l| l.time)
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    fn resolve(&mut self, position: &Position) -> f64 {
        match position {
            Position::End => self.duration(),
            Position::At(time) => time.max(0.0),
            Position::Label(name) => match self.label_time(name) {
                Some(time) => time,
                None => {
                    let time = self.duration();
                    self.labels.push(LabelMark {
                        name: name.clone(),
                        time,
                    });
                    time
                }
            },
            Position::After { label, offset } => {
                let base = self.resolve(&Position::Label(label.clone()));
                (base + offset).max(0.0)
            }
        }
    }

    /// Pose of `target` at time `t`, folding the first `upto` segments.
    ///
    /// `starts` memoizes the start pose of `to` segments by index; it is only
    /// valid for one target and base within one render.
    fn fold(
        &self,
        target: NodeId,
        t: f64,
        upto: usize,
        base: Pose,
        height: f32,
        starts: &mut HashMap<usize, Pose>,
    ) -> Pose {
        let mut pose = base;
        let mut started = false;

        for (index, placed) in self.segments[..upto].iter().enumerate() {
            let segment = &placed.segment;
            if segment.target != target {
                continue;
            }

            if t < placed.start {
                // Explicit start values show until something on this node starts.
                if let (Some(from), false) = (&segment.from, started) {
                    pose = from.apply_onto(pose, height);
                }
                continue;
            }
            started = true;

            let start = match &segment.from {
                Some(from) => {
                    pose = from.apply_onto(pose, height);
                    pose
                }
                None => match starts.get(&index) {
                    Some(start) => *start,
                    None => {
                        let start = self.fold(target, placed.start, index, base, height, starts);
                        starts.insert(index, start);
                        start
                    }
                },
            };
            let progress = if segment.duration > 0.0 {
                ((t - placed.start) / segment.duration).clamp(0.0, 1.0)
            } else {
                1.0
            };
            pose = segment
                .to
                .blend_onto(pose, &start, height, segment.easing.eval(progress as f32));
        }
        pose
    }

    fn render(&mut self, t: f64, stage: &mut Stage) {
        let mut targets: Vec<NodeId> = Vec::new();
        for placed in &self.segments {
            if !targets.contains(&placed.segment.target) {
                targets.push(placed.segment.target);
            }
        }

        for target in targets {
            let Some(node) = stage.get_node(target) else {
                continue;
            };
            let height = node.size.y;
            let current = node.pose;
            let base = *self.bases.entry(target).or_insert(current);
            let mut starts = HashMap::new();
            let pose = self.fold(target, t, self.segments.len(), base, height, &mut starts);
            stage.set_pose(target, pose);
        }
        self.playhead = Some(t);
    }
}

impl TweenEngine for Timeline {
    fn add_label(&mut self, name: &str, position: Position) -> f64 {
        let time = self.resolve(&position);
        match self.labels.iter_mut().find(|l| l.name == name) {
            Some(label) => label.time = time,
            None => self.labels.push(LabelMark {
                name: name.to_string(),
                time,
            }),
        }
        debug!(label = name, time, "label placed");
        time
    }

    fn add_segment(&mut self, segment: Segment, position: Position) -> f64 {
        let start = self.resolve(&position);
        debug!(
            target = segment.target,
            kind = ?segment.kind,
            start,
            duration = segment.duration,
            "segment placed"
        );
        self.segments.push(Placed { segment, start });
        start
    }

    fn register_scroll_pin(&mut self, pin: ScrollPin) -> TriggerId {
        self.triggers.register(pin)
    }

    fn kill_trigger(&mut self, id: TriggerId) -> bool {
        self.triggers.kill(id)
    }

    fn kill_triggers(&mut self) -> usize {
        self.triggers.kill_all()
    }

    fn trigger_count(&self) -> usize {
        self.triggers.len()
    }

    fn pin_spacing(&self, stage: &Stage) -> f64 {
        self.triggers.iter().map(|t| t.pin_spacing(stage)).sum()
    }

    fn duration(&self) -> f64 {
        self.segments.iter().map(Placed::end).fold(0.0, f64::max)
    }

    fn playhead(&self) -> Option<f64> {
        self.playhead
    }

    fn sync(&mut self, scroll: f64, now_ms: f64, stage: &mut Stage) {
        if self.torn_down {
            return;
        }
        let duration = self.duration();
        let mut head = None;
        for trigger in self.triggers.iter_mut() {
            let time = trigger.update(scroll, now_ms, duration, stage);
            head = head.or(time);
        }

        match (head, self.playhead) {
            (Some(t), _) => self.render(t, stage),
            // Without a trigger the timeline sits at its start.
            (None, None) => self.render(0.0, stage),
            (None, Some(_)) => {}
        }
        trace!(scroll, playhead = ?self.playhead, "timeline synced");
    }

    fn teardown(&mut self) {
        let killed = self.kill_triggers();
        self.segments.clear();
        self.labels.clear();
        self.bases.clear();
        self.torn_down = true;
        debug!(killed, "timeline torn down");
    }

    fn outline(&self) -> TimelineOutline {
        TimelineOutline {
            duration: self.duration(),
            labels: self.labels.clone(),
            segments: self
                .segments
                .iter()
                .map(|p| SegmentMark {
                    target: p.segment.target,
                    kind: p.segment.kind,
                    start: p.start,
                    duration: p.segment.duration,
                    easing: p.segment.easing,
                })
                .collect(),
            triggers: self.triggers.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::{NodeKind, StageNode, Viewport};
    use crate::tween::Length;
    use glam::Vec2;

    fn stage_with_card() -> (Stage, NodeId) {
        let mut stage = Stage::new(Viewport::default());
        let id = stage.add_node(StageNode::new(
            NodeKind::Card,
            "card",
            0.0,
            Vec2::new(800.0, 400.0),
        ));
        (stage, id)
    }

    fn entrance(target: NodeId) -> Segment {
        Segment::from_to(
            target,
            SegmentKind::Entrance,
            TweenVars::new().y(Length::Percent(100.0)).opacity(0.0).z_index(7),
            TweenVars::new().y(Length::Px(0.0)).opacity(1.0),
        )
        .duration(1.0)
    }

    #[test]
    fn missing_labels_are_created_at_the_current_end() {
        let mut tl = Timeline::new();
        assert_eq!(tl.add_segment(entrance(0), Position::label("start")), 0.0);
        assert_eq!(tl.label_time("start"), Some(0.0));

        let stack = tl.add_label("stack", Position::after("not-yet", 1.2));
        assert_eq!(tl.label_time("not-yet"), Some(1.0));
        assert!((stack - 2.2).abs() < 1e-9);

        assert_eq!(tl.add_segment(entrance(1), Position::End), 1.0);
        assert_eq!(tl.add_segment(entrance(2), Position::At(4.0)), 4.0);
        assert_eq!(tl.duration(), 5.0);
    }

    #[test]
    fn existing_labels_are_moved_not_duplicated() {
        let mut tl = Timeline::new();
        tl.add_label("a", Position::At(1.0));
        tl.add_label("a", Position::At(3.0));
        assert_eq!(tl.label_time("a"), Some(3.0));
        assert_eq!(tl.outline().labels.len(), 1);
    }

    #[test]
    fn from_values_render_before_the_segment_starts() {
        let (mut stage, card) = stage_with_card();
        let mut tl = Timeline::new();
        tl.add_segment(entrance(card), Position::At(2.0));

        tl.render(0.0, &mut stage);
        let pose = stage.pose(card).unwrap();
        assert_eq!(pose.translate_y, 400.0);
        assert_eq!(pose.opacity, 0.0);
        assert_eq!(pose.z_index, 7);

        tl.render(3.0, &mut stage);
        let pose = stage.pose(card).unwrap();
        assert_eq!(pose.translate_y, 0.0);
        assert_eq!(pose.opacity, 1.0);

        // Scrubbing back restores the hidden state.
        tl.render(1.0, &mut stage);
        assert_eq!(stage.pose(card).unwrap().opacity, 0.0);
    }

    #[test]
    fn to_segments_capture_start_from_earlier_segments() {
        let (mut stage, card) = stage_with_card();
        let mut tl = Timeline::new();
        tl.add_segment(entrance(card), Position::At(0.0));
        tl.add_segment(
            Segment::to(card, SegmentKind::Settle, TweenVars::new().y(Length::Px(-100.0)).scale(0.5))
                .duration(1.0),
            Position::At(0.5),
        );

        // Halfway through the overlap the settle owns `y`; opacity still
        // follows the entrance.
        tl.render(0.75, &mut stage);
        let pose = stage.pose(card).unwrap();
        let y_at_settle_start = 400.0 * 0.5;
        let expected_y = y_at_settle_start + (-100.0 - y_at_settle_start) * 0.25;
        assert!((pose.translate_y - expected_y).abs() < 1e-3, "y = {}", pose.translate_y);
        assert!((pose.opacity - 0.75).abs() < 1e-4);
        assert!((pose.scale - 0.875).abs() < 1e-4);

        tl.render(2.0, &mut stage);
        let pose = stage.pose(card).unwrap();
        assert_eq!(pose.translate_y, -100.0);
        assert_eq!(pose.scale, 0.5);
        assert_eq!(pose.opacity, 1.0);
    }

    #[test]
    fn long_chains_of_to_segments_render_in_order() {
        let (mut stage, card) = stage_with_card();
        let mut tl = Timeline::new();
        for step in 1..=40 {
            tl.add_segment(
                Segment::to(card, SegmentKind::Settle, TweenVars::new().y(Length::Px(step as f32 * 10.0)))
                    .duration(0.5),
                Position::End,
            );
        }
        assert_eq!(tl.duration(), 20.0);

        tl.render(20.0, &mut stage);
        assert!((stage.pose(card).unwrap().translate_y - 400.0).abs() < 1e-3);

        // Exactly at the end of step 20 the 21st segment has not moved yet.
        tl.render(10.0, &mut stage);
        assert!((stage.pose(card).unwrap().translate_y - 200.0).abs() < 1e-3);
    }

    #[test]
    fn teardown_stops_further_rendering() {
        let (mut stage, card) = stage_with_card();
        let mut tl = Timeline::new();
        tl.add_segment(entrance(card), Position::At(0.0));
        tl.sync(0.0, 0.0, &mut stage);
        let revision = stage.revision();

        tl.teardown();
        tl.sync(100.0, 16.0, &mut stage);
        assert_eq!(stage.revision(), revision);
        assert_eq!(tl.duration(), 0.0);
        assert_eq!(tl.trigger_count(), 0);
    }
}
