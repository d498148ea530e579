//! # Stage
//!
//! Arena-based storage for the headless view the engine paints into.
//!
//! ## Responsibilities
//! - **Node Storage**: `Vec<StageNode>` arena addressed by `NodeId`.
//! - **Hierarchy**: Parent-child relationships with cycle prevention.
//! - **Paint State**: Each node's `Pose` and pin offset, written once per frame.
//! - **Mutation Tracking**: A revision counter bumped only by real changes, so
//!   callers can tell whether a frame repainted anything.

use crate::tween::Pose;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Index of a node in the `Stage` arena.
pub type NodeId = usize;

/// Size of the visible scroll port, in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1440.0,
            height: 900.0,
        }
    }
}

impl Viewport {
    /// Converts viewport-height units (`100vh` = one viewport) to pixels.
    pub fn vh(&self, units: f64) -> f64 {
        units * self.height as f64 / 100.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Scroll trigger and pin target.
    Region,
    /// Background layer revealed by a clip circle.
    Backdrop,
    /// One project card.
    Card,
}

/// A node in the stage with its layout box and current paint state.
#[derive(Clone, Debug)]
pub struct StageNode {
    pub kind: NodeKind,
    pub name: String,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    /// Offset of the node's top edge from the top of the document.
    pub top: f32,
    pub size: Vec2,
    pub pose: Pose,
    /// Translation applied while the node is pinned.
    pub pin_offset: f32,
}

impl StageNode {
    pub fn new(kind: NodeKind, name: impl Into<String>, top: f32, size: Vec2) -> Self {
        Self {
            kind,
            name: name.into(),
            children: Vec::new(),
            parent: None,
            top,
            size,
            pose: Pose::default(),
            pin_offset: 0.0,
        }
    }

    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }
}

#[derive(Clone, Debug)]
pub struct Stage {
    pub viewport: Viewport,
    nodes: Vec<StageNode>,
    content_height: f32,
    revision: u64,
}

impl Stage {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            nodes: Vec::new(),
            content_height: viewport.height,
            revision: 0,
        }
    }

    pub fn add_node(&mut self, node: StageNode) -> NodeId {
        self.nodes.push(node);
        self.revision += 1;
        self.nodes.len() - 1
    }

    /// Attempts to establish a parent-child relationship between two nodes.
    ///
    /// Returns `false` for missing nodes, self-parenting, or a cycle.
    pub fn try_add_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if parent == child || self.get_node(parent).is_none() || self.get_node(child).is_none() {
            return false;
        }

        let mut current = Some(parent);
        while let Some(id) = current {
            if id == child {
                return false;
            }
            current = self.nodes[id].parent;
        }

        if let Some(old) = self.nodes[child].parent.take() {
            self.nodes[old].children.retain(|&c| c != child);
        }
        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
        self.revision += 1;
        true
    }

    pub fn get_node(&self, id: NodeId) -> Option<&StageNode> {
        self.nodes.get(id)
    }

    pub fn pose(&self, id: NodeId) -> Option<Pose> {
        self.get_node(id).map(|n| n.pose)
    }

    /// Writes a node's pose. Returns `true` when the stored pose changed.
    pub fn set_pose(&mut self, id: NodeId, pose: Pose) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) if node.pose != pose => {
                node.pose = pose;
                self.revision += 1;
                true
            }
            _ => false,
        }
    }

    /// Writes a node's pin offset. Returns `true` when it changed.
    pub fn set_pin_offset(&mut self, id: NodeId, offset: f32) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) if node.pin_offset != offset => {
                node.pin_offset = offset;
                self.revision += 1;
                true
            }
            _ => false,
        }
    }

    /// Total document height before any pin spacing is added.
    pub fn content_height(&self) -> f32 {
        self.content_height
    }

    pub fn set_content_height(&mut self, height: f32) {
        self.content_height = height.max(self.viewport.height);
    }

    /// Monotonic count of mutations applied to the stage.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
