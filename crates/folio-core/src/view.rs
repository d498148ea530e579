//! Lays a deck out on a stage: the trigger region, the backdrop behind it and
//! one node per card.

use crate::card::Deck;
use crate::config::LayoutConfig;
use crate::stage::{NodeId, NodeKind, Stage, StageNode};
use crate::tween::{Pose, Shadow};
use glam::Vec2;
use tracing::debug;

/// Base z-index of the first card in document order.
const CARD_BASE_Z: i32 = 10;

/// Node ids of a laid-out showcase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShowcaseView {
    pub region: NodeId,
    pub backdrop: NodeId,
    /// Card nodes, indexed by deck position.
    pub cards: Vec<NodeId>,
}

impl ShowcaseView {
    pub fn build(stage: &mut Stage, deck: &Deck, layout: &LayoutConfig) -> Self {
        let viewport = stage.viewport;
        let region_top = viewport.vh(layout.region_top_vh * 100.0) as f32;
        let region_size = Vec2::new(viewport.width, viewport.height);

        let backdrop = stage.add_node(
            StageNode::new(NodeKind::Backdrop, "backdrop", region_top, region_size).with_pose(Pose {
                z_index: 10,
                ..Pose::default()
            }),
        );
        let region = stage.add_node(
            StageNode::new(NodeKind::Region, "scroll-container-wrapper", region_top, region_size).with_pose(
                Pose {
                    z_index: 20,
                    ..Pose::default()
                },
            ),
        );

        let card_size = Vec2::new(
            (viewport.width * layout.card_width_ratio).min(layout.card_max_width),
            viewport.height * layout.card_height_ratio,
        );
        let card_top = region_top + (viewport.height - card_size.y) / 2.0;

        // Cards are emitted into the document in reverse, so the last card
        // comes first and sits lowest.
        let n = deck.len();
        let mut cards = vec![0; n];
        for (dom_index, position) in (0..n).rev().enumerate() {
            let name = format!("card-{}", position + 1);
            let node = StageNode::new(NodeKind::Card, name, card_top, card_size).with_pose(Pose {
                shadow: Shadow::RESTING,
                z_index: CARD_BASE_Z + dom_index as i32,
                ..Pose::default()
            });
            let id = stage.add_node(node);
            stage.try_add_child(region, id);
            cards[position] = id;
        }

        let content = region_top as f64 + viewport.height as f64 + viewport.vh(layout.trailing_vh * 100.0);
        stage.set_content_height(content as f32);
        debug!(cards = n, region, content_height = content, "showcase laid out");

        Self {
            region,
            backdrop,
            cards,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Card;
    use crate::stage::Viewport;

    fn deck(n: usize) -> Deck {
        Deck::new((0..n).map(|i| Card::new(format!("card {i}"), vec![], vec![], "")).collect())
    }

    #[test]
    fn cards_are_laid_out_in_reverse_document_order() {
        let mut stage = Stage::new(Viewport {
            width: 1000.0,
            height: 800.0,
        });
        let view = ShowcaseView::build(&mut stage, &deck(3), &LayoutConfig::default());

        let z: Vec<i32> = view
            .cards
            .iter()
            .map(|&id| stage.pose(id).unwrap().z_index)
            .collect();
        assert_eq!(z, vec![12, 11, 10]);

        let first = stage.get_node(view.cards[0]).unwrap();
        assert_eq!(first.name, "card-1");
        assert_eq!(first.size, Vec2::new(950.0, 560.0));
        assert_eq!(first.top, 800.0 + 120.0);
        assert_eq!(first.parent, Some(view.region));
        assert_eq!(first.pose.shadow, Shadow::RESTING);

        assert_eq!(stage.get_node(view.region).unwrap().children.len(), 3);
        assert_eq!(stage.content_height(), 2400.0);
    }
}
