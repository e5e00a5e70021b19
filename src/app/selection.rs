use eframe::egui::{Pos2, Vec2};

use crate::engine::NodeId;
use crate::layout::{Layout, TileMap};

use super::viewport::Viewport;

#[derive(Clone, Copy, Debug, PartialEq)]
struct PanDrag {
    start_pointer: Pos2,
    start_offset: Vec2,
}

/// Selected node and in-progress pan, driven by pointer events on the canvas.
#[derive(Clone, Debug, Default)]
pub(super) struct Interaction {
    selected: Option<NodeId>,
    pan_drag: Option<PanDrag>,
}

impl Interaction {
    pub(super) fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    pub(super) fn is_panning(&self) -> bool {
        self.pan_drag.is_some()
    }

    pub(super) fn select(&mut self, node_id: Option<NodeId>) {
        self.selected = node_id;
    }

    pub(super) fn pointer_down(&mut self, pointer: Pos2, viewport: &Viewport) {
        self.pan_drag = Some(PanDrag {
            start_pointer: pointer,
            start_offset: viewport.offset(),
        });
    }

    /// Returns whether the offset changed.
    pub(super) fn pointer_move(&mut self, pointer: Pos2, viewport: &mut Viewport) -> bool {
        let Some(drag) = self.pan_drag else {
            return false;
        };

        let before = viewport.offset();
        viewport.set_offset(drag.start_offset + (pointer - drag.start_pointer));
        viewport.offset() != before
    }

    pub(super) fn pointer_up(&mut self, pointer: Pos2, viewport: &mut Viewport) -> bool {
        let moved = self.pointer_move(pointer, viewport);
        self.pan_drag = None;
        moved
    }

    /// Leaving the canvas keeps the offset reached so far.
    pub(super) fn pointer_leave(&mut self) {
        self.pan_drag = None;
    }

    /// Selects the node under `pointer`, or clears the selection over empty space.
    pub(super) fn click(&mut self, pointer: Pos2, viewport: &Viewport, tiles: &TileMap) {
        self.selected = viewport.node_at(tiles, pointer).cloned();
    }

    /// Drops the selection when its node no longer has a tile, returning the dropped id.
    pub(super) fn retain_placed(&mut self, layout: &Layout) -> Option<NodeId> {
        if self
            .selected
            .as_ref()
            .is_some_and(|node_id| layout.tile(node_id).is_none())
        {
            return self.selected.take();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;
    use crate::engine::test_graph::from_edges;
    use crate::layout::Tile;

    #[test]
    fn drag_pans_by_pointer_delta() {
        let mut viewport = Viewport::default();
        let mut interaction = Interaction::default();

        interaction.pointer_down(pos2(100.0, 100.0), &viewport);
        assert!(interaction.is_panning());
        assert!(interaction.pointer_move(pos2(110.4, 95.0), &mut viewport));
        assert_eq!(viewport.offset(), vec2(10.0, -5.0));

        assert!(interaction.pointer_up(pos2(130.0, 80.0), &mut viewport));
        assert_eq!(viewport.offset(), vec2(30.0, -20.0));
        assert!(!interaction.is_panning());

        assert!(!interaction.pointer_move(pos2(0.0, 0.0), &mut viewport));
        assert_eq!(viewport.offset(), vec2(30.0, -20.0));
    }

    #[test]
    fn drag_and_return_restores_offset() {
        let mut viewport = Viewport::default();
        viewport.pan(vec2(7.0, 3.0));
        let mut interaction = Interaction::default();

        interaction.pointer_down(pos2(50.0, 50.0), &viewport);
        interaction.pointer_move(pos2(470.3, -120.8), &mut viewport);
        interaction.pointer_up(pos2(50.0, 50.0), &mut viewport);
        assert_eq!(viewport.offset(), vec2(7.0, 3.0));
    }

    #[test]
    fn leaving_commits_the_drag() {
        let mut viewport = Viewport::default();
        let mut interaction = Interaction::default();

        interaction.pointer_down(pos2(0.0, 0.0), &viewport);
        interaction.pointer_move(pos2(-25.0, 40.0), &mut viewport);
        interaction.pointer_leave();

        assert!(!interaction.is_panning());
        assert_eq!(viewport.offset(), vec2(-25.0, 40.0));
    }

    #[test]
    fn click_selects_and_clears() {
        let layout = Layout::compute(&from_edges(&["0", "1"], &[("0", "1")]))
            .expect("layout succeeds");
        let viewport = Viewport::default();
        let mut interaction = Interaction::default();

        let on_one = viewport.tile_to_pixel_rect(Tile::new(1, 0)).center();
        interaction.click(on_one, &viewport, layout.tiles());
        assert_eq!(interaction.selected(), Some(&NodeId::from("1")));

        let nowhere = viewport.tile_to_pixel_rect(Tile::new(5, 5)).center();
        interaction.click(nowhere, &viewport, layout.tiles());
        assert_eq!(interaction.selected(), None);
    }

    #[test]
    fn selection_without_tile_is_dropped() {
        let mut interaction = Interaction::default();
        interaction.select(Some(NodeId::from("1")));

        let kept = Layout::compute(&from_edges(&["0", "1"], &[("0", "1")]))
            .expect("layout succeeds");
        assert_eq!(interaction.retain_placed(&kept), None);
        assert_eq!(interaction.selected(), Some(&NodeId::from("1")));

        let unreachable = Layout::compute(&from_edges(&["0", "1"], &[("1", "0")]))
            .expect("layout succeeds");
        assert_eq!(
            interaction.retain_placed(&unreachable),
            Some(NodeId::from("1"))
        );
        assert_eq!(interaction.selected(), None);
    }
}
