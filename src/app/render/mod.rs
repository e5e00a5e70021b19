//! Draws a laid-out state space onto a [`Canvas`].
//!
//! Every placed node gets a square tile. Incoming edges that are not the node's tree
//! edge are drawn as reference tags stacked below-left of the tile. Outgoing edges
//! leave through a vertical staging line on the right: the tree edge of a successor
//! runs into that successor's tile, anything else ends in a reference tag.

use eframe::egui::{Color32, Rect, pos2};

use crate::engine::{Node, NodeId, StateSpace};
use crate::layout::{Layout, Tile};
use crate::ternary::{ThreeValued, decode_panic};

use super::viewport::{ARROW_LENGTH, TILE_PADDING, TILE_SIZE, TILE_STEP, Viewport};

mod canvas;
mod primitives;

pub(in crate::app) use canvas::{Canvas, PainterCanvas};
use primitives::Pen;

const BACKGROUND: Color32 = Color32::from_rgb(19, 23, 29);
const GRID: Color32 = Color32::from_rgba_premultiplied(16, 19, 22, 70);
const LINE: Color32 = Color32::from_gray(200);
const TEXT: Color32 = Color32::from_gray(238);
const TILE_FILL: Color32 = Color32::from_rgb(36, 44, 56);
const PANIC_FILL: Color32 = Color32::from_rgb(128, 42, 46);
const SELECTED_FILL: Color32 = Color32::from_rgb(245, 206, 93);
const SELECTED_TEXT: Color32 = Color32::from_rgb(20, 20, 20);

pub(in crate::app) struct Scene<'a> {
    pub(in crate::app) space: &'a StateSpace,
    pub(in crate::app) layout: &'a Layout,
    pub(in crate::app) viewport: &'a Viewport,
    pub(in crate::app) selected: Option<&'a NodeId>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(in crate::app) struct RenderStats {
    pub(in crate::app) nodes: usize,
    pub(in crate::app) edges: usize,
}

pub(in crate::app) fn render<C: Canvas>(
    canvas: &mut C,
    scene: &Scene<'_>,
    clip: Rect,
) -> RenderStats {
    let mut pen = Pen::new(canvas, scene.viewport);
    draw_background(&mut pen, scene.viewport, clip);

    let visible = scene.viewport.visible_tiles(clip, 1);
    let mut stats = RenderStats::default();

    for node_id in scene.layout.order() {
        let (Some(node), Some(tile)) = (scene.space.node(node_id), scene.layout.tile(node_id))
        else {
            continue;
        };

        // A node draws into its reference column on the left, up to two columns to
        // the right and down across all of its reserved rows.
        let far_corner = tile.offset(2, scene.layout.reserve(node_id));
        if !visible.intersects(
            tile.column.saturating_sub(1)..=far_corner.column,
            tile.row..=far_corner.row,
        ) {
            continue;
        }

        stats.nodes += 1;
        stats.edges += draw_node(&mut pen, scene, node_id, node, tile);
    }

    stats
}

fn draw_background<C: Canvas>(pen: &mut Pen<'_, C>, viewport: &Viewport, clip: Rect) {
    pen.colors(GRID, BACKGROUND);
    pen.fill_rect(clip);

    let range = viewport.visible_tiles(clip, 0);
    for column in range.columns {
        let x = viewport.tile_to_pixel_rect(Tile::new(column, 0)).left() - TILE_PADDING / 2.0;
        pen.polyline(&[pos2(x, clip.top()), pos2(x, clip.bottom())]);
    }
    for row in range.rows {
        let y = viewport.tile_to_pixel_rect(Tile::new(0, row)).top() - TILE_PADDING / 2.0;
        pen.polyline(&[pos2(clip.left(), y), pos2(clip.right(), y)]);
    }
}

fn is_panicking(node: &Node) -> bool {
    node.panic
        .and_then(|flags| decode_panic(flags).ok())
        .is_some_and(|value| value == ThreeValued::True)
}

/// Returns the number of outgoing edges drawn.
fn draw_node<C: Canvas>(
    pen: &mut Pen<'_, C>,
    scene: &Scene<'_>,
    node_id: &NodeId,
    node: &Node,
    tile: Tile,
) -> usize {
    let rect = scene.viewport.tile_to_pixel_rect(tile);
    let selected = scene.selected == Some(node_id);

    let fill = if selected {
        SELECTED_FILL
    } else if is_panicking(node) {
        PANIC_FILL
    } else {
        TILE_FILL
    };
    pen.colors(LINE, fill);
    pen.fill_rect(rect);
    pen.stroke_rect(rect);
    pen.colors(LINE, if selected { SELECTED_TEXT } else { TEXT });
    pen.label(node_id.as_str(), rect.center());

    draw_predecessor_references(pen, scene, node_id, node, rect);
    draw_successors(pen, scene, node_id, node, rect)
}

fn draw_predecessor_references<C: Canvas>(
    pen: &mut Pen<'_, C>,
    scene: &Scene<'_>,
    node_id: &NodeId,
    node: &Node,
    rect: Rect,
) {
    let predecessor = scene.layout.predecessor(node_id);
    let references = node
        .incoming
        .iter()
        .filter(|source_id| *source_id != node_id && Some(*source_id) != predecessor)
        .collect::<Vec<_>>();
    if references.is_empty() {
        return;
    }

    let middle = rect.center();
    let staging_x = rect.left() - TILE_PADDING / 2.0 - ARROW_LENGTH / 2.0;

    pen.colors(LINE, TEXT);
    for (index, source_id) in references.iter().enumerate() {
        let reference_middle = pos2(
            middle.x - TILE_STEP,
            middle.y + (index + 1) as f32 * TILE_STEP,
        );
        pen.predecessor_reference(reference_middle, source_id.as_str());
        pen.polyline(&[
            pos2(reference_middle.x + TILE_SIZE / 2.0, reference_middle.y),
            pos2(staging_x, reference_middle.y),
        ]);
    }

    let entry = pos2(rect.left(), middle.y);
    let bottom = middle.y + references.len() as f32 * TILE_STEP;
    pen.colors(LINE, LINE);
    pen.polyline(&[pos2(staging_x, bottom), pos2(staging_x, middle.y), entry]);
    pen.arrow_right(entry);
}

fn draw_successors<C: Canvas>(
    pen: &mut Pen<'_, C>,
    scene: &Scene<'_>,
    node_id: &NodeId,
    node: &Node,
    rect: Rect,
) -> usize {
    if node.outgoing.is_empty() {
        return 0;
    }

    let middle = rect.center();
    let staging = pos2(rect.right() + TILE_PADDING / 2.0 - ARROW_LENGTH / 2.0, middle.y);
    let mut edges = 0;

    pen.colors(LINE, LINE);
    pen.polyline(&[pos2(rect.right(), middle.y), staging]);

    if node.has_self_loop(node_id) {
        let loop_top = rect.top() - TILE_PADDING / 2.0;
        let loop_end = pos2(middle.x, rect.top());
        pen.polyline(&[
            staging,
            pos2(staging.x, loop_top),
            pos2(middle.x, loop_top),
            loop_end,
        ]);
        pen.arrow_down(loop_end);
        edges += 1;
    }

    let mut bottom = staging.y;
    for slot in scene.layout.successor_slots(node_id, &node.outgoing) {
        let restaging = pos2(staging.x, middle.y + slot.row as f32 * TILE_STEP);
        bottom = bottom.max(restaging.y);

        let target = if slot.canonical {
            scene.layout.tile(slot.successor)
        } else {
            None
        };

        match target {
            Some(target) => {
                let target_rect = scene.viewport.tile_to_pixel_rect(target);
                let entry = pos2(target_rect.left(), target_rect.center().y);
                pen.polyline(&[restaging, pos2(staging.x, entry.y), entry]);
                pen.arrow_right(entry);
            }
            None => {
                // Tags stay in the adjacent column even when a tree successor was shifted.
                let reference_middle = pos2(middle.x + TILE_STEP, restaging.y);
                let entry = pos2(reference_middle.x - TILE_SIZE / 2.0, restaging.y);
                pen.polyline(&[restaging, entry]);
                pen.arrow_right(entry);
                pen.colors(LINE, TEXT);
                pen.successor_reference(reference_middle, slot.successor.as_str());
                pen.colors(LINE, LINE);
            }
        }
        edges += 1;
    }

    if bottom > staging.y {
        pen.polyline(&[staging, pos2(staging.x, bottom)]);
    }

    edges
}
