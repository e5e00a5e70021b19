use std::ops::RangeInclusive;

use eframe::egui::{Pos2, Rect, Vec2, pos2, vec2};

use crate::engine::NodeId;
use crate::layout::{Tile, TileMap};

pub(super) const TILE_SIZE: f32 = 30.0;
pub(super) const TILE_PADDING: f32 = 16.0;
pub(super) const TILE_STEP: f32 = TILE_SIZE + TILE_PADDING;
pub(super) const ARROW_LENGTH: f32 = 4.0;
pub(super) const ARROW_WIDTH: f32 = 4.0;

/// Inclusive range of tiles touching some screen rectangle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct TileRange {
    pub(super) columns: RangeInclusive<i64>,
    pub(super) rows: RangeInclusive<i64>,
}

impl TileRange {
    pub(super) fn intersects(
        &self,
        columns: RangeInclusive<i64>,
        rows: RangeInclusive<i64>,
    ) -> bool {
        columns.start() <= self.columns.end()
            && self.columns.start() <= columns.end()
            && rows.start() <= self.rows.end()
            && self.rows.start() <= rows.end()
    }
}

/// Maps between tiles and screen points under the current pan offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Viewport {
    origin: Pos2,
    offset: Vec2,
    pixels_per_point: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            origin: Pos2::ZERO,
            offset: Vec2::ZERO,
            pixels_per_point: 1.0,
        }
    }
}

impl Viewport {
    pub(super) fn set_surface(&mut self, origin: Pos2, pixels_per_point: f32) {
        self.origin = origin;
        self.pixels_per_point = pixels_per_point.max(f32::EPSILON);
    }

    pub(super) fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Offsets are kept in whole units so that panning back and forth is exact.
    pub(super) fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset.round();
    }

    pub(super) fn pan(&mut self, delta: Vec2) {
        self.offset += delta.round();
    }

    pub(super) fn reset(&mut self) {
        self.offset = Vec2::ZERO;
    }

    fn grid_origin(&self) -> Pos2 {
        self.origin + self.offset + vec2(TILE_PADDING, TILE_PADDING)
    }

    pub(super) fn tile_to_pixel_rect(&self, tile: Tile) -> Rect {
        let min = self.grid_origin()
            + vec2(
                tile.column as f32 * TILE_STEP,
                tile.row as f32 * TILE_STEP,
            );
        Rect::from_min_size(min, vec2(TILE_SIZE, TILE_SIZE))
    }

    /// Tile whose square contains `point`; the padding between tiles belongs to none.
    pub(super) fn pixel_to_tile(&self, point: Pos2) -> Option<Tile> {
        let relative = point - self.grid_origin();
        let column = (relative.x / TILE_STEP).floor();
        let row = (relative.y / TILE_STEP).floor();

        let within_x = relative.x - column * TILE_STEP;
        let within_y = relative.y - row * TILE_STEP;
        if within_x >= TILE_SIZE || within_y >= TILE_SIZE {
            return None;
        }

        Some(Tile::new(column as i64, row as i64))
    }

    pub(super) fn resolve(tiles: &TileMap, tile: Tile) -> Option<&NodeId> {
        tiles.get(tile)
    }

    pub(super) fn node_at<'a>(&self, tiles: &'a TileMap, point: Pos2) -> Option<&'a NodeId> {
        self.pixel_to_tile(point)
            .and_then(|tile| Self::resolve(tiles, tile))
    }

    /// Tiles touching `clip`, widened by `margin` tiles on every side.
    pub(super) fn visible_tiles(&self, clip: Rect, margin: i64) -> TileRange {
        let grid = self.grid_origin();
        let first = |edge: f32, start: f32| ((edge - start) / TILE_STEP).floor() as i64 - margin;
        let last = |edge: f32, start: f32| ((edge - start) / TILE_STEP).ceil() as i64 + margin;

        TileRange {
            columns: first(clip.left(), grid.x)..=last(clip.right(), grid.x),
            rows: first(clip.top(), grid.y)..=last(clip.bottom(), grid.y),
        }
    }

    /// Moves a stroke coordinate onto the centre of a physical pixel.
    pub(super) fn align(&self, point: Pos2) -> Pos2 {
        let snap = |value: f32| {
            ((value * self.pixels_per_point).floor() + 0.5) / self.pixels_per_point
        };
        pos2(snap(point.x), snap(point.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_graph::from_edges;
    use crate::layout::Layout;

    #[test]
    fn tile_centres_map_back_to_their_tile() {
        let mut viewport = Viewport::default();
        viewport.set_surface(pos2(40.0, 25.0), 1.0);
        viewport.pan(vec2(-130.0, 57.0));

        for tile in [Tile::ORIGIN, Tile::new(3, 7), Tile::new(-2, -1)] {
            let rect = viewport.tile_to_pixel_rect(tile);
            assert_eq!(viewport.pixel_to_tile(rect.center()), Some(tile));
            assert_eq!(viewport.pixel_to_tile(rect.min), Some(tile));
        }
    }

    #[test]
    fn padding_belongs_to_no_tile() {
        let viewport = Viewport::default();
        let rect = viewport.tile_to_pixel_rect(Tile::ORIGIN);

        assert_eq!(rect.min, pos2(TILE_PADDING, TILE_PADDING));
        assert_eq!(viewport.pixel_to_tile(pos2(rect.max.x + 1.0, rect.center().y)), None);
        assert_eq!(viewport.pixel_to_tile(pos2(1.0, 1.0)), None);
    }

    #[test]
    fn pan_and_reverse_pan_restore_offset() {
        let mut viewport = Viewport::default();
        viewport.pan(vec2(12.0, -4.0));
        let before = viewport.offset();

        viewport.pan(vec2(1234.4, -987.6));
        viewport.pan(vec2(-1234.4, 987.6));
        assert_eq!(viewport.offset(), before);

        viewport.reset();
        assert_eq!(viewport.offset(), Vec2::ZERO);
    }

    #[test]
    fn panning_moves_tiles_with_the_pointer() {
        let mut viewport = Viewport::default();
        let before = viewport.tile_to_pixel_rect(Tile::new(2, 1));
        viewport.pan(vec2(30.0, -10.0));
        let after = viewport.tile_to_pixel_rect(Tile::new(2, 1));

        assert_eq!(after.min - before.min, vec2(30.0, -10.0));
    }

    #[test]
    fn resolves_clicks_to_nodes() {
        let layout = Layout::compute(&from_edges(&["0", "1"], &[("0", "1")]))
            .expect("layout succeeds");
        let viewport = Viewport::default();

        let on_one = viewport.tile_to_pixel_rect(Tile::new(1, 0)).center();
        assert_eq!(
            viewport.node_at(layout.tiles(), on_one),
            Some(&NodeId::from("1"))
        );

        let empty = viewport.tile_to_pixel_rect(Tile::new(4, 4)).center();
        assert_eq!(viewport.node_at(layout.tiles(), empty), None);
        assert_eq!(Viewport::resolve(layout.tiles(), Tile::ORIGIN), Some(&NodeId::root()));
    }

    #[test]
    fn visible_range_follows_offset() {
        let mut viewport = Viewport::default();
        let clip = Rect::from_min_size(Pos2::ZERO, vec2(TILE_STEP * 4.0, TILE_STEP * 2.0));

        let range = viewport.visible_tiles(clip, 0);
        assert!(range.columns.contains(&0) && range.columns.contains(&3));
        assert!(!range.columns.contains(&6));

        viewport.pan(vec2(-TILE_STEP * 10.0, 0.0));
        let range = viewport.visible_tiles(clip, 0);
        assert!(!range.columns.contains(&0));
        assert!(range.columns.contains(&10));
        assert!(range.intersects(9..=11, 0..=0));
        assert!(!range.intersects(0..=2, 0..=0));
    }

    #[test]
    fn aligns_to_pixel_centres() {
        let mut viewport = Viewport::default();
        assert_eq!(viewport.align(pos2(16.0, 16.9)), pos2(16.5, 16.5));

        viewport.set_surface(Pos2::ZERO, 2.0);
        assert_eq!(viewport.align(pos2(16.0, 16.3)), pos2(16.25, 16.25));
    }
}
