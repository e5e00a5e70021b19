use eframe::egui::{Align2, Color32, Pos2, Rect, pos2};

use super::super::viewport::{ARROW_LENGTH, ARROW_WIDTH, TILE_SIZE, Viewport};
use super::canvas::Canvas;

/// Draws onto a [`Canvas`] with every stroke coordinate snapped to pixel centres.
pub(super) struct Pen<'a, C: Canvas> {
    canvas: &'a mut C,
    viewport: &'a Viewport,
}

impl<'a, C: Canvas> Pen<'a, C> {
    pub(super) fn new(canvas: &'a mut C, viewport: &'a Viewport) -> Self {
        Self { canvas, viewport }
    }

    pub(super) fn colors(&mut self, stroke: Color32, fill: Color32) {
        self.canvas.set_stroke_color(stroke);
        self.canvas.set_fill_color(fill);
    }

    pub(super) fn fill_rect(&mut self, rect: Rect) {
        self.canvas.fill_rect(rect);
    }

    pub(super) fn stroke_rect(&mut self, rect: Rect) {
        let min = self.viewport.align(rect.min);
        let max = self.viewport.align(rect.max);
        self.canvas.stroke_rect(Rect::from_min_max(min, max));
    }

    pub(super) fn polyline(&mut self, points: &[Pos2]) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.canvas.begin_path();
        self.canvas.move_to(self.viewport.align(*first));
        for point in rest {
            self.canvas.line_to(self.viewport.align(*point));
        }
        self.canvas.stroke();
    }

    fn polygon(&mut self, points: &[Pos2], fill: bool) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.canvas.begin_path();
        self.canvas.move_to(self.viewport.align(*first));
        for point in rest {
            self.canvas.line_to(self.viewport.align(*point));
        }
        self.canvas.close_path();
        if fill {
            self.canvas.fill();
        }
        self.canvas.stroke();
    }

    pub(super) fn label(&mut self, text: &str, anchor: Pos2) {
        self.canvas.set_text_align(Align2::CENTER_CENTER);
        self.canvas.fill_text(text, anchor);
    }

    /// Arrowhead pointing right with its tip at `tip`.
    pub(super) fn arrow_right(&mut self, tip: Pos2) {
        self.polygon(
            &[
                pos2(tip.x - ARROW_LENGTH, tip.y - ARROW_WIDTH / 2.0),
                pos2(tip.x - ARROW_LENGTH, tip.y + ARROW_WIDTH / 2.0),
                tip,
            ],
            true,
        );
    }

    /// Arrowhead pointing down with its tip at `tip`.
    pub(super) fn arrow_down(&mut self, tip: Pos2) {
        self.polygon(
            &[
                pos2(tip.x - ARROW_WIDTH / 2.0, tip.y - ARROW_LENGTH),
                pos2(tip.x + ARROW_WIDTH / 2.0, tip.y - ARROW_LENGTH),
                tip,
            ],
            true,
        );
    }

    /// Tag pointing right, standing in for a node drawn elsewhere that leads here.
    pub(super) fn predecessor_reference(&mut self, middle: Pos2, label: &str) {
        let s = TILE_SIZE;
        self.polygon(
            &[
                pos2(middle.x - s / 2.0, middle.y - s / 3.0),
                pos2(middle.x + s / 4.0, middle.y - s / 3.0),
                pos2(middle.x + s / 2.0, middle.y),
                pos2(middle.x + s / 4.0, middle.y + s / 3.0),
                pos2(middle.x - s / 2.0, middle.y + s / 3.0),
            ],
            false,
        );
        self.label(label, pos2(middle.x - s / 16.0, middle.y));
    }

    /// Tag pointing left, standing in for a successor drawn elsewhere.
    pub(super) fn successor_reference(&mut self, middle: Pos2, label: &str) {
        let s = TILE_SIZE;
        self.polygon(
            &[
                pos2(middle.x + s / 2.0, middle.y - s / 3.0),
                pos2(middle.x - s / 4.0, middle.y - s / 3.0),
                pos2(middle.x - s / 2.0, middle.y),
                pos2(middle.x - s / 4.0, middle.y + s / 3.0),
                pos2(middle.x + s / 2.0, middle.y + s / 3.0),
            ],
            false,
        );
        self.label(label, pos2(middle.x + s / 16.0, middle.y));
    }
}
