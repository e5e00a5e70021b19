use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke};

/// Minimal path-based drawing surface the graph renderer draws onto.
pub(in crate::app) trait Canvas {
    fn set_stroke_color(&mut self, color: Color32);
    fn set_fill_color(&mut self, color: Color32);
    fn set_text_align(&mut self, align: Align2);

    fn begin_path(&mut self);
    fn move_to(&mut self, point: Pos2);
    fn line_to(&mut self, point: Pos2);
    fn close_path(&mut self);
    fn stroke(&mut self);
    fn fill(&mut self);

    fn fill_rect(&mut self, rect: Rect);
    fn stroke_rect(&mut self, rect: Rect);
    fn fill_text(&mut self, text: &str, anchor: Pos2);
}

#[derive(Debug, Default)]
struct SubPath {
    points: Vec<Pos2>,
    closed: bool,
}

/// [`Canvas`] backed by an egui painter clipped to the graph area.
pub(in crate::app) struct PainterCanvas<'p> {
    painter: &'p Painter,
    stroke: Stroke,
    fill: Color32,
    text_align: Align2,
    font: FontId,
    path: Vec<SubPath>,
}

impl<'p> PainterCanvas<'p> {
    pub(in crate::app) fn new(painter: &'p Painter) -> Self {
        Self {
            painter,
            stroke: Stroke::new(1.0, Color32::WHITE),
            fill: Color32::WHITE,
            text_align: Align2::CENTER_CENTER,
            font: FontId::monospace(11.0),
            path: Vec::new(),
        }
    }
}

impl Canvas for PainterCanvas<'_> {
    fn set_stroke_color(&mut self, color: Color32) {
        self.stroke.color = color;
    }

    fn set_fill_color(&mut self, color: Color32) {
        self.fill = color;
    }

    fn set_text_align(&mut self, align: Align2) {
        self.text_align = align;
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, point: Pos2) {
        self.path.push(SubPath {
            points: vec![point],
            closed: false,
        });
    }

    fn line_to(&mut self, point: Pos2) {
        match self.path.last_mut() {
            Some(sub_path) if !sub_path.closed => sub_path.points.push(point),
            _ => self.move_to(point),
        }
    }

    fn close_path(&mut self) {
        if let Some(sub_path) = self.path.last_mut() {
            sub_path.closed = true;
        }
    }

    fn stroke(&mut self) {
        for sub_path in &self.path {
            if sub_path.points.len() < 2 {
                continue;
            }
            let points = sub_path.points.clone();
            let shape = if sub_path.closed {
                Shape::closed_line(points, self.stroke)
            } else {
                Shape::line(points, self.stroke)
            };
            self.painter.add(shape);
        }
    }

    fn fill(&mut self) {
        for sub_path in &self.path {
            if sub_path.points.len() < 3 {
                continue;
            }
            self.painter.add(Shape::convex_polygon(
                sub_path.points.clone(),
                self.fill,
                Stroke::NONE,
            ));
        }
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.painter.rect_filled(rect, 0.0, self.fill);
    }

    fn stroke_rect(&mut self, rect: Rect) {
        self.painter.add(Shape::closed_line(
            vec![
                rect.left_top(),
                rect.right_top(),
                rect.right_bottom(),
                rect.left_bottom(),
            ],
            self.stroke,
        ));
    }

    fn fill_text(&mut self, text: &str, anchor: Pos2) {
        self.painter.text(
            anchor,
            self.text_align,
            text,
            self.font.clone(),
            self.fill,
        );
    }
}

#[cfg(test)]
pub(in crate::app) mod recording {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    pub(in crate::app) enum Op {
        Stroke {
            color: Color32,
            paths: Vec<Vec<Pos2>>,
        },
        Fill {
            color: Color32,
            paths: Vec<Vec<Pos2>>,
        },
        FillRect {
            color: Color32,
            rect: Rect,
        },
        StrokeRect {
            rect: Rect,
        },
        Text {
            text: String,
            anchor: Pos2,
        },
    }

    /// Records every draw call so tests can inspect the rendered scene.
    #[derive(Debug)]
    pub(in crate::app) struct RecordingCanvas {
        pub(in crate::app) ops: Vec<Op>,
        stroke: Color32,
        fill: Color32,
        path: Vec<Vec<Pos2>>,
    }

    impl Default for RecordingCanvas {
        fn default() -> Self {
            Self {
                ops: Vec::new(),
                stroke: Color32::WHITE,
                fill: Color32::WHITE,
                path: Vec::new(),
            }
        }
    }

    impl RecordingCanvas {
        pub(in crate::app) fn texts(&self) -> Vec<&str> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Text { text, .. } => Some(text.as_str()),
                    _ => None,
                })
                .collect()
        }

        /// Filled triangles, i.e. arrowheads.
        pub(in crate::app) fn triangles(&self) -> Vec<&[Pos2]> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Fill { paths, .. } => Some(paths),
                    _ => None,
                })
                .flatten()
                .filter(|points| points.len() == 3)
                .map(Vec::as_slice)
                .collect()
        }
    }

    impl Canvas for RecordingCanvas {
        fn set_stroke_color(&mut self, color: Color32) {
            self.stroke = color;
        }

        fn set_fill_color(&mut self, color: Color32) {
            self.fill = color;
        }

        fn set_text_align(&mut self, _align: Align2) {}

        fn begin_path(&mut self) {
            self.path.clear();
        }

        fn move_to(&mut self, point: Pos2) {
            self.path.push(vec![point]);
        }

        fn line_to(&mut self, point: Pos2) {
            match self.path.last_mut() {
                Some(points) => points.push(point),
                None => self.path.push(vec![point]),
            }
        }

        fn close_path(&mut self) {}

        fn stroke(&mut self) {
            self.ops.push(Op::Stroke {
                color: self.stroke,
                paths: self.path.clone(),
            });
        }

        fn fill(&mut self) {
            self.ops.push(Op::Fill {
                color: self.fill,
                paths: self.path.clone(),
            });
        }

        fn fill_rect(&mut self, rect: Rect) {
            self.ops.push(Op::FillRect {
                color: self.fill,
                rect,
            });
        }

        fn stroke_rect(&mut self, rect: Rect) {
            self.ops.push(Op::StrokeRect { rect });
        }

        fn fill_text(&mut self, text: &str, anchor: Pos2) {
            self.ops.push(Op::Text {
                text: text.to_owned(),
                anchor,
            });
        }
    }
}
