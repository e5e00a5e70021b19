use eframe::egui::{self, Align2, Color32, FontId, Sense, Ui, vec2};

use crate::fields::panic_value;

use super::super::ViewModel;
use super::super::render::{PainterCanvas, Scene, render};

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        self.viewport
            .set_surface(rect.min, ui.ctx().pixels_per_point());

        self.handle_graph_pointer(ui, rect, &response);
        self.handle_graph_keys(ui, &response);

        let painter = ui.painter_at(rect);
        let mut canvas = PainterCanvas::new(&painter);
        self.render_stats = render(
            &mut canvas,
            &Scene {
                space: &self.snapshot.state_space,
                layout: &self.layout,
                viewport: &self.viewport,
                selected: self.interaction.selected(),
            },
            rect,
        );

        if self.interaction.is_panning() {
            return;
        }

        let hovered = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|pointer| rect.contains(*pointer))
            .and_then(|pointer| self.viewport.node_at(self.layout.tiles(), pointer));
        let Some(hovered_id) = hovered else {
            return;
        };
        let Some(node) = self.snapshot.state_space.node(hovered_id) else {
            return;
        };

        ui.output_mut(|output| {
            output.cursor_icon = egui::CursorIcon::PointingHand;
        });

        let panel_text = format!(
            "{hovered_id}  |  panic {}  |  out {}  |  in {}",
            panic_value(node),
            node.outgoing.len(),
            node.incoming.len()
        );
        painter.text(
            rect.left_top() + vec2(10.0, 10.0),
            Align2::LEFT_TOP,
            panel_text,
            FontId::proportional(13.0),
            Color32::from_gray(240),
        );
    }
}
