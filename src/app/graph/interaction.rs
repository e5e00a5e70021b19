use eframe::egui::{self, Key, PointerButton, Rect, Ui, Vec2, vec2};

use super::super::ViewModel;
use super::super::viewport::TILE_STEP;

const PAN_BUTTONS: [PointerButton; 2] = [PointerButton::Middle, PointerButton::Secondary];
const PAN_KEYS: [(Key, Vec2); 4] = [
    (Key::ArrowLeft, vec2(TILE_STEP, 0.0)),
    (Key::ArrowRight, vec2(-TILE_STEP, 0.0)),
    (Key::ArrowUp, vec2(0.0, TILE_STEP)),
    (Key::ArrowDown, vec2(0.0, -TILE_STEP)),
];

impl ViewModel {
    /// Feeds this frame's pointer input on the graph area into the interaction state.
    pub(in crate::app) fn handle_graph_pointer(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if PAN_BUTTONS
            .iter()
            .any(|button| response.drag_started_by(*button))
            && let Some(origin) = ui.input(|input| input.pointer.press_origin())
        {
            self.interaction.pointer_down(origin, &self.viewport);
        }

        if self.interaction.is_panning() {
            let (pointer, held) = ui.input(|input| {
                (
                    input.pointer.latest_pos(),
                    PAN_BUTTONS
                        .iter()
                        .any(|button| input.pointer.button_down(*button)),
                )
            });

            match pointer {
                Some(pointer) if rect.contains(pointer) => {
                    let moved = if held {
                        self.interaction.pointer_move(pointer, &mut self.viewport)
                    } else {
                        self.interaction.pointer_up(pointer, &mut self.viewport)
                    };
                    if moved {
                        ui.ctx().request_repaint();
                    }
                }
                _ => self.interaction.pointer_leave(),
            }
        }

        if response.clicked_by(PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
        {
            self.interaction
                .click(pointer, &self.viewport, self.layout.tiles());
        }
    }

    /// Arrow keys move the view by one tile while the pointer is over the graph.
    pub(in crate::app) fn handle_graph_keys(&mut self, ui: &Ui, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let delta = ui.input(|input| {
            PAN_KEYS
                .iter()
                .filter(|(key, _)| input.key_pressed(*key))
                .fold(Vec2::ZERO, |total, (_, delta)| total + *delta)
        });
        if delta != Vec2::ZERO {
            self.viewport.pan(delta);
        }
    }
}
