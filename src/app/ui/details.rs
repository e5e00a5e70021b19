use std::collections::BTreeSet;

use eframe::egui::{self, RichText, Ui};

use crate::engine::NodeId;
use crate::fields::{FieldValue, node_rows};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.interaction.selected().cloned() else {
            ui.label("Click a node tile to inspect its state.");
            return;
        };

        let Some(node) = self.snapshot.state_space.node(&selected_id) else {
            ui.label("Selected node no longer exists in the state space.");
            return;
        };

        let rows = node_rows(&selected_id, node);
        let successors = node
            .outgoing
            .iter()
            .filter(|successor_id| **successor_id != selected_id)
            .collect::<BTreeSet<_>>();
        let predecessors = node
            .incoming
            .iter()
            .filter(|predecessor_id| **predecessor_id != selected_id)
            .collect::<BTreeSet<_>>();

        if let Some(predecessor) = self.layout.predecessor(&selected_id) {
            ui.label(format!("Reached from: {predecessor}"));
        }
        if node.has_self_loop(&selected_id) {
            ui.label("Has a self-loop");
        }

        ui.separator();
        egui::Grid::new("node_fields")
            .num_columns(2)
            .striped(true)
            .show(ui, |ui| {
                for row in &rows {
                    let name = RichText::new(row.name.as_str()).monospace();
                    ui.label(if row.emphasized { name.strong() } else { name });
                    let value = RichText::new(row.value.to_string()).monospace();
                    ui.label(match row.value {
                        FieldValue::Text(_) => value,
                        FieldValue::Unrepresentable => {
                            value.italics().color(ui.visuals().warn_fg_color)
                        }
                    });
                    ui.end_row();
                }
            });

        let mut pending_selection = None;
        let sections = [
            ("Successors", &successors, true),
            ("Predecessors", &predecessors, false),
        ];
        for (title, neighbours, outgoing) in sections {
            ui.separator();
            ui.label(RichText::new(format!("{title} ({})", neighbours.len())).strong());
            ui.horizontal_wrapped(|ui| {
                for &neighbour_id in neighbours {
                    let tree_edge = if outgoing {
                        self.layout.is_canonical(&selected_id, neighbour_id)
                    } else {
                        self.layout.is_canonical(neighbour_id, &selected_id)
                    };
                    let link = if tree_edge {
                        RichText::new(neighbour_id.as_str()).underline()
                    } else {
                        RichText::new(neighbour_id.as_str())
                    };
                    if ui
                        .link(link)
                        .on_hover_text(if tree_edge { "tree edge" } else { "reference" })
                        .clicked()
                    {
                        pending_selection = Some(neighbour_id.clone());
                    }
                }
            });
        }

        if let Some(node_id) = pending_selection {
            self.select_from_details(node_id);
        }
    }

    fn select_from_details(&mut self, node_id: NodeId) {
        if self.layout.tile(&node_id).is_some() {
            self.interaction.select(Some(node_id));
        } else {
            self.status = Some(format!("Node {node_id} is not reachable from the root"));
        }
    }
}
