use eframe::egui::{self, Align, Context, Layout as UiLayout};
use tracing::{debug, info, warn};

use crate::engine::{EngineRequest, Snapshot};
use crate::layout::{Layout, LayoutError};

use super::super::ViewModel;
use super::super::render::RenderStats;
use super::super::selection::Interaction;
use super::super::viewport::Viewport;

impl ViewModel {
    pub(in crate::app) fn new(snapshot: Snapshot) -> Result<Self, LayoutError> {
        let layout = Layout::compute(&snapshot.state_space)?;
        info!(
            exec = %snapshot.exec_name,
            nodes = snapshot.state_space.node_count(),
            "showing state space"
        );

        Ok(Self {
            snapshot,
            layout,
            viewport: Viewport::default(),
            interaction: Interaction::default(),
            status: None,
            render_stats: RenderStats::default(),
        })
    }

    /// Swaps in a new snapshot, keeping the current one if it cannot be laid out.
    pub(in crate::app) fn apply_snapshot(&mut self, snapshot: Snapshot) {
        let layout = match Layout::compute(&snapshot.state_space) {
            Ok(layout) => layout,
            Err(error) => {
                warn!(%error, "rejected snapshot, keeping the previous one");
                self.status = Some(format!("Rejected snapshot: {error}"));
                return;
            }
        };

        self.snapshot = snapshot;
        self.layout = layout;
        self.status = None;

        if let Some(dropped) = self.interaction.retain_placed(&self.layout) {
            debug!(node = %dropped, "cleared selection of node without a tile");
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        engine_url: &str,
        requested: &mut Option<EngineRequest>,
        in_flight: Option<EngineRequest>,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("statespace-viewer");
                    ui.separator();
                    ui.label(format!("exec: {}", self.snapshot.exec_name));
                    ui.label(format!("engine: {engine_url}"));
                    ui.label(format!("nodes: {}", self.snapshot.state_space.node_count()));
                    ui.label(format!("edges: {}", self.snapshot.state_space.edge_count()));

                    let idle = in_flight.is_none();
                    if ui.add_enabled(idle, egui::Button::new("Refresh")).clicked() {
                        *requested = Some(EngineRequest::Content);
                    }
                    if ui
                        .add_enabled(idle, egui::Button::new("Step verification"))
                        .clicked()
                    {
                        *requested = Some(EngineRequest::StepVerification);
                    }
                    if ui.button("Reset view").clicked() {
                        self.viewport.reset();
                    }
                    if let Some(request) = in_flight {
                        ui.spinner();
                        ui.label(format!("{}...", request.label()));
                    }

                    ui.with_layout(UiLayout::right_to_left(Align::Center), |ui| {
                        ui.label(format!(
                            "visible: {} nodes / {} edges",
                            self.render_stats.nodes, self.render_stats.edges
                        ));
                    });
                });

                if let Some(status) = &self.status {
                    ui.colored_label(ui.visuals().warn_fg_color, status);
                }
            });

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_graph::from_edges;
    use crate::engine::{NodeId, StateSpace};

    fn snapshot(space: StateSpace) -> Snapshot {
        Snapshot {
            exec_name: "counter".to_owned(),
            state_space: space,
        }
    }

    #[test]
    fn rejects_snapshot_without_root() {
        assert!(ViewModel::new(snapshot(from_edges(&["1"], &[]))).is_err());
    }

    #[test]
    fn failed_layout_keeps_previous_snapshot() {
        let mut model = ViewModel::new(snapshot(from_edges(&["0", "1"], &[("0", "1")])))
            .expect("layout succeeds");

        let mut broken = from_edges(&["0"], &[]);
        if let Some(root) = broken.nodes.get_mut(&NodeId::root()) {
            root.outgoing.push(NodeId::from("9"));
        }
        model.apply_snapshot(snapshot(broken));

        assert_eq!(model.snapshot.state_space.node_count(), 2);
        assert!(model.layout.tile(&NodeId::from("1")).is_some());
        assert!(model.status.as_deref().is_some_and(|status| status.contains('9')));

        model.apply_snapshot(snapshot(from_edges(&["0"], &[])));
        assert_eq!(model.status, None);
        assert_eq!(model.snapshot.state_space.node_count(), 1);
    }

    #[test]
    fn selection_is_cleared_when_node_loses_its_tile() {
        let mut model = ViewModel::new(snapshot(from_edges(&["0", "1"], &[("0", "1")])))
            .expect("layout succeeds");
        model.interaction.select(Some(NodeId::from("1")));

        model.apply_snapshot(snapshot(from_edges(&["0", "1"], &[("0", "1"), ("1", "0")])));
        assert_eq!(model.interaction.selected(), Some(&NodeId::from("1")));

        model.apply_snapshot(snapshot(from_edges(&["0", "1"], &[("1", "0")])));
        assert_eq!(model.interaction.selected(), None);
    }
}
