use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};
use tracing::warn;

use crate::engine::{EngineClient, EngineRequest, Snapshot};
use crate::layout::Layout;

mod graph;
mod render;
mod selection;
mod ui;
mod viewport;

use render::RenderStats;
use selection::Interaction;
use viewport::Viewport;

type FetchResult = Result<Snapshot, String>;

pub struct ViewerApp {
    client: Arc<EngineClient>,
    initial_request: EngineRequest,
    state: AppState,
    fetch: Option<PendingFetch>,
}

struct PendingFetch {
    request: EngineRequest,
    rx: Receiver<FetchResult>,
}

enum AppState {
    Loading { rx: Receiver<FetchResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    snapshot: Snapshot,
    layout: Layout,
    viewport: Viewport,
    interaction: Interaction,
    status: Option<String>,
    render_stats: RenderStats,
}

impl ViewerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        client: EngineClient,
        initial_request: EngineRequest,
    ) -> Self {
        let client = Arc::new(client);
        let rx = Self::spawn_fetch(&cc.egui_ctx, Arc::clone(&client), initial_request);

        Self {
            client,
            initial_request,
            state: AppState::Loading { rx },
            fetch: None,
        }
    }

    fn spawn_fetch(
        ctx: &Context,
        client: Arc<EngineClient>,
        request: EngineRequest,
    ) -> Receiver<FetchResult> {
        let (tx, rx) = mpsc::channel();
        let ctx = ctx.clone();

        thread::spawn(move || {
            let result = client
                .fetch(request)
                .map_err(|error| format!("{error:#}"));
            if let Err(error) = &result {
                warn!(request = request.label(), %error, "engine request failed");
            }
            let _ = tx.send(result);
            ctx.request_repaint();
        });

        rx
    }

    fn poll_fetch(pending: &mut Option<PendingFetch>, model: &mut ViewModel) {
        let Some(fetch) = pending.take() else {
            return;
        };

        match fetch.rx.try_recv() {
            Ok(Ok(snapshot)) => model.apply_snapshot(snapshot),
            Ok(Err(error)) => {
                model.status = Some(format!("{} failed: {error}", fetch.request.label()));
            }
            Err(TryRecvError::Empty) => *pending = Some(fetch),
            Err(TryRecvError::Disconnected) => {
                model.status = Some("Engine request worker disconnected".to_owned());
            }
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result.map(ViewModel::new) {
                        Ok(Ok(model)) => AppState::Ready(Box::new(model)),
                        Ok(Err(error)) => {
                            warn!(%error, "rejected initial snapshot");
                            AppState::Error(format!("Layout failed: {error}"))
                        }
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading state space...");
                        ui.add_space(8.0);
                        ui.label(self.client.base_url());
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                let mut retry = false;
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the state space");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
                if retry {
                    transition = Some(AppState::Loading {
                        rx: Self::spawn_fetch(ctx, Arc::clone(&self.client), self.initial_request),
                    });
                }
            }
            AppState::Ready(model) => {
                let mut requested = None;
                let in_flight = self.fetch.as_ref().map(|fetch| fetch.request);
                model.show(ctx, self.client.base_url(), &mut requested, in_flight);

                if let Some(request) = requested
                    && self.fetch.is_none()
                {
                    self.fetch = Some(PendingFetch {
                        request,
                        rx: Self::spawn_fetch(ctx, Arc::clone(&self.client), request),
                    });
                }

                Self::poll_fetch(&mut self.fetch, model);
            }
        }

        if let Some(next_state) = transition {
            self.fetch = None;
            self.state = next_state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::NodeId;
    use crate::engine::test_graph::from_edges;

    fn model() -> ViewModel {
        ViewModel::new(Snapshot {
            exec_name: "counter".to_owned(),
            state_space: from_edges(&["0", "1"], &[("0", "1")]),
        })
        .expect("layout succeeds")
    }

    fn pending(request: EngineRequest) -> (mpsc::Sender<FetchResult>, Option<PendingFetch>) {
        let (tx, rx) = mpsc::channel();
        (tx, Some(PendingFetch { request, rx }))
    }

    #[test]
    fn failed_fetch_keeps_current_snapshot() {
        let mut model = model();
        let (tx, mut fetch) = pending(EngineRequest::StepVerification);
        tx.send(Err("connection refused".to_owned()))
            .expect("receiver is alive");

        ViewerApp::poll_fetch(&mut fetch, &mut model);

        assert!(fetch.is_none());
        assert_eq!(model.snapshot.state_space.node_count(), 2);
        assert!(model.layout.tile(&NodeId::from("1")).is_some());
        assert_eq!(
            model.status.as_deref(),
            Some("step verification failed: connection refused")
        );
    }

    #[test]
    fn unanswered_fetch_stays_pending() {
        let mut model = model();
        let (_tx, mut fetch) = pending(EngineRequest::Content);

        ViewerApp::poll_fetch(&mut fetch, &mut model);

        assert_eq!(
            fetch.as_ref().map(|fetch| fetch.request),
            Some(EngineRequest::Content)
        );
        assert_eq!(model.status, None);
    }

    #[test]
    fn disconnected_worker_is_reported() {
        let mut model = model();
        let (tx, mut fetch) = pending(EngineRequest::Content);
        drop(tx);

        ViewerApp::poll_fetch(&mut fetch, &mut model);

        assert!(fetch.is_none());
        assert_eq!(model.snapshot.state_space.node_count(), 2);
        assert!(model.status.is_some());
    }

    #[test]
    fn successful_fetch_replaces_snapshot() {
        let mut model = model();
        let (tx, mut fetch) = pending(EngineRequest::Content);
        tx.send(Ok(Snapshot {
            exec_name: "counter".to_owned(),
            state_space: from_edges(&["0", "1", "2"], &[("0", "1"), ("1", "2")]),
        }))
        .expect("receiver is alive");

        ViewerApp::poll_fetch(&mut fetch, &mut model);

        assert!(fetch.is_none());
        assert_eq!(model.snapshot.state_space.node_count(), 3);
        assert!(model.layout.tile(&NodeId::from("2")).is_some());
    }
}
