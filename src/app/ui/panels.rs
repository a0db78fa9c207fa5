use eframe::egui::{self, Align, Context, Layout};

use crate::util::plural;

use super::super::{Fetch, Phase, ViewModel};

impl ViewModel {
    /// Lays out the whole window for one frame. Returns the fetches the host
    /// has to start.
    pub(in crate::app) fn show(&mut self, ctx: &Context) -> Vec<Fetch> {
        let mut fetches = Vec::new();

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("graph-lens");
                    ui.separator();
                    if let Some(model) = self.model() {
                        ui.label(plural(model.node_count(), "node", "nodes"));
                        ui.label(plural(model.edge_count(), "edge", "edges"));
                    }
                    let loading = self.phase == Phase::Loading;
                    if ui
                        .add_enabled(!loading, egui::Button::new("Reload"))
                        .clicked()
                    {
                        fetches.push(Fetch::Graph(self.begin_load()));
                    }
                    if ui
                        .add_enabled(self.model.is_some(), egui::Button::new("Re-run layout"))
                        .clicked()
                    {
                        self.restart_layout();
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if loading {
                            ui.spinner();
                        }
                        let stats = self.draw_stats();
                        ui.label(format!("drawn: {} / {}", stats.nodes, stats.edges));
                    });
                });
            });

        if let Phase::Error(error) = &self.phase {
            let error = error.clone();
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.heading("Failed to load the knowledge graph");
                ui.add_space(6.0);
                ui.label(error.as_str());
                ui.add_space(10.0);
                if ui.button("Retry").clicked() {
                    fetches.extend(self.retry().map(Fetch::Graph));
                }
            });
            return fetches;
        }

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                fetches.extend(self.draw_controls(ui).map(Fetch::Graph));
            });

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                fetches.extend(self.draw_details(ui).map(Fetch::Related));
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                if self.model.is_none() {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading knowledge graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                } else {
                    fetches.extend(self.draw_graph(ui).map(Fetch::Related));
                }
            });

        fetches
    }
}
