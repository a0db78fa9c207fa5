use eframe::egui::{RichText, Ui};

use crate::graph::GroupTag;

use super::super::render::group_color;
use super::super::{LoadRequest, ViewModel};

impl ViewModel {
    /// Group filter toggles. Any change refetches the graph.
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) -> Option<LoadRequest> {
        ui.heading("Filter");
        ui.add_space(6.0);

        let mut groups = self.groups.clone();
        let mut changed = false;

        for group in GroupTag::ALL {
            let mut enabled = groups.is_empty() || groups.contains(&group);
            let label = RichText::new(group.label()).color(group_color(group));
            if ui.checkbox(&mut enabled, label).changed() {
                if groups.is_empty() {
                    groups.extend(GroupTag::ALL);
                }
                if enabled {
                    groups.insert(group);
                } else {
                    groups.remove(&group);
                }
                if groups.len() == GroupTag::ALL.len() {
                    groups.clear();
                }
                changed = true;
            }
        }

        ui.add_space(4.0);
        if ui.button("Show all groups").clicked() && !groups.is_empty() {
            groups.clear();
            changed = true;
        }

        ui.separator();
        let simulation = &self.config.simulation;
        ui.label(RichText::new("Layout").strong());
        ui.label(format!("iterations: {}", simulation.iterations));
        match simulation.seed {
            Some(seed) => ui.label(format!("seed: {seed}")),
            None => ui.label("seed: random"),
        };
        if let Some((done, total)) = self.layout_progress() {
            ui.label(format!("running: {done}/{total}"));
        }

        changed.then(|| {
            tracing::info!(?groups, "group filter changed");
            self.set_group_filter(groups)
        })
    }
}
