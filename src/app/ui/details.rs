use eframe::egui::{self, RichText, Ui};

use super::super::render::group_color;
use super::super::{RelatedPanel, RelatedRequest, ViewModel};

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) -> Option<RelatedRequest> {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.selected.clone() else {
            ui.label("Click a node in the graph to inspect it.");
            return None;
        };

        let Some(node) = self.model().and_then(|model| model.node(&selected_id)).cloned() else {
            ui.label("Selected node no longer exists in the graph.");
            return None;
        };

        ui.label(RichText::new(&node.label).strong());
        ui.small(node.id.as_str());
        ui.label(RichText::new(node.group.label()).color(group_color(node.group)));
        ui.add_space(6.0);

        let mut request = None;
        ui.horizontal(|ui| {
            if ui.button("Clear selection").clicked() {
                self.clear_selection();
            }
            if ui.button("Refresh related").clicked() {
                request = Some(self.select(selected_id.clone()));
            }
        });

        ui.separator();
        ui.label(RichText::new("Related entities").strong());

        let mut pick = None;
        let mut expand = false;
        match &self.related {
            RelatedPanel::Empty => {
                ui.label("Nothing loaded yet.");
            }
            RelatedPanel::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Looking up related entities...");
                });
            }
            RelatedPanel::Unavailable(error) => {
                ui.label(format!("Related entities unavailable: {error}"));
            }
            RelatedPanel::Entries(entries) if entries.is_empty() => {
                ui.label("No related entities found.");
            }
            RelatedPanel::Entries(entries) => {
                let model = self.model.as_ref();
                egui::ScrollArea::vertical()
                    .id_salt("related_entities_scroll")
                    .max_height(360.0)
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        for entry in entries {
                            let kind = entry.edge_kind.as_deref().unwrap_or("related");
                            let in_view = model.is_some_and(|model| model.contains_node(&entry.node.id));
                            let text = format!(
                                "{}  ·  {kind}  ·  depth {}",
                                entry.node.label, entry.depth
                            );
                            let row = ui.add_enabled(in_view, egui::Button::new(text).frame(false));
                            if row.clicked() {
                                pick = Some(entry.node.id.clone());
                            }
                        }
                    });
                ui.add_space(6.0);
                expand = ui.button("Add related to graph").clicked();
            }
        }

        if let Some(id) = pick {
            request = Some(self.select(id));
        } else if expand {
            self.expand_selection();
        }
        request
    }
}
