use eframe::egui::Pos2;

use crate::graph::{GraphModel, RelatedEntry};

use super::super::physics::Layout;
use super::super::render::node_radius;
use super::super::{RelatedPanel, RelatedRequest, ViewModel};

/// Node under `point`, if any. Nodes later in the model are painted on top,
/// so the scan runs back to front and the visually topmost circle wins.
pub fn pick_node<'a>(model: &'a GraphModel, layout: &Layout, point: Pos2) -> Option<&'a str> {
    model
        .nodes
        .iter()
        .enumerate()
        .rev()
        .find_map(|(index, node)| {
            let center = layout.position_at(index)?;
            (center.distance(point) <= node_radius(node)).then_some(node.id.as_str())
        })
}

impl ViewModel {
    /// Node under a viewport-space point in the current layout.
    pub fn node_at(&self, point: Pos2) -> Option<&str> {
        let (model, layout) = (self.model.as_ref()?, self.layout.as_ref()?);
        pick_node(model, layout, point)
    }

    /// Primary click in viewport coordinates. A hit selects the node and
    /// returns the related-entity fetch to run; a miss clears the selection.
    pub fn click(&mut self, point: Pos2) -> Option<RelatedRequest> {
        match self.node_at(point).map(str::to_owned) {
            Some(id) => Some(self.select(id)),
            None => {
                self.clear_selection();
                None
            }
        }
    }

    pub fn select(&mut self, id: String) -> RelatedRequest {
        self.related_generation = self.related_generation.wrapping_add(1);
        self.related = RelatedPanel::Loading;
        self.selected = Some(id.clone());
        RelatedRequest {
            generation: self.related_generation,
            node_id: id,
            depth: self.config.related_depth,
            limit: self.config.related_limit,
        }
    }

    /// Stores related entities for the current selection. Returns `false`
    /// when the selection changed since the fetch started.
    pub fn finish_related(
        &mut self,
        generation: u64,
        result: Result<Vec<RelatedEntry>, String>,
    ) -> bool {
        if generation != self.related_generation || self.selected.is_none() {
            tracing::debug!(generation, "dropping related fetch for an old selection");
            return false;
        }

        self.related = match result {
            Ok(entries) => RelatedPanel::Entries(entries),
            Err(error) => {
                tracing::warn!(node = ?self.selected, %error, "related fetch failed");
                RelatedPanel::Unavailable(error)
            }
        };
        true
    }

    pub fn clear_selection(&mut self) {
        self.related_generation = self.related_generation.wrapping_add(1);
        self.selected = None;
        self.related = RelatedPanel::Empty;
    }
}
