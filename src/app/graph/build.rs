use std::collections::BTreeSet;

use crate::graph::{GraphModel, GroupTag};

use super::super::physics::{Layout, LayoutPass, Viewport};
use super::super::render::DrawStats;
use super::super::{LoadRequest, Phase, RelatedPanel, ViewConfig, ViewModel};

/// Viewport changes smaller than this are treated as jitter, not a resize.
const RESIZE_EPSILON: f32 = 0.5;

impl ViewModel {
    pub fn new(config: ViewConfig) -> Self {
        let groups = config.groups.clone();
        Self {
            config,
            phase: Phase::Idle,
            generation: 0,
            groups,
            model: None,
            layout: None,
            pending: None,
            viewport: None,
            selected: None,
            related: RelatedPanel::Empty,
            related_generation: 0,
            draw_stats: DrawStats::default(),
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn groups(&self) -> &BTreeSet<GroupTag> {
        &self.groups
    }

    pub fn model(&self) -> Option<&GraphModel> {
        self.model.as_ref()
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn related(&self) -> &RelatedPanel {
        &self.related
    }

    /// Completed layout of the current snapshot, if one exists.
    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    pub fn layout_in_progress(&self) -> bool {
        self.pending.is_some()
    }

    pub fn layout_progress(&self) -> Option<(usize, usize)> {
        self.pending
            .as_ref()
            .map(|pass| (pass.completed(), pass.total()))
    }

    /// Marks the view as loading and hands out the fetch to perform.
    pub fn begin_load(&mut self) -> LoadRequest {
        self.generation = self.generation.wrapping_add(1);
        self.phase = Phase::Loading;
        LoadRequest {
            generation: self.generation,
            groups: self.groups.clone(),
        }
    }

    pub fn retry(&mut self) -> Option<LoadRequest> {
        matches!(self.phase, Phase::Error(_)).then(|| self.begin_load())
    }

    pub fn set_group_filter(&mut self, groups: BTreeSet<GroupTag>) -> LoadRequest {
        self.groups = groups;
        self.begin_load()
    }

    /// Applies the outcome of a fetch. Returns `false` when the result belongs
    /// to a superseded request and was ignored.
    pub fn finish_load(&mut self, generation: u64, result: Result<GraphModel, String>) -> bool {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "dropping stale graph fetch"
            );
            return false;
        }

        match result {
            Ok(model) => {
                tracing::info!(
                    nodes = model.node_count(),
                    edges = model.edge_count(),
                    "graph loaded"
                );
                self.install_model(model);
                self.phase = Phase::Ready;
            }
            Err(error) => {
                tracing::error!(%error, "graph fetch failed");
                self.pending = None;
                self.phase = Phase::Error(error);
            }
        }
        true
    }

    /// Replaces the snapshot, keeps the selection only while it still exists
    /// and starts a fresh layout pass.
    pub(in crate::app) fn install_model(&mut self, model: GraphModel) {
        let duplicates = model.duplicate_ids();
        if !duplicates.is_empty() {
            tracing::warn!(?duplicates, "duplicate node ids, the first occurrence of each wins");
        }

        if let Some(selected) = &self.selected
            && !model.contains_node(selected)
        {
            tracing::debug!(%selected, "selection left the graph");
            self.clear_selection();
        }

        self.model = Some(model);
        self.restart_layout();
    }

    /// Returns `true` when the viewport changed. The first call also starts
    /// the layout of a snapshot that arrived before the view was measured.
    pub fn resize(&mut self, viewport: Viewport) -> bool {
        if let Some(current) = self.viewport
            && (viewport.width - current.width).abs() < RESIZE_EPSILON
            && (viewport.height - current.height).abs() < RESIZE_EPSILON
        {
            return false;
        }

        self.viewport = Some(viewport);
        if self.model.is_some() {
            self.restart_layout();
        }
        true
    }

    /// Throws away the current layout and any pass in flight, then starts
    /// over from a random placement. Waits for a viewport if none is known.
    pub fn restart_layout(&mut self) {
        self.layout = None;
        let (Some(model), Some(viewport)) = (&self.model, self.viewport) else {
            self.pending = None;
            return;
        };

        let simulation = self.config.simulation.clone();
        let mut rng = simulation.rng();
        self.pending = Some(LayoutPass::new(model, viewport, simulation, &mut rng));
        self.advance_layout();
    }

    /// Advances the pass in flight by one frame's budget. Returns `true`
    /// while more work remains.
    pub fn advance_layout(&mut self) -> bool {
        let Some(pass) = self.pending.as_mut() else {
            return false;
        };

        let node_count = self.model.as_ref().map_or(0, GraphModel::node_count);
        let budget = self.config.simulation.iterations_per_frame(node_count);
        if !pass.step(budget) {
            return true;
        }

        self.layout = self.pending.take().map(LayoutPass::finish);
        false
    }

    /// Folds the related entities of the selection into a new snapshot and
    /// lays it out again.
    pub fn expand_selection(&mut self) -> bool {
        let (Some(model), RelatedPanel::Entries(entries)) = (&self.model, &self.related) else {
            return false;
        };
        if entries.is_empty() {
            return false;
        }

        let merged = model.merged_with(entries);
        tracing::info!(
            added_nodes = merged.node_count() - model.node_count(),
            added_edges = merged.edge_count() - model.edge_count(),
            "expanded selection into graph"
        );
        self.install_model(merged);
        true
    }

    pub(in crate::app) fn record_draw(&mut self, stats: DrawStats) {
        self.draw_stats = stats;
    }

    pub fn draw_stats(&self) -> DrawStats {
        self.draw_stats
    }
}
