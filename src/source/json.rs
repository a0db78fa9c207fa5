use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use crate::graph::{GraphModel, GroupTag, RelatedEntry};

use super::GraphSource;

/// Reads `{"nodes": [...], "edges": [...]}` from disk on every fetch, so a
/// refresh picks up edits to the file.
pub struct JsonGraphSource {
    path: PathBuf,
}

impl JsonGraphSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_model(&self) -> Result<GraphModel> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read graph file {}", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse graph file {}", self.path.display()))
    }
}

impl GraphSource for JsonGraphSource {
    fn fetch_visualization(&self, groups: &BTreeSet<GroupTag>) -> Result<GraphModel> {
        let model = self.read_model()?;
        tracing::debug!(
            path = %self.path.display(),
            nodes = model.node_count(),
            edges = model.edge_count(),
            "loaded graph file"
        );
        Ok(model.filtered(groups))
    }

    fn fetch_related(
        &self,
        node_id: &str,
        depth: usize,
        limit: usize,
    ) -> Result<Vec<RelatedEntry>> {
        self.read_model()?
            .related(node_id, depth, limit)
            .ok_or_else(|| anyhow!("node {node_id} is not present in {}", self.path.display()))
    }
}
