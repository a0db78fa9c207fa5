//! Suppliers of graph snapshots and related-entity expansions.
//!
//! The viewer only talks to a [`GraphSource`]; where the data comes from is
//! the source's business.

mod json;
mod sample;

use std::collections::BTreeSet;

use anyhow::Result;

use crate::graph::{GraphModel, GroupTag, RelatedEntry};

pub use json::JsonGraphSource;
pub use sample::SampleGraphSource;

pub trait GraphSource: Send + Sync {
    /// Full snapshot restricted to `groups`; an empty set means every group.
    fn fetch_visualization(&self, groups: &BTreeSet<GroupTag>) -> Result<GraphModel>;

    /// Entities reachable from `node_id` within `depth` hops, at most `limit`.
    fn fetch_related(&self, node_id: &str, depth: usize, limit: usize)
    -> Result<Vec<RelatedEntry>>;
}
