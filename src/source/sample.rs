use std::collections::BTreeSet;

use anyhow::{Result, anyhow};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::graph::{Edge, GraphModel, GroupTag, Node, RelatedEntry};

use super::GraphSource;

const CROSS_LINK_RATIO: f64 = 0.15;

/// In-memory knowledge graph generated from a seed: a random tree over the
/// nodes plus a handful of cross links.
pub struct SampleGraphSource {
    model: GraphModel,
}

impl SampleGraphSource {
    pub fn new(node_count: usize, seed: u64) -> Self {
        Self {
            model: generate(node_count, seed),
        }
    }

    pub fn model(&self) -> &GraphModel {
        &self.model
    }
}

fn edge_kind(from: GroupTag, to: GroupTag) -> &'static str {
    match (from, to) {
        (GroupTag::Person, GroupTag::Team) => "member_of",
        (GroupTag::Agent, _) => "assists",
        (_, GroupTag::Task) => "assigned",
        (_, GroupTag::Document) => "references",
        (_, GroupTag::Goal) => "contributes_to",
        (_, GroupTag::Workflow) => "runs",
        _ => "related_to",
    }
}

fn generate(node_count: usize, seed: u64) -> GraphModel {
    let mut rng = StdRng::seed_from_u64(seed);
    let groups = &GroupTag::ALL[..GroupTag::ALL.len() - 1];

    let nodes = (0..node_count)
        .map(|index| {
            let group = groups[rng.random_range(0..groups.len())];
            let mut node = Node::new(
                format!("{}-{index}", group.label()),
                format!("{} {index}", capitalized(group.label())),
                group,
            );
            if group == GroupTag::Team || group == GroupTag::Project {
                node.size = Some(26.0);
            }
            node
        })
        .collect::<Vec<_>>();

    let mut edges = Vec::new();
    let mut push_edge = |from: usize, to: usize| {
        let kind = edge_kind(nodes[from].group, nodes[to].group);
        edges.push(
            Edge::new(format!("e{}", edges.len()), &nodes[from].id, &nodes[to].id).with_kind(kind),
        );
    };

    for index in 1..node_count {
        let parent = rng.random_range(0..index);
        push_edge(index, parent);
    }

    let cross_links = (node_count as f64 * CROSS_LINK_RATIO) as usize;
    if node_count > 2 {
        for _ in 0..cross_links {
            let from = rng.random_range(0..node_count);
            let to = rng.random_range(0..node_count);
            if from != to {
                push_edge(from, to);
            }
        }
    }

    GraphModel::new(nodes, edges)
}

fn capitalized(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl GraphSource for SampleGraphSource {
    fn fetch_visualization(&self, groups: &BTreeSet<GroupTag>) -> Result<GraphModel> {
        Ok(self.model.filtered(groups))
    }

    fn fetch_related(
        &self,
        node_id: &str,
        depth: usize,
        limit: usize,
    ) -> Result<Vec<RelatedEntry>> {
        self.model
            .related(node_id, depth, limit)
            .ok_or_else(|| anyhow!("node {node_id} is not part of the sample graph"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_graph() {
        let first = SampleGraphSource::new(40, 7);
        let second = SampleGraphSource::new(40, 7);
        assert_eq!(first.model(), second.model());
        assert_ne!(first.model(), SampleGraphSource::new(40, 8).model());
    }

    #[test]
    fn every_edge_resolves() {
        let source = SampleGraphSource::new(60, 3);
        let model = source.model();
        assert_eq!(model.node_count(), 60);
        assert!(model.edge_count() >= 59);
        assert!(
            model
                .edges
                .iter()
                .all(|edge| model.contains_node(&edge.from) && model.contains_node(&edge.to))
        );
    }

    #[test]
    fn tiny_graphs_are_fine() {
        assert_eq!(SampleGraphSource::new(0, 1).model().node_count(), 0);
        let single = SampleGraphSource::new(1, 1);
        assert_eq!(single.model().edge_count(), 0);
        let related = single
            .fetch_related(&single.model().nodes[0].id, 2, 5)
            .unwrap();
        assert!(related.is_empty());
    }
}
