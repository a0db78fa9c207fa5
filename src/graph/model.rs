use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Entity type of a node. Drives the fill colour and group filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupTag {
    Person,
    Agent,
    Team,
    Project,
    Task,
    Document,
    Goal,
    Workflow,
    #[serde(other)]
    Unknown,
}

impl GroupTag {
    pub const ALL: [GroupTag; 9] = [
        Self::Person,
        Self::Agent,
        Self::Team,
        Self::Project,
        Self::Task,
        Self::Document,
        Self::Goal,
        Self::Workflow,
        Self::Unknown,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Agent => "agent",
            Self::Team => "team",
            Self::Project => "project",
            Self::Task => "task",
            Self::Document => "document",
            Self::Goal => "goal",
            Self::Workflow => "workflow",
            Self::Unknown => "unknown",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|group| group.label().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for GroupTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub group: GroupTag,
    /// Radius override in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>, group: GroupTag) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            group,
            size: None,
        }
    }
}

/// Directed relation between two node ids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(default, alias = "label", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Edge {
    pub fn new(id: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            kind: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}

/// One entry of a related-entity expansion around a node.
#[derive(Clone, Debug, PartialEq)]
pub struct RelatedEntry {
    pub node: Node,
    pub edge_kind: Option<String>,
    pub depth: usize,
    /// Node through which this entry was reached.
    pub parent: String,
}

/// Immutable snapshot of everything the view shows. Replaced wholesale on refresh.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphModel {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl GraphModel {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Keeps nodes whose group is in `groups` and edges between surviving
    /// nodes. An empty set keeps everything.
    pub fn filtered(&self, groups: &BTreeSet<GroupTag>) -> Self {
        if groups.is_empty() {
            return self.clone();
        }

        let nodes = self
            .nodes
            .iter()
            .filter(|node| groups.contains(&node.group))
            .cloned()
            .collect::<Vec<_>>();
        let kept = nodes
            .iter()
            .map(|node| node.id.as_str())
            .collect::<HashSet<_>>();
        let edges = self
            .edges
            .iter()
            .filter(|edge| kept.contains(edge.from.as_str()) && kept.contains(edge.to.as_str()))
            .cloned()
            .collect();

        Self { nodes, edges }
    }

    /// Breadth-first expansion around `origin`, following edges in both
    /// directions. The origin itself is not reported.
    pub fn related(&self, origin: &str, depth: usize, limit: usize) -> Option<Vec<RelatedEntry>> {
        let nodes_by_id = self.nodes_by_id();
        if !nodes_by_id.contains_key(origin) {
            return None;
        }

        let mut adjacency: HashMap<&str, Vec<(&str, Option<&str>)>> = HashMap::new();
        for edge in &self.edges {
            if !nodes_by_id.contains_key(edge.from.as_str())
                || !nodes_by_id.contains_key(edge.to.as_str())
            {
                continue;
            }
            let kind = edge.kind.as_deref();
            adjacency
                .entry(edge.from.as_str())
                .or_default()
                .push((edge.to.as_str(), kind));
            adjacency
                .entry(edge.to.as_str())
                .or_default()
                .push((edge.from.as_str(), kind));
        }

        let mut entries = Vec::new();
        let mut visited = HashSet::from([origin]);
        let mut queue = VecDeque::from([(origin, 0usize)]);

        while let Some((current, current_depth)) = queue.pop_front() {
            if current_depth >= depth {
                continue;
            }

            for &(next, kind) in adjacency.get(current).into_iter().flatten() {
                if entries.len() >= limit {
                    return Some(entries);
                }
                if !visited.insert(next) {
                    continue;
                }

                let Some(node) = nodes_by_id.get(next) else {
                    continue;
                };
                entries.push(RelatedEntry {
                    node: (*node).clone(),
                    edge_kind: kind.map(str::to_owned),
                    depth: current_depth + 1,
                    parent: current.to_owned(),
                });
                queue.push_back((next, current_depth + 1));
            }
        }

        Some(entries)
    }

    /// New snapshot with the related entries folded in. Nodes already present
    /// are kept as they are; each new pairing gets one edge from the entry's
    /// parent.
    pub fn merged_with(&self, related: &[RelatedEntry]) -> Self {
        let mut merged = self.clone();
        let mut known = merged
            .nodes
            .iter()
            .map(|node| node.id.clone())
            .collect::<HashSet<_>>();
        let mut linked = merged
            .edges
            .iter()
            .flat_map(|edge| {
                [
                    (edge.from.clone(), edge.to.clone()),
                    (edge.to.clone(), edge.from.clone()),
                ]
            })
            .collect::<HashSet<_>>();

        for entry in related {
            if known.insert(entry.node.id.clone()) {
                merged.nodes.push(entry.node.clone());
            }

            let pair = (entry.parent.clone(), entry.node.id.clone());
            if linked.contains(&pair) {
                continue;
            }
            linked.insert((pair.1.clone(), pair.0.clone()));
            linked.insert(pair);

            let kind = entry.edge_kind.as_deref().unwrap_or("related");
            let mut edge = Edge::new(
                format!("{}->{}:{kind}", entry.parent, entry.node.id),
                entry.parent.clone(),
                entry.node.id.clone(),
            );
            edge.kind = entry.edge_kind.clone();
            merged.edges.push(edge);
        }

        merged
    }

    /// Node lookup by id. The first occurrence of a duplicated id wins.
    pub fn nodes_by_id(&self) -> HashMap<&str, &Node> {
        let mut index = HashMap::with_capacity(self.nodes.len());
        for node in &self.nodes {
            index.entry(node.id.as_str()).or_insert(node);
        }
        index
    }

    /// Ids that appear on more than one node, each reported once, in the
    /// order their second occurrence shows up.
    pub fn duplicate_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::with_capacity(self.nodes.len());
        let mut duplicates = Vec::new();
        for node in &self.nodes {
            let id = node.id.as_str();
            if !seen.insert(id) && !duplicates.contains(&id) {
                duplicates.push(id);
            }
        }
        duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> GraphModel {
        GraphModel::new(
            vec![
                Node::new("alice", "Alice", GroupTag::Person),
                Node::new("ops", "Ops", GroupTag::Team),
                Node::new("launch", "Launch", GroupTag::Project),
                Node::new("rfc", "RFC", GroupTag::Document),
            ],
            vec![
                Edge::new("e1", "alice", "ops").with_kind("member_of"),
                Edge::new("e2", "ops", "launch").with_kind("owns"),
                Edge::new("e3", "rfc", "launch").with_kind("describes"),
            ],
        )
    }

    #[test]
    fn parses_json_with_unknown_groups_and_label_alias() {
        let raw = r#"{
            "nodes": [
                {"id": "a", "label": "A", "group": "agent", "size": 12.0},
                {"id": "b", "label": "B", "group": "spaceship"}
            ],
            "edges": [{"id": "e", "from": "a", "to": "b", "label": "pilots"}]
        }"#;
        let model: GraphModel = serde_json::from_str(raw).unwrap();

        assert_eq!(model.nodes[0].group, GroupTag::Agent);
        assert_eq!(model.nodes[0].size, Some(12.0));
        assert_eq!(model.nodes[1].group, GroupTag::Unknown);
        assert_eq!(model.edges[0].kind.as_deref(), Some("pilots"));
    }

    #[test]
    fn group_parse_is_case_insensitive() {
        assert_eq!(GroupTag::parse(" Workflow "), Some(GroupTag::Workflow));
        assert_eq!(GroupTag::parse("nope"), None);
    }

    #[test]
    fn filter_drops_edges_that_leave_the_kept_groups() {
        let groups = BTreeSet::from([GroupTag::Person, GroupTag::Team]);
        let filtered = chain().filtered(&groups);

        let ids = filtered
            .nodes
            .iter()
            .map(|node| node.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, ["alice", "ops"]);
        assert_eq!(filtered.edges.len(), 1);
        assert_eq!(filtered.edges[0].id, "e1");
    }

    #[test]
    fn empty_filter_keeps_everything() {
        assert_eq!(chain().filtered(&BTreeSet::new()), chain());
    }

    #[test]
    fn related_walks_both_directions_up_to_depth() {
        let related = chain().related("launch", 1, 10).unwrap();
        let ids = related
            .iter()
            .map(|entry| entry.node.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, ["ops", "rfc"]);
        assert!(related.iter().all(|entry| entry.depth == 1));
        assert_eq!(related[1].edge_kind.as_deref(), Some("describes"));

        let deeper = chain().related("launch", 2, 10).unwrap();
        assert_eq!(deeper.len(), 3);
        assert_eq!(deeper[2].node.id, "alice");
        assert_eq!(deeper[2].depth, 2);
        assert_eq!(deeper[2].parent, "ops");
    }

    #[test]
    fn related_respects_limit_and_unknown_origin() {
        assert_eq!(chain().related("launch", 3, 1).unwrap().len(), 1);
        assert!(chain().related("ghost", 1, 10).is_none());
    }

    #[test]
    fn merge_appends_new_nodes_and_links_them_once() {
        let base = GraphModel::new(vec![Node::new("ops", "Ops", GroupTag::Team)], Vec::new());
        let related = chain().related("ops", 1, 10).unwrap();

        let merged = base.merged_with(&related);
        assert_eq!(merged.node_count(), 3);
        assert_eq!(merged.edge_count(), 2);
        assert!(merged.edges.iter().all(|edge| edge.from == "ops"));

        let again = merged.merged_with(&related);
        assert_eq!(again, merged);
    }

    #[test]
    fn duplicate_ids_resolve_to_the_first_node() {
        let model = GraphModel::new(
            vec![
                Node::new("twin", "First", GroupTag::Goal),
                Node::new("solo", "Solo", GroupTag::Task),
                Node::new("twin", "Second", GroupTag::Goal),
                Node::new("twin", "Third", GroupTag::Goal),
            ],
            vec![Edge::new("e", "solo", "twin")],
        );

        assert_eq!(model.duplicate_ids(), ["twin"]);
        assert_eq!(model.nodes_by_id()["twin"].label, "First");
        let related = model.related("solo", 1, 10).unwrap();
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].node.label, "First");
        assert!(chain().duplicate_ids().is_empty());
    }
}
