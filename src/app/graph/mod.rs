mod build;
pub(in crate::app) mod interaction;
mod view;

#[cfg(test)]
pub(super) mod testing {
    use std::collections::BTreeSet;

    use anyhow::{Result, anyhow, bail};

    use crate::graph::{Edge, GraphModel, GroupTag, Node, RelatedEntry};
    use crate::source::GraphSource;

    use super::super::{RelatedRequest, ViewModel};

    /// Runs a related fetch in place and hands the result to the view.
    pub(in crate::app) fn answer(
        view: &mut ViewModel,
        request: RelatedRequest,
        source: &dyn GraphSource,
    ) -> bool {
        view.finish_related(request.generation, request.fetch(source))
    }

    pub(in crate::app) fn two_nodes() -> GraphModel {
        GraphModel::new(
            vec![
                Node::new("A", "Alpha", GroupTag::Person),
                Node::new("B", "Beta", GroupTag::Project),
            ],
            vec![Edge::new("ab", "A", "B").with_kind("leads")],
        )
    }

    pub(in crate::app) struct StaticSource(pub(in crate::app) GraphModel);

    impl GraphSource for StaticSource {
        fn fetch_visualization(&self, groups: &BTreeSet<GroupTag>) -> Result<GraphModel> {
            Ok(self.0.filtered(groups))
        }

        fn fetch_related(
            &self,
            node_id: &str,
            depth: usize,
            limit: usize,
        ) -> Result<Vec<RelatedEntry>> {
            self.0
                .related(node_id, depth, limit)
                .ok_or_else(|| anyhow!("unknown node {node_id}"))
        }
    }

    pub(in crate::app) struct FailingSource;

    impl GraphSource for FailingSource {
        fn fetch_visualization(&self, _groups: &BTreeSet<GroupTag>) -> Result<GraphModel> {
            bail!("connection refused")
        }

        fn fetch_related(
            &self,
            _node_id: &str,
            _depth: usize,
            _limit: usize,
        ) -> Result<Vec<RelatedEntry>> {
            bail!("connection refused")
        }
    }
}
