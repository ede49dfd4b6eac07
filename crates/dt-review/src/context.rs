//! Review context: everything a check may read

use dt_core::{Database, RelationshipGraph, ReviewConfig};

/// Immutable inputs shared by all checks of one review run
pub struct ReviewContext<'a> {
    db: &'a Database,
    graph: RelationshipGraph,
    config: ReviewConfig,
}

impl<'a> ReviewContext<'a> {
    /// Build the relationship graph for `db` and bundle it with the thresholds
    pub fn new(db: &'a Database, config: ReviewConfig) -> Self {
        let graph = RelationshipGraph::build(db);
        log::debug!(
            "Review graph: {} tables, {} join edges",
            graph.node_count(),
            graph.edge_count()
        );
        Self { db, graph, config }
    }

    pub fn db(&self) -> &Database {
        self.db
    }

    pub fn graph(&self) -> &RelationshipGraph {
        &self.graph
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }
}
