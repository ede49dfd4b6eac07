//! Relationship graph over a schema model

use crate::model::{ColumnPair, Database, JoinKind, NameCase};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet, VecDeque};

/// Edge payload: the join edge a graph edge came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    /// Originating constraint name
    pub name: String,
    /// FK or relationship
    pub kind: JoinKind,
    /// Join columns, local side first
    pub pairs: Vec<ColumnPair>,
}

/// A directed multigraph of tables joined by foreign keys and relationships.
///
/// One node per table, one edge per join edge (a multi-column join is a
/// single edge). Self-loops are kept. The graph is read-only once built.
#[derive(Debug)]
pub struct RelationshipGraph {
    /// The underlying graph
    graph: DiGraph<String, GraphEdge>,

    /// Map from normalized table name to node index
    node_map: HashMap<String, NodeIndex>,

    case: NameCase,
}

impl RelationshipGraph {
    /// Build the graph from a database
    pub fn build(db: &Database) -> Self {
        let case = db.case();
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();

        for table in db.tables() {
            let idx = graph.add_node(table.name().to_string());
            node_map.insert(case.key(table.name()), idx);
        }

        for (table, join) in db.joins() {
            let (Some(&from), Some(&to)) = (
                node_map.get(&case.key(table.name())),
                node_map.get(&case.key(&join.target)),
            ) else {
                log::warn!(
                    "Skipping {} '{}': target table '{}' is not in the model",
                    join.kind,
                    join.name,
                    join.target
                );
                continue;
            };
            graph.add_edge(
                from,
                to,
                GraphEdge {
                    name: join.name.clone(),
                    kind: join.kind,
                    pairs: join.pairs.clone(),
                },
            );
        }

        log::debug!(
            "Relationship graph: {} tables, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        Self {
            graph,
            node_map,
            case,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Table names in declaration order
    pub fn tables(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .map(|idx| self.graph[idx].as_str())
            .collect()
    }

    /// Check if a table exists in the graph
    pub fn contains(&self, table: &str) -> bool {
        self.index(table).is_some()
    }

    fn index(&self, table: &str) -> Option<NodeIndex> {
        self.node_map.get(&self.case.key(table)).copied()
    }

    /// Every edge as (source, target, payload), in declaration order
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &GraphEdge)> {
        self.graph.edge_references().map(|e| {
            (
                self.graph[e.source()].as_str(),
                self.graph[e.target()].as_str(),
                e.weight(),
            )
        })
    }

    /// Distinct direct successors of a table, sorted by name
    pub fn neighbors(&self, table: &str) -> Vec<&str> {
        let Some(idx) = self.index(table) else {
            return Vec::new();
        };
        self.sorted_successors(idx)
            .into_iter()
            .map(|n| self.graph[n].as_str())
            .collect()
    }

    fn sorted_successors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        out.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));
        out
    }

    /// True if at least one edge goes directly from `from` to `to`
    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        match (self.index(from), self.index(to)) {
            (Some(a), Some(b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }

    /// True if the table joins to itself
    pub fn has_self_loop(&self, table: &str) -> bool {
        self.has_edge(table, table)
    }

    /// Shortest directed distances from `table` to every table reachable
    /// within `max_depth` hops (BFS). The start table is not included.
    pub fn distances_bounded(&self, table: &str, max_depth: usize) -> Vec<(&str, usize)> {
        let Some(start) = self.index(table) else {
            return Vec::new();
        };

        let mut result = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(start);
        let mut queue = VecDeque::new();
        queue.push_back((start, 0usize));

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            for neighbor in self.sorted_successors(current) {
                if visited.insert(neighbor) {
                    result.push((self.graph[neighbor].as_str(), depth + 1));
                    queue.push_back((neighbor, depth + 1));
                }
            }
        }

        result
    }

    /// Strongly connected components (Tarjan), each sorted by table name,
    /// components ordered by their smallest name
    pub fn strongly_connected_components(&self) -> Vec<Vec<&str>> {
        let mut components: Vec<Vec<&str>> = tarjan_scc(&self.graph)
            .into_iter()
            .map(|scc| {
                let mut names: Vec<&str> =
                    scc.into_iter().map(|n| self.graph[n].as_str()).collect();
                names.sort_unstable();
                names
            })
            .collect();
        components.sort();
        components
    }

    /// Lexicographically smallest simple cycle of length ≥ 2 through
    /// `table`, as the tables visited starting at `table` (the closing edge
    /// back to it is implied).
    ///
    /// Built greedily: each step takes the smallest successor from which
    /// `table` is still reachable off the path, and the cycle closes as soon
    /// as an edge back exists.
    pub fn smallest_cycle_through(&self, table: &str) -> Option<Vec<&str>> {
        let start = self.index(table)?;
        let mut path = vec![start];
        let mut on_path = HashSet::from([start]);

        loop {
            let current = *path.last()?;
            let successors = self.sorted_successors(current);
            if path.len() > 1 && successors.contains(&start) {
                return Some(path.into_iter().map(|n| self.graph[n].as_str()).collect());
            }
            let next = successors
                .into_iter()
                .find(|n| !on_path.contains(n) && self.reaches_avoiding(*n, start, &on_path))?;
            on_path.insert(next);
            path.push(next);
        }
    }

    /// Whether `to` is reachable from `from` without entering `avoid`
    fn reaches_avoiding(&self, from: NodeIndex, to: NodeIndex, avoid: &HashSet<NodeIndex>) -> bool {
        let mut seen = HashSet::from([from]);
        let mut queue = VecDeque::from([from]);
        while let Some(current) = queue.pop_front() {
            for neighbor in self.graph.neighbors(current) {
                if neighbor == to {
                    return true;
                }
                if !avoid.contains(&neighbor) && seen.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        false
    }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
