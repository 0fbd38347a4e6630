use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, VecDeque};

/// Directed link graph keyed by URL.
///
/// Vertices are only ever added; an edge between the same ordered pair is
/// stored once.
#[derive(Debug, Default, Clone)]
pub struct LinkGraph {
    graph: DiGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the vertex was already present.
    pub fn add_vertex(&mut self, url: &str) -> bool {
        if self.index.contains_key(url) {
            return false;
        }
        let node = self.graph.add_node(url.to_string());
        self.index.insert(url.to_string(), node);
        true
    }

    /// Adds `from -> to`, creating `to` when needed.
    ///
    /// Returns `false` without touching the graph if `from` is unknown or the
    /// edge already exists.
    pub fn add_edge(&mut self, from: &str, to: &str) -> bool {
        let Some(&source) = self.index.get(from) else {
            return false;
        };
        if let Some(&target) = self.index.get(to)
            && self.graph.contains_edge(source, target)
        {
            return false;
        }

        self.add_vertex(to);
        let target = self.index[to];
        self.graph.add_edge(source, target, ());
        true
    }

    /// Breadth-first search from `from` to `to`.
    ///
    /// Returns the shortest path by edge count, both endpoints included.
    pub fn find_path(&self, from: &str, to: &str) -> Option<Vec<String>> {
        let &start = self.index.get(from)?;
        if from == to {
            return Some(vec![from.to_string()]);
        }
        let &goal = self.index.get(to)?;

        let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut queue = VecDeque::from([start]);
        parent.insert(start, start);

        while let Some(current) = queue.pop_front() {
            for next in self.graph.neighbors_directed(current, Direction::Outgoing) {
                if parent.contains_key(&next) {
                    continue;
                }
                parent.insert(next, current);
                if next == goal {
                    return Some(self.trace_back(&parent, start, goal));
                }
                queue.push_back(next);
            }
        }
        None
    }

    fn trace_back(
        &self,
        parent: &HashMap<NodeIndex, NodeIndex>,
        start: NodeIndex,
        goal: NodeIndex,
    ) -> Vec<String> {
        let mut path = vec![self.graph[goal].clone()];
        let mut node = goal;
        while node != start {
            node = parent[&node];
            path.push(self.graph[node].clone());
        }
        path.reverse();
        path
    }

    pub fn contains(&self, url: &str) -> bool {
        self.index.contains_key(url)
    }

    /// Destinations linked from `url`, in insertion order.
    pub fn neighbors(&self, url: &str) -> Vec<&str> {
        let Some(&node) = self.index.get(url) else {
            return Vec::new();
        };
        // petgraph walks outgoing edges newest first
        let mut out: Vec<&str> = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .map(|n| self.graph[n].as_str())
            .collect();
        out.reverse();
        out
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Every `(from, to)` pair in the graph.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.graph.raw_edges().iter().map(move |edge| {
            (
                self.graph[edge.source()].as_str(),
                self.graph[edge.target()].as_str(),
            )
        })
    }
}
