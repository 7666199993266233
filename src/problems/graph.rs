//! Explicit weighted digraphs.
//!
//! Small graphs with vertices numbered `0..n`, listed edges and a per-vertex
//! heuristic table. Handy to build fixtures by hand or at random, and to
//! check search results against an exhaustive search.

use std::hash::Hash;

use derive_more::Display;
use rand::Rng;

use crate::node::SearchNode;

pub type VertexId = usize;
pub type GraphCost = u32;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WeightedGraph {
    edges: Vec<Vec<(VertexId, GraphCost)>>,
    heuristic: Vec<GraphCost>,
}

impl WeightedGraph {
    /// A graph with `vertices` vertices and no edges.
    pub fn new(vertices: usize) -> Self {
        Self {
            edges: vec![vec![]; vertices],
            heuristic: vec![0; vertices],
        }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Adds a vertex and returns its id.
    pub fn add_vertex(&mut self) -> VertexId {
        self.edges.push(vec![]);
        self.heuristic.push(0);
        self.edges.len() - 1
    }

    /// Adds a directed edge.
    pub fn add_edge(&mut self, from: VertexId, to: VertexId, cost: GraphCost) -> &mut Self {
        debug_assert!(to < self.len(), "Edge to unknown vertex {to}");
        self.edges[from].push((to, cost));
        self
    }

    /// Adds an edge in both directions.
    pub fn add_undirected_edge(&mut self, a: VertexId, b: VertexId, cost: GraphCost) -> &mut Self {
        self.add_edge(a, b, cost).add_edge(b, a, cost)
    }

    pub fn set_heuristic(&mut self, v: VertexId, h: GraphCost) -> &mut Self {
        self.heuristic[v] = h;
        self
    }
    pub fn heuristic(&self, v: VertexId) -> GraphCost {
        self.heuristic[v]
    }

    pub fn neighbours(&self, v: VertexId) -> &[(VertexId, GraphCost)] {
        &self.edges[v]
    }

    /// Cost of the cheapest edge `from -> to`, if any.
    pub fn edge_cost(&self, from: VertexId, to: VertexId) -> Option<GraphCost> {
        self.edges[from]
            .iter()
            .filter(|(t, _c)| *t == to)
            .map(|(_t, c)| *c)
            .min()
    }

    pub fn node(&self, v: VertexId) -> GraphNode<'_> {
        debug_assert!(v < self.len(), "Unknown vertex {v}");
        GraphNode { graph: self, id: v }
    }

    /// A random graph where each ordered pair of distinct vertices gets an
    /// edge with probability `edge_probability`. Costs are in
    /// `1..=max_cost`.
    pub fn random<R: Rng>(
        rng: &mut R,
        vertices: usize,
        edge_probability: f64,
        max_cost: GraphCost,
    ) -> Self {
        let mut graph = Self::new(vertices);
        for from in 0..vertices {
            for to in 0..vertices {
                if from != to && rng.random_bool(edge_probability) {
                    graph.add_edge(from, to, rng.random_range(1..=max_cost));
                }
            }
        }
        graph
    }

    /// The cost of the cheapest path from `from` to `to`, by trying every
    /// simple path.
    ///
    /// Exponential, only meant to validate searches on tiny graphs.
    pub fn exhaustive_shortest_cost(&self, from: VertexId, to: VertexId) -> Option<GraphCost> {
        let mut visited = vec![false; self.len()];
        let mut best = None;
        self.exhaustive_walk(from, to, 0, &mut visited, &mut best);
        best
    }

    fn exhaustive_walk(
        &self,
        at: VertexId,
        to: VertexId,
        g: GraphCost,
        visited: &mut [bool],
        best: &mut Option<GraphCost>,
    ) {
        if at == to {
            *best = Some(best.map_or(g, |b| b.min(g)));
            return;
        }
        visited[at] = true;
        for &(next, c) in &self.edges[at] {
            if !visited[next] {
                self.exhaustive_walk(next, to, g.saturating_add(c), visited, best);
            }
        }
        visited[at] = false;
    }

    /// Sets every vertex's heuristic to `percent`% of its true remaining cost
    /// to `goal`, which keeps it consistent for `percent <= 100`.
    pub fn set_exact_heuristic(&mut self, goal: VertexId, percent: GraphCost) -> &mut Self {
        debug_assert!(percent <= 100, "The heuristic would overestimate");
        for v in 0..self.len() {
            let h = self
                .exhaustive_shortest_cost(v, goal)
                .map_or(0, |c| c * percent / 100);
            self.heuristic[v] = h;
        }
        self
    }
}

/// A vertex of a `WeightedGraph`.
///
/// Equality only looks at the vertex id.
#[derive(Copy, Clone, Display)]
#[display("v{id}")]
pub struct GraphNode<'g> {
    graph: &'g WeightedGraph,
    id: VertexId,
}

impl std::fmt::Debug for GraphNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "v{}", self.id)
    }
}

impl GraphNode<'_> {
    pub fn id(&self) -> VertexId {
        self.id
    }
}

impl PartialEq for GraphNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for GraphNode<'_> {}

impl Hash for GraphNode<'_> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl SearchNode for GraphNode<'_> {
    type Cost = GraphCost;

    fn successors(&self) -> Vec<Self> {
        self.graph
            .neighbours(self.id)
            .iter()
            .map(|&(to, _c)| GraphNode {
                graph: self.graph,
                id: to,
            })
            .collect()
    }

    /// Non-neighbours are unreachable, priced at `GraphCost::MAX`.
    fn cost(&self, to: &Self) -> GraphCost {
        self.graph
            .edge_cost(self.id, to.id)
            .unwrap_or(GraphCost::MAX)
    }

    fn h(&self) -> GraphCost {
        self.graph.heuristic(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;

    #[test]
    fn nodes_compare_by_vertex() {
        let mut g = WeightedGraph::new(3);
        g.add_edge(0, 1, 4).add_edge(0, 1, 2).add_edge(1, 2, 1);

        let a = g.node(0);
        let b = g.node(1);
        assert_eq!(a.successors(), vec![b, b]);
        assert_eq!(a.cost(&b), 2);
        assert_eq!(a.cost(&g.node(2)), GraphCost::MAX);
        assert_eq!(b, g.node(1));
        assert_eq!(b.to_string(), "v1");
    }

    #[test]
    fn exhaustive_costs() {
        let mut g = WeightedGraph::new(4);
        g.add_edge(0, 1, 1)
            .add_edge(1, 2, 1)
            .add_edge(0, 2, 5)
            .add_edge(2, 0, 1);

        assert_eq!(g.exhaustive_shortest_cost(0, 2), Some(2));
        assert_eq!(g.exhaustive_shortest_cost(2, 1), Some(2));
        assert_eq!(g.exhaustive_shortest_cost(0, 0), Some(0));
        assert_eq!(g.exhaustive_shortest_cost(0, 3), None);

        g.set_exact_heuristic(2, 50);
        assert_eq!(g.heuristic(0), 1);
        assert_eq!(g.heuristic(2), 0);
        assert_eq!(g.heuristic(3), 0);
    }

    #[test]
    fn random_graphs_are_reproducible() {
        let a = WeightedGraph::random(&mut ChaCha8Rng::seed_from_u64(3), 6, 0.4, 9);
        let b = WeightedGraph::random(&mut ChaCha8Rng::seed_from_u64(3), 6, 0.4, 9);
        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
        for v in 0..a.len() {
            for &(to, c) in a.neighbours(v) {
                assert_ne!(v, to);
                assert!((1..=9).contains(&c));
            }
        }
    }
}
