#![no_main]

use libfuzzer_sys::fuzz_target;

use astar::goal::GoalState;
use astar::problems::graph::WeightedGraph;

// Builds a small graph out of the input and checks A* against brute force.
//
// The first byte picks the number of vertices, every following triple is an
// edge `(from, to, cost)`. Heuristics are exact, so they stay consistent.
fuzz_target!(|data: &[u8]| {
    let Some((&n, edges)) = data.split_first() else {
        return;
    };
    let n = usize::from(n % 8) + 1;

    let mut graph = WeightedGraph::new(n);
    for edge in edges.chunks_exact(3) {
        let from = usize::from(edge[0]) % n;
        let to = usize::from(edge[1]) % n;
        let cost = u32::from(edge[2]) + 1;
        graph.add_edge(from, to, cost);
    }
    let goal = n - 1;
    graph.set_exact_heuristic(goal, 100);

    let expected = graph.exhaustive_shortest_cost(0, goal);
    let found = astar::shortest_path(graph.node(0), GoalState::new(graph.node(goal)), None);

    assert_eq!(found.as_ref().map(|p| p.cost()).ok(), expected);
    if let Ok(path) = found {
        assert!(path.is_contiguous());
    }
});
