use std::time::Duration;

use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;
use hrsw::Stopwatch;
use human_duration::human_duration;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;

use astar::AStarSearch;
use astar::goal::GoalState;
use astar::problems::city::CityMap;
use astar::problems::graph::WeightedGraph;
use astar::problems::grid_2d::Grid2DProblem;

/// Maximum time willing to wait for a single benchmark instance.
/// Experiments are carried out at least 5s and at least 100 times, so running a
/// 1s instance takes 1m40s.
const MAX_INSTANCE_TIME: Duration = Duration::from_secs(1);

const SIZES: [usize; 3] = [64, 256, 1024];
const WALL_DENSITY: f64 = 0.25;

fn astar(problem: &Grid2DProblem) -> Option<u32> {
    let mut search = AStarSearch::new(problem.start_node(), problem.goal_state());
    search.run().ok().map(|i| search.node(i).g())
}

fn grid_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("Grid2D Search");

    for size in SIZES {
        for i in 0..5 {
            let instance_name = format!("random[{size}x{size}]:{i}");
            let mut rng = ChaCha8Rng::seed_from_u64(i);
            let problem = Grid2DProblem::random(&mut rng, size, size, WALL_DENSITY);

            let mut stopwatch = Stopwatch::new_started();
            let cost = astar(&problem);
            stopwatch.stop();
            let elapsed = stopwatch.elapsed();

            if cost.is_none() {
                log::info!("Skipping {instance_name} as it has no solution");
                continue;
            }
            if elapsed > MAX_INSTANCE_TIME {
                log::warn!(
                    "Skipping {instance_name} as it takes too long with A* ({})",
                    human_duration(&elapsed)
                );
                continue;
            }

            group.bench_with_input(BenchmarkId::new("A*", &instance_name), &problem, |b, p| {
                b.iter(|| astar(p))
            });
        }
    }
    group.finish();
}

fn graph_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("Graph Search");

    let map = CityMap::southwest_germany();
    group.bench_function("southwest_germany", |b| {
        b.iter(|| {
            let mut search = AStarSearch::new(
                map.city("Saarbrücken").ok()?,
                GoalState::new(map.city("Würzburg").ok()?),
            );
            search.run().ok()
        })
    });

    for vertices in [50, 200] {
        let mut rng = ChaCha8Rng::seed_from_u64(vertices as u64);
        let graph = WeightedGraph::random(&mut rng, vertices, 0.1, 100);
        group.bench_with_input(BenchmarkId::new("random", vertices), &graph, |b, g| {
            b.iter(|| {
                let mut search = AStarSearch::new(g.node(0), GoalState::new(g.node(vertices - 1)));
                search.run().ok().map(|i| search.node(i).g())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, grid_search, graph_search);
criterion_main!(benches);
