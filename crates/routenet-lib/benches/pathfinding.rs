use criterion::{criterion_group, criterion_main, Criterion};
use once_cell::sync::Lazy;
use routenet_lib::{
    plan_with, GraphSnapshot, NodeSpec, PlanOptions, PlanRequest, RouteAlgorithm, RouteNetwork,
    SegmentSpec,
};
use std::hint::black_box;

const GRID: usize = 60;

fn grid_id(row: usize, col: usize) -> String {
    format!("n{row:03}-{col:03}")
}

fn grid_network() -> RouteNetwork {
    let step = 0.0009;
    let mut network = RouteNetwork::new("bench-grid");
    for row in 0..GRID {
        for col in 0..GRID {
            network = network.with_node(NodeSpec::new(
                grid_id(row, col),
                row as f64 * step,
                col as f64 * step,
            ));
        }
    }
    for row in 0..GRID {
        for col in 0..GRID {
            // Every third row is a slower street.
            let multiplier = if row % 3 == 0 { 1.5 } else { 1.0 };
            if col + 1 < GRID {
                network = network.with_segment(
                    SegmentSpec::new(
                        format!("h-{row}-{col}"),
                        grid_id(row, col),
                        grid_id(row, col + 1),
                        0.0,
                    )
                    .geodesic()
                    .with_cost_multiplier(multiplier),
                );
            }
            if row + 1 < GRID {
                network = network.with_segment(
                    SegmentSpec::new(
                        format!("v-{row}-{col}"),
                        grid_id(row, col),
                        grid_id(row + 1, col),
                        0.0,
                    )
                    .geodesic(),
                );
            }
        }
    }
    network
}

static SNAPSHOT: Lazy<GraphSnapshot> =
    Lazy::new(|| GraphSnapshot::build(grid_network(), 1).expect("bench grid is valid"));
static CORNER_TO_CORNER: Lazy<PlanRequest> =
    Lazy::new(|| PlanRequest::new(grid_id(0, 0), grid_id(GRID - 1, GRID - 1)));
static SHORT_HOP: Lazy<PlanRequest> =
    Lazy::new(|| PlanRequest::new(grid_id(20, 20), grid_id(26, 31)));

fn benchmark_pathfinding(c: &mut Criterion) {
    let snapshot = &*SNAPSHOT;
    let dijkstra = PlanOptions::default().with_algorithm(RouteAlgorithm::Dijkstra);
    let a_star = PlanOptions::default().with_algorithm(RouteAlgorithm::AStar);

    c.bench_function("dijkstra_grid_corner_to_corner", |b| {
        let request = &*CORNER_TO_CORNER;
        b.iter(|| {
            let plan = plan_with(snapshot, request, &dijkstra).expect("route exists");
            black_box(plan.total_cost)
        });
    });

    c.bench_function("astar_grid_corner_to_corner", |b| {
        let request = &*CORNER_TO_CORNER;
        b.iter(|| {
            let plan = plan_with(snapshot, request, &a_star).expect("route exists");
            black_box(plan.total_cost)
        });
    });

    c.bench_function("dijkstra_grid_short_hop", |b| {
        let request = &*SHORT_HOP;
        b.iter(|| {
            let plan = plan_with(snapshot, request, &dijkstra).expect("route exists");
            black_box(plan.segment_count())
        });
    });

    c.bench_function("astar_grid_short_hop", |b| {
        let request = &*SHORT_HOP;
        b.iter(|| {
            let plan = plan_with(snapshot, request, &a_star).expect("route exists");
            black_box(plan.segment_count())
        });
    });

    c.bench_function("snapshot_build_grid", |b| {
        b.iter(|| {
            let snapshot = GraphSnapshot::build(grid_network(), 2).expect("valid");
            black_box(snapshot.segment_count())
        });
    });
}

criterion_group!(benches, benchmark_pathfinding);
criterion_main!(benches);
