use crate::graph::{Edge, GraphStore, KnownVehicle, VehicleClass};
use crate::route::primitives::Dijkstra;
use crate::route::{
    LoopPolicy, Metric, MetricAggregator, PathFinder, RouteError, WaypointStitcher,
};

use approx::assert_relative_eq;
use pathfinding::prelude::dijkstra;

const NO_WAYPOINTS: [&str; 0] = [];

fn car() -> VehicleClass {
    KnownVehicle::Car.into()
}

fn bus() -> VehicleClass {
    KnownVehicle::Bus.into()
}

fn edge(from: &str, to: &str, distance: f64, cost: f64, traffic: f64) -> Edge {
    Edge::new(from, to, car())
        .with_distance(distance)
        .with_cost(cost)
        .with_traffic(traffic)
}

fn store_of(edges: impl IntoIterator<Item = Edge>) -> GraphStore {
    let mut store = GraphStore::new();
    for edge in edges {
        store.upsert_edge(edge, false).expect("fixture edges are valid");
    }
    store
}

/// A small network in which each metric prefers a different route
/// from `Porter` to `Salem`.
///
/// - `Porter -> Davis -> Salem`: distance 4, cost 20, traffic 9
/// - `Porter -> Lynn -> Salem`: distance 10, cost 2, traffic 8
/// - `Porter -> Union -> Salem`: distance 9, cost 15, traffic 2
fn metric_network() -> GraphStore {
    store_of([
        edge("Porter", "Davis", 2.0, 10.0, 4.0),
        edge("Davis", "Salem", 2.0, 10.0, 5.0),
        edge("Porter", "Lynn", 5.0, 1.0, 4.0),
        edge("Lynn", "Salem", 5.0, 1.0, 4.0),
        edge("Porter", "Union", 4.0, 7.0, 1.0),
        edge("Union", "Salem", 5.0, 8.0, 1.0),
    ])
}

#[test_log::test]
fn chain_is_found_and_summed() {
    let store = store_of([
        edge("A", "B", 2.0, 0.0, 0.0),
        edge("B", "C", 3.0, 0.0, 0.0),
    ]);

    let path = PathFinder::new(&store).find_path("A", "C", &car(), &Metric::Distance);
    assert_eq!(path, vec!["A", "B", "C"]);

    let distance = MetricAggregator::new(&store).sum_metric(&path, &car(), &Metric::Distance);
    assert_relative_eq!(distance, 5.0);
}

#[test_log::test]
fn each_metric_selects_its_own_route() {
    let store = metric_network();
    let finder = PathFinder::new(&store);

    let shortest = finder.find_path("Porter", "Salem", &car(), &Metric::Distance);
    let cheapest = finder.find_path("Porter", "Salem", &car(), &Metric::Cost);
    let quietest = finder.find_path("Porter", "Salem", &car(), &Metric::Traffic);

    assert_eq!(shortest, vec!["Porter", "Davis", "Salem"]);
    assert_eq!(cheapest, vec!["Porter", "Lynn", "Salem"]);
    assert_eq!(quietest, vec!["Porter", "Union", "Salem"]);

    let solution = finder
        .try_find_path("Porter", "Salem", &car(), &Metric::Cost)
        .expect("route exists");
    assert_relative_eq!(solution.weight, 2.0);
}

#[test_log::test]
fn unreachable_destination_yields_empty_path() {
    let store = store_of([
        edge("A", "B", 1.0, 1.0, 1.0),
        edge("C", "D", 1.0, 1.0, 1.0),
    ]);
    let finder = PathFinder::new(&store);

    assert!(finder
        .find_path("A", "D", &car(), &Metric::Distance)
        .is_empty());
    assert!(matches!(
        finder.try_find_path("A", "D", &car(), &Metric::Distance),
        Err(RouteError::Unreachable { .. })
    ));
}

#[test_log::test]
fn unknown_endpoints_are_reported() {
    let store = store_of([edge("A", "B", 1.0, 1.0, 1.0)]);
    let finder = PathFinder::new(&store);

    assert_eq!(
        finder.try_find_path("Nowhere", "B", &car(), &Metric::Distance),
        Err(RouteError::UnknownStart {
            start: "Nowhere".to_string(),
            vehicle: car(),
        })
    );

    // The start exists, but not for this vehicle class.
    assert!(matches!(
        finder.try_find_path("A", "B", &bus(), &Metric::Distance),
        Err(RouteError::UnknownStart { .. })
    ));

    assert_eq!(
        finder.try_find_path("A", "Nowhere", &car(), &Metric::Distance),
        Err(RouteError::UnknownDestination("Nowhere".to_string()))
    );
}

#[test_log::test]
fn destination_without_outgoing_edges_is_reachable() {
    let store = store_of([edge("A", "Sink", 1.0, 1.0, 1.0)]);

    let path = PathFinder::new(&store).find_path("A", "Sink", &car(), &Metric::Distance);
    assert_eq!(path, vec!["A", "Sink"]);
}

#[test_log::test]
fn searches_stay_within_vehicle_class() {
    let mut store = store_of([
        edge("A", "B", 1.0, 1.0, 1.0),
        edge("B", "C", 1.0, 1.0, 1.0),
    ]);
    store
        .upsert_edge(Edge::new("A", "C", bus()).with_distance(0.5), false)
        .unwrap();

    let finder = PathFinder::new(&store);
    assert_eq!(
        finder.find_path("A", "C", &car(), &Metric::Distance),
        vec!["A", "B", "C"]
    );
    assert_eq!(
        finder.find_path("A", "C", &bus(), &Metric::Distance),
        vec!["A", "C"]
    );
}

#[test_log::test]
fn non_positive_distances_are_skipped() {
    let store = store_of([
        edge("A", "C", 0.0, 0.0, 0.0),
        edge("A", "B", 1.0, 1.0, 1.0),
        edge("B", "C", 1.0, 1.0, 1.0),
    ]);
    let finder = PathFinder::new(&store);

    assert_eq!(
        finder.find_path("A", "C", &car(), &Metric::Distance),
        vec!["A", "B", "C"]
    );

    // Zero cost and traffic are legitimate weights.
    assert_eq!(
        finder.find_path("A", "C", &car(), &Metric::Cost),
        vec!["A", "C"]
    );
    assert_eq!(
        finder.find_path("A", "C", &car(), &Metric::Traffic),
        vec!["A", "C"]
    );
}

#[test_log::test]
fn start_equal_to_destination() {
    let store = store_of([edge("A", "B", 1.0, 1.0, 1.0)]);

    let solution = PathFinder::new(&store)
        .try_find_path("A", "A", &car(), &Metric::Distance)
        .expect("trivial route");

    assert_eq!(solution.path, vec!["A"]);
    assert_relative_eq!(solution.weight, 0.0);
}

#[test_log::test]
fn equal_costs_expand_in_discovery_order() {
    let store = store_of([
        edge("A", "B", 1.0, 1.0, 1.0),
        edge("A", "C", 1.0, 1.0, 1.0),
        edge("B", "D", 1.0, 1.0, 1.0),
        edge("C", "D", 1.0, 1.0, 1.0),
    ]);
    let finder = PathFinder::new(&store);

    for _ in 0..8 {
        assert_eq!(
            finder.find_path("A", "D", &car(), &Metric::Distance),
            vec!["A", "B", "D"]
        );
    }
}

#[test_log::test]
fn bidirectional_edge_routes_both_ways() {
    let mut store = GraphStore::new();
    store
        .upsert_edge(edge("A", "B", 3.0, 4.0, 5.0), true)
        .unwrap();

    let finder = PathFinder::new(&store);
    let aggregator = MetricAggregator::new(&store);

    let forward = finder.find_path("A", "B", &car(), &Metric::Distance);
    let backward = finder.find_path("B", "A", &car(), &Metric::Distance);

    assert_eq!(backward, vec!["B", "A"]);
    assert_eq!(
        aggregator.totals(&forward, &car()),
        aggregator.totals(&backward, &car())
    );
}

#[test_log::test]
fn waypoints_are_stitched_without_duplicate_boundaries() {
    let store = store_of([
        edge("A", "B", 1.0, 1.0, 1.0),
        edge("B", "C", 1.0, 1.0, 1.0),
    ]);

    let path = WaypointStitcher::new(&store).find_path(
        "A",
        &["B"],
        "C",
        &car(),
        &Metric::Distance,
    );

    assert_eq!(path, vec!["A", "B", "C"]);
}

#[test_log::test]
fn empty_waypoints_delegate_to_single_search() {
    let store = metric_network();

    let stitched = WaypointStitcher::new(&store).find_path(
        "Porter",
        &NO_WAYPOINTS,
        "Salem",
        &car(),
        &Metric::Traffic,
    );
    let direct = PathFinder::new(&store).find_path("Porter", "Salem", &car(), &Metric::Traffic);

    assert_eq!(stitched, direct);
}

#[test_log::test]
fn waypoints_force_a_detour() {
    let store = metric_network();

    let solution = WaypointStitcher::new(&store)
        .try_find_path("Porter", &["Lynn"], "Salem", &car(), &Metric::Distance)
        .expect("detour exists");

    assert_eq!(solution.path, vec!["Porter", "Lynn", "Salem"]);
    assert_relative_eq!(solution.weight, 10.0);
}

#[test_log::test]
fn failing_leg_fails_the_whole_route() {
    let store = store_of([
        edge("A", "B", 1.0, 1.0, 1.0),
        edge("B", "C", 1.0, 1.0, 1.0),
        edge("X", "Y", 1.0, 1.0, 1.0),
    ]);
    let stitcher = WaypointStitcher::new(&store);

    assert!(stitcher
        .find_path("A", &["B", "Y"], "C", &car(), &Metric::Distance)
        .is_empty());

    match stitcher.try_find_path("A", &["B", "Y"], "C", &car(), &Metric::Distance) {
        Err(RouteError::Leg { from, to, source }) => {
            assert_eq!(from, "B");
            assert_eq!(to, "Y");
            assert!(matches!(*source, RouteError::Unreachable { .. }));
        }
        other => panic!("expected a failing leg, got {other:?}"),
    }
}

#[test_log::test]
fn loop_policy_governs_backtracking_legs() {
    // Reaching the waypoint W requires passing through B twice.
    let store = store_of([
        edge("A", "B", 1.0, 1.0, 1.0),
        edge("B", "W", 1.0, 1.0, 1.0),
        edge("W", "B", 1.0, 1.0, 1.0),
        edge("B", "C", 1.0, 1.0, 1.0),
    ]);
    let aggregator = MetricAggregator::new(&store);

    let preserved = WaypointStitcher::new(&store)
        .try_find_path("A", &["W"], "C", &car(), &Metric::Distance)
        .expect("route exists");

    assert_eq!(preserved.path, vec!["A", "B", "W", "B", "C"]);
    assert_relative_eq!(
        aggregator.sum_metric(&preserved.path, &car(), &Metric::Distance),
        preserved.weight
    );

    let collapsed = WaypointStitcher::new(&store)
        .with_policy(LoopPolicy::Collapse)
        .try_find_path("A", &["W"], "C", &car(), &Metric::Distance)
        .expect("route exists");

    assert_eq!(collapsed.path, vec!["A", "B", "W", "C"]);
    assert_relative_eq!(collapsed.weight, preserved.weight);
    assert!(aggregator
        .sum_metric(&collapsed.path, &car(), &Metric::Distance)
        .is_infinite());
}

#[test_log::test]
fn gaps_anywhere_sum_to_infinity() {
    let store = store_of([
        edge("A", "B", 1.0, 1.0, 1.0),
        edge("B", "C", 1.0, 1.0, 1.0),
    ]);
    let aggregator = MetricAggregator::new(&store);

    for path in [
        vec!["X", "A", "B", "C"],
        vec!["A", "X", "B", "C"],
        vec!["A", "B", "C", "X"],
        vec!["C", "B"],
    ] {
        assert_eq!(
            aggregator.sum_metric(&path, &car(), &Metric::Cost),
            f64::INFINITY,
            "{path:?} is not realisable"
        );
    }

    assert_eq!(
        aggregator.try_sum_metric(&["A", "B", "X"], &car(), &Metric::Cost),
        Err(RouteError::MissingEdge {
            from: "B".to_string(),
            to: "X".to_string(),
            vehicle: car(),
        })
    );

    // Edges of another vehicle class do not count.
    assert!(aggregator
        .sum_metric(&["A", "B"], &bus(), &Metric::Distance)
        .is_infinite());
    assert!(!aggregator.totals(&["A", "X"], &car()).is_realizable());
}

#[test_log::test]
fn trivial_paths_sum_to_zero() {
    let store = store_of([edge("A", "B", 1.0, 1.0, 1.0)]);
    let aggregator = MetricAggregator::new(&store);

    assert_relative_eq!(
        aggregator.sum_metric(&NO_WAYPOINTS, &car(), &Metric::Distance),
        0.0
    );
    assert_relative_eq!(aggregator.sum_metric(&["A"], &car(), &Metric::Distance), 0.0);
}

#[test_log::test]
fn totals_report_every_metric_for_one_path() {
    let store = metric_network();
    let aggregator = MetricAggregator::new(&store);

    let path = PathFinder::new(&store).find_path("Porter", "Salem", &car(), &Metric::Cost);
    let totals = aggregator.totals(&path, &car());

    assert!(totals.is_realizable());
    assert_relative_eq!(totals.distance, 10.0);
    assert_relative_eq!(totals.cost, 2.0);
    assert_relative_eq!(totals.traffic, 8.0);
}

#[test]
fn reach_settles_in_cost_order() {
    let store = metric_network();

    let settled = Dijkstra
        .reach(&"Porter".to_string(), |node: &String| {
            store
                .edges_from(node, &car())
                .iter()
                .map(|edge| (edge.destination().to_string(), edge.distance()))
                .collect::<Vec<_>>()
        })
        .map(|item| item.total_cost)
        .collect::<Vec<_>>();

    assert_eq!(settled.len(), 5);
    assert!(settled.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn matches_reference_dijkstra_on_a_grid() {
    const SIDE: usize = 6;

    // Deterministic pseudo-random weights in 1..=9.
    let mut seed: u64 = 0x2545_f491;
    let mut next_weight = move || {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (seed >> 33) % 9 + 1
    };

    let name = |row: usize, col: usize| format!("{row}:{col}");
    let mut store = GraphStore::new();

    for row in 0..SIDE {
        for col in 0..SIDE {
            let mut neighbours = Vec::new();
            if col + 1 < SIDE {
                neighbours.push((row, col + 1));
            }
            if row + 1 < SIDE {
                neighbours.push((row + 1, col));
            }
            if col > 0 {
                neighbours.push((row, col - 1));
            }
            if row > 0 {
                neighbours.push((row - 1, col));
            }

            for (r, c) in neighbours {
                let weight = next_weight() as f64;
                store
                    .upsert_edge(
                        Edge::new(name(row, col), name(r, c), car()).with_distance(weight),
                        false,
                    )
                    .unwrap();
            }
        }
    }

    let finder = PathFinder::new(&store);
    let aggregator = MetricAggregator::new(&store);
    let start = name(0, 0);

    for row in 0..SIDE {
        for col in 0..SIDE {
            let goal = name(row, col);

            let (_, expected) = dijkstra(
                &start,
                |node: &String| {
                    store
                        .edges_from(node, &car())
                        .iter()
                        .map(|edge| (edge.destination().to_string(), edge.distance() as u64))
                        .collect::<Vec<_>>()
                },
                |node| *node == goal,
            )
            .expect("grid is connected");

            let solution = finder
                .try_find_path(&start, &goal, &car(), &Metric::Distance)
                .expect("grid is connected");

            assert_relative_eq!(solution.weight, expected as f64);
            assert_relative_eq!(
                aggregator.sum_metric(&solution.path, &car(), &Metric::Distance),
                expected as f64
            );
        }
    }
}
