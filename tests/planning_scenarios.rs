use delivery_planner::algorithms::{shortest_path, OrderStrategy, PackageSelector, PathFinder, RouteOptimizer};
use delivery_planner::models::{Location, Package, PackageSnapshot, StreetSegment};
use delivery_planner::utils::distance::path_length;
use delivery_planner::utils::init_map::generate_grid_network;
use delivery_planner::utils::GraphOptions;
use delivery_planner::{plan_trip, PlannerConfig, PlannerError, PlanOutput, SearchAlgorithm, SpatialGraph};

fn loc(x: f64, y: f64) -> Location {
    Location::new(x, y)
}

fn package(id: u32, pickup: (f64, f64), dropoff: (f64, f64), reward: f64) -> Package {
    Package::new(id, pickup.into(), Some(dropoff.into()), reward).unwrap()
}

/// Triangle where the direct hypotenuse is priced above the two legs
fn triangle() -> SpatialGraph {
    let points = [loc(0.0, 0.0), loc(10.0, 0.0), loc(10.0, 10.0)];
    let streets = [
        StreetSegment::new(points[0], points[1]),
        StreetSegment::new(points[1], points[2]),
        StreetSegment::new(points[0], points[2]).with_weight(30.0),
    ];
    SpatialGraph::build(&points, &streets, &GraphOptions::default()).unwrap()
}

fn line() -> SpatialGraph {
    let points = [loc(0.0, 0.0), loc(10.0, 0.0), loc(20.0, 0.0), loc(30.0, 0.0)];
    let streets: Vec<StreetSegment> = points
        .windows(2)
        .map(|w| StreetSegment::new(w[0], w[1]))
        .collect();
    SpatialGraph::build(&points, &streets, &GraphOptions::default()).unwrap()
}

fn grid() -> SpatialGraph {
    SpatialGraph::from_snapshot(&generate_grid_network(5, 5, 10.0), &PlannerConfig::default())
        .unwrap()
}

#[test]
fn test_triangle_shortest_path_through_corner() {
    let graph = triangle();
    for algorithm in [SearchAlgorithm::AStar, SearchAlgorithm::Dijkstra] {
        let path = shortest_path(&graph, &loc(0.0, 0.0), &loc(10.0, 10.0), algorithm).unwrap();
        assert_eq!(path.nodes, vec![0, 1, 2]);
        assert!((path.distance - 20.0).abs() < 1e-9);
        assert_eq!(
            path.waypoints,
            vec![loc(0.0, 0.0), loc(10.0, 0.0), loc(10.0, 10.0)]
        );
    }
}

#[test]
fn test_greedy_stops_at_unprofitable_package() {
    let graph = line();
    let config = PlannerConfig::default();
    let mut selector = PackageSelector::new(PathFinder::from_config(&graph, &config), &config);
    selector.load(vec![
        package(1, (0.0, 0.0), (10.0, 0.0), 6.0),
        package(2, (0.0, 0.0), (30.0, 0.0), 1.0),
    ]);

    let best = selector.select_best(&loc(0.0, 0.0)).unwrap();
    assert_eq!(best.package.id(), 1);
    assert!((best.profit - 5.0).abs() < 1e-9);

    let picks = selector.select_greedy(&loc(0.0, 0.0), 2);
    let ids: Vec<u32> = picks.iter().map(|s| s.package.id()).collect();
    assert_eq!(ids, vec![1]);
}

#[test]
fn test_exact_and_nearest_neighbor_orders_differ() {
    let graph = grid();
    let config = PlannerConfig::default();
    let optimizer = RouteOptimizer::new(PathFinder::from_config(&graph, &config), &config);
    let packages = vec![
        package(1, (20.0, 10.0), (0.0, 0.0), 10.0),
        package(2, (40.0, 30.0), (40.0, 40.0), 10.0),
        package(3, (30.0, 40.0), (20.0, 40.0), 10.0),
    ];
    let start = loc(20.0, 20.0);

    let exact = optimizer.order_exact(&packages, &start).unwrap();
    let greedy = optimizer.order_nearest_neighbor(&packages, &start).unwrap();
    assert_eq!(exact.package_ids(), vec![2, 3, 1]);
    assert_eq!(greedy.package_ids(), vec![1, 2, 3]);
    assert!(exact.total_distance < greedy.total_distance);

    let route = optimizer
        .optimize_and_evaluate(&packages, &start, OrderStrategy::Exact)
        .unwrap();
    assert!((route.total_distance - exact.total_distance).abs() < 1e-9);
    // grid edges are Euclidean, so the path length matches the graph distance
    assert!((path_length(&route.waypoints) - route.total_distance).abs() < 1e-9);
    assert!((route.net_profit - (30.0 - 12.0)).abs() < 1e-9);
}

#[test]
fn test_disconnected_components() {
    let points = [loc(0.0, 0.0), loc(10.0, 0.0), loc(100.0, 100.0), loc(110.0, 100.0)];
    let streets = [
        StreetSegment::new(points[0], points[1]),
        StreetSegment::new(points[2], points[3]),
    ];
    let graph = SpatialGraph::build(&points, &streets, &GraphOptions::default()).unwrap();

    for algorithm in [SearchAlgorithm::AStar, SearchAlgorithm::Dijkstra] {
        let result = shortest_path(&graph, &points[0], &points[3], algorithm);
        assert!(matches!(result, Err(PlannerError::NoPath { from: 0, to: 3 })));
    }

    let config = PlannerConfig::default();
    let optimizer = RouteOptimizer::new(PathFinder::from_config(&graph, &config), &config);
    let stranded = [package(1, (100.0, 100.0), (110.0, 100.0), 500.0)];
    let evaluated = optimizer.evaluate(&stranded, &points[0]);
    assert!(matches!(evaluated, Err(PlannerError::NoPath { .. })));
}

#[test]
fn test_unknown_street_endpoint() {
    let points = [loc(0.0, 0.0), loc(10.0, 0.0)];
    let streets = [StreetSegment::new(loc(0.0, 0.0), loc(10.0, 5.0))];
    let result = SpatialGraph::build(&points, &streets, &GraphOptions::default());

    match result {
        Err(PlannerError::GraphBuild { location }) => assert_eq!(location, loc(10.0, 5.0)),
        other => panic!("expected a graph build error, got {other:?}"),
    }
}

#[test]
fn test_snapshot_to_plan_output() {
    let graph = grid();
    let snapshot: PackageSnapshot = serde_json::from_str(
        r#"{
            "7": {"position": [0, 10], "reward": 9, "dropoff": [0, 30]},
            "3": {"position": [40, 40]}
        }"#,
    )
    .unwrap();
    let packages = snapshot.into_packages().unwrap();

    let route = plan_trip(&graph, &packages, &loc(0.0, 0.0), &PlannerConfig::default()).unwrap();
    let output = PlanOutput::from(&route);
    assert_eq!(output.package_ids, vec![7]);
    assert!((output.total_distance - 30.0).abs() < 1e-9);
    assert!((output.net_profit - 6.0).abs() < 1e-9);

    let json = serde_json::to_value(&output).unwrap();
    assert_eq!(json["path"][0], serde_json::json!([0.0, 0.0]));
    assert_eq!(json["path"].as_array().unwrap().len(), 4);
}

#[test]
fn test_nothing_profitable_gives_empty_plan() {
    let graph = grid();
    let packages = vec![package(1, (40.0, 40.0), (0.0, 0.0), 1.0)];
    let route = plan_trip(&graph, &packages, &loc(0.0, 0.0), &PlannerConfig::default()).unwrap();

    assert!(route.is_empty());
    assert!(route.waypoints.is_empty());
    assert_eq!(PlanOutput::from(&route).package_ids, Vec::<u32>::new());
}
