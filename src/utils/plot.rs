// Route rendering to PNG

use std::error::Error;
use std::path::Path;

use plotters::prelude::*;

use crate::models::{Location, Route};
use crate::utils::distance::bounding_box;
use crate::utils::spatial_graph::SpatialGraph;

/// Draws the road network, the route's pickups (blue) and drop-offs (red),
/// and the planned waypoint path (green) into a PNG at `output_path`
pub fn render_route(
    output_path: impl AsRef<Path>,
    graph: &SpatialGraph,
    route: &Route,
) -> Result<(), Box<dyn Error>> {
    let stops: Vec<Location> = route
        .packages
        .iter()
        .flat_map(|p| std::iter::once(p.pickup()).chain(p.dropoff()))
        .collect();

    let (min, max) = bounding_box(
        graph
            .nodes()
            .map(|node| &node.location)
            .chain(&route.waypoints)
            .chain(&stops),
    )
    .ok_or("nothing to draw: empty graph and empty route")?;

    let pad_x = ((max.x - min.x) * 0.05).max(1.0);
    let pad_y = ((max.y - min.y) * 0.05).max(1.0);

    let root = BitMapBackend::new(output_path.as_ref(), (1000, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d((min.x - pad_x)..(max.x + pad_x), (min.y - pad_y)..(max.y + pad_y))?;

    // Road network
    let nodes: Vec<Location> = graph.nodes().map(|node| node.location).collect();
    chart.draw_series(graph.edges().map(|edge| {
        let a = nodes[edge.a];
        let b = nodes[edge.b];
        PathElement::new(vec![(a.x, a.y), (b.x, b.y)], BLACK.mix(0.3))
    }))?;
    chart.draw_series(
        nodes
            .iter()
            .map(|l| Circle::new((l.x, l.y), 2, BLACK.mix(0.5).filled())),
    )?;

    // Planned path
    if route.waypoints.len() > 1 {
        chart.draw_series(LineSeries::new(
            route.waypoints.iter().map(|l| (l.x, l.y)),
            GREEN.stroke_width(3),
        ))?;
    }

    for package in &route.packages {
        chart.draw_series(std::iter::once(Circle::new(
            (package.pickup().x, package.pickup().y),
            8,
            ShapeStyle::from(&BLUE).filled(),
        )))?;
        if let Some(dropoff) = package.dropoff() {
            chart.draw_series(std::iter::once(Circle::new(
                (dropoff.x, dropoff.y),
                8,
                ShapeStyle::from(&RED).filled(),
            )))?;
        }
    }

    root.present()?;
    log::info!("Route rendered to {}", output_path.as_ref().display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::{PathFinder, RouteOptimizer};
    use crate::config::PlannerConfig;
    use crate::models::Package;
    use crate::utils::init_map::generate_grid_network;

    #[test]
    fn test_render_route_writes_png() {
        let config = PlannerConfig::default();
        let graph =
            SpatialGraph::from_snapshot(&generate_grid_network(4, 4, 10.0), &config).unwrap();
        let optimizer = RouteOptimizer::new(PathFinder::from_config(&graph, &config), &config);
        let package = Package::new(
            1,
            Location::new(10.0, 0.0),
            Some(Location::new(30.0, 30.0)),
            12.0,
        )
        .unwrap();
        let route = optimizer
            .evaluate(&[package], &Location::new(0.0, 0.0))
            .unwrap();

        let path = std::env::temp_dir().join("delivery_planner_render_test.png");
        render_route(&path, &graph, &route).unwrap();
        assert!(path.exists());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_render_nothing_is_an_error() {
        let route = Route::new(Vec::new(), Vec::new(), 0.0, &PlannerConfig::default().weights());
        let path = std::env::temp_dir().join("delivery_planner_render_empty.png");
        assert!(render_route(&path, &SpatialGraph::empty(), &route).is_err());
    }
}
