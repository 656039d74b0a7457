use crate::config::{PlannerConfig, UnknownEndpointPolicy};
use crate::error::{PlannerError, PlannerResult};
use crate::models::{Edge, Location, Node, NodeId, RoadNetworkSnapshot, StreetSegment};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

/// Options controlling how road coordinates become graph nodes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphOptions {
    /// Coordinates within this distance of an existing node reuse that node
    pub tolerance: f64,
    pub unknown_endpoint_policy: UnknownEndpointPolicy,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self::from(&PlannerConfig::default())
    }
}

impl From<&PlannerConfig> for GraphOptions {
    fn from(config: &PlannerConfig) -> Self {
        Self {
            tolerance: config.node_merge_tolerance,
            unknown_endpoint_policy: config.unknown_endpoint_policy,
        }
    }
}

/// Undirected weighted road graph with nearest-node lookup
///
/// Built once per road-network snapshot and read-only afterwards, so one
/// instance can be shared by any number of concurrent planners.
#[derive(Debug, Clone)]
pub struct SpatialGraph {
    graph: UnGraph<Node, Edge>,

    /// Factor keeping the straight-line heuristic a lower bound on every
    /// edge: min(1, weight / straight-line length)
    heuristic_scale: f64,
}

impl SpatialGraph {
    /// Create a graph with no nodes or edges
    pub fn empty() -> Self {
        Self {
            graph: UnGraph::default(),
            heuristic_scale: 1.0,
        }
    }

    /// Build the road graph from road points and street segments
    ///
    /// Points within `options.tolerance` of an already created node collapse
    /// into it. Street endpoints are matched the same way; an endpoint that
    /// matches nothing is rejected or inserted according to
    /// `options.unknown_endpoint_policy`.
    pub fn build(
        points: &[Location],
        streets: &[StreetSegment],
        options: &GraphOptions,
    ) -> PlannerResult<Self> {
        let mut road = Self::empty();
        let tolerance = options.tolerance.max(0.0);

        for point in points {
            if !point.is_finite() {
                return Err(PlannerError::GraphBuild { location: *point });
            }
            if road.find_within(point, tolerance).is_none() {
                road.add_node(*point);
            }
        }
        let merged = points.len() - road.node_count();

        for street in streets {
            let a = road.resolve_endpoint(&street.start, tolerance, options)?;
            let b = road.resolve_endpoint(&street.end, tolerance, options)?;
            road.add_edge(a, b, street)?;
        }

        log::info!(
            "Graph built: {} nodes ({} merged points), {} edges",
            road.node_count(),
            merged,
            road.edge_count()
        );

        Ok(road)
    }

    /// Build the road graph from a server snapshot using the configured
    /// merge tolerance and endpoint policy
    pub fn from_snapshot(
        snapshot: &RoadNetworkSnapshot,
        config: &PlannerConfig,
    ) -> PlannerResult<Self> {
        Self::build(&snapshot.points, &snapshot.streets, &GraphOptions::from(config))
    }

    fn resolve_endpoint(
        &mut self,
        location: &Location,
        tolerance: f64,
        options: &GraphOptions,
    ) -> PlannerResult<NodeId> {
        if let Some(id) = self.find_within(location, tolerance) {
            return Ok(id);
        }

        match options.unknown_endpoint_policy {
            UnknownEndpointPolicy::Insert if location.is_finite() => {
                log::debug!("Inserting street endpoint {} as a new node", location);
                Ok(self.add_node(*location))
            }
            _ => Err(PlannerError::GraphBuild {
                location: *location,
            }),
        }
    }

    fn add_node(&mut self, location: Location) -> NodeId {
        let id = self.graph.node_count();
        let index = self.graph.add_node(Node::new(id, location));
        debug_assert_eq!(index.index(), id);
        id
    }

    fn add_edge(&mut self, a: NodeId, b: NodeId, street: &StreetSegment) -> PlannerResult<()> {
        let a_loc = self.graph[NodeIndex::new(a)].location;
        let b_loc = self.graph[NodeIndex::new(b)].location;
        let length = a_loc.distance_to(&b_loc);
        let weight = street.weight.unwrap_or(length);

        let edge = Edge::new((a, a_loc), (b, b_loc), weight, street.name.clone())?;

        if length > f64::EPSILON {
            self.heuristic_scale = self.heuristic_scale.min(weight / length);
        }

        self.graph.add_edge(NodeIndex::new(a), NodeIndex::new(b), edge);
        Ok(())
    }

    /// Nearest node no farther than `tolerance`, lowest id on ties
    fn find_within(&self, location: &Location, tolerance: f64) -> Option<NodeId> {
        self.closest(location)
            .filter(|&(_, distance)| distance <= tolerance)
            .map(|(id, _)| id)
    }

    fn closest(&self, location: &Location) -> Option<(NodeId, f64)> {
        let mut nearest: Option<(NodeId, f64)> = None;

        for node in self.nodes() {
            let distance = node.location.distance_to(location);
            // strict comparison keeps the lowest id among equidistant nodes
            if nearest.map_or(true, |(_, best)| distance < best) {
                nearest = Some((node.id, distance));
            }
        }

        nearest
    }

    /// Find the node nearest to a given location, lowest id on ties
    pub fn nearest_node(&self, location: &Location) -> PlannerResult<NodeId> {
        if !location.is_finite() {
            return Err(PlannerError::InvalidLocation(*location));
        }
        self.closest(location)
            .map(|(id, _)| id)
            .ok_or(PlannerError::EmptyGraph)
    }

    /// Adjacency list of a node as (neighbor id, edge weight) pairs
    pub fn neighbors(&self, id: NodeId) -> PlannerResult<Vec<(NodeId, f64)>> {
        self.node(id)?;
        Ok(self.adjacent(id).collect())
    }

    /// Adjacency of a node already known to exist
    pub(crate) fn adjacent(&self, id: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.graph
            .edges(NodeIndex::new(id))
            .filter_map(move |edge| {
                let street = edge.weight();
                street.other(id).map(|other| (other, street.weight))
            })
    }

    pub fn node(&self, id: NodeId) -> PlannerResult<&Node> {
        self.graph
            .node_weight(NodeIndex::new(id))
            .ok_or(PlannerError::UnknownNode(id))
    }

    pub fn location(&self, id: NodeId) -> PlannerResult<Location> {
        self.node(id).map(|node| node.location)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Nodes in id order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.graph.raw_nodes().iter().map(|node| &node.weight)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.graph.raw_edges().iter().map(|edge| &edge.weight)
    }

    pub fn heuristic_scale(&self) -> f64 {
        self.heuristic_scale
    }

    /// Underlying petgraph storage, for callers that want petgraph's own
    /// algorithms
    pub fn as_petgraph(&self) -> &UnGraph<Node, Edge> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(x: f64, y: f64) -> Location {
        Location::new(x, y)
    }

    fn options(tolerance: f64, policy: UnknownEndpointPolicy) -> GraphOptions {
        GraphOptions {
            tolerance,
            unknown_endpoint_policy: policy,
        }
    }

    fn triangle() -> SpatialGraph {
        let points = [loc(0.0, 0.0), loc(10.0, 0.0), loc(10.0, 10.0)];
        let streets = [
            StreetSegment::new(points[0], points[1]),
            StreetSegment::new(points[1], points[2]).named("North Ave"),
        ];
        SpatialGraph::build(&points, &streets, &GraphOptions::default()).unwrap()
    }

    #[test]
    fn test_build_counts_and_weights() {
        let graph = triangle();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.edges().all(|e| (e.weight - 10.0).abs() < 1e-12));
        assert_eq!(graph.heuristic_scale(), 1.0);
    }

    #[test]
    fn test_adjacency_is_symmetric() {
        let graph = triangle();
        assert_eq!(graph.neighbors(0).unwrap(), vec![(1, 10.0)]);
        assert_eq!(graph.neighbors(2).unwrap(), vec![(1, 10.0)]);

        let mut middle = graph.neighbors(1).unwrap();
        middle.sort_by_key(|&(id, _)| id);
        assert_eq!(middle, vec![(0, 10.0), (2, 10.0)]);
    }

    #[test]
    fn test_points_within_tolerance_merge() {
        let points = [loc(0.0, 0.0), loc(0.05, 0.0), loc(5.0, 5.0)];
        let graph = SpatialGraph::build(&points, &[], &GraphOptions::default()).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.nearest_node(&loc(0.05, 0.0)).unwrap(), 0);
    }

    #[test]
    fn test_zero_tolerance_keeps_distinct_points() {
        let points = [loc(0.0, 0.0), loc(0.05, 0.0), loc(0.0, 0.0)];
        let graph = SpatialGraph::build(
            &points,
            &[],
            &options(0.0, UnknownEndpointPolicy::Reject),
        )
        .unwrap();
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_unknown_endpoint_rejected() {
        let points = [loc(0.0, 0.0)];
        let streets = [StreetSegment::new(loc(0.0, 0.0), loc(3.0, 4.0))];
        let result = SpatialGraph::build(
            &points,
            &streets,
            &options(0.1, UnknownEndpointPolicy::Reject),
        );
        assert!(matches!(result, Err(PlannerError::GraphBuild { .. })));
    }

    #[test]
    fn test_unknown_endpoint_inserted() {
        let points = [loc(0.0, 0.0)];
        let streets = [StreetSegment::new(loc(0.02, 0.0), loc(3.0, 4.0))];
        let graph = SpatialGraph::build(
            &points,
            &streets,
            &options(0.1, UnknownEndpointPolicy::Insert),
        )
        .unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.location(1).unwrap(), loc(3.0, 4.0));
        assert_eq!(graph.neighbors(0).unwrap(), vec![(1, 5.0)]);
    }

    #[test]
    fn test_explicit_weight_and_heuristic_scale() {
        let points = [loc(0.0, 0.0), loc(10.0, 0.0)];
        let streets = [StreetSegment::new(points[0], points[1]).with_weight(5.0)];
        let graph = SpatialGraph::build(&points, &streets, &GraphOptions::default()).unwrap();
        assert_eq!(graph.neighbors(0).unwrap(), vec![(1, 5.0)]);
        assert_eq!(graph.heuristic_scale(), 0.5);
    }

    #[test]
    fn test_negative_weight_rejected() {
        let points = [loc(0.0, 0.0), loc(10.0, 0.0)];
        let streets = [StreetSegment::new(points[0], points[1]).with_weight(-1.0)];
        let result = SpatialGraph::build(&points, &streets, &GraphOptions::default());
        assert!(matches!(result, Err(PlannerError::InvalidEdgeWeight { .. })));
    }

    #[test]
    fn test_nearest_node_ties_pick_lowest_id() {
        let points = [loc(0.0, 0.0), loc(2.0, 0.0)];
        let graph = SpatialGraph::build(&points, &[], &GraphOptions::default()).unwrap();
        assert_eq!(graph.nearest_node(&loc(1.0, 0.0)).unwrap(), 0);
        assert_eq!(graph.nearest_node(&loc(1.5, 0.0)).unwrap(), 1);
    }

    #[test]
    fn test_nearest_node_rejects_non_finite_query() {
        let graph = triangle();
        for query in [loc(f64::NAN, 0.0), loc(0.0, f64::INFINITY)] {
            assert!(matches!(
                graph.nearest_node(&query),
                Err(PlannerError::InvalidLocation(_))
            ));
        }
    }

    #[test]
    fn test_queries_on_empty_or_unknown() {
        let graph = SpatialGraph::empty();
        assert!(matches!(
            graph.nearest_node(&loc(0.0, 0.0)),
            Err(PlannerError::EmptyGraph)
        ));
        assert!(matches!(
            triangle().neighbors(42),
            Err(PlannerError::UnknownNode(42))
        ));
    }
}
