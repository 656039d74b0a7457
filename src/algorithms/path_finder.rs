use std::cmp::{Ordering, Reverse};

use priority_queue::PriorityQueue;

use crate::algorithms::{SearchAlgorithm, ShortestPathSearch};
use crate::config::PlannerConfig;
use crate::error::{PlannerError, PlannerResult};
use crate::models::{Distance, Location, NodeId};
use crate::utils::spatial_graph::SpatialGraph;

// Custom wrapper to make f64 implement Eq
#[derive(PartialEq, Copy, Clone, Debug)]
struct OrderedCost(f64);

impl Eq for OrderedCost {}

impl PartialOrd for OrderedCost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedCost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Frontier priority: lowest estimate first, then earliest discovery
type FrontierKey = Reverse<(OrderedCost, u64)>;

/// Node sequence produced by a search, start and goal inclusive
#[derive(Debug, Clone, PartialEq)]
pub struct NodePath {
    pub nodes: Vec<NodeId>,
    pub distance: Distance,
}

/// Standard Dijkstra search ordered by accumulated cost
#[derive(Debug, Clone, Copy, Default)]
pub struct DijkstraSearch;

impl ShortestPathSearch for DijkstraSearch {
    fn search(
        &self,
        graph: &SpatialGraph,
        start: NodeId,
        goal: NodeId,
        max_expansions: Option<usize>,
    ) -> PlannerResult<NodePath> {
        best_first(graph, start, goal, max_expansions, |_| 0.0)
    }
}

/// A* search guided by straight-line distance to the goal
///
/// The heuristic is scaled by the graph's heuristic scale, which is 1 for
/// Euclidean edge weights and smaller only when explicit weights undercut
/// the straight line. It therefore never overestimates and is consistent,
/// so A* settles the goal at the same cost Dijkstra would.
#[derive(Debug, Clone, Copy, Default)]
pub struct AStarSearch;

impl ShortestPathSearch for AStarSearch {
    fn search(
        &self,
        graph: &SpatialGraph,
        start: NodeId,
        goal: NodeId,
        max_expansions: Option<usize>,
    ) -> PlannerResult<NodePath> {
        let target = graph.location(goal)?;
        let scale = graph.heuristic_scale();
        best_first(graph, start, goal, max_expansions, |location| {
            location.distance_to(&target) * scale
        })
    }
}

fn best_first<H>(
    graph: &SpatialGraph,
    start: NodeId,
    goal: NodeId,
    max_expansions: Option<usize>,
    heuristic: H,
) -> PlannerResult<NodePath>
where
    H: Fn(&Location) -> f64,
{
    let start_location = graph.location(start)?;
    graph.node(goal)?;

    if start == goal {
        return Ok(NodePath {
            nodes: vec![start],
            distance: 0.0,
        });
    }

    let n = graph.node_count();
    // cost[v] = best known accumulated cost to reach v
    let mut cost = vec![f64::INFINITY; n];
    let mut previous: Vec<Option<NodeId>> = vec![None; n];
    let mut settled = vec![false; n];

    let mut frontier: PriorityQueue<NodeId, FrontierKey> = PriorityQueue::new();
    let mut discovered: u64 = 0;
    let mut expanded: usize = 0;

    cost[start] = 0.0;
    frontier.push(
        start,
        Reverse((OrderedCost(heuristic(&start_location)), discovered)),
    );

    while let Some((node, _)) = frontier.pop() {
        if node == goal {
            return Ok(reconstruct(&previous, goal, cost[goal]));
        }

        if let Some(limit) = max_expansions {
            if expanded >= limit {
                log::warn!(
                    "Search from node {} to node {} stopped after {} expansions",
                    start,
                    goal,
                    limit
                );
                return Err(PlannerError::SearchLimitExceeded { limit });
            }
        }
        expanded += 1;
        settled[node] = true;

        for (neighbor, weight) in graph.adjacent(node) {
            if settled[neighbor] {
                continue;
            }

            let candidate = cost[node] + weight;
            if candidate < cost[neighbor] {
                cost[neighbor] = candidate;
                previous[neighbor] = Some(node);
                discovered += 1;

                let estimate = candidate + heuristic(&graph.location(neighbor)?);
                // re-pushing a queued node replaces its priority
                frontier.push(neighbor, Reverse((OrderedCost(estimate), discovered)));
            }
        }
    }

    Err(PlannerError::NoPath {
        from: start,
        to: goal,
    })
}

fn reconstruct(previous: &[Option<NodeId>], goal: NodeId, distance: Distance) -> NodePath {
    let mut nodes = vec![goal];
    let mut current = goal;
    while let Some(prev) = previous[current] {
        nodes.push(prev);
        current = prev;
    }
    nodes.reverse();

    NodePath { nodes, distance }
}

/// Shortest path between two coordinates after snapping them to the graph
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub nodes: Vec<NodeId>,

    /// Coordinates of `nodes`, in travel order
    pub waypoints: Vec<Location>,

    /// Sum of edge weights along the path
    pub distance: Distance,
}

/// Where a leg cost came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostSource {
    /// Shortest path over the road graph
    Graph,
    /// Straight-line estimate used because the road graph has no path; may
    /// understate the real cost
    StraightLine,
}

/// Travel cost between two positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegCost {
    pub distance: Distance,
    pub source: CostSource,
}

impl LegCost {
    pub fn is_estimate(&self) -> bool {
        self.source == CostSource::StraightLine
    }
}

/// Snaps coordinates to the road graph and runs the configured search
#[derive(Debug, Clone, Copy)]
pub struct PathFinder<'g> {
    graph: &'g SpatialGraph,
    algorithm: SearchAlgorithm,
    max_expansions: Option<usize>,
    straight_line_fallback: bool,
}

impl<'g> PathFinder<'g> {
    pub fn new(graph: &'g SpatialGraph, algorithm: SearchAlgorithm) -> Self {
        Self {
            graph,
            algorithm,
            max_expansions: None,
            straight_line_fallback: true,
        }
    }

    pub fn from_config(graph: &'g SpatialGraph, config: &PlannerConfig) -> Self {
        Self::new(graph, config.algorithm)
            .with_max_expansions(config.max_expansions)
            .with_straight_line_fallback(config.straight_line_fallback)
    }

    pub fn with_max_expansions(mut self, max_expansions: Option<usize>) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    /// Whether `travel_cost` may estimate unreachable legs by straight-line
    /// distance
    pub fn with_straight_line_fallback(mut self, enabled: bool) -> Self {
        self.straight_line_fallback = enabled;
        self
    }

    pub fn graph(&self) -> &'g SpatialGraph {
        self.graph
    }

    pub fn algorithm(&self) -> SearchAlgorithm {
        self.algorithm
    }

    /// Shortest path between two coordinates, each snapped to its nearest
    /// node first
    pub fn shortest_path(&self, start: &Location, goal: &Location) -> PlannerResult<Path> {
        let start_id = self.graph.nearest_node(start)?;
        let goal_id = self.graph.nearest_node(goal)?;
        self.shortest_path_between(start_id, goal_id)
    }

    pub fn shortest_path_between(&self, start: NodeId, goal: NodeId) -> PlannerResult<Path> {
        let found = self
            .algorithm
            .search(self.graph, start, goal, self.max_expansions)?;
        let waypoints = found
            .nodes
            .iter()
            .map(|&id| self.graph.location(id))
            .collect::<PlannerResult<Vec<_>>>()?;

        Ok(Path {
            nodes: found.nodes,
            waypoints,
            distance: found.distance,
        })
    }

    /// Road distance between two positions
    ///
    /// When no road path exists and the fallback is enabled, the straight
    /// line between the raw positions is returned instead, flagged as
    /// `CostSource::StraightLine`.
    pub fn travel_cost(&self, from: &Location, to: &Location) -> PlannerResult<LegCost> {
        match self.shortest_path(from, to) {
            Ok(path) => Ok(LegCost {
                distance: path.distance,
                source: CostSource::Graph,
            }),
            Err(err) if err.is_unreachable() && self.straight_line_fallback => {
                log::warn!(
                    "No road path from {} to {}, estimating by straight line",
                    from,
                    to
                );
                Ok(LegCost {
                    distance: from.distance_to(to),
                    source: CostSource::StraightLine,
                })
            }
            Err(err) => Err(err),
        }
    }
}

/// Shortest path between two coordinates with the given algorithm
pub fn shortest_path(
    graph: &SpatialGraph,
    start: &Location,
    goal: &Location,
    algorithm: SearchAlgorithm,
) -> PlannerResult<Path> {
    PathFinder::new(graph, algorithm).shortest_path(start, goal)
}
