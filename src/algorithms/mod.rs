pub mod package_selector;
pub mod path_finder;
pub mod route_optimizer;

// Common algorithm traits
use crate::error::PlannerResult;
use crate::models::NodeId;
use crate::utils::spatial_graph::SpatialGraph;
use serde::{Deserialize, Serialize};

pub use self::path_finder::{
    shortest_path, AStarSearch, CostSource, DijkstraSearch, LegCost, NodePath, Path, PathFinder,
};
pub use self::package_selector::{PackageSelector, ScoredPackage};
pub use self::route_optimizer::{plan_trip, OrderStrategy, RouteOptimizer};

/// Trait for shortest-path searches between two nodes of the road graph
///
/// Implementations must be `Send + Sync` so a single search can score
/// candidate packages from rayon worker threads.
pub trait ShortestPathSearch: Send + Sync {
    /// Find the cheapest node sequence from `start` to `goal` (both
    /// inclusive), expanding at most `max_expansions` nodes when set
    fn search(
        &self,
        graph: &SpatialGraph,
        start: NodeId,
        goal: NodeId,
        max_expansions: Option<usize>,
    ) -> PlannerResult<NodePath>;
}

/// The two interchangeable shortest-path algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchAlgorithm {
    #[default]
    AStar,
    Dijkstra,
}

impl ShortestPathSearch for SearchAlgorithm {
    fn search(
        &self,
        graph: &SpatialGraph,
        start: NodeId,
        goal: NodeId,
        max_expansions: Option<usize>,
    ) -> PlannerResult<NodePath> {
        match self {
            SearchAlgorithm::AStar => AStarSearch.search(graph, start, goal, max_expansions),
            SearchAlgorithm::Dijkstra => DijkstraSearch.search(graph, start, goal, max_expansions),
        }
    }
}
