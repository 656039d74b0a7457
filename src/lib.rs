// Public modules
pub mod algorithms;
pub mod config;
pub mod error;
pub mod models;
pub mod utils;

// Re-exports for convenience
pub use algorithms::{
    plan_trip, OrderStrategy, PackageSelector, PathFinder, RouteOptimizer, SearchAlgorithm,
};
pub use config::{PlannerConfig, ProfitWeights};
pub use error::{PlannerError, PlannerResult};
pub use models::{Location, Package, PlanOutput, Route};
pub use utils::SpatialGraph;
