// Models module - exports all model types

mod location;
mod node;
mod package;
mod route;
mod snapshot;

// Re-export model types
pub use self::location::Location;
pub use self::node::{Edge, Node};
pub use self::package::{Package, DEFAULT_REWARD};
pub use self::route::{DeliveryOrder, PlanOutput, Route};
pub use self::snapshot::{PackageInfo, PackageSnapshot, RoadNetworkSnapshot, StreetSegment};

// Common type aliases for improved code readability
pub type NodeId = usize;
pub type PackageId = u32;
pub type Distance = f64;
pub type Reward = f64;
