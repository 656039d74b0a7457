// Error types raised by the planning engine

use crate::models::{Location, NodeId, PackageId};
use thiserror::Error;

/// Errors produced while building the road graph, searching it, or
/// validating planner inputs
#[derive(Debug, Error)]
pub enum PlannerError {
    /// A street segment references a coordinate that is not a known point
    #[error("street segment endpoint {location} does not match any road point")]
    GraphBuild { location: Location },

    /// A street segment carries a weight that cannot be used as a cost
    #[error("street segment {start} -> {end} has invalid weight {weight}")]
    InvalidEdgeWeight {
        start: Location,
        end: Location,
        weight: f64,
    },

    #[error("road graph has no nodes")]
    EmptyGraph,

    #[error("node {0} not found in road graph")]
    UnknownNode(NodeId),

    /// Start and goal snapped to nodes in disconnected components
    #[error("no path from node {from} to node {to}")]
    NoPath { from: NodeId, to: NodeId },

    #[error("search gave up after expanding {limit} nodes")]
    SearchLimitExceeded { limit: usize },

    #[error("query location {0} is not finite")]
    InvalidLocation(Location),

    #[error("invalid package {id}: {reason}")]
    InvalidPackage { id: PackageId, reason: String },

    #[error("malformed snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("invalid planner configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PlannerError {
    /// True for outcomes a caller should treat as "currently unreachable"
    /// rather than as misuse
    pub fn is_unreachable(&self) -> bool {
        matches!(self, PlannerError::NoPath { .. })
    }
}

pub type PlannerResult<T> = Result<T, PlannerError>;
