// Road graph records: nodes and the undirected edges between them

use crate::error::{PlannerError, PlannerResult};
use crate::models::{Location, NodeId};

/// A point in the road network usable as a path endpoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub location: Location,
}

impl Node {
    pub fn new(id: NodeId, location: Location) -> Self {
        Self { id, location }
    }
}

/// Undirected connection between two nodes, traversable both ways at the
/// same cost
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub a: NodeId,
    pub b: NodeId,

    /// Travel cost, the straight-line length unless the street overrode it
    pub weight: f64,

    /// Street name, when the road network supplied one
    pub name: Option<String>,
}

impl Edge {
    /// Creates an edge, rejecting weights that cannot act as a search cost
    pub fn new(
        a: (NodeId, Location),
        b: (NodeId, Location),
        weight: f64,
        name: Option<String>,
    ) -> PlannerResult<Self> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(PlannerError::InvalidEdgeWeight {
                start: a.1,
                end: b.1,
                weight,
            });
        }

        Ok(Self {
            a: a.0,
            b: b.0,
            weight,
            name,
        })
    }

    /// The endpoint opposite `node`, if `node` is an endpoint at all
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if node == self.a {
            Some(self.b)
        } else if node == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}
