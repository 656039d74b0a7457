// Wire-level snapshots consumed by the planner: road network and packages

use crate::error::{PlannerError, PlannerResult};
use crate::models::{Location, Package, PackageId, Reward, DEFAULT_REWARD};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Road network as delivered by the competition server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoadNetworkSnapshot {
    #[serde(default)]
    pub points: Vec<Location>,

    #[serde(default)]
    pub streets: Vec<StreetSegment>,
}

/// One street segment between two road coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreetSegment {
    pub start: Location,
    pub end: Location,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Explicit traversal cost; the straight-line length is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl StreetSegment {
    pub fn new(start: Location, end: Location) -> Self {
        Self {
            start,
            end,
            name: None,
            weight: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }
}

/// Package entry as listed by the server, keyed by package id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub position: Location,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward: Option<Reward>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dropoff: Option<Location>,
}

/// Mapping from package id (a decimal string on the wire) to package info
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageSnapshot(pub BTreeMap<String, PackageInfo>);

impl PackageSnapshot {
    /// Converts the snapshot into validated packages, sorted by id
    pub fn into_packages(self) -> PlannerResult<Vec<Package>> {
        let mut packages = self
            .0
            .into_iter()
            .map(|(key, info)| {
                let id: PackageId = key.trim().parse().map_err(|_| {
                    PlannerError::InvalidSnapshot(format!("package key {key:?} is not an id"))
                })?;
                Package::new(
                    id,
                    info.position,
                    info.dropoff,
                    info.reward.unwrap_or(DEFAULT_REWARD),
                )
            })
            .collect::<PlannerResult<Vec<_>>>()?;

        packages.sort_by_key(|p| p.id());
        Ok(packages)
    }
}
