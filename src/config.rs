// Planner configuration injected by the caller

use crate::algorithms::SearchAlgorithm;
use crate::error::{PlannerError, PlannerResult};
use crate::models::{Distance, Reward};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// What `SpatialGraph::build` does with a street endpoint that matches no
/// road point within the merge tolerance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnknownEndpointPolicy {
    /// Fail the build with `PlannerError::GraphBuild`
    #[default]
    Reject,
    /// Add the endpoint as a new node
    Insert,
}

/// Recognized planner options. Every component receives these explicitly,
/// so differently weighted planners can run side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Cost multiplier applied to travelled distance
    pub distance_weight: f64,

    /// Multiplier applied to package rewards
    pub reward_weight: f64,

    /// Vehicle capacity
    pub max_packages_per_trip: usize,

    pub algorithm: SearchAlgorithm,

    /// Road coordinates closer than this collapse into one node
    pub node_merge_tolerance: f64,

    /// Largest package count ordered by exhaustive search in auto mode
    pub exact_order_threshold: usize,

    /// Pickup-to-pickup distance below which packages share a cluster
    pub density_radius: f64,

    /// Estimate unreachable legs by straight-line distance instead of
    /// excluding them
    pub straight_line_fallback: bool,

    pub unknown_endpoint_policy: UnknownEndpointPolicy,

    /// Upper bound on nodes expanded by a single search
    pub max_expansions: Option<usize>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            distance_weight: 0.1,
            reward_weight: 1.0,
            max_packages_per_trip: 3,
            algorithm: SearchAlgorithm::AStar,
            node_merge_tolerance: 0.1,
            exact_order_threshold: 3,
            density_radius: 25.0,
            straight_line_fallback: true,
            unknown_endpoint_policy: UnknownEndpointPolicy::Reject,
            max_expansions: None,
        }
    }
}

impl PlannerConfig {
    /// Loads a configuration from a JSON file; absent fields keep defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> PlannerResult<Self> {
        let json = fs::read_to_string(path)?;
        let config: PlannerConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PlannerResult<()> {
        check(
            self.distance_weight.is_finite() && self.distance_weight >= 0.0,
            "distance_weight must be a non-negative number",
        )?;
        check(
            self.reward_weight.is_finite() && self.reward_weight >= 0.0,
            "reward_weight must be a non-negative number",
        )?;
        check(
            self.max_packages_per_trip > 0,
            "max_packages_per_trip must be at least 1",
        )?;
        check(
            self.node_merge_tolerance.is_finite() && self.node_merge_tolerance >= 0.0,
            "node_merge_tolerance must be a non-negative number",
        )?;
        check(
            self.density_radius.is_finite() && self.density_radius > 0.0,
            "density_radius must be positive",
        )?;
        check(
            self.max_expansions != Some(0),
            "max_expansions must be at least 1 when set",
        )
    }

    pub fn weights(&self) -> ProfitWeights {
        ProfitWeights::new(self.distance_weight, self.reward_weight)
    }
}

fn check(ok: bool, message: &str) -> PlannerResult<()> {
    if ok {
        Ok(())
    } else {
        Err(PlannerError::InvalidConfig(message.to_string()))
    }
}

/// The two weights of the net-profit objective
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfitWeights {
    pub distance_weight: f64,
    pub reward_weight: f64,
}

impl ProfitWeights {
    pub fn new(distance_weight: f64, reward_weight: f64) -> Self {
        Self {
            distance_weight,
            reward_weight,
        }
    }

    /// Net profit: reward * reward_weight - distance * distance_weight
    pub fn profit(&self, reward: Reward, distance: Distance) -> f64 {
        reward * self.reward_weight - distance * self.distance_weight
    }
}

impl Default for ProfitWeights {
    fn default() -> Self {
        PlannerConfig::default().weights()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.max_packages_per_trip, 3);
        assert_eq!(config.exact_order_threshold, 3);
        assert_eq!(config.algorithm, SearchAlgorithm::AStar);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: PlannerConfig =
            serde_json::from_str(r#"{"distance_weight": 0.5, "algorithm": "DIJKSTRA"}"#).unwrap();
        assert_eq!(config.distance_weight, 0.5);
        assert_eq!(config.algorithm, SearchAlgorithm::Dijkstra);
        assert_eq!(config.reward_weight, 1.0);
        assert_eq!(config.unknown_endpoint_policy, UnknownEndpointPolicy::Reject);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = PlannerConfig::default();
        config.distance_weight = -1.0;
        assert!(config.validate().is_err());

        let mut config = PlannerConfig::default();
        config.max_packages_per_trip = 0;
        assert!(config.validate().is_err());

        let mut config = PlannerConfig::default();
        config.node_merge_tolerance = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = PlannerConfig::default();
        config.max_expansions = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_profit_formula() {
        let weights = ProfitWeights::new(0.1, 1.0);
        assert!((weights.profit(6.0, 10.0) - 5.0).abs() < 1e-12);
        assert!((weights.profit(1.0, 30.0) + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_json_file() {
        let path = std::env::temp_dir().join("delivery_planner_config_test.json");
        fs::write(&path, r#"{"max_packages_per_trip": 5, "straight_line_fallback": false}"#)
            .unwrap();
        let config = PlannerConfig::from_json_file(&path).unwrap();
        assert_eq!(config.max_packages_per_trip, 5);
        assert!(!config.straight_line_fallback);
        fs::remove_file(&path).ok();
    }
}
