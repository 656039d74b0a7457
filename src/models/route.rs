// Route models for representing planned delivery trips

use crate::config::ProfitWeights;
use crate::models::{Distance, Location, Package, PackageId, Reward};
use serde::Serialize;

/// Represents a complete delivery trip with its materialized path and metrics
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Packages in visiting order
    pub packages: Vec<Package>,

    /// Waypoint path: start, pickup 1, drop-off 1, pickup 2, ... with every
    /// intermediate road node in between
    pub waypoints: Vec<Location>,

    /// Total travelled distance along the waypoint path
    pub total_distance: Distance,

    /// Sum of package rewards
    pub total_reward: Reward,

    /// reward * reward_weight - distance * distance_weight
    pub net_profit: f64,
}

impl Route {
    /// Creates a route, deriving reward and profit from the packages
    pub fn new(
        packages: Vec<Package>,
        waypoints: Vec<Location>,
        total_distance: Distance,
        weights: &ProfitWeights,
    ) -> Self {
        let total_reward = packages.iter().map(|p| p.reward()).sum();
        let net_profit = weights.profit(total_reward, total_distance);

        Self {
            packages,
            waypoints,
            total_distance,
            total_reward,
            net_profit,
        }
    }

    pub fn package_ids(&self) -> Vec<PackageId> {
        self.packages.iter().map(|p| p.id()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Average net profit contributed by each package
    pub fn profit_per_package(&self) -> f64 {
        if self.packages.is_empty() {
            0.0
        } else {
            self.net_profit / self.packages.len() as f64
        }
    }

    /// Net profit per unit of distance travelled
    pub fn profit_density(&self) -> f64 {
        if self.total_distance > 0.0 {
            self.net_profit / self.total_distance
        } else {
            0.0
        }
    }
}

/// A visiting order chosen by one of the ordering strategies
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryOrder {
    pub packages: Vec<Package>,

    /// Summed leg cost of the pickup -> drop-off chain
    pub total_distance: Distance,

    /// True if any leg cost came from the straight-line estimate instead of
    /// the road graph
    pub estimated: bool,
}

impl DeliveryOrder {
    pub fn package_ids(&self) -> Vec<PackageId> {
        self.packages.iter().map(|p| p.id()).collect()
    }
}

/// Planning result handed to the transport layer for submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanOutput {
    pub package_ids: Vec<PackageId>,
    pub path: Vec<Location>,
    pub total_distance: Distance,
    pub total_reward: Reward,
    pub net_profit: f64,
}

impl From<&Route> for PlanOutput {
    fn from(route: &Route) -> Self {
        Self {
            package_ids: route.package_ids(),
            path: route.waypoints.clone(),
            total_distance: route.total_distance,
            total_reward: route.total_reward,
            net_profit: route.net_profit,
        }
    }
}
