use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::algorithms::package_selector::PackageSelector;
use crate::algorithms::path_finder::{LegCost, PathFinder};
use crate::config::{PlannerConfig, ProfitWeights};
use crate::error::PlannerResult;
use crate::models::{DeliveryOrder, Distance, Location, Package, Route};
use crate::utils::spatial_graph::SpatialGraph;

/// How `optimize_and_evaluate` picks a visiting order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStrategy {
    /// Exact search up to the configured threshold, nearest neighbour above
    #[default]
    Auto,
    Exact,
    NearestNeighbor,
}

impl From<Option<bool>> for OrderStrategy {
    /// `Some(true)` forces exact search, `Some(false)` the heuristic
    fn from(use_exact: Option<bool>) -> Self {
        match use_exact {
            Some(true) => OrderStrategy::Exact,
            Some(false) => OrderStrategy::NearestNeighbor,
            None => OrderStrategy::Auto,
        }
    }
}

/// Travel costs between every pair of points an ordering can connect
struct LegMatrix {
    /// start -> pickup of package j
    from_start: Vec<LegCost>,
    /// pickup -> drop-off of package j
    delivery: Vec<LegCost>,
    /// drop-off of package i -> pickup of package j
    between: Vec<Vec<LegCost>>,
}

impl LegMatrix {
    /// Total cost of visiting packages in `order` (indices into the matrix)
    fn chain_cost(&self, order: &[usize]) -> (Distance, bool) {
        let mut total = 0.0;
        let mut estimated = false;
        let mut previous: Option<usize> = None;

        for &j in order {
            let approach = match previous {
                Some(i) => &self.between[i][j],
                None => &self.from_start[j],
            };
            total += approach.distance + self.delivery[j].distance;
            estimated |= approach.is_estimate() || self.delivery[j].is_estimate();
            previous = Some(j);
        }

        (total, estimated)
    }

    /// Index order with the lowest chain cost. Permutations are scanned in
    /// lexicographic order and only a strictly lower cost replaces the
    /// current best, so exact ties keep the smallest index sequence.
    fn cheapest_order(&self) -> Vec<usize> {
        let mut best_order: Vec<usize> = Vec::new();
        let mut min_distance = f64::INFINITY;

        for perm in generate_permutations((0..self.from_start.len()).collect()) {
            let (distance, _) = self.chain_cost(&perm);
            if distance < min_distance {
                min_distance = distance;
                best_order = perm;
            }
        }

        best_order
    }
}

/// Orders a selected package subset and materializes the delivery path
pub struct RouteOptimizer<'g> {
    finder: PathFinder<'g>,
    weights: ProfitWeights,
    exact_threshold: usize,
}

impl<'g> RouteOptimizer<'g> {
    pub fn new(finder: PathFinder<'g>, config: &PlannerConfig) -> Self {
        Self {
            finder,
            weights: config.weights(),
            exact_threshold: config.exact_order_threshold,
        }
    }

    pub fn exact_threshold(&self) -> usize {
        self.exact_threshold
    }

    fn leg_matrix(&self, packages: &[Package], start: &Location) -> PlannerResult<LegMatrix> {
        let dropoffs = packages
            .iter()
            .map(Package::require_dropoff)
            .collect::<PlannerResult<Vec<_>>>()?;

        let from_start = packages
            .iter()
            .map(|p| self.finder.travel_cost(start, &p.pickup()))
            .collect::<PlannerResult<Vec<_>>>()?;

        let delivery = packages
            .iter()
            .zip(&dropoffs)
            .map(|(p, dropoff)| self.finder.travel_cost(&p.pickup(), dropoff))
            .collect::<PlannerResult<Vec<_>>>()?;

        let between = dropoffs
            .par_iter()
            .map(|dropoff| {
                packages
                    .iter()
                    .map(|p| self.finder.travel_cost(dropoff, &p.pickup()))
                    .collect::<PlannerResult<Vec<_>>>()
            })
            .collect::<PlannerResult<Vec<_>>>()?;

        Ok(LegMatrix {
            from_start,
            delivery,
            between,
        })
    }

    /// Visiting order built by always heading to the nearest remaining
    /// pickup, with ties going to the lowest package id
    pub fn order_nearest_neighbor(
        &self,
        packages: &[Package],
        start: &Location,
    ) -> PlannerResult<DeliveryOrder> {
        let packages = sorted_by_id(packages);
        let matrix = self.leg_matrix(&packages, start)?;

        let mut remaining: Vec<usize> = (0..packages.len()).collect();
        let mut order: Vec<usize> = Vec::with_capacity(packages.len());

        while !remaining.is_empty() {
            let costs = match order.last() {
                Some(&i) => &matrix.between[i],
                None => &matrix.from_start,
            };

            let mut nearest = 0;
            for (slot, &j) in remaining.iter().enumerate() {
                if costs[j].distance < costs[remaining[nearest]].distance {
                    nearest = slot;
                }
            }
            order.push(remaining.remove(nearest));
        }

        Ok(into_order(&packages, &matrix, order))
    }

    /// Minimum-distance visiting order over every permutation
    ///
    /// Runs in O(n!) time. Callers are expected to keep `packages` within
    /// the vehicle capacity; larger inputs are searched anyway. Equal-cost
    /// orders resolve to the lexicographically smallest id sequence.
    pub fn order_exact(
        &self,
        packages: &[Package],
        start: &Location,
    ) -> PlannerResult<DeliveryOrder> {
        if packages.len() > self.exact_threshold {
            log::warn!(
                "Exact ordering of {} packages exceeds the threshold of {}",
                packages.len(),
                self.exact_threshold
            );
        }

        let packages = sorted_by_id(packages);
        let matrix = self.leg_matrix(&packages, start)?;

        // indices follow id order, so index ties are id ties
        let best_order = matrix.cheapest_order();
        Ok(into_order(&packages, &matrix, best_order))
    }

    /// Materializes the waypoint path for packages visited in the given
    /// order and computes the route metrics
    ///
    /// Every leg must have a road path; an unreachable leg fails with
    /// `PlannerError::NoPath` regardless of the straight-line fallback.
    pub fn evaluate(&self, packages_in_order: &[Package], start: &Location) -> PlannerResult<Route> {
        let mut waypoints: Vec<Location> = Vec::new();
        let mut total_distance = 0.0;
        let mut position = *start;

        for package in packages_in_order {
            let dropoff = package.require_dropoff()?;
            for target in [package.pickup(), dropoff] {
                let leg = self.finder.shortest_path(&position, &target)?;
                // consecutive legs share their junction node
                let skip = usize::from(!waypoints.is_empty());
                waypoints.extend(leg.waypoints.into_iter().skip(skip));
                total_distance += leg.distance;
                position = target;
            }
        }

        let route = Route::new(
            packages_in_order.to_vec(),
            waypoints,
            total_distance,
            &self.weights,
        );
        log::debug!(
            "Route {:?}: distance {:.2}, reward {:.2}, net profit {:.2}",
            route.package_ids(),
            route.total_distance,
            route.total_reward,
            route.net_profit
        );

        Ok(route)
    }

    /// Orders `packages` with the requested strategy and evaluates the result
    pub fn optimize_and_evaluate(
        &self,
        packages: &[Package],
        start: &Location,
        strategy: OrderStrategy,
    ) -> PlannerResult<Route> {
        let use_exact = match strategy {
            OrderStrategy::Exact => true,
            OrderStrategy::NearestNeighbor => false,
            OrderStrategy::Auto => packages.len() <= self.exact_threshold,
        };

        let order = if use_exact {
            self.order_exact(packages, start)?
        } else {
            self.order_nearest_neighbor(packages, start)?
        };

        if order.estimated {
            log::warn!(
                "Order {:?} was chosen using straight-line estimates",
                order.package_ids()
            );
        }

        self.evaluate(&order.packages, start)
    }
}

/// One planning cycle: greedy selection up to the vehicle capacity, then
/// automatic ordering and evaluation of the selected packages
pub fn plan_trip(
    graph: &SpatialGraph,
    packages: &[Package],
    start: &Location,
    config: &PlannerConfig,
) -> PlannerResult<Route> {
    let finder = PathFinder::from_config(graph, config);

    let mut selector = PackageSelector::new(finder, config);
    selector.load(packages.iter().cloned());
    let selected: Vec<Package> = selector
        .select_greedy(start, selector.capacity())
        .into_iter()
        .map(|scored| scored.package)
        .collect();

    RouteOptimizer::new(finder, config).optimize_and_evaluate(&selected, start, OrderStrategy::Auto)
}

fn sorted_by_id(packages: &[Package]) -> Vec<Package> {
    let mut sorted = packages.to_vec();
    sorted.sort_by_key(|p| p.id());
    sorted
}

fn into_order(packages: &[Package], matrix: &LegMatrix, order: Vec<usize>) -> DeliveryOrder {
    let (total_distance, estimated) = matrix.chain_cost(&order);
    DeliveryOrder {
        packages: order.into_iter().map(|i| packages[i].clone()).collect(),
        total_distance,
        estimated,
    }
}

/// All permutations of `items`, in lexicographic order when `items` is sorted
fn generate_permutations(items: Vec<usize>) -> Vec<Vec<usize>> {
    if items.is_empty() {
        return vec![vec![]];
    }

    let mut result = Vec::new();

    for (i, &item) in items.iter().enumerate() {
        let mut remaining = items.clone();
        remaining.remove(i);

        for mut perm in generate_permutations(remaining) {
            perm.insert(0, item);
            result.push(perm);
        }
    }

    result
}
