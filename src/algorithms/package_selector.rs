use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use rayon::prelude::*;

use crate::algorithms::path_finder::{CostSource, PathFinder};
use crate::config::{PlannerConfig, ProfitWeights};
use crate::error::{PlannerError, PlannerResult};
use crate::models::{Distance, Location, Package, PackageId};

/// At or below this many undelivered packages, adaptive selection stays greedy
pub const ADAPTIVE_GREEDY_LIMIT: usize = 5;

/// Seconds left below which adaptive selection switches to profit density
pub const ADAPTIVE_TIME_THRESHOLD: f64 = 60.0;

/// A candidate package with its estimated cost and profit from a position
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPackage {
    pub package: Package,

    /// position -> pickup -> drop-off travel distance
    pub distance: Distance,

    pub profit: f64,

    /// `StraightLine` when any leg had no road path and was estimated
    pub cost_source: CostSource,
}

impl ScoredPackage {
    pub fn is_estimate(&self) -> bool {
        self.cost_source == CostSource::StraightLine
    }
}

/// Chooses profitable packages for the next trip
///
/// "Nothing worth taking" is a normal outcome here, so the selection
/// methods return empty results instead of errors. Packages whose cost
/// cannot be computed are logged and left out.
pub struct PackageSelector<'g> {
    finder: PathFinder<'g>,
    weights: ProfitWeights,
    capacity: usize,
    density_radius: f64,

    /// Working set of undelivered packages, sorted by id
    packages: Vec<Package>,
}

impl<'g> PackageSelector<'g> {
    pub fn new(finder: PathFinder<'g>, config: &PlannerConfig) -> Self {
        Self {
            finder,
            weights: config.weights(),
            capacity: config.max_packages_per_trip,
            density_radius: config.density_radius,
            packages: Vec::new(),
        }
    }

    /// Replaces the working set. Delivered packages are dropped; a repeated
    /// id keeps its last occurrence.
    pub fn load(&mut self, packages: impl IntoIterator<Item = Package>) {
        let by_id: BTreeMap<PackageId, Package> = packages
            .into_iter()
            .filter(|p| !p.is_delivered())
            .map(|p| (p.id(), p))
            .collect();
        let working: Vec<Package> = by_id.into_values().collect();

        log::info!(
            "Loaded {} undelivered packages ({} with known drop-off)",
            working.len(),
            working.iter().filter(|p| p.is_plannable()).count()
        );
        self.packages = working;
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// Vehicle capacity, the default `max_count` for multi-package selection
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Profit of carrying `package` from `from`: reward minus the weighted
    /// cost of from -> pickup -> drop-off
    pub fn score(&self, package: &Package, from: &Location) -> PlannerResult<ScoredPackage> {
        let dropoff = package.require_dropoff()?;
        let to_pickup = self.finder.travel_cost(from, &package.pickup())?;
        let delivery = self.finder.travel_cost(&package.pickup(), &dropoff)?;

        let distance = to_pickup.distance + delivery.distance;
        let cost_source = if to_pickup.is_estimate() || delivery.is_estimate() {
            CostSource::StraightLine
        } else {
            CostSource::Graph
        };

        Ok(ScoredPackage {
            package: package.clone(),
            distance,
            profit: self.weights.profit(package.reward(), distance),
            cost_source,
        })
    }

    /// Scores every plannable package not in `excluded`, in id order
    fn score_candidates(&self, from: &Location, excluded: &HashSet<PackageId>) -> Vec<ScoredPackage> {
        let results: Vec<(PackageId, PlannerResult<ScoredPackage>)> = self
            .packages
            .par_iter()
            .filter(|p| p.is_plannable() && !excluded.contains(&p.id()))
            .map(|p| (p.id(), self.score(p, from)))
            .collect();

        results
            .into_iter()
            .filter_map(|(id, result)| match result {
                Ok(scored) => Some(scored),
                Err(err) => {
                    log_excluded(id, &err);
                    None
                }
            })
            .collect()
    }

    /// The single most profitable package from `current`, if any package
    /// has non-negative profit. Ties go to the lowest id.
    pub fn select_best(&self, current: &Location) -> Option<ScoredPackage> {
        best_of(self.score_candidates(current, &HashSet::new()), |s| s.profit >= 0.0)
    }

    /// Greedily grows a selection of up to `max_count` packages
    ///
    /// After each pick the reference position moves to that package's
    /// drop-off, so later picks are scored on the leg they would really
    /// add. Stops as soon as no remaining package has positive marginal
    /// profit.
    pub fn select_greedy(&self, current: &Location, max_count: usize) -> Vec<ScoredPackage> {
        let mut selected: Vec<ScoredPackage> = Vec::new();
        let mut chosen: HashSet<PackageId> = HashSet::new();
        let mut position = *current;

        while selected.len() < max_count {
            let next = match best_of(self.score_candidates(&position, &chosen), |s| {
                s.profit > 0.0
            }) {
                Some(next) => next,
                None => break,
            };

            log::debug!(
                "Greedy pick {}: package {} with marginal profit {:.2}",
                selected.len() + 1,
                next.package.id(),
                next.profit
            );

            // candidates always have a drop-off
            position = next.package.dropoff().unwrap_or(next.package.pickup());
            chosen.insert(next.package.id());
            selected.push(next);
        }

        selected
    }

    /// Packages from the densest pickup cluster near `current`
    ///
    /// Clusters link pickups closer than the configured radius. The cluster
    /// with the most members wins, then the one with the highest total
    /// reward, then the one closest to `current`. Up to `max_count` members
    /// that can be scored are taken, nearest pickup first; members without a
    /// road cost are skipped rather than counted. If the group as a whole
    /// would not turn a profit, this falls back to `select_best`.
    pub fn select_by_density(&self, current: &Location, max_count: usize) -> Vec<ScoredPackage> {
        if max_count == 0 {
            return Vec::new();
        }

        let candidates: Vec<&Package> = self.packages.iter().filter(|p| p.is_plannable()).collect();
        let clusters = cluster_by_pickup(&candidates, self.density_radius);

        let best_cluster = clusters
            .into_iter()
            .map(|members| ClusterRank::new(members, current))
            .min_by(ClusterRank::compare);

        let Some(cluster) = best_cluster else {
            return Vec::new();
        };

        let mut members = cluster.members;
        members.sort_by(|a, b| {
            a.pickup()
                .distance_to(current)
                .total_cmp(&b.pickup().distance_to(current))
                .then(a.id().cmp(&b.id()))
        });

        let group: Vec<ScoredPackage> = members
            .into_iter()
            .filter_map(|p| self.score_logged(p, current))
            .take(max_count)
            .collect();

        let group_profit: f64 = group.iter().map(|s| s.profit).sum();
        if !group.is_empty() && group_profit > 0.0 {
            log::debug!(
                "Density pick: {} packages with combined profit {:.2}",
                group.len(),
                group_profit
            );
            group
        } else {
            log::debug!("Densest cluster is not profitable, falling back to single best");
            self.select_best(current).into_iter().collect()
        }
    }

    /// Up to `max_count` profitable packages ranked by profit per unit of
    /// distance travelled
    pub fn select_by_profit_density(
        &self,
        current: &Location,
        max_count: usize,
    ) -> Vec<ScoredPackage> {
        let mut ranked: Vec<(f64, ScoredPackage)> = self
            .score_candidates(current, &HashSet::new())
            .into_iter()
            .filter(|s| s.profit > 0.0)
            .map(|s| {
                let density = if s.distance > 0.0 {
                    s.profit / s.distance
                } else {
                    s.profit
                };
                (density, s)
            })
            .collect();

        ranked.sort_by(|(da, a), (db, b)| db.total_cmp(da).then(a.package.id().cmp(&b.package.id())));
        ranked.into_iter().take(max_count).map(|(_, s)| s).collect()
    }

    /// Picks the pickup cluster with the highest total profit, then its most
    /// profitable members
    ///
    /// Cluster profit sums the positive member profits; ties go to the
    /// cluster holding the lowest id. Members are returned by profit, highest
    /// first, and only if individually profitable.
    pub fn select_two_phase(&self, current: &Location, max_count: usize) -> Vec<ScoredPackage> {
        if max_count == 0 {
            return Vec::new();
        }

        let candidates: Vec<&Package> = self.packages.iter().filter(|p| p.is_plannable()).collect();
        let mut best: Option<(f64, Vec<ScoredPackage>)> = None;

        for members in cluster_by_pickup(&candidates, self.density_radius) {
            let scored: Vec<ScoredPackage> = members
                .into_iter()
                .filter_map(|p| self.score_logged(p, current))
                .filter(|s| s.profit > 0.0)
                .collect();
            if scored.is_empty() {
                continue;
            }

            let total: f64 = scored.iter().map(|s| s.profit).sum();
            if best.as_ref().map_or(true, |(b, _)| total > *b) {
                best = Some((total, scored));
            }
        }

        let Some((total, mut scored)) = best else {
            return Vec::new();
        };
        log::debug!(
            "Two-phase pick: cluster of {} with total profit {:.2}",
            scored.len(),
            total
        );

        scored.sort_by(|a, b| {
            b.profit
                .total_cmp(&a.profit)
                .then(a.package.id().cmp(&b.package.id()))
        });
        scored.truncate(max_count);
        scored
    }

    /// Chooses a strategy from the state of the working set
    ///
    /// With few undelivered packages left this is `select_greedy`. Otherwise
    /// `select_two_phase` runs while time is plentiful (or unbounded), and
    /// `select_by_profit_density` once fewer than
    /// [`ADAPTIVE_TIME_THRESHOLD`] seconds remain.
    pub fn select_adaptive(
        &self,
        current: &Location,
        max_count: usize,
        time_remaining: Option<f64>,
    ) -> Vec<ScoredPackage> {
        let undelivered = self.packages.iter().filter(|p| !p.is_delivered()).count();

        if undelivered <= ADAPTIVE_GREEDY_LIMIT {
            log::debug!("Adaptive: {} packages left, selecting greedily", undelivered);
            return self.select_greedy(current, max_count);
        }

        match time_remaining {
            Some(seconds) if seconds <= ADAPTIVE_TIME_THRESHOLD => {
                log::debug!("Adaptive: {:.0}s left, selecting by profit density", seconds);
                self.select_by_profit_density(current, max_count)
            }
            _ => self.select_two_phase(current, max_count),
        }
    }

    fn score_logged(&self, package: &Package, from: &Location) -> Option<ScoredPackage> {
        match self.score(package, from) {
            Ok(scored) => Some(scored),
            Err(err) => {
                log_excluded(package.id(), &err);
                None
            }
        }
    }
}

/// Highest profit among `scored` passing `accept`; input is in id order so
/// the first maximum is the lowest id
fn best_of<F>(scored: Vec<ScoredPackage>, accept: F) -> Option<ScoredPackage>
where
    F: Fn(&ScoredPackage) -> bool,
{
    let mut best: Option<ScoredPackage> = None;
    for candidate in scored.into_iter().filter(|s| accept(s)) {
        if best.as_ref().map_or(true, |b| candidate.profit > b.profit) {
            best = Some(candidate);
        }
    }
    best
}

fn log_excluded(id: PackageId, err: &PlannerError) {
    if err.is_unreachable() {
        log::debug!("Package {} is currently unreachable: {}", id, err);
    } else {
        log::warn!("Package {} excluded from selection: {}", id, err);
    }
}

/// Single-linkage clusters of packages whose pickups are closer than
/// `radius`, each cluster in id order
fn cluster_by_pickup<'a>(packages: &[&'a Package], radius: f64) -> Vec<Vec<&'a Package>> {
    let mut assigned = vec![false; packages.len()];
    let mut clusters = Vec::new();

    for seed in 0..packages.len() {
        if assigned[seed] {
            continue;
        }
        assigned[seed] = true;

        let mut members = vec![seed];
        let mut stack = vec![seed];
        while let Some(i) = stack.pop() {
            for j in 0..packages.len() {
                if !assigned[j] && packages[i].pickup().distance_to(&packages[j].pickup()) < radius {
                    assigned[j] = true;
                    members.push(j);
                    stack.push(j);
                }
            }
        }

        members.sort_unstable();
        clusters.push(members.into_iter().map(|i| packages[i]).collect());
    }

    clusters
}

struct ClusterRank<'a> {
    members: Vec<&'a Package>,
    total_reward: f64,
    proximity: f64,
}

impl<'a> ClusterRank<'a> {
    fn new(members: Vec<&'a Package>, current: &Location) -> Self {
        let total_reward = members.iter().map(|p| p.reward()).sum();
        let proximity = members
            .iter()
            .map(|p| p.pickup().distance_to(current))
            .fold(f64::INFINITY, f64::min);

        Self {
            members,
            total_reward,
            proximity,
        }
    }

    /// Orders better clusters first
    fn compare(a: &Self, b: &Self) -> Ordering {
        b.members
            .len()
            .cmp(&a.members.len())
            .then(b.total_reward.total_cmp(&a.total_reward))
            .then(a.proximity.total_cmp(&b.proximity))
            .then(a.members[0].id().cmp(&b.members[0].id()))
    }
}
