use std::fs;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::PlannerResult;
use crate::models::{Location, Package, PackageId, PackageSnapshot, RoadNetworkSnapshot, StreetSegment};

// Load a road network snapshot from a JSON file
pub fn load_road_network(path: impl AsRef<Path>) -> PlannerResult<RoadNetworkSnapshot> {
    let json = fs::read_to_string(path.as_ref())?;
    let snapshot: RoadNetworkSnapshot = serde_json::from_str(&json)?;

    log::info!(
        "Loaded {} road points and {} streets from {}",
        snapshot.points.len(),
        snapshot.streets.len(),
        path.as_ref().display()
    );

    Ok(snapshot)
}

// Load a package snapshot (id -> package info) from a JSON file
pub fn load_packages(path: impl AsRef<Path>) -> PlannerResult<Vec<Package>> {
    let json = fs::read_to_string(path.as_ref())?;
    let snapshot: PackageSnapshot = serde_json::from_str(&json)?;
    let packages = snapshot.into_packages()?;

    log::info!(
        "Loaded {} packages from {}",
        packages.len(),
        path.as_ref().display()
    );

    Ok(packages)
}

/// Grid of `rows` x `cols` road points `spacing` apart, each linked to its
/// right and upper neighbour. Points are numbered row by row from (0, 0).
pub fn generate_grid_network(rows: usize, cols: usize, spacing: f64) -> RoadNetworkSnapshot {
    let at = |row: usize, col: usize| Location::new(col as f64 * spacing, row as f64 * spacing);

    let mut points = Vec::with_capacity(rows * cols);
    let mut streets = Vec::new();

    for row in 0..rows {
        for col in 0..cols {
            points.push(at(row, col));
            if col + 1 < cols {
                streets.push(StreetSegment::new(at(row, col), at(row, col + 1)));
            }
            if row + 1 < rows {
                streets.push(StreetSegment::new(at(row, col), at(row + 1, col)));
            }
        }
    }

    RoadNetworkSnapshot { points, streets }
}

/// Connected random road network inside a square of side `extent`
///
/// Each point after the first is linked to a random earlier point, so the
/// network is connected; `extra_streets` further random links add cycles.
pub fn generate_random_network<R: Rng>(
    point_count: usize,
    extra_streets: usize,
    extent: f64,
    rng: &mut R,
) -> RoadNetworkSnapshot {
    let points: Vec<Location> = (0..point_count)
        .map(|_| Location::new(rng.gen_range(0.0..extent), rng.gen_range(0.0..extent)))
        .collect();

    let mut streets = Vec::with_capacity(point_count + extra_streets);
    for i in 1..point_count {
        let j = rng.gen_range(0..i);
        streets.push(StreetSegment::new(points[j], points[i]));
    }

    if point_count > 1 {
        for _ in 0..extra_streets {
            let a = rng.gen_range(0..point_count);
            let b = rng.gen_range(0..point_count);
            if a != b {
                streets.push(StreetSegment::new(points[a], points[b]));
            }
        }
    }

    RoadNetworkSnapshot { points, streets }
}

/// Packages with pickups and drop-offs on random road points, numbered from 1
pub fn generate_packages<R: Rng>(
    count: usize,
    road: &RoadNetworkSnapshot,
    reward_range: (f64, f64),
    rng: &mut R,
) -> PlannerResult<Vec<Package>> {
    let mut packages = Vec::with_capacity(count);
    if road.points.is_empty() {
        return Ok(packages);
    }

    let (low, high) = reward_range;
    for id in 1..=count {
        let (Some(pickup), Some(dropoff)) = (road.points.choose(rng), road.points.choose(rng))
        else {
            break;
        };
        let reward = if high > low { rng.gen_range(low..high) } else { low };
        packages.push(Package::new(id as PackageId, *pickup, Some(*dropoff), reward)?);
    }

    Ok(packages)
}
