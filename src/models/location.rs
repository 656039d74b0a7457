// Location model representing coordinates in 2D space

use geo::{EuclideanDistance, Point};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a location with (x, y) coordinates
///
/// Serialized as a two-element `[x, y]` array, which is how road points,
/// package positions and waypoints travel over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    /// Creates a new location with the given coordinates
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculates the Euclidean distance between two locations
    pub fn distance_to(&self, other: &Location) -> f64 {
        self.to_point().euclidean_distance(&other.to_point())
    }

    pub fn to_point(self) -> Point<f64> {
        Point::new(self.x, self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Location {
    fn from(value: [f64; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<Location> for [f64; 2] {
    fn from(value: Location) -> Self {
        [value.x, value.y]
    }
}

impl From<(f64, f64)> for Location {
    fn from(value: (f64, f64)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let loc1 = Location::new(0.0, 0.0);
        let loc2 = Location::new(3.0, 4.0);

        assert_eq!(loc1.distance_to(&loc2), 5.0);
    }

    #[test]
    fn test_serde_as_pair() {
        let loc: Location = serde_json::from_str("[10.5, -2.0]").unwrap();
        assert_eq!(loc, Location::new(10.5, -2.0));
        assert_eq!(serde_json::to_string(&loc).unwrap(), "[10.5,-2.0]");
    }

    #[test]
    fn test_finite() {
        assert!(Location::new(1.0, 2.0).is_finite());
        assert!(!Location::new(f64::NAN, 2.0).is_finite());
    }
}
