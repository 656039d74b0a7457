// Distance and extent helpers on top of geo

use geo::{BoundingRect, EuclideanLength, LineString, MultiPoint};

use crate::models::Location;

/// Straight-line length of a waypoint path
pub fn path_length(waypoints: &[Location]) -> f64 {
    let line: LineString<f64> = waypoints.iter().map(|l| (l.x, l.y)).collect();
    line.euclidean_length()
}

/// Smallest axis-aligned box containing every location, as (min, max)
pub fn bounding_box<'a>(
    locations: impl IntoIterator<Item = &'a Location>,
) -> Option<(Location, Location)> {
    let points: MultiPoint<f64> = locations
        .into_iter()
        .map(|l| l.to_point())
        .collect::<Vec<_>>()
        .into();
    let rect = points.bounding_rect()?;

    Some((
        Location::new(rect.min().x, rect.min().y),
        Location::new(rect.max().x, rect.max().y),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_length() {
        let path = [
            Location::new(0.0, 0.0),
            Location::new(3.0, 4.0),
            Location::new(3.0, 10.0),
        ];
        assert!((path_length(&path) - 11.0).abs() < 1e-12);
        assert_eq!(path_length(&path[..1]), 0.0);
        assert_eq!(path_length(&[]), 0.0);
    }

    #[test]
    fn test_bounding_box() {
        let points = [
            Location::new(5.0, -1.0),
            Location::new(-2.0, 3.0),
            Location::new(1.0, 8.0),
        ];
        let (min, max) = bounding_box(&points).unwrap();
        assert_eq!(min, Location::new(-2.0, -1.0));
        assert_eq!(max, Location::new(5.0, 8.0));

        assert!(bounding_box(&[]).is_none());
    }
}
