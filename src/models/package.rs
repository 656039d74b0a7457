// Package model representing a pickup/drop-off delivery job

use crate::error::{PlannerError, PlannerResult};
use crate::models::{Location, PackageId, Reward};

/// Reward assumed when the package snapshot does not carry one
pub const DEFAULT_REWARD: Reward = 1.0;

/// Represents a package waiting to be carried from its pickup to its drop-off
///
/// Fields are read through accessors so a package always holds the values
/// `Package::new` validated:
///
/// ```compile_fail
/// use delivery_planner::models::{Location, Package};
///
/// let mut package = Package::new(1, Location::new(0.0, 0.0), None, 5.0).unwrap();
/// package.reward = f64::NAN;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    /// Unique identifier for the package
    id: PackageId,

    /// Where the package is collected
    pickup: Location,

    /// Where the package must be delivered; unknown until revealed
    dropoff: Option<Location>,

    /// Reward paid on delivery
    reward: Reward,

    delivered: bool,
}

impl Package {
    /// Creates a new undelivered package, validating coordinates and reward
    pub fn new(
        id: PackageId,
        pickup: Location,
        dropoff: Option<Location>,
        reward: Reward,
    ) -> PlannerResult<Self> {
        if !pickup.is_finite() {
            return Err(invalid(id, "pickup position is not finite"));
        }
        if dropoff.map_or(false, |d| !d.is_finite()) {
            return Err(invalid(id, "drop-off position is not finite"));
        }
        if !reward.is_finite() {
            return Err(invalid(id, "reward is not finite"));
        }

        Ok(Self {
            id,
            pickup,
            dropoff,
            reward,
            delivered: false,
        })
    }

    /// Creates a package with the default reward
    pub fn with_default_reward(
        id: PackageId,
        pickup: Location,
        dropoff: Option<Location>,
    ) -> PlannerResult<Self> {
        Self::new(id, pickup, dropoff, DEFAULT_REWARD)
    }

    pub fn id(&self) -> PackageId {
        self.id
    }

    pub fn pickup(&self) -> Location {
        self.pickup
    }

    pub fn dropoff(&self) -> Option<Location> {
        self.dropoff
    }

    pub fn reward(&self) -> Reward {
        self.reward
    }

    pub fn is_delivered(&self) -> bool {
        self.delivered
    }

    /// Records a confirmed delivery. Returns false if it was already recorded.
    pub fn mark_delivered(&mut self) -> bool {
        if self.delivered {
            return false;
        }
        self.delivered = true;
        true
    }

    /// A package can be planned once its drop-off is known and it has not
    /// been delivered yet
    pub fn is_plannable(&self) -> bool {
        !self.delivered && self.dropoff.is_some()
    }

    /// Drop-off position, or an error naming the package when it is unknown
    pub fn require_dropoff(&self) -> PlannerResult<Location> {
        self.dropoff
            .ok_or_else(|| invalid(self.id, "drop-off position not revealed yet"))
    }
}

fn invalid(id: PackageId, reason: &str) -> PlannerError {
    PlannerError::InvalidPackage {
        id,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_creation() {
        let package = Package::with_default_reward(
            4,
            Location::new(1.0, 1.0),
            Some(Location::new(5.0, 1.0)),
        )
        .unwrap();
        assert_eq!(package.id(), 4);
        assert_eq!(package.reward(), DEFAULT_REWARD);
        assert!(!package.is_delivered());
        assert!(package.is_plannable());
    }

    #[test]
    fn test_accessors_return_validated_values() {
        let package = Package::new(
            11,
            Location::new(2.0, 3.0),
            Some(Location::new(7.0, 3.0)),
            12.5,
        )
        .unwrap();
        assert_eq!(package.id(), 11);
        assert_eq!(package.pickup(), Location::new(2.0, 3.0));
        assert_eq!(package.dropoff(), Some(Location::new(7.0, 3.0)));
        assert_eq!(package.reward(), 12.5);
    }

    #[test]
    fn test_package_validation() {
        assert!(Package::new(1, Location::new(f64::NAN, 0.0), None, 1.0).is_err());
        assert!(Package::new(1, Location::new(0.0, 0.0), None, f64::INFINITY).is_err());
        assert!(Package::new(
            1,
            Location::new(0.0, 0.0),
            Some(Location::new(0.0, f64::INFINITY)),
            1.0
        )
        .is_err());
    }

    #[test]
    fn test_mark_delivered_once() {
        let mut package =
            Package::new(2, Location::new(0.0, 0.0), Some(Location::new(1.0, 0.0)), 3.0).unwrap();
        assert!(package.mark_delivered());
        assert!(!package.mark_delivered());
        assert!(package.is_delivered());
        assert!(!package.is_plannable());
    }

    #[test]
    fn test_unknown_dropoff() {
        let package = Package::new(9, Location::new(0.0, 0.0), None, 3.0).unwrap();
        assert!(!package.is_plannable());
        assert!(matches!(
            package.require_dropoff(),
            Err(PlannerError::InvalidPackage { id: 9, .. })
        ));
    }
}
