//! # Mechanisms Equipment Commands
//!
//! Joint demands sent to the actuation layer and the contact data received from it.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of legs on the robot.
pub const NUM_LEGS: usize = 4;

/// Number of joints in each leg.
pub const NUM_JOINTS_PER_LEG: usize = 3;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Joint position demands for every leg.
///
/// Indexed first by leg (in `LegId` order) and then by joint, in the order
/// (abduction, hip, knee).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct JointDems {
    /// Units: radians
    pub pos_rad: [[f64; NUM_JOINTS_PER_LEG]; NUM_LEGS],
}

/// Foot contact flags reported by the actuation layer (or a simulation).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct ContactData {
    /// True if the foot of the leg is touching the ground, in `LegId` order.
    pub in_contact: [bool; NUM_LEGS],
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Identifiers of each leg, in the fixed index order used by every per-leg array.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum LegId {
    FrontLeft,
    FrontRight,
    BackLeft,
    BackRight,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl LegId {
    /// All legs in index order.
    pub const ALL: [LegId; NUM_LEGS] = [
        LegId::FrontLeft,
        LegId::FrontRight,
        LegId::BackLeft,
        LegId::BackRight,
    ];

    /// Index of the leg in per-leg arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Get the leg at the given index, or `None` if out of range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Right-hand legs are mirrored about the body's sagittal plane.
    pub fn is_right(self) -> bool {
        self.index() % 2 == 1
    }
}

impl Default for LegId {
    fn default() -> Self {
        LegId::FrontLeft
    }
}

impl JointDems {
    /// Flatten the demands into a single actuation vector, leg by leg.
    pub fn to_flat(&self) -> [f64; NUM_LEGS * NUM_JOINTS_PER_LEG] {
        let mut flat = [0f64; NUM_LEGS * NUM_JOINTS_PER_LEG];

        for (i, leg) in self.pos_rad.iter().enumerate() {
            flat[i * NUM_JOINTS_PER_LEG..(i + 1) * NUM_JOINTS_PER_LEG].copy_from_slice(leg);
        }

        flat
    }

    /// Get the demands for a single leg.
    pub fn leg(&self, leg: LegId) -> [f64; NUM_JOINTS_PER_LEG] {
        self.pos_rad[leg.index()]
    }

    /// Returns true if every demand is a finite number.
    pub fn is_finite(&self) -> bool {
        self.pos_rad.iter().flatten().all(|p| p.is_finite())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_leg_id() {
        assert_eq!(LegId::BackLeft.index(), 2);
        assert_eq!(LegId::from_index(3), Some(LegId::BackRight));
        assert_eq!(LegId::from_index(4), None);
        assert!(LegId::FrontRight.is_right());
        assert!(!LegId::BackLeft.is_right());
    }

    #[test]
    fn test_to_flat() {
        let dems = JointDems {
            pos_rad: [
                [0.0, 0.1, 0.2],
                [1.0, 1.1, 1.2],
                [2.0, 2.1, 2.2],
                [3.0, 3.1, 3.2],
            ],
        };

        let flat = dems.to_flat();
        assert_eq!(flat[0], 0.0);
        assert_eq!(flat[4], 1.1);
        assert_eq!(flat[11], 3.2);
        assert_eq!(dems.leg(LegId::BackLeft), [2.0, 2.1, 2.2]);
        assert!(dems.is_finite());
    }
}
