//! Frame transformations between the world, body and leg frames

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Isometry3, Matrix3, Point3, Rotation3, Translation3, UnitQuaternion, Vector3};

use super::{BodyPose, KinConfig, LegId};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Transform from the body frame into the world frame.
///
/// The body is rotated by `Rz(psi)·Ry(phi)·Rx(omega)` about the pivot, then
/// translated by `(xm, ym, zm)`.
pub fn body_transform(pose: &BodyPose) -> Isometry3<f64> {
    let rot = UnitQuaternion::from_euler_angles(pose.omega, pose.phi, pose.psi);
    let trans = Vector3::new(pose.xm, pose.ym, pose.zm) + pose.pivot - rot * pose.pivot;

    Isometry3::from_parts(Translation3::from(trans), rot)
}

/// Express a world frame foot position in the local frame of the given leg.
pub fn world_to_leg(
    kin: &KinConfig,
    body_to_world: &Isometry3<f64>,
    leg: LegId,
    foot: &Vector3<f64>,
) -> Vector3<f64> {
    let foot_b = body_to_world.inverse_transform_point(&Point3::from(*foot));
    let mut local = body_to_leg_rot() * (foot_b.coords - kin.mount_offset(leg));

    if leg.is_right() {
        local.x = -local.x;
    }

    local
}

/// Express a position in the local frame of the given leg in the world frame.
pub fn leg_to_world(
    kin: &KinConfig,
    body_to_world: &Isometry3<f64>,
    leg: LegId,
    local: &Vector3<f64>,
) -> Vector3<f64> {
    let mut local = *local;
    if leg.is_right() {
        local.x = -local.x;
    }

    let foot_b = body_to_leg_rot().transpose() * local + kin.mount_offset(leg);

    body_to_world.transform_point(&Point3::from(foot_b)).coords
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Rotation from the body frame into the (unmirrored) leg frame, which has
/// `x` pointing outwards to the right, `y` up and `z` forwards.
fn body_to_leg_rot() -> Rotation3<f64> {
    Rotation3::from_matrix_unchecked(Matrix3::new(
        0.0, 0.0, -1.0,
        0.0, 1.0, 0.0,
        1.0, 0.0, 0.0,
    ))
}
