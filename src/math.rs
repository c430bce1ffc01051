//! Mathematical utilities and nalgebra extensions for frame alignment

use core::f64::consts::PI;
use nalgebra::{Quaternion, UnitQuaternion, Vector3};

/// Mathematical constants
pub const DEG_TO_RAD: f64 = PI / 180.0;
pub const RAD_TO_DEG: f64 = 180.0 / PI;

/// Norm below which a vector or quaternion is treated as degenerate
pub const MIN_NORM: f64 = 1e-9;

/// Wrap an angle in radians into the interval (-π, π]
///
/// Only a single 2π correction is applied, which is enough for angles
/// produced by `atan2` plus a declination or by the circular mean.
pub fn wrap_to_pi(angle: f64) -> f64 {
    if angle > PI {
        angle - 2.0 * PI
    } else if angle <= -PI {
        angle + 2.0 * PI
    } else {
        angle
    }
}

/// Extension trait for Vector3 operations
pub trait Vector3Ext {
    /// Normalize the vector, returning `None` if its norm is below [`MIN_NORM`]
    /// or not finite
    fn checked_normalize(&self) -> Option<Vector3<f64>>;

    /// Convert radians to degrees
    fn rad_to_deg(&self) -> Vector3<f64>;
}

impl Vector3Ext for Vector3<f64> {
    fn checked_normalize(&self) -> Option<Vector3<f64>> {
        // NaN norms never compare below the threshold
        let norm = self.norm();
        if norm.is_finite() && norm > MIN_NORM {
            Some(self / norm)
        } else {
            None
        }
    }

    fn rad_to_deg(&self) -> Vector3<f64> {
        *self * RAD_TO_DEG
    }
}

/// Extension trait for UnitQuaternion operations
pub trait QuaternionExt {
    /// Convert quaternion to Euler angles (roll, pitch, yaw) in radians, Z-Y-X order
    fn to_euler(&self) -> Vector3<f64>;

    /// Convert quaternion to Euler angles in degrees
    fn to_euler_degrees(&self) -> Vector3<f64>;

    /// Pure rotation about the vertical axis (roll = pitch = 0)
    fn from_yaw(yaw: f64) -> UnitQuaternion<f64>;

    /// Normalize an externally sourced quaternion, rejecting near-zero norms
    fn try_from_raw(quaternion: Quaternion<f64>) -> Option<UnitQuaternion<f64>>;

    /// Components in `[x, y, z, w]` order
    fn to_xyzw(&self) -> [f64; 4];
}

impl QuaternionExt for UnitQuaternion<f64> {
    fn to_euler(&self) -> Vector3<f64> {
        let (roll, pitch, yaw) = self.euler_angles();
        Vector3::new(roll, pitch, yaw)
    }

    fn to_euler_degrees(&self) -> Vector3<f64> {
        self.to_euler().rad_to_deg()
    }

    fn from_yaw(yaw: f64) -> UnitQuaternion<f64> {
        UnitQuaternion::from_euler_angles(0.0, 0.0, yaw)
    }

    fn try_from_raw(quaternion: Quaternion<f64>) -> Option<UnitQuaternion<f64>> {
        UnitQuaternion::try_new(quaternion, MIN_NORM)
    }

    fn to_xyzw(&self) -> [f64; 4] {
        let q = self.as_ref();
        [q.i, q.j, q.k, q.w]
    }
}
