//! Static transform description for visualising the aligned frames
//!
//! After a reset the aligner can write a launch file with one
//! `static_transform_publisher` node per frame pair, so the ENU frame, the
//! vehicle IMU and the estimator IMU can be inspected side by side.

use crate::error::Result;
use crate::math::QuaternionExt;
use crate::types::Pose;
use core::fmt;
use nalgebra::{UnitQuaternion, Vector3};
use std::path::Path;

pub const ENU_FRAME: &str = "enu";
pub const MAV_IMU_FRAME: &str = "mav_imu";
pub const SENSOR_IMU_FRAME: &str = "sensor_imu_rovio";
pub const SENSOR_IMU_CHECK_FRAME: &str = "sensor_imu_check";

/// Publishing period passed to each static publisher, in milliseconds
const PUBLISH_PERIOD_MS: u32 = 100;

/// One parent-to-child transform
#[derive(Debug, Clone, PartialEq)]
pub struct StaticTransform {
    pub parent: &'static str,
    pub child: &'static str,
    pub pose: Pose,
}

impl fmt::Display for StaticTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.pose.position;
        let [qx, qy, qz, qw] = self.pose.orientation.to_xyzw();
        write!(
            f,
            "<node name=\"{parent}_to_{child}_boadcaster\" pkg=\"tf\" type=\"static_transform_publisher\" \
             args=\" {:.4} {:.4} {:.4} {:.6} {:.6} {:.6} {:.6} {parent} {child} {period}\" />",
            p.x,
            p.y,
            p.z,
            qx,
            qy,
            qz,
            qw,
            parent = self.parent,
            child = self.child,
            period = PUBLISH_PERIOD_MS,
        )
    }
}

/// The three transforms describing an alignment
///
/// - ENU to estimator IMU: the pose sent with the reset
/// - ENU to vehicle IMU: the orientation sample, at the ENU origin
/// - vehicle IMU to estimator IMU: the fixed extrinsic, which should land on
///   top of the first one
pub fn frame_transforms(
    reset_pose: &Pose,
    q_enu_i: UnitQuaternion<f64>,
    extrinsic: &Pose,
) -> [StaticTransform; 3] {
    [
        StaticTransform {
            parent: ENU_FRAME,
            child: SENSOR_IMU_FRAME,
            pose: *reset_pose,
        },
        StaticTransform {
            parent: ENU_FRAME,
            child: MAV_IMU_FRAME,
            pose: Pose::new(Vector3::zeros(), q_enu_i),
        },
        StaticTransform {
            parent: MAV_IMU_FRAME,
            child: SENSOR_IMU_CHECK_FRAME,
            pose: *extrinsic,
        },
    ]
}

/// Render transforms as a launch document
pub fn render_launch(transforms: &[StaticTransform]) -> String {
    let mut document = String::from("<?xml version=\"1.0\"?> \n<launch> \n \n");
    for transform in transforms {
        document.push_str(&transform.to_string());
        document.push('\n');
    }
    document.push_str("\n</launch> \n\n");
    document
}

/// Write the launch document to `path`, replacing any previous file
///
/// # Arguments
/// * `path` - Destination launch file
/// * `transforms` - Nodes to write, usually from [`frame_transforms`]
pub fn write_launch_file(path: &Path, transforms: &[StaticTransform]) -> Result<()> {
    std::fs::write(path, render_launch(transforms))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_formatting() {
        let transform = StaticTransform {
            parent: ENU_FRAME,
            child: MAV_IMU_FRAME,
            pose: Pose::new(Vector3::new(1.0, -0.5, 0.25), UnitQuaternion::identity()),
        };

        assert_eq!(
            transform.to_string(),
            "<node name=\"enu_to_mav_imu_boadcaster\" pkg=\"tf\" type=\"static_transform_publisher\" \
             args=\" 1.0000 -0.5000 0.2500 0.000000 0.000000 0.000000 1.000000 enu mav_imu 100\" />"
        );
    }

    #[test]
    fn test_frame_transforms_layout() {
        let reset = Pose::new(Vector3::new(0.0, 0.1, 0.0), UnitQuaternion::identity());
        let q_enu_i = UnitQuaternion::from_yaw(0.3);
        let extrinsic = Pose::new(Vector3::new(0.1, 0.0, 0.0), UnitQuaternion::identity());

        let transforms = frame_transforms(&reset, q_enu_i, &extrinsic);

        assert_eq!(transforms[0].pose, reset);
        assert_eq!(transforms[1].pose.position, Vector3::zeros());
        assert_eq!(transforms[1].pose.orientation, q_enu_i);
        assert_eq!(transforms[2].parent, MAV_IMU_FRAME);
        assert_eq!(transforms[2].pose, extrinsic);
    }

    #[test]
    fn test_render_launch_wraps_nodes() {
        let transforms = frame_transforms(
            &Pose::identity(),
            UnitQuaternion::identity(),
            &Pose::identity(),
        );
        let document = render_launch(&transforms);

        assert!(document.starts_with("<?xml version=\"1.0\"?>"));
        assert!(document.trim_end().ends_with("</launch>"));
        assert_eq!(document.matches("<node ").count(), 3);
    }
}
