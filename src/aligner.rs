//! ENU alignment of a visual-inertial estimator's world frame
//!
//! Frames: `I` is the vehicle IMU, `C` the estimator's IMU and `Enu` the
//! local East-North-Up frame. The aligner tracks the latest `q_Enu_I`
//! sample and, when triggered, asks the estimator to reset to the pose of
//! `C` expressed in ENU.

use crate::diagnostics;
use crate::error::{Error, Result};
use crate::math::QuaternionExt;
use crate::types::{AlignerSettings, Pose};
use log::{error, info, warn};
use nalgebra::{Quaternion, UnitQuaternion};
use std::path::PathBuf;

/// Endpoint that accepts a reset pose
///
/// Calls may block until the endpoint answers; the blocking bound is up to
/// the implementation.
pub trait ResetService {
    /// Block until the endpoint can take a request, or fail if it never will
    fn wait_for_service(&mut self) -> Result<()>;

    /// Submit the pose of the estimator IMU in the ENU frame
    fn reset_to_pose(&mut self, pose: &Pose) -> Result<()>;
}

impl<S: ResetService + ?Sized> ResetService for &mut S {
    fn wait_for_service(&mut self) -> Result<()> {
        (**self).wait_for_service()
    }

    fn reset_to_pose(&mut self, pose: &Pose) -> Result<()> {
        (**self).reset_to_pose(pose)
    }
}

/// Pose of `C` in ENU from the vehicle attitude and the fixed extrinsic
///
/// `q_Enu_C = q_Enu_I * q_I_C` and `Enu_p_Enu_C = R(q_Enu_I) * I_p_I_C`.
/// ENU and `I` are assumed to share an origin.
///
/// # Arguments
/// * `q_enu_i` - Vehicle IMU attitude in ENU
/// * `extrinsic` - Pose of the estimator IMU in the vehicle IMU frame
///
/// # Returns
/// Pose of the estimator IMU in ENU
///
/// # Example
/// ```
/// use nalgebra::{UnitQuaternion, Vector3};
/// use enu_align::{Pose, aligner::enu_pose_of_sensor};
///
/// let extrinsic = Pose::new(Vector3::new(1.0, 0.0, 0.0), UnitQuaternion::identity());
/// let q_enu_i = UnitQuaternion::from_euler_angles(0.0, 0.0, std::f64::consts::FRAC_PI_2);
///
/// let pose = enu_pose_of_sensor(q_enu_i, &extrinsic);
/// assert!((pose.position - Vector3::new(0.0, 1.0, 0.0)).norm() < 1e-12);
/// ```
pub fn enu_pose_of_sensor(q_enu_i: UnitQuaternion<f64>, extrinsic: &Pose) -> Pose {
    let q_enu_c = q_enu_i * extrinsic.orientation;
    let enu_p_enu_c = q_enu_i.to_rotation_matrix() * extrinsic.position;

    Pose::new(enu_p_enu_c, q_enu_c)
}

/// Frame aligner
///
/// Feed it orientation samples with [`FrameAligner::ingest_orientation`]. The
/// reset is either sent once, automatically, after
/// `samples_before_reset` samples, or on every call to
/// [`FrameAligner::trigger_reset`].
pub struct FrameAligner<S> {
    /// Aligner settings
    settings: AlignerSettings,
    /// Reset endpoint
    service: S,
    /// Latest orientation of the vehicle IMU in ENU
    q_enu_i: UnitQuaternion<f64>,
    /// Number of orientation samples accepted so far
    num_external_pose_read: u64,
    /// Set once the automatic reset has been attempted; never cleared
    automatic_reset_sent: bool,
    /// Last pose accepted by the endpoint
    last_reset: Option<Pose>,
    /// Where to write the frame description after a reset
    debug_frames_path: Option<PathBuf>,
}

impl<S: ResetService> FrameAligner<S> {
    /// Create an aligner with default settings
    pub fn new(service: S) -> Self {
        Self::with_settings(AlignerSettings::default(), service)
    }

    /// Create an aligner with the given settings
    pub fn with_settings(settings: AlignerSettings, service: S) -> Self {
        if settings.verbose {
            info!(
                "transformation from vi-sensor IMU and MAV IMU [x, y, z, w]: {:?}",
                settings.extrinsic.orientation.to_xyzw()
            );
            if settings.send_reset_automatically {
                info!(
                    "reset will be sent after {} IMU messages",
                    settings.samples_before_reset
                );
            } else {
                info!("reset has to be sent by calling trigger_reset");
            }
        }

        Self {
            settings,
            service,
            q_enu_i: UnitQuaternion::identity(),
            num_external_pose_read: 0,
            automatic_reset_sent: false,
            last_reset: None,
            debug_frames_path: None,
        }
    }

    /// Write the frame description to `path` after each successful reset
    pub fn with_debug_frames_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug_frames_path = Some(path.into());
        self
    }

    /// Store a new `q_Enu_I` sample
    ///
    /// The quaternion is normalized; one with near-zero norm is dropped with
    /// a warning and not counted. Returns the outcome of the automatic reset
    /// if this sample fired it, `None` otherwise.
    pub fn ingest_orientation(&mut self, q_enu_i: Quaternion<f64>) -> Option<Result<Pose>> {
        let Some(q_enu_i) = UnitQuaternion::try_from_raw(q_enu_i) else {
            warn!("dropping orientation sample: {}", Error::DegenerateQuaternion);
            return None;
        };

        self.num_external_pose_read += 1;
        self.q_enu_i = q_enu_i;

        if self.settings.send_reset_automatically
            && !self.automatic_reset_sent
            && self.num_external_pose_read > u64::from(self.settings.samples_before_reset)
        {
            let outcome = self.compute_and_emit_reset();
            // The automatic window is one-shot even when the call failed
            self.automatic_reset_sent = true;
            return Some(outcome);
        }

        None
    }

    /// Manual trigger: compute and send the reset now
    pub fn trigger_reset(&mut self) -> Result<Pose> {
        if self.settings.verbose {
            info!("reset requested manually");
        }
        self.compute_and_emit_reset()
    }

    /// Compute the target pose and submit it to the reset endpoint
    ///
    /// Failures are logged and returned; nothing is retried.
    pub fn compute_and_emit_reset(&mut self) -> Result<Pose> {
        let pose = self.target_pose();

        if let Err(err) = self.submit(&pose) {
            error!("service call to reset the estimator failed: {}", err);
            return Err(err);
        }

        info!("sent reset to estimator");
        self.last_reset = Some(pose);

        if self.settings.verbose {
            let euler = self.q_enu_i.to_euler_degrees();
            info!(
                "body frame of MAV assumed with {} (deg) roll, {} (deg) pitch, {} (deg) yaw from local ENU (local axis, ZYX)",
                euler.x, euler.y, euler.z
            );
        }

        if let Some(path) = &self.debug_frames_path {
            let transforms =
                diagnostics::frame_transforms(&pose, self.q_enu_i, &self.settings.extrinsic);
            if let Err(err) = diagnostics::write_launch_file(path, &transforms) {
                warn!("could not write frame description to {}: {}", path.display(), err);
            }
        }

        Ok(pose)
    }

    /// Pose of the estimator IMU in ENU for the current orientation sample
    pub fn target_pose(&self) -> Pose {
        enu_pose_of_sensor(self.q_enu_i, &self.settings.extrinsic)
    }

    fn submit(&mut self, pose: &Pose) -> Result<()> {
        self.service.wait_for_service()?;
        self.service.reset_to_pose(pose)
    }

    /// Latest orientation sample, identity before the first one
    pub fn orientation(&self) -> UnitQuaternion<f64> {
        self.q_enu_i
    }

    /// Number of orientation samples accepted
    pub fn samples_read(&self) -> u64 {
        self.num_external_pose_read
    }

    /// Whether the automatic reset has fired
    pub fn automatic_reset_sent(&self) -> bool {
        self.automatic_reset_sent
    }

    /// Last pose accepted by the endpoint
    pub fn last_reset(&self) -> Option<Pose> {
        self.last_reset
    }

    /// Get current aligner settings
    pub fn settings(&self) -> AlignerSettings {
        self.settings
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut S {
        &mut self.service
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::DEG_TO_RAD;
    use nalgebra::Vector3;

    #[derive(Default)]
    struct RecordingService {
        available: bool,
        poses: Vec<Pose>,
    }

    impl ResetService for RecordingService {
        fn wait_for_service(&mut self) -> Result<()> {
            if self.available {
                Ok(())
            } else {
                Err(Error::ServiceUnavailable("estimator/reset_to_pose".into()))
            }
        }

        fn reset_to_pose(&mut self, pose: &Pose) -> Result<()> {
            self.poses.push(*pose);
            Ok(())
        }
    }

    fn available() -> RecordingService {
        RecordingService {
            available: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_aligner() {
        let aligner = FrameAligner::new(available());
        assert_eq!(aligner.orientation(), UnitQuaternion::identity());
        assert_eq!(aligner.samples_read(), 0);
        assert!(!aligner.automatic_reset_sent());
        assert!(aligner.last_reset().is_none());
    }

    #[test]
    fn test_identity_alignment_keeps_extrinsic_translation() {
        let settings = AlignerSettings {
            extrinsic: Pose::new(Vector3::new(0.1, -0.2, 0.3), UnitQuaternion::identity()),
            ..Default::default()
        };
        let aligner = FrameAligner::with_settings(settings, available());
        let pose = aligner.target_pose();

        assert_eq!(pose.orientation, UnitQuaternion::identity());
        assert!((pose.position - Vector3::new(0.1, -0.2, 0.3)).norm() < 1e-12);
    }

    #[test]
    fn test_composition_order() {
        // Non-commuting rotations: order of the product matters
        let q_enu_i = UnitQuaternion::from_euler_angles(0.0, 0.0, 90.0 * DEG_TO_RAD);
        let q_i_c = UnitQuaternion::from_euler_angles(90.0 * DEG_TO_RAD, 0.0, 0.0);
        let extrinsic = Pose::new(Vector3::new(0.0, 0.0, 1.0), q_i_c);

        let pose = enu_pose_of_sensor(q_enu_i, &extrinsic);

        assert!(pose.orientation.angle_to(&(q_enu_i * q_i_c)) < 1e-12);
        assert!(pose.orientation.angle_to(&(q_i_c * q_enu_i)) > 1e-3);

        // A vector along C's y axis ends up along ENU's z axis
        let v = pose.orientation * Vector3::y();
        assert!((v - Vector3::z()).norm() < 1e-12);

        // Translation along the yaw axis is unaffected by the yaw
        assert!((pose.position - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_ingest_normalizes_quaternion() {
        let mut aligner = FrameAligner::new(available());
        aligner.ingest_orientation(Quaternion::new(0.0, 0.0, 0.0, 3.0));

        assert_eq!(aligner.samples_read(), 1);
        assert!((aligner.orientation().into_inner().norm() - 1.0).abs() < 1e-12);
        assert!((aligner.orientation().to_euler_degrees().z.abs() - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_quaternion_is_dropped() {
        let mut aligner = FrameAligner::new(available());
        let q = UnitQuaternion::from_yaw(0.4);
        aligner.ingest_orientation(q.into_inner());
        aligner.ingest_orientation(Quaternion::new(0.0, 0.0, 0.0, 0.0));

        assert_eq!(aligner.samples_read(), 1);
        assert_eq!(aligner.orientation(), q);
    }

    #[test]
    fn test_manual_trigger_repeats() {
        let mut aligner = FrameAligner::new(available());
        for _ in 0..3 {
            aligner.trigger_reset().unwrap();
        }
        assert_eq!(aligner.service().poses.len(), 3);
        assert!(!aligner.automatic_reset_sent());
    }

    #[test]
    fn test_unavailable_service_is_not_fatal() {
        let mut aligner = FrameAligner::new(RecordingService::default());

        let result = aligner.trigger_reset();
        assert!(matches!(result, Err(Error::ServiceUnavailable(_))));
        assert!(aligner.last_reset().is_none());
        assert!(aligner.service().poses.is_empty());

        aligner.service_mut().available = true;
        assert!(aligner.trigger_reset().is_ok());
        assert!(aligner.last_reset().is_some());
    }

    #[test]
    fn test_automatic_reset_is_one_shot_after_failure() {
        let settings = AlignerSettings {
            send_reset_automatically: true,
            samples_before_reset: 1,
            verbose: false,
            ..Default::default()
        };
        let mut aligner = FrameAligner::with_settings(settings, RecordingService::default());
        let q = Quaternion::identity();

        assert!(aligner.ingest_orientation(q).is_none());
        assert!(matches!(aligner.ingest_orientation(q), Some(Err(_))));
        assert!(aligner.automatic_reset_sent());

        aligner.service_mut().available = true;
        for _ in 0..5 {
            assert!(aligner.ingest_orientation(q).is_none());
        }
        assert!(aligner.service().poses.is_empty());
    }
}
