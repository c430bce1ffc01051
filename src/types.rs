//! Core types and settings for frame alignment and heading estimation

use crate::calibration::MagnetometerCalibration;
use nalgebra::{UnitQuaternion, Vector3};

/// Rigid transform from frame A to frame B
///
/// Follows the `q_A_B` / `A_p_A_B` convention:
/// - `orientation` rotates vectors expressed in B into A (`r_A = R(q_A_B) * r_B`)
/// - `position` is expressed in A and points from A's origin to B's origin
///
/// # Example
/// ```
/// use nalgebra::{UnitQuaternion, Vector3};
/// use enu_align::Pose;
///
/// let pose = Pose::new(Vector3::new(0.1, 0.0, -0.05), UnitQuaternion::identity());
/// assert_eq!(pose.position.x, 0.1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Translation from A's origin to B's origin, expressed in A
    pub position: Vector3<f64>,
    /// Rotation taking vectors from B into A
    pub orientation: UnitQuaternion<f64>,
}

impl Pose {
    pub fn new(position: Vector3<f64>, orientation: UnitQuaternion<f64>) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Zero translation and identity rotation
    pub fn identity() -> Self {
        Self::new(Vector3::zeros(), UnitQuaternion::identity())
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

/// Frame aligner settings
///
/// # Example
/// ```
/// use nalgebra::{UnitQuaternion, Vector3};
/// use enu_align::{AlignerSettings, Pose};
///
/// let settings = AlignerSettings {
///     extrinsic: Pose::new(Vector3::new(0.0, 0.0, 0.1), UnitQuaternion::identity()),
///     send_reset_automatically: true,
///     samples_before_reset: 100,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AlignerSettings {
    /// Fixed transform of the estimator IMU (C) relative to the vehicle IMU (I):
    /// `q_I_C` and `I_p_I_C`
    pub extrinsic: Pose,
    /// Whether the reset is sent on its own once enough samples were read
    ///
    /// When false the reset has to be requested with `FrameAligner::trigger_reset`.
    pub send_reset_automatically: bool,
    /// Number of orientation samples that must be exceeded before the
    /// automatic reset fires
    pub samples_before_reset: u32,
    /// Log the extrinsic, the trigger mode and the attitude at reset time
    pub verbose: bool,
}

impl Default for AlignerSettings {
    fn default() -> Self {
        Self {
            extrinsic: Pose::identity(),
            send_reset_automatically: false,
            samples_before_reset: 50,
            verbose: true,
        }
    }
}

/// Heading filter settings
///
/// Note that the default calibration carries an all-zero compensation
/// matrix. Every corrected reading is then zero and gets skipped, so a real
/// compensation matrix must be supplied for the filter to produce output.
#[derive(Debug, Clone, Copy)]
pub struct HeadingSettings {
    /// Magnetic declination in radians, added to the raw yaw
    pub declination: f64,
    /// Hard/soft iron correction applied to every raw reading
    pub calibration: MagnetometerCalibration,
    /// Number of yaw samples averaged by the circular mean
    pub window_size: usize,
    /// Log calibration parameters at start-up and every averaged yaw
    pub print_debug: bool,
    /// Withhold the averaged yaw until the window has been filled once
    pub require_full_window: bool,
}

impl Default for HeadingSettings {
    fn default() -> Self {
        Self {
            declination: 0.0,
            calibration: MagnetometerCalibration::default(),
            window_size: 10,
            print_debug: false,
            require_full_window: false,
        }
    }
}

/// Averaged heading published after each accepted magnetometer sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageHeading {
    /// Circular mean of the yaw window in degrees, within (-180°, 180°]
    pub yaw_deg: f64,
    /// Pure-yaw orientation (roll = pitch = 0) for the averaged heading
    pub orientation: UnitQuaternion<f64>,
}

/// Outputs produced for one magnetometer sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingOutput {
    /// Unfiltered yaw in degrees, declination included, not wrapped
    pub raw_yaw_deg: f64,
    /// Averaged heading; `None` only while a full window is required but not yet collected
    pub average: Option<AverageHeading>,
}
