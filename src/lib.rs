//! ENU alignment - frame alignment and level-vehicle heading for visual-inertial estimators
//!
//! This library provides two independent pieces built on the same rotation math:
//!
//! - [`FrameAligner`] composes a vehicle attitude sample (`q_Enu_I`) with the
//!   fixed extrinsic between the vehicle IMU and the estimator IMU, and submits
//!   the resulting pose to the estimator's reset endpoint, either once after a
//!   number of samples or on demand.
//! - [`HeadingFilter`] turns calibrated magnetometer readings into a yaw angle,
//!   assuming zero roll and pitch, and smooths it with a Mitsuta circular mean
//!   that stays correct across the ±180° seam.
//!
//! # Conventions
//!
//! - `q_A_B` rotates vectors from frame B into frame A: `r_A = R(q_A_B) * r_B`
//! - `A_p_B_C` is expressed in frame A and points from B's origin to C's origin
//! - Frames: `I` = vehicle (MAV) IMU, `C` = estimator sensor IMU, `Enu` = East-North-Up
//!
//! # Quick Start
//!
//! ```rust
//! use nalgebra::{Matrix3, Quaternion, Vector3};
//! use enu_align::{
//!     AlignerSettings, FrameAligner, HeadingFilter, HeadingSettings,
//!     MagnetometerCalibration, Pose, ResetService, Result,
//! };
//!
//! struct Estimator;
//!
//! impl ResetService for Estimator {
//!     fn wait_for_service(&mut self) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     fn reset_to_pose(&mut self, pose: &Pose) -> Result<()> {
//!         println!("reset to {:?}", pose);
//!         Ok(())
//!     }
//! }
//!
//! let mut aligner = FrameAligner::with_settings(
//!     AlignerSettings {
//!         send_reset_automatically: true,
//!         samples_before_reset: 2,
//!         ..Default::default()
//!     },
//!     Estimator,
//! );
//! for _ in 0..3 {
//!     aligner.ingest_orientation(Quaternion::identity());
//! }
//! assert!(aligner.automatic_reset_sent());
//!
//! let mut heading = HeadingFilter::with_settings(HeadingSettings {
//!     calibration: MagnetometerCalibration::new(Vector3::zeros(), Matrix3::identity()),
//!     ..Default::default()
//! });
//! let output = heading.ingest_vector(Vector3::new(-0.2, 0.1, -0.4)).unwrap();
//! println!("raw yaw: {:.1}°", output.raw_yaw_deg);
//! ```

pub mod aligner;
pub mod calibration;
pub mod circular;
pub mod compass;
pub mod config;
pub mod diagnostics;
mod error;
mod math;
mod types;

// Re-export all public types and functions
pub use aligner::{FrameAligner, ResetService};
pub use calibration::{MagnetometerCalibration, calibrate_magnetic};
pub use circular::{AngleWindow, mitsuta_mean};
pub use compass::{HeadingFilter, horizontal_yaw};
pub use config::{Config, load_config};
pub use error::{Error, Result};
pub use math::{DEG_TO_RAD, MIN_NORM, QuaternionExt, RAD_TO_DEG, Vector3Ext, wrap_to_pi};
pub use types::*;
