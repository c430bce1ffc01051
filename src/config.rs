//! TOML configuration, loaded once at start-up
//!
//! Every key is optional. Missing keys take the defaults documented on each
//! field; wrongly sized magnetometer arrays are logged and replaced by zeros.

use crate::aligner::{FrameAligner, ResetService};
use crate::calibration::MagnetometerCalibration;
use crate::compass::HeadingFilter;
use crate::error::Result;
use crate::math::QuaternionExt;
use crate::types::{AlignerSettings, HeadingSettings, Pose};
use log::{error, info};
use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub aligner: AlignerConfig,
    pub magnetometer: MagnetometerConfig,
    pub heading: HeadingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignerConfig {
    /// Samples to exceed before the automatic reset (50)
    pub samples_before_reset: u32,
    /// Send the reset without an explicit trigger (false)
    pub send_reset_automatically: bool,
    /// Log extrinsic, trigger mode and attitude at reset (true)
    pub verbose: bool,
    /// Launch file written after each reset (unset)
    pub debug_frames_path: Option<PathBuf>,
    /// Extrinsic between estimator IMU and vehicle IMU
    pub pose_sensor: PoseSensorConfig,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            samples_before_reset: 50,
            send_reset_automatically: false,
            verbose: true,
            debug_frames_path: None,
            pose_sensor: PoseSensorConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseSensorConfig {
    /// `q_I_C` (identity)
    pub q_ic: QuaternionConfig,
    /// `I_p_I_C` (zero)
    pub p_ic: VectorConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuaternionConfig {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for QuaternionConfig {
    fn default() -> Self {
        Self {
            w: 1.0,
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorConfig {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagnetometerConfig {
    /// Declination in radians (0)
    pub declination: f64,
    /// Hard iron offset, 3 values (zeros)
    pub offset: Vec<f64>,
    /// Soft iron compensation, 9 values row-major (zeros)
    pub compensation: Vec<f64>,
}

impl Default for MagnetometerConfig {
    fn default() -> Self {
        Self {
            declination: 0.0,
            offset: vec![0.0; 3],
            compensation: vec![0.0; 9],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingConfig {
    /// Window size of the circular mean (10)
    pub number_samples_average: usize,
    /// Log calibration and averaged yaw (false)
    pub print_debug: bool,
    /// Withhold the average until the window is full (false)
    pub require_full_window: bool,
}

impl Default for HeadingConfig {
    fn default() -> Self {
        Self {
            number_samples_average: 10,
            print_debug: false,
            require_full_window: false,
        }
    }
}

impl Config {
    /// Parse a configuration document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Settings for the frame aligner
    ///
    /// The extrinsic quaternion is normalized; a zero quaternion is logged
    /// and replaced by identity.
    pub fn aligner_settings(&self) -> AlignerSettings {
        let aligner = &self.aligner;
        let q = aligner.pose_sensor.q_ic;
        let p = aligner.pose_sensor.p_ic;

        let orientation = UnitQuaternion::try_from_raw(Quaternion::new(q.w, q.x, q.y, q.z))
            .unwrap_or_else(|| {
                error!("pose_sensor q_ic has zero norm, using identity");
                UnitQuaternion::identity()
            });

        AlignerSettings {
            extrinsic: Pose::new(Vector3::new(p.x, p.y, p.z), orientation),
            send_reset_automatically: aligner.send_reset_automatically,
            samples_before_reset: aligner.samples_before_reset,
            verbose: aligner.verbose,
        }
    }

    /// Settings for the heading filter
    pub fn heading_settings(&self) -> HeadingSettings {
        let window_size = match self.heading.number_samples_average {
            0 => {
                error!("number_samples_average must be at least 1, using 10");
                HeadingConfig::default().number_samples_average
            }
            size => size,
        };

        HeadingSettings {
            declination: self.magnetometer.declination,
            calibration: MagnetometerCalibration::from_slices(
                &self.magnetometer.offset,
                &self.magnetometer.compensation,
            ),
            window_size,
            print_debug: self.heading.print_debug,
            require_full_window: self.heading.require_full_window,
        }
    }

    /// Frame aligner wired to `service`, with the debug frames path applied
    pub fn build_aligner<S: ResetService>(&self, service: S) -> FrameAligner<S> {
        let aligner = FrameAligner::with_settings(self.aligner_settings(), service);
        match &self.aligner.debug_frames_path {
            Some(path) => aligner.with_debug_frames_path(path.clone()),
            None => aligner,
        }
    }

    pub fn build_heading_filter(&self) -> HeadingFilter {
        HeadingFilter::with_settings(self.heading_settings())
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path)?;
    let config = Config::from_toml_str(&contents)?;
    info!("loaded config from {}", path.display());
    Ok(config)
}
