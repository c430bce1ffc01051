//! Magnetic heading for a level vehicle
//!
//! Yaw is taken straight from the horizontal components of the corrected
//! magnetic field. Roll and pitch are assumed to be zero, so there is no
//! tilt compensation: readings taken with the vehicle tilted give a biased
//! heading.

use crate::circular::AngleWindow;
use crate::error::{Error, Result};
use crate::math::{QuaternionExt, RAD_TO_DEG, Vector3Ext};
use crate::types::{AverageHeading, HeadingOutput, HeadingSettings};
use log::{info, warn};
use nalgebra::{UnitQuaternion, Vector3};

/// Yaw of a corrected magnetic field vector, assuming zero roll and pitch
///
/// The vector is normalized first and the heading is `atan2(y, -x)`, in
/// radians within (-π, π].
///
/// # Arguments
/// * `magnetometer` - Calibrated magnetometer reading
///
/// # Returns
/// Yaw in radians, or [`Error::DegenerateMagneticField`] when the vector is
/// near zero or has non-finite components
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use enu_align::compass::horizontal_yaw;
///
/// let yaw = horizontal_yaw(Vector3::new(0.0, 1.0, 0.0)).unwrap();
/// assert!((yaw - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
/// ```
pub fn horizontal_yaw(magnetometer: Vector3<f64>) -> Result<f64> {
    let field = magnetometer
        .checked_normalize()
        .ok_or(Error::DegenerateMagneticField)?;

    Ok(field.y.atan2(-field.x))
}

/// Circular-mean heading filter
///
/// Each magnetometer sample is calibrated, converted to a raw yaw and
/// pushed into a fixed-size window; the window's Mitsuta mean gives the
/// averaged heading.
pub struct HeadingFilter {
    settings: HeadingSettings,
    window: AngleWindow,
}

impl HeadingFilter {
    /// Create a heading filter with default settings
    pub fn new() -> Self {
        Self::with_settings(HeadingSettings::default())
    }

    /// Create a heading filter with the given settings
    pub fn with_settings(settings: HeadingSettings) -> Self {
        if settings.print_debug {
            info!("magnetometer declination: {}", settings.declination);
            info!("magnetometer offset: {:?}", settings.calibration.offset);
            info!(
                "magnetometer compensation: {:?}",
                settings.calibration.compensation
            );
        }

        Self {
            window: AngleWindow::new(settings.window_size),
            settings,
        }
    }

    /// Process one raw magnetometer reading
    ///
    /// # Arguments
    /// * `raw` - Uncalibrated magnetometer reading
    ///
    /// # Returns
    /// Raw yaw plus the averaged heading. `None`, with a warning logged, when
    /// the corrected field is degenerate or not finite; the window is left
    /// untouched in that case.
    ///
    /// # Example
    /// ```
    /// use nalgebra::{Matrix3, Vector3};
    /// use enu_align::{HeadingFilter, HeadingSettings, MagnetometerCalibration};
    ///
    /// let settings = HeadingSettings {
    ///     calibration: MagnetometerCalibration::new(Vector3::zeros(), Matrix3::identity()),
    ///     window_size: 1,
    ///     ..Default::default()
    /// };
    /// let mut filter = HeadingFilter::with_settings(settings);
    ///
    /// let output = filter.ingest_vector(Vector3::new(-1.0, 0.0, 0.0)).unwrap();
    /// assert!(output.raw_yaw_deg.abs() < 1e-9);
    /// ```
    pub fn ingest_vector(&mut self, raw: Vector3<f64>) -> Option<HeadingOutput> {
        let corrected = self.settings.calibration.apply(raw);

        let yaw = match horizontal_yaw(corrected) {
            Ok(yaw) => yaw + self.settings.declination,
            Err(err) => {
                warn!("skipping magnetometer sample {:?}: {}", raw, err);
                return None;
            }
        };

        self.window.push(yaw);

        let average = if self.settings.require_full_window && !self.window.is_full() {
            None
        } else {
            let yaw_average = self.window.mean();
            if self.settings.print_debug {
                info!("yaw_avg (deg): {}", yaw_average * RAD_TO_DEG);
            }
            Some(AverageHeading {
                yaw_deg: yaw_average * RAD_TO_DEG,
                orientation: UnitQuaternion::from_yaw(yaw_average),
            })
        };

        Some(HeadingOutput {
            raw_yaw_deg: yaw * RAD_TO_DEG,
            average,
        })
    }

    /// Current averaged yaw in radians, computed over the whole window
    pub fn average_yaw(&self) -> f64 {
        self.window.mean()
    }

    /// The yaw window in storage order
    pub fn window(&self) -> &AngleWindow {
        &self.window
    }

    /// Get current filter settings
    pub fn settings(&self) -> HeadingSettings {
        self.settings
    }
}

impl Default for HeadingFilter {
    fn default() -> Self {
        Self::new()
    }
}
