//! Magnetometer hard/soft iron calibration

use log::error;
use nalgebra::{Matrix3, Vector3};

/// Applies magnetometer calibration (hard and soft iron correction)
///
/// Computes `soft_iron_matrix * (uncalibrated - hard_iron_offset)`.
///
/// # Arguments
/// * `uncalibrated` - Raw magnetometer reading
/// * `soft_iron_matrix` - 3x3 soft iron correction matrix
/// * `hard_iron_offset` - Hard iron offset vector
///
/// # Returns
/// Calibrated magnetometer reading
///
/// # Example
/// ```
/// use nalgebra::{Matrix3, Vector3};
/// use enu_align::calibration::calibrate_magnetic;
///
/// let raw = Vector3::new(100.0, 200.0, 300.0);
/// let soft_iron = Matrix3::identity();
/// let hard_iron = Vector3::new(10.0, 20.0, 30.0);
///
/// let calibrated = calibrate_magnetic(raw, soft_iron, hard_iron);
/// assert_eq!(calibrated, Vector3::new(90.0, 180.0, 270.0));
/// ```
pub fn calibrate_magnetic(
    uncalibrated: Vector3<f64>,
    soft_iron_matrix: Matrix3<f64>,
    hard_iron_offset: Vector3<f64>,
) -> Vector3<f64> {
    soft_iron_matrix * (uncalibrated - hard_iron_offset)
}

/// Magnetometer offset and compensation matrix
///
/// The default is a zero offset and an all-zero compensation matrix, which
/// maps every reading to the zero vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnetometerCalibration {
    /// Hard iron offset subtracted from each raw reading
    pub offset: Vector3<f64>,
    /// Soft iron compensation matrix
    pub compensation: Matrix3<f64>,
}

impl MagnetometerCalibration {
    pub fn new(offset: Vector3<f64>, compensation: Matrix3<f64>) -> Self {
        Self {
            offset,
            compensation,
        }
    }

    /// Build a calibration from flat parameter arrays
    ///
    /// `offset` must hold 3 values and `compensation` 9 values in row-major
    /// order. A wrongly sized array is logged and replaced by zeros.
    ///
    /// # Arguments
    /// * `offset` - Hard iron offset, `[x, y, z]`
    /// * `compensation` - Soft iron matrix, row-major
    pub fn from_slices(offset: &[f64], compensation: &[f64]) -> Self {
        let offset = if offset.len() == 3 {
            Vector3::from_column_slice(offset)
        } else {
            error!(
                "magnetometer offset must be an array with 3 elements, got {}",
                offset.len()
            );
            Vector3::zeros()
        };

        let compensation = if compensation.len() == 9 {
            Matrix3::from_row_slice(compensation)
        } else {
            error!(
                "magnetometer compensation must be an array with 9 elements, got {}",
                compensation.len()
            );
            Matrix3::zeros()
        };

        Self::new(offset, compensation)
    }

    /// Apply the correction to a raw reading
    pub fn apply(&self, raw: Vector3<f64>) -> Vector3<f64> {
        calibrate_magnetic(raw, self.compensation, self.offset)
    }
}

impl Default for MagnetometerCalibration {
    fn default() -> Self {
        Self::new(Vector3::zeros(), Matrix3::zeros())
    }
}
