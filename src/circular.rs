//! Circular statistics for yaw angles
//!
//! A plain arithmetic mean of headings breaks down near the ±180° seam:
//! samples alternating between 179° and -179° average to 0°. The Mitsuta
//! mean unwraps each sample against a running reference before summing.

use crate::math::{DEG_TO_RAD, RAD_TO_DEG, wrap_to_pi};

/// Mitsuta mean of a set of angles
///
/// Input angles are in radians and need not be wrapped. The result is in
/// radians within (-π, π].
///
/// # Arguments
/// * `angles` - Angles in radians
///
/// # Returns
/// The mean angle, or `None` for an empty slice
///
/// # Example
/// ```
/// use enu_align::circular::mitsuta_mean;
///
/// let angles = [179f64.to_radians(), (-179f64).to_radians()];
/// let mean = mitsuta_mean(&angles).unwrap();
/// assert!((mean.abs().to_degrees() - 180.0).abs() < 1e-9);
/// ```
pub fn mitsuta_mean(angles: &[f64]) -> Option<f64> {
    let (first, rest) = angles.split_first()?;

    let mut reference = first * RAD_TO_DEG;
    let mut sum = reference;

    for angle in rest {
        let delta = angle * RAD_TO_DEG - reference;
        if delta < -180.0 {
            reference += delta + 360.0;
        } else if delta < 180.0 {
            reference += delta;
        } else {
            reference += delta - 360.0;
        }
        sum += reference;
    }

    let mean = sum / angles.len() as f64;
    let degrees = (mean + 360.0).rem_euclid(360.0);

    Some(wrap_to_pi(degrees * DEG_TO_RAD))
}

/// Fixed-capacity ring of yaw samples
///
/// Storage is zero-initialised and every slot takes part in the mean, even
/// before `capacity` samples have been pushed. Use [`AngleWindow::is_full`]
/// to tell the start-up transient apart.
#[derive(Debug, Clone)]
pub struct AngleWindow {
    samples: Vec<f64>,
    cursor: usize,
    pushed: usize,
}

impl AngleWindow {
    /// Create a window holding `capacity` samples; a capacity of 0 is raised to 1
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0.0; capacity.max(1)],
            cursor: 0,
            pushed: 0,
        }
    }

    /// Write a sample at the cursor, overwriting the oldest one, and advance
    pub fn push(&mut self, angle: f64) {
        self.samples[self.cursor] = angle;
        self.cursor = (self.cursor + 1) % self.samples.len();
        self.pushed = self.pushed.saturating_add(1);
    }

    /// Circular mean over every slot of the window
    pub fn mean(&self) -> f64 {
        // The window is never empty
        mitsuta_mean(&self.samples).unwrap_or_default()
    }

    /// Samples in storage order (not chronological once the cursor wrapped)
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Number of slots written at least once
    pub fn len(&self) -> usize {
        self.pushed.min(self.samples.len())
    }

    pub fn is_empty(&self) -> bool {
        self.pushed == 0
    }

    pub fn is_full(&self) -> bool {
        self.pushed >= self.samples.len()
    }

    /// Index the next sample will be written to
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}
