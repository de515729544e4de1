//! Rectangular search regions.

use serde::{Deserialize, Serialize};

use crate::types::{ComplexNumber, ConfigError};

/// Offset from each grid point to its partner seed.
pub const SEED_OFFSET: ComplexNumber = ComplexNumber::new(0.02, 0.02);

/// Axis-aligned rectangle sampled on a square grid.
///
/// # Example
///
/// ```
/// use secant_core::search::RegionSpec;
///
/// let region = RegionSpec::square(2.0, 5);
/// assert!(region.validate().is_ok());
/// assert_eq!(region.grid().len(), 25);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionSpec {
    /// Lower real bound
    pub x_min: f64,
    /// Upper real bound
    pub x_max: f64,
    /// Lower imaginary bound
    pub y_min: f64,
    /// Upper imaginary bound
    pub y_max: f64,
    /// Grid points per axis, at least 2
    pub points_per_axis: usize,
}

impl Default for RegionSpec {
    fn default() -> Self {
        Self::square(2.0, 30)
    }
}

impl RegionSpec {
    /// `[-half_width, half_width]²` with `points_per_axis` points per side.
    pub fn square(half_width: f64, points_per_axis: usize) -> Self {
        Self {
            x_min: -half_width,
            x_max: half_width,
            y_min: -half_width,
            y_max: half_width,
            points_per_axis,
        }
    }

    /// Checks bounds and grid size.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bounds = [self.x_min, self.x_max, self.y_min, self.y_max];
        if bounds.iter().any(|b| !b.is_finite()) {
            return Err(ConfigError::InvalidRegion(
                "bounds must be finite".to_string(),
            ));
        }
        if !(self.x_min < self.x_max) {
            return Err(ConfigError::InvalidRegion(format!(
                "x_min ({}) must be less than x_max ({})",
                self.x_min, self.x_max
            )));
        }
        if !(self.y_min < self.y_max) {
            return Err(ConfigError::InvalidRegion(format!(
                "y_min ({}) must be less than y_max ({})",
                self.y_min, self.y_max
            )));
        }
        if self.points_per_axis < 2 {
            return Err(ConfigError::InvalidRegion(format!(
                "points_per_axis must be at least 2, got {}",
                self.points_per_axis
            )));
        }
        Ok(())
    }

    /// Number of seed pairs the grid produces.
    pub fn seed_count(&self) -> usize {
        self.points_per_axis.saturating_mul(self.points_per_axis)
    }

    /// Grid points, real axis outer, imaginary axis inner.
    pub fn grid(&self) -> Vec<ComplexNumber> {
        let xs = linspace(self.x_min, self.x_max, self.points_per_axis);
        let ys = linspace(self.y_min, self.y_max, self.points_per_axis);
        xs.iter()
            .flat_map(|&x| ys.iter().map(move |&y| ComplexNumber::new(x, y)))
            .collect()
    }

    /// Seed pairs `(p, p + δ)` for every grid point.
    pub fn seed_pairs(&self) -> Vec<(ComplexNumber, ComplexNumber)> {
        self.grid()
            .into_iter()
            .map(|p| (p, p + SEED_OFFSET))
            .collect()
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive.
fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}
