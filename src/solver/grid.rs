//! Requested output times

use crate::error::ConfigError;

/// Largest number of output points a uniform schedule may expand to
pub const MAX_GRID_POINTS: usize = 10_000_000;

/// Strictly increasing output schedule; the first point is the initial time
///
/// The integrator chooses its own internal steps and samples its dense output
/// at exactly these points.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    points: Vec<f64>,
}

impl TimeGrid {
    /// Points `start + i·step` for every `i` with `start + i·step <= end`
    ///
    /// Fails if the schedule would hold more than [`MAX_GRID_POINTS`] points.
    pub fn uniform(start: f64, step: f64, end: f64) -> Result<Self, ConfigError> {
        if !(start.is_finite() && step.is_finite() && end.is_finite()) {
            return Err(ConfigError::InvalidTimeGrid(format!(
                "start {}, step {} and end {} must be finite",
                start, step, end
            )));
        }
        if step <= 0.0 {
            return Err(ConfigError::InvalidTimeGrid(format!(
                "step must be > 0, got {}",
                step
            )));
        }
        if end <= start {
            return Err(ConfigError::InvalidTimeGrid(format!(
                "end {} must be after start {}",
                end, start
            )));
        }

        // Slack so that e.g. 0..100 by 1 keeps its last point
        let intervals = ((end - start) / step + 1e-9).floor();
        if !intervals.is_finite() || intervals >= MAX_GRID_POINTS as f64 {
            return Err(ConfigError::InvalidTimeGrid(format!(
                "step {} over [{}, {}] gives more than {} points",
                step, start, end, MAX_GRID_POINTS
            )));
        }
        let n = intervals as usize;
        let points = (0..=n).map(|i| start + i as f64 * step).collect();
        Self::from_points(points)
    }

    /// Explicit schedule
    pub fn from_points(points: Vec<f64>) -> Result<Self, ConfigError> {
        if points.len() < 2 {
            return Err(ConfigError::InvalidTimeGrid(format!(
                "need at least 2 points, got {}",
                points.len()
            )));
        }
        if let Some(t) = points.iter().find(|t| !t.is_finite()) {
            return Err(ConfigError::InvalidTimeGrid(format!("non-finite time {}", t)));
        }
        if let Some(w) = points.windows(2).find(|w| w[1] <= w[0]) {
            return Err(ConfigError::InvalidTimeGrid(format!(
                "times must be strictly increasing ({} then {})",
                w[0], w[1]
            )));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn start(&self) -> f64 {
        self.points[0]
    }

    pub fn end(&self) -> f64 {
        self.points[self.points.len() - 1]
    }
}
