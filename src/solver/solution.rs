//! Sampled output of an integration run.

use serde::Serialize;

/// Work counters of an integration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IntegrationStats {
    /// Right-hand side evaluations (including Jacobian columns)
    pub nfev: usize,
    /// Jacobian evaluations
    pub njev: usize,
    /// LU decompositions
    pub ndec: usize,
    /// Step attempts
    pub nstep: usize,
    /// Accepted steps
    pub naccpt: usize,
    /// Rejected steps
    pub nrejct: usize,
}

/// State samples at the requested output times
#[derive(Debug, Clone, Default)]
pub struct Solution {
    pub t: Vec<f64>,
    pub y: Vec<Vec<f64>>,
    pub stats: IntegrationStats,
}

impl Solution {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            t: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
            stats: IntegrationStats::default(),
        }
    }

    pub(crate) fn push(&mut self, t: f64, y: Vec<f64>) {
        self.t.push(t);
        self.y.push(y);
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Iterate over stored sample pairs (t_i, y_i)
    pub fn iter(&self) -> impl Iterator<Item = (f64, &[f64])> + '_ {
        self.t.iter().copied().zip(self.y.iter().map(Vec::as_slice))
    }
}
