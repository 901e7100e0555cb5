//! Dense LU decomposition with partial pivoting for the Rosenbrock iteration
//! matrix.

/// Row-major square matrix factored as P·A = L·U
#[derive(Debug, Clone)]
pub(crate) struct LuDecomposition {
    n: usize,
    lu: Vec<f64>,
    pivots: Vec<usize>,
}

impl LuDecomposition {
    /// Factor the row-major `n × n` matrix `a`
    ///
    /// Returns `None` if a zero (or non-finite) pivot is met.
    pub(crate) fn factor(mut a: Vec<f64>, n: usize) -> Option<Self> {
        debug_assert_eq!(a.len(), n * n);
        let mut pivots = vec![0; n];

        for k in 0..n {
            let mut pivot_row = k;
            let mut pivot_val = a[k * n + k].abs();
            for i in (k + 1)..n {
                let val = a[i * n + k].abs();
                if val > pivot_val {
                    pivot_val = val;
                    pivot_row = i;
                }
            }
            if pivot_val == 0.0 || !pivot_val.is_finite() {
                return None;
            }
            pivots[k] = pivot_row;
            if pivot_row != k {
                for j in 0..n {
                    a.swap(k * n + j, pivot_row * n + j);
                }
            }

            let akk = a[k * n + k];
            for i in (k + 1)..n {
                let factor = a[i * n + k] / akk;
                a[i * n + k] = factor;
                for j in (k + 1)..n {
                    a[i * n + j] -= factor * a[k * n + j];
                }
            }
        }

        Some(Self { n, lu: a, pivots })
    }

    /// Overwrite `b` with the solution of A·x = b
    pub(crate) fn solve(&self, b: &mut [f64]) {
        let n = self.n;
        for k in 0..n {
            b.swap(k, self.pivots[k]);
        }
        // Forward substitution with unit lower triangle
        for i in 0..n {
            let mut sum = b[i];
            for k in 0..i {
                sum -= self.lu[i * n + k] * b[k];
            }
            b[i] = sum;
        }
        // Back substitution
        for i in (0..n).rev() {
            let mut sum = b[i];
            for k in (i + 1)..n {
                sum -= self.lu[i * n + k] * b[k];
            }
            b[i] = sum / self.lu[i * n + i];
        }
    }
}
