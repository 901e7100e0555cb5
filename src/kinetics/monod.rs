//! Monod saturation kinetics.
//!
//! Reference: Monod J. Annu Rev Microbiol. 1949;3:371-394

/// Monod saturation factor S / (K + S)
///
/// Dimensionless fraction of the maximum rate reached at substrate
/// concentration `s_mM` with half-saturation constant `k_mM`. Returns 0 for
/// non-positive substrate.
#[inline]
pub fn monod_saturation(k_mM: f64, s_mM: f64) -> f64 {
    if s_mM <= 0.0 {
        return 0.0;
    }
    s_mM / (k_mM + s_mM)
}

/// Unguarded S / (K + S), used when the raw value must propagate
#[inline]
pub(crate) fn monod_saturation_raw(k_mM: f64, s_mM: f64) -> f64 {
    s_mM / (k_mM + s_mM)
}

/// Dual-substrate Monod rate
///
/// v = vmax * C/(Kc + C) * H/(Kh + H)
#[inline]
pub fn dual_monod(vmax: f64, kc_mM: f64, c_mM: f64, kh_mM: f64, h_mM: f64) -> f64 {
    vmax * monod_saturation(kc_mM, c_mM) * monod_saturation(kh_mM, h_mM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_saturation() {
        // At S = K the factor is exactly one half
        let k = 0.082;
        assert!((monod_saturation(k, k) - 0.5).abs() < 1e-12);

        // Saturates towards 1 at high substrate
        assert!((monod_saturation(k, 1000.0 * k) - 1.0).abs() < 0.01);

        // Zero or negative substrate gives zero
        assert_eq!(monod_saturation(k, 0.0), 0.0);
        assert_eq!(monod_saturation(k, -1.0), 0.0);
    }

    #[test]
    fn test_larger_k_lowers_factor() {
        let s = 0.5;
        assert!(monod_saturation(0.2, s) < monod_saturation(0.1, s));
    }

    #[test]
    fn test_dual_monod_is_product() {
        let rate = dual_monod(2.0, 1.0, 1.0, 3.0, 3.0);
        assert!((rate - 0.5).abs() < 1e-12);
    }
}
