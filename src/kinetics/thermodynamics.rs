//! Gibbs free energy of hydrogenotrophic acetogenesis and the resulting
//! thermodynamic limit on growth.
//!
//! Reaction: 4 H2 + 2 CO2 → CH3COOH + 2 H2O
//!
//! ΔG = ΔG° + RT·ln( [A] · [W]⁴ / ([C]² · [H]⁴) )
//!
//! with concentrations in mol/L and [W] ≈ 55 M for water.
//!
//! Growth is throttled by a logistic factor centred on the free energy needed
//! to phosphorylate one ADP (≈ -30 kJ/mol):
//!
//! F_T = 1 / (1 + exp(k·(ΔG - ΔG_ATP)))
//!
//! References:
//! - Thauer RK, Jungermann K, Decker K. Bacteriol Rev. 1977;41:100-180
//! - Jin Q, Bethke CM. Am J Sci. 2007;307:643-677

/// Millimolar per molar
pub const MM_PER_M: f64 = 1000.0;

/// Molar concentration of water (mol/L)
pub const WATER_MOLAR: f64 = 55.0;

/// Stoichiometric exponent of acetate in the reaction quotient
pub const ACETATE_EXPONENT: f64 = 1.0;
/// Stoichiometric exponent of CO2
pub const CO2_EXPONENT: f64 = 2.0;
/// Stoichiometric exponent of H2 (and of water)
pub const H2_EXPONENT: f64 = 4.0;

/// Free energy required to synthesise one ATP (kJ/mol)
pub const ATP_SYNTHESIS_KJ_PER_MOL: f64 = -30.0;

/// Steepness of the thermodynamic cut-off (mol/kJ)
pub const THERMO_STEEPNESS_PER_KJ: f64 = 0.07;

/// Natural log of the reaction quotient
///
/// Evaluated as a sum of logarithms so extreme concentrations never overflow
/// the quotient itself. Inputs in mM.
#[inline]
pub fn ln_reaction_quotient(a_mM: f64, c_mM: f64, h_mM: f64) -> f64 {
    ACETATE_EXPONENT * (a_mM / MM_PER_M).ln() + H2_EXPONENT * WATER_MOLAR.ln()
        - CO2_EXPONENT * (c_mM / MM_PER_M).ln()
        - H2_EXPONENT * (h_mM / MM_PER_M).ln()
}

/// Actual Gibbs free energy of the reaction (kJ/mol)
///
/// # Arguments
/// * `dG0_kJ_per_mol` - Standard free energy
/// * `rt_kJ_per_mol` - Thermal energy R·T
/// * `a_mM`, `c_mM`, `h_mM` - Acetate, CO2 and H2 concentrations
#[inline]
pub fn gibbs_free_energy(
    dG0_kJ_per_mol: f64,
    rt_kJ_per_mol: f64,
    a_mM: f64,
    c_mM: f64,
    h_mM: f64,
) -> f64 {
    dG0_kJ_per_mol + rt_kJ_per_mol * ln_reaction_quotient(a_mM, c_mM, h_mM)
}

/// Thermodynamic growth factor in [0, 1]
///
/// Tends to 1 far below the ATP threshold and to 0 above it. Infinite free
/// energies saturate through IEEE-754 (`exp(+∞) = ∞`, `exp(-∞) = 0`).
#[inline]
pub fn thermodynamic_factor(dG_kJ_per_mol: f64) -> f64 {
    let exponent = THERMO_STEEPNESS_PER_KJ * (dG_kJ_per_mol - ATP_SYNTHESIS_KJ_PER_MOL);
    1.0 / (1.0 + exponent.exp())
}
