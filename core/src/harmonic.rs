//! Spherical harmonic summation of the geoid undulation
//!
//! Given the flattened Legendre functions $\bar{P}_{nm}$, the longitude series and the
//! geocentric state of the point, the disturbing potential is summed as
//!
//! $$
//! T = \frac{GM}{r} \sum_{n=2}^{N} \left(\frac{a}{r}\right)^n \sum_{m=0}^{n}
//!     \bar{P}_{nm} \left( \bar{C}_{nm} \cos m\lambda + \bar{S}_{nm} \sin m\lambda \right)
//! $$
//!
//! and turned into a height anomaly with Bruns' formula, $\zeta = T / \gamma$. The
//! correction coefficients are summed the same way (without the radial attenuation) and
//! give, in centimeters, the difference between the height anomaly and the geoid undulation.
//! Finally the result is shifted by $-0.53$ m so that it refers to the WGS84 ellipsoid
//! rather than the ideal mean-Earth ellipsoid.
//!
//! Both sums walk the coefficient table and the Legendre array with one running index in
//! (degree, order) triangular order. The accumulation order is kept exactly as in the NIMA
//! reference program so that results match it bit for bit.
use crate::MAX_DEGREE;
use crate::coefficients::{COEFFICIENT_COUNT, CoefficientTable};
use crate::earth::{EQUATORIAL_RADIUS, GM, GeocentricState};
use crate::trig::LongitudeSeries;

/// Divisor converting the correction term from centimeters to meters
pub const CORRECTION_SCALE: f64 = 100.0;
/// Offset re-referencing the undulation from the mean-Earth ellipsoid to WGS84, in meters
pub const WGS84_OFFSET: f64 = -0.53;

/// Combine the Legendre functions, longitude series and coefficients into the undulation
///
/// # Parameters
/// - `p` - Flattened $\bar{P}_{nm}$ in triangular order (see [crate::legendre::legendre_triangle])
/// - `series` - $\sin(m\lambda)$ and $\cos(m\lambda)$
/// - `state` - Geocentric radius and normal gravity of the point
/// - `table` - The coefficient table
///
/// # Returns
/// The geoid undulation in meters
///
/// # Panics
/// Panics if `p` holds fewer than [COEFFICIENT_COUNT] values.
pub fn undulation(
    p: &[f64],
    series: &LongitudeSeries,
    state: &GeocentricState,
    table: &CoefficientTable,
) -> f64 {
    assert!(
        p.len() >= COEFFICIENT_COUNT,
        "expected {} Legendre values, got {}",
        COEFFICIENT_COUNT,
        p.len()
    );
    let re = state.radius;
    let gr = state.gravity;
    let ar = EQUATORIAL_RADIUS / re;
    let mut arn = ar;
    let mut ac = 0.0;
    let mut a = 0.0;

    // zero-based index of (1, 1); the loop advances to (2, 0) before first use
    let mut k = 2;
    for n in 2..=MAX_DEGREE {
        arn *= ar;
        k += 1;
        let zonal = table.entry(k);
        let mut sum = p[k] * zonal.harmonic_c;
        let mut sumc = p[k] * zonal.correction_c;

        for m in 1..=n {
            k += 1;
            let entry = table.entry(k);
            let tempc = entry.correction_c * series.cos(m) + entry.correction_s * series.sin(m);
            let temp = entry.harmonic_c * series.cos(m) + entry.harmonic_s * series.sin(m);
            sumc += p[k] * tempc;
            sum += p[k] * temp;
        }
        ac += sumc;
        a += sum * arn;
    }
    ac += low_degree_correction(p, series, table);

    ((a * GM) / (gr * re)) + (ac / CORRECTION_SCALE) + WGS84_OFFSET
}

/// Degree 0 and degree 1 part of the correction sum
///
/// The degree 0 term enters without a Legendre factor ($\bar{P}_{00} = 1$).
pub fn low_degree_correction(p: &[f64], series: &LongitudeSeries, table: &CoefficientTable) -> f64 {
    let (e00, e10, e11) = (table.entry(0), table.entry(1), table.entry(2));
    e00.correction_c
        + (p[1] * e10.correction_c)
        + (p[2] * (e11.correction_c * series.cos(1) + e11.correction_s * series.sin(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coefficients::{CoefficientEntry, triangular_index};
    use crate::earth::geocentric_metrics;
    use crate::legendre::legendre_triangle;
    use crate::normalization::NormalizationTables;
    use assert_approx_eq::assert_approx_eq;

    fn inputs(lat: f64, lon: f64) -> (Vec<f64>, LongitudeSeries, GeocentricState) {
        let state = geocentric_metrics(lat.to_radians(), lon.to_radians());
        let p = legendre_triangle(state.colatitude(), &NormalizationTables::new());
        (p, LongitudeSeries::new(lon.to_radians()), state)
    }

    #[test]
    fn zero_table_is_offset() {
        let (p, series, state) = inputs(12.0, 34.0);
        let n = undulation(&p, &series, &state, &CoefficientTable::zeros());
        assert_eq!(n, WGS84_OFFSET);
    }
    #[test]
    fn degree_zero_correction() {
        let (p, series, state) = inputs(-40.0, 100.0);
        let table = CoefficientTable::zeros()
            .with_entry(0, 0, CoefficientEntry::from([53.0, 0.0, 0.0, 0.0]));
        assert_approx_eq!(undulation(&p, &series, &state, &table), 0.0, 1e-12);
    }
    #[test]
    fn degree_one_correction() {
        let lon: f64 = 30.0;
        let (p, series, state) = inputs(20.0, lon);
        let table = CoefficientTable::zeros()
            .with_entry(1, 0, CoefficientEntry::from([100.0, 0.0, 0.0, 0.0]))
            .with_entry(1, 1, CoefficientEntry::from([0.0, 100.0, 0.0, 0.0]));
        let expected = p[1] + p[2] * lon.to_radians().sin() + WGS84_OFFSET;
        assert_approx_eq!(undulation(&p, &series, &state, &table), expected, 1e-12);
    }
    #[test]
    fn sectoral_correction_uses_longitude() {
        let lon: f64 = -75.0;
        let (p, series, state) = inputs(5.0, lon);
        let table = CoefficientTable::zeros()
            .with_entry(7, 3, CoefficientEntry::from([100.0, 50.0, 0.0, 0.0]));
        let angle = 3.0 * lon.to_radians();
        let expected =
            p[triangular_index(7, 3)] * (angle.cos() + 0.5 * angle.sin()) + WGS84_OFFSET;
        assert_approx_eq!(undulation(&p, &series, &state, &table), expected, 1e-10);
    }
    #[test]
    fn j2_harmonic_term() {
        let lat: f64 = 37.0;
        let (p, series, state) = inputs(lat, 0.0);
        let c20 = 1e-6;
        let table = CoefficientTable::zeros()
            .with_entry(2, 0, CoefficientEntry::from([0.0, 0.0, c20, 0.0]));
        let theta = state.colatitude();
        let p20 = 5f64.sqrt() / 2.0 * (3.0 * theta.cos().powi(2) - 1.0);
        let ar = EQUATORIAL_RADIUS / state.radius;
        let expected = c20 * p20 * ar.powi(2) * GM / (state.gravity * state.radius) + WGS84_OFFSET;
        assert_approx_eq!(undulation(&p, &series, &state, &table), expected, 1e-9);
    }
    #[test]
    fn highest_degree_is_summed() {
        let (p, series, state) = inputs(0.5, 10.0);
        let table = CoefficientTable::zeros().with_entry(
            MAX_DEGREE,
            MAX_DEGREE,
            CoefficientEntry::from([1e6, 0.0, 0.0, 0.0]),
        );
        let expected =
            1e6 * p[COEFFICIENT_COUNT - 1] * series.cos(MAX_DEGREE) / 100.0 + WGS84_OFFSET;
        assert!(expected.abs() > 1.0);
        assert_approx_eq!(undulation(&p, &series, &state, &table), expected, 1e-6);
    }
    #[test]
    #[should_panic(expected = "Legendre values")]
    fn short_legendre_array_panics() {
        let (p, series, state) = inputs(10.0, 10.0);
        undulation(&p[..100], &series, &state, &CoefficientTable::zeros());
    }
}
