//! Fully normalized associated Legendre functions
//!
//! The geoid undulation is synthesized from the fully normalized associated Legendre
//! functions $\bar{P}_{nm}(\cos\theta)$ of the geocentric colatitude $\theta$. Unnormalized
//! functions overflow long before degree 360, so the normalized functions are generated
//! directly with recurrences whose square-root coefficients come from the
//! [NormalizationTables].
//!
//! For a fixed order $m$ the computation runs in two steps:
//!
//! 1. The sectoral terms ($n = m$) are built up diagonally,
//!    $\bar{P}_{nn} = \sqrt{\frac{2n+1}{2n}} \sin\theta \, \bar{P}_{n-1,n-1}$.
//! 2. The remaining degrees of the column follow from the standard three-term recurrence
//!
//! $$
//! \bar{P}_{nm} = \sqrt{\frac{2n+1}{(n+m)(n-m)}} \left( \sqrt{2n-1} \cos\theta \, \bar{P}_{n-1,m}
//!     - \sqrt{\frac{(n+m-1)(n-m-1)}{2n-3}} \bar{P}_{n-2,m} \right)
//! $$
//!
//! Every order is evaluated independently by [legendre_column], which returns a fresh
//! column, so the orders can be computed and tested in isolation. [legendre_triangle]
//! composes all of them into the flat triangular layout used by the coefficient table.
use crate::MAX_DEGREE;
use crate::coefficients::{COEFFICIENT_COUNT, triangular_index};
use crate::normalization::NormalizationTables;

/// Length of a column buffer; index `n + 1` holds degree `n`, index 0 is unused
pub const COLUMN_LENGTH: usize = MAX_DEGREE + 2;

/// Normalized Legendre function values of a single order across all degrees
#[derive(Clone, Debug)]
pub struct LegendreColumn {
    order: usize,
    rleg: [f64; COLUMN_LENGTH],
}

impl LegendreColumn {
    /// Harmonic order of this column
    pub fn order(&self) -> usize {
        self.order
    }
    /// $\bar{P}_{nm}$ for `degree` $n$; zero when the degree is below the order
    #[inline]
    pub fn value(&self, degree: usize) -> f64 {
        self.rleg[degree + 1]
    }
    /// The raw 1-based buffer (index `n + 1` holds degree `n`)
    pub fn as_slice(&self) -> &[f64] {
        &self.rleg
    }
}

/// Sectoral seeds $\bar{P}_{nn}$ for $n = 0 \ldots m$, stored at index $n + 1$
///
/// Index 2 ($\bar{P}_{11} = \sqrt{3}\sin\theta$) is always populated so that order 0 and
/// order 1 share the same seed buffer.
///
/// # Panics
/// Panics if `order > MAX_DEGREE`.
pub fn sectoral_terms(
    order: usize,
    colatitude: f64,
    tables: &NormalizationTables,
) -> [f64; COLUMN_LENGTH] {
    assert!(order <= MAX_DEGREE, "order {order} exceeds maximum degree {MAX_DEGREE}");
    let sithet = colatitude.sin();
    let mut rlnn = [0.0; COLUMN_LENGTH];
    rlnn[1] = 1.0;
    rlnn[2] = sithet * tables.drts(3);
    for n1 in 3..=order + 1 {
        let n = n1 - 1;
        let n2 = 2 * n;
        rlnn[n1] = tables.drts(n2 + 1) * tables.dirt(n2) * sithet * rlnn[n];
    }
    rlnn
}

/// Evaluate $\bar{P}_{nm}(\cos\theta)$ for one order $m$ and every degree $n = m \ldots N_{max}$
///
/// # Parameters
/// - `order` - The harmonic order $m$, at most [MAX_DEGREE]
/// - `colatitude` - The geocentric colatitude $\theta$ in radians
/// - `tables` - Square-root normalization constants
///
/// # Panics
/// Panics if `order > MAX_DEGREE`.
///
/// # Example
/// ```rust
/// use egm96::legendre::legendre_column;
/// use egm96::normalization::NormalizationTables;
/// let tables = NormalizationTables::new();
/// let column = legendre_column(0, 0.7, &tables);
/// assert_eq!(column.value(0), 1.0);
/// assert_eq!(column.value(1), 0.7f64.cos() * 3f64.sqrt());
/// ```
pub fn legendre_column(
    order: usize,
    colatitude: f64,
    tables: &NormalizationTables,
) -> LegendreColumn {
    let m = order;
    let nmax1 = MAX_DEGREE + 1;
    let m1 = m + 1;
    let m2 = m + 2;
    let cothet = colatitude.cos();
    let rlnn = sectoral_terms(m, colatitude, tables);
    let mut rleg = [0.0; COLUMN_LENGTH];

    match m {
        0 => {
            rleg[1] = 1.0;
            rleg[2] = cothet * tables.drts(3);
        }
        1 => {
            rleg[2] = rlnn[2];
            rleg[3] = tables.drts(5) * cothet * rleg[2];
        }
        _ => {}
    }
    rleg[m1] = rlnn[m1];

    if m2 <= nmax1 {
        rleg[m2] = tables.drts(m1 * 2 + 1) * cothet * rleg[m1];
        // starts at n = m + 2, past the order 0 (n < 2) and order 1 (n < 3) seeds
        for n1 in (m + 3)..=nmax1 {
            let n = n1 - 1;
            let n2 = 2 * n;
            rleg[n1] = tables.drts(n2 + 1)
                * tables.dirt(n + m)
                * tables.dirt(n - m)
                * (tables.drts(n2 - 1) * cothet * rleg[n1 - 1]
                    - tables.drts(n + m - 1)
                        * tables.drts(n - m - 1)
                        * tables.dirt(n2 - 3)
                        * rleg[n1 - 2]);
        }
    }
    LegendreColumn { order, rleg }
}

/// Evaluate every order and flatten the columns into the triangular coefficient layout
///
/// The returned vector holds $\bar{P}_{nm}$ at [triangular_index]`(n, m)` and has the same
/// length as the coefficient table.
pub fn legendre_triangle(colatitude: f64, tables: &NormalizationTables) -> Vec<f64> {
    let mut p = vec![0.0; COEFFICIENT_COUNT];
    for order in 0..=MAX_DEGREE {
        let column = legendre_column(order, colatitude, tables);
        for degree in order..=MAX_DEGREE {
            p[triangular_index(degree, order)] = column.value(degree);
        }
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn closed_form(degree: usize, order: usize, theta: f64) -> f64 {
        let (c, s) = (theta.cos(), theta.sin());
        match (degree, order) {
            (0, 0) => 1.0,
            (1, 0) => 3f64.sqrt() * c,
            (1, 1) => 3f64.sqrt() * s,
            (2, 0) => 5f64.sqrt() / 2.0 * (3.0 * c * c - 1.0),
            (2, 1) => 15f64.sqrt() * s * c,
            (2, 2) => 15f64.sqrt() / 2.0 * s * s,
            (3, 0) => 7f64.sqrt() / 2.0 * (5.0 * c * c * c - 3.0 * c),
            (3, 1) => (42f64).sqrt() / 4.0 * s * (5.0 * c * c - 1.0),
            (3, 2) => 105f64.sqrt() / 2.0 * s * s * c,
            (3, 3) => (70f64).sqrt() / 4.0 * s * s * s,
            _ => unreachable!(),
        }
    }

    #[test]
    fn order_zero_base_cases() {
        let tables = NormalizationTables::new();
        let theta = 0.9;
        let column = legendre_column(0, theta, &tables);
        assert_eq!(column.as_slice()[1], 1.0);
        assert_eq!(column.as_slice()[2], theta.cos() * 3f64.sqrt());
    }
    #[test]
    fn order_one_base_cases() {
        let tables = NormalizationTables::new();
        let theta = 1.1;
        let column = legendre_column(1, theta, &tables);
        assert_eq!(column.value(0), 0.0);
        assert_eq!(column.value(1), theta.sin() * 3f64.sqrt());
        assert_eq!(column.value(2), 5f64.sqrt() * theta.cos() * column.value(1));
    }
    #[test]
    fn low_degree_closed_forms() {
        let tables = NormalizationTables::new();
        for theta in [0.1, 0.8, 1.5707, 2.3, 3.0] {
            for order in 0..=3 {
                let column = legendre_column(order, theta, &tables);
                for degree in order..=3 {
                    assert_approx_eq!(
                        column.value(degree),
                        closed_form(degree, order, theta),
                        1e-12
                    );
                }
            }
        }
    }
    #[test]
    fn below_order_is_zero() {
        let tables = NormalizationTables::new();
        let column = legendre_column(25, 0.6, &tables);
        assert_eq!(column.order(), 25);
        for degree in 0..25 {
            assert_eq!(column.value(degree), 0.0);
        }
        assert!(column.value(25) != 0.0);
    }
    #[test]
    fn sectoral_diagonal() {
        let tables = NormalizationTables::new();
        let theta = 0.4;
        let column = legendre_column(MAX_DEGREE, theta, &tables);
        let rlnn = sectoral_terms(MAX_DEGREE, theta, &tables);
        assert_eq!(column.value(MAX_DEGREE), rlnn[MAX_DEGREE + 1]);
        assert_eq!(column.as_slice().len(), COLUMN_LENGTH);
    }
    #[test]
    fn addition_theorem() {
        // sum over all orders of the squared functions equals 2n + 1
        let tables = NormalizationTables::new();
        for theta in [0.3, 1.0, 2.0] {
            let p = legendre_triangle(theta, &tables);
            for degree in [2, 10, 90, 180, MAX_DEGREE] {
                let sum: f64 = (0..=degree)
                    .map(|order| p[triangular_index(degree, order)].powi(2))
                    .sum();
                assert_approx_eq!(sum / (2 * degree + 1) as f64, 1.0, 1e-9);
            }
        }
    }
    #[test]
    #[should_panic(expected = "exceeds maximum degree")]
    fn order_above_maximum_panics() {
        legendre_column(MAX_DEGREE + 1, 0.5, &NormalizationTables::new());
    }
    #[test]
    fn equator_odd_zonals_vanish() {
        let tables = NormalizationTables::new();
        let column = legendre_column(0, std::f64::consts::FRAC_PI_2, &tables);
        for degree in (1..=MAX_DEGREE).step_by(2) {
            assert_approx_eq!(column.value(degree), 0.0, 1e-9);
        }
    }
}
