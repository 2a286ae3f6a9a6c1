//! Square-root normalization constants for the Legendre recurrence
//!
//! The fully normalized associated Legendre functions are evaluated with recurrences whose
//! coefficients are ratios of square roots of small integers. Taking those roots once and
//! reusing them (together with their reciprocals) keeps the recurrence cheap and bounded at
//! high degree. The tables are 1-based: entry `n` holds $\sqrt{n}$ for
//! $n = 1 \ldots 2 N_{max} + 1$, and index 0 is unused.
use crate::MAX_DEGREE;

/// Number of usable entries in each table ($2 N_{max} + 1$)
pub const NORMALIZATION_LENGTH: usize = 2 * MAX_DEGREE + 1;

/// Precomputed $\sqrt{n}$ and $1/\sqrt{n}$ tables
///
/// Built once per model and read-only afterwards.
///
/// # Example
/// ```rust
/// use egm96::normalization::NormalizationTables;
/// let tables = NormalizationTables::new();
/// assert_eq!(tables.drts(4), 2.0);
/// assert_eq!(tables.dirt(4), 0.5);
/// ```
#[derive(Clone, Debug)]
pub struct NormalizationTables {
    drts: Vec<f64>,
    dirt: Vec<f64>,
}

impl NormalizationTables {
    /// Build the tables for the crate's maximum degree
    pub fn new() -> Self {
        let mut drts = vec![0.0; NORMALIZATION_LENGTH + 1];
        let mut dirt = vec![0.0; NORMALIZATION_LENGTH + 1];
        for n in 1..=NORMALIZATION_LENGTH {
            drts[n] = (n as f64).sqrt();
            dirt[n] = 1.0 / drts[n];
        }
        NormalizationTables { drts, dirt }
    }
    /// $\sqrt{n}$
    #[inline]
    pub fn drts(&self, n: usize) -> f64 {
        self.drts[n]
    }
    /// $1/\sqrt{n}$
    #[inline]
    pub fn dirt(&self, n: usize) -> f64 {
        self.dirt[n]
    }
    /// Number of usable (1-based) entries
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        NORMALIZATION_LENGTH
    }
}

impl Default for NormalizationTables {
    fn default() -> Self {
        Self::new()
    }
}
