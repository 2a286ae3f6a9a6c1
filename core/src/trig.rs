//! Sine and cosine of integer multiples of the longitude
//!
//! The order-$m$ terms of the harmonic expansion need $\sin(m\lambda)$ and $\cos(m\lambda)$
//! for every order up to the maximum degree. Rather than calling the trigonometric functions
//! 720 times, the multiples are generated with the Chebyshev recurrence
//!
//! $$
//! x_m = 2 \cos\lambda \, x_{m-1} - x_{m-2}
//! $$
//!
//! which holds for both the sine and the cosine series. The recurrence is strictly sequential.
use crate::MAX_DEGREE;

/// Length of each series buffer; index 0 is unused and index `m` holds order `m`
pub const SERIES_LENGTH: usize = MAX_DEGREE + 2;

/// $\sin(m\lambda)$ and $\cos(m\lambda)$ for $m = 1 \ldots N_{max}$
#[derive(Clone, Debug)]
pub struct LongitudeSeries {
    sinml: [f64; SERIES_LENGTH],
    cosml: [f64; SERIES_LENGTH],
}

impl LongitudeSeries {
    /// Generate the series for a longitude in radians
    ///
    /// # Example
    /// ```rust
    /// use egm96::trig::LongitudeSeries;
    /// let series = LongitudeSeries::new(0.5);
    /// assert!((series.sin(3) - 1.5f64.sin()).abs() < 1e-12);
    /// ```
    pub fn new(longitude: f64) -> Self {
        let mut sinml = [0.0; SERIES_LENGTH];
        let mut cosml = [0.0; SERIES_LENGTH];
        let a = longitude.sin();
        let b = longitude.cos();

        sinml[1] = a;
        cosml[1] = b;
        sinml[2] = 2.0 * b * a;
        cosml[2] = 2.0 * b * b - 1.0;

        for m in 3..=MAX_DEGREE {
            sinml[m] = 2.0 * b * sinml[m - 1] - sinml[m - 2];
            cosml[m] = 2.0 * b * cosml[m - 1] - cosml[m - 2];
        }
        LongitudeSeries { sinml, cosml }
    }
    /// $\sin(m\lambda)$
    #[inline]
    pub fn sin(&self, m: usize) -> f64 {
        self.sinml[m]
    }
    /// $\cos(m\lambda)$
    #[inline]
    pub fn cos(&self, m: usize) -> f64 {
        self.cosml[m]
    }
}
