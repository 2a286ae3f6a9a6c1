//! EGM96 geoid model
//!
//! [Egm96] ties the pipeline together: it owns the normalization tables and a shared handle
//! to the coefficient table, and evaluates the undulation at a geodetic position by
//!
//! 1. converting degrees to radians,
//! 2. computing the geocentric radius, latitude and normal gravity ([crate::earth]),
//! 3. evaluating the normalized Legendre functions of the geocentric colatitude for every
//!    order ([crate::legendre]),
//! 4. generating the longitude series ([crate::trig]), and
//! 5. summing the harmonic series ([crate::harmonic]).
//!
//! Every call allocates its own scratch buffers and the model itself is never mutated after
//! construction, so a single instance can be shared between threads.
//!
//! No input validation is performed. NaN inputs produce NaN, longitudes outside
//! $[-180, 180]$ are handled through the periodicity of the series, and latitudes of
//! exactly $\pm 90$ degrees give a finite value (see [crate::earth::geocentric_metrics]).
use std::sync::Arc;

use anyhow::Result;
use log::debug;

use crate::coefficients::CoefficientTable;
use crate::config::CoefficientSource;
use crate::earth::geocentric_metrics;
use crate::harmonic;
use crate::legendre::legendre_triangle;
use crate::normalization::NormalizationTables;
use crate::trig::LongitudeSeries;

/// Degrees per radian, applied as a divisor to match the reference conversion
const DEGREES_PER_RADIAN: f64 = 180.0 / std::f64::consts::PI;

/// Anything that can provide a geoid undulation at a geodetic position
///
/// Implemented by [Egm96] and by plain closures, so consumers that only need undulations
/// (height conversions, batch processing) can be exercised with a stand-in model.
pub trait GeoidModel {
    /// Geoid undulation in meters at a WGS84 latitude and longitude in degrees
    fn undulation(&self, latitude: f64, longitude: f64) -> f64;

    /// Convert an ellipsoidal (WGS84) height to an orthometric height: $H = h - N$
    fn ellipsoidal_to_orthometric(&self, latitude: f64, longitude: f64, height: f64) -> f64 {
        height - self.undulation(latitude, longitude)
    }

    /// Convert an orthometric height to an ellipsoidal (WGS84) height: $h = H + N$
    fn orthometric_to_ellipsoidal(&self, latitude: f64, longitude: f64, height: f64) -> f64 {
        height + self.undulation(latitude, longitude)
    }
}

impl<F> GeoidModel for F
where
    F: Fn(f64, f64) -> f64,
{
    fn undulation(&self, latitude: f64, longitude: f64) -> f64 {
        self(latitude, longitude)
    }
}

/// The EGM96 geoid evaluated by spherical harmonic synthesis to degree and order 360
///
/// # Example
/// ```rust
/// use egm96::{CoefficientTable, Egm96, GeoidModel};
/// // An all-zero table leaves only the WGS84 re-reference offset
/// let model = Egm96::new(CoefficientTable::zeros());
/// assert_eq!(model.compute_altitude_offset(10.0, 20.0), -0.53);
/// let orthometric = model.ellipsoidal_to_orthometric(10.0, 20.0, 100.0);
/// assert!((orthometric - 100.53).abs() < 1e-9);
/// ```
#[derive(Clone, Debug)]
pub struct Egm96 {
    tables: NormalizationTables,
    coefficients: Arc<CoefficientTable>,
}

impl Egm96 {
    /// Create a model from a coefficient table
    pub fn new(coefficients: CoefficientTable) -> Self {
        Self::from_shared(Arc::new(coefficients))
    }
    /// Create a model sharing an already loaded coefficient table
    pub fn from_shared(coefficients: Arc<CoefficientTable>) -> Self {
        debug!("Building EGM96 model with {} coefficient rows", coefficients.len());
        Egm96 {
            tables: NormalizationTables::new(),
            coefficients,
        }
    }
    /// Load the coefficient table from a configured source and create a model
    pub fn from_source(source: &CoefficientSource) -> Result<Self> {
        Ok(Self::new(source.load()?))
    }
    pub fn coefficients(&self) -> &CoefficientTable {
        &self.coefficients
    }
    pub fn normalization(&self) -> &NormalizationTables {
        &self.tables
    }

    /// Geoid undulation (altitude offset) in meters
    ///
    /// # Parameters
    /// - `latitude` - The WGS84 latitude in degrees
    /// - `longitude` - The WGS84 longitude in degrees
    ///
    /// # Returns
    /// The height of the geoid above the WGS84 ellipsoid in meters
    pub fn compute_altitude_offset(&self, latitude: f64, longitude: f64) -> f64 {
        self.undulation_radians(latitude / DEGREES_PER_RADIAN, longitude / DEGREES_PER_RADIAN)
    }

    /// Geoid undulation in meters for a position given in radians
    pub fn undulation_radians(&self, latitude: f64, longitude: f64) -> f64 {
        let state = geocentric_metrics(latitude, longitude);
        let p = legendre_triangle(state.colatitude(), &self.tables);
        let series = LongitudeSeries::new(longitude);
        harmonic::undulation(&p, &series, &state, &self.coefficients)
    }
}

impl GeoidModel for Egm96 {
    fn undulation(&self, latitude: f64, longitude: f64) -> f64 {
        self.compute_altitude_offset(latitude, longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coefficients::CoefficientEntry;
    use assert_approx_eq::assert_approx_eq;

    fn synthetic() -> Egm96 {
        let table = CoefficientTable::zeros()
            .with_entry(0, 0, CoefficientEntry::from([-5.0, 0.0, 0.0, 0.0]))
            .with_entry(2, 0, CoefficientEntry::from([1.0, 0.0, 2e-6, 0.0]))
            .with_entry(3, 2, CoefficientEntry::from([0.5, -0.2, 3e-7, -1e-7]))
            .with_entry(12, 7, CoefficientEntry::from([0.0, 0.0, 4e-8, 5e-8]))
            .with_entry(180, 90, CoefficientEntry::from([0.0, 0.0, 1e-9, 0.0]));
        Egm96::new(table)
    }

    #[test]
    fn closure_models() {
        let flat = |_lat: f64, _lon: f64| 10.0;
        assert_eq!(flat.undulation(1.0, 2.0), 10.0);
        assert_eq!(flat.ellipsoidal_to_orthometric(1.0, 2.0, 50.0), 40.0);
        assert_eq!(flat.orthometric_to_ellipsoidal(1.0, 2.0, 40.0), 50.0);
    }
    #[test]
    fn radians_and_degrees_agree() {
        let model = synthetic();
        let (lat, lon) = (47.25, -122.5);
        assert_eq!(
            model.compute_altitude_offset(lat, lon),
            model.undulation_radians(lat / DEGREES_PER_RADIAN, lon / DEGREES_PER_RADIAN)
        );
    }
    #[test]
    fn deterministic() {
        let model = synthetic();
        let first = model.compute_altitude_offset(-12.5, 44.0);
        for _ in 0..3 {
            assert_eq!(model.compute_altitude_offset(-12.5, 44.0).to_bits(), first.to_bits());
        }
    }
    #[test]
    fn longitude_periodicity() {
        let model = synthetic();
        for (lat, lon) in [(0.0, 0.0), (33.0, -100.0), (-71.0, 179.0)] {
            assert_approx_eq!(
                model.compute_altitude_offset(lat, lon),
                model.compute_altitude_offset(lat, lon + 360.0),
                1e-6
            );
        }
    }
    #[test]
    fn height_conversions_invert() {
        let model = synthetic();
        let h = 250.0;
        let orthometric = model.ellipsoidal_to_orthometric(21.0, -158.0, h);
        assert_approx_eq!(model.orthometric_to_ellipsoidal(21.0, -158.0, orthometric), h, 1e-9);
    }
    #[test]
    fn poles_are_finite() {
        let model = synthetic();
        assert!(model.compute_altitude_offset(90.0, 0.0).is_finite());
        assert!(model.compute_altitude_offset(-90.0, 0.0).is_finite());
    }
    #[test]
    fn nan_propagates() {
        let model = synthetic();
        assert!(model.compute_altitude_offset(f64::NAN, 0.0).is_nan());
        assert!(model.compute_altitude_offset(0.0, f64::NAN).is_nan());
    }
    #[test]
    fn shared_between_threads() {
        let model = Arc::new(synthetic());
        let expected = model.compute_altitude_offset(5.0, 6.0);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let model = Arc::clone(&model);
                std::thread::spawn(move || model.compute_altitude_offset(5.0, 6.0))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}
