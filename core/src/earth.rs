//! Earth-related constants and the geocentric conversion used by the geoid model
//!
//! The Earth is modeled as the WGS84 (G873) ellipsoid. The spherical harmonic synthesis in
//! this crate is carried out in geocentric spherical coordinates, so the geodetic input
//! position (latitude and longitude on the ellipsoid surface) must first be expressed as a
//! geocentric radius and geocentric latitude. The normal (theoretical) gravity at the point
//! is computed alongside with the closed form Somigliana equation, since it scales the
//! disturbing potential into a height.
//!
//! # Coordinate Systems
//! Geodetic latitude is measured along the ellipsoid normal. Geocentric latitude is the angle
//! between the equatorial plane and the line from the Earth's center to the point. The two
//! agree at the equator and at the poles and differ by up to ~0.19 degrees in between. The
//! intermediate Earth-centered Earth-fixed (ECEF) position is a right-handed Cartesian frame
//! with its origin at the Earth's center, the Z-axis through the north pole and the X-axis
//! through the prime meridian.
//!
//! The values of the constants below are those used by NIMA when producing the official
//! EGM96 undulation grid. They are kept as literals rather than derived from one another so
//! that results reproduce the reference model to the last bit.
use ::nalgebra::Vector3;

/// Earth's equatorial radius (WGS84 semi-major axis) in meters
pub const EQUATORIAL_RADIUS: f64 = 6378137.0; // meters
/// Earth's eccentricity squared ($e^2$)
pub const ECCENTRICITY_SQUARED: f64 = 0.00669437999013; // unit-less
/// Earth's gravitational acceleration at the equator ($g_e$) in $m/s^2$
pub const GE: f64 = 9.7803253359; // m/s^2
/// Somigliana's normal gravity constant ($k$)
pub const K: f64 = 0.00193185265246; // unit-less
/// Earth's gravitational constant including the atmosphere ($GM$) in $m^3/s^2$
pub const GM: f64 = 0.3986004418e15; // m^3/s^2

/// Geocentric quantities derived from a geodetic position on the ellipsoid
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeocentricState {
    /// Distance from the Earth's center in meters ($r_e$)
    pub radius: f64,
    /// Geocentric latitude in radians
    pub latitude: f64,
    /// Normal gravity at the point in $m/s^2$
    pub gravity: f64,
}

impl GeocentricState {
    /// Geocentric colatitude ($\theta = \pi/2 - \phi_c$) in radians
    pub fn colatitude(&self) -> f64 {
        std::f64::consts::FRAC_PI_2 - self.latitude
    }
}

/// Position of a point on the ellipsoid surface in the ECEF frame
///
/// # Parameters
/// - `latitude` - The WGS84 geodetic latitude in radians
/// - `longitude` - The WGS84 longitude in radians
///
/// # Returns
/// The ECEF position vector in meters
///
/// # Example
/// ```rust
/// use egm96::earth;
/// let ecef = earth::geodetic_to_ecef(0.0, 0.0);
/// assert_eq!(ecef[0], earth::EQUATORIAL_RADIUS);
/// ```
pub fn geodetic_to_ecef(latitude: f64, longitude: f64) -> Vector3<f64> {
    let sin_lat_sq = latitude.sin() * latitude.sin();
    let n = EQUATORIAL_RADIUS / (1.0 - ECCENTRICITY_SQUARED * sin_lat_sq).sqrt();
    let t2 = n * latitude.cos();
    Vector3::new(
        t2 * longitude.cos(),
        t2 * longitude.sin(),
        (n * (1.0 - ECCENTRICITY_SQUARED)) * latitude.sin(),
    )
}

/// Calculate the normal gravity on the ellipsoid surface
///
/// Closed form of the [Somigliana equation](https://en.wikipedia.org/wiki/Theoretical_gravity#Somigliana_equation)
///
/// $$
/// \gamma = g_e \frac{1 + k \sin^2\phi}{\sqrt{1 - e^2 \sin^2\phi}}
/// $$
///
/// # Parameters
/// - `latitude` - The WGS84 geodetic latitude in radians
///
/// # Returns
/// The normal gravity in $m/s^2$
pub fn normal_gravity(latitude: f64) -> f64 {
    let sin_lat_sq = latitude.sin() * latitude.sin();
    GE * (1.0 + (K * sin_lat_sq)) / (1.0 - (ECCENTRICITY_SQUARED * sin_lat_sq)).sqrt()
}

/// Convert a geodetic position to geocentric radius, geocentric latitude and normal gravity
///
/// The geocentric latitude is taken as $\arctan(z / \sqrt{x^2 + y^2})$ with no special
/// handling at the poles. At exactly $\pm 90$ degrees the horizontal distance is not zero in
/// floating point ($\cos(\pi/2) \approx 6 \times 10^{-17}$), so the result stays finite and
/// approaches $\pm\pi/2$.
///
/// # Parameters
/// - `latitude` - The WGS84 geodetic latitude in radians
/// - `longitude` - The WGS84 longitude in radians
///
/// # Example
/// ```rust
/// use egm96::earth;
/// let state = earth::geocentric_metrics(0.0, 0.0);
/// assert_eq!(state.radius, earth::EQUATORIAL_RADIUS);
/// assert_eq!(state.latitude, 0.0);
/// assert_eq!(state.gravity, earth::GE);
/// ```
pub fn geocentric_metrics(latitude: f64, longitude: f64) -> GeocentricState {
    let ecef = geodetic_to_ecef(latitude, longitude);
    let (x, y, z) = (ecef[0], ecef[1], ecef[2]);
    GeocentricState {
        radius: ((x * x) + (y * y) + (z * z)).sqrt(),
        latitude: (z / ((x * x) + (y * y)).sqrt()).atan(),
        gravity: normal_gravity(latitude),
    }
}

// === Unit tests ===
#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use nav_types::{ECEF, WGS84};

    /// WGS84 polar radius in meters
    const POLAR_RADIUS: f64 = 6356752.31425;
    /// Normal gravity at the poles in $m/s^2$
    const GP: f64 = 9.8321849378;

    #[test]
    fn equator() {
        let state = geocentric_metrics(0.0, 0.0);
        assert_eq!(state.radius, EQUATORIAL_RADIUS);
        assert_eq!(state.latitude, 0.0);
        assert_eq!(state.gravity, GE);
        assert_approx_eq!(state.colatitude(), std::f64::consts::FRAC_PI_2);
    }
    #[test]
    fn geocentric_latitude_is_smaller() {
        let latitude = 45f64.to_radians();
        let state = geocentric_metrics(latitude, 0.3);
        assert!(state.latitude < latitude);
        // max difference between geodetic and geocentric latitude is ~0.1924 deg
        assert_approx_eq!((latitude - state.latitude).to_degrees(), 0.1924, 1e-3);
    }
    #[test]
    fn radius_independent_of_longitude() {
        let latitude = 30f64.to_radians();
        let a = geocentric_metrics(latitude, 0.0);
        let b = geocentric_metrics(latitude, 2.0);
        assert_approx_eq!(a.radius, b.radius, 1e-6);
        assert_approx_eq!(a.latitude, b.latitude, 1e-14);
    }
    #[test]
    fn poles_are_finite() {
        for sign in [1.0, -1.0] {
            let state = geocentric_metrics(sign * 90.0 / (180.0 / std::f64::consts::PI), 0.0);
            assert!(state.latitude.is_finite());
            assert!(state.radius.is_finite());
            assert_approx_eq!(state.latitude, sign * std::f64::consts::FRAC_PI_2, 1e-12);
            assert_approx_eq!(state.radius, POLAR_RADIUS, 1e-3);
            assert_approx_eq!(state.gravity, GP, 1e-6);
        }
    }
    #[test]
    fn ecef_matches_nav_types() {
        for (lat, lon) in [(0.0, 0.0), (45.0, 90.0), (-33.9, 151.2), (71.0, -156.8)] {
            let ours = geodetic_to_ecef(f64::to_radians(lat), f64::to_radians(lon));
            let theirs: ECEF<f64> = ECEF::from(WGS84::from_degrees_and_meters(lat, lon, 0.0));
            assert_approx_eq!(ours[0], theirs.x(), 1e-3);
            assert_approx_eq!(ours[1], theirs.y(), 1e-3);
            assert_approx_eq!(ours[2], theirs.z(), 1e-3);
        }
    }
    #[test]
    fn nan_propagates() {
        let state = geocentric_metrics(f64::NAN, 0.0);
        assert!(state.radius.is_nan());
        assert!(state.latitude.is_nan());
        assert!(state.gravity.is_nan());
    }
}
