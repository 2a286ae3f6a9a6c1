//! EGM96 geoid undulation toolbox
//!
//! This crate evaluates the [EGM96](https://earth-info.nga.mil/index.php?dir=wgs84&action=wgs84)
//! Earth Gravitational Model to obtain the geoid undulation $N$, the height of the geoid above the
//! WGS84 ellipsoid, at any latitude and longitude. Positioning systems (GNSS receivers, inertial
//! navigation filters, mapping pipelines) report heights above the ellipsoid ($h$), while maps
//! and charts use heights above mean sea level ($H$). The two are related by
//!
//! $$
//! H = h - N
//! $$
//!
//! The undulation is computed by full spherical harmonic synthesis to degree and order 360 rather
//! than by interpolating a precomputed grid, so any position is evaluated without grid
//! interpolation error.
//!
//! This crate is built off of a small set of dependencies:
//! - [`nalgebra`](https://crates.io/crates/nalgebra): Earth-centered Earth-fixed position vectors.
//! - [`csv`](https://crates.io/crates/csv) and [`serde`](https://crates.io/crates/serde): coefficient tables, batch files and configuration.
//! - [`rayon`](https://crates.io/crates/rayon): parallel batch evaluation.
//!
//! ## Crate overview
//!
//! This crate is organized into several modules:
//! - [earth]: WGS84 constants and the geodetic to geocentric conversion (radius, latitude, normal gravity).
//! - [normalization]: Square-root tables used by the Legendre recurrences.
//! - [legendre]: Fully normalized associated Legendre functions, one order at a time.
//! - [trig]: Sines and cosines of multiples of the longitude.
//! - [coefficients]: The EGM96 correction and harmonic coefficient table and its loaders.
//! - [harmonic]: The spherical harmonic summation producing the undulation.
//! - [geoid]: The [Egm96] model tying the pipeline together, and the [GeoidModel] trait.
//! - [batch]: CSV batch processing.
//! - [config]: Configuration files (JSON, YAML, TOML).
//! - [common]: Logger setup and path helpers for the command line tool.
//!
//! ## Model
//!
//! The geoid undulation is the sum of the height anomaly $\zeta$ computed from the disturbing
//! potential $T$ with Bruns' formula and a correction term $C$ that converts the height anomaly
//! into an undulation:
//!
//! $$
//! N = \frac{T}{\gamma} + C - 0.53
//! $$
//!
//! where $\gamma$ is the normal gravity of the WGS84 ellipsoid at the point. The constant
//! $-0.53$ m moves the result from the ideal mean-Earth ellipsoid to WGS84. Both $T$ and $C$ are
//! spherical harmonic series in geocentric coordinates:
//!
//! $$
//! T = \frac{GM}{r} \sum_{n=2}^{360} \left(\frac{a}{r}\right)^n \sum_{m=0}^{n}
//!     \bar{P}_{nm}(\cos\theta) \left( \bar{C}_{nm} \cos m\lambda + \bar{S}_{nm} \sin m\lambda \right)
//! $$
//!
//! ## Usage
//!
//! The coefficient table is not embedded in the crate. It is loaded from the NGA distribution
//! files or from a packed CSV produced by the `egm96 convert` command:
//!
//! ```no_run
//! use egm96::{CoefficientTable, Egm96, GeoidModel};
//!
//! let table = CoefficientTable::from_csv("data/egm96_coefficients.csv").expect("coefficients");
//! let model = Egm96::new(table);
//! let n = model.compute_altitude_offset(0.0, 0.0); // ~17.16 m in the Gulf of Guinea
//! let msl = model.ellipsoidal_to_orthometric(0.0, 0.0, 100.0);
//! ```
pub mod batch;
pub mod coefficients;
pub mod common;
pub mod config;
pub mod earth;
pub mod geoid;
pub mod harmonic;
pub mod legendre;
pub mod normalization;
pub mod trig;

pub use coefficients::{CoefficientEntry, CoefficientTable};
pub use config::{CoefficientSource, GeoidConfig};
pub use geoid::{Egm96, GeoidModel};

/// Maximum degree and order of the harmonic expansion
pub const MAX_DEGREE: usize = 360;
