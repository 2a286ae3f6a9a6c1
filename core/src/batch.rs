//! Batch evaluation of geoid undulations from CSV files
//!
//! Input files hold one position per row with `latitude` and `longitude` columns in
//! degrees and an optional `height` column (WGS84 ellipsoidal height in meters). The output
//! repeats the position and adds the `undulation` and, when a height was given, the
//! `orthometric_height`.
//!
//! Each query is independent, so with `parallel` set the rows are spread over the rayon
//! thread pool. The output keeps the input order either way.
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::geoid::GeoidModel;

/// A single position to evaluate
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub struct GeoidQuery {
    /// WGS84 latitude in degrees
    pub latitude: f64,
    /// WGS84 longitude in degrees
    pub longitude: f64,
    /// WGS84 ellipsoidal height in meters
    #[serde(default)]
    pub height: Option<f64>,
}

/// The evaluated undulation for a [GeoidQuery]
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub struct GeoidResult {
    pub latitude: f64,
    pub longitude: f64,
    /// Geoid undulation in meters
    pub undulation: f64,
    /// Height above the geoid in meters, when an ellipsoidal height was supplied
    #[serde(default)]
    pub orthometric_height: Option<f64>,
}

impl GeoidResult {
    fn evaluate<M: GeoidModel + ?Sized>(model: &M, query: &GeoidQuery) -> Self {
        let undulation = model.undulation(query.latitude, query.longitude);
        GeoidResult {
            latitude: query.latitude,
            longitude: query.longitude,
            undulation,
            orthometric_height: query.height.map(|h| h - undulation),
        }
    }
}

/// Reads queries from a CSV file
///
/// # Example
///
/// ```no_run
/// use egm96::batch::read_queries;
///
/// let queries = read_queries("./data/positions.csv").expect("Failed to read positions");
/// println!("Loaded {} positions", queries.len());
/// ```
pub fn read_queries<P: AsRef<Path>>(path: P) -> Result<Vec<GeoidQuery>> {
    let path = path.as_ref();
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("opening query file {}", path.display()))?;
    let mut queries = Vec::new();
    for (row, result) in rdr.deserialize().enumerate() {
        let query: GeoidQuery = result.with_context(|| format!("parsing query row {}", row + 1))?;
        queries.push(query);
    }
    Ok(queries)
}

/// Writes results to a CSV file
pub fn write_results<P: AsRef<Path>>(path: P, results: &[GeoidResult]) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("creating result file {}", path.display()))?;
    for result in results {
        wtr.serialize(result)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Evaluate every query, preserving input order
pub fn process_queries<M>(model: &M, queries: &[GeoidQuery], parallel: bool) -> Vec<GeoidResult>
where
    M: GeoidModel + Sync + ?Sized,
{
    info!(
        "Evaluating {} positions ({})",
        queries.len(),
        if parallel { "parallel" } else { "sequential" }
    );
    if parallel {
        queries
            .par_iter()
            .map(|query| GeoidResult::evaluate(model, query))
            .collect()
    } else {
        queries
            .iter()
            .map(|query| GeoidResult::evaluate(model, query))
            .collect()
    }
}

/// Read a query file, evaluate it and write the results
pub fn process_file<M, P, Q>(model: &M, input: P, output: Q, parallel: bool) -> Result<usize>
where
    M: GeoidModel + Sync + ?Sized,
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let queries = read_queries(&input)?;
    let results = process_queries(model, &queries, parallel);
    write_results(&output, &results)?;
    info!(
        "Wrote {} results to {}",
        results.len(),
        output.as_ref().display()
    );
    Ok(results.len())
}
