//! EGM96 correction and harmonic coefficient table
//!
//! The model is defined by a triangular set of coefficients, one row for every
//! (degree, order) pair with $0 \le m \le n \le 360$. Each row carries four values:
//!
//! - the cosine and sine *correction* coefficients that convert the height anomaly on the
//!   ellipsoid into a geoid undulation, and
//! - the cosine and sine fully normalized *harmonic* coefficients of the disturbing potential
//!   (the EGM96 potential minus the WGS84 normal field).
//!
//! Rows are stored densely in a flat vector. The pair $(n, m)$ lives at
//! $n(n+1)/2 + m$ (see [triangular_index]); the 1-based key used by the NIMA tables
//! is one more than that (see [coefficient_key]). The same layout is used for the flattened
//! Legendre functions so both can be walked with a single running index.
//!
//! The table is immutable once built. It can be loaded from:
//! - the NGA distribution files (`EGM96` harmonics and `CORRCOEF` corrections), see
//!   [CoefficientTable::from_nga_files], or
//! - a packed CSV with one row per (degree, order), see [CoefficientTable::from_csv], which is
//!   what [CoefficientTable::to_csv] writes.
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::MAX_DEGREE;

/// Number of (degree, order) rows in the table: $(N+1)(N+2)/2$
pub const COEFFICIENT_COUNT: usize = (MAX_DEGREE + 1) * (MAX_DEGREE + 2) / 2;

/// Even degree zonal coefficients of the WGS84 (G873) normal gravity field ($J_2 \ldots J_{10}$)
///
/// Identical to the values used in the NIMA gridding procedure.
pub const NORMAL_FIELD_ZONALS: [(usize, f64); 5] = [
    (2, 0.108262982131e-2),
    (4, -0.237091120053e-05),
    (6, 0.608346498882e-8),
    (8, -0.142681087920e-10),
    (10, 0.121439275882e-13),
];

/// Zero-based position of the (degree, order) row in the flat table
///
/// # Example
/// ```rust
/// use egm96::coefficients::triangular_index;
/// assert_eq!(triangular_index(0, 0), 0);
/// assert_eq!(triangular_index(2, 0), 3);
/// assert_eq!(triangular_index(360, 360), 65340);
/// ```
#[inline]
pub const fn triangular_index(degree: usize, order: usize) -> usize {
    (degree * (degree + 1)) / 2 + order
}

/// One-based key of the (degree, order) row, as used by the NIMA coefficient files
#[inline]
pub const fn coefficient_key(degree: usize, order: usize) -> usize {
    triangular_index(degree, order) + 1
}

/// A single row of the coefficient table
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CoefficientEntry {
    /// Cosine correction coefficient (height anomaly to undulation), centimeters
    pub correction_c: f64,
    /// Sine correction coefficient (height anomaly to undulation), centimeters
    pub correction_s: f64,
    /// Fully normalized cosine harmonic coefficient of the disturbing potential
    pub harmonic_c: f64,
    /// Fully normalized sine harmonic coefficient of the disturbing potential
    pub harmonic_s: f64,
}

impl From<[f64; 4]> for CoefficientEntry {
    fn from(row: [f64; 4]) -> Self {
        CoefficientEntry {
            correction_c: row[0],
            correction_s: row[1],
            harmonic_c: row[2],
            harmonic_s: row[3],
        }
    }
}

/// CSV record of the packed coefficient format
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub struct CoefficientRecord {
    pub degree: usize,
    pub order: usize,
    pub correction_c: f64,
    pub correction_s: f64,
    pub harmonic_c: f64,
    pub harmonic_s: f64,
}

/// The immutable EGM96 coefficient table
#[derive(Clone, Debug, PartialEq)]
pub struct CoefficientTable {
    entries: Vec<CoefficientEntry>,
}

impl CoefficientTable {
    /// A table with every coefficient set to zero
    pub fn zeros() -> Self {
        CoefficientTable {
            entries: vec![CoefficientEntry::default(); COEFFICIENT_COUNT],
        }
    }
    /// Build a table from rows already in triangular order
    ///
    /// # Errors
    /// Fails when the number of rows is not [COEFFICIENT_COUNT]. A mismatch means the table
    /// was generated for a different maximum degree and would index out of bounds.
    pub fn from_entries(entries: Vec<CoefficientEntry>) -> Result<Self> {
        if entries.len() != COEFFICIENT_COUNT {
            bail!(
                "coefficient table has {} rows, expected {} for maximum degree {}",
                entries.len(),
                COEFFICIENT_COUNT,
                MAX_DEGREE
            );
        }
        Ok(CoefficientTable { entries })
    }
    /// Build a table from raw `[correction_c, correction_s, harmonic_c, harmonic_s]` rows
    ///
    /// Rows are zero-based: the first row is degree 0 order 0. Dumps in the 1-based NIMA
    /// layout carry an unused leading row (65342 rows in total) which must be dropped first,
    /// otherwise the size check fails.
    pub fn from_rows(rows: Vec<[f64; 4]>) -> Result<Self> {
        Self::from_entries(rows.into_iter().map(CoefficientEntry::from).collect())
    }
    /// Replace one row, consuming and returning the table
    ///
    /// # Panics
    /// Panics if `order > degree` or `degree > MAX_DEGREE`.
    pub fn with_entry(mut self, degree: usize, order: usize, entry: CoefficientEntry) -> Self {
        assert!(
            order <= degree && degree <= MAX_DEGREE,
            "invalid (degree, order) = ({degree}, {order})"
        );
        self.entries[triangular_index(degree, order)] = entry;
        self
    }
    /// Row for a (degree, order) pair
    #[inline]
    pub fn get(&self, degree: usize, order: usize) -> &CoefficientEntry {
        &self.entries[triangular_index(degree, order)]
    }
    /// Row at a flat zero-based index
    #[inline]
    pub fn entry(&self, index: usize) -> &CoefficientEntry {
        &self.entries[index]
    }
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn entries(&self) -> &[CoefficientEntry] {
        &self.entries
    }

    /// Load the table from the NGA distribution files
    ///
    /// # Arguments
    /// * `harmonics` - Path to the `EGM96` potential coefficient file (`n m C S sigmaC sigmaS`)
    /// * `corrections` - Path to the `CORRCOEF` correction coefficient file (`n m C S`)
    ///
    /// The even zonal terms of the WGS84 normal field ([NORMAL_FIELD_ZONALS]) are removed
    /// from the harmonic coefficients so the table describes the disturbing potential.
    ///
    /// # Errors
    /// Fails on unreadable or malformed lines, on a (degree, order) pair listed twice in the
    /// same file, and when a file is incomplete. The correction file must cover every pair
    /// of degree 0 to 360 and the harmonic file every pair of degree 2 to 360.
    pub fn from_nga_files<P: AsRef<Path>, Q: AsRef<Path>>(
        harmonics: P,
        corrections: Q,
    ) -> Result<Self> {
        let harmonics = harmonics.as_ref();
        let corrections = corrections.as_ref();
        debug!(
            "Loading EGM96 coefficients from {} and {}",
            harmonics.display(),
            corrections.display()
        );
        let h = File::open(harmonics)
            .with_context(|| format!("opening harmonic coefficients {}", harmonics.display()))?;
        let c = File::open(corrections).with_context(|| {
            format!("opening correction coefficients {}", corrections.display())
        })?;
        Self::from_nga_readers(BufReader::new(h), BufReader::new(c))
    }

    /// Same as [CoefficientTable::from_nga_files] but from any buffered readers
    pub fn from_nga_readers<H: BufRead, C: BufRead>(harmonics: H, corrections: C) -> Result<Self> {
        let mut entries = vec![CoefficientEntry::default(); COEFFICIENT_COUNT];

        let rows = parse_nga(corrections).context("reading correction coefficients")?;
        let mut coverage = RowCoverage::new();
        for &(degree, order, c, s) in &rows {
            coverage.mark(degree, order).context("reading correction coefficients")?;
            let entry = &mut entries[triangular_index(degree, order)];
            entry.correction_c = c;
            entry.correction_s = s;
        }
        coverage.require_from(0).context("incomplete correction coefficients")?;
        debug!("Read {} correction coefficient rows", rows.len());

        let rows = parse_nga(harmonics).context("reading harmonic coefficients")?;
        let mut coverage = RowCoverage::new();
        for &(degree, order, c, s) in &rows {
            coverage.mark(degree, order).context("reading harmonic coefficients")?;
            let entry = &mut entries[triangular_index(degree, order)];
            entry.harmonic_c = c;
            entry.harmonic_s = s;
        }
        // the potential file starts at degree 2
        coverage.require_from(2).context("incomplete harmonic coefficients")?;
        debug!("Read {} harmonic coefficient rows", rows.len());

        remove_normal_field(&mut entries);
        Self::from_entries(entries)
    }

    /// Load the table from the packed CSV format
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading EGM96 coefficients from {}", path.display());
        let file = File::open(path)
            .with_context(|| format!("opening coefficient table {}", path.display()))?;
        Self::from_csv_reader(file)
    }

    /// Same as [CoefficientTable::from_csv] but from any reader
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let mut entries = vec![CoefficientEntry::default(); COEFFICIENT_COUNT];
        let mut coverage = RowCoverage::new();
        for (line, result) in rdr.deserialize().enumerate() {
            let record: CoefficientRecord =
                result.with_context(|| format!("parsing coefficient record {}", line + 1))?;
            check_pair(record.degree, record.order)?;
            coverage.mark(record.degree, record.order)?;
            entries[triangular_index(record.degree, record.order)] = CoefficientEntry {
                correction_c: record.correction_c,
                correction_s: record.correction_s,
                harmonic_c: record.harmonic_c,
                harmonic_s: record.harmonic_s,
            };
        }
        coverage.require_from(0)?;
        Self::from_entries(entries)
    }

    /// Write the table in the packed CSV format
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("creating coefficient table {}", path.display()))?;
        self.to_csv_writer(file)?;
        debug!("Wrote {} coefficient rows to {}", self.len(), path.display());
        Ok(())
    }

    /// Same as [CoefficientTable::to_csv] but into any writer
    pub fn to_csv_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for degree in 0..=MAX_DEGREE {
            for order in 0..=degree {
                let entry = self.get(degree, order);
                wtr.serialize(CoefficientRecord {
                    degree,
                    order,
                    correction_c: entry.correction_c,
                    correction_s: entry.correction_s,
                    harmonic_c: entry.harmonic_c,
                    harmonic_s: entry.harmonic_s,
                })?;
            }
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Inverse of [triangular_index]
pub fn degree_order(index: usize) -> (usize, usize) {
    let mut degree = 0;
    while triangular_index(degree + 1, 0) <= index {
        degree += 1;
    }
    (degree, index - triangular_index(degree, 0))
}

/// Tracks which (degree, order) rows a loader has seen
struct RowCoverage {
    seen: Vec<bool>,
}

impl RowCoverage {
    fn new() -> Self {
        RowCoverage {
            seen: vec![false; COEFFICIENT_COUNT],
        }
    }
    /// Record a row; a pair seen twice is an error
    fn mark(&mut self, degree: usize, order: usize) -> Result<()> {
        let index = triangular_index(degree, order);
        if self.seen[index] {
            bail!("duplicate coefficient row for degree {} order {}", degree, order);
        }
        self.seen[index] = true;
        Ok(())
    }
    /// Fail on the first pair from `min_degree` up to [MAX_DEGREE] that was never marked
    fn require_from(&self, min_degree: usize) -> Result<()> {
        let first = triangular_index(min_degree, 0);
        if let Some(offset) = self.seen[first..].iter().position(|s| !s) {
            let (degree, order) = degree_order(first + offset);
            bail!("coefficient table is missing degree {} order {}", degree, order);
        }
        Ok(())
    }
}

fn check_pair(degree: usize, order: usize) -> Result<()> {
    if degree > MAX_DEGREE {
        bail!("degree {} exceeds maximum degree {}", degree, MAX_DEGREE);
    }
    if order > degree {
        bail!("order {} exceeds degree {}", order, degree);
    }
    Ok(())
}

/// Subtract the WGS84 normal field from the zonal harmonics
fn remove_normal_field(entries: &mut [CoefficientEntry]) {
    for (degree, j) in NORMAL_FIELD_ZONALS {
        entries[triangular_index(degree, 0)].harmonic_c += j / ((2 * degree + 1) as f64).sqrt();
    }
}

/// Parse an NGA coefficient file into `(degree, order, C, S)` rows
///
/// Trailing columns (standard deviations) are ignored, Fortran `D` exponents are accepted and
/// rows above [MAX_DEGREE] are skipped.
fn parse_nga<R: BufRead>(reader: R) -> Result<Vec<(usize, usize, f64, f64)>> {
    let mut rows = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let columns: Vec<&str> = line.split_whitespace().collect();
        if columns.len() < 4 {
            bail!("line {}: expected at least 4 columns, found {}", number + 1, columns.len());
        }
        let degree: usize = columns[0]
            .parse()
            .with_context(|| format!("line {}: invalid degree '{}'", number + 1, columns[0]))?;
        let order: usize = columns[1]
            .parse()
            .with_context(|| format!("line {}: invalid order '{}'", number + 1, columns[1]))?;
        if degree > MAX_DEGREE {
            warn!("line {}: skipping degree {} above {}", number + 1, degree, MAX_DEGREE);
            continue;
        }
        check_pair(degree, order).with_context(|| format!("line {}", number + 1))?;
        let c = parse_fortran_float(columns[2])
            .with_context(|| format!("line {}: invalid coefficient '{}'", number + 1, columns[2]))?;
        let s = parse_fortran_float(columns[3])
            .with_context(|| format!("line {}: invalid coefficient '{}'", number + 1, columns[3]))?;
        rows.push((degree, order, c, s));
    }
    Ok(rows)
}

fn parse_fortran_float(token: &str) -> Result<f64> {
    Ok(token.replace(['D', 'd'], "E").parse::<f64>()?)
}
