use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{error, info};
use std::error::Error;
use std::path::{Path, PathBuf};

use egm96::common::{ensure_parent, init_logger, validate_input_file};
use egm96::config::{CoefficientSource, GeoidConfig};
use egm96::{CoefficientTable, Egm96, GeoidModel, batch};

const LONG_ABOUT: &str = "EGM96: geoid undulation from the EGM96 Earth Gravitational Model.

This program evaluates the EGM96 spherical harmonic model to degree and order 360 to compute the geoid undulation, the height of the geoid above the WGS84 ellipsoid, at any latitude and longitude. It can convert single heights between the ellipsoid and the geoid (mean sea level), process CSV files of positions, and build the packed coefficient table from the NGA distribution files.

The coefficient table is loaded either from the packed CSV (--coefficients) or from the NGA EGM96 and CORRCOEF files (--harmonics and --corrections). A configuration file (--config) may provide the same settings; command line flags take precedence.

Position files are CSV with the columns:
* latitude: WGS84 latitude in degrees
* longitude: WGS84 longitude in degrees
* height: (optional) WGS84 ellipsoidal height in meters";

/// Command line arguments
#[derive(Parser)]
#[command(author, version, about, long_about = LONG_ABOUT)]
struct Cli {
    /// Configuration file (.json, .yaml, .yml or .toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Log file path (logs to stderr if not given)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute the undulation at a single position
    Point(PointArgs),
    /// Compute undulations for every position in a CSV file
    Batch(BatchArgs),
    /// Convert the NGA coefficient files into the packed CSV table
    Convert(ConvertArgs),
    /// Write a default configuration file
    CreateConfig(CreateConfigArgs),
}

/// Coefficient table location (overrides the configuration file)
#[derive(Args, Clone, Debug, Default)]
struct SourceArgs {
    /// Packed CSV coefficient table
    #[arg(long, conflicts_with_all = ["harmonics", "corrections"])]
    coefficients: Option<PathBuf>,
    /// NGA EGM96 harmonic coefficient file
    #[arg(long, requires = "corrections")]
    harmonics: Option<PathBuf>,
    /// NGA CORRCOEF correction coefficient file
    #[arg(long, requires = "harmonics")]
    corrections: Option<PathBuf>,
}

impl SourceArgs {
    fn resolve(&self, config: &GeoidConfig) -> CoefficientSource {
        match (&self.coefficients, &self.harmonics, &self.corrections) {
            (Some(path), _, _) => CoefficientSource::Csv { path: path.clone() },
            (None, Some(harmonics), Some(corrections)) => CoefficientSource::Nga {
                harmonics: harmonics.clone(),
                corrections: corrections.clone(),
            },
            _ => config.coefficients.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum HeightReference {
    /// Height above the WGS84 ellipsoid
    Ellipsoid,
    /// Height above the geoid (mean sea level)
    Orthometric,
}

#[derive(Args, Clone, Debug)]
struct PointArgs {
    /// WGS84 latitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    latitude: f64,
    /// WGS84 longitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    longitude: f64,
    /// Height to convert, in meters
    #[arg(long, allow_hyphen_values = true)]
    height: Option<f64>,
    /// Reference surface of --height
    #[arg(long, value_enum, default_value_t = HeightReference::Ellipsoid)]
    reference: HeightReference,
    #[command(flatten)]
    source: SourceArgs,
}

#[derive(Args, Clone, Debug)]
struct BatchArgs {
    /// Input CSV file of positions
    #[arg(short, long, value_parser)]
    input: PathBuf,
    /// Output CSV file
    #[arg(short, long, value_parser)]
    output: PathBuf,
    /// Evaluate positions in parallel
    #[arg(long)]
    parallel: bool,
    #[command(flatten)]
    source: SourceArgs,
}

#[derive(Args, Clone, Debug)]
struct ConvertArgs {
    /// NGA EGM96 harmonic coefficient file
    #[arg(long)]
    harmonics: PathBuf,
    /// NGA CORRCOEF correction coefficient file
    #[arg(long)]
    corrections: PathBuf,
    /// Output packed CSV table
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Args, Clone, Debug)]
struct CreateConfigArgs {
    /// Output configuration file (.json, .yaml, .yml or .toml)
    #[arg(short, long, default_value = "egm96.toml")]
    output: PathBuf,
}

fn run_point(args: &PointArgs, config: &GeoidConfig) -> Result<(), Box<dyn Error>> {
    let model = Egm96::from_source(&args.source.resolve(config))?;
    let undulation = model.compute_altitude_offset(args.latitude, args.longitude);
    info!(
        "Undulation at ({}, {}): {:.3} m",
        args.latitude, args.longitude, undulation
    );
    println!("undulation: {:.3} m", undulation);
    if let Some(height) = args.height {
        match args.reference {
            HeightReference::Ellipsoid => {
                let orthometric =
                    model.ellipsoidal_to_orthometric(args.latitude, args.longitude, height);
                println!("orthometric height: {:.3} m", orthometric);
            }
            HeightReference::Orthometric => {
                let ellipsoidal =
                    model.orthometric_to_ellipsoidal(args.latitude, args.longitude, height);
                println!("ellipsoidal height: {:.3} m", ellipsoidal);
            }
        }
    }
    Ok(())
}

fn run_batch(args: &BatchArgs, config: &GeoidConfig) -> Result<(), Box<dyn Error>> {
    validate_input_file(&args.input)?;
    ensure_parent(&args.output)?;
    let model = Egm96::from_source(&args.source.resolve(config))?;
    let parallel = args.parallel || config.batch.parallel;
    let count = batch::process_file(&model, &args.input, &args.output, parallel)?;
    println!("Processed {} positions into {}", count, args.output.display());
    Ok(())
}

fn run_convert(args: &ConvertArgs) -> Result<(), Box<dyn Error>> {
    validate_input_file(&args.harmonics)?;
    validate_input_file(&args.corrections)?;
    ensure_parent(&args.output)?;
    let table = CoefficientTable::from_nga_files(&args.harmonics, &args.corrections)?;
    table.to_csv(&args.output)?;
    println!(
        "Wrote {} coefficient rows to {}",
        table.len(),
        args.output.display()
    );
    Ok(())
}

fn create_config_file(output: &Path) -> Result<(), Box<dyn Error>> {
    ensure_parent(output)?;
    GeoidConfig::default().to_file(output)?;
    println!("Configuration file created: {}", output.display());
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => GeoidConfig::from_file(path)?,
        None => GeoidConfig::default(),
    };

    // CLI flags take precedence over the config file
    let log_level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.to_string());
    let log_file = cli.log_file.as_deref().or(config.logging.file.as_deref());
    init_logger(&log_level, log_file)?;

    let result = match &cli.command {
        Command::Point(args) => run_point(args, &config),
        Command::Batch(args) => run_batch(args, &config),
        Command::Convert(args) => run_convert(args),
        Command::CreateConfig(args) => create_config_file(&args.output),
    };
    if let Err(e) = &result {
        error!("{}", e);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_point_args() {
        let cli = Cli::parse_from([
            "egm96",
            "point",
            "--latitude",
            "-33.5",
            "--longitude",
            "151.25",
            "--height",
            "40",
            "--coefficients",
            "table.csv",
        ]);
        match cli.command {
            Command::Point(args) => {
                assert_eq!(args.latitude, -33.5);
                assert_eq!(args.longitude, 151.25);
                assert_eq!(args.height, Some(40.0));
                assert!(matches!(args.reference, HeightReference::Ellipsoid));
                assert_eq!(
                    args.source.resolve(&GeoidConfig::default()),
                    CoefficientSource::Csv {
                        path: PathBuf::from("table.csv")
                    }
                );
            }
            _ => panic!("expected point command"),
        }
    }

    #[test]
    fn test_source_falls_back_to_config() {
        let config = GeoidConfig {
            coefficients: CoefficientSource::Nga {
                harmonics: PathBuf::from("EGM96"),
                corrections: PathBuf::from("CORRCOEF"),
            },
            ..GeoidConfig::default()
        };
        assert_eq!(SourceArgs::default().resolve(&config), config.coefficients);
    }

    #[test]
    fn test_nga_flags_require_each_other() {
        let result = Cli::try_parse_from([
            "egm96",
            "point",
            "--latitude",
            "0",
            "--longitude",
            "0",
            "--harmonics",
            "EGM96",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_batch_args() {
        let cli = Cli::parse_from([
            "egm96",
            "--log-level",
            "debug",
            "batch",
            "-i",
            "in.csv",
            "-o",
            "out.csv",
            "--parallel",
        ]);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Command::Batch(args) => {
                assert_eq!(args.input, PathBuf::from("in.csv"));
                assert!(args.parallel);
            }
            _ => panic!("expected batch command"),
        }
    }
}
