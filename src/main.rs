//! Command-line front end: Wigle CSV in, KML overlay out

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use wigle_triangulate::{
    KmlWriter, OverlayBuilder, PipelineConfig, PipelineOutcome, TriangulationError,
    TriangulationPipeline, WigleCsvSource,
};

#[derive(Parser)]
#[command(name = "wigle-triangulate")]
#[command(about = "Triangulate WiFi access point locations from Wigle wardriving CSV", long_about = None)]
#[command(after_help = "Example:\n  wigle-triangulate input.csv -o output.kml -m 3\n  wigle-triangulate wigledata.csv --min-observations 5 --output triangulated.kml")]
struct Args {
    /// Input Wigle CSV file
    input: PathBuf,

    /// Output KML file (default: input filename with .kml extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Minimum number of observations required for triangulation (default: 3)
    #[arg(short, long)]
    min_observations: Option<usize>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<PipelineConfig, String> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path).map_err(|e| e.to_string())?,
        None => PipelineConfig::default(),
    };
    if let Some(min_observations) = args.min_observations {
        config = config.with_min_observations(min_observations);
    }
    Ok(config)
}

fn print_summary(outcome: &PipelineOutcome, min_observations: usize) {
    let summary = &outcome.summary;
    println!(
        "Found {} access points with {}+ observations",
        summary.located, min_observations
    );
    if let Some(mean) = summary.mean_uncertainty_m {
        println!("Average uncertainty: {:.1}m", mean);
    }
    if let Some(max) = summary.max_observation_count {
        println!("Maximum observations for a single AP: {}", max);
    }
    if summary.records_skipped > 0 {
        println!(
            "Skipped {} of {} records (no fix: {}, missing MAC: {}, missing coordinates: {}, malformed: {}, unreadable: {})",
            summary.records_skipped,
            summary.records_read,
            summary.skipped.no_fix,
            summary.skipped.missing_identity,
            summary.skipped.missing_coordinate,
            summary.skipped.malformed_number,
            summary.skipped.unreadable,
        );
    }
}

/// Misuse of the pipeline is reported on its own; anything else is tied to the
/// stage that failed
fn report(stage: &str, e: &TriangulationError) -> ExitCode {
    if e.is_contract_violation() {
        eprintln!("Error: {}", e);
    } else {
        eprintln!("Error {}: {}", stage, e);
    }
    ExitCode::FAILURE
}

fn run(args: Args) -> ExitCode {
    if !args.input.exists() {
        eprintln!("Error: Input file '{}' not found", args.input.display());
        return ExitCode::FAILURE;
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("kml"));

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let pipeline = match TriangulationPipeline::new(config) {
        Ok(pipeline) => pipeline,
        Err(e) => return report("configuring pipeline", &e),
    };

    println!("Reading Wigle CSV file: {}", args.input.display());
    println!("Minimum observations: {}", pipeline.min_observations());

    let outcome = match WigleCsvSource::open(&args.input)
        .and_then(|source| source.into_records())
        .map_err(TriangulationError::from)
        .and_then(|records| pipeline.run(records))
    {
        Ok(outcome) => outcome,
        Err(e) => return report("parsing CSV file", &e),
    };

    if outcome.is_empty() {
        println!("No access points found with enough observations for triangulation");
        return ExitCode::FAILURE;
    }

    print_summary(&outcome, pipeline.min_observations());

    println!("Creating KML file: {}", output.display());
    let document = OverlayBuilder::new(pipeline.config().overlay.clone()).build(&outcome.access_points);
    if let Err(e) = KmlWriter::new().write_to_path(&document, &output) {
        return report("creating KML file", &e);
    }

    println!("Done! Import the KML file into Google Earth to visualize the results.");
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);
    run(args)
}
