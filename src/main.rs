use std::io;
use std::path::PathBuf;
use std::process::exit;

use clap::error::ErrorKind;
use clap::Parser;
use log::{error, info};
use structured_logger::json::new_writer;
use structured_logger::Builder;

use building_positions::config::{load_user_config, Invocation, UserConfig};
use building_positions::errors::Result;
use building_positions::pipeline;
use building_positions::source::open_source;

const USAGE: &str = "Usage: extract [--config FILE] <source> [<bin_count> [<min_area>]] <output_dir>";

/// Writes the position of every building in an OSM file as CSV.
#[derive(Parser, Debug)]
#[command(name = "extract", version)]
struct Args {
    /// JSON file with tuning options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input file: .osm, .osm.xz or .osm.pbf
    source: PathBuf,

    /// [<bin_count> [<min_area>]] <output_dir>
    #[arg(num_args = 1..=3, required = true, value_name = "ARGS")]
    rest: Vec<String>,
}

fn setup_logging(level: &str) {
    Builder::with_level(level)
        .with_target_writer("*", new_writer(io::stderr()))
        .init();
}

fn usage_error(message: &str) -> ! {
    eprintln!("{}", message);
    eprintln!("{}", USAGE);
    exit(1)
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => load_user_config(path)?,
        None => UserConfig::default(),
    };
    setup_logging(&config.log_level);

    let invocation = match Invocation::from_args(args.source, &args.rest) {
        Ok(invocation) => invocation,
        Err(err) => usage_error(&err.message),
    };

    let source = open_source(&invocation.source)?;
    info!(
        source = source.name(),
        bin_count = invocation.mode.bin_count(),
        min_area = invocation.mode.min_area().unwrap_or(0.0);
        "Extracting building positions"
    );
    pipeline::run(source.as_ref(), &invocation, &config)?;
    Ok(())
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
            _ => usage_error(&err.to_string()),
        },
    };

    if let Err(err) = run(args) {
        error!(err = err.message.as_str(); "Extraction failed");
        eprintln!("error: {}", err);
        exit(1);
    }
}
