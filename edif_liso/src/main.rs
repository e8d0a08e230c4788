//! `edif2liso` command-line interface.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use edif_liso::GeneratorConfig;
use edif_sexpr::Dialect;
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "edif2liso")]
#[command(about = "Generate LISO input files from an EDIF netlist", long_about = None)]
#[command(version)]
struct Cli {
    /// EDIF netlist to convert
    #[arg(value_name = "EDIF_FILE")]
    input: PathBuf,

    /// Directory the .fil files are written to
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Frequency sweep written to the FREQ command
    #[arg(long, value_name = "SWEEP", default_value = "LOG 0.1 100k 300")]
    freq: String,

    /// Read numbers with a decimal point as reals instead of tokens
    #[arg(long)]
    reals: bool,

    /// Leave out the "Autogenerated" comment line
    #[arg(long)]
    no_header: bool,

    /// More log output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let input = fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read netlist: {}", cli.input.display()))?;

    let base_name = cli
        .input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .with_context(|| format!("No file name in {}", cli.input.display()))?;

    let mut config = GeneratorConfig {
        frequency: cli.freq.clone(),
        ..GeneratorConfig::default()
    };
    if !cli.no_header {
        let invocation = std::env::args().collect::<Vec<_>>().join(" ");
        config = config.with_autogenerated_header(&invocation);
    }

    let dialect = Dialect { reals: cli.reals };

    let files = edif_liso::convert(&input, &base_name, dialect, &config)
        .with_context(|| format!("Failed to convert {}", cli.input.display()))?;

    edif_liso::write_files(&files, &cli.output_dir).with_context(|| {
        format!(
            "Failed to write LISO files to {}",
            cli.output_dir.display()
        )
    })?;

    Ok(())
}
