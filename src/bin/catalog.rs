extern crate catalog_genome;
use catalog_genome::{BuildConfig, Engine};

use std::fs;
use std::path::PathBuf;
use std::process;

extern crate clap;
use clap::{crate_version, Arg, Command};

#[macro_use]
extern crate log;
extern crate env_logger;
use env_logger::Builder;
use log::LevelFilter;

fn build_cli() -> Command {
    Command::new("catalog-genome")
        .version(crate_version!())
        .about("Aggregates per-sample variant calls into a consolidated allele/proteoform catalog")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("build")
                .about("Build a catalog from a BUILD configuration document")
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help("Path to the BUILD configuration YAML document")
                        .required(true),
                )
                .arg(
                    Arg::new("threads")
                        .short('t')
                        .long("threads")
                        .help("Override the thread count from the configuration document"),
                )
                .arg(
                    Arg::new("verbose")
                        .short('v')
                        .long("verbose")
                        .num_args(0)
                        .help("Increase log verbosity"),
                ),
        )
}

fn set_log_level(verbose: bool) {
    let mut builder = Builder::new();
    builder.filter_level(if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });
    if let Ok(filter) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filter);
    }
    let _ = builder.try_init();
}

fn run_build(matches: &clap::ArgMatches) -> anyhow::Result<()> {
    let config_path = PathBuf::from(matches.get_one::<String>("config").unwrap());
    let text = fs::read_to_string(&config_path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", config_path.display()))?;
    let mut config = BuildConfig::from_yaml_str(&text)?;

    if let Some(threads) = matches.get_one::<String>("threads") {
        config.threads = threads
            .parse()
            .map_err(|_| anyhow::anyhow!("--threads must be a positive integer"))?;
    }

    let reference = load_reference(&config)?;
    let records = load_sample_records(&config)?;
    let now = chrono::Utc::now().to_rfc3339();

    let engine = Engine::new(&reference, &config);
    let catalog = engine.run(records, &now)?;

    let output = serde_json::to_string_pretty(&catalog)?;
    fs::write(&config.output_path, output)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", config.output_path))?;
    info!("catalog written to {}", config.output_path);
    Ok(())
}

/// Loading the reference sequence and feature annotation files is a
/// collaborator out of scope for the core; this thin shim exists only so
/// the binary has something to call. A real build links a FASTA/GFF reader
/// here instead.
fn load_reference(_config: &BuildConfig) -> anyhow::Result<catalog_genome::reference::ReferenceStore> {
    anyhow::bail!(
        "reference sequence/annotation ingest is outside the core engine's scope; wire in a reader before calling this binary"
    )
}

fn load_sample_records(
    _config: &BuildConfig,
) -> anyhow::Result<catalog_genome::engine::SampleRecords> {
    anyhow::bail!(
        "variant-call ingest is outside the core engine's scope; wire in a reader before calling this binary"
    )
}

fn main() {
    let app = build_cli();
    let matches = app.clone().get_matches();

    match matches.subcommand() {
        Some(("build", m)) => {
            set_log_level(m.get_flag("verbose"));
            if let Err(e) = run_build(m) {
                error!("{e:#}");
                process::exit(1);
            }
        }
        _ => {
            build_cli().print_help().unwrap();
            println!();
        }
    }
}
