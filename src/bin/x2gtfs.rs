//! Converts a directory of spreadsheet timetables into a GTFS archive.
use clap::Parser;
use env_logger::Env;
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;
use x2gtfs::{convert, Configuration};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// YAML configuration describing the layout of the spreadsheets
    config: PathBuf,
    /// Path of the GTFS zip archive to write
    output: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let result = Configuration::from_path(&args.config).and_then(|c| convert(&c, &args.output));
    match result {
        Ok(assembly) => {
            log::info!(
                "{} trips and {} stop times written",
                assembly.trips.len(),
                assembly.stop_times.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                error!("  caused by: {}", cause);
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
