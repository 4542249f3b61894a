use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};

use gridconv::config::Config;
use gridconv::error::GridError;

/// Convert tile-based map images into two-layer grid JSON and back
#[derive(Parser)]
#[command(name = "gridconv", version, about)]
struct Args {
    /// Read configuration from a JSON file (flags below override it)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reference tilemap image
    #[arg(short, long)]
    tilemap: Option<PathBuf>,

    /// Directory of map images to decompose
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Directory for grid JSON files and recreated images
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Tile edge length in pixels
    #[arg(long)]
    tile_size: Option<u32>,

    /// Map image edge length in pixels (multiple of tile size)
    #[arg(long)]
    map_size: Option<u32>,

    /// Fail an image when any cell matches nothing in the catalog
    #[arg(long)]
    strict: bool,
}

impl Args {
    fn into_config(self) -> Result<Config, GridError> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        if let Some(tilemap) = self.tilemap {
            config.tilemap = tilemap;
        }
        if let Some(input_dir) = self.input_dir {
            config.input_dir = input_dir;
        }
        if let Some(output_dir) = self.output_dir {
            config.output_dir = output_dir;
        }
        if let Some(tile_size) = self.tile_size {
            config.tile_size = tile_size;
        }
        if let Some(map_size) = self.map_size {
            config.map_size = map_size;
        }
        if self.strict {
            config.strict = true;
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    let _ = TermLogger::init(
        LevelFilter::Info,
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );

    let config = match Args::parse().into_config() {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    match gridconv::run(&config) {
        Ok(summary) => {
            println!(
                "{} images processed: {} matched, {} mismatched, {} failed",
                summary.processed, summary.matched, summary.mismatched, summary.failed
            );
            if summary.is_clean() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
