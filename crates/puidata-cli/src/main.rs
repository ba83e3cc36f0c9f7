use clap::Parser;
use puidata_core::{config, logging};

mod cli;

use crate::cli::Cli;

fn main() {
    let cli = Cli::parse();

    // The [logging] section decides where logs go, so config comes first.
    let cfg = match config::load_or_init() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("puidata error: {:#}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = logging::init_logging(&cfg.logging) {
        logging::init_logging_stderr(&cfg.logging);
        tracing::warn!("file logging unavailable: {:#}", err);
    }

    if let Err(err) = cli.run(&cfg) {
        eprintln!("puidata error: {:#}", err);
        std::process::exit(1);
    }
}
