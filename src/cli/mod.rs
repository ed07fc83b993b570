//! CLI module for pydoc-md

mod args;

pub use args::{Args, USAGE, USAGE_ERROR};

use crate::config::{Config, CONFIG_FILE_NAME};
use crate::error::Result;
use crate::generator::Generator;
use crate::logging;
use clap::error::ErrorKind;
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;

/// Run the CLI application
pub fn run() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(_) => {
            println!("{}", USAGE);
            println!("{}", USAGE_ERROR);
            return ExitCode::FAILURE;
        }
    };

    match execute(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn execute(args: Args) -> Result<()> {
    let config = Config::load_if_present(Path::new(CONFIG_FILE_NAME))?;
    logging::init(&config.run.log_level);
    tracing::debug!(?config, "loaded configuration");

    let generator = Generator::new(config)?;
    let report = generator.run(&args.source, &args.markdown, &args.manifest)?;

    println!("{}", report.summary());
    println!("Navigation written to: {}", report.manifest.display());

    Ok(())
}
