//! Shield command line driver

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod commands;
mod exit_codes;

use cli::Cli;
use commands::NoSampleFile;

fn main() {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match cli.command {
        cli::Command::Run(args) => commands::run::execute(args),
        cli::Command::Inspect(args) => commands::inspect::execute(args),
        cli::Command::List(args) => commands::list::execute(args),
        cli::Command::Synth(args) => commands::synth::execute(args),
    };

    let exit_code = match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if e.downcast_ref::<NoSampleFile>().is_some() {
                exit_codes::NO_SAMPLE_FILE
            } else {
                exit_codes::FAILURE
            }
        }
    };

    std::process::exit(exit_code);
}
