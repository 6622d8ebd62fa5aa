// Entrypoint for the `teleput` binary.
// - Keeps `main` small: parse arguments, build the collaborators and hand
//   them to the dispatcher.
// - Domain errors are printed to stdout and mapped to their exit codes;
//   setup failures go to stderr with exit code 1.

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use std::process::ExitCode;
use teleput_cli::api::RelayClient;
use teleput_cli::cli::Cli;
use teleput_cli::config::Settings;
use teleput_cli::dispatch::{Dispatcher, Outcome};
use teleput_cli::error::{TeleputError, EXIT_FAILURE};
use teleput_cli::key_store::KeyStore;
use teleput_cli::mime;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    match run(&cli) {
        Ok(Outcome::KeySaved) => {
            println!("Saved the new key.");
            ExitCode::SUCCESS
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<TeleputError>() {
            Some(e) => {
                println!("{}", e);
                exit_code(e.exit_code())
            }
            None => {
                eprintln!("Error: {:#}", err);
                exit_code(EXIT_FAILURE)
            }
        },
    }
}

fn run(cli: &Cli) -> Result<Outcome> {
    let settings = Settings::from_env()?;
    log::debug!("relay at {}, config in {}", settings.server, settings.config_dir.display());

    let classifier = mime::detect();
    let relay = RelayClient::new(&settings.server)?;
    let dispatcher = Dispatcher::new(KeyStore::new(&settings.config_dir), classifier, relay);

    let outcome = dispatcher.run(cli, &mut std::io::stdin().lock())?;
    Ok(outcome)
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
