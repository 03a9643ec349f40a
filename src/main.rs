//! Berth CLI entry point.

use std::process::ExitCode;

use berth::cli::{early_exit, parse_args, CommandDispatcher, EarlyExit};
use berth::ui::{TerminalUI, UserInterface};
use clap::CommandFactory;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
///
/// Logs go to stderr; stdout is reserved for user-facing output.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("berth=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("berth=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    match early_exit(&args) {
        Some(EarlyExit::Help) => {
            let _ = berth::cli::Cli::command().print_help();
            println!();
            return ExitCode::SUCCESS;
        }
        Some(EarlyExit::Version) => {
            println!("berth {}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
        None => {}
    }

    let cli = parse_args(args);
    init_tracing(cli.debug);

    tracing::debug!("Berth starting with args: {:?}", cli);

    let mut ui = TerminalUI::new();
    let dispatcher = CommandDispatcher::new();

    match dispatcher.dispatch(&cli, &mut ui) {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            ExitCode::from(1)
        }
    }
}
