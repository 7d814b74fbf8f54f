//! Daybook CLI entry point.

use clap::Parser;
use daybook::cli::commands;
use daybook::cli::{Cli, Commands};
use daybook::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    // Resolve effective JSON mode: --json OR non-TTY stdout
    let json = cli.json || !std::io::IsTerminal::is_terminal(&std::io::stdout());

    // Run the command and handle errors
    match run(&cli, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,reqwest=info,hyper=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, json: bool) -> Result<(), Error> {
    let home = cli.home.as_deref();
    match &cli.command {
        Commands::Version => commands::version::execute(json),

        // Records
        Commands::Tx { command } => commands::record::execute_tx(command, home, json),
        Commands::Task { command } => commands::record::execute_task(command, home, json),

        // Reports
        Commands::Summary { year, month, day } => {
            commands::summary::execute(year, month.as_deref(), day.as_deref(), home, json)
        }

        // Backup
        Commands::Backup { command } => commands::backup::execute(command, home, json),

        // Profile and settings
        Commands::Profile { command } => commands::profile::execute(command, home, json),
        Commands::View { command } => commands::settings::execute_view(command, home, json),
        Commands::Reset { scope, confirm } => {
            commands::settings::execute_reset(scope, confirm.as_deref(), home, json)
        }

        // Sync
        Commands::Sync { command } => commands::sync::execute(command, home, json),
    }
}
