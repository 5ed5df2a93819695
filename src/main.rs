use anyhow::Result;
use clap::Parser;

use todos::logging::{init_tracing, LogTarget};

fn main() -> Result<()> {
    let cli = todos::cli::Cli::parse();
    let config = todos::config::from_cli(&cli)?;

    match cli.command.clone() {
        Some(todos::cli::CliCommand::Tui) | None => {
            init_tracing(cli.log_filter.clone(), LogTarget::File(config.log_path()))?;
            todos::tui::run(config)?;
        }
        Some(command) => {
            init_tracing(cli.log_filter.clone(), LogTarget::Stderr)?;
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            todos::commands::execute(&config, command, &mut handle)?;
        }
    }

    Ok(())
}
