pub use todos_core::config::*;
pub use todos_core::AppConfig;

use crate::cli::Cli;

pub fn from_cli(cli: &Cli) -> anyhow::Result<AppConfig> {
    AppConfig::discover(cli.overrides())
}
