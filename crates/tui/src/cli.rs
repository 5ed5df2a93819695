use std::path::PathBuf;

use clap::{value_parser, Args, Parser, Subcommand};

use crate::config::ConfigOverrides;
use crate::core::SettlementPolicy;
use crate::model::FilterMode;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "todos",
    version,
    about = "Keyboard-first client for a remote todo list.",
    after_help = "Examples:\n  todos                    Launch the TUI (same as `todos tui`)\n  todos list --filter active\n  todos add Buy milk\n  todos delete 12 13\n  todos clear-completed"
)]
pub struct Cli {
    /// Override the data directory used for logs (defaults to platform-specific app dir)
    #[arg(long, value_name = "PATH", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Base URL of the todo API (falls back to TODOS_API_URL)
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Owner whose todos are shown (falls back to TODOS_USER_ID, 0 disables the list)
    #[arg(long = "user-id", value_name = "ID", global = true, value_parser = value_parser!(u64))]
    pub user_id: Option<u64>,

    /// Request timeout in seconds
    #[arg(long = "timeout", value_name = "SECONDS", global = true, value_parser = value_parser!(u64))]
    pub timeout: Option<u64>,

    /// How concurrent deletes settle shared loading state
    #[arg(long = "settlement", value_enum, global = true)]
    pub settlement: Option<SettlementPolicy>,

    /// Override the tracing filter (e.g. "info", "debug", or full directives)
    #[arg(long = "log", value_name = "DIRECTIVE", global = true)]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            data_dir: self.data_dir.clone(),
            api_url: self.api_url.clone(),
            user_id: self.user_id,
            timeout: self.timeout.map(std::time::Duration::from_secs),
            policy: self.settlement,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Launch the keyboard-first terminal UI (default command)
    Tui,
    /// Print the owner's todos
    List(ListArgs),
    /// Create a todo
    Add(AddArgs),
    /// Delete one or more todos by id
    Delete(DeleteArgs),
    /// Delete every completed todo
    ClearCompleted,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Which todos to show
    #[arg(long, value_enum, default_value_t = FilterMode::All)]
    pub filter: FilterMode,

    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Todo title
    #[arg(value_name = "TITLE", required = true)]
    pub title: Vec<String>,
}

impl AddArgs {
    pub fn title(&self) -> String {
        self.title.join(" ").trim().to_string()
    }
}

#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    /// One or more todo ids to delete
    #[arg(value_name = "ID", required = true, value_parser = value_parser!(u64))]
    pub ids: Vec<u64>,
}
