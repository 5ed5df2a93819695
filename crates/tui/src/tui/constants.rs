use std::time::Duration;

pub(crate) const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub(crate) const TICK_RATE: Duration = Duration::from_millis(120);
pub(crate) const STATUS_TTL: Duration = Duration::from_secs(5);

pub(crate) const SPINNER_FRAMES: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

pub(crate) const STATUS_ENTER_ADD: &str = "What needs to be done? (Enter to add, Esc to close)";
pub(crate) const STATUS_REFRESHING: &str = "Refreshing todos";
pub(crate) const STATUS_HELP: &str = "Keyboard reference (Enter/Esc to close)";
pub(crate) const STATUS_NOTHING_SELECTED: &str = "Nothing to delete";
pub(crate) const STATUS_NO_COMPLETED: &str = "No completed todos to clear";
pub(crate) const STATUS_ALREADY_DELETING: &str = "Already deleting that todo";
pub(crate) const STATUS_SAVING: &str = "Saving todo…";
