pub mod commands;
pub mod config;
pub mod controller;
pub mod model;
pub mod remote;

pub use commands::connect;
pub use config::{AppConfig, ConfigOverrides};
pub use controller::{ActionError, SettlementPolicy, TodoController, ViewState};
pub use model::*;
pub use remote::{RemoteStore, StoreError, TodoStore};
