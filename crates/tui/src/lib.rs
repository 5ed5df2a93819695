pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod tui;

pub use todos_core as core;
pub use todos_core::controller;
pub use todos_core::model;
pub use todos_core::remote;

pub use todos_core::AppConfig;
