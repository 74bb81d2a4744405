//! lexdesk: practice management metrics over typed matter, hearing,
//! document and time-entry rows.

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod practice;
pub mod settings;

pub use config::Config;
pub use error::{Error, Result};
pub use settings::Settings;
