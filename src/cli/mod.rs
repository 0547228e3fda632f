//! CLI command handling module
//!
//! Handles all CLI subcommands and argument parsing.

mod commands;
mod logging;
mod records;
mod version;

pub use commands::{ConfigSubcommand, handle_config_command};
pub use logging::*;
pub use records::{RecordCommand, handle_record_command};
pub use version::display_version;
