//! CLI command implementations
//!
//! This module contains implementations of various commands
//! supported by the CLI application using the Command pattern.

pub mod cli;
pub mod command_traits;
pub mod inspect_command;
pub mod subset_command;

pub use cli::build_cli;
pub use command_traits::{Command, CommandFactory};
pub use inspect_command::InspectCommand;
pub use subset_command::SubsetCommand;

use clap::ArgMatches;
use crate::errors::SubsetResult;

/// Factory for creating command instances based on CLI arguments
///
/// This factory examines the command-line arguments and creates
/// the appropriate command instance for execution.
pub struct SwathkitCommandFactory;

impl SwathkitCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        SwathkitCommandFactory
    }
}

impl Default for SwathkitCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandFactory for SwathkitCommandFactory {
    fn create_command(&self, args: &ArgMatches) -> SubsetResult<Box<dyn Command>> {
        if args.get_flag("inspect") {
            Ok(Box::new(InspectCommand::new(args)?))
        } else {
            // Default to subsetting
            Ok(Box::new(SubsetCommand::new(args)?))
        }
    }
}
