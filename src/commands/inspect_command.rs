//! Interchange stream inspection command

use std::path::PathBuf;

use clap::ArgMatches;
use log::info;

use crate::api::SwathKit;
use crate::commands::command_traits::Command;
use crate::errors::{SubsetError, SubsetResult};

/// Command for summarizing an existing stream file
pub struct InspectCommand {
    /// Path to the stream file
    input_file: PathBuf,
}

impl InspectCommand {
    /// Create a new inspect command from the first input argument
    pub fn new(args: &ArgMatches) -> SubsetResult<Self> {
        let input_file = args
            .get_many::<String>("inputs")
            .and_then(|mut inputs| inputs.next())
            .ok_or_else(|| SubsetError::ConfigError("Missing stream file to inspect".to_string()))?;

        Ok(InspectCommand {
            input_file: PathBuf::from(input_file),
        })
    }
}

impl Command for InspectCommand {
    fn execute(&self) -> SubsetResult<()> {
        info!("Inspecting {}", self.input_file.display());
        let report = SwathKit::inspect(&self.input_file)?;
        print!("{}", report);
        Ok(())
    }
}
