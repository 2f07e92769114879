//! Swath subsetting command
//!
//! Reads scan files, subsets them and writes one interchange stream to a
//! file or to stdout.

use std::io::{self, BufWriter};
use std::path::PathBuf;

use clap::ArgMatches;
use log::{info, warn};

use crate::api::SwathKit;
use crate::commands::command_traits::Command;
use crate::config::{parse_degeneracy, SubsetConfig};
use crate::coordinate::BoundingBox;
use crate::errors::{SubsetError, SubsetResult};
use crate::input::read_list;
use crate::swath::ValueRange;

/// Inputs above which a progress bar is drawn
const PROGRESS_THRESHOLD: usize = 8;

/// Command for subsetting scans into a stream
pub struct SubsetCommand {
    /// Scan files in time order
    inputs: Vec<PathBuf>,
    /// Output stream file, stdout when absent
    output_file: Option<PathBuf>,
    /// Effective configuration
    config: SubsetConfig,
}

impl SubsetCommand {
    /// Create a new subset command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    ///
    /// # Returns
    /// A new SubsetCommand instance or an error
    pub fn new(args: &ArgMatches) -> SubsetResult<Self> {
        let config = Self::build_config(args)?;

        let mut inputs: Vec<PathBuf> = args
            .get_many::<String>("inputs")
            .map(|values| values.map(PathBuf::from).collect())
            .unwrap_or_default();
        if let Some(list) = args.get_one::<String>("list") {
            inputs.extend(read_list(&PathBuf::from(list))?);
        }
        if inputs.is_empty() {
            return Err(SubsetError::ConfigError(
                "No scan files given; pass them as arguments or with --list".to_string(),
            ));
        }

        Ok(SubsetCommand {
            inputs,
            output_file: args.get_one::<String>("output").map(PathBuf::from),
            config,
        })
    }

    /// Start from the configuration file, if any, then apply explicit flags
    pub(crate) fn build_config(args: &ArgMatches) -> SubsetResult<SubsetConfig> {
        let mut config = match args.get_one::<String>("config") {
            Some(path) => {
                info!("Loading configuration from {}", path);
                SubsetConfig::from_file(path)?
            }
            None => SubsetConfig::default(),
        };

        if let Some(bbox) = args.get_one::<String>("bbox") {
            config.bounds = BoundingBox::from_string(bbox)?;
        }
        if let Some(range) = args.get_one::<String>("valid-range") {
            config.valid_range = ValueRange::from_string(range)?;
        }
        if let Some(policy) = args.get_one::<String>("degeneracy") {
            config.degeneracy = parse_degeneracy(policy)?;
        }
        if let Some(description) = args.get_one::<String>("description") {
            config.description = description.clone();
        }
        if let Some(timesteps) = args.get_one::<usize>("timesteps") {
            config.timesteps = Some(*timesteps);
        }
        if args.get_flag("corners") {
            config.corners = true;
        }
        if args.get_flag("aggregate") {
            config.aggregate = true;
        }

        Ok(config)
    }
}

impl Command for SubsetCommand {
    fn execute(&self) -> SubsetResult<()> {
        let [min_lon, min_lat, max_lon, max_lat] = self.config.bounds.to_array();
        info!(
            "Subsetting {} scans to [{}, {}, {}, {}]{}{}",
            self.inputs.len(),
            min_lon,
            min_lat,
            max_lon,
            max_lat,
            if self.config.corners { " with corners" } else { "" },
            if self.config.aggregate { ", daily means" } else { "" }
        );

        let kit = SwathKit::new(self.config.clone())
            .with_progress(self.inputs.len() > PROGRESS_THRESHOLD);
        let run = kit.subset_files(&self.inputs)?;

        if run.records.is_empty() {
            warn!("No pixel of any scan lies in the subset; nothing written");
            return Ok(());
        }

        match &self.output_file {
            Some(path) => kit.write_file(&run, path)?,
            None => {
                let stdout = io::stdout();
                kit.write_stream(&run, BufWriter::new(stdout.lock()))?;
            }
        }

        info!("Wrote {} records of '{}'", run.records.len(), run.variable);
        Ok(())
    }
}
