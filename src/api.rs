use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::config::SubsetConfig;
use crate::coordinate::BoundingBox;
use crate::errors::{SubsetError, SubsetResult};
use crate::input::{load_scan, CoordinateCache};
use crate::interchange::{read_stream, write_stream, Header};
use crate::swath::{SubsetPipeline, SubsetRecord};
use crate::utils::progress::ProgressTracker;
use crate::utils::summary_utils::summarize_values;

/// Variable name used when no scan names one
const DEFAULT_VARIABLE: &str = "value";

/// Outcome of subsetting a list of scan files
#[derive(Debug, Clone)]
pub struct SubsetRun {
    /// Records in emission order
    pub records: Vec<SubsetRecord>,
    /// Name of the measured variable
    pub variable: String,
    /// Units of the measured variable
    pub units: String,
    /// Subset rectangle
    pub bounds: BoundingBox,
    /// Scans processed successfully
    pub processed: usize,
    /// Scans skipped
    pub skipped: usize,
}

/// Main interface to the SwathKit library
pub struct SwathKit {
    config: SubsetConfig,
    progress: bool,
}

impl SwathKit {
    /// Create a new SwathKit instance
    pub fn new(config: SubsetConfig) -> Self {
        SwathKit {
            config,
            progress: false,
        }
    }

    /// Show a progress bar on stderr while subsetting
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &SubsetConfig {
        &self.config
    }

    /// Subset scan files, given in ascending time order
    ///
    /// A file that cannot be read, or whose scan is rejected, is skipped.
    /// The run fails only when no scan was processed.
    pub fn subset_files(&self, paths: &[PathBuf]) -> SubsetResult<SubsetRun> {
        let options = self.config.options();
        let mut pipeline = SubsetPipeline::new(options);
        let mut cache = CoordinateCache::new();
        let mut variable: Option<(String, String)> = None;

        let progress = if self.progress {
            ProgressTracker::new(paths.len() as u64, "Subsetting scans")
        } else {
            ProgressTracker::hidden()
        };

        for path in paths {
            match load_scan(path, &mut cache, &options.validity.range) {
                Ok((header, scan)) => {
                    if let Some((name, _)) = &variable {
                        if *name != header.variable {
                            warn!("{} holds '{}', not '{}'", path.display(), header.variable, name);
                        }
                    } else {
                        variable = Some((header.variable, header.units));
                    }
                    pipeline.push(&scan)?;
                }
                Err(e) => pipeline.skip(&e),
            }
            progress.increment(1);
        }
        progress.finish();

        let output = pipeline.finish()?;
        info!(
            "Subset {} scans ({} skipped) into {} records using {} coordinate grids",
            output.processed,
            output.skipped,
            output.records.len(),
            cache.len()
        );

        let (variable, units) =
            variable.unwrap_or_else(|| (DEFAULT_VARIABLE.to_string(), "-".to_string()));
        Ok(SubsetRun {
            records: output.records,
            variable,
            units,
            bounds: options.bounds,
            processed: output.processed,
            skipped: output.skipped,
        })
    }

    /// Header describing a run's stream
    pub fn header(&self, run: &SubsetRun) -> Header {
        Header::for_records(
            &self.config.description,
            &run.variable,
            &run.units,
            self.config.options().layout(),
            run.bounds,
            &run.records,
            self.config.timesteps,
        )
    }

    /// Write a run as an interchange stream
    pub fn write_stream<W: Write>(&self, run: &SubsetRun, writer: W) -> SubsetResult<W> {
        write_stream(writer, &self.header(run), &run.records)
    }

    /// Write a run to `path`
    ///
    /// The stream goes to a temporary sibling first, which is renamed into
    /// place only once it was written completely.
    pub fn write_file(&self, run: &SubsetRun, path: &Path) -> SubsetResult<()> {
        let temporary = temporary_sibling(path)?;
        info!("Writing stream to {}", path.display());

        let result = File::create(&temporary)
            .map_err(SubsetError::from)
            .and_then(|file| self.write_stream(run, BufWriter::with_capacity(1024 * 1024, file)))
            .and_then(|writer| writer.into_inner().map_err(|e| SubsetError::from(e.into_error())))
            .and_then(|file| file.sync_all().map_err(SubsetError::from));

        match result {
            Ok(()) => {
                fs::rename(&temporary, path)?;
                Ok(())
            }
            Err(e) => {
                let _ = fs::remove_file(&temporary);
                Err(e)
            }
        }
    }

    /// Read a stream file back
    pub fn read_file(path: &Path) -> SubsetResult<(Header, Vec<SubsetRecord>)> {
        let file = File::open(path)?;
        read_stream(BufReader::with_capacity(1024 * 1024, file))
    }

    /// Describe a stream file
    ///
    /// # Returns
    /// String containing the header fields, one line per record and
    /// statistics of the measured values
    pub fn inspect(path: &Path) -> SubsetResult<String> {
        let (header, records) = Self::read_file(path)?;
        let [min_lon, min_lat, max_lon, max_lat] = header.domain.to_array();

        let mut result = format!("Stream: {}\n", path.display());
        result.push_str(&format!("  Description: {}\n", header.description));
        result.push_str(&format!("  Created: {}\n", header.created));
        result.push_str(&format!("  Variables: {}\n", header.names.join(" ")));
        result.push_str(&format!("  Units: {}\n", header.units.join(" ")));
        result.push_str(&format!(
            "  Domain: {} {} {} {}\n",
            min_lon, min_lat, max_lon, max_lat
        ));
        result.push_str(&format!("  Timesteps: {}\n", header.timesteps));
        result.push_str(&format!("  Records: {}\n", records.len()));

        for (index, record) in records.iter().enumerate() {
            result.push_str(&format!(
                "  #{} {} ({}): {} points\n",
                index,
                record.timestamp(),
                record.timestamp().to_iso8601(),
                record.points()
            ));
        }

        match summarize_values(&records) {
            Some(summary) => result.push_str(&format!(
                "  Values: min {} max {} mean {} over {} points\n",
                summary.minimum, summary.maximum, summary.mean, summary.count
            )),
            None => result.push_str("  Values: none\n"),
        }

        Ok(result)
    }
}

/// Hidden file next to `path` used while writing it
fn temporary_sibling(path: &Path) -> SubsetResult<PathBuf> {
    let name = path
        .file_name()
        .ok_or_else(|| SubsetError::GenericError(format!("{} names no file", path.display())))?;
    Ok(path.with_file_name(format!(".{}.partial", name.to_string_lossy())))
}
