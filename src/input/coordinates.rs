//! Coordinate files and the per-path grid cache

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};

use crate::errors::{SubsetError, SubsetResult};
use crate::swath::Grid;

use super::container::{decode_reals, parse_shape, read_container, split_header};

/// First line of a coordinates file
pub const COORDINATES_TAG: &str = "COORDINATES 1.0";

/// Read a coordinates file into a grid
///
/// The header is the tag line and a "rows columns" line; the body holds
/// every longitude, then every latitude, as big-endian f32.
pub fn read_coordinates(path: &Path) -> SubsetResult<Grid> {
    let bytes = read_container(path)?;
    let (lines, body) = split_header(&bytes, 2)?;

    if lines[0] != COORDINATES_TAG {
        return Err(SubsetError::InvalidHeader(format!(
            "{} is not a coordinates file",
            path.display()
        )));
    }
    let (rows, columns) = parse_shape(&lines[1])?;
    let pixels = rows * columns;

    let mut reals = decode_reals(body, 2 * pixels)?;
    let latitudes = reals.split_off(pixels);
    debug!("Read {}x{} coordinates from {}", rows, columns, path.display());

    Grid::new(rows, columns, reals, latitudes)
}

/// Grids already read, keyed by coordinate file path
///
/// Scans sharing a coordinate file share one `Arc<Grid>`, which lets the
/// pipeline reuse corner sets between them.
#[derive(Debug, Default)]
pub struct CoordinateCache {
    grids: HashMap<PathBuf, Arc<Grid>>,
}

impl CoordinateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grid for `path`, reading it on first use
    pub fn get(&mut self, path: &Path) -> SubsetResult<Arc<Grid>> {
        if let Some(grid) = self.grids.get(path) {
            return Ok(Arc::clone(grid));
        }

        let grid = Arc::new(read_coordinates(path)?);
        info!("Loaded coordinates {} ({}x{})", path.display(), grid.rows(), grid.columns());
        self.grids.insert(path.to_path_buf(), Arc::clone(&grid));
        Ok(grid)
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }
}
