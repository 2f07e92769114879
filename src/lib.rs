pub mod errors;
pub mod io;
pub mod utils;
pub mod coordinate;
pub mod swath;
pub mod input;
pub mod interchange;
pub mod config;
pub mod commands;
pub mod api;

pub use crate::api::{SubsetRun, SwathKit};
pub use crate::config::SubsetConfig;
pub use crate::errors::{ErrorScope, SubsetError, SubsetResult};

pub use coordinate::{BoundingBox, Point, MISSING};
pub use interchange::{Header, InterchangeReader, InterchangeWriter};
pub use swath::{SubsetOptions, SubsetPipeline, SubsetRecord, Timestamp};
