//! Run configuration
//!
//! Settings come from a TOML file, command-line flags, or both. Flags are
//! applied after the file so they win.

use std::fs;

use crate::coordinate::BoundingBox;
use crate::errors::{SubsetError, SubsetResult};
use crate::swath::{DegeneracyPolicy, SubsetOptions, Validity, ValueRange};

/// Description written when none is configured
pub const DEFAULT_DESCRIPTION: &str = "Subset of satellite swath data";

/// Everything a subsetting run needs besides its inputs
#[derive(Debug, Clone, PartialEq)]
pub struct SubsetConfig {
    pub bounds: BoundingBox,
    pub corners: bool,
    pub aggregate: bool,
    pub valid_range: ValueRange,
    pub degeneracy: DegeneracyPolicy,
    pub description: String,
    /// Header timestep count; derived from the records when `None`
    pub timesteps: Option<usize>,
}

impl Default for SubsetConfig {
    fn default() -> Self {
        SubsetConfig {
            bounds: BoundingBox::global(),
            corners: false,
            aggregate: false,
            valid_range: ValueRange::default(),
            degeneracy: DegeneracyPolicy::default(),
            description: DEFAULT_DESCRIPTION.to_string(),
            timesteps: None,
        }
    }
}

impl SubsetConfig {
    /// Parse a TOML configuration
    ///
    /// Recognized keys: `bbox` ("lonmin,latmin,lonmax,latmax" or an array of
    /// four numbers), `corners`, `aggregate`, `valid_range` ("min,max" or a
    /// two-number array), `degeneracy`, `description` and `timesteps`.
    /// Missing keys keep their defaults.
    pub fn from_str(content: &str) -> SubsetResult<Self> {
        let toml_value: toml::Value = match content.parse() {
            Ok(value) => value,
            Err(e) => return Err(SubsetError::ConfigError(format!("Failed to parse TOML: {}", e))),
        };

        let mut config = SubsetConfig::default();

        if let Some(value) = toml_value.get("bbox") {
            config.bounds = match Self::numbers(value, "bbox")? {
                Some(n) if n.len() == 4 => BoundingBox::new(n[0], n[1], n[2], n[3])?,
                Some(_) => return Err(SubsetError::ConfigError("bbox needs four numbers".to_string())),
                None => BoundingBox::from_string(Self::string(value, "bbox")?)?,
            };
        }

        if let Some(value) = toml_value.get("valid_range") {
            config.valid_range = match Self::numbers(value, "valid_range")? {
                Some(n) if n.len() == 2 => ValueRange::new(n[0], n[1])?,
                Some(_) => return Err(SubsetError::ConfigError("valid_range needs two numbers".to_string())),
                None => ValueRange::from_string(Self::string(value, "valid_range")?)?,
            };
        }

        if let Some(value) = toml_value.get("corners") {
            config.corners = Self::boolean(value, "corners")?;
        }
        if let Some(value) = toml_value.get("aggregate") {
            config.aggregate = Self::boolean(value, "aggregate")?;
        }

        if let Some(value) = toml_value.get("degeneracy") {
            config.degeneracy = parse_degeneracy(Self::string(value, "degeneracy")?)?;
        }
        if let Some(value) = toml_value.get("description") {
            config.description = Self::string(value, "description")?.to_string();
        }
        if let Some(value) = toml_value.get("timesteps") {
            let timesteps = value
                .as_integer()
                .filter(|&n| n >= 0)
                .ok_or_else(|| SubsetError::ConfigError("timesteps must be a non-negative integer".to_string()))?;
            config.timesteps = Some(timesteps as usize);
        }

        Ok(config)
    }

    /// Load a TOML configuration file
    pub fn from_file(path: &str) -> SubsetResult<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => return Err(SubsetError::IoError(e)),
        };

        Self::from_str(&contents)
    }

    /// Options for the subsetting pipeline
    pub fn options(&self) -> SubsetOptions {
        SubsetOptions {
            bounds: self.bounds,
            validity: Validity {
                range: self.valid_range,
                degeneracy: self.degeneracy,
            },
            corners: self.corners,
            aggregate: self.aggregate,
        }
    }

    /// Numbers of an array value, or `None` if the value is not an array
    fn numbers(value: &toml::Value, key: &str) -> SubsetResult<Option<Vec<f64>>> {
        let Some(array) = value.as_array() else {
            return Ok(None);
        };
        array
            .iter()
            .map(|item| {
                item.as_float()
                    .or_else(|| item.as_integer().map(|i| i as f64))
                    .ok_or_else(|| SubsetError::ConfigError(format!("{} must hold numbers", key)))
            })
            .collect::<SubsetResult<Vec<f64>>>()
            .map(Some)
    }

    fn string<'v>(value: &'v toml::Value, key: &str) -> SubsetResult<&'v str> {
        value
            .as_str()
            .ok_or_else(|| SubsetError::ConfigError(format!("{} must be a string", key)))
    }

    fn boolean(value: &toml::Value, key: &str) -> SubsetResult<bool> {
        value
            .as_bool()
            .ok_or_else(|| SubsetError::ConfigError(format!("{} must be true or false", key)))
    }
}

/// Parse a degeneracy policy name
pub fn parse_degeneracy(name: &str) -> SubsetResult<DegeneracyPolicy> {
    DegeneracyPolicy::from_name(name).ok_or_else(|| {
        SubsetError::ConfigError(format!(
            "Unknown degeneracy policy '{}'. Expected 'collapse' or 'coincident[:tolerance]'",
            name
        ))
    })
}
