// Serializable field declarations, loaded from and saved to JSON

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::descriptor::FieldDescriptor;
use super::error::{FieldError, FieldResult};
use crate::bitwise::{DataType, Endianness};

#[derive(Error, Debug)]
pub enum SpecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse field spec JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid field spec: {0}")]
    Field(#[from] FieldError),
}

pub type Result<T> = std::result::Result<T, SpecError>;

/// One field declaration as stored in a spec file
///
/// ```json
/// {"dt": "uint16", "name": "checksum", "start": 64, "endian": "big"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Type tag, e.g. `uint`, `uint16`, `ascii`, `bool8`
    pub dt: String,

    pub name: String,

    /// Absolute start bit
    pub start: usize,

    /// Bit count; may be left out when the tag implies one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endian: Option<Endianness>,
}

impl FieldSpec {
    pub fn new(dt: impl Into<String>, name: impl Into<String>, start: usize) -> Self {
        Self {
            dt: dt.into(),
            name: name.into(),
            start,
            length: None,
            endian: None,
        }
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_endian(mut self, endian: Endianness) -> Self {
        self.endian = Some(endian);
        self
    }

    /// Resolve the type tag and build the descriptor
    pub fn to_descriptor(&self) -> FieldResult<FieldDescriptor> {
        let (data_type, implied) = DataType::from_tag(&self.dt)?;
        let length = self.length.or(implied).ok_or_else(|| {
            FieldError::invalid(&self.name, format!("type '{}' needs a length", self.dt))
        })?;

        let field = FieldDescriptor::new(data_type, self.name.as_str(), self.start, length)?;
        match self.endian {
            Some(endian) => field.with_endian(endian),
            None => Ok(field),
        }
    }
}

impl From<&FieldDescriptor> for FieldSpec {
    fn from(field: &FieldDescriptor) -> Self {
        Self {
            dt: field.data_type().tag().to_string(),
            name: field.name().to_string(),
            start: field.start(),
            length: Some(field.length()),
            endian: field.endian().is_big().then_some(Endianness::Big),
        }
    }
}

/// Parse a JSON array of field specs
pub fn from_json(json: &str) -> Result<Vec<FieldSpec>> {
    Ok(serde_json::from_str(json)?)
}

pub fn to_json(specs: &[FieldSpec]) -> Result<String> {
    Ok(serde_json::to_string_pretty(specs)?)
}

/// Load a spec file and check that every entry describes a valid field
pub fn load_spec(path: impl AsRef<Path>) -> Result<Vec<FieldSpec>> {
    let specs = from_json(&fs::read_to_string(path)?)?;
    for spec in &specs {
        spec.to_descriptor()?;
    }
    Ok(specs)
}

pub fn save_spec(path: impl AsRef<Path>, specs: &[FieldSpec]) -> Result<()> {
    fs::write(path, to_json(specs)?)?;
    Ok(())
}
