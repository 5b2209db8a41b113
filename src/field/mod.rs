//! Field schemas describing the columns of a dataset
//!
//! Schemas are produced by the type-detection side of the system and consumed
//! read-only here. The general type and scale of a field drive every case
//! function in [`crate::enumerate`].

pub mod types;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use self::types::{DataType, GeneralType, Scale};

/// Identifier of a field within a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(pub u64);

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for FieldId {
    fn from(id: u64) -> Self {
        FieldId(id)
    }
}

/// Typed description of one dataset column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub id: FieldId,
    /// Column name in the dataset table
    pub name: String,
    pub general_type: GeneralType,
    pub scale: Scale,
    #[serde(default)]
    pub is_unique: bool,
    #[serde(default)]
    pub is_id: bool,
    /// Concrete detected type, when the detector reported one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
}

impl FieldSchema {
    /// Create a schema with explicit general type and scale
    pub fn new(
        id: u64,
        name: impl Into<String>,
        general_type: GeneralType,
        scale: Scale,
    ) -> Self {
        FieldSchema {
            id: FieldId(id),
            name: name.into(),
            general_type,
            scale,
            is_unique: false,
            is_id: false,
            data_type: None,
        }
    }

    /// Create a schema whose general type and scale come from the type tables
    pub fn from_data_type(id: u64, name: impl Into<String>, data_type: DataType) -> Self {
        FieldSchema {
            data_type: Some(data_type),
            ..FieldSchema::new(id, name, data_type.general_type(), data_type.scale())
        }
    }

    pub fn categorical(id: u64, name: impl Into<String>) -> Self {
        FieldSchema::new(id, name, GeneralType::Categorical, Scale::Nominal)
    }

    pub fn quantitative(id: u64, name: impl Into<String>) -> Self {
        FieldSchema::new(id, name, GeneralType::Quantitative, Scale::Continuous)
    }

    pub fn temporal(id: u64, name: impl Into<String>) -> Self {
        FieldSchema::new(id, name, GeneralType::Temporal, Scale::Continuous)
    }

    pub fn with_scale(mut self, scale: Scale) -> Self {
        self.scale = scale;
        self
    }

    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    pub fn id_field(mut self) -> Self {
        self.is_id = true;
        self
    }

    pub fn is_continuous(&self) -> bool {
        self.scale == Scale::Continuous
    }

    pub fn is_categorical(&self) -> bool {
        self.general_type == GeneralType::Categorical
    }

    pub fn is_quantitative(&self) -> bool {
        self.general_type == GeneralType::Quantitative
    }

    pub fn is_temporal(&self) -> bool {
        self.general_type == GeneralType::Temporal
    }
}

/// The schema set of one run, addressable by id
#[derive(Debug, Clone, Default)]
pub struct FieldSet {
    fields: Vec<FieldSchema>,
}

impl FieldSet {
    pub fn new(fields: Vec<FieldSchema>) -> Result<Self> {
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.id == field.id) {
                return Err(Error::InvalidInput(format!("Duplicate field id {}", field.id)));
            }
        }
        Ok(FieldSet { fields })
    }

    pub fn get(&self, id: FieldId) -> Result<&FieldSchema> {
        self.fields
            .iter()
            .find(|f| f.id == id)
            .ok_or(Error::InvalidFieldReference(id))
    }

    pub fn contains(&self, id: FieldId) -> bool {
        self.fields.iter().any(|f| f.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldSchema> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'a> IntoIterator for &'a FieldSet {
    type Item = &'a FieldSchema;
    type IntoIter = std::slice::Iter<'a, FieldSchema>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
