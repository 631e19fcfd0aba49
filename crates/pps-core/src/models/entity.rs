//! Entity kinds and the record trait shared by all six survey record shapes.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// The six record shapes produced by a PPS export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Patient,
    Antibiotic,
    AntibioticDetails,
    Indication,
    OptionalVar,
    Specimen,
}

impl EntityKind {
    /// All kinds, parents first.
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Patient,
        EntityKind::Antibiotic,
        EntityKind::AntibioticDetails,
        EntityKind::Indication,
        EntityKind::OptionalVar,
        EntityKind::Specimen,
    ];

    /// Storage table name.
    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Patient => "patients",
            EntityKind::Antibiotic => "antibiotics",
            EntityKind::AntibioticDetails => "antibiotic_details",
            EntityKind::Indication => "indications",
            EntityKind::OptionalVar => "optional_vars",
            EntityKind::Specimen => "specimens",
        }
    }

    /// Human-readable name used in report messages.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Patient => "patient",
            EntityKind::Antibiotic => "antibiotic",
            EntityKind::AntibioticDetails => "antibiotic details",
            EntityKind::Indication => "indication",
            EntityKind::OptionalVar => "optional var",
            EntityKind::Specimen => "specimen",
        }
    }

    /// Whether records of this kind reference a parent patient.
    pub fn has_parent(self) -> bool {
        !matches!(self, EntityKind::Patient)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// Error returned when an entity name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity type: {0}")]
pub struct UnknownEntity(pub String);

impl FromStr for EntityKind {
    type Err = UnknownEntity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "patient" | "patients" => Ok(EntityKind::Patient),
            "antibiotic" | "antibiotics" => Ok(EntityKind::Antibiotic),
            "antibioticdetail" | "antibioticdetails" => Ok(EntityKind::AntibioticDetails),
            "indication" | "indications" => Ok(EntityKind::Indication),
            "optionalvar" | "optionalvars" => Ok(EntityKind::OptionalVar),
            "specimen" | "specimens" => Ok(EntityKind::Specimen),
            _ => Err(UnknownEntity(s.to_string())),
        }
    }
}

/// A persisted survey record.
///
/// Records are stored through their serde representation, so every serialized
/// field name must be a column of [`EntityKind::table`].
pub trait Record: Serialize + DeserializeOwned + fmt::Debug {
    const KIND: EntityKind;

    /// The record identifier (column `key`).
    fn id(&self) -> &str;

    /// The owning patient identifier, if this kind has one.
    fn parent_key(&self) -> Option<&str> {
        None
    }
}
