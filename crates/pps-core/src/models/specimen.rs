//! Microbiology specimen records.

use serde::{Deserialize, Serialize};

use super::{EntityKind, Record};

/// A culture specimen taken from a surveyed patient.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Specimen {
    #[serde(rename = "key")]
    pub id: String,
    pub specimen_type: String,
    pub culture_result: String,
    pub microorganism: String,
    pub antibiotic_susceptibility_test_results: String,
    pub resistant_phenotype: String,
    pub parent_key: String,
}

impl Record for Specimen {
    const KIND: EntityKind = EntityKind::Specimen;

    fn id(&self) -> &str {
        &self.id
    }

    fn parent_key(&self) -> Option<&str> {
        Some(&self.parent_key)
    }
}
