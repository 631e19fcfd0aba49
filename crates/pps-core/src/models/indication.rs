//! Indication records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityKind, Record};

/// Diagnosis and treatment reason behind a patient's antibiotic use.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Indication {
    #[serde(rename = "key")]
    pub id: String,
    pub indication_type: String,
    pub surg_proph_duration: String,
    pub surg_proph_site: String,
    pub diagnosis: String,
    pub start_date_treatment: Option<DateTime<Utc>>,
    pub reason_in_notes: String,
    pub culture_sample_taken: String,
    pub parent_key: String,
}

impl Record for Indication {
    const KIND: EntityKind = EntityKind::Indication;

    fn id(&self) -> &str {
        &self.id
    }

    fn parent_key(&self) -> Option<&str> {
        Some(&self.parent_key)
    }
}
