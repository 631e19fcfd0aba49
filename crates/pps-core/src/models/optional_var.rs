//! Optional prescribing variables.

use serde::{Deserialize, Serialize};

use super::{EntityKind, Record};

/// Supplementary prescribing fields. Several rows may share one key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OptionalVar {
    #[serde(rename = "key")]
    pub id: String,
    pub prescriber_type: String,
    pub intravenous_type: String,
    pub oral_switch: String,
    pub number_missed_doses: i64,
    pub missed_doses_reason: String,
    pub guidelines_compliance: String,
    pub treatment_type: String,
    pub parent_key: String,
}

impl Record for OptionalVar {
    const KIND: EntityKind = EntityKind::OptionalVar;

    fn id(&self) -> &str {
        &self.id
    }

    fn parent_key(&self) -> Option<&str> {
        Some(&self.parent_key)
    }
}
