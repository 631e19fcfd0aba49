//! Antibiotic prescriptions and their satellite details.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityKind, Record};

/// One antibiotic prescribed to a surveyed patient.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Antibiotic {
    #[serde(rename = "key")]
    pub id: String,
    pub antibiotic_notes: String,
    pub antibiotic_inn_name: String,
    pub other_antibiotic: String,
    /// WHO ATC code
    pub atc_code: String,
    pub antibiotic_class: String,
    /// WHO AWaRe category (Access / Watch / Reserve)
    pub antibiotic_aware_classification: String,
    pub antibiotic_written_in_inn: String,
    pub start_date_antibiotic: Option<DateTime<Utc>>,
    pub unit_dose: f64,
    pub unit_doses_combination: String,
    pub unit_dose_measure_unit: String,
    pub unit_dose_frequency: String,
    pub administration_route: String,
    /// Owning patient key
    pub parent_key: String,
}

impl Record for Antibiotic {
    const KIND: EntityKind = EntityKind::Antibiotic;

    fn id(&self) -> &str {
        &self.id
    }

    fn parent_key(&self) -> Option<&str> {
        Some(&self.parent_key)
    }
}

/// Prescriber and compliance details for a patient's antibiotic treatment.
///
/// The export has no natural key for these rows: the normalized parent key is
/// used as both identifier and parent reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AntibioticDetails {
    #[serde(rename = "key")]
    pub id: String,
    pub prescriber: String,
    pub intraveno: String,
    pub oral_switch: String,
    pub number_missed: String,
    pub missed_dose: String,
    pub guideline: String,
    pub treatment: String,
    pub parent_key: String,
}

impl Record for AntibioticDetails {
    const KIND: EntityKind = EntityKind::AntibioticDetails;

    fn id(&self) -> &str {
        &self.id
    }

    fn parent_key(&self) -> Option<&str> {
        Some(&self.parent_key)
    }
}
