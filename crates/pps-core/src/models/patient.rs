//! Patient records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityKind, Record};

/// One surveyed patient (root record of a PPS submission).
///
/// Text fields are empty when the export left them blank; numeric fields are
/// zero when blank or malformed; dates are `None` when no known format matched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Submission key
    #[serde(rename = "key")]
    pub id: String,
    pub submission_date: Option<DateTime<Utc>>,
    pub region: String,
    pub district: String,
    pub subcounty: String,
    pub facility: String,
    pub level_of_care: String,
    pub ownership: String,
    pub ward_name: String,
    pub ward_total_patients: i64,
    pub ward_eligible_patients: i64,
    pub survey_date: Option<DateTime<Utc>>,
    pub patient_initials: String,
    pub code: String,
    pub rand_num: i64,
    pub patient_code: String,
    pub show_code: String,
    pub is_the_patient_an_infant: String,
    pub age_months: i64,
    pub age_years: i64,
    pub pre_term_birth: String,
    pub gender: String,
    /// Weight in kg
    pub weight: f64,
    pub weight_birth_kg: f64,
    pub admission_date: Option<DateTime<Utc>>,
    pub surgery_since_admission: String,
    pub urinary_catheter: String,
    pub peripheral_vascular_catheter: String,
    pub central_vascular_catheter: String,
    pub intubation: String,
    pub patient_on_antibiotic: String,
    pub patient_number_antibiotics: i64,
    pub malaria_status: String,
    pub tuberculosis_status: String,
    pub hiv_status: String,
    pub hiv_on_art: String,
    pub hiv_cd4_count: String,
    pub hiv_viral_load: String,
    pub diabetes: String,
    pub malnutrition_status: String,
    pub hypertension: String,
    pub referred_from: String,
    pub hospitalization_90_days: String,
    pub type_surgery_since_admission: String,
    pub additional_comment: String,
    pub comments: String,
    /// Form instance id (distinct from the submission key)
    pub instance_id: String,
    pub submitter_id: String,
    pub submitter_name: String,
    pub attachments_present: String,
    pub attachments_expected: String,
    pub status: String,
    pub review_state: String,
    pub device_id: String,
    pub edits: String,
    pub form_version: String,
}

impl Patient {
    /// Whether the survey recorded the patient as receiving antibiotics.
    pub fn on_antibiotic(&self) -> bool {
        self.patient_on_antibiotic.trim().eq_ignore_ascii_case("yes")
    }
}

impl Record for Patient {
    const KIND: EntityKind = EntityKind::Patient;

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_id_as_key() {
        let patient = Patient {
            id: "uuid:p-1".into(),
            ..Default::default()
        };
        let value = serde_json::to_value(&patient).unwrap();
        assert_eq!(value["key"], "uuid:p-1");
        assert!(value.get("id").is_none());
        assert!(value["submission_date"].is_null());
    }

    #[test]
    fn test_on_antibiotic() {
        let mut patient = Patient::default();
        assert!(!patient.on_antibiotic());
        patient.patient_on_antibiotic = "Yes".into();
        assert!(patient.on_antibiotic());
    }
}
