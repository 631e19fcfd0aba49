//! Record parsers, one per entity.
//!
//! Column numbers here are canonical positions from the tables in
//! [`super::columns`]; keep the two in step.

use super::{
    Cells, FromCells, Layout, ANTIBIOTIC_DETAILS_LAYOUT, ANTIBIOTIC_LAYOUT, INDICATION_LAYOUT,
    OPTIONAL_VAR_LAYOUT, PATIENT_LAYOUT, SPECIMEN_LAYOUT,
};
use crate::models::{Antibiotic, AntibioticDetails, Indication, OptionalVar, Patient, Specimen};

impl FromCells for Patient {
    fn layout() -> &'static Layout {
        &PATIENT_LAYOUT
    }

    fn from_cells(c: &Cells<'_>) -> Self {
        Patient {
            id: c.text(0),
            submission_date: c.date(1),
            region: c.text(2),
            district: c.text(3),
            subcounty: c.text(4),
            facility: c.text(5),
            level_of_care: c.text(6),
            ownership: c.text(7),
            ward_name: c.text(8),
            ward_total_patients: c.int(9),
            ward_eligible_patients: c.int(10),
            survey_date: c.date(11),
            patient_initials: c.text(12),
            code: c.text(13),
            rand_num: c.int(15),
            patient_code: c.text(16),
            show_code: c.text(17),
            is_the_patient_an_infant: c.text(18),
            age_months: c.int(19),
            age_years: c.int(20),
            pre_term_birth: c.text(21),
            gender: c.text(22),
            weight: c.float(23),
            weight_birth_kg: c.float(24),
            admission_date: c.date(25),
            surgery_since_admission: c.text(26),
            urinary_catheter: c.text(27),
            peripheral_vascular_catheter: c.text(28),
            central_vascular_catheter: c.text(29),
            intubation: c.text(30),
            patient_on_antibiotic: c.text(31),
            patient_number_antibiotics: c.int(32),
            malaria_status: c.text(33),
            tuberculosis_status: c.text(34),
            hiv_status: c.text(35),
            hiv_on_art: c.text(36),
            hiv_cd4_count: c.text(37),
            hiv_viral_load: c.text(38),
            diabetes: c.text(39),
            malnutrition_status: c.text(40),
            hypertension: c.text(41),
            referred_from: c.text(42),
            hospitalization_90_days: c.text(43),
            type_surgery_since_admission: c.text(44),
            additional_comment: c.text(45),
            comments: c.text(46),
            instance_id: c.text(47),
            submitter_id: c.text(48),
            submitter_name: c.text(49),
            attachments_present: c.text(50),
            attachments_expected: c.text(51),
            status: c.text(52),
            review_state: c.text(53),
            device_id: c.text(54),
            edits: c.text(55),
            form_version: c.text(56),
        }
    }
}

impl FromCells for Antibiotic {
    fn layout() -> &'static Layout {
        &ANTIBIOTIC_LAYOUT
    }

    fn from_cells(c: &Cells<'_>) -> Self {
        Antibiotic {
            antibiotic_notes: c.text(0),
            antibiotic_inn_name: c.text(1),
            other_antibiotic: c.text(2),
            atc_code: c.text(3),
            antibiotic_class: c.text(4),
            antibiotic_aware_classification: c.text(5),
            antibiotic_written_in_inn: c.text(6),
            start_date_antibiotic: c.date(7),
            unit_dose: c.float(8),
            unit_doses_combination: c.text(9),
            unit_dose_measure_unit: c.text(10),
            unit_dose_frequency: c.text(11),
            administration_route: c.text(12),
            parent_key: c.key(13),
            id: c.text(14),
        }
    }
}

impl FromCells for AntibioticDetails {
    fn layout() -> &'static Layout {
        &ANTIBIOTIC_DETAILS_LAYOUT
    }

    fn from_cells(c: &Cells<'_>) -> Self {
        let parent_key = c.key(7);
        AntibioticDetails {
            id: parent_key.clone(),
            prescriber: c.text(0),
            intraveno: c.text(1),
            oral_switch: c.text(2),
            number_missed: c.text(3),
            missed_dose: c.text(4),
            guideline: c.text(5),
            treatment: c.text(6),
            parent_key,
        }
    }
}

impl FromCells for Indication {
    fn layout() -> &'static Layout {
        &INDICATION_LAYOUT
    }

    fn from_cells(c: &Cells<'_>) -> Self {
        Indication {
            indication_type: c.text(0),
            surg_proph_duration: c.text(1),
            surg_proph_site: c.text(2),
            diagnosis: c.text(3),
            start_date_treatment: c.date(4),
            reason_in_notes: c.text(5),
            culture_sample_taken: c.text(6),
            parent_key: c.key(7),
            id: c.text(8),
        }
    }
}

impl FromCells for OptionalVar {
    fn layout() -> &'static Layout {
        &OPTIONAL_VAR_LAYOUT
    }

    fn from_cells(c: &Cells<'_>) -> Self {
        OptionalVar {
            prescriber_type: c.text(0),
            intravenous_type: c.text(1),
            oral_switch: c.text(2),
            number_missed_doses: c.int(3),
            missed_doses_reason: c.text(4),
            guidelines_compliance: c.text(5),
            treatment_type: c.text(6),
            parent_key: c.key(7),
            id: c.text(8),
        }
    }
}

impl FromCells for Specimen {
    fn layout() -> &'static Layout {
        &SPECIMEN_LAYOUT
    }

    fn from_cells(c: &Cells<'_>) -> Self {
        Specimen {
            specimen_type: c.text(0),
            culture_result: c.text(1),
            microorganism: c.text(2),
            antibiotic_susceptibility_test_results: c.text(3),
            resistant_phenotype: c.text(4),
            parent_key: c.key(5),
            id: c.text(6),
        }
    }
}
