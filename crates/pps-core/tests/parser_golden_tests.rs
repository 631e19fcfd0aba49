//! Golden tests for the record parsers.
//!
//! A full patient export row is mapped field by field, both by position and
//! through an exported header with group prefixes.

use chrono::{TimeZone, Utc};
use csv::StringRecord;
use pps_core::config::HeaderBinding;
use pps_core::parse::{Cells, ColumnBinding, ColumnMap, FromCells, PATIENT_LAYOUT};
use pps_core::Patient;

/// Value per canonical column of the golden patient row.
fn golden_values() -> Vec<String> {
    let mut values: Vec<String> = (0..57).map(|i| format!("v{i}")).collect();
    let typed = [
        (0, "uuid:6a1e0c5e-4d3b"),
        (1, "2023-05-02T09:15:30.250+03:00"),
        (9, "24"),
        (10, "19"),
        (11, "05/01/2023"),
        (14, "calculated-helper"),
        (15, "0.4417"),
        (19, "7"),
        (20, "0"),
        (23, "8.2"),
        (24, " 3.1 "),
        (25, "2023-04-28 14:05"),
        (31, "yes"),
        (32, "two"),
    ];
    for (index, value) in typed {
        values[index] = value.to_string();
    }
    values
}

fn parse(record: &StringRecord, map: &ColumnMap) -> Patient {
    Patient::from_cells(&Cells::new(record, map))
}

fn assert_golden(patient: &Patient) {
    assert_eq!(patient.id, "uuid:6a1e0c5e-4d3b");
    assert_eq!(
        patient.submission_date,
        Some(Utc.with_ymd_and_hms(2023, 5, 2, 6, 15, 30).unwrap() + chrono::Duration::milliseconds(250))
    );
    assert_eq!(patient.region, "v2");
    assert_eq!(patient.district, "v3");
    assert_eq!(patient.subcounty, "v4");
    assert_eq!(patient.facility, "v5");
    assert_eq!(patient.level_of_care, "v6");
    assert_eq!(patient.ownership, "v7");
    assert_eq!(patient.ward_name, "v8");
    assert_eq!(patient.ward_total_patients, 24);
    assert_eq!(patient.ward_eligible_patients, 19);
    assert_eq!(
        patient.survey_date,
        Some(Utc.with_ymd_and_hms(2023, 5, 1, 0, 0, 0).unwrap())
    );
    assert_eq!(patient.patient_initials, "v12");
    assert_eq!(patient.code, "v13");
    // Not an integer: falls back to zero
    assert_eq!(patient.rand_num, 0);
    assert_eq!(patient.patient_code, "v16");
    assert_eq!(patient.show_code, "v17");
    assert_eq!(patient.is_the_patient_an_infant, "v18");
    assert_eq!(patient.age_months, 7);
    assert_eq!(patient.age_years, 0);
    assert_eq!(patient.pre_term_birth, "v21");
    assert_eq!(patient.gender, "v22");
    assert_eq!(patient.weight, 8.2);
    assert_eq!(patient.weight_birth_kg, 3.1);
    assert_eq!(
        patient.admission_date,
        Some(Utc.with_ymd_and_hms(2023, 4, 28, 14, 5, 0).unwrap())
    );
    assert_eq!(patient.surgery_since_admission, "v26");
    assert_eq!(patient.urinary_catheter, "v27");
    assert_eq!(patient.peripheral_vascular_catheter, "v28");
    assert_eq!(patient.central_vascular_catheter, "v29");
    assert_eq!(patient.intubation, "v30");
    assert!(patient.on_antibiotic());
    assert_eq!(patient.patient_number_antibiotics, 0);
    assert_eq!(patient.malaria_status, "v33");
    assert_eq!(patient.tuberculosis_status, "v34");
    assert_eq!(patient.hiv_status, "v35");
    assert_eq!(patient.hiv_on_art, "v36");
    assert_eq!(patient.hiv_cd4_count, "v37");
    assert_eq!(patient.hiv_viral_load, "v38");
    assert_eq!(patient.diabetes, "v39");
    assert_eq!(patient.malnutrition_status, "v40");
    assert_eq!(patient.hypertension, "v41");
    assert_eq!(patient.referred_from, "v42");
    assert_eq!(patient.hospitalization_90_days, "v43");
    assert_eq!(patient.type_surgery_since_admission, "v44");
    assert_eq!(patient.additional_comment, "v45");
    assert_eq!(patient.comments, "v46");
    assert_eq!(patient.instance_id, "v47");
    assert_eq!(patient.submitter_id, "v48");
    assert_eq!(patient.submitter_name, "v49");
    assert_eq!(patient.attachments_present, "v50");
    assert_eq!(patient.attachments_expected, "v51");
    assert_eq!(patient.status, "v52");
    assert_eq!(patient.review_state, "v53");
    assert_eq!(patient.device_id, "v54");
    assert_eq!(patient.edits, "v55");
    assert_eq!(patient.form_version, "v56");
}

#[test]
fn test_patient_row_by_position() {
    let record = StringRecord::from(golden_values());
    let map = ColumnMap::positional(&PATIENT_LAYOUT);
    assert_golden(&parse(&record, &map));
}

#[test]
fn test_patient_row_through_prefixed_header() {
    // Export headers carry group prefixes; the order is reversed here.
    let header: Vec<String> = PATIENT_LAYOUT
        .headers
        .iter()
        .enumerate()
        .map(|(i, name)| match *name {
            "" => format!("Core_variables-helper_{i}"),
            "key" => "KEY".to_string(),
            name => format!("Core_variables-{}", name.to_uppercase()),
        })
        .rev()
        .collect();
    let values: Vec<String> = golden_values().into_iter().rev().collect();

    let map = ColumnMap::bind(&PATIENT_LAYOUT, &header, HeaderBinding::Strict).unwrap();
    assert_eq!(map.binding(), ColumnBinding::ByName);
    assert_eq!(map.physical(0), Some(56));
    assert_eq!(map.physical(14), None);

    assert_golden(&parse(&StringRecord::from(values), &map));
}

#[test]
fn test_minimal_patient_row() {
    // Fifty cells is the shortest accepted patient row; the tail reads empty.
    let values: Vec<String> = golden_values().into_iter().take(50).collect();
    assert_eq!(values.len(), PATIENT_LAYOUT.min_columns);

    let patient = parse(
        &StringRecord::from(values),
        &ColumnMap::positional(&PATIENT_LAYOUT),
    );
    assert_eq!(patient.submitter_name, "v49");
    assert_eq!(patient.attachments_present, "");
    assert_eq!(patient.form_version, "");
}
