//! Fixed column tables and header binding.
//!
//! Each table lists the expected header for every canonical column position.
//! An empty name marks a position the parser ignores. The position of a name
//! in its table is the column index the parser reads when binding positionally.

use serde::{Deserialize, Serialize};

use crate::config::HeaderBinding;
use crate::models::EntityKind;

/// Column table for one entity.
#[derive(Debug)]
pub struct Layout {
    pub kind: EntityKind,
    /// Expected header per canonical position
    pub headers: &'static [&'static str],
    /// Rows with fewer cells are skipped
    pub min_columns: usize,
}

pub const PATIENT_LAYOUT: Layout = Layout {
    kind: EntityKind::Patient,
    headers: &[
        "key",                          // 0
        "submission_date",              // 1
        "region",                       // 2
        "district",                     // 3
        "subcounty",                    // 4
        "facility",                     // 5
        "level_of_care",                // 6
        "ownership",                    // 7
        "ward_name",                    // 8
        "ward_total_patients",          // 9
        "ward_eligible_patients",       // 10
        "survey_date",                  // 11
        "patient_initials",             // 12
        "code",                         // 13
        "",                             // 14 form helper, not stored
        "rand_num",                     // 15
        "patient_code",                 // 16
        "show_code",                    // 17
        "is_the_patient_an_infant",     // 18
        "age_months",                   // 19
        "age_years",                    // 20
        "pre_term_birth",               // 21
        "gender",                       // 22
        "weight",                       // 23
        "weight_birth_kg",              // 24
        "admission_date",               // 25
        "surgery_since_admission",      // 26
        "urinary_catheter",             // 27
        "peripheral_vascular_catheter", // 28
        "central_vascular_catheter",    // 29
        "intubation",                   // 30
        "patient_on_antibiotic",        // 31
        "patient_number_antibiotics",   // 32
        "malaria_status",               // 33
        "tuberculosis_status",          // 34
        "hiv_status",                   // 35
        "hiv_on_art",                   // 36
        "hiv_cd4_count",                // 37
        "hiv_viral_load",               // 38
        "diabetes",                     // 39
        "malnutrition_status",          // 40
        "hypertension",                 // 41
        "referred_from",                // 42
        "hospitalization_90_days",      // 43
        "type_surgery_since_admission", // 44
        "additional_comment",           // 45
        "comments",                     // 46
        "instance_id",                  // 47
        "submitter_id",                 // 48
        "submitter_name",               // 49
        "attachments_present",          // 50
        "attachments_expected",         // 51
        "status",                       // 52
        "review_state",                 // 53
        "device_id",                    // 54
        "edits",                        // 55
        "form_version",                 // 56
    ],
    min_columns: 50,
};

pub const ANTIBIOTIC_LAYOUT: Layout = Layout {
    kind: EntityKind::Antibiotic,
    headers: &[
        "antibiotic_notes",                // 0
        "antibiotic_inn_name",             // 1
        "other_antibiotic",                // 2
        "atc_code",                        // 3
        "antibiotic_class",                // 4
        "antibiotic_aware_classification", // 5
        "antibiotic_written_in_inn",       // 6
        "start_date_antibiotic",           // 7
        "unit_dose",                       // 8
        "unit_doses_combination",          // 9
        "unit_dose_measure_unit",          // 10
        "unit_dose_frequency",             // 11
        "administration_route",            // 12
        "parent_key",                      // 13
        "key",                             // 14
    ],
    min_columns: 15,
};

pub const ANTIBIOTIC_DETAILS_LAYOUT: Layout = Layout {
    kind: EntityKind::AntibioticDetails,
    headers: &[
        "prescriber",    // 0
        "intraveno",     // 1
        "oral_switch",   // 2
        "number_missed", // 3
        "missed_dose",   // 4
        "guideline",     // 5
        "treatment",     // 6
        "parent_key",    // 7
    ],
    min_columns: 8,
};

pub const INDICATION_LAYOUT: Layout = Layout {
    kind: EntityKind::Indication,
    headers: &[
        "indication_type",      // 0
        "surg_proph_duration",  // 1
        "surg_proph_site",      // 2
        "diagnosis",            // 3
        "start_date_treatment", // 4
        "reason_in_notes",      // 5
        "culture_sample_taken", // 6
        "parent_key",           // 7
        "key",                  // 8
    ],
    min_columns: 9,
};

pub const OPTIONAL_VAR_LAYOUT: Layout = Layout {
    kind: EntityKind::OptionalVar,
    headers: &[
        "prescriber_type",       // 0
        "intravenous_type",      // 1
        "oral_switch",           // 2
        "number_missed_doses",   // 3
        "missed_doses_reason",   // 4
        "guidelines_compliance", // 5
        "treatment_type",        // 6
        "parent_key",            // 7
        "key",                   // 8
    ],
    min_columns: 8,
};

pub const SPECIMEN_LAYOUT: Layout = Layout {
    kind: EntityKind::Specimen,
    headers: &[
        "specimen_type",                          // 0
        "culture_result",                         // 1
        "microorganism",                          // 2
        "antibiotic_susceptibility_test_results", // 3
        "resistant_phenotype",                    // 4
        "parent_key",                             // 5
        "key",                                    // 6
    ],
    min_columns: 6,
};

/// Look up the column table for an entity.
pub fn layout_for(kind: EntityKind) -> &'static Layout {
    match kind {
        EntityKind::Patient => &PATIENT_LAYOUT,
        EntityKind::Antibiotic => &ANTIBIOTIC_LAYOUT,
        EntityKind::AntibioticDetails => &ANTIBIOTIC_DETAILS_LAYOUT,
        EntityKind::Indication => &INDICATION_LAYOUT,
        EntityKind::OptionalVar => &OPTIONAL_VAR_LAYOUT,
        EntityKind::Specimen => &SPECIMEN_LAYOUT,
    }
}

/// How a file's columns were actually bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnBinding {
    Positional,
    ByName,
}

impl ColumnBinding {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnBinding::Positional => "positional",
            ColumnBinding::ByName => "by_name",
        }
    }
}

/// A required header that was not found, with the closest header present.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingHeader {
    pub expected: &'static str,
    pub closest: Option<String>,
}

/// Why a header row could not be bound by name.
#[derive(Debug, Clone, PartialEq)]
pub enum BindError {
    /// Expected headers absent from the file.
    Missing(Vec<MissingHeader>),
    /// Several file columns normalize to the same expected header.
    Ambiguous {
        expected: &'static str,
        columns: Vec<usize>,
    },
}

/// Maps canonical column positions to physical positions in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    physical: Vec<Option<usize>>,
    binding: ColumnBinding,
}

impl ColumnMap {
    /// Identity mapping over the layout's positions.
    pub fn positional(layout: &Layout) -> Self {
        Self {
            physical: (0..layout.headers.len()).map(Some).collect(),
            binding: ColumnBinding::Positional,
        }
    }

    /// Bind a header row to a layout.
    ///
    /// Fails only under [`HeaderBinding::Strict`]: when an expected header is
    /// missing, or when several columns match one expected header. `Auto`
    /// binds a repeated header to its first column.
    pub fn bind<S: AsRef<str>>(
        layout: &Layout,
        header: &[S],
        mode: HeaderBinding,
    ) -> Result<Self, BindError> {
        if mode == HeaderBinding::Positional {
            return Ok(Self::positional(layout));
        }

        let normalized: Vec<String> = header
            .iter()
            .map(|h| normalize_header(h.as_ref()))
            .collect();

        let mut physical = Vec::with_capacity(layout.headers.len());
        let mut missing = Vec::new();
        for expected in layout.headers {
            if expected.is_empty() {
                physical.push(None);
                continue;
            }
            let wanted = normalize_header(expected);
            let columns: Vec<usize> = normalized
                .iter()
                .enumerate()
                .filter(|(_, h)| **h == wanted)
                .map(|(index, _)| index)
                .collect();
            match columns[..] {
                [index] => physical.push(Some(index)),
                [first, ..] => {
                    if mode == HeaderBinding::Strict {
                        return Err(BindError::Ambiguous { expected, columns });
                    }
                    tracing::warn!(
                        entity = %layout.kind,
                        expected,
                        columns = ?columns,
                        "header matches several columns, using the first"
                    );
                    physical.push(Some(first));
                }
                [] => {
                    physical.push(None);
                    missing.push(MissingHeader {
                        expected,
                        closest: closest_header(&wanted, header),
                    });
                }
            }
        }

        if missing.is_empty() {
            return Ok(Self {
                physical,
                binding: ColumnBinding::ByName,
            });
        }

        match mode {
            HeaderBinding::Strict => Err(BindError::Missing(missing)),
            _ => {
                tracing::warn!(
                    entity = %layout.kind,
                    missing = missing.len(),
                    "header names not recognized, using fixed column positions"
                );
                Ok(Self::positional(layout))
            }
        }
    }

    /// Physical index for a canonical column.
    pub fn physical(&self, column: usize) -> Option<usize> {
        self.physical.get(column).copied().flatten()
    }

    pub fn binding(&self) -> ColumnBinding {
        self.binding
    }
}

/// Canonical form of a header name for matching.
///
/// Drops a UTF-8 BOM and any group prefix (`Core_variables-region` → `region`),
/// lowercases, and keeps only ASCII alphanumerics.
pub fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim_start_matches('\u{feff}').trim();
    let name = match trimmed.rfind('-') {
        Some(dash) => &trimmed[dash + 1..],
        None => trimmed,
    };
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Minimum Jaro-Winkler similarity for a header to be offered as a hint.
const HINT_THRESHOLD: f64 = 0.8;

fn closest_header<S: AsRef<str>>(wanted: &str, header: &[S]) -> Option<String> {
    header
        .iter()
        .map(|h| {
            let score = strsim::jaro_winkler(wanted, &normalize_header(h.as_ref()));
            (h.as_ref(), score)
        })
        .filter(|(_, score)| *score >= HINT_THRESHOLD)
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(h, _)| h.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_sizes() {
        assert_eq!(PATIENT_LAYOUT.headers.len(), 57);
        assert_eq!(ANTIBIOTIC_LAYOUT.headers.len(), 15);
        assert_eq!(ANTIBIOTIC_DETAILS_LAYOUT.headers.len(), 8);
        assert_eq!(INDICATION_LAYOUT.headers.len(), 9);
        assert_eq!(OPTIONAL_VAR_LAYOUT.headers.len(), 9);
        assert_eq!(SPECIMEN_LAYOUT.headers.len(), 7);
        for kind in EntityKind::ALL {
            let layout = layout_for(kind);
            assert_eq!(layout.kind, kind);
            assert!(layout.min_columns <= layout.headers.len());
        }
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("PARENT_KEY"), "parentkey");
        assert_eq!(normalize_header("parent_key"), "parentkey");
        assert_eq!(normalize_header("\u{feff}KEY"), "key");
        assert_eq!(normalize_header("Core_variables-region"), "region");
        assert_eq!(normalize_header(" Level of care "), "levelofcare");
    }

    #[test]
    fn test_positional_mode_ignores_header() {
        let map = ColumnMap::bind(&SPECIMEN_LAYOUT, &["x", "y"], HeaderBinding::Positional)
            .unwrap();
        assert_eq!(map.binding(), ColumnBinding::Positional);
        assert_eq!(map.physical(6), Some(6));
        assert_eq!(map.physical(7), None);
    }

    #[test]
    fn test_bind_by_name_reordered() {
        let header = [
            "KEY",
            "PARENT_KEY",
            "resistant_phenotype",
            "antibiotic_susceptibility_test_results",
            "microorganism",
            "culture_result",
            "specimen_type",
        ];
        let map = ColumnMap::bind(&SPECIMEN_LAYOUT, &header, HeaderBinding::Auto).unwrap();
        assert_eq!(map.binding(), ColumnBinding::ByName);
        assert_eq!(map.physical(0), Some(6)); // specimen_type
        assert_eq!(map.physical(5), Some(1)); // parent_key
        assert_eq!(map.physical(6), Some(0)); // key
    }

    #[test]
    fn test_auto_falls_back_to_positions() {
        let header = ["a", "b", "c", "d", "e", "f", "g"];
        let map = ColumnMap::bind(&SPECIMEN_LAYOUT, &header, HeaderBinding::Auto).unwrap();
        assert_eq!(map, ColumnMap::positional(&SPECIMEN_LAYOUT));
    }

    #[test]
    fn test_strict_reports_missing_with_hint() {
        let header = [
            "specimen_type",
            "culture_results",
            "microorganism",
            "antibiotic_susceptibility_test_results",
            "resistant_phenotype",
            "parent_key",
            "key",
        ];
        let err = ColumnMap::bind(&SPECIMEN_LAYOUT, &header, HeaderBinding::Strict).unwrap_err();
        let BindError::Missing(missing) = err else {
            panic!("expected missing headers, got {err:?}");
        };
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].expected, "culture_result");
        assert_eq!(missing[0].closest.as_deref(), Some("culture_results"));
    }

    const REPEATED_ORAL_SWITCH: [&str; 10] = [
        "prescriber_type",
        "intravenous_type",
        "grp1-oral_switch",
        "number_missed_doses",
        "missed_doses_reason",
        "guidelines_compliance",
        "treatment_type",
        "parent_key",
        "key",
        "grp2-oral_switch",
    ];

    #[test]
    fn test_strict_rejects_repeated_header() {
        let err = ColumnMap::bind(
            &OPTIONAL_VAR_LAYOUT,
            &REPEATED_ORAL_SWITCH,
            HeaderBinding::Strict,
        )
        .unwrap_err();
        assert_eq!(
            err,
            BindError::Ambiguous {
                expected: "oral_switch",
                columns: vec![2, 9],
            }
        );
    }

    #[test]
    fn test_auto_binds_repeated_header_to_first() {
        let map = ColumnMap::bind(&OPTIONAL_VAR_LAYOUT, &REPEATED_ORAL_SWITCH, HeaderBinding::Auto)
            .unwrap();
        assert_eq!(map.binding(), ColumnBinding::ByName);
        assert_eq!(map.physical(2), Some(2));
        assert_eq!(map.physical(8), Some(8));
    }

    #[test]
    fn test_unused_patient_column_not_required() {
        let header: Vec<&str> = PATIENT_LAYOUT
            .headers
            .iter()
            .map(|h| if h.is_empty() { "calculate_random" } else { *h })
            .collect();
        let map = ColumnMap::bind(&PATIENT_LAYOUT, &header, HeaderBinding::Strict).unwrap();
        assert_eq!(map.binding(), ColumnBinding::ByName);
        assert_eq!(map.physical(14), None);
        assert_eq!(map.physical(15), Some(15));
    }
}
