use std::sync::LazyLock;

use regex::Regex;

use crate::db::CURRENT_YEAR;
use crate::models::{AcademicYearSchedule, CatalogRow, Subject};

static OLD_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Old number:\s+(.*)").unwrap());
static SUBJECT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z0-9.-]+(?:\[J\])?,?").unwrap());

/// Normalizes a subject ID by trimming whitespace and dropping the "J"
/// suffix that marks joint subjects.
pub fn normalize_subject_id(subject_id: &str) -> String {
    let trimmed = subject_id.trim();
    trimmed.strip_suffix('J').unwrap_or(trimmed).to_string()
}

fn split_subject_list(list: &str) -> Vec<String> {
    list.split(',').map(normalize_subject_id).collect()
}

fn flag(value: Option<&str>) -> bool {
    value == Some("Y")
}

/// Extracts the subject's previous number from a STATUS_CHANGE note of the
/// form "Old number: <id>".
fn old_id_from_status_change(status_change: &str) -> Option<String> {
    let caps = OLD_NUMBER_RE.captures(status_change)?;
    let id = SUBJECT_ID_RE.find(caps.get(1)?.as_str())?;
    Some(normalize_subject_id(id.as_str()))
}

/// Per-term responsible faculty from the subject_offered master sections.
#[derive(Debug, Clone, Default)]
pub struct TermInstructors {
    pub fall: Option<String>,
    pub iap: Option<String>,
    pub spring: Option<String>,
}

/// Flattens a catalog row, its derived year schedule, and instructor data
/// into the FireRoad-compatible subject record.
///
/// Returns `None` when the STATUS_CHANGE note marks the subject as
/// renumbered; the new number carries its own catalog row.
pub fn assemble_subject(
    row: &CatalogRow,
    schedule: &AcademicYearSchedule,
    instructors: TermInstructors,
    hass_attribute: Option<String>,
) -> Option<Subject> {
    if let Some(status_change) = row.status_change.as_deref() {
        if status_change.contains("New number") {
            return None;
        }
    }

    let mut out = Subject {
        subject_id: row.subject_id.clone(),
        title: row.subject_title.clone().unwrap_or_default(),
        total_units: row.total_units.unwrap_or(0),
        offered_fall: flag(row.is_offered_fall_term.as_deref()),
        offered_iap: flag(row.is_offered_iap.as_deref()),
        offered_spring: flag(row.is_offered_spring_term.as_deref()),
        offered_summer: flag(row.is_offered_summer_term.as_deref()),
        public: true,
        lecture_units: row.lecture_units.unwrap_or(0),
        lab_units: row.lab_units.unwrap_or(0),
        design_units: row.design_units.unwrap_or(0),
        preparation_units: row.preparation_units.unwrap_or(0),
        is_variable_units: flag(row.is_variable_units.as_deref()),
        is_half_class: false,
        has_final: false,
        ..Subject::default()
    };

    // "H" (graduate honors) folds into "G" for FireRoad.
    out.level = row.hgn_code.as_deref().map(|code| {
        if code == "H" {
            "G".to_string()
        } else {
            code.to_string()
        }
    });

    if row.academic_year < CURRENT_YEAR {
        out.is_historical = Some(true);
        out.source_semester = Some(format!("spring-{}", row.academic_year));
    }

    if !flag(row.is_offered_this_year.as_deref()) {
        out.not_offered_year = Some(format!("{}-{}", row.academic_year - 1, row.academic_year));
    }

    out.joint_subjects = row.joint_subjects.as_deref().map(split_subject_list);
    out.equivalent_subjects = row.equivalent_subjects.as_deref().map(split_subject_list);
    out.meets_with_subjects = row.meets_with_subjects.as_deref().map(split_subject_list);

    // CI-M is not derivable from this attribute and stays unset.
    out.communication_requirement = match row.comm_req_attribute.as_deref() {
        Some("CIH") => Some("CI-H".to_string()),
        Some("CIHW") => Some("CI-HW".to_string()),
        _ => None,
    };

    out.gir_attribute = row.gir_attribute.clone();
    out.hass_attribute = hass_attribute;
    out.old_id = row
        .status_change
        .as_deref()
        .and_then(old_id_from_status_change);
    out.description = row.subject_description.clone();
    out.url = row
        .on_line_page_number
        .as_deref()
        .map(|page| format!("{page}#{}", out.subject_id));

    out.schedule = schedule
        .spring
        .clone()
        .or_else(|| schedule.iap.clone())
        .or_else(|| schedule.fall.clone());
    out.schedule_fall = schedule.fall.clone();
    out.schedule_iap = schedule.iap.clone();
    out.schedule_spring = schedule.spring.clone();

    // Fall back to the catalog's instructor columns when no master section
    // names a responsible faculty.
    let fall_instructor = instructors.fall.or_else(|| {
        out.offered_fall
            .then(|| row.fall_instructors.clone())
            .flatten()
    });
    let spring_instructor = instructors.spring.or_else(|| {
        out.offered_spring
            .then(|| row.spring_instructors.clone())
            .flatten()
    });

    let mut listed = Vec::new();
    if let Some(name) = fall_instructor {
        listed.push(format!("Fall: {name}"));
    }
    if let Some(name) = instructors.iap {
        listed.push(format!("IAP: {name}"));
    }
    if let Some(name) = spring_instructor {
        listed.push(format!("Spring: {name}"));
    }
    if !listed.is_empty() {
        out.instructors = Some(listed);
    }

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current_row(subject_id: &str) -> CatalogRow {
        CatalogRow {
            academic_year: CURRENT_YEAR,
            subject_id: subject_id.to_string(),
            subject_title: Some("Introductory Biology".to_string()),
            total_units: Some(12),
            is_offered_this_year: Some("Y".to_string()),
            is_offered_spring_term: Some("Y".to_string()),
            ..CatalogRow::default()
        }
    }

    #[test]
    fn normalizes_joint_suffix_and_whitespace() {
        assert_eq!(normalize_subject_id(" 6.9620J "), "6.9620");
        assert_eq!(normalize_subject_id("18.02"), "18.02");
    }

    #[test]
    fn splits_and_normalizes_subject_lists() {
        assert_eq!(
            split_subject_list("20.005J, 6.9620J"),
            vec!["20.005".to_string(), "6.9620".to_string()]
        );
    }

    #[test]
    fn extracts_old_id_from_status_change() {
        assert_eq!(
            old_id_from_status_change("Old number:  7.013J"),
            Some("7.013".to_string())
        );
        assert_eq!(old_id_from_status_change("Units changed"), None);
    }

    #[test]
    fn renumbered_subject_is_dropped() {
        let mut row = current_row("7.01");
        row.status_change = Some("New number: 7.013".to_string());
        let result = assemble_subject(
            &row,
            &AcademicYearSchedule::default(),
            TermInstructors::default(),
            None,
        );
        assert!(result.is_none());
    }

    #[test]
    fn historical_row_gets_source_semester() {
        let mut row = current_row("21L.001");
        row.academic_year = CURRENT_YEAR - 2;
        let subject = assemble_subject(
            &row,
            &AcademicYearSchedule::default(),
            TermInstructors::default(),
            None,
        )
        .unwrap();
        assert_eq!(subject.is_historical, Some(true));
        assert_eq!(
            subject.source_semester.as_deref(),
            Some("spring-2021")
        );
    }

    #[test]
    fn honors_level_folds_into_graduate() {
        let mut row = current_row("6.5840");
        row.hgn_code = Some("H".to_string());
        let subject = assemble_subject(
            &row,
            &AcademicYearSchedule::default(),
            TermInstructors::default(),
            None,
        )
        .unwrap();
        assert_eq!(subject.level.as_deref(), Some("G"));
    }

    #[test]
    fn schedule_prefers_spring_then_iap_then_fall() {
        let row = current_row("8.01");
        let schedule = AcademicYearSchedule {
            fall: Some("Lecture,26-100/MWF/0/10".to_string()),
            iap: None,
            spring: Some("Lecture,10-250/TR/0/11".to_string()),
        };
        let subject = assemble_subject(&row, &schedule, TermInstructors::default(), None).unwrap();
        assert_eq!(subject.schedule, schedule.spring);
        assert_eq!(subject.schedule_fall, schedule.fall);
        assert_eq!(subject.schedule_spring, schedule.spring);

        let fall_only = AcademicYearSchedule {
            fall: Some("Lecture,26-100/MWF/0/10".to_string()),
            iap: None,
            spring: None,
        };
        let subject =
            assemble_subject(&row, &fall_only, TermInstructors::default(), None).unwrap();
        assert_eq!(subject.schedule, fall_only.fall);
    }

    #[test]
    fn instructors_fall_back_to_catalog_columns() {
        let mut row = current_row("5.111");
        row.is_offered_fall_term = Some("Y".to_string());
        row.fall_instructors = Some("A. Hillel".to_string());
        let instructors = TermInstructors {
            spring: Some("B. Wong".to_string()),
            ..TermInstructors::default()
        };
        let subject = assemble_subject(
            &row,
            &AcademicYearSchedule::default(),
            instructors,
            None,
        )
        .unwrap();
        assert_eq!(
            subject.instructors,
            Some(vec![
                "Fall: A. Hillel".to_string(),
                "Spring: B. Wong".to_string()
            ])
        );
    }

    #[test]
    fn communication_requirement_mapping() {
        let mut row = current_row("21W.035");
        row.comm_req_attribute = Some("CIHW".to_string());
        let subject = assemble_subject(
            &row,
            &AcademicYearSchedule::default(),
            TermInstructors::default(),
            None,
        )
        .unwrap();
        assert_eq!(subject.communication_requirement.as_deref(), Some("CI-HW"));
    }

    #[test]
    fn not_offered_year_marks_skipped_subjects() {
        let mut row = current_row("2.009");
        row.is_offered_this_year = Some("N".to_string());
        let subject = assemble_subject(
            &row,
            &AcademicYearSchedule::default(),
            TermInstructors::default(),
            None,
        )
        .unwrap();
        assert_eq!(subject.not_offered_year.as_deref(), Some("2022-2023"));
    }

    #[test]
    fn omits_absent_fields_from_json() {
        let row = current_row("18.02");
        let subject = assemble_subject(
            &row,
            &AcademicYearSchedule::default(),
            TermInstructors::default(),
            None,
        )
        .unwrap();
        let json = serde_json::to_value(&subject).unwrap();
        assert!(json.get("schedule").is_none());
        assert!(json.get("instructors").is_none());
        assert_eq!(json["offered_spring"], true);
        assert_eq!(json["public"], true);
    }
}
