use serde::Serialize;

/// The four kinds of scheduled section a subject can meet as, in the
/// priority order used when encoding a term schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Lecture,
    Recitation,
    Lab,
    Design,
}

impl SectionKind {
    pub const ALL: [SectionKind; 4] = [
        SectionKind::Lecture,
        SectionKind::Recitation,
        SectionKind::Lab,
        SectionKind::Design,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SectionKind::Lecture => "Lecture",
            SectionKind::Recitation => "Recitation",
            SectionKind::Lab => "Lab",
            SectionKind::Design => "Design",
        }
    }
}

/// One non-master section row from `subject_offered`, as fetched for a
/// (subject, term) pair. Consumed immediately, never retained.
#[derive(Debug, Clone)]
pub struct RawMeetingRecord {
    pub room: Option<String>,
    pub time_text: Option<String>,
    pub is_lecture: bool,
    pub is_recitation: bool,
    pub is_lab: bool,
    pub is_design: bool,
}

/// Parsed form of one meeting-time clause.
///
/// Either a fully populated meeting or the TBA sentinel; there is no
/// half-parsed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeetingDescriptor {
    Tba,
    Meeting {
        room: String,
        /// Day letters from {M,T,W,R,F,S} in input order, not deduplicated.
        days: String,
        is_evening: bool,
        /// Hour text verbatim from the matched clause, e.g. "10", "1-2.30",
        /// "4-7 PM".
        hours: String,
    },
}

/// The three per-term schedule strings for one subject in one academic year.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcademicYearSchedule {
    pub fall: Option<String>,
    pub iap: Option<String>,
    pub spring: Option<String>,
}

/// The most recent `cis_course_catalog` row for a subject, restricted to the
/// columns the exporter flattens.
#[derive(Debug, Clone, Default)]
pub struct CatalogRow {
    pub academic_year: i32,
    pub subject_id: String,
    pub subject_title: Option<String>,
    pub total_units: Option<i32>,
    pub lecture_units: Option<i32>,
    pub lab_units: Option<i32>,
    pub design_units: Option<i32>,
    pub preparation_units: Option<i32>,
    pub is_variable_units: Option<String>,
    pub is_offered_this_year: Option<String>,
    pub is_offered_fall_term: Option<String>,
    pub is_offered_iap: Option<String>,
    pub is_offered_spring_term: Option<String>,
    pub is_offered_summer_term: Option<String>,
    pub hgn_code: Option<String>,
    pub joint_subjects: Option<String>,
    pub equivalent_subjects: Option<String>,
    pub meets_with_subjects: Option<String>,
    pub comm_req_attribute: Option<String>,
    pub gir_attribute: Option<String>,
    pub hass_attribute: Option<String>,
    pub status_change: Option<String>,
    pub subject_description: Option<String>,
    pub on_line_page_number: Option<String>,
    pub fall_instructors: Option<String>,
    pub spring_instructors: Option<String>,
}

/// FireRoad-compatible flat subject record. Absent optional fields are
/// omitted from the JSON output entirely rather than serialized as null.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Subject {
    pub subject_id: String,
    pub title: String,
    pub total_units: i32,
    pub offered_fall: bool,
    #[serde(rename = "offered_IAP")]
    pub offered_iap: bool,
    pub offered_spring: bool,
    pub offered_summer: bool,
    pub public: bool,

    pub lecture_units: i32,
    pub lab_units: i32,
    pub design_units: i32,
    pub preparation_units: i32,
    pub is_variable_units: bool,
    pub is_half_class: bool,
    pub has_final: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_historical: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_semester: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_offered_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joint_subjects: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equivalent_subjects: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meets_with_subjects: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub communication_requirement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gir_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hass_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructors: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_fall: Option<String>,
    #[serde(rename = "schedule_IAP", skip_serializing_if = "Option::is_none")]
    pub schedule_iap: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_spring: Option<String>,
}
