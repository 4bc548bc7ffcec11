use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::warn;

use crate::models::{AcademicYearSchedule, MeetingDescriptor, RawMeetingRecord, SectionKind};

// Grammar for the free-text MEET_TIME column. Both patterns are anchored at
// the start of the trimmed clause; trailing unmatched text is ignored, since
// partial extraction beats rejecting a whole row over a stray annotation.
static NON_EVENING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([MTWRFS]+)\s*(\d+(?:\.\d+)?(?:-\d+(?:\.\d+)?)?)").unwrap());
static EVENING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([MTWRFS]+)\s*EVE\s*\((.+)\)").unwrap());

/// Source of non-master section rows for one (subject, term) pair, ordered
/// by (is_lecture desc, is_recitation desc, is_lab desc, section_id asc).
///
/// The production implementation queries the warehouse; tests substitute an
/// in-memory map so the schedule pipeline stays a pure function of rows.
#[async_trait]
pub trait SectionSource {
    async fn section_records(
        &self,
        subject_id: &str,
        term_code: &str,
    ) -> anyhow::Result<Vec<RawMeetingRecord>>;
}

/// Classifies a section row by its four kind flags. At most one flag is
/// expected to be set; rows with none set are unclassifiable and the caller
/// drops them.
pub fn classify_section(record: &RawMeetingRecord) -> Option<SectionKind> {
    if record.is_lecture {
        Some(SectionKind::Lecture)
    } else if record.is_recitation {
        Some(SectionKind::Recitation)
    } else if record.is_lab {
        Some(SectionKind::Lab)
    } else if record.is_design {
        Some(SectionKind::Design)
    } else {
        None
    }
}

/// Outcome of matching one trimmed meeting-time clause against the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClauseMatch {
    Matched {
        days: String,
        is_evening: bool,
        hours: String,
    },
    Unmatched,
}

/// Tries the non-evening pattern, then the evening pattern. The order is
/// fixed; the first successful match wins.
pub fn match_clause(clause: &str) -> ClauseMatch {
    if let Some(caps) = NON_EVENING_RE.captures(clause) {
        return ClauseMatch::Matched {
            days: caps[1].to_string(),
            is_evening: false,
            hours: caps[2].to_string(),
        };
    }
    if let Some(caps) = EVENING_RE.captures(clause) {
        return ClauseMatch::Matched {
            days: caps[1].to_string(),
            is_evening: true,
            hours: caps[2].to_string(),
        };
    }
    ClauseMatch::Unmatched
}

/// Whole-record screens for time texts that mean "no fixed time": TBA/TBD
/// markers, leading asterisks, and "arranged" sections.
fn is_unscheduled(time_text: &str) -> bool {
    let lower = time_text.to_lowercase();
    lower.contains("tba")
        || lower.contains("tbd")
        || lower.contains("arranged")
        || time_text.starts_with('*')
}

/// Parses one section row into its meeting descriptors.
///
/// A row without a room or without a time text yields a single TBA sentinel.
/// Otherwise each comma-separated clause is parsed independently, and a
/// clause the grammar rejects becomes its own TBA sentinel without
/// affecting its siblings.
pub fn parse_record(subject_id: &str, record: &RawMeetingRecord) -> Vec<MeetingDescriptor> {
    let room = match record.room.as_deref() {
        Some(room) if !room.is_empty() => room,
        _ => return vec![MeetingDescriptor::Tba],
    };
    let raw_time = match record.time_text.as_deref() {
        Some(time_text) => time_text,
        None => return vec![MeetingDescriptor::Tba],
    };

    // The warehouse mixes "1:30" and "1.30" notation.
    let time_text = raw_time.replace(':', ".");

    if is_unscheduled(&time_text) {
        return vec![MeetingDescriptor::Tba];
    }

    let mut descriptors = Vec::new();
    for clause in time_text.split(',') {
        match match_clause(clause.trim()) {
            ClauseMatch::Matched {
                days,
                is_evening,
                hours,
            } => descriptors.push(MeetingDescriptor::Meeting {
                room: room.to_string(),
                days,
                is_evening,
                hours,
            }),
            ClauseMatch::Unmatched => {
                warn!("could not parse schedule {raw_time} for subject {subject_id}");
                descriptors.push(MeetingDescriptor::Tba);
            }
        }
    }
    descriptors
}

fn encode_descriptor(descriptor: &MeetingDescriptor) -> String {
    match descriptor {
        MeetingDescriptor::Tba => "TBA".to_string(),
        MeetingDescriptor::Meeting {
            room,
            days,
            is_evening,
            hours,
        } => {
            let evening_flag = if *is_evening { "1" } else { "0" };
            format!("{room}/{days}/{evening_flag}/{hours}")
        }
    }
}

/// The four per-kind descriptor groups of one term, in kind-priority order.
/// Insertion order within a group follows the fetch order of the rows.
#[derive(Debug, Default)]
pub struct TermSections {
    groups: [Vec<MeetingDescriptor>; 4],
}

impl TermSections {
    pub fn push(&mut self, kind: SectionKind, descriptor: MeetingDescriptor) {
        self.groups[kind as usize].push(descriptor);
    }

    /// Serializes the term into the standardized schedule string, or `None`
    /// when no section of any kind exists.
    ///
    /// Non-empty groups are joined with semicolons in kind-priority order;
    /// within a group, the kind label and each encoded descriptor are joined
    /// with commas, e.g.
    /// `Lecture,10-250/MWF/0/10;Recitation,34-301/M/0/11,34-302/M/1/7 PM`.
    pub fn encode(&self) -> Option<String> {
        let mut out = String::new();
        for kind in SectionKind::ALL {
            let group = &self.groups[kind as usize];
            if group.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push(';');
            }
            out.push_str(kind.label());
            for descriptor in group {
                out.push(',');
                out.push_str(&encode_descriptor(descriptor));
            }
        }
        (!out.is_empty()).then_some(out)
    }
}

/// Classifies, parses, and encodes one term's rows into a schedule string.
///
/// Unclassifiable rows are reported and contribute nothing; the result is
/// `None` only when no row produced a descriptor.
pub fn build_term_schedule(subject_id: &str, records: &[RawMeetingRecord]) -> Option<String> {
    let mut sections = TermSections::default();
    for record in records {
        let Some(kind) = classify_section(record) else {
            warn!("encountered unknown section type for subject {subject_id}");
            continue;
        };
        for descriptor in parse_record(subject_id, record) {
            sections.push(kind, descriptor);
        }
    }
    sections.encode()
}

/// Computes the (fall, IAP, spring) schedule strings for a subject in one
/// academic year. Terms are fetched and processed independently; any of the
/// three results may be absent.
pub async fn compute_year_schedule<S: SectionSource>(
    source: &S,
    subject_id: &str,
    year: i32,
) -> anyhow::Result<AcademicYearSchedule> {
    let mut schedule = AcademicYearSchedule::default();
    for (term_code, slot) in [
        (format!("{year}FA"), &mut schedule.fall),
        (format!("{year}JA"), &mut schedule.iap),
        (format!("{year}SP"), &mut schedule.spring),
    ] {
        let records = source.section_records(subject_id, &term_code).await?;
        *slot = build_term_schedule(subject_id, &records);
    }
    Ok(schedule)
}
