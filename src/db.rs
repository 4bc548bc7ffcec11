use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::models::{CatalogRow, RawMeetingRecord};
use crate::schedule::SectionSource;

/// Catalog year currently being published; older rows are historical.
pub const CURRENT_YEAR: i32 = 2023;
/// Oldest academic year worth exporting.
pub const MIN_YEAR: i32 = 2016;

fn flag(value: Option<&str>) -> bool {
    value == Some("Y")
}

/// Read-only handle on the warehouse mirror.
pub struct Warehouse {
    pool: PgPool,
}

impl Warehouse {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetches the most recent catalog row for a subject, restricted to
    /// years >= MIN_YEAR. Returns `None` when the subject is unknown.
    pub async fn catalog_row(&self, subject_id: &str) -> anyhow::Result<Option<CatalogRow>> {
        let row = sqlx::query(
            "SELECT academic_year, subject_id, subject_title, total_units, \
             lecture_units, lab_units, design_units, preparation_units, \
             is_variable_units, is_offered_this_year, is_offered_fall_term, \
             is_offered_iap, is_offered_spring_term, is_offered_summer_term, \
             hgn_code, joint_subjects, equivalent_subjects, meets_with_subjects, \
             comm_req_attribute, gir_attribute, hass_attribute, status_change, \
             subject_description, on_line_page_number, fall_instructors, \
             spring_instructors \
             FROM cis_course_catalog \
             WHERE subject_id = $1 AND academic_year >= $2 \
             ORDER BY academic_year DESC \
             LIMIT 1",
        )
        .bind(subject_id)
        .bind(MIN_YEAR)
        .fetch_optional(&self.pool)
        .await
        .context("failed to query cis_course_catalog")?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(CatalogRow {
            academic_year: row.get("academic_year"),
            subject_id: row.get("subject_id"),
            subject_title: row.get("subject_title"),
            total_units: row.get("total_units"),
            lecture_units: row.get("lecture_units"),
            lab_units: row.get("lab_units"),
            design_units: row.get("design_units"),
            preparation_units: row.get("preparation_units"),
            is_variable_units: row.get("is_variable_units"),
            is_offered_this_year: row.get("is_offered_this_year"),
            is_offered_fall_term: row.get("is_offered_fall_term"),
            is_offered_iap: row.get("is_offered_iap"),
            is_offered_spring_term: row.get("is_offered_spring_term"),
            is_offered_summer_term: row.get("is_offered_summer_term"),
            hgn_code: row.get("hgn_code"),
            joint_subjects: row.get("joint_subjects"),
            equivalent_subjects: row.get("equivalent_subjects"),
            meets_with_subjects: row.get("meets_with_subjects"),
            comm_req_attribute: row.get("comm_req_attribute"),
            gir_attribute: row.get("gir_attribute"),
            hass_attribute: row.get("hass_attribute"),
            status_change: row.get("status_change"),
            subject_description: row.get("subject_description"),
            on_line_page_number: row.get("on_line_page_number"),
            fall_instructors: row.get("fall_instructors"),
            spring_instructors: row.get("spring_instructors"),
        }))
    }

    /// Responsible faculty for the master section of a (subject, term), if
    /// one is recorded. The subject_offered data is more accurate than the
    /// instructor columns of the catalog row.
    pub async fn master_instructor(
        &self,
        subject_id: &str,
        term_code: &str,
    ) -> anyhow::Result<Option<String>> {
        let row = sqlx::query(
            "SELECT responsible_faculty_name FROM subject_offered \
             WHERE subject_id = $1 AND term_code = $2 AND is_master_section = 'Y'",
        )
        .bind(subject_id)
        .bind(term_code)
        .fetch_optional(&self.pool)
        .await
        .context("failed to query subject_offered master section")?;

        Ok(row.and_then(|row| row.get("responsible_faculty_name")))
    }

    /// Expands a raw HASS attribute code (e.g. "HS") to its bulletin form
    /// (e.g. "HASS-S"). Unknown codes map to `None`.
    pub async fn hass_attribute(&self, raw: &str) -> anyhow::Result<Option<String>> {
        let row = sqlx::query(
            "SELECT description_in_bulletin FROM cis_hass_attribute \
             WHERE hass_attribute = $1",
        )
        .bind(raw)
        .fetch_optional(&self.pool)
        .await
        .context("failed to query cis_hass_attribute")?;

        Ok(row.and_then(|row| row.get("description_in_bulletin")))
    }
}

#[async_trait]
impl SectionSource for Warehouse {
    async fn section_records(
        &self,
        subject_id: &str,
        term_code: &str,
    ) -> anyhow::Result<Vec<RawMeetingRecord>> {
        let rows = sqlx::query(
            "SELECT meet_place, meet_time, is_lecture_section, \
             is_recitation_section, is_lab_section, is_design_section \
             FROM subject_offered \
             WHERE subject_id = $1 AND term_code = $2 AND is_master_section = 'N' \
             ORDER BY is_lecture_section DESC, is_recitation_section DESC, \
             is_lab_section DESC, section_id",
        )
        .bind(subject_id)
        .bind(term_code)
        .fetch_all(&self.pool)
        .await
        .context("failed to query subject_offered sections")?;

        let mut records = Vec::new();
        for row in rows {
            records.push(RawMeetingRecord {
                room: row.get("meet_place"),
                time_text: row.get("meet_time"),
                is_lecture: flag(row.get::<Option<String>, _>("is_lecture_section").as_deref()),
                is_recitation: flag(
                    row.get::<Option<String>, _>("is_recitation_section").as_deref(),
                ),
                is_lab: flag(row.get::<Option<String>, _>("is_lab_section").as_deref()),
                is_design: flag(row.get::<Option<String>, _>("is_design_section").as_deref()),
            });
        }

        Ok(records)
    }
}
