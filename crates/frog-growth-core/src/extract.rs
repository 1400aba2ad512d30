use polars::prelude::*;
use tracing::info;

use crate::db::DbPool;
use crate::error::Result;
use crate::frame::{date_series, days_since_epoch, str_series};
use crate::schema::{capture, relocation};
use crate::types::{CaptureRow, RelocationRow};

const CAPTURE_QUERY: &str = r#"
    SELECT
        visit.site_id::int4 AS site_id,
        visit.visit_date::date AS visit_date,
        capture_survey.pit_tag_ref::text AS pit_tag_ref,
        capture_survey.tag_new::bool AS tag_new,
        capture_survey.capture_animal_state::text AS capture_animal_state,
        capture_survey.sex::text AS sex,
        capture_survey.length::float8 AS length,
        capture_survey.weight::float8 AS weight
    FROM visit
    JOIN survey ON survey.visit_id = visit.id
    JOIN capture_survey ON capture_survey.survey_id = survey.id
    WHERE survey.survey_type = 'cmr'
      AND capture_survey.capture_animal_state <> 'dead'
    ORDER BY visit.site_id, capture_survey.pit_tag_ref, visit.visit_date
"#;

const RELOCATION_QUERY: &str = r#"
    SELECT
        relocate.collect_siteid::text AS collect_siteid,
        relocate.release_siteid1::int4 AS release_siteid1,
        relocate.release_siteid2::int4 AS release_siteid2,
        relocate.release_date::date AS release_date,
        relocate.type::text AS type,
        relocate_frog.pit_tag_ref::text AS pit_tag_ref
    FROM relocate
    LEFT JOIN relocate_frog ON relocate_frog.relocate_id = relocate.id
    ORDER BY relocate_frog.pit_tag_ref, relocate.release_date, relocate.collect_siteid
"#;

/// Runs the capture-lineage query: live animals from CMR surveys, ordered by
/// site, individual and visit date.
pub async fn extract_captures(pool: &DbPool) -> Result<DataFrame> {
    let rows: Vec<CaptureRow> = sqlx::query_as(CAPTURE_QUERY).fetch_all(pool).await?;
    info!(rows = rows.len(), "Extracted capture records");
    captures_to_frame(&rows)
}

/// Runs the relocation-lineage query, one row per relocated frog (or per
/// relocation event with no frogs attached).
pub async fn extract_relocations(pool: &DbPool) -> Result<DataFrame> {
    let rows: Vec<RelocationRow> = sqlx::query_as(RELOCATION_QUERY).fetch_all(pool).await?;
    info!(rows = rows.len(), "Extracted relocation records");
    relocations_to_frame(&rows)
}

pub fn captures_to_frame(rows: &[CaptureRow]) -> Result<DataFrame> {
    let len = rows.len();
    let mut site_ids = Vec::with_capacity(len);
    let mut visit_dates = Vec::with_capacity(len);
    let mut pit_tags = Vec::with_capacity(len);
    let mut tag_new = Vec::with_capacity(len);
    let mut states = Vec::with_capacity(len);
    let mut sexes = Vec::with_capacity(len);
    let mut lengths = Vec::with_capacity(len);
    let mut weights = Vec::with_capacity(len);

    for row in rows {
        site_ids.push(row.site_id);
        visit_dates.push(row.visit_date.map(days_since_epoch));
        pit_tags.push(row.pit_tag_ref.clone());
        tag_new.push(row.tag_new);
        states.push(row.capture_animal_state.clone());
        sexes.push(row.sex.clone());
        lengths.push(row.length);
        weights.push(row.weight);
    }

    let df = DataFrame::new(vec![
        Series::new(capture::SITE_ID.into(), site_ids).into(),
        date_series(capture::VISIT_DATE, visit_dates)?.into(),
        str_series(capture::PIT_TAG_REF, &pit_tags).into(),
        Series::new(capture::TAG_NEW.into(), tag_new).into(),
        str_series(capture::CAPTURE_ANIMAL_STATE, &states).into(),
        str_series(capture::SEX, &sexes).into(),
        Series::new(capture::LENGTH.into(), lengths).into(),
        Series::new(capture::WEIGHT.into(), weights).into(),
    ])?;
    Ok(df)
}

pub fn relocations_to_frame(rows: &[RelocationRow]) -> Result<DataFrame> {
    let len = rows.len();
    let mut collect = Vec::with_capacity(len);
    let mut release1 = Vec::with_capacity(len);
    let mut release2 = Vec::with_capacity(len);
    let mut release_dates = Vec::with_capacity(len);
    let mut types = Vec::with_capacity(len);
    let mut pit_tags = Vec::with_capacity(len);

    for row in rows {
        collect.push(row.collect_siteid.clone());
        release1.push(row.release_siteid1);
        release2.push(row.release_siteid2);
        release_dates.push(row.release_date.map(days_since_epoch));
        types.push(row.relocation_type.clone());
        pit_tags.push(row.pit_tag_ref.clone());
    }

    let df = DataFrame::new(vec![
        str_series(relocation::COLLECT_SITEID, &collect).into(),
        Series::new(relocation::RELEASE_SITEID1.into(), release1).into(),
        Series::new(relocation::RELEASE_SITEID2.into(), release2).into(),
        date_series(relocation::RELEASE_DATE, release_dates)?.into(),
        str_series(relocation::TYPE, &types).into(),
        str_series(relocation::PIT_TAG_REF, &pit_tags).into(),
    ])?;
    Ok(df)
}
