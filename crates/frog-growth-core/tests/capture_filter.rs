use anyhow::Result;
use chrono::NaiveDate;
use frog_growth_core::{
    capture_filter::filter_multiple_captures,
    extract::captures_to_frame,
    frame::{f64_values, str_values},
    schema::capture,
    types::CaptureRow,
};

fn capture(site_id: i32, visit_date: &str, tag: &str, length: Option<f64>) -> CaptureRow {
    CaptureRow {
        site_id: Some(site_id),
        visit_date: NaiveDate::parse_from_str(visit_date, "%Y-%m-%d").ok(),
        pit_tag_ref: Some(tag.to_string()),
        tag_new: Some(false),
        capture_animal_state: Some("healthy".to_string()),
        sex: Some("m".to_string()),
        length,
        weight: Some(12.5),
    }
}

#[test]
fn incomplete_row_is_dropped_and_individual_kept() -> Result<()> {
    let rows = vec![
        capture(70413, "2018-07-10", "900043000100001", Some(48.0)),
        capture(70413, "2018-07-12", "900043000100001", None),
        capture(70413, "2019-07-15", "900043000100001", Some(52.0)),
    ];
    let df = captures_to_frame(&rows)?;

    let filtered = filter_multiple_captures(&df)?;

    assert_eq!(filtered.height(), 2);
    assert_eq!(
        f64_values(&filtered, capture::LENGTH)?,
        vec![Some(48.0), Some(52.0)]
    );
    Ok(())
}

#[test]
fn single_complete_capture_excludes_individual() -> Result<()> {
    let rows = vec![
        capture(70413, "2018-07-10", "900043000100001", Some(48.0)),
        capture(70413, "2019-07-15", "900043000100001", None),
        capture(70413, "2018-07-10", "900043000100002", Some(40.0)),
        capture(70413, "2019-07-15", "900043000100002", Some(44.0)),
    ];
    let df = captures_to_frame(&rows)?;

    let filtered = filter_multiple_captures(&df)?;

    let tags = str_values(&filtered, capture::PIT_TAG_REF)?;
    assert_eq!(
        tags,
        vec![
            Some("900043000100002".to_string()),
            Some("900043000100002".to_string())
        ]
    );
    Ok(())
}

#[test]
fn any_missing_field_counts_as_incomplete() -> Result<()> {
    let mut missing_sex = capture(10100, "2020-08-01", "900043000100003", Some(50.0));
    missing_sex.sex = None;
    let mut missing_tag_new = capture(10100, "2021-08-01", "900043000100003", Some(51.0));
    missing_tag_new.tag_new = None;
    let rows = vec![
        missing_sex,
        missing_tag_new,
        capture(10100, "2022-08-01", "900043000100003", Some(53.0)),
    ];
    let df = captures_to_frame(&rows)?;

    let filtered = filter_multiple_captures(&df)?;

    assert_eq!(filtered.height(), 0);
    assert_eq!(filtered.width(), df.width());
    Ok(())
}
