use anyhow::Result;
use chrono::NaiveDate;
use frog_growth_core::{
    extract::{captures_to_frame, relocations_to_frame},
    frame::i32_values,
    join::apply_join_overrides,
    overrides::Overrides,
    population::{attach_population_types, classify_sites},
    relocation::correct_relocations,
    schema::site,
    types::{CaptureRow, PopulationType, RelocationRow},
};
use polars::prelude::DataFrame;

fn capture(site_id: i32, visit_date: &str, tag: &str) -> CaptureRow {
    CaptureRow {
        site_id: Some(site_id),
        visit_date: NaiveDate::parse_from_str(visit_date, "%Y-%m-%d").ok(),
        pit_tag_ref: Some(tag.to_string()),
        tag_new: Some(false),
        capture_animal_state: Some("healthy".to_string()),
        sex: Some("f".to_string()),
        length: Some(50.0),
        weight: Some(13.0),
    }
}

fn relocation_row(kind: &str, tag: &str) -> RelocationRow {
    RelocationRow {
        collect_siteid: Some("90000".to_string()),
        release_siteid1: None,
        release_siteid2: None,
        release_date: NaiveDate::from_ymd_opt(2015, 7, 1),
        relocation_type: Some(kind.to_string()),
        pit_tag_ref: Some(tag.to_string()),
    }
}

fn joined(
    captures: &[CaptureRow],
    relocations: &[RelocationRow],
    overrides: &Overrides,
) -> Result<DataFrame> {
    let captures = captures_to_frame(captures)?;
    let relocations = correct_relocations(&relocations_to_frame(relocations)?, overrides)?;
    Ok(apply_join_overrides(&captures, &relocations, overrides)?)
}

fn site_codes(sites: &DataFrame) -> Result<Vec<(Option<i32>, Option<i32>)>> {
    Ok(i32_values(sites, site::SITE_ID)?
        .into_iter()
        .zip(i32_values(sites, site::POPULATION_TYPE)?)
        .collect())
}

#[test]
fn bd_naive_override_wins_over_translocation() -> Result<()> {
    let overrides = Overrides::builtin()?;
    let df = joined(
        &[
            capture(11008, "2019-08-01", "T1"),
            capture(11008, "2020-08-01", "T1"),
        ],
        &[relocation_row("translocation", "T1")],
        &overrides,
    )?;

    let sites = classify_sites(&df, &overrides)?;

    assert_eq!(
        site_codes(&sites)?,
        vec![(Some(11008), Some(PopulationType::BdNaive.code()))]
    );
    Ok(())
}

#[test]
fn base_codes_follow_observed_relocation_types() -> Result<()> {
    let overrides = Overrides::builtin()?;
    let df = joined(
        &[
            capture(1, "2019-08-01", "T1"),
            capture(2, "2019-08-01", "T2"),
            capture(3, "2019-08-01", "T3"),
            capture(3, "2019-08-01", "T4"),
            capture(3, "2019-08-01", "T5"),
            capture(4, "2019-08-01", "T6"),
        ],
        &[
            relocation_row("translocation", "T1"),
            relocation_row("reintroduction", "T2"),
            relocation_row("translocation", "T3"),
            relocation_row("reintroduction", "T4"),
        ],
        &overrides,
    )?;

    let sites = classify_sites(&df, &overrides)?;

    assert_eq!(
        site_codes(&sites)?,
        vec![
            (Some(1), Some(1)),
            (Some(2), Some(2)),
            (Some(3), Some(3)),
            (Some(4), None),
        ]
    );
    Ok(())
}

#[test]
fn forced_reintroduction_sites_resolve_to_reintroduced() -> Result<()> {
    let overrides = Overrides::from_toml_str(
        r#"
        [population]
        forced_reintroduction_sites = [4]

        [population.overrides]
        natural_recovery = [5]
        "#,
    )?;
    let df = joined(
        &[
            capture(4, "2019-08-01", "T1"),
            capture(5, "2019-08-01", "T2"),
        ],
        &[],
        &overrides,
    )?;

    let sites = classify_sites(&df, &overrides)?;

    assert_eq!(
        site_codes(&sites)?,
        vec![
            (Some(4), Some(PopulationType::Reintroduced.code())),
            (Some(5), Some(PopulationType::NaturalRecovery.code())),
        ]
    );
    Ok(())
}

#[test]
fn every_capture_row_receives_its_site_code() -> Result<()> {
    let overrides = Overrides::builtin()?;
    let df = joined(
        &[
            capture(1, "2019-08-01", "T1"),
            capture(1, "2020-08-01", "T1"),
            capture(4, "2019-08-01", "T6"),
        ],
        &[relocation_row("translocation", "T1")],
        &overrides,
    )?;

    let sites = classify_sites(&df, &overrides)?;
    let attached = attach_population_types(&df, &sites)?;

    assert_eq!(attached.height(), df.height());
    assert_eq!(
        i32_values(&attached, site::POPULATION_TYPE)?,
        vec![Some(1), Some(1), None]
    );
    Ok(())
}
