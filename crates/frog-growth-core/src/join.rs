use std::collections::{BTreeSet, HashMap};

use polars::prelude::*;
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::frame::{date_series, date_values, i32_values, keep_rows, str_series, str_values};
use crate::overrides::Overrides;
use crate::schema::{capture, relocation};
use crate::types::RelocationType;

/// Relocation columns carried onto each capture row by the join.
pub const JOINED_RELOCATION_COLUMNS: [&str; 8] = [
    relocation::COLLECT_SITEID,
    relocation::COLLECT_SITEID1,
    relocation::COLLECT_SITEID2,
    relocation::COLLECT_SITEID3,
    relocation::RELEASE_SITEID1,
    relocation::RELEASE_SITEID2,
    relocation::RELEASE_DATE,
    relocation::TYPE,
];

/// Joins captures to corrected relocations and applies the relocation-type
/// corrections and pre-release site removals, in that order.
pub fn apply_join_overrides(
    captures: &DataFrame,
    relocations: &DataFrame,
    overrides: &Overrides,
) -> Result<DataFrame> {
    let joined = join_relocations(captures, relocations)?;
    let typed = correct_relocation_types(&joined, overrides)?;
    drop_prerelease_sites(&typed, overrides)
}

/// Left-joins each capture to its individual's relocation record.
///
/// An individual may have at most one relocation record; more than one would
/// multiply its capture rows, so it is reported as an error instead.
pub fn join_relocations(captures: &DataFrame, relocations: &DataFrame) -> Result<DataFrame> {
    let relocation_tags = str_values(relocations, relocation::PIT_TAG_REF)?;

    let mut by_tag: HashMap<&str, usize> = HashMap::with_capacity(relocation_tags.len());
    let mut duplicates: BTreeSet<String> = BTreeSet::new();
    for (idx, tag) in relocation_tags.iter().enumerate() {
        let Some(tag) = tag.as_deref() else {
            continue;
        };
        if by_tag.insert(tag, idx).is_some() {
            duplicates.insert(tag.to_string());
        }
    }
    if !duplicates.is_empty() {
        return Err(PipelineError::DuplicateRelocation(
            duplicates.into_iter().collect(),
        ));
    }

    let capture_tags = str_values(captures, capture::PIT_TAG_REF)?;
    let matches: Vec<Option<usize>> = capture_tags
        .iter()
        .map(|tag| tag.as_deref().and_then(|tag| by_tag.get(tag).copied()))
        .collect();

    let mut joined = captures.clone();

    let collect = str_values(relocations, relocation::COLLECT_SITEID)?;
    joined.with_column(str_series(
        relocation::COLLECT_SITEID,
        &gather(&collect, &matches),
    ))?;

    for name in relocation::COLLECT_SPLIT
        .into_iter()
        .chain([relocation::RELEASE_SITEID1, relocation::RELEASE_SITEID2])
    {
        let values = i32_values(relocations, name)?;
        joined.with_column(Series::new(name.into(), gather(&values, &matches)))?;
    }

    let release_dates = date_values(relocations, relocation::RELEASE_DATE)?;
    joined.with_column(date_series(
        relocation::RELEASE_DATE,
        gather(&release_dates, &matches),
    )?)?;

    let types = str_values(relocations, relocation::TYPE)?;
    joined.with_column(str_series(relocation::TYPE, &gather(&types, &matches)))?;

    if joined.height() != captures.height() {
        return Err(PipelineError::JoinMultiplicity {
            expected: captures.height(),
            found: joined.height(),
        });
    }

    let matched = matches.iter().filter(|m| m.is_some()).count();
    info!(
        rows = joined.height(),
        matched_rows = matched,
        "Joined captures to relocation records"
    );
    Ok(joined)
}

fn gather<T: Clone>(values: &[Option<T>], matches: &[Option<usize>]) -> Vec<Option<T>> {
    matches
        .iter()
        .map(|m| m.and_then(|idx| values[idx].clone()))
        .collect()
}

/// Nulls relocation types that cannot apply to the capture they are attached
/// to:
///
/// 1. a translocation/reintroduction label on a capture at one of the
///    individual's collection sites, on or before the release date;
/// 2. labels of individuals listed in the override table;
/// 3. the literal `"NA"`.
pub fn correct_relocation_types(joined: &DataFrame, overrides: &Overrides) -> Result<DataFrame> {
    let site_ids = i32_values(joined, capture::SITE_ID)?;
    let visit_dates = date_values(joined, capture::VISIT_DATE)?;
    let tags = str_values(joined, capture::PIT_TAG_REF)?;
    let release_dates = date_values(joined, relocation::RELEASE_DATE)?;
    let collect_sites = relocation::COLLECT_SPLIT
        .into_iter()
        .map(|name| i32_values(joined, name))
        .collect::<PolarsResult<Vec<_>>>()?;
    let mut types = str_values(joined, relocation::TYPE)?;

    let mut before_release = 0usize;
    for (idx, value) in types.iter_mut().enumerate() {
        let is_relocation = value
            .as_deref()
            .and_then(RelocationType::parse)
            .is_some();
        if !is_relocation {
            continue;
        }
        let Some(site_id) = site_ids[idx] else {
            continue;
        };
        let at_collect_site = collect_sites
            .iter()
            .any(|column| column[idx] == Some(site_id));
        let on_or_before_release = matches!(
            (release_dates[idx], visit_dates[idx]),
            (Some(release), Some(visit)) if release >= visit
        );
        if at_collect_site && on_or_before_release {
            *value = None;
            before_release += 1;
        }
    }

    let mut listed = 0usize;
    for (value, tag) in types.iter_mut().zip(tags.iter()) {
        if value.is_some() && tag.as_deref().is_some_and(|tag| overrides.nulls_type_for(tag)) {
            *value = None;
            listed += 1;
        }
    }

    for value in types.iter_mut() {
        if value.as_deref() == Some(RelocationType::NA) {
            *value = None;
        }
    }

    info!(
        before_release,
        listed, "Nulled relocation types that do not apply to their capture"
    );

    let mut output = joined.clone();
    output.with_column(str_series(relocation::TYPE, &types))?;
    Ok(output)
}

/// Drops captures at sites that only hold pre-release records: lab-held
/// frogs and releases missing from the relocation tables.
pub fn drop_prerelease_sites(df: &DataFrame, overrides: &Overrides) -> Result<DataFrame> {
    let site_ids = i32_values(df, capture::SITE_ID)?;
    let mask: Vec<bool> = site_ids
        .iter()
        .map(|site| !site.is_some_and(|site| overrides.is_prerelease_site(site)))
        .collect();

    let output = keep_rows(df, &mask)?;
    let removed = df.height() - output.height();
    if removed > 0 {
        info!(removed, "Dropped pre-release capture records");
    }
    Ok(output)
}
