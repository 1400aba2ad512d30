use polars::prelude::*;
use tracing::{info, warn};

use crate::error::{PipelineError, Result};
use crate::frame::{keep_rows, str_values};
use crate::overrides::Overrides;
use crate::schema::relocation;

/// Removes relocation records known to pair an individual with the wrong
/// collection site. Matching is on the raw, unsplit `collect_siteid`.
pub fn exclude_known_bad_pairs(relocations: &DataFrame, overrides: &Overrides) -> Result<DataFrame> {
    let collect = str_values(relocations, relocation::COLLECT_SITEID)?;
    let tags = str_values(relocations, relocation::PIT_TAG_REF)?;

    let mask: Vec<bool> = collect
        .iter()
        .zip(tags.iter())
        .map(|(site, tag)| match (site, tag) {
            (Some(site), Some(tag)) => !overrides.is_excluded_relocation(site, tag),
            _ => true,
        })
        .collect();

    let removed = mask.iter().filter(|keep| !**keep).count();
    if removed > 0 {
        info!(removed, "Removed known-bad relocation records");
    }
    Ok(keep_rows(relocations, &mask)?)
}

/// Applies the relocation corrections: known-bad pairs are removed, then the
/// comma-delimited `collect_siteid` is split into `collect_siteid1..3`.
pub fn correct_relocations(relocations: &DataFrame, overrides: &Overrides) -> Result<DataFrame> {
    let kept = exclude_known_bad_pairs(relocations, overrides)?;
    let corrected = split_collect_sites(&kept)?;
    info!(
        input_rows = relocations.height(),
        output_rows = corrected.height(),
        "Corrected relocation records"
    );
    Ok(corrected)
}

/// Splits `collect_siteid` into three integer columns, left-aligned, with
/// absent trailing values left null.
pub fn split_collect_sites(relocations: &DataFrame) -> Result<DataFrame> {
    let collect = str_values(relocations, relocation::COLLECT_SITEID)?;

    let mut split: [Vec<Option<i32>>; 3] = [
        Vec::with_capacity(collect.len()),
        Vec::with_capacity(collect.len()),
        Vec::with_capacity(collect.len()),
    ];

    for raw in &collect {
        let sites = match raw {
            Some(raw) => parse_collect_sites(raw)?,
            None => Vec::new(),
        };
        for (slot, values) in split.iter_mut().enumerate() {
            values.push(sites.get(slot).copied());
        }
    }

    let mut output = relocations.clone();
    for (name, values) in relocation::COLLECT_SPLIT.iter().zip(split) {
        output.with_column(Series::new((*name).into(), values))?;
    }
    Ok(output)
}

fn parse_collect_sites(raw: &str) -> Result<Vec<i32>> {
    let values: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect();

    if values.len() > relocation::COLLECT_SPLIT.len() {
        return Err(PipelineError::TooManyCollectSites(raw.to_string()));
    }

    values
        .into_iter()
        .map(|value| {
            value.parse::<i32>().map_err(|_| {
                warn!(raw, value, "Unparseable collection site id");
                PipelineError::InvalidSiteId {
                    raw: raw.to_string(),
                    value: value.to_string(),
                }
            })
        })
        .collect()
}
