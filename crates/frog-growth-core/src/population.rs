use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::*;
use tracing::{info, warn};

use crate::error::{PipelineError, Result};
use crate::frame::{i32_values, str_values};
use crate::overrides::Overrides;
use crate::schema::{capture, relocation, site};
use crate::types::{PopulationType, RelocationType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct RelocationPresence {
    translocation: bool,
    reintroduction: bool,
}

impl RelocationPresence {
    fn record(&mut self, kind: RelocationType) {
        match kind {
            RelocationType::Translocation => self.translocation = true,
            RelocationType::Reintroduction => self.reintroduction = true,
        }
    }

    fn base_population(self) -> Option<PopulationType> {
        match (self.translocation, self.reintroduction) {
            (true, false) => Some(PopulationType::Translocated),
            (false, true) => Some(PopulationType::Reintroduced),
            (true, true) => Some(PopulationType::TranslocatedReintroduced),
            (false, false) => None,
        }
    }
}

/// Derives one `population_type` per site from the corrected capture join.
///
/// The base code comes from which relocation types were observed at the site
/// (sites listed as forced reintroductions count as reintroduction only); the
/// population override lists win wherever a site appears in one. Sites with
/// neither observed types nor an override resolve to null.
///
/// Returns a frame with `site_id` and `population_type`, one row per site,
/// ordered by site id.
pub fn classify_sites(joined: &DataFrame, overrides: &Overrides) -> Result<DataFrame> {
    let site_ids = i32_values(joined, capture::SITE_ID)?;
    let types = str_values(joined, relocation::TYPE)?;

    let mut pairs: BTreeSet<(i32, Option<String>)> = BTreeSet::new();
    for (site_id, kind) in site_ids.into_iter().zip(types) {
        if let Some(site_id) = site_id {
            pairs.insert((site_id, kind));
        }
    }

    let mut presence: BTreeMap<i32, RelocationPresence> = BTreeMap::new();
    for (site_id, kind) in pairs {
        let entry = presence.entry(site_id).or_default();
        let kind = if overrides.forces_reintroduction(site_id) {
            Some(RelocationType::Reintroduction)
        } else {
            match kind.as_deref() {
                None => None,
                Some(label) => Some(
                    RelocationType::parse(label)
                        .ok_or_else(|| PipelineError::UnknownRelocationType(label.to_string()))?,
                ),
            }
        };
        if let Some(kind) = kind {
            entry.record(kind);
        }
    }

    let mut site_column = Vec::with_capacity(presence.len());
    let mut population_column = Vec::with_capacity(presence.len());
    let mut unresolved = Vec::new();

    for (site_id, flags) in presence {
        let resolved = overrides.resolve_population(site_id, flags.base_population());
        if resolved.is_none() {
            unresolved.push(site_id);
        }
        site_column.push(site_id);
        population_column.push(resolved.map(PopulationType::code));
    }

    if !unresolved.is_empty() {
        warn!(
            count = unresolved.len(),
            sites = ?unresolved,
            "Sites without a population type"
        );
    }
    info!(sites = site_column.len(), "Classified site population types");

    let df = DataFrame::new(vec![
        Series::new(site::SITE_ID.into(), site_column).into(),
        Series::new(site::POPULATION_TYPE.into(), population_column).into(),
    ])?;
    Ok(df)
}

/// Adds the site's `population_type` to every row of `joined`.
pub fn attach_population_types(joined: &DataFrame, sites: &DataFrame) -> Result<DataFrame> {
    let site_ids = i32_values(sites, site::SITE_ID)?;
    let codes = i32_values(sites, site::POPULATION_TYPE)?;
    let lookup: BTreeMap<i32, Option<i32>> = site_ids
        .into_iter()
        .zip(codes)
        .filter_map(|(site_id, code)| site_id.map(|site_id| (site_id, code)))
        .collect();

    let population: Vec<Option<i32>> = i32_values(joined, capture::SITE_ID)?
        .into_iter()
        .map(|site_id| site_id.and_then(|site_id| lookup.get(&site_id).copied().flatten()))
        .collect();

    let mut output = joined.clone();
    output.with_column(Series::new(site::POPULATION_TYPE.into(), population))?;
    Ok(output)
}
