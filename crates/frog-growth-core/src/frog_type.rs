use polars::prelude::*;
use tracing::{info, warn};

use crate::error::Result;
use crate::frame::{i32_values, str_values};
use crate::overrides::Overrides;
use crate::schema::{capture, growth, relocation, site};
use crate::types::{FrogType, PopulationType, RelocationType};

/// Resolves the frog type of one capture. The first matching rule wins:
///
/// * the capture's own relocation type;
/// * resident, for untyped captures at bd-naive, post-epizootic,
///   Bd-treatment and natural-recovery sites;
/// * the site lists in the override table.
///
/// Listed (site, individual) captures are translocated regardless.
pub fn resolve_frog_type(
    site_id: Option<i32>,
    pit_tag_ref: Option<&str>,
    relocation_type: Option<RelocationType>,
    population: Option<PopulationType>,
    overrides: &Overrides,
) -> Option<FrogType> {
    if let (Some(site_id), Some(tag)) = (site_id, pit_tag_ref) {
        if overrides.forces_translocation(site_id, tag) {
            return Some(FrogType::Translocated);
        }
    }

    if let Some(kind) = relocation_type {
        return Some(kind.into());
    }

    if population.is_some_and(PopulationType::defaults_to_resident) {
        return Some(FrogType::Resident);
    }

    site_id.and_then(|site_id| overrides.frog_type_for_site(site_id))
}

/// Adds `frog_type` to a joined frame that already carries `population_type`.
pub fn classify_frogs(df: &DataFrame, overrides: &Overrides) -> Result<DataFrame> {
    let site_ids = i32_values(df, capture::SITE_ID)?;
    let tags = str_values(df, capture::PIT_TAG_REF)?;
    let types = str_values(df, relocation::TYPE)?;
    let populations = i32_values(df, site::POPULATION_TYPE)?;

    let mut frog_types: Vec<Option<i32>> = Vec::with_capacity(df.height());
    let mut unresolved = 0usize;

    for idx in 0..df.height() {
        let relocation_type = types[idx].as_deref().and_then(RelocationType::parse);
        let population = populations[idx].and_then(PopulationType::from_code);
        let resolved = resolve_frog_type(
            site_ids[idx],
            tags[idx].as_deref(),
            relocation_type,
            population,
            overrides,
        );
        if resolved.is_none() {
            unresolved += 1;
        }
        frog_types.push(resolved.map(FrogType::code));
    }

    if unresolved > 0 {
        warn!(rows = unresolved, "Captures without a frog type");
    }
    info!(rows = df.height(), "Classified frog types");

    let mut output = df.clone();
    output.with_column(Series::new(growth::FROG_TYPE.into(), frog_types))?;
    Ok(output)
}
