use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::info;

use crate::capture_filter::filter_multiple_captures;
use crate::checkpoint::{self, CheckpointPaths, WrittenFile};
use crate::db::DbPool;
use crate::error::Result;
use crate::extract;
use crate::frog_type::classify_frogs;
use crate::join::apply_join_overrides;
use crate::output::{finalize_frog_growth, FrogGrowthDataset};
use crate::overrides::Overrides;
use crate::population::{attach_population_types, classify_sites};
use crate::relocation::{correct_relocations, exclude_known_bad_pairs};

#[derive(Debug, Clone, Serialize)]
pub struct ExtractSummary {
    pub capture_rows: usize,
    pub relocation_rows: usize,
    pub excluded_relocation_rows: usize,
    pub outputs: Vec<WrittenFile>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineSummary {
    pub capture_rows: usize,
    pub multiple_capture_rows: usize,
    pub relocation_rows: usize,
    pub joined_rows: usize,
    pub sites: usize,
    pub output_rows: usize,
    pub dropped_individuals: usize,
    pub outputs: Vec<WrittenFile>,
}

/// Everything produced by one pass over the extracted tables.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub sites: DataFrame,
    pub dataset: FrogGrowthDataset,
    pub summary: PipelineSummary,
}

/// Queries both lineages and writes them as checkpoints. Known-bad relocation
/// pairs are removed before the relocation checkpoint is written.
pub async fn extract_checkpoints(
    pool: &DbPool,
    paths: &CheckpointPaths,
    overrides: &Overrides,
) -> Result<ExtractSummary> {
    let captures = extract::extract_captures(pool).await?;
    let raw_relocations = extract::extract_relocations(pool).await?;
    let relocations = exclude_known_bad_pairs(&raw_relocations, overrides)?;

    let outputs = vec![
        checkpoint::write_csv(&captures, &paths.captures())?,
        checkpoint::write_csv(&relocations, &paths.relocations())?,
    ];

    Ok(ExtractSummary {
        capture_rows: captures.height(),
        relocation_rows: relocations.height(),
        excluded_relocation_rows: raw_relocations.height() - relocations.height(),
        outputs,
    })
}

/// Runs the capture filter through the frog-type classifier on in-memory
/// tables. Nothing is written.
pub fn build_frog_growth(
    captures: &DataFrame,
    relocations: &DataFrame,
    overrides: &Overrides,
) -> Result<PipelineOutput> {
    let multiple = filter_multiple_captures(captures)?;
    let corrected = correct_relocations(relocations, overrides)?;
    let joined = apply_join_overrides(&multiple, &corrected, overrides)?;
    let sites = classify_sites(&joined, overrides)?;
    let with_population = attach_population_types(&joined, &sites)?;
    let classified = classify_frogs(&with_population, overrides)?;
    let dataset = finalize_frog_growth(&classified)?;

    let summary = PipelineSummary {
        capture_rows: captures.height(),
        multiple_capture_rows: multiple.height(),
        relocation_rows: corrected.height(),
        joined_rows: joined.height(),
        sites: sites.height(),
        output_rows: dataset.frame.height(),
        dropped_individuals: dataset.dropped_individuals,
        outputs: Vec::new(),
    };

    Ok(PipelineOutput {
        sites,
        dataset,
        summary,
    })
}

/// Reads the checkpoints, builds the dataset and writes `frog_growth.csv`.
pub fn build_from_checkpoints(
    paths: &CheckpointPaths,
    overrides: &Overrides,
) -> Result<PipelineSummary> {
    let captures = checkpoint::read_captures(&paths.captures())?;
    let relocations = checkpoint::read_relocations(&paths.relocations())?;

    let PipelineOutput {
        dataset,
        mut summary,
        ..
    } = build_frog_growth(&captures, &relocations, overrides)?;

    summary
        .outputs
        .push(checkpoint::write_csv(&dataset.frame, &paths.frog_growth())?);

    info!(
        output_rows = summary.output_rows,
        dropped_individuals = summary.dropped_individuals,
        "Frog growth pipeline finished"
    );
    Ok(summary)
}

/// The per-site classification computed from the checkpoints.
pub fn classify_sites_from_checkpoints(
    paths: &CheckpointPaths,
    overrides: &Overrides,
) -> Result<DataFrame> {
    let captures = checkpoint::read_captures(&paths.captures())?;
    let relocations = checkpoint::read_relocations(&paths.relocations())?;
    Ok(build_frog_growth(&captures, &relocations, overrides)?.sites)
}
