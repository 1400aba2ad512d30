use std::collections::HashSet;

use polars::prelude::*;
use tracing::{info, warn};

use crate::capture_filter::keep_individuals_with_multiple_rows;
use crate::error::Result;
use crate::frame::str_values;
use crate::schema::{capture, growth};

/// The analysis-ready dataset and what the final multiplicity pass removed.
#[derive(Debug, Clone)]
pub struct FrogGrowthDataset {
    pub frame: DataFrame,
    pub dropped_individuals: usize,
    pub dropped_rows: usize,
}

/// Keeps individuals with at least two enriched captures, renames the capture
/// columns to their output names and selects the output columns in order.
///
/// Pre-release site removals can leave an individual with a single capture;
/// any individual removed here is logged.
pub fn finalize_frog_growth(enriched: &DataFrame) -> Result<FrogGrowthDataset> {
    let multiple = keep_individuals_with_multiple_rows(enriched, capture::PIT_TAG_REF)?;

    let before = distinct_individuals(enriched)?;
    let after = distinct_individuals(&multiple)?;
    let dropped_individuals = before - after;
    let dropped_rows = enriched.height() - multiple.height();
    if dropped_individuals > 0 {
        warn!(
            individuals = dropped_individuals,
            rows = dropped_rows,
            "Removed individuals left with a single capture after enrichment"
        );
    }

    let mut renamed = multiple;
    renamed.rename(capture::VISIT_DATE, growth::CAPTURE_DATE.into())?;
    renamed.rename(capture::CAPTURE_ANIMAL_STATE, growth::STATE.into())?;
    let frame = renamed.select(growth::ALL)?;

    info!(
        rows = frame.height(),
        individuals = after,
        "Assembled frog growth dataset"
    );

    Ok(FrogGrowthDataset {
        frame,
        dropped_individuals,
        dropped_rows,
    })
}

fn distinct_individuals(df: &DataFrame) -> Result<usize> {
    let tags = str_values(df, capture::PIT_TAG_REF)?;
    Ok(tags.iter().flatten().collect::<HashSet<_>>().len())
}
