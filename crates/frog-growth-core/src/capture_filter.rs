use std::collections::HashMap;

use polars::prelude::*;
use tracing::info;

use crate::error::Result;
use crate::frame::{keep_rows, str_values};
use crate::schema::capture;

/// Reduces the raw capture table to individuals measured more than once.
///
/// Rows with any missing field are dropped first. Individuals are only
/// measured at their first capture within a primary period, so this also
/// collapses repeat captures within a period to the measured one. The
/// per-individual count is then taken over the complete rows only.
pub fn filter_multiple_captures(captures: &DataFrame) -> Result<DataFrame> {
    let complete = drop_incomplete_rows(captures)?;
    let multiple = keep_individuals_with_multiple_rows(&complete, capture::PIT_TAG_REF)?;

    info!(
        input_rows = captures.height(),
        complete_rows = complete.height(),
        output_rows = multiple.height(),
        "Filtered captures to individuals with multiple complete records"
    );
    Ok(multiple)
}

fn drop_incomplete_rows(df: &DataFrame) -> Result<DataFrame> {
    let mut mask = vec![true; df.height()];
    for column in df.get_columns() {
        if column.null_count() == 0 {
            continue;
        }
        let nulls = column.as_materialized_series().is_null();
        for (keep, is_null) in mask.iter_mut().zip(nulls.into_iter()) {
            if is_null.unwrap_or(false) {
                *keep = false;
            }
        }
    }
    Ok(keep_rows(df, &mask)?)
}

/// Keeps every row of each individual that has more than one row in `df`.
pub fn keep_individuals_with_multiple_rows(df: &DataFrame, tag_column: &str) -> Result<DataFrame> {
    let tags = str_values(df, tag_column)?;

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for tag in tags.iter().flatten() {
        *counts.entry(tag.as_str()).or_default() += 1;
    }

    let mask: Vec<bool> = tags
        .iter()
        .map(|tag| {
            tag.as_deref()
                .and_then(|value| counts.get(value))
                .is_some_and(|&count| count > 1)
        })
        .collect();

    Ok(keep_rows(df, &mask)?)
}
