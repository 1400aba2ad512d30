//! Small helpers for moving between polars columns and plain row vectors.
//!
//! The stages read whole columns into `Vec<Option<_>>`, apply their per-row
//! rules, and rebuild columns from the results. Dates are carried as days
//! since the Unix epoch, the physical representation of polars' `Date`.

use chrono::NaiveDate;
use polars::prelude::*;

fn materialized(df: &DataFrame, name: &str, dtype: &DataType) -> PolarsResult<Series> {
    df.column(name)?.as_materialized_series().cast(dtype)
}

pub fn str_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let series = materialized(df, name, &DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

pub fn i32_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<i32>>> {
    let series = materialized(df, name, &DataType::Int32)?;
    Ok(series.i32()?.into_iter().collect())
}

pub fn f64_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let series = materialized(df, name, &DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

pub fn bool_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<bool>>> {
    let series = materialized(df, name, &DataType::Boolean)?;
    Ok(series.bool()?.into_iter().collect())
}

/// Reads a `Date` column as days since 1970-01-01.
pub fn date_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<i32>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Date)?
        .cast(&DataType::Int32)?;
    Ok(series.i32()?.into_iter().collect())
}

pub fn str_series(name: &str, values: &[Option<String>]) -> Series {
    Series::new(
        name.into(),
        values
            .iter()
            .map(|opt| opt.as_deref())
            .collect::<Vec<Option<&str>>>(),
    )
}

pub fn date_series(name: &str, days: Vec<Option<i32>>) -> PolarsResult<Series> {
    Series::new(name.into(), days).cast(&DataType::Date)
}

pub fn days_since_epoch(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    date.signed_duration_since(epoch).num_days() as i32
}

/// Keeps the rows whose mask entry is `true`, preserving order.
pub fn keep_rows(df: &DataFrame, mask: &[bool]) -> PolarsResult<DataFrame> {
    let mask = BooleanChunked::from_slice("mask".into(), mask);
    df.filter(&mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_days_round_trip_through_date_columns() -> PolarsResult<()> {
        let date = NaiveDate::from_ymd_opt(2021, 7, 15).unwrap();
        let days = days_since_epoch(date);
        assert_eq!(days, 18823);

        let df = DataFrame::new(vec![date_series("visit_date", vec![Some(days), None])?.into()])?;
        assert_eq!(date_values(&df, "visit_date")?, vec![Some(days), None]);
        Ok(())
    }

    #[test]
    fn keep_rows_preserves_order() -> PolarsResult<()> {
        let df = DataFrame::new(vec![Series::new("id".into(), vec![1i32, 2, 3, 4]).into()])?;
        let kept = keep_rows(&df, &[true, false, true, true])?;
        assert_eq!(i32_values(&kept, "id")?, vec![Some(1), Some(3), Some(4)]);
        Ok(())
    }
}
