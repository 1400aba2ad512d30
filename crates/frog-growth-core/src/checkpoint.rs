//! CSV checkpoints: the extracted tables and the final dataset on disk.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use polars::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::schema::{self, CAPTURE_CHECKPOINT, FROG_GROWTH_OUTPUT, RELOCATION_CHECKPOINT};

/// Location of the pipeline's files within one output directory.
#[derive(Debug, Clone)]
pub struct CheckpointPaths {
    pub root: PathBuf,
}

impl CheckpointPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn captures(&self) -> PathBuf {
        self.root.join(CAPTURE_CHECKPOINT)
    }

    pub fn relocations(&self) -> PathBuf {
        self.root.join(RELOCATION_CHECKPOINT)
    }

    pub fn frog_growth(&self) -> PathBuf {
        self.root.join(FROG_GROWTH_OUTPUT)
    }
}

/// A file written by the pipeline together with its content digest.
#[derive(Debug, Clone, Serialize)]
pub struct WrittenFile {
    pub path: String,
    pub rows: usize,
    pub blake3: String,
}

/// Writes `df` as a header-first CSV, replacing any existing file.
///
/// The frame is written to a sibling temporary file and renamed into place so
/// a failed write never leaves a truncated checkpoint behind.
pub fn write_csv(df: &DataFrame, path: &Path) -> Result<WrittenFile> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = path.with_extension("csv.partial");
    {
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        let mut frame = df.clone();
        CsvWriter::new(&mut writer)
            .include_header(true)
            .finish(&mut frame)?;
        writer.flush()?;
    }
    fs::rename(&tmp_path, path)?;

    let bytes = fs::read(path)?;
    let digest = blake3::hash(&bytes).to_hex().to_string();
    info!(path = %path.display(), rows = df.height(), blake3 = %digest, "Wrote CSV");

    Ok(WrittenFile {
        path: path.display().to_string(),
        rows: df.height(),
        blake3: digest,
    })
}

fn read_csv(path: &Path, schema: Schema) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_schema(Some(Arc::new(schema)))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    info!(path = %path.display(), rows = df.height(), "Read CSV checkpoint");
    Ok(df)
}

pub fn read_captures(path: &Path) -> Result<DataFrame> {
    read_csv(path, schema::capture_schema())
}

pub fn read_relocations(path: &Path) -> Result<DataFrame> {
    read_csv(path, schema::relocation_schema())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::extract::relocations_to_frame;
    use crate::frame::{date_values, str_values};
    use crate::schema::relocation;
    use crate::types::RelocationRow;

    #[test]
    fn relocation_checkpoint_reads_back_with_nulls() {
        let rows = vec![
            RelocationRow {
                collect_siteid: Some("70550,70556".into()),
                release_siteid1: Some(70279),
                release_siteid2: None,
                release_date: NaiveDate::from_ymd_opt(2013, 7, 25),
                relocation_type: Some("translocation".into()),
                pit_tag_ref: Some("900043000200002".into()),
            },
            RelocationRow {
                collect_siteid: Some("10100".into()),
                release_siteid1: Some(10101),
                release_siteid2: Some(10102),
                release_date: None,
                relocation_type: None,
                pit_tag_ref: None,
            },
        ];
        let df = relocations_to_frame(&rows).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let paths = CheckpointPaths::new(dir.path());
        let written = write_csv(&df, &paths.relocations()).unwrap();
        assert_eq!(written.rows, 2);
        assert_eq!(written.blake3.len(), 64);

        let read = read_relocations(&paths.relocations()).unwrap();
        assert_eq!(read.height(), 2);
        assert_eq!(
            str_values(&read, relocation::COLLECT_SITEID).unwrap(),
            vec![Some("70550,70556".to_string()), Some("10100".to_string())]
        );
        assert_eq!(str_values(&read, relocation::TYPE).unwrap()[1], None);
        assert_eq!(
            date_values(&read, relocation::RELEASE_DATE).unwrap(),
            date_values(&df, relocation::RELEASE_DATE).unwrap()
        );
    }
}
