use std::env;

use anyhow::Result;
use frog_growth_core::{
    checkpoint::{self, CheckpointPaths},
    db,
    frame::str_values,
    overrides::Overrides,
    pipeline::extract_checkpoints,
    schema::{capture, relocation},
};

#[tokio::test]
async fn extraction_writes_both_checkpoints_when_database_available() -> Result<()> {
    let database_url = match env::var("FROG_GROWTH_TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping extraction test because FROG_GROWTH_TEST_DATABASE_URL is not set"
            );
            return Ok(());
        }
    };

    let overrides = Overrides::builtin()?;
    let pool = db::connect(&database_url).await?;
    let dir = tempfile::tempdir()?;
    let paths = CheckpointPaths::new(dir.path());

    let summary = extract_checkpoints(&pool, &paths, &overrides).await?;
    db::disconnect(pool).await;

    let captures = checkpoint::read_captures(&paths.captures())?;
    assert_eq!(captures.height(), summary.capture_rows);
    assert!(str_values(&captures, capture::CAPTURE_ANIMAL_STATE)?
        .iter()
        .all(|state| state.as_deref() != Some("dead")));

    let relocations = checkpoint::read_relocations(&paths.relocations())?;
    let collect = str_values(&relocations, relocation::COLLECT_SITEID)?;
    let tags = str_values(&relocations, relocation::PIT_TAG_REF)?;
    for (site, tag) in collect.iter().zip(tags.iter()) {
        if let (Some(site), Some(tag)) = (site, tag) {
            assert!(!overrides.is_excluded_relocation(site, tag));
        }
    }
    Ok(())
}
