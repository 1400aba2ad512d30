use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use frog_growth_core::{
    checkpoint::CheckpointPaths,
    db,
    frame::i32_values,
    overrides::Overrides,
    pipeline,
    schema::site,
    types::PopulationType,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Frog capture-recapture growth dataset builder", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Directory holding the checkpoints and the final dataset
    #[arg(long, global = true, default_value = "output")]
    out_dir: PathBuf,
    /// Override table to use instead of the built-in one
    #[arg(long, global = true)]
    overrides: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Query the database and write the capture and relocation checkpoints
    Extract,
    /// Build frog_growth.csv from existing checkpoints
    Build,
    /// Extract, then build
    Run,
    /// Print the site population classification computed from the checkpoints
    Sites,
    /// Load and validate the override table
    CheckOverrides,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();
    let overrides = load_overrides(cli.common.overrides.as_deref())?;
    let paths = CheckpointPaths::new(&cli.common.out_dir);

    match cli.command {
        Command::Extract => extract(&paths, &overrides).await,
        Command::Build => build(&paths, &overrides),
        Command::Run => {
            extract(&paths, &overrides).await?;
            build(&paths, &overrides)
        }
        Command::Sites => print_sites(&paths, &overrides),
        Command::CheckOverrides => {
            let summary = serde_json::to_string_pretty(&overrides.summary())?;
            println!("{summary}");
            Ok(())
        }
    }
}

fn load_overrides(path: Option<&Path>) -> Result<Overrides> {
    match path {
        Some(path) => Overrides::from_path(path)
            .with_context(|| format!("failed to load override table '{}'", path.display())),
        None => Overrides::builtin().context("built-in override table is invalid"),
    }
}

async fn extract(paths: &CheckpointPaths, overrides: &Overrides) -> Result<()> {
    let pool = connect_pool().await?;
    let result = pipeline::extract_checkpoints(&pool, paths, overrides).await;
    db::disconnect(pool).await;

    let summary = result.context("extraction failed")?;
    info!(
        capture_rows = summary.capture_rows,
        relocation_rows = summary.relocation_rows,
        excluded_relocation_rows = summary.excluded_relocation_rows,
        "Checkpoints written"
    );
    Ok(())
}

fn build(paths: &CheckpointPaths, overrides: &Overrides) -> Result<()> {
    let summary = pipeline::build_from_checkpoints(paths, overrides).with_context(|| {
        format!(
            "failed to build frog growth dataset from '{}'",
            paths.root.display()
        )
    })?;
    info!(summary = %serde_json::to_string(&summary)?, "Build summary");
    Ok(())
}

fn print_sites(paths: &CheckpointPaths, overrides: &Overrides) -> Result<()> {
    let sites = pipeline::classify_sites_from_checkpoints(paths, overrides)
        .context("failed to classify sites")?;
    let site_ids = i32_values(&sites, site::SITE_ID)?;
    let codes = i32_values(&sites, site::POPULATION_TYPE)?;

    println!("{:>8}  {:>4}  label", "site_id", "code");
    for (site_id, code) in site_ids.into_iter().zip(codes) {
        let site_id = site_id.map(|id| id.to_string()).unwrap_or_default();
        let (code, label) = match code {
            Some(code) => (
                code.to_string(),
                PopulationType::from_code(code).map_or("unknown", PopulationType::label),
            ),
            None => ("NA".to_string(), "unresolved"),
        };
        println!("{site_id:>8}  {code:>4}  {label}");
    }
    Ok(())
}

async fn connect_pool() -> Result<db::DbPool> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .or_else(|_| std::env::var("FROG_GROWTH_DATABASE_URL"))
        .context("DATABASE_URL (or FROG_GROWTH_DATABASE_URL) must be set")?;
    db::connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_options_follow_the_subcommand() {
        let cli = Cli::try_parse_from(["frog-growth", "build", "--out-dir", "/tmp/frogs"]).unwrap();
        assert!(matches!(cli.command, Command::Build));
        assert_eq!(cli.common.out_dir, PathBuf::from("/tmp/frogs"));
        assert!(cli.common.overrides.is_none());
    }

    #[test]
    fn check_overrides_is_kebab_case() {
        let cli = Cli::try_parse_from(["frog-growth", "check-overrides"]).unwrap();
        assert!(matches!(cli.command, Command::CheckOverrides));
    }
}
