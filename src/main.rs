use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use goes_cdn::{Archive, Catalog, Config, NesdisCdn};
use tracing_subscriber::EnvFilter;

/// Download GOES ABI CONUS snapshots from the NESDIS STAR CDN.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Path to the TOML configuration document.
    config: PathBuf,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = Config::read(&cli.config)
        .with_context(|| format!("Error loading configuration {:?}", cli.config))?;

    let remote = NesdisCdn::connect(config.timeout(), config.proxy())
        .context("Error building HTTP client")?;

    let archive = Archive::connect(config.save_dir(), remote)
        .with_catalog(Catalog::new(config.cdn_root()))
        .with_workers(config.workers());

    let result = archive.run(
        config.products(),
        config.time_range()?,
        config.satellite(),
    )?;

    println!(
        "Downloaded {} images to {:?} ({} already present)",
        result.downloaded.len(),
        archive.root(),
        result.skipped
    );

    Ok(())
}
