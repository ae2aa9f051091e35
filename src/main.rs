use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use dwelling_stock::{
    config::{Args, Source},
    fetch,
    metadata::DatasetMetadata,
    output,
    process::{self, areas::ReferenceTable},
};
use reqwest::Client;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    let args = Args::parse();

    // ─── 2) load the raw table ───────────────────────────────────────
    let records = match args.source() {
        Source::Remote(url) => {
            info!(%url, "fetching dataset");
            fetch::odata::fetch_dataset(&Client::new(), &url).await?
        }
        Source::Local(path) => {
            info!(path = %path.display(), "loading dataset");
            fetch::local::load_dataset(&path)?
        }
    };

    // ─── 3) classify, resolve areas, transform ───────────────────────
    let reference = ReferenceTable::load(&args.reference)?;
    let observations = process::normalize(&records, &reference)?;

    // ─── 4) write observations, schema, metadata ─────────────────────
    let meta = DatasetMetadata::dwelling_stock(Utc::now());
    let written = output::write_outputs(&args.out_dir, &observations, &meta, args.parquet)?;

    info!(
        observations = %written.observations.display(),
        schema = %written.schema.display(),
        metadata = %written.metadata.display(),
        "all done"
    );
    Ok(())
}
