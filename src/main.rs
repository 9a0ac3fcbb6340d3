use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::{error, info};
use zenodo2commons::{
    budget::Budgeter,
    config::Config,
    record::{self, RawRecord},
    upload_urls,
};

/// Builds pre-filled Wikimedia Commons upload links for the files of a Zenodo record.
#[derive(Parser)]
struct Opts {
    /// Record id, record URL or DOI.
    record: String,
    #[clap(short, long, env = "ZENODO2COMMONS_CONFIG")]
    config: Option<PathBuf>,
    /// Read the record JSON from a file instead of fetching it.
    #[clap(long)]
    record_json: Option<PathBuf>,
    /// Only emit the file with this name.
    #[clap(short, long)]
    file: Option<String>,
    #[clap(long)]
    json: bool,
}

async fn run(opts: Opts) -> anyhow::Result<()> {
    let config = match &opts.config {
        Some(path) => Config::load(path).await?,
        None => Config::default(),
    };
    let id = record::parse_record_id(&opts.record)?;

    let api = match &opts.record_json {
        Some(path) => {
            let src = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("read record from {}", path.display()))?;
            record::parse_record(&src)
                .with_context(|| format!("parse record from {}", path.display()))?
        }
        None => record::Client::new()
            .fetch(&config, &id)
            .await
            .with_context(|| format!("fetch record {id}"))?,
    };
    let record = RawRecord::from_api(api, &config);
    info!(id = record.id, title = record.title, files = record.files.len(), "loaded record");

    let mut uploads = upload_urls(&record, &Budgeter::from_config(&config));
    if let Some(name) = &opts.file {
        uploads.retain(|upload| &upload.file.name == name);
        if uploads.is_empty() {
            bail!("record {} has no file named {name:?}", record.id);
        }
    }

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&uploads)?);
        return Ok(());
    }
    for upload in &uploads {
        println!("{} ({})", upload.file.name, upload.file.human_size());
        match &upload.upload {
            Some(result) => {
                if result.was_truncated {
                    println!("  description truncated to fit the URL length limit");
                }
                println!("  {}", result.url);
            }
            None => println!(
                "  not uploadable: {}",
                upload.error.as_deref().unwrap_or("no upload URL")
            ),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let opts = Opts::parse();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    if let Err(e) = run(opts).await {
        error!(?e, "critical error");
        std::process::exit(1);
    }
}
