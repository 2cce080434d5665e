use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use clickstream_core::config::PartialJobConfig;
use clickstream_core::job::EtlJob;
use clickstream_core::tables::{all_gold_tables, SILVER_EVENTS_TABLE};
use comfy_table::Table;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Clickstream silver/gold batch ETL", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process newly arrived events into the silver and gold layers
    Run(RunArgs),
    /// List the tables a run writes and how they are partitioned
    Tables,
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// TOML file with job settings; flags and environment variables take precedence
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, env = "CLICKSTREAM_JOB_NAME")]
    job_name: Option<String>,
    /// Catalog directory containing the source table
    #[arg(long, env = "CLICKSTREAM_SOURCE_DATABASE")]
    source_database: Option<String>,
    #[arg(long, env = "CLICKSTREAM_SOURCE_TABLE")]
    source_table: Option<String>,
    #[arg(long, env = "CLICKSTREAM_SILVER_PATH")]
    silver_path: Option<String>,
    #[arg(long, env = "CLICKSTREAM_GOLD_PATH")]
    gold_path: Option<String>,
    /// Where processed-file state is kept (default: <silver-path>/_bookmarks/<job-name>.json)
    #[arg(long, env = "CLICKSTREAM_BOOKMARK_PATH")]
    bookmark_path: Option<String>,
}

impl RunArgs {
    fn overrides(&self) -> PartialJobConfig {
        PartialJobConfig {
            job_name: self.job_name.clone(),
            source_database: self.source_database.clone(),
            source_table: self.source_table.clone(),
            silver_path: self.silver_path.clone(),
            gold_path: self.gold_path.clone(),
            bookmark_path: self.bookmark_path.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => handle_run(args).await,
        Command::Tables => {
            print_tables();
            Ok(())
        }
    }
}

async fn handle_run(args: RunArgs) -> Result<()> {
    let base = match &args.config {
        Some(path) => PartialJobConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PartialJobConfig::default(),
    };
    let config = base
        .merge(args.overrides())
        .build()
        .context("incomplete job configuration")?;

    let mut job = EtlJob::local(config);
    let summary = job.run().await.context("ETL run failed")?;

    info!(job = %summary.job_name, "run summary emitted");
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn print_tables() {
    let mut table = Table::new();
    table.set_header(vec!["Table", "Layer", "Location", "Partition keys", "Description"]);

    let silver = &SILVER_EVENTS_TABLE;
    table.add_row(vec![
        silver.name.to_string(),
        silver.layer.as_str().to_string(),
        silver.destination("<silver_path>"),
        silver.partition_keys.join(", "),
        silver.description.to_string(),
    ]);

    for gold in all_gold_tables() {
        let keys = if gold.partition_keys.is_empty() {
            "(unpartitioned)".to_string()
        } else {
            gold.partition_keys.join(", ")
        };
        table.add_row(vec![
            gold.name.to_string(),
            gold.layer.as_str().to_string(),
            gold.destination("<gold_path>"),
            keys,
            gold.description.to_string(),
        ]);
    }

    println!("{table}");
}
