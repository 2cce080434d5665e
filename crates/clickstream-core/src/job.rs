use std::collections::BTreeMap;

use clickstream_source::{BookmarkStore, EventSource, LocalEventSource, RawEvent};
use futures::future::try_join_all;
use serde::Serialize;
use tracing::info;

use crate::aggregates::{aggregate_all, GoldTables};
use crate::config::JobConfig;
use crate::enricher::{enrich_events, EnrichReport};
use crate::error::Result;
use crate::events::EnrichedEvent;
use crate::frames::FrameRow;
use crate::quality_filter::{apply_quality_filter, FilterReport};
use crate::sink::{ParquetSink, TableSink, TableWrite};
use crate::tables::{
    TableDescriptor, CATEGORY_DAILY_PERFORMANCE_TABLE, DAILY_USER_ACTIVITY_TABLE,
    HOURLY_REVENUE_TABLE, PRODUCT_FUNNEL_TABLE, PRODUCT_POPULARITY_TABLE, SILVER_EVENTS_TABLE,
};

/// Everything one batch produces, before anything is written.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub silver: Vec<EnrichedEvent>,
    pub gold: GoldTables,
    pub filter: FilterReport,
    pub enrichment: EnrichReport,
}

/// Filter, enrich and aggregate a batch. An empty batch yields `None`: there is nothing to write.
pub fn process_batch(events: Vec<RawEvent>) -> Option<BatchOutput> {
    if events.is_empty() {
        return None;
    }

    let filtered = apply_quality_filter(events);
    let enriched = enrich_events(filtered.events);
    let gold = aggregate_all(&enriched.events);

    Some(BatchOutput {
        silver: enriched.events,
        gold,
        filter: filtered.report,
        enrichment: enriched.report,
    })
}

/// Builds the five gold writes for `config`, in registry order.
pub fn gold_writes(gold: &GoldTables, config: &JobConfig) -> Result<Vec<TableWrite>> {
    let root = config.gold_path.as_str();
    Ok(vec![
        gold_write(&PRODUCT_FUNNEL_TABLE, root, &gold.product_funnel)?,
        gold_write(&HOURLY_REVENUE_TABLE, root, &gold.hourly_revenue)?,
        gold_write(&PRODUCT_POPULARITY_TABLE, root, &gold.product_popularity)?,
        gold_write(
            &CATEGORY_DAILY_PERFORMANCE_TABLE,
            root,
            &gold.category_daily_performance,
        )?,
        gold_write(&DAILY_USER_ACTIVITY_TABLE, root, &gold.daily_user_activity)?,
    ])
}

fn gold_write<R: FrameRow>(
    descriptor: &TableDescriptor,
    root: &str,
    rows: &[R],
) -> Result<TableWrite> {
    Ok(TableWrite::from_rows(
        descriptor,
        descriptor.destination(root),
        rows,
    )?)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub job_name: String,
    pub source_rows: usize,
    pub files_committed: usize,
    pub filter: Option<FilterReport>,
    pub enrichment: Option<EnrichReport>,
    pub silver_rows: usize,
    pub gold_rows: BTreeMap<String, usize>,
}

/// One run of the batch job: read what is new, write silver and gold, then commit the bookmark.
pub struct EtlJob<S, K> {
    config: JobConfig,
    source: S,
    sink: K,
}

impl EtlJob<LocalEventSource, ParquetSink> {
    /// Local filesystem source with a bookmark, parquet output.
    pub fn local(config: JobConfig) -> Self {
        let bookmarks = BookmarkStore::new(config.bookmark_path());
        let source =
            LocalEventSource::new(&config.source_database, &config.source_table, bookmarks);
        Self::new(config, source, ParquetSink::new())
    }
}

impl<S: EventSource, K: TableSink> EtlJob<S, K> {
    pub fn new(config: JobConfig, source: S, sink: K) -> Self {
        Self {
            config,
            source,
            sink,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub async fn run(&mut self) -> Result<RunSummary> {
        info!(
            job = %self.config.job_name,
            source = %self.source.describe(),
            silver = %self.config.silver_path,
            gold = %self.config.gold_path,
            "Starting ETL job"
        );

        let batch = self.source.read_batch()?;
        let mut summary = RunSummary {
            job_name: self.config.job_name.clone(),
            source_rows: batch.len(),
            files_committed: batch.files.len(),
            ..RunSummary::default()
        };
        info!(rows = batch.len(), "Records read from source");

        let files = batch.files;
        let Some(output) = process_batch(batch.events) else {
            info!("No new records to process");
            self.source.commit(&files)?;
            return Ok(summary);
        };
        summary.filter = Some(output.filter);
        summary.enrichment = Some(output.enrichment);

        let silver_write = TableWrite::from_rows(
            &SILVER_EVENTS_TABLE,
            SILVER_EVENTS_TABLE.destination(&self.config.silver_path),
            &output.silver,
        )?;
        let receipt = self.sink.write_table(silver_write).await?;
        summary.silver_rows = receipt.rows;
        info!(rows = receipt.rows, files = receipt.files.len(), "Silver layer write complete");

        let writes = gold_writes(&output.gold, &self.config)?;
        let sink = &self.sink;
        let receipts = try_join_all(writes.into_iter().map(|write| sink.write_table(write))).await?;
        for receipt in receipts {
            info!(table = receipt.table, rows = receipt.rows, "Gold table written");
            summary.gold_rows.insert(receipt.table.to_string(), receipt.rows);
        }

        self.source.commit(&files)?;
        info!(
            job = %self.config.job_name,
            silver_rows = summary.silver_rows,
            "ETL job completed successfully"
        );
        Ok(summary)
    }
}
