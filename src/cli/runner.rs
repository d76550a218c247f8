//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::ClientConfig;
use crate::error::{Result, ResultExt};
use crate::http::Requestor;
use crate::pagination::Paginator;
use futures::StreamExt;
use serde::Serialize;
use serde_json::{json, Value};
use std::io::Write;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command, printing to stdout
    pub async fn run(&self) -> Result<()> {
        self.run_with_output(&mut std::io::stdout()).await
    }

    /// Run the CLI command, printing to `out`
    pub async fn run_with_output<W: Write>(&self, out: &mut W) -> Result<()> {
        let config = self.client_config()?;
        let requestor = Requestor::with_config(&config)?;

        match &self.cli.command {
            Commands::Get { url } => {
                let body: Value = requestor.get(url).await?;
                serde_json::to_writer_pretty(&mut *out, &body)?;
                writeln!(out)?;
            }
            Commands::FetchAll { url, parallelism } => {
                let mut paginator = Paginator::new(requestor);
                if let Some(parallelism) = parallelism {
                    paginator = paginator.with_parallelism(*parallelism);
                }
                let items: Vec<Value> = paginator.fetch_all(url).await?;
                write_items(out, &items)?;
                info!("Fetched {} items from {}", items.len(), url);
            }
            Commands::Stream {
                url,
                buffered_pages,
                first_page,
            } => {
                let buffered = buffered_pages.unwrap_or(config.buffered_pages);
                let mut pages =
                    Paginator::new(requestor).fetch_paged::<Value>(url, buffered, *first_page)?;

                // Under next-page chaining batch numbers differ from page indexes.
                let mut batch_number = 1;
                let mut total = 0;
                while let Some(batch) = pages.next().await {
                    let batch =
                        batch.with_context(|| format!("Failed at batch {batch_number}"))?;
                    debug!("Batch {}: {} items", batch_number, batch.len());
                    write_items(out, &batch)?;
                    total += batch.len();
                    batch_number += 1;
                }
                info!("Streamed {} items from {}", total, url);
            }
            Commands::Strategy { url } => {
                let (items, metadata, strategy) =
                    Paginator::new(requestor).first_page::<Value>(url).await?;
                let report = json!({
                    "strategy": strategy.to_string(),
                    "total_pages": metadata.total_pages,
                    "next_page": metadata.next_page,
                    "total_items": metadata.total_items,
                    "first_page_items": items.len(),
                });
                serde_json::to_writer_pretty(&mut *out, &report)?;
                writeln!(out)?;
            }
        }

        Ok(())
    }

    /// Resolve configuration: file (or defaults), then command-line overrides
    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.cli.config {
            Some(path) => ClientConfig::from_file(path)
                .with_context(|| format!("Loading {}", path.display()))?,
            None => ClientConfig::default(),
        };

        if let Some(base_url) = &self.cli.base_url {
            config.base_url = Some(base_url.clone());
        }
        if let Some(rate) = self.cli.rate {
            config.max_requests_per_second = rate;
        }
        for (key, value) in &self.cli.headers {
            config.default_headers.insert(key.clone(), value.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

/// Write one JSON document per line
fn write_items<W: Write, T: Serialize>(out: &mut W, items: &[T]) -> Result<()> {
    for item in items {
        serde_json::to_writer(&mut *out, item)?;
        writeln!(out)?;
    }
    Ok(())
}
