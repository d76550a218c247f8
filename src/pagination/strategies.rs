//! Fetch-all strategy implementations
//!
//! The first page is always fetched alone; its headers pick one of:
//! - `SinglePage`: done after the first page
//! - `Next`: follow `X-Next-Page` one request at a time
//! - `Total`: fetch the remaining pages in parallel windows

use super::types::{page_url, FetchStrategy, PageMetadata};
use crate::error::Result;
use crate::http::{Codec, JsonCodec, Requestor};
use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use std::num::NonZeroUsize;
use tracing::debug;

/// Fetches every page of a collection resource
#[derive(Clone)]
pub struct Paginator<C: Codec = JsonCodec> {
    pub(super) requestor: Requestor<C>,
    parallelism: usize,
}

impl<C: Codec> Paginator<C> {
    /// Create a paginator over a requestor; window size defaults to the
    /// machine's available parallelism.
    pub fn new(requestor: Requestor<C>) -> Self {
        Self {
            requestor,
            parallelism: default_parallelism(),
        }
    }

    /// Override the window size of the parallel `Total` algorithm
    #[must_use]
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    /// Window size of the parallel `Total` algorithm
    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// The underlying requestor
    pub fn requestor(&self) -> &Requestor<C> {
        &self.requestor
    }

    /// Fetch page 1 and decide how to fetch the rest
    pub async fn first_page<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<(Vec<T>, PageMetadata, FetchStrategy)> {
        let (items, metadata) = self.fetch_page_with_metadata(url, 1).await?;
        let strategy = FetchStrategy::decide(&metadata)?;
        debug!(
            "Strategy for {}: {} (total pages {}, next page {})",
            url, strategy, metadata.total_pages, metadata.next_page
        );
        Ok((items, metadata, strategy))
    }

    /// Fetch every page and concatenate them in page order.
    ///
    /// Any failing page fails the whole call; nothing partial is returned.
    pub async fn fetch_all<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>> {
        let (mut items, metadata, strategy) = self.first_page(url).await?;

        match strategy {
            FetchStrategy::SinglePage => {}
            FetchStrategy::Next => {
                self.fetch_following(url, metadata.next_page, &mut items)
                    .await?;
            }
            FetchStrategy::Total { total_pages } => {
                self.fetch_windows(url, total_pages, &mut items).await?;
            }
        }

        debug!("Fetched {} items from {}", items.len(), url);
        Ok(items)
    }

    /// Walk the next-page chain starting at `next_page`
    async fn fetch_following<T: DeserializeOwned>(
        &self,
        url: &str,
        mut next_page: u32,
        items: &mut Vec<T>,
    ) -> Result<()> {
        while next_page > 1 {
            let (page, metadata) = self.fetch_page_with_metadata(url, next_page).await?;
            items.extend(page);
            next_page = metadata.next_page;
        }
        Ok(())
    }

    /// Fetch pages `2..=total_pages`, one window of concurrent requests at
    /// a time
    async fn fetch_windows<T: DeserializeOwned>(
        &self,
        url: &str,
        total_pages: u32,
        items: &mut Vec<T>,
    ) -> Result<()> {
        let pages: Vec<u32> = (2..=total_pages).collect();

        for window in pages.chunks(self.parallelism) {
            debug!(
                "Fetching pages {}..={} of {}",
                window[0],
                window[window.len() - 1],
                url
            );
            let batches = try_join_all(window.iter().map(|&page| self.fetch_page::<T>(url, page)))
                .await?;
            for batch in batches {
                items.extend(batch);
            }
        }
        Ok(())
    }

    pub(super) async fn fetch_page<T: DeserializeOwned>(&self, url: &str, page: u32) -> Result<Vec<T>> {
        self.requestor.get(&page_url(url, page)).await
    }

    pub(super) async fn fetch_page_with_metadata<T: DeserializeOwned>(
        &self,
        url: &str,
        page: u32,
    ) -> Result<(Vec<T>, PageMetadata)> {
        let (items, headers) = self.requestor.get_with_headers(&page_url(url, page)).await?;
        let metadata = PageMetadata::from_headers(&headers)?;
        Ok((items, metadata))
    }
}

impl<C: Codec> std::fmt::Debug for Paginator<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("requestor", &self.requestor)
            .field("parallelism", &self.parallelism)
            .finish()
    }
}

fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}
