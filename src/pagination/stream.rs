//! Streaming page fetches
//!
//! [`Paginator::fetch_paged`] yields one batch per page as pages arrive.
//! With a known total, up to `buffered_pages` page fetches run as spawned
//! tasks ahead of the consumer; each completed page is replaced by a fetch
//! for the next unrequested page.

use super::strategies::Paginator;
use super::types::FetchStrategy;
use crate::error::{Error, Result};
use crate::http::Codec;
use futures::stream::{self, BoxStream, Fuse, FusedStream, Stream, StreamExt};
use pin_project_lite::pin_project;
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::task::JoinHandle;
use tracing::debug;

pin_project! {
    /// Lazy, finite sequence of page batches.
    ///
    /// Nothing is requested until the first poll. The stream cannot be
    /// restarted; after the last page or the first error it yields `None`.
    #[must_use = "streams do nothing unless polled"]
    pub struct PageStream<T> {
        #[pin]
        inner: Fuse<BoxStream<'static, Result<Vec<T>>>>,
    }
}

impl<T> Stream for PageStream<T> {
    type Item = Result<Vec<T>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.project().inner.poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> FusedStream for PageStream<T> {
    fn is_terminated(&self) -> bool {
        self.inner.is_terminated()
    }
}

impl<T> std::fmt::Debug for PageStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageStream")
            .field("terminated", &self.inner.is_terminated())
            .finish()
    }
}

impl<C: Codec> Paginator<C> {
    /// Stream the collection one page batch at a time, starting at
    /// `first_page` and keeping up to `buffered_pages` fetches in flight
    /// when the total is known.
    ///
    /// Arguments are checked before anything is requested.
    pub fn fetch_paged<T>(
        &self,
        url: &str,
        buffered_pages: usize,
        first_page: u32,
    ) -> Result<PageStream<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        if buffered_pages < 1 {
            return Err(Error::invalid_argument("buffered_pages must be at least 1"));
        }
        if first_page < 1 {
            return Err(Error::invalid_argument("first_page must be at least 1"));
        }

        let cursor = PageCursor {
            paginator: self.clone(),
            url: Arc::from(url),
            buffered_pages,
            state: CursorState::Start { first_page },
        };

        let inner = stream::unfold(cursor, |mut cursor| async move {
            let batch = cursor.advance().await?;
            Some((batch, cursor))
        })
        .boxed()
        .fuse();

        Ok(PageStream { inner })
    }
}

/// Page fetch tasks in page order; dropping aborts whatever is still running.
struct InFlight<T> {
    tasks: VecDeque<JoinHandle<Result<Vec<T>>>>,
}

impl<T> InFlight<T> {
    fn new() -> Self {
        Self {
            tasks: VecDeque::new(),
        }
    }

    fn len(&self) -> usize {
        self.tasks.len()
    }

    fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<T> Drop for InFlight<T> {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

enum CursorState<T> {
    Start {
        first_page: u32,
    },
    Sequential {
        next_page: u32,
    },
    Pipelined {
        in_flight: InFlight<T>,
        // None once the page index space is exhausted
        next_page: Option<u32>,
        total_pages: u32,
    },
    Done,
}

struct PageCursor<T, C: Codec> {
    paginator: Paginator<C>,
    url: Arc<str>,
    buffered_pages: usize,
    state: CursorState<T>,
}

impl<T, C> PageCursor<T, C>
where
    T: DeserializeOwned + Send + 'static,
    C: Codec,
{
    /// Produce the next batch. The state is `Done` while a fetch is pending,
    /// so an error or a dropped stream leaves nothing to resume.
    async fn advance(&mut self) -> Option<Result<Vec<T>>> {
        match std::mem::replace(&mut self.state, CursorState::Done) {
            CursorState::Start { first_page } => Some(self.start(first_page).await),
            CursorState::Sequential { next_page } => {
                let result = self
                    .paginator
                    .fetch_page_with_metadata(&self.url, next_page)
                    .await;
                Some(result.map(|(items, metadata)| {
                    if metadata.has_next() {
                        self.state = CursorState::Sequential {
                            next_page: metadata.next_page,
                        };
                    }
                    items
                }))
            }
            CursorState::Pipelined {
                mut in_flight,
                mut next_page,
                total_pages,
            } => {
                // Await in place so a dropped stream still aborts this task.
                let joined = in_flight.tasks.front_mut()?.await;
                in_flight.tasks.pop_front();
                let items = match joined {
                    Ok(Ok(items)) => items,
                    Ok(Err(e)) => return Some(Err(e)),
                    Err(e) => return Some(Err(Error::TaskJoin(e))),
                };

                if let Some(page) = next_page.filter(|&page| page <= total_pages) {
                    in_flight.tasks.push_back(self.spawn_page(page));
                    next_page = page.checked_add(1);
                }
                if !in_flight.is_empty() {
                    self.state = CursorState::Pipelined {
                        in_flight,
                        next_page,
                        total_pages,
                    };
                }
                Some(Ok(items))
            }
            CursorState::Done => None,
        }
    }

    async fn start(&mut self, first_page: u32) -> Result<Vec<T>> {
        let (items, metadata) = self
            .paginator
            .fetch_page_with_metadata(&self.url, first_page)
            .await?;
        let strategy = FetchStrategy::decide(&metadata)?;
        debug!("Streaming {} with strategy {}", self.url, strategy);

        self.state = match strategy {
            FetchStrategy::SinglePage => CursorState::Done,
            FetchStrategy::Next if metadata.has_next() => CursorState::Sequential {
                next_page: metadata.next_page,
            },
            FetchStrategy::Next => CursorState::Done,
            FetchStrategy::Total { total_pages } => {
                let mut in_flight = InFlight::new();
                let mut next_page = first_page.checked_add(1);
                while in_flight.len() < self.buffered_pages {
                    let Some(page) = next_page.filter(|&page| page <= total_pages) else {
                        break;
                    };
                    in_flight.tasks.push_back(self.spawn_page(page));
                    next_page = page.checked_add(1);
                }
                if in_flight.is_empty() {
                    CursorState::Done
                } else {
                    CursorState::Pipelined {
                        in_flight,
                        next_page,
                        total_pages,
                    }
                }
            }
        };

        Ok(items)
    }

    fn spawn_page(&self, page: u32) -> JoinHandle<Result<Vec<T>>> {
        let paginator = self.paginator.clone();
        let url = Arc::clone(&self.url);
        tokio::spawn(async move { paginator.fetch_page(&url, page).await })
    }
}
