//! Pagination module
//!
//! Supports: single page, next-page chaining, known-total parallel fetch
//!
//! # Overview
//!
//! The first page's `X-Total-Pages` and `X-Next-Page` headers decide how the
//! rest of a collection is fetched. `fetch_all` materializes the whole
//! collection; `fetch_paged` streams it one page batch at a time with a
//! bounded look-ahead.

mod stream;
mod strategies;
mod types;

pub use stream::PageStream;
pub use strategies::Paginator;
pub use types::{
    page_url, parse_header, FetchStrategy, PageMetadata, NEXT_PAGE_HEADER, PAGE_HEADER,
    PAGE_SIZE, PER_PAGE_HEADER, TOTAL_HEADER, TOTAL_PAGES_HEADER,
};

#[cfg(test)]
mod tests;
