//! Pagination types
//!
//! Page metadata read from response headers and the strategy decision
//! derived from it.

use crate::error::{Error, Result};
use reqwest::header::HeaderMap;
use std::fmt;
use std::str::FromStr;

/// Largest page size the remote service accepts
pub const PAGE_SIZE: u32 = 100;

/// Header carrying the total page count
pub const TOTAL_PAGES_HEADER: &str = "x-total-pages";

/// Header carrying the next page index
pub const NEXT_PAGE_HEADER: &str = "x-next-page";

/// Header carrying the total item count
pub const TOTAL_HEADER: &str = "x-total";

/// Header carrying the current page index
pub const PAGE_HEADER: &str = "x-page";

/// Header carrying the page size the server applied
pub const PER_PAGE_HEADER: &str = "x-per-page";

/// Read a numeric header.
///
/// A missing or empty header reads as the type's default (zero), so an
/// absent header and an explicit `0` are indistinguishable. A value that
/// does not parse is an error.
pub fn parse_header<N>(headers: &HeaderMap, name: &str) -> Result<N>
where
    N: FromStr + Default,
{
    let Some(value) = headers.get(name) else {
        return Ok(N::default());
    };

    let invalid = || Error::InvalidHeader {
        name: name.to_string(),
        value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
    };

    let text = value.to_str().map_err(|_| invalid())?.trim();
    if text.is_empty() {
        return Ok(N::default());
    }
    text.parse().map_err(|_| invalid())
}

/// Append the page query to a resource URL
pub fn page_url(url: &str, page: u32) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}per_page={PAGE_SIZE}&page={page}")
}

/// Pagination metadata of a single response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageMetadata {
    /// Total number of pages, 0 when the server omits it
    pub total_pages: u32,
    /// Index of the next page, 0 when there is none
    pub next_page: u32,
    /// Total number of items, 0 when the server omits it
    pub total_items: u64,
    /// Index of this page
    pub page: u32,
    /// Page size the server applied
    pub per_page: u32,
}

impl PageMetadata {
    /// Read metadata from response headers
    pub fn from_headers(headers: &HeaderMap) -> Result<Self> {
        Ok(Self {
            total_pages: parse_header(headers, TOTAL_PAGES_HEADER)?,
            next_page: parse_header(headers, NEXT_PAGE_HEADER)?,
            total_items: parse_header(headers, TOTAL_HEADER)?,
            page: parse_header(headers, PAGE_HEADER)?,
            per_page: parse_header(headers, PER_PAGE_HEADER)?,
        })
    }

    /// Whether the server points at a following page
    pub fn has_next(&self) -> bool {
        self.next_page > 1
    }
}

/// How the remaining pages of a collection are fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    /// The first page is the whole collection
    SinglePage,
    /// Total unknown; follow the next-page header one page at a time
    Next,
    /// Total known; remaining pages can be fetched in parallel
    Total {
        /// Number of pages in the collection
        total_pages: u32,
    },
}

impl FetchStrategy {
    /// Decide the strategy from the first page's metadata
    pub fn decide(metadata: &PageMetadata) -> Result<Self> {
        match (metadata.total_pages, metadata.next_page) {
            (0, next) if next <= 1 => Ok(Self::SinglePage),
            // Large collections omit the total; only the next link is known.
            (0, _) => Ok(Self::Next),
            (1, _) => Ok(Self::SinglePage),
            (total_pages, _) if total_pages > 1 => Ok(Self::Total { total_pages }),
            (total_pages, next_page) => Err(Error::UnknownStrategy {
                total_pages,
                next_page,
            }),
        }
    }
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SinglePage => f.write_str("single-page"),
            Self::Next => f.write_str("next"),
            Self::Total { total_pages } => write!(f, "total ({total_pages} pages)"),
        }
    }
}
