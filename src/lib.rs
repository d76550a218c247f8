// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # restpager
//!
//! Client-side engine for paginated, rate-limited REST APIs.
//!
//! ## Features
//!
//! - **Admission Control**: a five-permit gate with per-grant cooldown keeps
//!   the request rate under a configurable ceiling
//! - **Adaptive Pagination**: the first page's headers pick single-page,
//!   next-link chaining, or parallel fetching of a known total
//! - **Streaming**: page batches as they arrive, with bounded look-ahead
//! - **Typed Errors**: non-2xx responses surface as `Error::Remote`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use restpager::{ClientConfig, Paginator, Requestor, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ClientConfig::builder()
//!         .base_url("https://gitlab.example.com/api/v4")
//!         .header("PRIVATE-TOKEN", "glpat-...")
//!         .build();
//!     let paginator = Paginator::new(Requestor::with_config(&config)?);
//!
//!     // Whole collection at once
//!     let projects: Vec<serde_json::Value> = paginator.fetch_all("projects").await?;
//!
//!     // Or one page batch at a time
//!     let mut pages = paginator.fetch_paged::<serde_json::Value>("issues", 4, 1)?;
//!     while let Some(batch) = pages.next().await {
//!         println!("{} issues", batch?.len());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       Paginator                          │
//! │   fetch_all(url) → Vec<T>   fetch_paged(url) → PageStream │
//! └──────────────────────────────────────────────────────────┘
//!                             │
//! ┌───────────────────────────┴──────────────────────────────┐
//! │                       Requestor                          │
//! │   get / post / put / delete / post_file                  │
//! ├──────────────────┬──────────────────┬────────────────────┤
//! │  AdmissionGate   │    Transport     │      Codec         │
//! │  5 permits,      │    reqwest       │      serde_json    │
//! │  timed release   │                  │                    │
//! └──────────────────┴──────────────────┴────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)] // TODO: Document error variant fields before 1.0

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Client configuration
pub mod config;

/// Rate-limited HTTP requestor
pub mod http;

/// Paginated fetch engine
pub mod pagination;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::ClientConfig;
pub use error::{Error, Result};
pub use http::{FileUpload, Requestor};
pub use pagination::{FetchStrategy, PageStream, Paginator};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
