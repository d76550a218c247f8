//! CLI module
//!
//! Command-line interface over the paginated fetch engine.
//!
//! # Commands
//!
//! - `get` - Single GET, body printed as JSON
//! - `fetch-all` - Whole collection, one item per line
//! - `stream` - Collection page by page with look-ahead
//! - `strategy` - Which pagination strategy a collection gets

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
