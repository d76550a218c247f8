//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Fetch paginated REST collections under a request-rate ceiling
#[derive(Parser, Debug)]
#[command(name = "restpager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL that relative resource paths are joined onto
    #[arg(short, long, global = true)]
    pub base_url: Option<String>,

    /// Maximum requests per second
    #[arg(short, long, global = true)]
    pub rate: Option<u32>,

    /// Extra request header as KEY:VALUE (repeatable)
    #[arg(short = 'H', long = "header", global = true, value_parser = parse_header_arg)]
    pub headers: Vec<(String, String)>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Issue a single GET and print the body
    Get {
        /// Resource URL or path
        url: String,
    },

    /// Fetch every page of a collection and print one item per line
    FetchAll {
        /// Collection URL or path
        url: String,

        /// Concurrent requests per window when the total is known
        #[arg(long)]
        parallelism: Option<usize>,
    },

    /// Stream a collection page by page, printing items as pages arrive
    Stream {
        /// Collection URL or path
        url: String,

        /// Pages fetched ahead of consumption
        #[arg(long)]
        buffered_pages: Option<usize>,

        /// Page to start from
        #[arg(long, default_value = "1")]
        first_page: u32,
    },

    /// Show the pagination strategy a collection would be fetched with
    Strategy {
        /// Collection URL or path
        url: String,
    },
}

/// Parse a `KEY:VALUE` header argument
pub fn parse_header_arg(arg: &str) -> Result<(String, String), String> {
    let (key, value) = arg
        .split_once(':')
        .ok_or_else(|| format!("invalid header '{arg}', expected KEY:VALUE"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid header '{arg}', empty name"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
