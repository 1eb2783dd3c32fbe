//! Output module for generating run reports
//!
//! This module handles:
//! - The `CrawlReport` built up by every driver
//! - Printing run statistics to the console
//! - Writing markdown reports

mod markdown;
mod report;
pub mod stats;

pub use markdown::{format_markdown_report, generate_markdown_report};
pub use report::{CrawlReport, RunMode, VisitRecord};
pub use stats::{format_statistics, print_statistics};

use thiserror::Error;

/// Errors that can occur while writing reports
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
