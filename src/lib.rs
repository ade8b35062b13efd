//! # newsstats - word-count statistics for news article datasets
//!
//! newsstats reads a CSV of news articles, adds a per-article `word_count`
//! column, computes descriptive statistics, renders a fixed set of charts and
//! writes a Markdown report that references them.
//!
//! ## Modules
//!
//! - [`news`] - Dataset loading, statistics, charts, report and the pipeline
//! - [`config`] - Run configuration and config file loading
//! - [`error`] - Error types and handling
//! - [`logger`] - Tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use newsstats::config::AnalysisConfig;
//! use std::path::PathBuf;
//!
//! let config = AnalysisConfig {
//!     input_path: PathBuf::from("data/articles.csv"),
//!     output_dir: PathBuf::from("output"),
//!     ..Default::default()
//! };
//! let outcome = newsstats::run(&config)?;
//! println!("{} articles, report at {}", outcome.article_count, outcome.report_path.display());
//! # Ok::<(), newsstats::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod logger;
pub mod news;

pub use error::*;
pub use news::*;
