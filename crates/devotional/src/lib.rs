pub mod archive;
pub mod config;
pub mod fetcher;
mod parser;
pub mod pipeline;
pub mod types;
pub mod validate;

pub use archive::{ArchiveEntry, ArchiveStore, MergeOutcome, PersistenceError};
pub use config::Config;
pub use fetcher::{Fetch, FetchError, HttpFetcher, RetryPolicy};
pub use parser::{ParseError, parse_devotional, parse_devotional_at};
pub use pipeline::{PipelineError, run, run_with};
pub use types::Devotional;
pub use validate::{ValidationError, validate};

pub(crate) const BASE_URL: &str = "https://joncourson.com/";
pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const DEFAULT_TITLE: &str = "Daily Devotional with Pastor Jon";
pub const DEFAULT_AUTHOR: &str = "Jon Courson";
