use std::path::PathBuf;
use std::time::Duration;

use crate::fetcher::RetryPolicy;

/// Everything a run needs to know, passed explicitly into [`crate::run`].
#[derive(Debug, Clone)]
pub struct Config {
    pub url: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    /// Directory holding `devotionals.json` and `latest.json`.
    pub data_dir: PathBuf,
    /// Maximum number of archived devotionals kept.
    pub capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: crate::BASE_URL.to_string(),
            user_agent: crate::USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            data_dir: PathBuf::from("data"),
            capacity: 365,
        }
    }
}
