//! The per-seed processing contract.

use crate::error::CrawlError;
use crate::seed::Seed;
use crate::session::Session;

/// What one processed seed produced.
#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// Follow-up seeds discovered while processing.
    pub new_seeds: Vec<String>,
    /// Extracted items, serialized as JSON strings, for the pipelines.
    pub items: Vec<String>,
    /// Re-enqueue this seed (bypassing dedup) for another attempt.
    pub retry: bool,
    /// Whether the session is still good for further use. `false` discards
    /// it from the pool and triggers replacement through the factory.
    pub session_ok: bool,
}

impl Default for CrawlResult {
    fn default() -> Self {
        Self {
            new_seeds: Vec::new(),
            items: Vec::new(),
            retry: false,
            session_ok: true,
        }
    }
}

/// Fetches and extracts one seed using a checked-out session.
pub trait Processor: Send + Sync {
    fn process(&self, seed: &Seed, session: &Session) -> Result<CrawlResult, CrawlError>;
}
