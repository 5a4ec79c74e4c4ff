//! Output pipelines that persist extracted items.

use crate::seed::Seed;
use log::info;

/// Receives every non-empty batch of items a processed seed produced.
/// Implementations must tolerate concurrent calls from multiple workers.
pub trait Pipeline: Send + Sync {
    fn save_items(&self, items: &[String], seed: &Seed);
}

/// Logs items instead of persisting them. Installed by default when no
/// other pipeline is configured.
#[derive(Debug, Default)]
pub struct ConsolePipeline;

impl Pipeline for ConsolePipeline {
    fn save_items(&self, items: &[String], seed: &Seed) {
        for item in items {
            info!("[PIPELINE] {} -> {}", seed.data, item);
        }
    }
}
