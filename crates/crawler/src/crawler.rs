//! The crawl loop: seed dispatch, slow start, and lifecycle management.

use crate::error::CrawlError;
use crate::pipeline::{ConsolePipeline, Pipeline};
use crate::processor::Processor;
use crate::seed::{Seed, SeedManager};
use crate::session::{BlankSessionFactory, SessionFactory, SessionPool};
use crate::worker::{WorkerContext, spawn_workers};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

pub(crate) const STATE_INIT: usize = 0;
pub(crate) const STATE_RUNNING: usize = 1;
pub(crate) const STATE_STOPPED: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Worker thread count. `0` falls back to the default of 10.
    pub threads: usize,
    /// Ramp dispatch up gradually instead of saturating all workers at
    /// startup, when nothing is blocked yet and resource demand would spike.
    pub slow_start: bool,
    /// Length of the ramp-up period.
    pub slow_start_duration: Duration,
    /// Stop once the queue is drained and no worker is busy.
    pub exit_when_complete: bool,
    /// How long a worker sleeps between session checkout attempts.
    pub session_retry_interval: Duration,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            threads: 10,
            slow_start: true,
            slow_start_duration: Duration::from_secs(300),
            exit_when_complete: true,
            session_retry_interval: Duration::from_millis(500),
        }
    }
}

pub struct CrawlerBuilder {
    config: CrawlerConfig,
    seeds: Vec<Seed>,
    processor: Option<Arc<dyn Processor>>,
    pipelines: Vec<Box<dyn Pipeline>>,
    factory: Option<Box<dyn SessionFactory>>,
}

impl CrawlerBuilder {
    fn new() -> Self {
        Self {
            config: CrawlerConfig::default(),
            seeds: Vec::new(),
            processor: None,
            pipelines: Vec::new(),
            factory: None,
        }
    }

    pub fn config(mut self, config: CrawlerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn threads(mut self, threads: usize) -> Self {
        self.config.threads = threads;
        self
    }

    pub fn slow_start(mut self, enabled: bool) -> Self {
        self.config.slow_start = enabled;
        self
    }

    pub fn slow_start_duration(mut self, duration: Duration) -> Self {
        self.config.slow_start_duration = duration;
        self
    }

    pub fn exit_when_complete(mut self, enabled: bool) -> Self {
        self.config.exit_when_complete = enabled;
        self
    }

    pub fn session_retry_interval(mut self, interval: Duration) -> Self {
        self.config.session_retry_interval = interval;
        self
    }

    pub fn seed(mut self, data: impl Into<String>) -> Self {
        self.seeds.push(Seed::new(data));
        self
    }

    pub fn processor(mut self, processor: impl Processor + 'static) -> Self {
        self.processor = Some(Arc::new(processor));
        self
    }

    pub fn pipeline(mut self, pipeline: impl Pipeline + 'static) -> Self {
        self.pipelines.push(Box::new(pipeline));
        self
    }

    pub fn session_factory(mut self, factory: impl SessionFactory + 'static) -> Self {
        self.factory = Some(Box::new(factory));
        self
    }

    pub fn build(self) -> Result<Crawler, CrawlError> {
        let processor = self
            .processor
            .ok_or_else(|| CrawlError::Configuration("a processor is required".into()))?;

        let mut config = self.config;
        if config.threads == 0 {
            config.threads = CrawlerConfig::default().threads;
        }

        let mut pipelines = self.pipelines;
        if pipelines.is_empty() {
            pipelines.push(Box::new(ConsolePipeline));
        }

        let factory = self
            .factory
            .unwrap_or_else(|| Box::new(BlankSessionFactory));
        let sessions = Arc::new(SessionPool::new(config.threads, factory));

        let seeds = Arc::new(SeedManager::new());
        for seed in self.seeds {
            seeds.add(seed);
        }

        Ok(Crawler {
            config,
            seeds,
            sessions,
            processor,
            pipelines: Arc::new(pipelines),
            state: Arc::new(AtomicUsize::new(STATE_INIT)),
            inflight: Arc::new(AtomicUsize::new(0)),
        })
    }
}

/// The crawl driver. Seeds are dispatched to a fixed worker pool; workers
/// check sessions out of the pool, hand extracted items to the pipelines,
/// and feed discovered seeds back into the queue.
pub struct Crawler {
    config: CrawlerConfig,
    seeds: Arc<SeedManager>,
    sessions: Arc<SessionPool>,
    processor: Arc<dyn Processor>,
    pipelines: Arc<Vec<Box<dyn Pipeline>>>,
    state: Arc<AtomicUsize>,
    inflight: Arc<AtomicUsize>,
}

impl Crawler {
    pub fn builder() -> CrawlerBuilder {
        CrawlerBuilder::new()
    }

    /// Adds a seed from outside the crawl (deduplicated).
    pub fn add_seed(&self, data: impl Into<String>) -> bool {
        self.seeds.add(Seed::new(data))
    }

    /// Requests shutdown; `run` returns after in-flight seeds finish.
    pub fn stop(&self) {
        let _ = self.state.compare_exchange(
            STATE_RUNNING,
            STATE_STOPPED,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }

    /// Drives the crawl to completion. Blocks the calling thread; returns
    /// [`CrawlError::AlreadyRunning`] if another `run` is active.
    pub fn run(&self) -> Result<(), CrawlError> {
        loop {
            let current = self.state.load(Ordering::SeqCst);
            if current == STATE_RUNNING {
                return Err(CrawlError::AlreadyRunning);
            }
            if self
                .state
                .compare_exchange(current, STATE_RUNNING, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                break;
            }
        }

        let threads = self.config.threads;
        info!("Crawler started with {} workers.", threads);

        let (sender, receiver) = async_channel::bounded(threads);
        let context = WorkerContext {
            seeds: Arc::clone(&self.seeds),
            sessions: Arc::clone(&self.sessions),
            processor: Arc::clone(&self.processor),
            pipelines: Arc::clone(&self.pipelines),
            inflight: Arc::clone(&self.inflight),
            state: Arc::clone(&self.state),
            session_retry_interval: self.config.session_retry_interval,
        };
        let handles = spawn_workers(threads, &context, receiver);

        let mut slow_start_times = 0usize;
        while self.state.load(Ordering::SeqCst) == STATE_RUNNING {
            match self.seeds.consume() {
                Some(seed) => {
                    self.inflight.fetch_add(1, Ordering::SeqCst);
                    if sender.send_blocking(seed).is_err() {
                        warn!("Seed channel closed, stopping dispatch.");
                        self.inflight.fetch_sub(1, Ordering::SeqCst);
                        break;
                    }
                    if self.config.slow_start && slow_start_times < threads.saturating_sub(1) {
                        thread::sleep(self.config.slow_start_duration / threads as u32);
                        slow_start_times += 1;
                    }
                }
                None => {
                    if self.inflight.load(Ordering::SeqCst) == 0 {
                        if self.config.exit_when_complete {
                            break;
                        }
                        thread::sleep(Duration::from_millis(50));
                    } else {
                        // Workers are still busy and may produce new seeds.
                        thread::sleep(Duration::from_millis(10));
                    }
                }
            }
        }

        drop(sender);
        for handle in handles {
            if handle.join().is_err() {
                warn!("A worker panicked during shutdown.");
            }
        }
        self.state.store(STATE_STOPPED, Ordering::SeqCst);
        info!("Crawler stopped.");
        Ok(())
    }
}
