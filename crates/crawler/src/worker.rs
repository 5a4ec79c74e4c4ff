//! The fixed worker pool draining the seed channel.

use crate::crawler::STATE_RUNNING;
use crate::error::CrawlError;
use crate::pipeline::Pipeline;
use crate::processor::Processor;
use crate::seed::{Seed, SeedManager};
use crate::session::SessionPool;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// Shared resources every worker needs.
#[derive(Clone)]
pub(crate) struct WorkerContext {
    pub seeds: Arc<SeedManager>,
    pub sessions: Arc<SessionPool>,
    pub processor: Arc<dyn Processor>,
    pub pipelines: Arc<Vec<Box<dyn Pipeline>>>,
    /// Seeds dispatched but not yet fully processed. Incremented by the
    /// dispatcher before sending, decremented here after the seed is done
    /// (and after any follow-up seeds have been enqueued), so the dispatch
    /// loop can detect completion without a race.
    pub inflight: Arc<AtomicUsize>,
    pub state: Arc<AtomicUsize>,
    pub session_retry_interval: Duration,
}

/// Spawns `count` workers pulling from `receiver` until the channel closes.
pub(crate) fn spawn_workers(
    count: usize,
    context: &WorkerContext,
    receiver: async_channel::Receiver<Seed>,
) -> Vec<thread::JoinHandle<()>> {
    let mut handles = Vec::new();
    for worker_id in 0..count {
        let receiver = receiver.clone();
        let ctx = context.clone();
        handles.push(thread::spawn(move || {
            info!("[WORKER-{}] Started.", worker_id);
            while let Ok(seed) = receiver.recv_blocking() {
                if let Err(e) = process_seed(worker_id, &seed, &ctx) {
                    error!(
                        "[WORKER-{}] Processing seed '{}' failed: {}",
                        worker_id, seed.data, e
                    );
                }
                ctx.inflight.fetch_sub(1, Ordering::SeqCst);
            }
            info!("[WORKER-{}] Shutting down.", worker_id);
        }));
    }
    handles
}

fn process_seed(worker_id: usize, seed: &Seed, ctx: &WorkerContext) -> Result<(), CrawlError> {
    // Block until a session frees up, checking for shutdown between tries.
    let session = loop {
        if ctx.state.load(Ordering::SeqCst) != STATE_RUNNING {
            warn!(
                "[WORKER-{}] Crawler stopping, dropping seed '{}'.",
                worker_id, seed.data
            );
            return Ok(());
        }
        match ctx.sessions.borrow() {
            Ok(Some(session)) => break session,
            Ok(None) => thread::sleep(ctx.session_retry_interval),
            Err(e) => {
                warn!("[WORKER-{}] Session acquisition failed: {}", worker_id, e);
                thread::sleep(ctx.session_retry_interval);
            }
        }
    };
    debug!(
        "[WORKER-{}] Processing '{}' with session {}.",
        worker_id,
        seed.data,
        session.id()
    );

    let mut session_usable = true;
    let outcome = match ctx.processor.process(seed, &session) {
        Ok(result) => {
            for data in result.new_seeds {
                ctx.seeds.add(Seed::new(data));
            }
            if !result.items.is_empty() {
                for pipeline in ctx.pipelines.iter() {
                    pipeline.save_items(&result.items, seed);
                }
            }
            if result.retry {
                debug!(
                    "[WORKER-{}] Re-enqueueing '{}' (attempt {}).",
                    worker_id,
                    seed.data,
                    seed.retries + 1
                );
                ctx.seeds.add_force(seed.retried());
            }
            session_usable = result.session_ok;
            Ok(())
        }
        Err(e) => Err(e),
    };
    // The session always goes back through feedback; only an explicit
    // session_ok=false marks it unusable.
    ctx.sessions.feedback(session, session_usable);
    outcome
}
