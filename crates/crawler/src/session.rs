//! Sessions and the bounded checkout pool.

use crate::error::CrawlError;
use log::info;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

/// An opaque crawl session: an id plus whatever attributes (cookies,
/// tokens, proxy endpoints) the embedder's factory attached.
#[derive(Debug, Clone)]
pub struct Session {
    id: usize,
    attributes: HashMap<String, String>,
}

impl Session {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            attributes: HashMap::new(),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }
}

/// Produces ready-to-use sessions. Login and any other acquisition work
/// happens behind this trait; the pool only manages checkout discipline.
pub trait SessionFactory: Send + Sync {
    fn create(&self, id: usize) -> Result<Session, CrawlError>;
}

/// Factory for sessions with no credentials attached.
#[derive(Debug, Default)]
pub struct BlankSessionFactory;

impl SessionFactory for BlankSessionFactory {
    fn create(&self, id: usize) -> Result<Session, CrawlError> {
        Ok(Session::new(id))
    }
}

/// A fixed-capacity session pool with at-most-one-concurrent-use.
///
/// Sessions are created lazily up to `capacity`. A borrowed session is
/// invisible to other workers until it comes back through [`feedback`];
/// a session returned as unusable is discarded and its slot reopened, so a
/// later borrow replaces it through the factory.
///
/// [`feedback`]: SessionPool::feedback
pub struct SessionPool {
    factory: Box<dyn SessionFactory>,
    capacity: usize,
    state: Mutex<PoolState>,
}

#[derive(Default)]
struct PoolState {
    idle: VecDeque<Session>,
    live: usize,
    next_id: usize,
}

impl SessionPool {
    pub fn new(capacity: usize, factory: Box<dyn SessionFactory>) -> Self {
        Self {
            factory,
            capacity,
            state: Mutex::new(PoolState::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Checks out an idle session, creating one if the pool is below
    /// capacity. `None` means every session is in use; callers retry after
    /// a pause.
    pub fn borrow(&self) -> Result<Option<Session>, CrawlError> {
        let id = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(session) = state.idle.pop_front() {
                return Ok(Some(session));
            }
            if state.live >= self.capacity {
                return Ok(None);
            }
            state.live += 1;
            let id = state.next_id;
            state.next_id += 1;
            id
        };
        // The factory may block on login; run it outside the lock and give
        // the slot back if it fails.
        match self.factory.create(id) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
                state.live -= 1;
                Err(e)
            }
        }
    }

    /// Returns a session after use. Unusable sessions are dropped from the
    /// pool entirely.
    pub fn feedback(&self, session: Session, usable: bool) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if usable {
            state.idle.push_back(session);
        } else {
            state.live -= 1;
            info!("Discarding session {}.", session.id());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn borrow_is_bounded_by_capacity() {
        let pool = SessionPool::new(2, Box::new(BlankSessionFactory));
        let first = pool.borrow().unwrap().expect("first session");
        let second = pool.borrow().unwrap().expect("second session");
        assert!(pool.borrow().unwrap().is_none());

        pool.feedback(first, true);
        let reused = pool.borrow().unwrap().expect("reused session");
        assert_eq!(reused.id(), 0);
        pool.feedback(reused, true);
        pool.feedback(second, true);
    }

    #[test]
    fn unusable_sessions_are_replaced_through_the_factory() {
        let pool = SessionPool::new(1, Box::new(BlankSessionFactory));
        let session = pool.borrow().unwrap().expect("session");
        let original_id = session.id();
        pool.feedback(session, false);

        let replacement = pool.borrow().unwrap().expect("replacement");
        assert_ne!(replacement.id(), original_id);
    }

    #[test]
    fn factory_failure_reopens_the_slot() {
        struct FailingFactory;
        impl SessionFactory for FailingFactory {
            fn create(&self, _id: usize) -> Result<Session, CrawlError> {
                Err(CrawlError::Session("login refused".into()))
            }
        }

        let pool = SessionPool::new(1, Box::new(FailingFactory));
        assert!(pool.borrow().is_err());
        // The failed reservation must not permanently shrink the pool.
        assert!(pool.borrow().is_err());
    }

    #[test]
    fn session_attributes_round_trip() {
        let mut session = Session::new(7);
        session.set_attribute("cookie", "k=v");
        assert_eq!(session.attribute("cookie"), Some("k=v"));
        assert_eq!(session.attribute("missing"), None);
    }
}
