use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures_util::future::{AbortHandle, Abortable};

use crate::errors::AppError;

/// Ties in-flight requests to the lifetime of the view that issued them.
///
/// `close` aborts everything still pending and refuses new work. Each `begin`
/// bumps an epoch so a result produced for a superseded request can be
/// recognised and dropped.
#[derive(Debug, Default)]
pub struct RequestScope {
    handles: Mutex<HashMap<u64, AbortHandle>>,
    next_handle: AtomicU64,
    epoch: AtomicU64,
    closed: AtomicBool,
}

/// Marks one logical request issued from a scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket(u64);

/// Unregisters a request's abort handle when its future resolves or is dropped.
struct Registration<'a> {
    scope: &'a RequestScope,
    id: u64,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        self.scope.handles().remove(&self.id);
    }
}

impl RequestScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a request that supersedes every earlier ticket.
    pub fn begin(&self) -> Ticket {
        Ticket(self.epoch.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// The latest ticket, without superseding it.
    pub fn current(&self) -> Ticket {
        Ticket(self.epoch.load(Ordering::SeqCst))
    }

    /// True while the scope is open and no newer request has begun.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        !self.is_closed() && self.epoch.load(Ordering::SeqCst) == ticket.0
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Runs `fut` until it completes or the scope is closed.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        if self.is_closed() {
            return Err(AppError::Cancelled);
        }
        let (handle, abort_registration) = AbortHandle::new_pair();
        let id = self.next_handle.fetch_add(1, Ordering::SeqCst);
        self.handles().insert(id, handle);
        let _registration = Registration { scope: self, id };

        match Abortable::new(fut, abort_registration).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Cancelled),
        }
    }

    /// Number of requests still running.
    pub fn in_flight(&self) -> usize {
        self.handles().len()
    }

    /// Aborts every pending request. Later `run` calls fail with `Cancelled`.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let handles = std::mem::take(&mut *self.handles());
        for handle in handles.into_values() {
            handle.abort();
        }
    }

    fn handles(&self) -> MutexGuard<'_, HashMap<u64, AbortHandle>> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
