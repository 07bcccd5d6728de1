//! Fake lock recording how often it is contacted.

use redlock_core::traits::DistributedLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counters shared between a [`CountingLock`] and the test.
#[derive(Debug, Default)]
pub struct Calls {
    pub acquire: AtomicUsize,
    pub release: AtomicUsize,
}

impl Calls {
    pub fn acquires(&self) -> usize {
        self.acquire.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.release.load(Ordering::SeqCst)
    }
}

/// Lock whose acquire succeeds only for the first `grants` calls.
pub struct CountingLock {
    calls: Arc<Calls>,
    grants: usize,
}

impl CountingLock {
    pub fn new(grants: usize) -> (Self, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        (
            Self {
                calls: calls.clone(),
                grants,
            },
            calls,
        )
    }
}

impl DistributedLock for CountingLock {
    fn resource(&self) -> &str {
        "counting"
    }

    async fn acquire(&mut self) -> bool {
        let previous = self.calls.acquire.fetch_add(1, Ordering::SeqCst);
        previous < self.grants
    }

    async fn release(&mut self) -> bool {
        self.calls.release.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn release_in_background(&mut self) {
        self.calls.release.fetch_add(1, Ordering::SeqCst);
    }
}
