//! A `RawSession` test double shared by the integration tests.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use poolkeeper::session::DriverError;
use poolkeeper::RawSession;

#[derive(Debug, thiserror::Error)]
pub enum MockError {
    #[error("mock connect failure")]
    Connect,
    #[error("mock session is unhealthy")]
    Unhealthy,
}

impl DriverError for MockError {
    fn is_transient(&self) -> bool {
        matches!(self, MockError::Unhealthy)
    }
}

/// A session backed by shared atomics so a test can flip liveness or connect
/// failure for every session a pool holds, and count closes across all of
/// them.
pub struct MockSession {
    healthy: Arc<AtomicBool>,
    closes: Arc<AtomicU32>,
}

impl RawSession for MockSession {
    type Error = MockError;

    fn execute(&mut self, _sql: &str) -> Result<(), MockError> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(MockError::Unhealthy)
        }
    }

    fn rollback(&mut self) -> Result<(), MockError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), MockError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A connfunc factory plus the shared handles a test uses to control and
/// observe the sessions it produces.
pub struct MockDriver {
    pub healthy: Arc<AtomicBool>,
    pub closes: Arc<AtomicU32>,
    pub fail_connect: Arc<AtomicBool>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self {
            healthy: Arc::new(AtomicBool::new(true)),
            closes: Arc::new(AtomicU32::new(0)),
            fail_connect: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn connfunc(&self) -> impl Fn() -> Result<MockSession, MockError> + Send + Sync + 'static {
        let healthy = Arc::clone(&self.healthy);
        let closes = Arc::clone(&self.closes);
        let fail_connect = Arc::clone(&self.fail_connect);
        move || {
            if fail_connect.load(Ordering::SeqCst) {
                return Err(MockError::Connect);
            }
            Ok(MockSession {
                healthy: Arc::clone(&healthy),
                closes: Arc::clone(&closes),
            })
        }
    }

    pub fn closes(&self) -> u32 {
        self.closes.load(Ordering::SeqCst)
    }
}
