//! The background cleanup thread.
//!
//! One janitor thread runs per pool, sleeping on the shared condvar with a
//! timeout equal to the current `cleanup_interval` and running one cleanup
//! cycle each time it wakes from a timeout. The same condvar is also
//! signalled by ordinary acquire/release traffic and by
//! [`Pool::close`][crate::Pool::close]; a wake that isn't a timeout and isn't
//! shutdown just re-waits out whatever remains of the interval, so cleanup
//! cycles still run only once per `cleanup_interval`, not once per
//! release. Waking because shutdown was signalled skips straight to exit
//! instead of running an extra cycle; a cycle already in progress when
//! shutdown is signalled still runs to completion, because the cycle and the
//! shutdown flag are serialized through the same mutex.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::session::RawSession;

use super::Shared;

pub(super) fn spawn<S: RawSession>(shared: Arc<Shared<S>>) -> JoinHandle<()> {
    thread::Builder::new()
        .name("poolkeeper-janitor".to_owned())
        .spawn(move || run(shared))
        .expect("failed to spawn janitor thread")
}

fn run<S: RawSession>(shared: Arc<Shared<S>>) {
    loop {
        let mut guard = shared.state.lock();
        if guard.closing {
            return;
        }
        // The same condvar is signalled by every `Handle::close` and by
        // `run_cleanup_cycle` itself, so a wake here doesn't mean the full
        // interval elapsed. Re-wait out whatever is left of it (read once,
        // at the start of this sleep) until a wake is an actual timeout or
        // shutdown; a live interval change is picked up on the next sleep.
        let deadline = Instant::now() + guard.cleanup_interval;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            let result = shared.condvar.wait_for(&mut guard, remaining);
            if guard.closing {
                return;
            }
            if result.timed_out() {
                break;
            }
        }
        drop(guard);
        shared.run_cleanup_cycle();
    }
}
