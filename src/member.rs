//! [`PoolMember`]: a pool-owned wrapper around one raw session.

use std::time::Instant;

use crate::probe::HealthProbe;
use crate::session::RawSession;

/// One raw session plus the bookkeeping the pool needs to age, probe, and
/// reclaim it.
///
/// Owned exclusively by the [`Pool`][crate::Pool]: a `PoolMember` is created
/// when the inventory grows, lives in the free list or is checked out
/// through a [`Handle`][crate::handle::Handle], and is removed from
/// inventory — with its session closed exactly once — only by the pool
/// itself (dead/idle/over-cap cleanup, or pool close).
pub struct PoolMember<S> {
    pub(crate) session: S,
    pub(crate) create_time: Instant,
    pub(crate) touch_time: Instant,
    pub(crate) check_time: Instant,
}

impl<S: RawSession> PoolMember<S> {
    pub(crate) fn new(session: S) -> Self {
        let now = Instant::now();
        Self {
            session,
            create_time: now,
            touch_time: now,
            check_time: now,
        }
    }

    /// Run `probe` against this member's session, recording the check time
    /// regardless of outcome.
    pub(crate) fn healthcheck(&mut self, probe: &HealthProbe) -> bool {
        let live = probe.check(&mut self.session);
        self.check_time = Instant::now();
        live
    }

    /// Stamp `touch_time` as now — called when a member is returned to the
    /// free list.
    pub(crate) fn touch(&mut self) {
        self.touch_time = Instant::now();
    }

    /// Close the underlying session, swallowing any error (per `spec.md`
    /// §7: "errors during member destruction are swallowed").
    pub(crate) fn close(mut self) {
        if let Err(e) = self.session.close() {
            log::debug!("error closing session during removal (ignored): {e}");
        }
    }
}
