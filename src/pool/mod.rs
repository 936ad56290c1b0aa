//! **Pool**: the controller that owns the member inventory, free list,
//! condition variable, configuration, statistics, and janitor handle.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::Error;
use crate::handle::Handle;
use crate::member::PoolMember;
use crate::options::{ConnFunc, PoolOptions};
use crate::probe::HealthProbe;
use crate::session::RawSession;
use crate::stats::Stats;

mod janitor;

/// A pool of bounded, long-lived database sessions.
///
/// Cheaply cloneable — every clone shares the same underlying state (the
/// same inventory, mutex, and background janitor), in the style of the
/// teacher's own `Pool<DB>` (`Arc`-wrapped, `Clone` derived by cloning the
/// `Arc`).
pub struct Pool<S: RawSession>(Arc<Shared<S>>);

impl<S: RawSession> Clone for Pool<S> {
    fn clone(&self) -> Self {
        Pool(Arc::clone(&self.0))
    }
}

impl<S: RawSession> fmt::Debug for Pool<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats();
        f.debug_struct("Pool")
            .field("poolsize", &stats.poolsize)
            .field("poolused", &stats.poolused)
            .field("poolfree", &stats.poolfree)
            .field("closing", &self.0.is_closing())
            .finish()
    }
}

pub(crate) struct Shared<S: RawSession> {
    connfunc: ConnFunc<S>,
    poolinit: Option<u32>,
    state: Mutex<Inner<S>>,
    condvar: Condvar,
    janitor_handle: Mutex<Option<JoinHandle<()>>>,
}

struct Inner<S: RawSession> {
    free: Vec<PoolMember<S>>,
    in_use: u32,
    /// Sessions currently being opened — counted against `poolmax` so two
    /// racing growth attempts can't both push past the cap while the lock
    /// is released for the synchronous connect (`spec.md` §4.2 step 4).
    pending: u32,
    poolmin: u32,
    poolmax: u32,
    cleanup_interval: Duration,
    idle_timeout: Duration,
    healthcheck_on_acquire: bool,
    healthcheck_callback: HealthProbe,
    cleaned_dead: u64,
    cleaned_idle: u64,
    cleanup_cycles: u64,
    closing: bool,
}

impl<S: RawSession> Inner<S> {
    /// `|inventory|` as `spec.md` §3 defines it: the free ∪ in-use set of
    /// actual `PoolMember`s. This is what `stats()` reports and what the
    /// cleanup cycle's idle/over-cap/refill math targets.
    fn member_count(&self) -> u32 {
        self.free.len() as u32 + self.in_use
    }

    /// `member_count()` plus connects currently in flight with the lock
    /// released (`spec.md` §4.2 step 4). Used only to gate growth in
    /// `acquire`, so two racing growth attempts can't both see room under
    /// `poolmax` and overshoot it once their connects land — it is
    /// deliberately *not* what `stats()` reports, since a pending connect
    /// isn't a `PoolMember` yet and may still fail.
    fn inventory_cap(&self) -> u32 {
        self.member_count() + self.pending
    }
}

impl<S: RawSession> Pool<S> {
    /// Returns a [`PoolOptions`] builder preloaded with the contractual
    /// defaults (`spec.md` §6).
    pub fn builder() -> PoolOptions<S> {
        PoolOptions::new()
    }

    pub(crate) fn build(options: PoolOptions<S>) -> Result<Self, Error<S::Error>> {
        options.validate()?;
        let (
            connfunc,
            poolinit,
            poolmin,
            poolmax,
            cleanup_interval,
            idle_timeout,
            healthcheck_on_acquire,
            healthcheck_callback,
        ) = options.into_parts();

        let target = poolinit.unwrap_or(poolmin);
        let mut free = Vec::with_capacity(target as usize);
        for _ in 0..target {
            match connfunc() {
                Ok(session) => free.push(PoolMember::new(session)),
                Err(e) => {
                    for member in free {
                        member.close();
                    }
                    return Err(Error::ConnectFailure(e));
                }
            }
        }

        let inner = Inner {
            free,
            in_use: 0,
            pending: 0,
            poolmin,
            poolmax,
            cleanup_interval,
            idle_timeout,
            healthcheck_on_acquire,
            healthcheck_callback,
            cleaned_dead: 0,
            cleaned_idle: 0,
            cleanup_cycles: 0,
            closing: false,
        };

        let shared = Arc::new(Shared {
            connfunc,
            poolinit,
            state: Mutex::new(inner),
            condvar: Condvar::new(),
            janitor_handle: Mutex::new(None),
        });

        let handle = janitor::spawn(Arc::clone(&shared));
        *shared.janitor_handle.lock() = Some(handle);

        Ok(Pool(shared))
    }

    /// Retrieve a session from the pool.
    ///
    /// `blocking = false` or a `timeout` that elapses both return `Ok(None)`
    /// rather than an error (`spec.md` §4.2, §7 — the reference contract
    /// returns a sentinel, never [`Error::NoConnectionAvailable`]).
    ///
    /// # Errors
    ///
    /// [`Error::PoolClosed`] if the pool is shutting down;
    /// [`Error::ConnectFailure`] if growing the pool to satisfy this
    /// acquire failed.
    pub fn acquire(
        &self,
        blocking: bool,
        timeout: Option<Duration>,
    ) -> Result<Option<Handle<S>>, Error<S::Error>> {
        let entry = Instant::now();

        let mut guard = if !blocking {
            match self.0.state.try_lock() {
                Some(g) => g,
                None => return Ok(None),
            }
        } else {
            match timeout {
                None => self.0.state.lock(),
                Some(d) => match self.0.state.try_lock_for(d) {
                    Some(g) => g,
                    None => return Ok(None),
                },
            }
        };

        loop {
            if guard.closing {
                return Err(Error::PoolClosed);
            }

            let mut candidate = if let Some(member) = guard.free.pop() {
                member
            } else if guard.inventory_cap() < guard.poolmax {
                guard.pending += 1;
                drop(guard);
                let opened = (self.0.connfunc)();
                guard = self.0.state.lock();
                guard.pending -= 1;
                match opened {
                    Ok(session) => PoolMember::new(session),
                    Err(e) => return Err(Error::ConnectFailure(e)),
                }
            } else {
                if !blocking {
                    return Ok(None);
                }

                let remaining = match timeout {
                    None => None,
                    Some(d) => match d.checked_sub(entry.elapsed()) {
                        Some(r) => Some(r),
                        None => return Ok(None),
                    },
                };

                match remaining {
                    None => self.0.condvar.wait(&mut guard),
                    Some(r) => {
                        if self.0.condvar.wait_for(&mut guard, r).timed_out() {
                            return Ok(None);
                        }
                    }
                }

                continue;
            };

            if guard.healthcheck_on_acquire {
                let probe = guard.healthcheck_callback.clone();
                if !candidate.healthcheck(&probe) {
                    candidate.close();
                    continue;
                }
            }

            guard.in_use += 1;
            return Ok(Some(Handle::new(candidate, Arc::clone(&self.0))));
        }
    }

    /// Like [`acquire`][Self::acquire], but returns
    /// [`Error::NoConnectionAvailable`] instead of `Ok(None)` on a
    /// non-blocking miss or elapsed deadline. A convenience for callers who
    /// prefer `?` over matching on `Option` (`spec.md` §7's
    /// `NoConnectionAvailable` variant exists for exactly this use).
    pub fn acquire_required(
        &self,
        blocking: bool,
        timeout: Option<Duration>,
    ) -> Result<Handle<S>, Error<S::Error>> {
        self.acquire(blocking, timeout)?
            .ok_or(Error::NoConnectionAvailable)
    }

    /// Take an atomic snapshot of pool size and lifetime counters
    /// (`spec.md` §4.8).
    pub fn stats(&self) -> Stats {
        let guard = self.0.state.lock();
        Stats {
            poolsize: guard.member_count(),
            poolused: guard.in_use,
            poolfree: guard.free.len() as u32,
            cleaned_dead: guard.cleaned_dead,
            cleaned_idle: guard.cleaned_idle,
            cleanup_cycles: guard.cleanup_cycles,
        }
    }

    /// The connect function this pool opens new sessions with (`spec.md`
    /// §6's read-only `connfunc` property). There is no `connargs`/
    /// `connkwargs` counterpart: a Rust closure captures whatever state it
    /// needs directly, so there is nothing separate to expose for those.
    pub fn connfunc(&self) -> &ConnFunc<S> {
        &self.0.connfunc
    }

    /// The `poolinit` this pool was constructed with, or `None` if it
    /// defaulted to `poolmin`.
    pub fn poolinit(&self) -> Option<u32> {
        self.0.poolinit
    }

    /// The health-probe callback used for acquire-time checks and the
    /// janitor's dead sweep. Read-only (`spec.md` §6).
    pub fn healthcheck_callback(&self) -> HealthProbe {
        self.0.state.lock().healthcheck_callback.clone()
    }

    pub fn poolmin(&self) -> u32 {
        self.0.state.lock().poolmin
    }

    pub fn poolmax(&self) -> u32 {
        self.0.state.lock().poolmax
    }

    pub fn cleanup_interval(&self) -> Duration {
        self.0.state.lock().cleanup_interval
    }

    pub fn idle_timeout(&self) -> Duration {
        self.0.state.lock().idle_timeout
    }

    pub fn healthcheck_on_acquire(&self) -> bool {
        self.0.state.lock().healthcheck_on_acquire
    }

    /// Set the minimum number of sessions the pool tries to keep open.
    ///
    /// Validated against the current `poolmax`; takes effect on the next
    /// cleanup cycle, not immediately.
    pub fn set_poolmin(&self, poolmin: u32) -> Result<(), Error<S::Error>> {
        let mut guard = self.0.state.lock();
        if poolmin > guard.poolmax {
            return Err(Error::InvalidParameter("poolmin must be <= poolmax"));
        }
        guard.poolmin = poolmin;
        Ok(())
    }

    /// Set the maximum number of sessions the pool may open.
    ///
    /// Lowering it below the current inventory does not evict anything
    /// immediately; the next cleanup cycle trims down to the new cap as
    /// free slots permit (`spec.md` §4.4 phase 3).
    pub fn set_poolmax(&self, poolmax: u32) -> Result<(), Error<S::Error>> {
        let mut guard = self.0.state.lock();
        if poolmax < 1 {
            return Err(Error::InvalidParameter("poolmax must be >= 1"));
        }
        if poolmax < guard.poolmin {
            return Err(Error::InvalidParameter("poolmax must be >= poolmin"));
        }
        guard.poolmax = poolmax;
        Ok(())
    }

    /// Set how often the background janitor runs a cleanup cycle. Takes
    /// effect on the janitor's next wake (`spec.md` §4.4).
    pub fn set_cleanup_interval(&self, cleanup_interval: Duration) -> Result<(), Error<S::Error>> {
        if cleanup_interval.is_zero() {
            return Err(Error::InvalidParameter("cleanup_interval must be > 0"));
        }
        self.0.state.lock().cleanup_interval = cleanup_interval;
        Ok(())
    }

    /// Set the minimum age since last use at which a free session becomes
    /// an idle-trim candidate.
    pub fn set_idle_timeout(&self, idle_timeout: Duration) -> Result<(), Error<S::Error>> {
        self.0.state.lock().idle_timeout = idle_timeout;
        Ok(())
    }

    /// Set whether `acquire` health-checks a candidate before handing it to
    /// the caller.
    pub fn set_healthcheck_on_acquire(&self, enabled: bool) -> Result<(), Error<S::Error>> {
        self.0.state.lock().healthcheck_on_acquire = enabled;
        Ok(())
    }

    /// Run one cleanup cycle immediately, out of band from the janitor's
    /// own schedule. The janitor calls this same routine on every wake; it
    /// is exposed here so operators and tests can force a cycle (e.g. right
    /// after lowering `poolmax`) without waiting for `cleanup_interval` to
    /// elapse.
    pub fn run_cleanup_cycle(&self) {
        self.0.run_cleanup_cycle();
    }

    /// Shut the pool down.
    ///
    /// Prevents new acquires, stops the janitor, closes every currently
    /// free session, and blocks until every in-use [`Handle`] has been
    /// returned. Subsequent calls are no-ops (`spec.md` §4.9).
    pub fn close(&self) {
        {
            let mut guard = self.0.state.lock();
            if guard.closing {
                return;
            }
            guard.closing = true;
        }
        self.0.condvar.notify_all();

        if let Some(handle) = self.0.janitor_handle.lock().take() {
            let _ = handle.join();
        }

        let mut guard = self.0.state.lock();
        let free = std::mem::take(&mut guard.free);
        for member in free {
            member.close();
        }
        while guard.in_use > 0 {
            self.0.condvar.wait(&mut guard);
        }
    }
}

impl<S: RawSession> Shared<S> {
    pub(crate) fn is_closing(&self) -> bool {
        self.state.lock().closing
    }

    /// Return a session to the free list after its handle released it.
    pub(crate) fn release(&self, mut member: PoolMember<S>) {
        member.touch();
        {
            let mut guard = self.state.lock();
            guard.in_use -= 1;
            guard.free.push(member);
        }
        self.condvar.notify_one();
    }

    /// Account for a session closed directly by its handle because the pool
    /// was already shutting down (`spec.md` §4.3 step 2) — the member is
    /// never reinserted into the free list, but `in_use` still needs to drop
    /// so `Pool::close`'s drain wait can observe completion.
    pub(crate) fn release_while_closing(&self) {
        {
            let mut guard = self.state.lock();
            guard.in_use -= 1;
        }
        self.condvar.notify_all();
    }

    fn run_cleanup_cycle(&self) {
        let mut guard = self.state.lock();
        if guard.closing {
            return;
        }

        // Phase 1: dead sweep.
        let probe = guard.healthcheck_callback.clone();
        let mut i = 0;
        while i < guard.free.len() {
            if guard.free[i].healthcheck(&probe) {
                i += 1;
            } else {
                let dead = guard.free.remove(i);
                dead.close();
                guard.cleaned_dead += 1;
            }
        }

        // Phase 2: idle trim.
        let idle_cap = guard
            .member_count()
            .saturating_sub(guard.poolmin)
            .min(guard.free.len() as u32);
        if idle_cap > 0 {
            let idle_timeout = guard.idle_timeout;
            let now = Instant::now();
            let free = &guard.free;
            let mut candidates: Vec<usize> = (0..free.len())
                .filter(|&i| now.duration_since(free[i].touch_time) > idle_timeout)
                .collect();
            candidates.sort_by(|&a, &b| age_order(&free[a], &free[b]));
            let mut to_remove: Vec<usize> = candidates.into_iter().take(idle_cap as usize).collect();
            to_remove.sort_unstable_by(|a, b| b.cmp(a));
            for idx in to_remove {
                let member = guard.free.remove(idx);
                member.close();
                guard.cleaned_idle += 1;
            }
        }

        // Phase 3: over-cap trim.
        let inventory = guard.member_count();
        if inventory > guard.poolmax {
            let excess = (inventory - guard.poolmax) as usize;
            let free = &guard.free;
            let mut idxs: Vec<usize> = (0..free.len()).collect();
            idxs.sort_by(|&a, &b| age_order(&free[a], &free[b]));
            let mut to_remove: Vec<usize> = idxs.into_iter().take(excess.min(free.len())).collect();
            to_remove.sort_unstable_by(|a, b| b.cmp(a));
            for idx in to_remove {
                let member = guard.free.remove(idx);
                member.close();
            }
        }

        // Phase 4: refill.
        while guard.member_count() < guard.poolmin {
            match (self.connfunc)() {
                Ok(session) => guard.free.push(PoolMember::new(session)),
                Err(e) => {
                    log::warn!("janitor refill failed, stopping refill for this cycle: {e}");
                    break;
                }
            }
        }

        guard.cleanup_cycles += 1;
        drop(guard);
        self.condvar.notify_all();
    }
}

/// Oldest-idle first (smallest `touch_time`), ties broken oldest-created
/// first (smallest `create_time`) — `spec.md` §4.4's `(age desc, create_time
/// asc)` ordering, restated in terms of the timestamps actually stored.
fn age_order<S>(a: &PoolMember<S>, b: &PoolMember<S>) -> Ordering {
    a.touch_time
        .cmp(&b.touch_time)
        .then_with(|| a.create_time.cmp(&b.create_time))
}
