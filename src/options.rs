//! [`PoolOptions`]: construction-time configuration for a [`Pool`][crate::Pool].

use std::time::Duration;

use crate::error::Error;
use crate::pool::Pool;
use crate::probe::HealthProbe;
use crate::session::RawSession;

/// A boxed, thread-safe connect function: produces one new raw session per
/// call, or fails with the driver's own error type.
pub type ConnFunc<S> =
    Box<dyn Fn() -> Result<S, <S as RawSession>::Error> + Send + Sync + 'static>;

/// Builder for [`Pool`] construction options.
///
/// Mirrors the contractual defaults of `spec.md` §6 exactly: a pool built
/// with only [`connfunc`][PoolOptions::connfunc] set behaves as if every
/// other field below had been called explicitly with its default.
pub struct PoolOptions<S: RawSession> {
    connfunc: Option<ConnFunc<S>>,
    poolinit: Option<u32>,
    poolmin: u32,
    poolmax: u32,
    cleanup_interval: Duration,
    idle_timeout: Duration,
    healthcheck_on_acquire: bool,
    healthcheck_callback: HealthProbe,
}

impl<S: RawSession> Default for PoolOptions<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: RawSession> PoolOptions<S> {
    /// Returns the contractual default configuration (`spec.md` §6):
    /// `poolmin = 10`, `poolmax = 20`, `poolinit = None`,
    /// `cleanup_interval = 60s`, `idle_timeout = 300s`,
    /// `healthcheck_on_acquire = true`, `healthcheck_callback = standard`.
    pub fn new() -> Self {
        Self {
            connfunc: None,
            poolinit: None,
            poolmin: 10,
            poolmax: 20,
            cleanup_interval: Duration::from_secs(60),
            idle_timeout: Duration::from_secs(300),
            healthcheck_on_acquire: true,
            healthcheck_callback: HealthProbe::standard(),
        }
    }

    /// Set the function used to open new sessions. Required: [`build`][Self::build]
    /// fails with [`Error::InvalidParameter`] if it was never set.
    pub fn connfunc<F>(mut self, connfunc: F) -> Self
    where
        F: Fn() -> Result<S, S::Error> + Send + Sync + 'static,
    {
        self.connfunc = Some(Box::new(connfunc));
        self
    }

    /// Set the initial number of sessions to open at construction. Must lie
    /// within `[poolmin, poolmax]` if set; defaults to `poolmin`.
    pub fn poolinit(mut self, poolinit: u32) -> Self {
        self.poolinit = Some(poolinit);
        self
    }

    /// Set the minimum number of sessions the pool tries to keep open.
    pub fn poolmin(mut self, poolmin: u32) -> Self {
        self.poolmin = poolmin;
        self
    }

    /// Set the maximum number of sessions the pool may open.
    pub fn poolmax(mut self, poolmax: u32) -> Self {
        self.poolmax = poolmax;
        self
    }

    /// Set how often the background janitor runs a cleanup cycle.
    pub fn cleanup_interval(mut self, cleanup_interval: Duration) -> Self {
        self.cleanup_interval = cleanup_interval;
        self
    }

    /// Set the minimum age since last use at which a free session becomes
    /// an idle-trim candidate.
    pub fn idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Set whether `acquire` health-checks a candidate session before
    /// handing it to the caller.
    pub fn healthcheck_on_acquire(mut self, healthcheck_on_acquire: bool) -> Self {
        self.healthcheck_on_acquire = healthcheck_on_acquire;
        self
    }

    /// Set the health-probe callback used both by acquire-time checks and
    /// by the janitor's dead sweep.
    pub fn healthcheck_callback(mut self, healthcheck_callback: HealthProbe) -> Self {
        self.healthcheck_callback = healthcheck_callback;
        self
    }

    /// Validate this configuration and build the pool, opening
    /// `max(poolmin, poolinit.unwrap_or(poolmin))` sessions synchronously.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] if any bound is out of range (`spec.md`
    /// §4.1); [`Error::ConnectFailure`] if an initial connect fails, in
    /// which case every session opened so far is closed before the error
    /// is returned.
    pub fn build(self) -> Result<Pool<S>, Error<S::Error>> {
        Pool::build(self)
    }

    pub(crate) fn validate(&self) -> Result<(), Error<S::Error>> {
        if self.connfunc.is_none() {
            return Err(Error::InvalidParameter("connfunc must be set"));
        }
        if self.poolmax < 1 {
            return Err(Error::InvalidParameter("poolmax must be >= 1"));
        }
        if self.poolmax < self.poolmin {
            return Err(Error::InvalidParameter("poolmax must be >= poolmin"));
        }
        if let Some(poolinit) = self.poolinit {
            if poolinit < self.poolmin || poolinit > self.poolmax {
                return Err(Error::InvalidParameter(
                    "poolinit must lie within [poolmin, poolmax]",
                ));
            }
        }
        if self.cleanup_interval.is_zero() {
            return Err(Error::InvalidParameter("cleanup_interval must be > 0"));
        }
        Ok(())
    }

    pub(crate) fn into_parts(self) -> (ConnFunc<S>, Option<u32>, u32, u32, Duration, Duration, bool, HealthProbe) {
        (
            self.connfunc.expect("validated before into_parts"),
            self.poolinit,
            self.poolmin,
            self.poolmax,
            self.cleanup_interval,
            self.idle_timeout,
            self.healthcheck_on_acquire,
            self.healthcheck_callback,
        )
    }
}
