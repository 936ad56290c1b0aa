//! Health probes: pluggable liveness checks run against a raw session.

use std::sync::Arc;

use crate::session::RawSession;

/// A pluggable predicate invoked against a raw session to decide whether it
/// is still usable.
///
/// Built from a SQL string that is expected to succeed against a live
/// session and be rolled back afterwards, in the style of
/// [`standard`][HealthProbe::standard]'s `SELECT 1`. Two named built-ins are
/// provided; [`custom`][HealthProbe::custom] covers everything else (other
/// dialects, a richer liveness query, a no-op probe for tests).
#[derive(Clone)]
pub struct HealthProbe {
    sql: Arc<str>,
}

impl HealthProbe {
    /// The standard probe: `SELECT 1`. Works against most SQL databases.
    pub fn standard() -> Self {
        Self::custom("SELECT 1")
    }

    /// The Oracle probe: `SELECT 1 FROM DUAL`, since Oracle requires a
    /// table reference even for a constant-only query.
    pub fn oracle() -> Self {
        Self::custom("SELECT 1 FROM DUAL")
    }

    /// Build a probe from an arbitrary SQL string.
    pub fn custom(sql: impl Into<Arc<str>>) -> Self {
        Self { sql: sql.into() }
    }

    /// Run the probe against `session`, returning whether it is still live.
    ///
    /// A transient driver error (per [`DriverError::is_transient`]) and any
    /// other unexpected error both count as "dead" — the difference is that
    /// an unexpected error is additionally logged at
    /// [`log::Level::Error`], per `spec.md` §4.6/§7.
    pub fn check<S: RawSession>(&self, session: &mut S) -> bool {
        match session.execute(&self.sql) {
            Ok(()) => {
                // Best effort: a probe that can't execute but can roll back is
                // exceedingly unlikely, and a rollback failure here doesn't
                // change the liveness verdict the `execute` already gave us.
                let _ = session.rollback();
                true
            }
            Err(e) if e.is_transient() => false,
            Err(e) => {
                log::error!("unexpected error during health check, invalidating session: {e}");
                false
            }
        }
    }
}

impl std::fmt::Debug for HealthProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthProbe").field("sql", &self.sql).finish()
    }
}
