//! The contract a database driver must satisfy to be managed by a [`Pool`][crate::Pool].
//!
//! The pool treats the driver as an external collaborator (`spec.md` §1):
//! it never executes application queries, only the handful of operations
//! needed to keep a session healthy and to tear it down cleanly.

/// Marks a driver's error type as one the pool can classify.
///
/// Replaces the reflective "walk up the connection's module looking for a
/// `connect` symbol" trick a dynamically-typed implementation might use to
/// find the driver's transient-error kind (`spec.md` §4.5, §9). A Rust
/// driver implements this directly on its own error type.
pub trait DriverError: std::error::Error + Send + Sync + 'static {
    /// Returns `true` if this error indicates the *session* has become
    /// unusable but the driver itself is fine — e.g. the server closed the
    /// socket, a statement timeout fired, the network blipped. Distinct
    /// from a logic error (bad SQL, constraint violation), which is not
    /// transient and should return `false`.
    fn is_transient(&self) -> bool;
}

/// A raw driver session managed by the pool.
///
/// A `RawSession` is never shared: at any instant it belongs to exactly one
/// [`PoolMember`][crate::member::PoolMember], which is either sitting in the
/// pool's free list or checked out through exactly one
/// [`Handle`][crate::handle::Handle].
pub trait RawSession: Send + 'static {
    /// The error type returned by this session's fallible operations.
    type Error: DriverError;

    /// Execute the given statement and discard any result, used only by a
    /// [`HealthProbe`][crate::probe::HealthProbe] to verify liveness.
    fn execute(&mut self, sql: &str) -> Result<(), Self::Error>;

    /// Roll back any transaction left open by the previous caller.
    ///
    /// Called on every [`Handle::close`][crate::handle::Handle::close] (and,
    /// for sessions returned directly to the driver at pool-close time, not
    /// at all — see `spec.md` §4.9) to guarantee the next caller starts from
    /// a clean baseline regardless of the prior caller's transaction mode.
    fn rollback(&mut self) -> Result<(), Self::Error>;

    /// Close the underlying session. Called exactly once per session, at
    /// the point the pool permanently removes its owning
    /// [`PoolMember`][crate::member::PoolMember] from inventory.
    fn close(&mut self) -> Result<(), Self::Error>;
}
