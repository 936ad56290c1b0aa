//! Error and Result types.

use crate::session::DriverError;

/// A specialized `Result` type for poolkeeper.
pub type Result<T, E> = std::result::Result<T, Error<E>>;

/// A generic error that represents all the ways a pool operation can fail.
#[derive(thiserror::Error, Debug)]
pub enum Error<E: DriverError> {
    /// Construction or setter value was out of the accepted range, or the
    /// health-probe callback was not callable.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// The driver module backing this pool could not be identified for
    /// health-probe error classification.
    ///
    /// This crate's [`DriverError`] trait is supplied at the type level, so
    /// [`Pool`][crate::Pool]'s own constructor never raises this variant; it
    /// is retained for implementations that attempt runtime driver
    /// discovery instead (see `spec.md` §4.5's design note).
    #[error("failed to identify the driver for health-check classification")]
    DriverDiscoveryFailed,

    /// [`Pool::acquire`][crate::Pool::acquire] was called on a pool that is
    /// closing or closed.
    #[error("the pool is closed")]
    PoolClosed,

    /// Reserved for callers that want `acquire` to fail loudly instead of
    /// returning `Ok(None)` on a timeout or non-blocking miss. Never raised
    /// by [`Pool::acquire`][crate::Pool::acquire] itself; used by
    /// [`Pool::acquire_required`][crate::Pool::acquire_required].
    #[error("no connection became available before the deadline")]
    NoConnectionAvailable,

    /// `connfunc` failed while opening a new session. Propagated as-is from
    /// the caller-supplied connect function through `acquire`; the pool
    /// does not retry synchronously.
    #[error("failed to open a new connection: {0}")]
    ConnectFailure(#[source] E),
}
