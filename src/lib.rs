#![forbid(unsafe_code)]

//! A bounded pool of long-lived database sessions, with background health
//! checking and idle reclamation.
//!
//! The pool is generic over a driver's session type (implement
//! [`RawSession`]) rather than tied to any particular database client. It
//! manages a synchronous, thread-safe inventory of sessions — growing on
//! demand up to `poolmax`, shrinking idle capacity back down toward
//! `poolmin` on a background cleanup cycle, and evicting anything that fails
//! a [`HealthProbe`].
//!
//! ```no_run
//! use poolkeeper::{Pool, RawSession};
//! use poolkeeper::session::DriverError;
//!
//! struct MySession;
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("example")]
//! struct MyError;
//!
//! impl DriverError for MyError {
//!     fn is_transient(&self) -> bool { false }
//! }
//!
//! impl RawSession for MySession {
//!     type Error = MyError;
//!     fn execute(&mut self, _sql: &str) -> Result<(), MyError> { Ok(()) }
//!     fn rollback(&mut self) -> Result<(), MyError> { Ok(()) }
//!     fn close(&mut self) -> Result<(), MyError> { Ok(()) }
//! }
//!
//! let pool: Pool<MySession> = Pool::builder()
//!     .connfunc(|| Ok(MySession))
//!     .poolmin(5)
//!     .poolmax(20)
//!     .build()?;
//!
//! let handle = pool.acquire_required(true, None)?;
//! drop(handle);
//! # Ok::<(), poolkeeper::Error<MyError>>(())
//! ```

mod error;
mod handle;
mod member;
mod options;
mod pool;
mod probe;
pub mod session;
mod stats;

pub use error::{Error, Result};
pub use handle::Handle;
pub use options::{ConnFunc, PoolOptions};
pub use pool::Pool;
pub use probe::HealthProbe;
pub use session::{DriverError, RawSession};
pub use stats::Stats;
