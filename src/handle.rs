//! [`Handle`]: the caller-facing object bound to one checked-out session.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::member::PoolMember;
use crate::pool::Shared;
use crate::session::RawSession;

/// A session checked out from a [`Pool`][crate::Pool].
///
/// Delegates to the underlying raw session via [`Deref`]/[`DerefMut`] for
/// everything except pool bookkeeping and [`close`][Handle::close] itself —
/// `spec.md` §9 explicitly rules out replicating Python-style dynamic
/// attribute delegation, so this is the static equivalent: call driver
/// methods directly through the handle (`handle.query(...)`) the way you
/// would through `&mut S`.
///
/// `close` returns the session to the pool rather than closing it; dropping
/// a `Handle` without calling `close` does the same thing on a best-effort
/// basis and logs a warning, since relying on `Drop` alone gives no
/// guarantee about *when* the session is returned.
pub struct Handle<S: RawSession> {
    member: Option<PoolMember<S>>,
    shared: Arc<Shared<S>>,
}

impl<S: RawSession> Handle<S> {
    pub(crate) fn new(member: PoolMember<S>, shared: Arc<Shared<S>>) -> Self {
        Self {
            member: Some(member),
            shared,
        }
    }

    /// Return this session to the pool. Idempotent: calling it twice, or
    /// dropping the handle afterwards, has no further effect.
    pub fn close(mut self) {
        self.release(false);
    }

    fn release(&mut self, from_drop: bool) {
        let Some(mut member) = self.member.take() else {
            return;
        };

        if from_drop {
            log::warn!("Handle dropped without calling close(); returning it on a best-effort basis");
        }

        if self.shared.is_closing() {
            // The pool is shutting down: close the session directly rather
            // than returning it to the free list, but still account for it
            // so Pool::close's drain wait can observe in_use reaching zero.
            member.close();
            self.shared.release_while_closing();
            return;
        }

        if let Err(e) = member.session.rollback() {
            log::debug!("error rolling back on release (ignored): {e}");
        }

        self.shared.release(member);
    }
}

impl<S: RawSession> Deref for Handle<S> {
    type Target = S;

    fn deref(&self) -> &Self::Target {
        &self.member.as_ref().expect("handle used after close").session
    }
}

impl<S: RawSession> DerefMut for Handle<S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.member.as_mut().expect("handle used after close").session
    }
}

impl<S: RawSession> Drop for Handle<S> {
    fn drop(&mut self) {
        if self.member.is_some() {
            self.release(true);
        }
    }
}
