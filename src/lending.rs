//! Reference-counted lending of lazily allocated resources.
//!
//! A [`Lendable`] owns a resource that is allocated on the first [`Lendable::lease`] and
//! deallocated exactly once, when no [`Lease`] is outstanding and the owner is done with it.
//! "Done" is either explicit ([`Lendable::dispose`], or dropping the lendable) or implied from the
//! start for [`Lendable::transient`] resources, which are released as soon as the last lease is
//! returned.
//!
//! Everything here is single-threaded (`Rc`/`RefCell`); a frame's graph is evaluated on one
//! thread.

use std::{cell::RefCell, fmt, ops::Deref, rc::Rc};

use crate::foundation::error::ChainResult;

/// A resource that can be allocated on demand and released once.
pub trait Lend {
    /// Handle handed out to lease holders.
    type Value: Clone;

    /// Produce the value. Called on the first lease after construction (or after a transient
    /// release).
    fn allocate(&mut self) -> ChainResult<Self::Value>;

    /// Release the value. Called exactly once per successful [`Lend::allocate`].
    fn deallocate(&mut self, value: Self::Value);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ReleasePolicy {
    OnDispose,
    OnLastLease,
}

struct Slot<R: Lend> {
    resource: R,
    value: Option<R::Value>,
    leases: usize,
    policy: ReleasePolicy,
    disposed: bool,
}

impl<R: Lend> Slot<R> {
    fn release_value(&mut self) {
        if let Some(value) = self.value.take() {
            self.resource.deallocate(value);
        }
    }

    fn done(&self) -> bool {
        self.disposed || self.policy == ReleasePolicy::OnLastLease
    }
}

trait ReturnLease {
    fn return_lease(&self);
}

impl<R: Lend> ReturnLease for RefCell<Slot<R>> {
    fn return_lease(&self) {
        let mut slot = self.borrow_mut();
        slot.leases = slot.leases.saturating_sub(1);
        if slot.leases == 0 && slot.done() {
            slot.release_value();
        }
    }
}

/// Owner side of a lent resource.
pub struct Lendable<R: Lend + 'static> {
    slot: Rc<RefCell<Slot<R>>>,
}

impl<R: Lend + 'static> Lendable<R> {
    /// A resource released once the owner disposes it and every lease has been returned.
    pub fn new(resource: R) -> Self {
        Self::with_policy(resource, ReleasePolicy::OnDispose)
    }

    /// A resource released whenever its lease count drops back to zero.
    pub fn transient(resource: R) -> Self {
        Self::with_policy(resource, ReleasePolicy::OnLastLease)
    }

    fn with_policy(resource: R, policy: ReleasePolicy) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Slot {
                resource,
                value: None,
                leases: 0,
                policy,
                disposed: false,
            })),
        }
    }

    /// Borrow the resource, allocating it first if needed.
    ///
    /// # Panics
    ///
    /// Panics with a contract violation when the lendable has been disposed.
    pub fn lease(&self) -> ChainResult<Lease<R::Value>> {
        let value = {
            let mut guard = self.slot.borrow_mut();
            let slot = &mut *guard;
            assert!(
                !slot.disposed,
                "contract violation: lease requested on a disposed resource"
            );
            let value = match slot.value.clone() {
                Some(value) => value,
                None => {
                    let value = slot.resource.allocate()?;
                    slot.value = Some(value.clone());
                    value
                }
            };
            slot.leases += 1;
            value
        };
        let slot: Rc<dyn ReturnLease> = self.slot.clone();
        Ok(Lease { value, slot })
    }

    /// Signal that the owner is done. Deallocates now if no lease is outstanding, otherwise when
    /// the last lease is returned. Calling it again is a no-op.
    pub fn dispose(&self) {
        let mut slot = self.slot.borrow_mut();
        if slot.disposed {
            return;
        }
        slot.disposed = true;
        if slot.leases == 0 {
            slot.release_value();
        }
    }

    /// `false` once disposed.
    pub fn is_valid(&self) -> bool {
        !self.slot.borrow().disposed
    }

    /// Number of leases currently outstanding.
    pub fn outstanding_leases(&self) -> usize {
        self.slot.borrow().leases
    }

    /// Whether the resource currently holds an allocated value.
    pub fn is_allocated(&self) -> bool {
        self.slot.borrow().value.is_some()
    }
}

impl<R: Lend + 'static> Drop for Lendable<R> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<R: Lend + 'static> fmt::Debug for Lendable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.borrow();
        f.debug_struct("Lendable")
            .field("leases", &slot.leases)
            .field("allocated", &slot.value.is_some())
            .field("disposed", &slot.disposed)
            .finish()
    }
}

/// Borrower side: keeps the lent value alive until dropped.
pub struct Lease<T> {
    value: T,
    slot: Rc<dyn ReturnLease>,
}

impl<T> Lease<T> {
    /// The lent value.
    pub fn value(&self) -> &T {
        &self.value
    }
}

impl<T> Deref for Lease<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> Drop for Lease<T> {
    fn drop(&mut self) {
        self.slot.return_lease();
    }
}

impl<T: fmt::Debug> fmt::Debug for Lease<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Lease").field(&self.value).finish()
    }
}

#[cfg(test)]
#[path = "../tests/unit/lending.rs"]
mod tests;
