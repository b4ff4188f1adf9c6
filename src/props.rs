//! Props Synchronization - two-phase input updates.
//!
//! The host forbids waking other components' reactions while this
//! component's render pass is in progress, yet `props` must read as current
//! during that very render. The container therefore keeps two values:
//!
//! - **shadow** - always the most recent host-supplied value. Written
//!   silently on every render invocation, bypassing the reactive path.
//! - **committed** - a `spark_signals::Signal` holding the last value that
//!   went through the real write path. Promoted from shadow at the host's
//!   post-commit timing, and only when the value actually changed.
//!
//! Committed never leads shadow in recency. Reads during a render see the
//! shadow value immediately; dependents are notified at the commit, which
//! lands no later than the next paint-adjacent phase. The commit is one
//! `Signal::set` of the whole snapshot, so dependents never observe a
//! partially-updated value.

use std::cell::RefCell;
use std::rc::Rc;

use spark_signals::{Signal, signal};

/// Requirements on a props value: cloneable snapshot with a field-by-field
/// (shallow) equality, usually `#[derive(Clone, PartialEq)]`.
pub trait Props: Clone + PartialEq + 'static {}

impl<T: Clone + PartialEq + 'static> Props for T {}

/// Double-buffered props storage. One per view instance.
pub struct PropsContainer<P: Props> {
    shadow: RefCell<P>,
    committed: Signal<P>,
    /// Mirror of the last committed value for the change test, read
    /// without touching the reactive graph.
    last_committed: RefCell<P>,
}

impl<P: Props> PropsContainer<P> {
    pub(crate) fn new(initial: P) -> Self {
        Self {
            shadow: RefCell::new(initial.clone()),
            committed: signal(initial.clone()),
            last_committed: RefCell::new(initial),
        }
    }

    /// Phase 1: silent write. Called on every render invocation with the
    /// newly supplied value. No dependent is woken.
    pub(crate) fn write_shadow(&self, next: P) {
        *self.shadow.borrow_mut() = next;
    }

    /// Current value, tracked: reading inside an effect or derived
    /// subscribes it to future commits, while the value returned is the
    /// most recent one the host supplied - even before that commit runs.
    pub fn get(&self) -> P {
        let _ = self.committed.get();
        self.shadow.borrow().clone()
    }

    /// Current value without registering a dependency.
    pub fn peek(&self) -> P {
        self.shadow.borrow().clone()
    }

    /// Phase 2: deferred commit. Promotes shadow to committed through the
    /// reactive write path if it differs from the last committed value.
    /// Returns whether a write happened.
    pub(crate) fn commit(&self) -> bool {
        let next = self.shadow.borrow().clone();
        if next == *self.last_committed.borrow() {
            return false;
        }
        *self.last_committed.borrow_mut() = next.clone();
        self.committed.set(next);
        true
    }
}

/// Explicit accessor handed to the view-model at construction. Cloneable;
/// all clones read the same container.
pub struct PropsHandle<P: Props> {
    container: Rc<PropsContainer<P>>,
}

impl<P: Props> Clone for PropsHandle<P> {
    fn clone(&self) -> Self {
        Self { container: self.container.clone() }
    }
}

impl<P: Props> PropsHandle<P> {
    pub(crate) fn new(container: Rc<PropsContainer<P>>) -> Self {
        Self { container }
    }

    /// Most recent host-supplied value; tracked.
    pub fn get(&self) -> P {
        self.container.get()
    }

    /// Most recent host-supplied value; untracked.
    pub fn peek(&self) -> P {
        self.container.peek()
    }
}
