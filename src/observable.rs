//! Observable wiring - the registration-time pass.
//!
//! `ObservableBuilder` is handed to a view-model's constructor. Each
//! registration does two things in one sweep: it wires the member into the
//! reactive graph (spark-signals primitives) and records the member in the
//! class shape so `finish()` can produce the `AnnotationMap`:
//!
//! ```text
//! state()     → Signal     (State: mutations invalidate dependents)
//! reference() → Ref        (Reference: identity kept, contents untracked)
//! handle()    → NodeRef    (Reference: single-slot opaque handle)
//! behavior()  → Rc<B>      (Reference + ordered BehaviorList entry)
//! computed()  → Computed   (Derived: cached, lazily recomputed)
//! action()    → Action     (Action: stable callable bound once)
//! ```
//!
//! Behaviors must be registered here, before any further wrapping: a
//! behavior is already independently reactive and must not be re-wrapped
//! as State. Each behavior's members are wired through a builder scope of
//! its own, producing a separate `AnnotationMap` per entity.

use std::cell::RefCell;
use std::rc::Rc;

use spark_signals::{Derived, Signal, derived, signal};

use crate::behavior::{Behavior, BehaviorList};
use crate::shape::{AnnotationMap, ClassShape, Role, infer_with};

/// A cached derived value.
pub type Computed<V> = Derived<V>;

/// A stably-identified callable bound to its captures at construction.
///
/// Every access observes the same underlying closure, so hosts can attach
/// and detach it as a callback without identity churn.
#[derive(Clone)]
pub struct Action {
    name: &'static str,
    f: Rc<dyn Fn()>,
}

impl Action {
    fn new(name: &'static str, f: impl Fn() + 'static) -> Self {
        Self { name, f: Rc::new(f) }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn call(&self) {
        (self.f)()
    }

    /// The bound callable itself. Clones share one allocation, so the
    /// identity is stable across accesses.
    pub fn handle(&self) -> Rc<dyn Fn()> {
        self.f.clone()
    }

    /// Identity comparison (same bound closure).
    pub fn same(&self, other: &Action) -> bool {
        Rc::ptr_eq(&self.f, &other.f)
    }
}

/// Single-slot opaque handle for host elements: exactly one `current`
/// value, attached and detached by the host. Clones share the slot, so
/// the handle's identity survives re-renders; the contents are never
/// wrapped or tracked.
pub struct NodeRef<V> {
    current: Rc<RefCell<Option<V>>>,
}

impl<V> Clone for NodeRef<V> {
    fn clone(&self) -> Self {
        Self { current: self.current.clone() }
    }
}

impl<V> Default for NodeRef<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> NodeRef<V> {
    pub fn new() -> Self {
        Self { current: Rc::new(RefCell::new(None)) }
    }

    pub fn set(&self, value: V) {
        *self.current.borrow_mut() = Some(value);
    }

    pub fn take(&self) -> Option<V> {
        self.current.borrow_mut().take()
    }

    pub fn is_attached(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Read the current value through a borrow.
    pub fn with<R>(&self, f: impl FnOnce(Option<&V>) -> R) -> R {
        f(self.current.borrow().as_ref())
    }

    /// Identity comparison (same underlying slot).
    pub fn same(&self, other: &NodeRef<V>) -> bool {
        Rc::ptr_eq(&self.current, &other.current)
    }
}

impl<V: Clone> NodeRef<V> {
    pub fn get(&self) -> Option<V> {
        self.current.borrow().clone()
    }
}

/// Identity-preserving wrapper for a member whose contents are not
/// tracked.
pub struct Ref<V> {
    value: Rc<V>,
}

impl<V> Clone for Ref<V> {
    fn clone(&self) -> Self {
        Self { value: self.value.clone() }
    }
}

impl<V> std::ops::Deref for Ref<V> {
    type Target = V;

    fn deref(&self) -> &V {
        &self.value
    }
}

impl<V> Ref<V> {
    pub fn same(&self, other: &Ref<V>) -> bool {
        Rc::ptr_eq(&self.value, &other.value)
    }
}

/// Registers and wires a view-model's members. One per instance creation;
/// consumed by `finish()`.
pub struct ObservableBuilder {
    shape: Option<ClassShape>,
    behaviors: BehaviorList,
    auto: bool,
}

impl ObservableBuilder {
    pub(crate) fn new(view_name: &'static str, auto: bool) -> Self {
        Self {
            shape: Some(ClassShape::new(view_name)),
            behaviors: BehaviorList::default(),
            auto,
        }
    }

    fn with_shape(&mut self, f: impl FnOnce(ClassShape) -> ClassShape) {
        if let Some(shape) = self.shape.take() {
            self.shape = Some(f(shape));
        }
    }

    /// Explicitly declare a member's role. Declared entries win over every
    /// inferred classification.
    pub fn declare(&mut self, name: &'static str, role: Role) {
        self.with_shape(|s| s.declare(name, role));
    }

    /// Mutable state member, wired as an observable container.
    pub fn state<V: Clone + PartialEq + 'static>(
        &mut self,
        name: &'static str,
        initial: V,
    ) -> Signal<V> {
        self.with_shape(|s| s.value(name));
        signal(initial)
    }

    /// By-reference member: identity preserved, contents untracked.
    pub fn reference<V: 'static>(&mut self, name: &'static str, value: V) -> Ref<V> {
        self.with_shape(|s| s.declare(name, Role::Reference).value(name));
        Ref { value: Rc::new(value) }
    }

    /// Single-slot opaque handle member (host element refs).
    pub fn handle<V: 'static>(&mut self, name: &'static str) -> NodeRef<V> {
        self.with_shape(|s| s.handle(name));
        NodeRef::new()
    }

    /// Embedded behavior sub-unit. The closure receives the behavior's own
    /// builder scope: its members are wired and classified into a map of
    /// its own, so a name shared with the view keeps both classifications.
    /// Appended to the ordered lifecycle list and classified Reference on
    /// the owner - never re-wrapped as State. Behaviors registered inside
    /// the scope join the lifecycle right after their parent.
    pub fn behavior<B: Behavior>(
        &mut self,
        name: &'static str,
        build: impl FnOnce(&mut ObservableBuilder) -> B,
    ) -> Rc<B> {
        self.with_shape(|s| s.behavior(name));
        let mut scope = ObservableBuilder::new(name, self.auto);
        let instance = Rc::new(build(&mut scope));
        let (annotations, nested) = scope.finish();
        self.behaviors.push(name, instance.clone(), annotations);
        self.behaviors.append(nested);
        instance
    }

    /// Cached derived value, recomputed lazily when dependencies change.
    pub fn computed<V: Clone + PartialEq + 'static>(
        &mut self,
        name: &'static str,
        compute: impl Fn() -> V + 'static,
    ) -> Computed<V> {
        self.with_shape(|s| s.accessor(name));
        derived(compute)
    }

    /// Method member: a stable callable bound once at construction.
    pub fn action(&mut self, name: &'static str, f: impl Fn() + 'static) -> Action {
        self.with_shape(|s| s.method(name));
        Action::new(name, f)
    }

    /// Callable stored directly on the instance (a callback field). Same
    /// wiring as [`action`](Self::action); classified Action, skipped by
    /// the state scan.
    pub fn callback(&mut self, name: &'static str, f: impl Fn() + 'static) -> Action {
        self.with_shape(|s| s.function(name));
        Action::new(name, f)
    }

    /// Finalize: classify the recorded shape and hand over the ordered
    /// behavior list.
    pub(crate) fn finish(mut self) -> (AnnotationMap, BehaviorList) {
        let map = match self.shape.take() {
            Some(shape) => infer_with(&shape, self.auto),
            None => AnnotationMap::default(),
        };
        (map, self.behaviors)
    }
}
