//! Lifecycle Controller - the per-instance phase state machine.
//!
//! ```text
//! Created → LayoutMounted → Mounted → Unmounted (terminal)
//! ```
//!
//! The host drives every transition from its render/commit/paint pump:
//!
//! 1. `create_view` - model constructed, members wired and classified,
//!    behaviors collected, `on_create` run exactly once before the first
//!    render.
//! 2. `render(props)` - silent props write, then the template or the
//!    model's `view()`. Permitted in every phase except `Unmounted`.
//! 3. `commit_layout()` - host pre-paint signal: behaviors'
//!    `on_layout_mount` in registration order, then the view's own.
//! 4. `commit_mount()` - host post-paint signal: same shape for `on_mount`.
//! 5. `settle()` - deferred props commit; call after each render settles.
//! 6. `unmount()` - view cleanups and `on_unmount` first, then each
//!    behavior's teardown (asymmetric order, preserved as observed).
//!
//! Every hook runs synchronously and may hand back a cleanup. A hook that
//! tries to return deferred work ([`Hook::Pending`]) is diagnosed and its
//! return ignored - cleanup timing would otherwise be undefined. Hook
//! panics are recovered and reported per entity; render panics propagate
//! to the host's own error boundary unchanged.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use crate::behavior::BehaviorList;
use crate::config;
use crate::errors::{HookPhase, ViewError, guard, short_type_name};
use crate::observable::{NodeRef, ObservableBuilder};
use crate::props::{Props, PropsContainer, PropsHandle};
use crate::shape::AnnotationMap;

/// Teardown callback captured from a mount-phase hook.
pub type Cleanup = Box<dyn FnOnce()>;

/// What a lifecycle hook hands back.
pub enum Hook {
    /// Nothing to tear down.
    None,
    /// Run this at unmount.
    Cleanup(Cleanup),
    /// A hook tried to return unfinished async work. Diagnosed, ignored.
    Pending,
}

impl Hook {
    /// Capture a cleanup to run at unmount.
    pub fn cleanup(f: impl FnOnce() + 'static) -> Hook {
        Hook::Cleanup(Box::new(f))
    }

    /// Marks the hook as having produced deferred work. The future is
    /// dropped, never awaited; the lifecycle reports the misuse and
    /// captures no cleanup.
    pub fn deferred(future: impl Future<Output = ()>) -> Hook {
        drop(future);
        Hook::Pending
    }

    pub(crate) fn into_cleanup(self, phase: HookPhase, entity: &'static str) -> Option<Cleanup> {
        match self {
            Hook::None => None,
            Hook::Cleanup(cleanup) => Some(cleanup),
            Hook::Pending => {
                log::warn!(
                    "[viewbind] {phase} in `{entity}` returned deferred work; \
                     lifecycle hooks must complete synchronously, return ignored"
                );
                None
            }
        }
    }
}

/// Point in the lifecycle state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Created,
    LayoutMounted,
    Mounted,
    Unmounted,
}

/// A reactive view-model. Implementors wire their members through the
/// [`ObservableBuilder`] in `create` and may override any of the
/// lifecycle hooks and the render source.
pub trait ViewModel: 'static {
    /// Externally-supplied input, synchronized by the props protocol.
    type Props: Props;
    /// What a render pass produces; consumed by the host.
    type Output;

    /// Construct the model, wiring members into the reactive graph.
    /// Props are readable directly here via the handle.
    fn create(builder: &mut ObservableBuilder, props: PropsHandle<Self::Props>) -> Self
    where
        Self: Sized;

    /// Runs exactly once, synchronously, before the first render.
    fn on_create(&self) {}

    /// Host pre-paint commit. May return a cleanup.
    fn on_layout_mount(&self) -> Hook {
        Hook::None
    }

    /// Host post-paint commit. May return a cleanup.
    fn on_mount(&self) -> Hook {
        Hook::None
    }

    /// Host teardown, after the captured cleanups have run.
    fn on_unmount(&self) {}

    /// Render source. `None` means the model has no render method of its
    /// own; a template must then be supplied at creation, otherwise the
    /// first render fails with `MissingRenderDefinition`.
    fn view(&self) -> Option<Self::Output> {
        None
    }
}

/// Per-creation options.
pub struct Options<VM: ViewModel> {
    /// Render template taking the instance; overrides the model's own
    /// `view()` when present.
    pub template: Option<Box<dyn Fn(&VM) -> VM::Output>>,
    /// Local override of the process-wide auto-observable mode.
    pub auto_observable: Option<bool>,
    /// Forwarded handle: attached to the model at creation, cleared at
    /// unmount, for parent ref exposure.
    pub forward: Option<NodeRef<Rc<VM>>>,
}

impl<VM: ViewModel> Default for Options<VM> {
    fn default() -> Self {
        Self {
            template: None,
            auto_observable: None,
            forward: None,
        }
    }
}

/// One mounted occurrence of a view-model. Owns the phase; the identity
/// lifetime belongs to the host.
pub struct ViewInstance<VM: ViewModel> {
    vm: Rc<VM>,
    name: &'static str,
    phase: Cell<Phase>,
    props: Rc<PropsContainer<VM::Props>>,
    annotations: AnnotationMap,
    behaviors: RefCell<BehaviorList>,
    template: Option<Box<dyn Fn(&VM) -> VM::Output>>,
    layout_cleanup: RefCell<Option<Cleanup>>,
    mount_cleanup: RefCell<Option<Cleanup>>,
    forward: Option<NodeRef<Rc<VM>>>,
    /// Set while the deferred props commit runs; a render arriving then
    /// is the drift diagnostic.
    in_commit: Cell<bool>,
    /// First render failed fatally; mounting is aborted.
    render_failed: Cell<bool>,
}

/// Create an instance with default options.
pub fn create_view<VM: ViewModel>(props: VM::Props) -> ViewInstance<VM> {
    create_view_with(props, Options::default())
}

/// Create an instance: wire members, collect behaviors, classify the
/// shape, attach the forwarded handle, and run `on_create`.
pub fn create_view_with<VM: ViewModel>(
    props: VM::Props,
    options: Options<VM>,
) -> ViewInstance<VM> {
    let name = short_type_name::<VM>();
    let auto = options.auto_observable.unwrap_or_else(config::auto_observable);

    let container = Rc::new(PropsContainer::new(props));
    let mut builder = ObservableBuilder::new(name, auto);
    let vm = Rc::new(VM::create(&mut builder, PropsHandle::new(container.clone())));
    let (annotations, behaviors) = builder.finish();

    if let Some(forward) = &options.forward {
        forward.set(vm.clone());
    }

    // Exactly once, before the first render. Props are readable directly
    // at this point; nothing is routed through notification yet.
    {
        let vm = vm.clone();
        guard(HookPhase::Create, name, false, move || vm.on_create());
    }

    ViewInstance {
        vm,
        name,
        phase: Cell::new(Phase::Created),
        props: container,
        annotations,
        behaviors: RefCell::new(behaviors),
        template: options.template,
        layout_cleanup: RefCell::new(None),
        mount_cleanup: RefCell::new(None),
        forward: options.forward,
        in_commit: Cell::new(false),
        render_failed: Cell::new(false),
    }
}

impl<VM: ViewModel> ViewInstance<VM> {
    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    /// The classification computed at creation. Never mutated.
    pub fn annotations(&self) -> &AnnotationMap {
        &self.annotations
    }

    pub fn model(&self) -> &VM {
        &self.vm
    }

    /// Accessor for the live props container.
    pub fn props(&self) -> PropsHandle<VM::Props> {
        PropsHandle::new(self.props.clone())
    }

    pub fn behavior_count(&self) -> usize {
        self.behaviors.borrow().len()
    }

    /// Classification of a registered behavior's own members, computed in
    /// its builder scope at creation. Separate from [`annotations`](Self::annotations).
    pub fn behavior_annotations(&self, name: &str) -> Option<AnnotationMap> {
        self.behaviors.borrow().annotations(name).cloned()
    }

    /// Host render invocation. Writes the new props silently (readable
    /// immediately, no dependent woken) and evaluates the render source.
    ///
    /// Render panics are not caught here; they belong to the host's error
    /// boundary.
    pub fn render(&self, props: VM::Props) -> Result<VM::Output, ViewError> {
        if self.phase.get() == Phase::Unmounted {
            return Err(ViewError::RenderAfterUnmount);
        }
        if self.in_commit.get() {
            log::warn!(
                "[viewbind] props commit for `{}` re-entered render synchronously; \
                 this is usually better expressed as a derived value",
                self.name
            );
        }

        self.props.write_shadow(props);

        let output = match &self.template {
            Some(template) => Some(template(&self.vm)),
            None => self.vm.view(),
        };
        match output {
            Some(output) => Ok(output),
            None => {
                self.render_failed.set(true);
                Err(ViewError::MissingRenderDefinition { view: self.name })
            }
        }
    }

    /// Host pre-paint commit signal: `Created → LayoutMounted`.
    ///
    /// Behaviors run their `on_layout_mount` first, in registration order,
    /// then the view's own; every hook is fault-isolated and a faulting
    /// one contributes no cleanup.
    pub fn commit_layout(&self) {
        if self.phase.get() != Phase::Created || self.render_failed.get() {
            return;
        }
        self.settle();

        self.behaviors.borrow_mut().layout_mount();

        let vm = self.vm.clone();
        *self.layout_cleanup.borrow_mut() =
            guard(HookPhase::LayoutMount, self.name, false, move || {
                vm.on_layout_mount()
            })
            .and_then(|hook| hook.into_cleanup(HookPhase::LayoutMount, self.name));

        self.phase.set(Phase::LayoutMounted);
    }

    /// Host post-paint signal: `LayoutMounted → Mounted`.
    pub fn commit_mount(&self) {
        if self.phase.get() != Phase::LayoutMounted {
            return;
        }
        self.settle();

        self.behaviors.borrow_mut().mount();

        let vm = self.vm.clone();
        *self.mount_cleanup.borrow_mut() =
            guard(HookPhase::Mount, self.name, false, move || vm.on_mount())
                .and_then(|hook| hook.into_cleanup(HookPhase::Mount, self.name));

        self.phase.set(Phase::Mounted);
    }

    /// Deferred props commit: promote the shadow value through the
    /// reactive write path if it changed. Call at the host's post-commit
    /// timing, after the render pass has fully ended.
    pub fn settle(&self) {
        if self.phase.get() == Phase::Unmounted {
            return;
        }

        // The flag must clear even when a dependent panics during the
        // flush (render panics propagate), or every later render would be
        // misdiagnosed as drift.
        struct ClearFlag<'a>(&'a Cell<bool>);
        impl Drop for ClearFlag<'_> {
            fn drop(&mut self) {
                self.0.set(false);
            }
        }

        self.in_commit.set(true);
        let _clear = ClearFlag(&self.in_commit);
        if self.props.commit() {
            // Drain scheduled reactions now so dependents observe the
            // change within this paint-adjacent step.
            spark_signals::flush_sync();
        }
    }

    /// Host teardown: run the full cleanup chain and reach the terminal
    /// phase. Always runs regardless of earlier hook faults (a failed
    /// hook simply contributed no cleanup). Idempotent.
    ///
    /// Order: view layout cleanup, view mount cleanup, view `on_unmount`,
    /// then each behavior's teardown in registration order.
    pub fn unmount(&self) {
        if self.phase.get() == Phase::Unmounted {
            return;
        }

        if let Some(cleanup) = self.layout_cleanup.borrow_mut().take() {
            guard(HookPhase::Unmount, self.name, false, cleanup);
        }
        if let Some(cleanup) = self.mount_cleanup.borrow_mut().take() {
            guard(HookPhase::Unmount, self.name, false, cleanup);
        }
        {
            let vm = self.vm.clone();
            guard(HookPhase::Unmount, self.name, false, move || vm.on_unmount());
        }

        self.behaviors.borrow_mut().unmount();

        if let Some(forward) = &self.forward {
            let _ = forward.take();
        }

        self.phase.set(Phase::Unmounted);
    }
}

impl<VM: ViewModel> Drop for ViewInstance<VM> {
    fn drop(&mut self) {
        // Host discarding the instance without an explicit unmount still
        // gets the full cleanup chain.
        self.unmount();
    }
}
