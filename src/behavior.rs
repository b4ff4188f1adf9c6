//! Behavior Registry - composable lifecycle sub-units.
//!
//! A behavior is an independently reactive sub-unit embedded in a view
//! (a window-size tracker, a timer, a subscription). Behaviors are
//! registered in declaration order via `ObservableBuilder::behavior` and
//! participate in the owning view's lifecycle:
//!
//! - at layout-mount and mount, every behavior's hook runs *before* the
//!   view's own hook of that phase;
//! - at unmount, the view's own cleanup chain runs first, then each
//!   behavior's in registration order: layout cleanup → mount cleanup →
//!   `on_unmount`.
//!
//! Every hook and cleanup call is individually fault-isolated: a panic in
//! one entry is reported (`is_behavior = true`) and the remaining entries
//! still run. A faulted mount hook simply contributes no cleanup; its
//! `on_unmount` still runs at teardown.

use std::rc::Rc;

use crate::errors::{HookPhase, guard};
use crate::lifecycle::{Cleanup, Hook};
use crate::shape::AnnotationMap;

/// A lifecycle-participating sub-unit. All hooks default to no-ops; mount
/// hooks may hand back a cleanup via [`Hook::cleanup`].
///
/// Behaviors are shape-inferred and wired like views (their members go
/// through an `ObservableBuilder` scope of their own), minus props.
pub trait Behavior: 'static {
    fn on_layout_mount(&self) -> Hook {
        Hook::None
    }

    fn on_mount(&self) -> Hook {
        Hook::None
    }

    fn on_unmount(&self) {}
}

/// One registered behavior with its captured cleanups.
pub(crate) struct BehaviorEntry {
    /// Member name the behavior was registered under on the view.
    name: &'static str,
    instance: Rc<dyn Behavior>,
    /// Classification of the behavior's own members, computed in its
    /// builder scope. Independent of the owning view's map.
    annotations: AnnotationMap,
    layout_cleanup: Option<Cleanup>,
    cleanup: Option<Cleanup>,
}

/// Ordered behavior list, fixed once the view is created.
///
/// The ordering is explicit: entries are appended at registration time,
/// never discovered by iterating a map.
#[derive(Default)]
pub struct BehaviorList {
    entries: Vec<BehaviorEntry>,
}

impl BehaviorList {
    pub(crate) fn push(
        &mut self,
        name: &'static str,
        instance: Rc<dyn Behavior>,
        annotations: AnnotationMap,
    ) {
        self.entries.push(BehaviorEntry {
            name,
            instance,
            annotations,
            layout_cleanup: None,
            cleanup: None,
        });
    }

    /// Splice another list's entries in after the current ones (behaviors
    /// registered inside a behavior's builder scope).
    pub(crate) fn append(&mut self, mut other: BehaviorList) {
        self.entries.append(&mut other.entries);
    }

    /// Classification map for a registered behavior's own members.
    pub fn annotations(&self, name: &str) -> Option<&AnnotationMap> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.annotations)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered member names, in order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.name)
    }

    /// Run every behavior's `on_layout_mount`, capturing cleanups.
    pub(crate) fn layout_mount(&mut self) {
        for entry in &mut self.entries {
            let instance = entry.instance.clone();
            entry.layout_cleanup =
                guard(HookPhase::LayoutMount, entry.name, true, move || {
                    instance.on_layout_mount()
                })
                .and_then(|hook| hook.into_cleanup(HookPhase::LayoutMount, entry.name));
        }
    }

    /// Run every behavior's `on_mount`, capturing cleanups.
    pub(crate) fn mount(&mut self) {
        for entry in &mut self.entries {
            let instance = entry.instance.clone();
            entry.cleanup = guard(HookPhase::Mount, entry.name, true, move || {
                instance.on_mount()
            })
            .and_then(|hook| hook.into_cleanup(HookPhase::Mount, entry.name));
        }
    }

    /// Tear every behavior down in registration order. Each step is
    /// isolated, so one faulting cleanup never skips the next.
    pub(crate) fn unmount(&mut self) {
        for entry in &mut self.entries {
            if let Some(cleanup) = entry.layout_cleanup.take() {
                guard(HookPhase::Unmount, entry.name, true, cleanup);
            }
            if let Some(cleanup) = entry.cleanup.take() {
                guard(HookPhase::Unmount, entry.name, true, cleanup);
            }
            let instance = entry.instance.clone();
            guard(HookPhase::Unmount, entry.name, true, move || {
                instance.on_unmount()
            });
        }
    }
}
