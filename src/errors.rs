//! Error taxonomy and the hook isolation point.
//!
//! Two kinds of failure flow through here:
//!
//! - **Engine errors** ([`ViewError`]) - returned from fallible operations
//!   like `render()`. These are the host's problem to handle.
//! - **Hook faults** ([`HookFault`]) - panics recovered from lifecycle hooks.
//!   These never escape: [`guard`] catches them at the call site, reports
//!   them through the configured sink with a full [`ErrorContext`], and
//!   execution of sibling hooks continues.
//!
//! Render panics are deliberately NOT caught - they propagate to the host's
//! own error boundary unchanged.

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use thiserror::Error;

use crate::config;

/// Which lifecycle hook an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    Create,
    LayoutMount,
    Mount,
    Unmount,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HookPhase::Create => "on_create",
            HookPhase::LayoutMount => "on_layout_mount",
            HookPhase::Mount => "on_mount",
            HookPhase::Unmount => "on_unmount",
        };
        f.write_str(name)
    }
}

/// Where a recovered hook fault happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// The lifecycle hook that faulted.
    pub phase: HookPhase,
    /// View type name, or the behavior's registered member name.
    pub entity: &'static str,
    /// True when the faulting hook belongs to a behavior, not the view.
    pub is_behavior: bool,
}

/// Payload recovered from a lifecycle hook panic.
#[derive(Debug, Error)]
#[error("lifecycle hook panicked: {message}")]
pub struct HookFault {
    pub message: String,
}

impl HookFault {
    fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self { message }
    }
}

/// Errors returned to the host from engine operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    /// Neither a render template nor a `view()` method is available.
    /// Fatal for the instance: mounting is aborted.
    #[error("`{view}` has no render source: provide a template or implement `view()`")]
    MissingRenderDefinition { view: &'static str },

    /// `render()` was called after the instance reached `Unmounted`.
    #[error("render is not permitted after unmount")]
    RenderAfterUnmount,
}

/// Run a lifecycle hook with fault isolation.
///
/// Returns `Some(value)` on success. On panic the fault is reported through
/// the configured sink and `None` is returned; the caller moves on to the
/// next entry. This is the only place hook panics are recovered.
pub(crate) fn guard<T>(
    phase: HookPhase,
    entity: &'static str,
    is_behavior: bool,
    hook: impl FnOnce() -> T,
) -> Option<T> {
    match catch_unwind(AssertUnwindSafe(hook)) {
        Ok(value) => Some(value),
        Err(payload) => {
            let fault = HookFault::from_panic(payload);
            let context = ErrorContext { phase, entity, is_behavior };
            config::report(&fault, &context);
            None
        }
    }
}

/// Strip the module path from a type name for error contexts.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
