//! # viewbind
//!
//! Reactive view-model binding engine for Rust.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for
//! fine-grained reactivity.
//!
//! ## Architecture
//!
//! viewbind turns a plain stateful view-model into a reactive unit driven
//! by a rendering host. A registration-time shape pass classifies every
//! member (State / Reference / Derived / Action) and wires it into the
//! reactive graph; a phase state machine drives the mount lifecycle across
//! the view and its embedded behaviors; a two-phase props protocol keeps
//! host-supplied input current during renders while deferring reactive
//! notification until it is safe.
//!
//! ```text
//! create_view → ObservableBuilder (wiring + shape) → AnnotationMap
//!                                  └→ BehaviorList (ordered)
//! host pump:  render (silent props write)
//!             → commit_layout (behaviors, then view)
//!             → commit_mount  (behaviors, then view)
//!             → settle        (deferred props commit → notifications)
//!             → unmount       (view, then behaviors)
//! ```
//!
//! Lifecycle hook panics are recovered per entity and routed to one
//! configurable sink; sibling hooks always run. Render panics propagate
//! to the host's own error boundary unchanged.
//!
//! ## Modules
//!
//! - [`shape`] - declarative class layout and the classification pass
//! - [`observable`] - member wiring (signals, deriveds, actions, handles)
//! - [`behavior`] - composable lifecycle sub-units
//! - [`lifecycle`] - the per-instance phase state machine
//! - [`props`] - two-phase props synchronization
//! - [`config`] / [`errors`] - process-wide configuration and fault routing

pub mod behavior;
pub mod config;
pub mod errors;
pub mod lifecycle;
pub mod observable;
pub mod props;
pub mod shape;

// Re-export commonly used items
pub use behavior::{Behavior, BehaviorList};

pub use config::{Config, ErrorSink, configure, reset_config};

pub use errors::{ErrorContext, HookFault, HookPhase, ViewError};

pub use lifecycle::{
    Cleanup, Hook, Options, Phase, ViewInstance, ViewModel, create_view, create_view_with,
};

pub use observable::{Action, Computed, NodeRef, ObservableBuilder, Ref};

pub use props::{Props, PropsHandle};

pub use shape::{AnnotationMap, ClassShape, MemberKind, Role, infer, infer_with};
