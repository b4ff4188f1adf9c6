//! Process-wide engine configuration.
//!
//! A single setter, [`configure`], adjusts two knobs:
//!
//! - `auto_observable` - whether undeclared members are classified by shape
//!   (default true). Read at instance-creation time; reconfiguring later
//!   never re-classifies existing instances. Individual creations may
//!   override it via `Options::auto_observable`.
//! - `on_error` - the sink that receives recovered lifecycle hook faults.
//!   Default logs via `log::error!`. Last write wins, no versioning.
//!
//! State is thread-local: the engine is single-threaded and host-pumped,
//! so each UI thread carries its own configuration.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::errors::{ErrorContext, HookFault};

/// Sink receiving every recovered lifecycle hook fault.
pub type ErrorSink = Rc<dyn Fn(&HookFault, &ErrorContext)>;

/// Settings accepted by [`configure`]. `None` fields are left unchanged.
#[derive(Default)]
pub struct Config {
    pub auto_observable: Option<bool>,
    pub on_error: Option<ErrorSink>,
}

thread_local! {
    static AUTO_OBSERVABLE: Cell<bool> = const { Cell::new(true) };
    static ERROR_SINK: RefCell<Option<ErrorSink>> = const { RefCell::new(None) };
}

/// Apply configuration. Unset fields keep their current value; setting a
/// field overwrites the previous one (last write wins).
pub fn configure(config: Config) {
    if let Some(auto) = config.auto_observable {
        AUTO_OBSERVABLE.with(|c| c.set(auto));
    }
    if let Some(sink) = config.on_error {
        ERROR_SINK.with(|s| *s.borrow_mut() = Some(sink));
    }
}

/// Current process-wide default for shape-based classification.
pub fn auto_observable() -> bool {
    AUTO_OBSERVABLE.with(|c| c.get())
}

/// Restore defaults (auto-observable on, logging sink). Test hook.
pub fn reset_config() {
    AUTO_OBSERVABLE.with(|c| c.set(true));
    ERROR_SINK.with(|s| *s.borrow_mut() = None);
}

/// Route a recovered hook fault to the configured sink.
pub(crate) fn report(fault: &HookFault, context: &ErrorContext) {
    let sink = ERROR_SINK.with(|s| s.borrow().clone());
    match sink {
        Some(sink) => sink(fault, context),
        None => log::error!(
            "[viewbind] {} failed in `{}` (behavior: {}): {}",
            context.phase,
            context.entity,
            context.is_behavior,
            fault
        ),
    }
}
