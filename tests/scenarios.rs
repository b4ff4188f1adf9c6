//! End-to-end scenarios driven the way a rendering host would drive them:
//! create → render → commit_layout → commit_mount → settle → unmount.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use spark_signals::{Signal, effect, flush_sync};

use viewbind::{
    Action, Behavior, Computed, Hook, ObservableBuilder, Options, Phase, PropsHandle, Role,
    ViewError, ViewModel, create_view, create_view_with,
};

// =============================================================================
// SCENARIO A: Counter view-model
// =============================================================================

#[derive(Clone, PartialEq)]
struct CounterProps {
    initial: i64,
}

struct Counter {
    count: Signal<i64>,
    doubled: Computed<i64>,
    increment: Action,
}

impl ViewModel for Counter {
    type Props = CounterProps;
    type Output = String;

    fn create(builder: &mut ObservableBuilder, props: PropsHandle<CounterProps>) -> Self {
        let count = builder.state("count", props.peek().initial);

        let count_for_doubled = count.clone();
        let doubled = builder.computed("doubled", move || count_for_doubled.get() * 2);

        let count_for_increment = count.clone();
        let increment = builder.action("increment", move || {
            count_for_increment.set(count_for_increment.get() + 1);
        });

        Self { count, doubled, increment }
    }

    fn view(&self) -> Option<String> {
        Some(format!("count: {}", self.count.get()))
    }
}

#[test]
fn test_counter_scenario() {
    let instance = create_view::<Counter>(CounterProps { initial: 5 });

    // Prop-seeded state.
    assert_eq!(instance.model().count.get(), 5);
    assert_eq!(instance.render(CounterProps { initial: 5 }).unwrap(), "count: 5");

    instance.commit_layout();
    instance.commit_mount();
    assert_eq!(instance.phase(), Phase::Mounted);

    // Two increments through the stable action.
    instance.model().increment.call();
    instance.model().increment.call();

    assert_eq!(instance.model().count.get(), 7);
    assert_eq!(instance.model().doubled.get(), 14);
    assert_eq!(instance.render(CounterProps { initial: 5 }).unwrap(), "count: 7");
}

#[test]
fn test_counter_classification() {
    let instance = create_view::<Counter>(CounterProps { initial: 0 });
    let map = instance.annotations();
    assert_eq!(map.role("count"), Some(Role::State));
    assert_eq!(map.role("doubled"), Some(Role::Derived));
    assert_eq!(map.role("increment"), Some(Role::Action));
}

#[test]
fn test_action_identity_survives_renders() {
    let instance = create_view::<Counter>(CounterProps { initial: 0 });
    let before = instance.model().increment.handle();

    instance.render(CounterProps { initial: 0 }).unwrap();
    instance.render(CounterProps { initial: 0 }).unwrap();

    // The bound callable the host attached is still the same one.
    assert!(Rc::ptr_eq(&before, &instance.model().increment.handle()));
}

// =============================================================================
// SCENARIO B: Window-size behavior
// =============================================================================

const BREAKPOINT: u16 = 768;

thread_local! {
    static RESIZE_LISTENERS: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
    static NEXT_LISTENER_ID: Cell<usize> = const { Cell::new(0) };
}

fn add_resize_listener() -> usize {
    let id = NEXT_LISTENER_ID.with(|n| {
        let id = n.get();
        n.set(id + 1);
        id
    });
    RESIZE_LISTENERS.with(|l| l.borrow_mut().push(id));
    id
}

fn remove_resize_listener(id: usize) {
    RESIZE_LISTENERS.with(|l| l.borrow_mut().retain(|&existing| existing != id));
}

fn resize_listener_count() -> usize {
    RESIZE_LISTENERS.with(|l| l.borrow().len())
}

struct WindowSize {
    width: Signal<u16>,
    #[allow(dead_code)]
    height: Signal<u16>,
    is_mobile: Computed<bool>,
}

impl WindowSize {
    fn new(builder: &mut ObservableBuilder) -> Self {
        let width = builder.state("width", 1024_u16);
        let height = builder.state("height", 768_u16);

        let width_for_mobile = width.clone();
        let is_mobile = builder.computed("is_mobile", move || {
            width_for_mobile.get() < BREAKPOINT
        });

        Self { width, height, is_mobile }
    }
}

impl Behavior for WindowSize {
    fn on_mount(&self) -> Hook {
        let id = add_resize_listener();
        Hook::cleanup(move || remove_resize_listener(id))
    }
}

struct ResponsiveView {
    window: Rc<WindowSize>,
}

impl ViewModel for ResponsiveView {
    type Props = ();
    type Output = &'static str;

    fn create(builder: &mut ObservableBuilder, _props: PropsHandle<()>) -> Self {
        let window = builder.behavior("window", WindowSize::new);
        Self { window }
    }

    fn view(&self) -> Option<&'static str> {
        Some(if self.window.is_mobile.get() { "mobile" } else { "desktop" })
    }
}

#[test]
fn test_window_size_scenario() {
    let instance = create_view::<ResponsiveView>(());
    assert_eq!(instance.behavior_count(), 1);

    let before = resize_listener_count();
    assert_eq!(instance.render(()).unwrap(), "desktop");

    instance.commit_layout();
    assert_eq!(resize_listener_count(), before, "listener registers at mount, not layout");

    instance.commit_mount();
    assert_eq!(resize_listener_count(), before + 1);

    // Shrinking the window flips the derived value and the rendered output.
    instance.model().window.width.set(400);
    assert!(instance.model().window.is_mobile.get());
    assert_eq!(instance.render(()).unwrap(), "mobile");

    // Unmount removes the listener exactly once.
    instance.unmount();
    assert_eq!(resize_listener_count(), before);
    instance.unmount();
    assert_eq!(resize_listener_count(), before);
}

#[test]
fn test_behavior_classified_as_reference() {
    let instance = create_view::<ResponsiveView>(());
    let map = instance.annotations();
    assert_eq!(map.role("window"), Some(Role::Reference));
    // The behavior's own members went through the same pass, in a scope
    // of their own.
    let window_map = instance.behavior_annotations("window").unwrap();
    assert_eq!(window_map.role("width"), Some(Role::State));
    assert_eq!(window_map.role("is_mobile"), Some(Role::Derived));
    // Not spilled onto the view's map.
    assert!(!map.contains("width"));
}

// =============================================================================
// SCENARIO C: Missing render source
// =============================================================================

thread_local! {
    static HOOKS_RUN: Cell<u32> = const { Cell::new(0) };
}

struct NoRender;

impl ViewModel for NoRender {
    type Props = ();
    type Output = String;

    fn create(_builder: &mut ObservableBuilder, _props: PropsHandle<()>) -> Self {
        NoRender
    }

    fn on_layout_mount(&self) -> Hook {
        HOOKS_RUN.with(|h| h.set(h.get() + 1));
        Hook::None
    }

    fn on_mount(&self) -> Hook {
        HOOKS_RUN.with(|h| h.set(h.get() + 1));
        Hook::None
    }
}

#[test]
fn test_missing_render_scenario() {
    HOOKS_RUN.with(|h| h.set(0));

    let instance = create_view::<NoRender>(());
    assert_eq!(
        instance.render(()).unwrap_err(),
        ViewError::MissingRenderDefinition { view: "NoRender" }
    );

    // Mounting is aborted: no mount-phase hook ever runs.
    instance.commit_layout();
    instance.commit_mount();
    assert_eq!(instance.phase(), Phase::Created);
    assert_eq!(HOOKS_RUN.with(|h| h.get()), 0);
}

#[test]
fn test_template_rescues_renderless_model() {
    let instance = create_view_with::<NoRender>((), Options {
        template: Some(Box::new(|_vm| "templated".to_string())),
        ..Default::default()
    });
    assert_eq!(instance.render(()).unwrap(), "templated");
    instance.commit_layout();
    assert_eq!(instance.phase(), Phase::LayoutMounted);
}

// =============================================================================
// Props synchronization, host-timed
// =============================================================================

#[derive(Clone, PartialEq, Debug)]
struct LabelProps {
    label: String,
}

struct LabelView;

impl ViewModel for LabelView {
    type Props = LabelProps;
    type Output = String;

    fn create(_builder: &mut ObservableBuilder, _props: PropsHandle<LabelProps>) -> Self {
        LabelView
    }

    fn view(&self) -> Option<String> {
        None
    }
}

#[test]
fn test_props_read_currency_and_deadline() {
    let instance = Rc::new(create_view_with::<LabelView>(
        LabelProps { label: "one".into() },
        Options {
            template: Some(Box::new(|_vm| String::new())),
            ..Default::default()
        },
    ));

    let props = instance.props();

    let observed = Rc::new(RefCell::new(Vec::new()));
    let runs = Rc::new(Cell::new(0));
    let props_for_effect = props.clone();
    let observed_for_effect = observed.clone();
    let runs_for_effect = runs.clone();
    let _stop = effect(move || {
        observed_for_effect
            .borrow_mut()
            .push(props_for_effect.get().label);
        runs_for_effect.set(runs_for_effect.get() + 1);
    });
    flush_sync();
    assert_eq!(runs.get(), 1);

    // Render with new props: readable immediately, no dependent woken.
    instance.render(LabelProps { label: "two".into() }).unwrap();
    assert_eq!(props.peek().label, "two");
    flush_sync();
    assert_eq!(runs.get(), 1, "no notification during the render pass");

    // The host's post-commit step delivers the notification.
    instance.settle();
    assert_eq!(runs.get(), 2);
    assert_eq!(observed.borrow().last().unwrap(), "two");

    // Settling again without a change is silent.
    instance.settle();
    assert_eq!(runs.get(), 2);
}

#[test]
fn test_props_commit_collapses_intermediate_renders() {
    let instance = create_view_with::<LabelView>(
        LabelProps { label: "a".into() },
        Options {
            template: Some(Box::new(|_vm| String::new())),
            ..Default::default()
        },
    );

    let props = instance.props();
    let runs = Rc::new(Cell::new(0));
    let props_for_effect = props.clone();
    let runs_for_effect = runs.clone();
    let _stop = effect(move || {
        let _ = props_for_effect.get();
        runs_for_effect.set(runs_for_effect.get() + 1);
    });
    flush_sync();
    assert_eq!(runs.get(), 1);

    instance.render(LabelProps { label: "b".into() }).unwrap();
    instance.render(LabelProps { label: "c".into() }).unwrap();
    instance.settle();

    // One notification, carrying the latest value.
    assert_eq!(runs.get(), 2);
    assert_eq!(props.peek().label, "c");
}

#[test]
fn test_dependent_render_during_commit_proceeds() {
    let instance = Rc::new(create_view_with::<LabelView>(
        LabelProps { label: "a".into() },
        Options {
            template: Some(Box::new(|_vm| String::new())),
            ..Default::default()
        },
    ));

    // A dependent that re-renders synchronously whenever props commit.
    // This is the drift case: diagnosed, but the update still proceeds.
    let renders = Rc::new(Cell::new(0));
    let instance_for_effect = instance.clone();
    let renders_for_effect = renders.clone();
    let _stop = effect(move || {
        let current = instance_for_effect.props().get();
        instance_for_effect.render(current).unwrap();
        renders_for_effect.set(renders_for_effect.get() + 1);
    });
    flush_sync();
    assert_eq!(renders.get(), 1);

    instance.render(LabelProps { label: "b".into() }).unwrap();
    instance.settle();

    assert_eq!(renders.get(), 2);
    assert_eq!(instance.props().peek().label, "b");
}

// =============================================================================
// Fault isolation across a full view
// =============================================================================

struct ThrowingBehavior;

impl Behavior for ThrowingBehavior {
    fn on_mount(&self) -> Hook {
        panic!("subsystem failed to mount");
    }
}

struct CountingBehavior {
    mounts: Rc<Cell<u32>>,
    unmounts: Rc<Cell<u32>>,
}

impl Behavior for CountingBehavior {
    fn on_mount(&self) -> Hook {
        self.mounts.set(self.mounts.get() + 1);
        Hook::None
    }

    fn on_unmount(&self) {
        self.unmounts.set(self.unmounts.get() + 1);
    }
}

struct MixedView {
    view_mounts: Rc<Cell<u32>>,
    neighbor_mounts: Rc<Cell<u32>>,
    neighbor_unmounts: Rc<Cell<u32>>,
}

thread_local! {
    static MIXED_COUNTERS: RefCell<Option<(Rc<Cell<u32>>, Rc<Cell<u32>>, Rc<Cell<u32>>)>> =
        const { RefCell::new(None) };
}

impl ViewModel for MixedView {
    type Props = ();
    type Output = ();

    fn create(builder: &mut ObservableBuilder, _props: PropsHandle<()>) -> Self {
        let (view_mounts, neighbor_mounts, neighbor_unmounts) =
            MIXED_COUNTERS.with(|c| c.borrow().clone()).unwrap();

        builder.behavior("before", |_scope| CountingBehavior {
            mounts: neighbor_mounts.clone(),
            unmounts: neighbor_unmounts.clone(),
        });
        builder.behavior("broken", |_scope| ThrowingBehavior);
        builder.behavior("after", |_scope| CountingBehavior {
            mounts: neighbor_mounts.clone(),
            unmounts: neighbor_unmounts.clone(),
        });

        Self { view_mounts, neighbor_mounts, neighbor_unmounts }
    }

    fn on_mount(&self) -> Hook {
        self.view_mounts.set(self.view_mounts.get() + 1);
        Hook::None
    }

    fn view(&self) -> Option<()> {
        Some(())
    }
}

#[test]
fn test_one_broken_behavior_does_not_take_down_the_view() {
    let counters = (
        Rc::new(Cell::new(0)),
        Rc::new(Cell::new(0)),
        Rc::new(Cell::new(0)),
    );
    MIXED_COUNTERS.with(|c| *c.borrow_mut() = Some(counters.clone()));

    let reports = Rc::new(RefCell::new(Vec::new()));
    let sink_reports = reports.clone();
    viewbind::configure(viewbind::Config {
        on_error: Some(Rc::new(move |_, context| {
            sink_reports.borrow_mut().push((context.entity, context.is_behavior));
        })),
        ..Default::default()
    });

    let instance = create_view::<MixedView>(());
    instance.commit_layout();
    instance.commit_mount();

    // Both healthy behaviors and the view's own hook ran.
    assert_eq!(instance.model().neighbor_mounts.get(), 2);
    assert_eq!(instance.model().view_mounts.get(), 1);

    // Exactly one report, attributed to the behavior.
    assert_eq!(*reports.borrow(), vec![("broken", true)]);

    // Teardown is complete even for the entry that failed to mount.
    instance.unmount();
    assert_eq!(instance.model().neighbor_unmounts.get(), 2);

    viewbind::reset_config();
}
