//! Test lifecycle
//!
//! A [`Test`] is a static definition: a name, a body and a timeout. Each
//! invocation creates a fresh [`RunContext`] that walks the state machine
//! `Running -> Decided -> Finished`:
//!
//! - a synchronous test (zero timeout) passes when its body returns `Ok`;
//! - an asynchronous test must call [`RunContext::pass`] or
//!   [`RunContext::fail`] before its timer fires;
//! - a body returning `Err` or panicking fails the test, even after an
//!   explicit pass;
//! - a passed test finishes once its body has returned and every child it
//!   created has finished, a failed test finishes immediately.
//!
//! Once finished, a context drops every further emission. Child status
//! signals bubble up through their parent with the child id prepended to
//! the path, so a root listener sees the whole tree.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, trace};

use super::events::{Emitter, EventBus, Listener, TestEvent};
use crate::models::{StatusSignal, TestError};

/// Body of a test
pub type TestBody = dyn Fn(&RunContext) -> Result<(), TestError>;

/// Identifier of a child within its parent, never reused
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChildId(usize);

impl ChildId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ChildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle phase of a single invocation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Running,
    /// Result decided, possibly waiting for children
    Decided,
    Finished,
}

struct TestDef {
    name: String,
    body: Rc<TestBody>,
    timeout: Cell<Duration>,
    events: EventBus,
    runs: RefCell<Vec<Weak<RefCell<RunState>>>>,
}

/// A named unit of work
#[derive(Clone)]
pub struct Test {
    def: Rc<TestDef>,
}

impl Test {
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&RunContext) -> Result<(), TestError> + 'static,
    {
        Self {
            def: Rc::new(TestDef {
                name: name.into(),
                body: Rc::new(body),
                timeout: Cell::new(Duration::ZERO),
                events: EventBus::new(),
                runs: RefCell::new(Vec::new()),
            }),
        }
    }

    /// A test whose body does nothing
    pub fn noop(name: impl Into<String>) -> Self {
        Self::new(name, |_| Ok(()))
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn timeout(&self) -> Duration {
        self.def.timeout.get()
    }

    /// Make the test asynchronous; zero makes it synchronous again
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.def.timeout.set(timeout);
        self
    }

    pub fn is_async(&self) -> bool {
        !self.timeout().is_zero()
    }

    /// Listeners currently subscribed to this test
    pub fn listener_count(&self) -> usize {
        self.def.events.listener_count()
    }

    /// Invoke the test.
    ///
    /// Asynchronous tests arm a `spawn_local` timer, so they must be run
    /// from within a `tokio::task::LocalSet`.
    pub fn run(&self) -> RunContext {
        let body = self.def.body.clone();
        self.invoke(body.as_ref(), self.timeout())
    }

    /// Run with a no-op body; always passes
    pub fn skip(&self) -> RunContext {
        debug!(test = %self.name(), "skipping");
        self.invoke(
            &|_: &RunContext| -> Result<(), TestError> { Ok(()) },
            Duration::ZERO,
        )
    }

    fn invoke(&self, body: &TestBody, timeout: Duration) -> RunContext {
        let ctx = RunContext::new(self.clone());
        {
            let mut runs = self.def.runs.borrow_mut();
            runs.retain(|run| run.strong_count() > 0);
            runs.push(Rc::downgrade(&ctx.state));
        }

        debug!(test = %self.name(), timeout_ms = timeout.as_millis() as u64, "running");
        ctx.emit_status(StatusSignal::running(self.name()));

        if !timeout.is_zero() {
            ctx.arm_timer(timeout);
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(&ctx)));
        ctx.state.borrow_mut().in_body = false;

        match outcome {
            Ok(Ok(())) if timeout.is_zero() && ctx.phase() == Phase::Running => ctx.pass(),
            Ok(Ok(())) if ctx.phase() == Phase::Running => {
                trace!(test = %self.name(), "awaiting explicit result")
            }
            Ok(Ok(())) => ctx.finish_if_settled(),
            Ok(Err(error)) => ctx.fail(error),
            Err(payload) => ctx.fail(TestError::from_panic(payload)),
        }

        ctx
    }

    /// Release every unfinished run of this test and stop forwarding its
    /// events
    fn abandon_runs(&self) {
        self.def.events.clear();
        let runs = mem::take(&mut *self.def.runs.borrow_mut());
        for state in runs.iter().filter_map(Weak::upgrade) {
            RunContext {
                test: self.clone(),
                state,
            }
            .abandon();
        }
    }
}

impl Emitter for Test {
    fn subscribe(&self, listener: Listener) {
        self.def.events.subscribe(listener);
    }

    fn emit(&self, event: &TestEvent) {
        self.def.events.emit(event);
    }
}

impl fmt::Debug for Test {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Test")
            .field("name", &self.def.name)
            .field("timeout", &self.timeout())
            .field("events", &self.def.events)
            .finish()
    }
}

struct RunState {
    phase: Phase,
    next_child: usize,
    open_children: BTreeMap<ChildId, Test>,
    timer: Option<JoinHandle<()>>,
    in_body: bool,
}

/// Live state of one invocation of a [`Test`]
///
/// Cheap to clone; asynchronous bodies keep a clone to resolve the test
/// later.
#[derive(Clone)]
pub struct RunContext {
    test: Test,
    state: Rc<RefCell<RunState>>,
}

impl RunContext {
    fn new(test: Test) -> Self {
        Self {
            test,
            state: Rc::new(RefCell::new(RunState {
                phase: Phase::Running,
                next_child: 0,
                open_children: BTreeMap::new(),
                timer: None,
                in_body: true,
            })),
        }
    }

    pub fn name(&self) -> &str {
        self.test.name()
    }

    /// The definition this context is running
    pub fn definition(&self) -> &Test {
        &self.test
    }

    /// True when both handles refer to the same invocation
    pub fn same_run(&self, other: &RunContext) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    pub fn phase(&self) -> Phase {
        self.state.borrow().phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase() == Phase::Finished
    }

    /// Children created but not yet finished
    pub fn open_children(&self) -> usize {
        self.state.borrow().open_children.len()
    }

    /// Decide that the test passed. It finishes once the body has returned
    /// and no children remain open.
    pub fn pass(&self) {
        if !self.decide() {
            debug!(test = %self.name(), "ignoring pass after decision");
            return;
        }

        self.emit_status(StatusSignal::passed(self.name()));
        self.finish_if_settled();
    }

    /// Fail the test and finish without waiting for children. Overrides an
    /// earlier pass as long as the test has not finished.
    pub fn fail(&self, error: impl Into<TestError>) {
        let error = error.into();
        {
            let mut state = self.state.borrow_mut();
            if state.phase == Phase::Finished {
                debug!(test = %self.name(), %error, "ignoring failure after finish");
                return;
            }
            state.phase = Phase::Decided;
        }

        debug!(test = %self.name(), %error, "failed");
        self.emit_status(StatusSignal::failed(self.name(), error));
        self.finish();
    }

    /// Create a child test. The caller decides when to run it.
    pub fn child<F>(&self, name: impl Into<String>, body: F) -> Test
    where
        F: Fn(&RunContext) -> Result<(), TestError> + 'static,
    {
        let child = Test::new(name, body);
        self.adopt(&child);
        child
    }

    /// Register `child` under the next child id and forward its events
    pub fn adopt(&self, child: &Test) -> ChildId {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = ChildId(state.next_child);
            state.next_child += 1;
            if state.phase != Phase::Finished {
                state.open_children.insert(id, child.clone());
            }
            id
        };

        trace!(parent = %self.name(), child = %child.name(), %id, "adopted child");

        let parent = self.clone();
        child.subscribe(Rc::new(move |event: &TestEvent| match event {
            TestEvent::Status(signal) => {
                parent.emit_status(signal.clone().prefixed(id.index()));
            }
            TestEvent::Finished => parent.child_finished(id),
        }));

        id
    }

    /// Give up on an unfinished run without emitting `finished`.
    ///
    /// Cancels the timer, drops every later emission and releases the
    /// children still open anywhere below this run.
    pub fn abandon(&self) {
        let (timer, children) = {
            let mut state = self.state.borrow_mut();
            if state.phase == Phase::Finished {
                return;
            }
            state.phase = Phase::Finished;
            (state.timer.take(), mem::take(&mut state.open_children))
        };

        if let Some(timer) = timer {
            timer.abort();
        }
        debug!(test = %self.name(), open = children.len(), "abandoned");
        for child in children.into_values() {
            child.abandon_runs();
        }
    }

    fn child_finished(&self, id: ChildId) {
        self.state.borrow_mut().open_children.remove(&id);
        self.finish_if_settled();
    }

    /// Finish a decided test once its body has returned and no children
    /// remain open
    fn finish_if_settled(&self) {
        let ready = {
            let state = self.state.borrow();
            state.phase == Phase::Decided && !state.in_body && state.open_children.is_empty()
        };

        if ready {
            self.finish();
        }
    }

    /// Move from `Running` to `Decided`; false if already past it
    fn decide(&self) -> bool {
        let mut state = self.state.borrow_mut();
        if state.phase != Phase::Running {
            return false;
        }
        state.phase = Phase::Decided;
        true
    }

    fn finish(&self) {
        let (timer, children) = {
            let mut state = self.state.borrow_mut();
            if state.phase == Phase::Finished {
                return;
            }
            state.phase = Phase::Finished;
            (
                state.timer.take(),
                mem::take(&mut state.open_children),
            )
        };

        if let Some(timer) = timer {
            timer.abort();
        }
        if !children.is_empty() {
            trace!(test = %self.name(), open = children.len(), "finished with open children");
        }
        drop(children);

        debug!(test = %self.name(), "finished");
        self.test.emit(&TestEvent::Finished);
    }

    fn emit_status(&self, signal: StatusSignal) {
        if self.is_finished() {
            trace!(test = %self.name(), %signal, "dropping signal after finish");
            return;
        }
        self.test.emit(&TestEvent::Status(signal));
    }

    fn arm_timer(&self, timeout: Duration) {
        let ctx = self.clone();
        let handle = tokio::task::spawn_local(async move {
            tokio::time::sleep(timeout).await;
            if ctx.phase() == Phase::Running {
                debug!(test = %ctx.name(), "timeout elapsed");
                ctx.fail(TestError::Timeout {
                    after_ms: timeout.as_millis() as u64,
                });
            }
        });
        self.state.borrow_mut().timer = Some(handle);
    }
}

impl fmt::Debug for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("RunContext")
            .field("name", &self.test.name())
            .field("phase", &state.phase)
            .field("open_children", &state.open_children.len())
            .field("timer_armed", &state.timer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Status, StatusNode};
    use tokio::task::LocalSet;

    /// Records every event a test publishes
    fn record(test: &Test) -> Rc<RefCell<Vec<TestEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        test.subscribe(Rc::new(move |event: &TestEvent| {
            sink.borrow_mut().push(event.clone())
        }));
        events
    }

    /// Status sequence of the root test only
    fn own_statuses(events: &[TestEvent]) -> Vec<Status> {
        events
            .iter()
            .filter_map(TestEvent::as_status)
            .filter(|s| s.path.is_empty())
            .map(|s| s.status)
            .collect()
    }

    fn tree_of(events: &[TestEvent]) -> StatusNode {
        let mut root = StatusNode::new();
        for signal in events.iter().filter_map(TestEvent::as_status) {
            root.update(&signal.path, signal);
        }
        root
    }

    fn finished_count(events: &[TestEvent]) -> usize {
        events.iter().filter(|e| e.is_finished()).count()
    }

    #[test]
    fn test_sync_test_auto_passes() {
        let test = Test::noop("sync");
        let events = record(&test);

        let ctx = test.run();

        let events = events.borrow();
        assert_eq!(own_statuses(&events), vec![Status::Running, Status::Passed]);
        assert_eq!(events.last(), Some(&TestEvent::Finished));
        assert_eq!(finished_count(&events), 1);
        assert!(ctx.is_finished());
    }

    #[test]
    fn test_sync_error_fails_once() {
        let test = Test::new("throws", |_| Err("Foobar".into()));
        let events = record(&test);

        test.run();

        let events = events.borrow();
        assert_eq!(own_statuses(&events), vec![Status::Running, Status::Failed]);
        let failed = events[1].as_status().unwrap();
        assert_eq!(failed.error, Some(TestError::Explicit("Foobar".into())));
        assert_eq!(finished_count(&events), 1);
    }

    #[test]
    fn test_panic_is_contained() {
        let test = Test::new("panics", |_| panic!("kaboom"));
        let events = record(&test);

        let ctx = test.run();

        let events = events.borrow();
        assert_eq!(own_statuses(&events), vec![Status::Running, Status::Failed]);
        assert_eq!(
            events[1].as_status().unwrap().error,
            Some(TestError::Panic("kaboom".into()))
        );
        assert!(ctx.is_finished());
    }

    #[test]
    fn test_explicit_fail_then_return_is_single_failure() {
        let test = Test::new("fails", |t| {
            t.fail("first");
            t.pass();
            t.fail("second");
            Ok(())
        });
        let events = record(&test);

        test.run();

        let events = events.borrow();
        assert_eq!(own_statuses(&events), vec![Status::Running, Status::Failed]);
        assert_eq!(
            events[1].as_status().unwrap().error,
            Some(TestError::Explicit("first".into()))
        );
        assert_eq!(finished_count(&events), 1);
    }

    #[test]
    fn test_explicit_pass_in_sync_body_is_not_duplicated() {
        let test = Test::new("passes", |t| {
            t.pass();
            Ok(())
        });
        let events = record(&test);

        test.run();

        assert_eq!(
            own_statuses(&events.borrow()),
            vec![Status::Running, Status::Passed]
        );
    }

    #[test]
    fn test_skip_never_runs_body() {
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        let test = Test::new("skipped", move |_| {
            flag.set(true);
            Err("would fail".into())
        })
        .with_timeout(Duration::from_millis(50));
        let events = record(&test);

        let ctx = test.skip();

        assert!(!ran.get());
        assert!(ctx.is_finished());
        assert_eq!(
            own_statuses(&events.borrow()),
            vec![Status::Running, Status::Passed]
        );
    }

    #[test]
    fn test_child_paths_and_independent_outcomes() {
        let root = Test::new("root", |t| {
            t.child("c0", |_| Ok(())).run();
            t.child("c1", |_| Err("nope".into())).run();
            t.child("c2", |_| Ok(())).run();
            Ok(())
        });
        let events = record(&root);

        root.run();

        let events = events.borrow();
        assert_eq!(finished_count(&events), 1);
        assert_eq!(events.last(), Some(&TestEvent::Finished));

        let tree = tree_of(&events);
        assert_eq!(tree.name, "root");
        assert_eq!(tree.status, Status::Passed);
        let children: Vec<_> = tree
            .children
            .iter()
            .map(|c| (c.index, c.name.as_str(), c.status))
            .collect();
        assert_eq!(
            children,
            vec![
                (0, "c0", Status::Passed),
                (1, "c1", Status::Failed),
                (2, "c2", Status::Passed),
            ]
        );
    }

    #[test]
    fn test_sync_subtree_emits_pre_order() {
        let root = Test::new("root", |t| {
            t.child("a", |t| {
                t.child("a0", |_| Ok(())).run();
                Ok(())
            })
            .run();
            t.child("b", |_| Ok(())).run();
            Ok(())
        });
        let events = record(&root);

        root.run();

        let running: Vec<_> = events
            .borrow()
            .iter()
            .filter_map(TestEvent::as_status)
            .filter(|s| s.status == Status::Running)
            .map(|s| (s.name.clone(), s.path.clone()))
            .collect();
        assert_eq!(
            running,
            vec![
                ("root".to_string(), vec![]),
                ("a".to_string(), vec![0]),
                ("a0".to_string(), vec![0, 0]),
                ("b".to_string(), vec![1]),
            ]
        );
    }

    #[test]
    fn test_child_ids_are_never_reused() {
        let root = Test::new("root", |t| {
            let first = Test::noop("first");
            assert_eq!(t.adopt(&first), ChildId(0));
            first.run();
            assert_eq!(t.open_children(), 0);

            let second = Test::noop("second");
            assert_eq!(t.adopt(&second), ChildId(1));
            second.run();
            Ok(())
        });
        let events = record(&root);

        root.run();

        let tree = tree_of(&events.borrow());
        assert_eq!(tree.status, Status::Passed);
        assert_eq!(tree.get(&[1]).unwrap().name, "second");
    }

    #[test]
    fn test_unrun_child_keeps_parent_open() {
        let root = Test::new("root", |t| {
            t.child("never run", |_| Ok(()));
            Ok(())
        });
        let events = record(&root);

        let ctx = root.run();

        assert_eq!(ctx.phase(), Phase::Decided);
        assert_eq!(ctx.open_children(), 1);
        assert_eq!(finished_count(&events.borrow()), 0);
    }

    #[test]
    fn test_failing_parent_does_not_wait_for_children() {
        let pending = Rc::new(RefCell::new(None));
        let slot = pending.clone();
        let root = Test::new("root", move |t| {
            *slot.borrow_mut() = Some(t.child("late", |_| Ok(())));
            Err("parent broke".into())
        });
        let events = record(&root);

        let ctx = root.run();
        assert!(ctx.is_finished());
        assert_eq!(ctx.open_children(), 0);

        // Events from a child of a finished parent are dropped
        let late = pending.borrow_mut().take().unwrap();
        late.run();

        let events = events.borrow();
        assert_eq!(finished_count(&events), 1);
        assert!(events
            .iter()
            .filter_map(TestEvent::as_status)
            .all(|s| s.path.is_empty()));
    }

    #[test]
    fn test_error_after_pass_fails_the_test() {
        let test = Test::new("root", |t| {
            t.pass();
            Err("assertion after pass".into())
        });
        let events = record(&test);

        let ctx = test.run();

        let events = events.borrow();
        assert!(ctx.is_finished());
        assert_eq!(
            own_statuses(&events),
            vec![Status::Running, Status::Passed, Status::Failed]
        );
        assert_eq!(finished_count(&events), 1);
        assert_eq!(events.last(), Some(&TestEvent::Finished));

        let tree = tree_of(&events);
        assert_eq!(tree.status, Status::Failed);
        assert_eq!(
            tree.error,
            Some(TestError::Explicit("assertion after pass".into()))
        );
    }

    #[test]
    fn test_error_after_pass_with_open_child_finishes_at_once() {
        let test = Test::new("root", |t| {
            t.child("never run", |_| Ok(()));
            t.pass();
            Err("assertion after pass".into())
        });
        let events = record(&test);

        let ctx = test.run();

        assert_eq!(ctx.phase(), Phase::Finished);
        assert_eq!(ctx.open_children(), 0);
        let events = events.borrow();
        assert_eq!(finished_count(&events), 1);
        assert_eq!(tree_of(&events).status, Status::Failed);
    }

    #[test]
    fn test_panic_after_pass_fails_the_test() {
        let test = Test::new("root", |t| {
            t.pass();
            panic!("late panic");
        });
        let events = record(&test);

        test.run();

        let tree = tree_of(&events.borrow());
        assert_eq!(tree.status, Status::Failed);
        assert_eq!(tree.error, Some(TestError::Panic("late panic".into())));
    }

    #[test]
    fn test_pass_in_body_finishes_after_body_returns() {
        let finished_early = Rc::new(Cell::new(false));
        let flag = finished_early.clone();
        let test = Test::new("root", move |t| {
            t.pass();
            flag.set(t.is_finished());
            Ok(())
        });

        let ctx = test.run();

        assert!(!finished_early.get());
        assert!(ctx.is_finished());
    }

    #[test]
    fn test_abandon_releases_unrun_children() {
        let inner = Rc::new(RefCell::new(None));
        let slot = inner.clone();
        let root = Test::new("root", move |t| {
            t.child("never run", |_| Ok(()));
            let nested = t
                .child("nested", |t| {
                    t.child("never run either", |_| Ok(()));
                    Ok(())
                })
                .run();
            *slot.borrow_mut() = Some(Rc::downgrade(&nested.state));
            Ok(())
        });
        let events = record(&root);

        let ctx = root.run();
        let root_state = Rc::downgrade(&ctx.state);
        let nested_state = inner.borrow_mut().take().unwrap();
        assert_eq!(ctx.open_children(), 2);
        assert!(nested_state.upgrade().is_some());

        ctx.abandon();
        drop(ctx);

        assert!(root_state.upgrade().is_none());
        assert!(nested_state.upgrade().is_none());
        assert_eq!(finished_count(&events.borrow()), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_async_pass_waits_for_explicit_call() {
        LocalSet::new()
            .run_until(async {
                let handle = Rc::new(RefCell::new(None));
                let slot = handle.clone();
                let test = Test::new("async", move |t| {
                    *slot.borrow_mut() = Some(t.clone());
                    Ok(())
                })
                .with_timeout(Duration::from_millis(100));
                let events = record(&test);

                let ctx = test.run();
                assert_eq!(ctx.phase(), Phase::Running);
                assert_eq!(own_statuses(&events.borrow()), vec![Status::Running]);

                tokio::time::sleep(Duration::from_millis(10)).await;
                handle.borrow().as_ref().unwrap().pass();

                assert!(ctx.is_finished());
                assert_eq!(
                    own_statuses(&events.borrow()),
                    vec![Status::Running, Status::Passed]
                );

                // The cleared timer never fires
                tokio::time::sleep(Duration::from_millis(500)).await;
                assert_eq!(
                    own_statuses(&events.borrow()),
                    vec![Status::Running, Status::Passed]
                );
                assert_eq!(finished_count(&events.borrow()), 1);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_async_timeout_fails_exactly_once() {
        LocalSet::new()
            .run_until(async {
                let test = Test::noop("slow").with_timeout(Duration::from_millis(20));
                let events = record(&test);

                let ctx = test.run();
                tokio::time::sleep(Duration::from_millis(10)).await;
                assert_eq!(ctx.phase(), Phase::Running);

                tokio::time::sleep(Duration::from_millis(200)).await;
                assert!(ctx.is_finished());

                let events = events.borrow();
                assert_eq!(own_statuses(&events), vec![Status::Running, Status::Failed]);
                assert_eq!(
                    events[1].as_status().unwrap().error,
                    Some(TestError::Timeout { after_ms: 20 })
                );
                assert_eq!(finished_count(&events), 1);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_parent_finishes_after_async_children() {
        LocalSet::new()
            .run_until(async {
                let root = Test::new("root", |t| {
                    t.child("fast", |_| Ok(())).run();
                    t.child("slow", |t| {
                        let t = t.clone();
                        tokio::task::spawn_local(async move {
                            tokio::time::sleep(Duration::from_millis(30)).await;
                            t.pass();
                        });
                        Ok(())
                    })
                    .with_timeout(Duration::from_millis(100))
                    .run();
                    Ok(())
                });
                let events = record(&root);

                let ctx = root.run();
                assert_eq!(ctx.phase(), Phase::Decided);
                assert_eq!(ctx.open_children(), 1);
                assert_eq!(finished_count(&events.borrow()), 0);

                tokio::time::sleep(Duration::from_millis(50)).await;
                assert!(ctx.is_finished());

                let events = events.borrow();
                assert_eq!(finished_count(&events), 1);
                let tree = tree_of(&events);
                assert_eq!(tree.get(&[1]).unwrap().status, Status::Passed);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_async_parent_decides_after_children_finish() {
        LocalSet::new()
            .run_until(async {
                let holder = Rc::new(RefCell::new(None));
                let slot = holder.clone();
                let root = Test::new("root", move |t| {
                    t.child("child", |_| Ok(())).run();
                    *slot.borrow_mut() = Some(t.clone());
                    Ok(())
                })
                .with_timeout(Duration::from_millis(100));
                let events = record(&root);

                let ctx = root.run();
                assert_eq!(ctx.open_children(), 0);
                assert_eq!(ctx.phase(), Phase::Running);

                holder.borrow().as_ref().unwrap().pass();
                assert!(ctx.is_finished());
                assert_eq!(finished_count(&events.borrow()), 1);
            })
            .await;
    }
}
