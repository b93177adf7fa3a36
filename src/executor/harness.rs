//! Result aggregation
//!
//! Subscribes a fresh status tree to a root test, folds every signal into
//! it and hands the tree out once the root has finished.

use anyhow::{Context, Result};
use chrono::Utc;
use futures::channel::oneshot;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tokio::task::LocalSet;
use tracing::{info, warn};

use super::events::Emitter;
use super::lifecycle::Test;
use crate::models::{RunReport, StatusNode};

/// Folds a test's status stream into a [`StatusNode`] tree
#[derive(Clone, Debug)]
pub struct Aggregator {
    root: Rc<RefCell<StatusNode>>,
}

impl Aggregator {
    /// Subscribe a new, empty tree to `test`. Must be called before the
    /// test is run.
    pub fn attach(test: &Test) -> Self {
        let root = Rc::new(RefCell::new(StatusNode::new()));
        let tree = root.clone();
        test.on_status(move |signal| {
            tree.borrow_mut().update(&signal.path, signal);
        });
        Self { root }
    }

    /// Copy of the tree as it stands
    pub fn snapshot(&self) -> StatusNode {
        self.root.borrow().clone()
    }
}

/// Runs root tests to completion on the current thread
#[derive(Clone, Debug, Default)]
pub struct Harness {
    deadline: Option<Duration>,
}

impl Harness {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop waiting after `deadline`; zero waits forever
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = (!deadline.is_zero()).then_some(deadline);
        self
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Run `test` and wait for its `finished` event.
    ///
    /// Must be awaited inside a `LocalSet`.
    pub async fn run(&self, test: &Test) -> RunReport {
        let aggregator = Aggregator::attach(test);

        let (tx, rx) = oneshot::channel::<()>();
        let tx = RefCell::new(Some(tx));
        test.on_finished(move || {
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(());
            }
        });

        info!("Running {}", test.name());
        let started_at = Utc::now();
        let ctx = test.run();

        let completed = match self.deadline {
            Some(deadline) => matches!(tokio::time::timeout(deadline, rx).await, Ok(Ok(()))),
            None => rx.await.is_ok(),
        };

        if !completed {
            warn!(
                "{} still running after {}ms ({:?})",
                test.name(),
                self.deadline.map(|d| d.as_millis()).unwrap_or_default(),
                ctx
            );
        }

        let report = RunReport::new(started_at, Utc::now(), completed, aggregator.snapshot());
        if !completed {
            ctx.abandon();
        }

        info!(
            "{} completed in {}ms - {}",
            test.name(),
            report.duration_ms,
            report.summary
        );

        report
    }

    /// Run several root tests one after another
    pub async fn run_all(&self, tests: &[Test]) -> Vec<RunReport> {
        let mut reports = Vec::with_capacity(tests.len());
        for test in tests {
            reports.push(self.run(test).await);
        }
        reports
    }

    /// Build a current-thread runtime and run `tests` to completion
    pub fn run_blocking(&self, tests: &[Test]) -> Result<Vec<RunReport>> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .context("Failed to build test runtime")?;

        Ok(LocalSet::new().block_on(&runtime, self.run_all(tests)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::RunContext;
    use crate::models::{Status, TestError};

    #[test]
    fn test_aggregator_builds_tree_for_sync_run() {
        let root = Test::new("root", |t| {
            t.child("s1", |_| Ok(())).run();
            t.child("s2", |t| {
                t.child("s21", |_| Ok(())).run();
                Ok(())
            })
            .run();
            Ok(())
        });
        let aggregator = Aggregator::attach(&root);

        root.run();

        let tree = aggregator.snapshot();
        assert_eq!(tree.status, Status::Passed);
        assert_eq!(tree.count(), 4);
        assert_eq!(tree.get(&[1, 0]).unwrap().name, "s21");
        assert_eq!(tree.get(&[1, 0]).unwrap().path, vec![1, 0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_harness_waits_for_async_children() {
        let root = Test::new("root", |t: &RunContext| {
            t.child("timeout", |_| Ok(()))
                .with_timeout(Duration::from_millis(20))
                .run();
            Ok(())
        });

        let report = LocalSet::new()
            .run_until(async { Harness::new().run(&root).await })
            .await;

        assert!(report.completed);
        assert_eq!(report.tree.status, Status::Passed);
        let child = report.tree.get(&[0]).unwrap();
        assert_eq!(child.status, Status::Failed);
        assert_eq!(child.error, Some(TestError::Timeout { after_ms: 20 }));
        assert_eq!(report.summary.failed, 1);
        assert!(!report.is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn test_harness_deadline_reports_partial_tree() {
        let abandoned = Rc::new(RefCell::new(None));
        let slot = abandoned.clone();
        let root = Test::new("root", move |t| {
            // Created but never run, so the root can never finish
            *slot.borrow_mut() = Some(t.child("abandoned", |_| Ok(())));
            Ok(())
        });

        let report = LocalSet::new()
            .run_until(async {
                Harness::new()
                    .with_deadline(Duration::from_millis(50))
                    .run(&root)
                    .await
            })
            .await;

        assert!(!report.completed);
        assert_eq!(report.tree.status, Status::Passed);
        assert!(report.tree.children.is_empty());

        // The abandoned child no longer forwards to the root
        let child = abandoned.borrow_mut().take().unwrap();
        assert_eq!(child.listener_count(), 0);
    }

    #[test]
    fn test_zero_deadline_waits_forever() {
        let harness = Harness::new().with_deadline(Duration::ZERO);
        assert!(harness.deadline().is_none());
    }

    #[test]
    fn test_run_blocking() {
        let tests = vec![
            Test::noop("first"),
            Test::new("second", |_| Err("boom".into())),
        ];

        let reports = Harness::new().run_blocking(&tests).unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports[0].is_success());
        assert_eq!(reports[1].tree.status, Status::Failed);
        assert_eq!(reports[1].name(), "second");
    }
}
