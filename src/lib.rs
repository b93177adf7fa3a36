//! treetest - a minimal asynchronous nested test engine
//!
//! A [`Test`] is a named body with an optional timeout. Running it yields a
//! [`RunContext`] that can pass, fail, or spawn child tests. Every status
//! change travels up the parent chain as a [`StatusSignal`] carrying the
//! path of child indices, and an [`Aggregator`] folds that stream into a
//! [`StatusNode`] tree.
//!
//! The engine is single-threaded. Timers are local tasks, so tests with a
//! timeout must run inside a `tokio::task::LocalSet`; [`Harness`] sets that
//! up for whole suites.
//!
//! ```no_run
//! use treetest::{assert, Harness, TestBuilder};
//!
//! let root = TestBuilder::root("Root").body(|t| {
//!     t.test("adds").run(|_| Ok(assert::equal(1 + 1, 2)?));
//!     Ok(())
//! });
//!
//! let reports = Harness::new().run_blocking(&[root])?;
//! assert!(reports[0].is_success());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod assert;
pub mod builder;
pub mod cli;
pub mod config;
pub mod executor;
pub mod models;
pub mod output;
pub mod suites;
pub mod utils;

pub use builder::TestBuilder;
pub use executor::{Aggregator, Emitter, Harness, RunContext, Test};
pub use models::{RunReport, Status, StatusNode, StatusSignal, TestError};
