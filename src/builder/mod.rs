//! Fluent test construction
//!
//! Sugar over the engine's public operations. A builder is started either
//! for a root test with [`TestBuilder::root`] or for a child with
//! [`RunContext::test`], configured, and then consumed:
//!
//! ```ignore
//! TestBuilder::root("Root Test").body(|t| {
//!     t.test("S1").run(|_| Ok(()));
//!     t.test("S4").asynchronous().run(|t| {
//!         t.pass();
//!         Ok(())
//!     });
//!     t.test("S7").skip(|_| Err("never runs".into()));
//!     t.test("S81").assert().ok(true);
//!     Ok(())
//! });
//! ```

use std::fmt::Debug;
use std::time::Duration;

use crate::assert::{self, AssertResult};
use crate::executor::{RunContext, Test};
use crate::models::TestError;

/// Timeout used by [`TestBuilder::asynchronous`]
pub const DEFAULT_ASYNC_TIMEOUT: Duration = Duration::from_millis(1000);

/// Builder for a root or child test
#[must_use]
pub struct TestBuilder {
    name: String,
    parent: Option<RunContext>,
    timeout: Duration,
}

impl TestBuilder {
    /// Start a test with no parent
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            timeout: Duration::ZERO,
        }
    }

    fn child_of(parent: &RunContext, name: impl Into<String>) -> Self {
        Self {
            parent: Some(parent.clone()),
            ..Self::root(name)
        }
    }

    /// Make the test asynchronous with an explicit timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Make the test asynchronous with [`DEFAULT_ASYNC_TIMEOUT`]
    pub fn asynchronous(self) -> Self {
        self.timeout(DEFAULT_ASYNC_TIMEOUT)
    }

    /// Finish building without running
    pub fn body<F>(self, body: F) -> Test
    where
        F: Fn(&RunContext) -> Result<(), TestError> + 'static,
    {
        let test = match &self.parent {
            Some(parent) => parent.child(self.name, body),
            None => Test::new(self.name, body),
        };
        test.with_timeout(self.timeout)
    }

    /// Build and run immediately
    pub fn run<F>(self, body: F) -> RunContext
    where
        F: Fn(&RunContext) -> Result<(), TestError> + 'static,
    {
        self.body(body).run()
    }

    /// Build and skip; the body never executes
    pub fn skip<F>(self, body: F) -> RunContext
    where
        F: Fn(&RunContext) -> Result<(), TestError> + 'static,
    {
        self.body(body).skip()
    }

    /// Run a synchronous test whose only content is `outcome`
    pub fn check(self, outcome: AssertResult) -> RunContext {
        self.timeout(Duration::ZERO)
            .run(move |_| outcome.clone().map_err(TestError::from))
    }

    /// Turn the test into a single assertion
    pub fn assert(self) -> Asserter {
        Asserter { builder: self }
    }
}

/// One-shot assertion tests, see [`TestBuilder::assert`]
#[must_use]
pub struct Asserter {
    builder: TestBuilder,
}

impl Asserter {
    pub fn ok(self, condition: bool) -> RunContext {
        self.builder.check(assert::ok(condition))
    }

    pub fn equal<T: PartialEq + Debug>(self, actual: T, expected: T) -> RunContext {
        self.builder.check(assert::equal(actual, expected))
    }

    pub fn not_equal<T: PartialEq + Debug>(self, actual: T, expected: T) -> RunContext {
        self.builder.check(assert::not_equal(actual, expected))
    }

    pub fn deep_equal<A, B>(self, actual: &A, expected: &B) -> RunContext
    where
        A: PartialEq<B> + Debug + ?Sized,
        B: Debug + ?Sized,
    {
        self.builder.check(assert::deep_equal(actual, expected))
    }

    pub fn not_deep_equal<A, B>(self, actual: &A, expected: &B) -> RunContext
    where
        A: PartialEq<B> + Debug + ?Sized,
        B: Debug + ?Sized,
    {
        self.builder.check(assert::not_deep_equal(actual, expected))
    }

    pub fn strict_equal<T: PartialEq + Debug>(self, actual: T, expected: T) -> RunContext {
        self.builder.check(assert::strict_equal(actual, expected))
    }

    pub fn not_strict_equal<T: PartialEq + Debug>(self, actual: T, expected: T) -> RunContext {
        self.builder.check(assert::not_strict_equal(actual, expected))
    }

    pub fn if_error<T, E: Debug>(self, value: &Result<T, E>) -> RunContext {
        self.builder.check(assert::if_error(value))
    }

    pub fn fail(self, message: impl Into<String>) -> RunContext {
        self.builder.check(assert::fail(message))
    }

    pub fn throws<T, E>(self, f: impl FnOnce() -> Result<T, E>) -> RunContext {
        self.builder.check(assert::throws(f))
    }

    pub fn does_not_throw<T, E: Debug>(self, f: impl FnOnce() -> Result<T, E>) -> RunContext {
        self.builder.check(assert::does_not_throw(f))
    }
}

impl RunContext {
    /// Start building a child of this test
    pub fn test(&self, name: impl Into<String>) -> TestBuilder {
        TestBuilder::child_of(self, name)
    }
}
