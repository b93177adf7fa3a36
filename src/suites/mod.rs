//! Built-in test suites
//!
//! Each suite is a root `Test` the harness can run on its own.

mod demo;
mod selftest;

pub use demo::demo;
pub use selftest::selftest;

use crate::executor::Test;

/// Named suite the CLI can select
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Suite {
    Demo,
    SelfTest,
}

impl Suite {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "demo" => Some(Suite::Demo),
            "selftest" | "self-test" => Some(Suite::SelfTest),
            _ => None,
        }
    }

    pub fn all() -> &'static [Suite] {
        &[Suite::Demo, Suite::SelfTest]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Suite::Demo => "demo",
            Suite::SelfTest => "selftest",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Suite::Demo => "Reference tree covering pass, fail, timeout, skip and nesting",
            Suite::SelfTest => "The engine checking its own lifecycle and event stream",
        }
    }

    /// Build a fresh root test; a test can only be reported once per run
    pub fn build(&self) -> Test {
        match self {
            Suite::Demo => demo(),
            Suite::SelfTest => selftest(),
        }
    }

    /// Resolve a CLI selection, where "all" expands to every suite
    pub fn select(name: &str) -> Option<Vec<Suite>> {
        if name.eq_ignore_ascii_case("all") {
            return Some(Self::all().to_vec());
        }
        Self::from_str(name).map(|suite| vec![suite])
    }
}
