//! Data models for test execution
//!
//! Status signals, the result tree, run reports and the failure taxonomy.

mod error;
mod report;
mod status;

pub use error::{Assertion, AssertionError, TestError};
pub use report::{RunReport, RunSummary};
pub use status::{Path, Status, StatusNode, StatusSignal};
