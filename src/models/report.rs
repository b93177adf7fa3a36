//! Run reports
//!
//! Summary statistics over a finished (or abandoned) status tree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::status::{Status, StatusNode};

/// Node counts by status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub running: usize,
}

impl RunSummary {
    pub fn from_tree(root: &StatusNode) -> Self {
        let mut summary = Self::default();
        root.walk(&mut |node, _| {
            summary.total += 1;
            match node.status {
                Status::Passed => summary.passed += 1,
                Status::Failed => summary.failed += 1,
                Status::Running => summary.running += 1,
            }
        });
        summary
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }

    pub fn is_all_passed(&self) -> bool {
        self.total > 0 && self.passed == self.total
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total: {} | Passed: {} | Failed: {} | Running: {}",
            self.total, self.passed, self.failed, self.running
        )
    }
}

/// Outcome of running one root test through the harness
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// False when the harness deadline elapsed before the root finished
    pub completed: bool,
    pub summary: RunSummary,
    pub tree: StatusNode,
}

impl RunReport {
    pub fn new(
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        completed: bool,
        tree: StatusNode,
    ) -> Self {
        let duration_ms = (completed_at - started_at).num_milliseconds().max(0) as u64;
        Self {
            started_at,
            completed_at,
            duration_ms,
            completed,
            summary: RunSummary::from_tree(&tree),
            tree,
        }
    }

    pub fn name(&self) -> &str {
        &self.tree.name
    }

    /// True when the run completed with no failed node
    pub fn is_success(&self) -> bool {
        self.completed && self.summary.failed == 0
    }
}
