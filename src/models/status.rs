//! Status signals and the path-addressed status tree
//!
//! A [`StatusSignal`] is emitted by a running test; the aggregator folds
//! every signal into a [`StatusNode`] tree using the signal's path. Signals
//! may arrive in any order; the tree keeps every sibling list sorted by
//! index.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::TestError;

/// Sequence of sibling indices from the root to a test
pub type Path = Vec<usize>;

/// Status of a single test
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Running,
    Passed,
    Failed,
}

impl Status {
    pub fn symbol(&self) -> &'static str {
        match self {
            Status::Running => "…",
            Status::Passed => "✓",
            Status::Failed => "✗",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Status::Running)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Running => write!(f, "running"),
            Status::Passed => write!(f, "passed"),
            Status::Failed => write!(f, "failed"),
        }
    }
}

/// One status event for one test instance
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSignal {
    pub name: String,
    pub path: Path,
    pub status: Status,
    /// Only present when `status` is [`Status::Failed`]
    pub error: Option<TestError>,
}

impl StatusSignal {
    pub fn running(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: Path::new(),
            status: Status::Running,
            error: None,
        }
    }

    pub fn passed(name: impl Into<String>) -> Self {
        Self {
            status: Status::Passed,
            ..Self::running(name)
        }
    }

    pub fn failed(name: impl Into<String>, error: TestError) -> Self {
        Self {
            status: Status::Failed,
            error: Some(error),
            ..Self::running(name)
        }
    }

    /// Prepend one ancestor level to the path
    pub fn prefixed(mut self, index: usize) -> Self {
        self.path.insert(0, index);
        self
    }

    pub fn with_path(mut self, path: Path) -> Self {
        self.path = path;
        self
    }
}

impl fmt::Display for StatusSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?} {}", self.name, self.path, self.status)?;
        if let Some(err) = &self.error {
            write!(f, " - {err}")?;
        }
        Ok(())
    }
}

/// Persistent node of the result tree
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusNode {
    pub name: String,
    pub path: Path,
    pub status: Status,
    pub error: Option<TestError>,
    /// Position among siblings, not necessarily contiguous
    pub index: usize,
    /// Strictly ascending by `index`
    pub children: Vec<StatusNode>,
}

impl Default for StatusNode {
    fn default() -> Self {
        Self {
            name: "Unknown".to_string(),
            path: Path::new(),
            status: Status::Running,
            error: None,
            index: 0,
            children: Vec::new(),
        }
    }
}

impl StatusNode {
    /// Create an empty root node
    pub fn new() -> Self {
        Self::default()
    }

    fn with_index(index: usize) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    /// Merge `signal` into the node addressed by `path`, creating any
    /// missing nodes on the way down.
    pub fn update(&mut self, path: &[usize], signal: &StatusSignal) -> &mut Self {
        let Some((&target, rest)) = path.split_first() else {
            self.merge(signal);
            return self;
        };

        let pos = self.children.partition_point(|child| child.index < target);
        if self.children.get(pos).is_some_and(|child| child.index == target) {
            self.children[pos].update(rest, signal);
        } else {
            let mut child = StatusNode::with_index(target);
            child.update(rest, signal);
            self.children.insert(pos, child);
        }

        self
    }

    /// Overwrite the signal fields; `index` and `children` are untouched
    fn merge(&mut self, signal: &StatusSignal) {
        self.name.clone_from(&signal.name);
        self.path.clone_from(&signal.path);
        self.status = signal.status;
        self.error.clone_from(&signal.error);
    }

    /// Look up a descendant by path
    pub fn get(&self, path: &[usize]) -> Option<&StatusNode> {
        match path.split_first() {
            None => Some(self),
            Some((&target, rest)) => self
                .children
                .binary_search_by_key(&target, |child| child.index)
                .ok()
                .and_then(|pos| self.children[pos].get(rest)),
        }
    }

    /// Pre-order traversal with depth
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a StatusNode, usize)) {
        self.walk_at(0, visit);
    }

    fn walk_at<'a>(&'a self, depth: usize, visit: &mut impl FnMut(&'a StatusNode, usize)) {
        visit(self, depth);
        for child in &self.children {
            child.walk_at(depth + 1, visit);
        }
    }

    /// Number of nodes in this subtree, including this one
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(StatusNode::count).sum::<usize>()
    }

    pub fn has_failures(&self) -> bool {
        self.status == Status::Failed || self.children.iter().any(StatusNode::has_failures)
    }
}
