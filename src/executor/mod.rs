//! Test execution engine
//!
//! The lifecycle state machine, its event stream and the aggregator that
//! folds the stream into a result tree.

mod events;
mod harness;
mod lifecycle;

pub use events::{Emitter, EventBus, Listener, TestEvent};
pub use harness::{Aggregator, Harness};
pub use lifecycle::{ChildId, Phase, RunContext, Test, TestBody};
