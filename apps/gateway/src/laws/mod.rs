//! # Laws Module
//!
//! Declarative, priority-ordered rules applied to analysis reports.
//!
//! ## Components
//! - `condition`: Typed condition clauses, parsed at load time
//! - `law`: Law definitions, law book loading and ordering
//! - `verdict`: Decision and verdict types
//! - `engine`: Evaluation and counters
//! - `watcher`: Optional hot reload of the law file

pub mod condition;
pub mod engine;
pub mod law;
pub mod verdict;
pub mod watcher;

pub use condition::{Clause, Comparison, Condition};
pub use engine::{EngineStats, LawEngine};
pub use law::{Law, LawBook, LawFormat, DEFAULT_PRIORITY};
pub use verdict::{Decision, Verdict, DEFAULT_LAW_ID, DEFAULT_REASON};
pub use watcher::LawWatcher;
