//! Domain logic: turn one diagnostic plus a resolved project into candidate modifier fixes.
//!
//! This crate owns *what* should change and on which declaration. It does not own *how* edits are
//! rendered into text; that's the `modfix-edit` crate.

mod classifier;
mod fixers;
pub mod legality;
mod locator;
mod planner;
mod ports;
pub mod splitter;
pub mod suppress;
pub mod visibility;

pub use classifier::{classify, known_ids, MemberKind, ProblemKind, ReportedOn, StaticMember};
pub use fixers::{builtin_fixer_metas, FixerMeta};
pub use locator::{locate, ModifierProblem};
pub use planner::{DefaultReturns, PlanContext, Planner, PlannerConfig};
pub use ports::{BindingOracle, SnapshotOracle};
