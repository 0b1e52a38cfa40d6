#![forbid(unsafe_code)]
#![warn(explicit_outlives_requirements)]
#![warn(missing_debug_implementations)]
#![warn(clippy::pedantic)]
#![warn(missing_copy_implementations)]
#![warn(redundant_lifetimes)]
//#![warn(missing_docs)]
#![warn(unreachable_pub)]
#![warn(unused_crate_dependencies)]
#![warn(unused_qualifications)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

mod clause;
mod debug;
mod diagnostics;
mod engine;
mod error;
mod grammar;
mod graph;
mod interval;
mod memo;
mod notation;
mod packrat;
#[cfg(test)]
mod proptesting;
mod tree;

pub use clause::{Clause, ClauseId, ClauseKind, ClauseType, Visibility};
pub use diagnostics::{SyntaxError, syntax_errors};
pub use engine::Parse;
pub use error::GrammarError;
pub use grammar::{Grammar, GrammarBuilder};
pub use graph::{ClauseTableEntry, Graph};
pub use interval::IntervalUnion;
pub use memo::{Match, MemoKey, MemoTable, nonoverlapping_matches};
pub use packrat::Packrat;
pub use tree::{TreeNode, reduce};
