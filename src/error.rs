use thiserror::Error;

use crate::clause::{ClauseId, ClauseType};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("a {kind} clause needs at least one child")]
    EmptyChildren { kind: ClauseType },
    #[error("rule `{0}` was declared but never defined")]
    UndefinedRule(String),
    #[error("rule `{0}` is already defined")]
    Redefined(String),
    #[error("a rule named `{0}` already exists")]
    DuplicateRule(String),
    #[error("clause {0} is anonymous and cannot be given a definition")]
    NotARule(ClauseId),
    #[error("clause {0} does not belong to this grammar")]
    UnknownClause(ClauseId),
}
