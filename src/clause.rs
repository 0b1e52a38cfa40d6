use std::fmt::Display;
use std::slice;

use strum::{EnumDiscriminants, IntoStaticStr};

/// Stable identity of a distinct clause within one [`Grammar`](crate::Grammar).
///
/// Identities are allocated by the [`GrammarBuilder`](crate::GrammarBuilder):
/// structurally identical anonymous clauses share one, and every named rule gets its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClauseId(pub(crate) usize);

impl ClauseId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for ClauseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumDiscriminants)]
#[strum_discriminants(name(ClauseType), derive(IntoStaticStr, Hash, strum::Display))]
pub enum ClauseKind {
    Char(u8),
    /// Inclusive on both ends
    CharRange(u8, u8),
    Any,
    Nothing,
    /// Zero-width, succeeds only at position 0
    First,
    Seq(Vec<ClauseId>),
    Ord(Vec<ClauseId>),
    Plus(ClauseId),
    Star(ClauseId),
    Optional(ClauseId),
    FollowedBy(ClauseId),
    NotFollowedBy(ClauseId),
}

impl ClauseKind {
    pub fn children(&self) -> &[ClauseId] {
        match self {
            ClauseKind::Char(_)
            | ClauseKind::CharRange(..)
            | ClauseKind::Any
            | ClauseKind::Nothing
            | ClauseKind::First => &[],
            ClauseKind::Seq(children) | ClauseKind::Ord(children) => children,
            ClauseKind::Plus(child)
            | ClauseKind::Star(child)
            | ClauseKind::Optional(child)
            | ClauseKind::FollowedBy(child)
            | ClauseKind::NotFollowedBy(child) => slice::from_ref(child),
        }
    }

    pub fn clause_type(&self) -> ClauseType {
        ClauseType::from(self)
    }

    pub fn is_terminal(&self) -> bool {
        self.clause_type().is_terminal()
    }
}

impl ClauseType {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ClauseType::Char
                | ClauseType::CharRange
                | ClauseType::Any
                | ClauseType::Nothing
                | ClauseType::First
        )
    }

    /// Kinds that can succeed with a zero-length match without any child matching,
    /// so they have to be scheduled in every column.
    pub fn is_always_retry(self) -> bool {
        matches!(
            self,
            ClauseType::Star | ClauseType::Optional | ClauseType::NotFollowedBy
        )
    }

    /// Repetitions store their matches as a right-nested chain.
    pub fn is_repetition(self) -> bool {
        matches!(self, ClauseType::Plus | ClauseType::Star)
    }

    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Whether a named rule produces a node in the parse tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Active,
    /// Named for grammar notation, but spliced into its parent like an anonymous clause
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub(crate) kind: ClauseKind,
    pub(crate) name: Option<Box<str>>,
    pub(crate) visibility: Visibility,
    pub(crate) display: String,
}

impl Clause {
    pub fn kind(&self) -> &ClauseKind {
        &self.kind
    }

    pub fn clause_type(&self) -> ClauseType {
        self.kind.clause_type()
    }

    pub fn children(&self) -> &[ClauseId] {
        self.kind.children()
    }

    pub fn is_terminal(&self) -> bool {
        self.kind.is_terminal()
    }

    pub fn label(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Anonymous clauses are never active.
    pub fn is_active(&self) -> bool {
        self.name.is_some() && self.visibility == Visibility::Active
    }

    /// The clause body in grammar notation, computed once when the grammar is built.
    pub fn display(&self) -> &str {
        &self.display
    }
}
