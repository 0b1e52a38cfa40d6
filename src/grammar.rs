use std::collections::{HashMap, HashSet};
use std::ops::Index;

use crate::{
    Graph,
    clause::{Clause, ClauseId, ClauseKind, Visibility},
    error::GrammarError,
    notation,
};

#[derive(Debug, Clone)]
struct Slot {
    kind: Option<ClauseKind>,
    name: Option<Box<str>>,
    visibility: Visibility,
}

/// Interns clauses into an arena and resolves forward references to named rules.
///
/// Anonymous clauses are deduplicated by structure, so `g.char(b'a')` always returns the
/// same id. Named rules are declared first and defined later, which is how recursive
/// grammars are written:
///
/// ```
/// use pika_matcher::{GrammarBuilder, Visibility};
///
/// let mut g = GrammarBuilder::new();
/// let list = g.declare("List", Visibility::Active);
/// let a = g.char(b'a');
/// let more = g.seq([list, a]);
/// let body = g.ord([more, a]);
/// g.define(list, body).unwrap();
/// let grammar = g.build().unwrap();
/// assert_eq!(grammar.display(list), "( ( List ~ 'a' ) / 'a' )");
/// ```
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    slots: Vec<Slot>,
    interned: HashMap<ClauseKind, ClauseId>,
}

impl GrammarBuilder {
    pub fn new() -> GrammarBuilder {
        GrammarBuilder::default()
    }

    fn push(&mut self, slot: Slot) -> ClauseId {
        let id = ClauseId(self.slots.len());
        self.slots.push(slot);
        id
    }

    fn intern(&mut self, kind: ClauseKind) -> ClauseId {
        if let Some(id) = self.interned.get(&kind) {
            return *id;
        }
        let id = self.push(Slot {
            kind: Some(kind.clone()),
            name: None,
            visibility: Visibility::Active,
        });
        self.interned.insert(kind, id);
        id
    }

    pub fn char(&mut self, c: u8) -> ClauseId {
        self.intern(ClauseKind::Char(c))
    }

    pub fn range(&mut self, lo: u8, hi: u8) -> ClauseId {
        self.intern(ClauseKind::CharRange(lo, hi))
    }

    pub fn any(&mut self) -> ClauseId {
        self.intern(ClauseKind::Any)
    }

    pub fn nothing(&mut self) -> ClauseId {
        self.intern(ClauseKind::Nothing)
    }

    pub fn first(&mut self) -> ClauseId {
        self.intern(ClauseKind::First)
    }

    pub fn seq(&mut self, children: impl IntoIterator<Item = ClauseId>) -> ClauseId {
        self.intern(ClauseKind::Seq(children.into_iter().collect()))
    }

    pub fn ord(&mut self, alternatives: impl IntoIterator<Item = ClauseId>) -> ClauseId {
        self.intern(ClauseKind::Ord(alternatives.into_iter().collect()))
    }

    pub fn plus(&mut self, child: ClauseId) -> ClauseId {
        self.intern(ClauseKind::Plus(child))
    }

    pub fn star(&mut self, child: ClauseId) -> ClauseId {
        self.intern(ClauseKind::Star(child))
    }

    pub fn optional(&mut self, child: ClauseId) -> ClauseId {
        self.intern(ClauseKind::Optional(child))
    }

    pub fn followed_by(&mut self, child: ClauseId) -> ClauseId {
        self.intern(ClauseKind::FollowedBy(child))
    }

    pub fn not_followed_by(&mut self, child: ClauseId) -> ClauseId {
        self.intern(ClauseKind::NotFollowedBy(child))
    }

    /// Allocates a named rule that can be referenced before [`define`](Self::define) is called.
    pub fn declare(&mut self, name: &str, visibility: Visibility) -> ClauseId {
        self.push(Slot {
            kind: None,
            name: Some(name.into()),
            visibility,
        })
    }

    /// Gives `rule` the same kind as `body`. The rule keeps its own identity.
    pub fn define(&mut self, rule: ClauseId, body: ClauseId) -> Result<(), GrammarError> {
        let body_kind = match self.slots.get(body.0) {
            None => return Err(GrammarError::UnknownClause(body)),
            Some(Slot {
                kind: Some(kind), ..
            }) => kind.clone(),
            Some(Slot { name, .. }) => {
                return Err(GrammarError::UndefinedRule(
                    name.as_deref().unwrap_or_default().to_owned(),
                ));
            }
        };

        let slot = self
            .slots
            .get_mut(rule.0)
            .ok_or(GrammarError::UnknownClause(rule))?;
        let Some(name) = &slot.name else {
            return Err(GrammarError::NotARule(rule));
        };
        if slot.kind.is_some() {
            return Err(GrammarError::Redefined(name.to_string()));
        }
        slot.kind = Some(body_kind);
        Ok(())
    }

    pub fn rule(
        &mut self,
        name: &str,
        visibility: Visibility,
        body: ClauseId,
    ) -> Result<ClauseId, GrammarError> {
        let rule = self.declare(name, visibility);
        self.define(rule, body)?;
        Ok(rule)
    }

    pub fn build(self) -> Result<Grammar, GrammarError> {
        let mut names = HashSet::new();
        let mut kinds = Vec::with_capacity(self.slots.len());

        for slot in &self.slots {
            if let Some(name) = &slot.name {
                if !names.insert(name) {
                    return Err(GrammarError::DuplicateRule(name.to_string()));
                }
            }
            let Some(kind) = &slot.kind else {
                let name = slot.name.as_deref().unwrap_or_default();
                return Err(GrammarError::UndefinedRule(name.to_owned()));
            };
            if let ClauseKind::Seq(children) | ClauseKind::Ord(children) = kind {
                if children.is_empty() {
                    return Err(GrammarError::EmptyChildren {
                        kind: kind.clause_type(),
                    });
                }
            }
            if let Some(foreign) = kind
                .children()
                .iter()
                .find(|child| child.0 >= self.slots.len())
            {
                return Err(GrammarError::UnknownClause(*foreign));
            }
            kinds.push(kind.clone());
        }

        let labels: Vec<_> = self.slots.iter().map(|s| s.name.as_deref()).collect();
        let displays = notation::display_all(&kinds, &labels);

        let clauses = self
            .slots
            .into_iter()
            .zip(kinds)
            .zip(displays)
            .map(|((slot, kind), display)| Clause {
                kind,
                name: slot.name,
                visibility: slot.visibility,
                display,
            })
            .collect();

        Ok(Grammar { clauses })
    }
}

/// An immutable clause arena. Share it freely; every parse keeps its own memo table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    clauses: Vec<Clause>,
}

impl Grammar {
    pub fn get(&self, id: ClauseId) -> Option<&Clause> {
        self.clauses.get(id.0)
    }

    pub fn contains(&self, id: ClauseId) -> bool {
        id.0 < self.clauses.len()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClauseId, &Clause)> {
        self.clauses
            .iter()
            .enumerate()
            .map(|(n, clause)| (ClauseId(n), clause))
    }

    pub fn find(&self, name: &str) -> Option<ClauseId> {
        self.iter()
            .find(|(_, clause)| clause.label() == Some(name))
            .map(|(id, _)| id)
    }

    pub fn display(&self, id: ClauseId) -> &str {
        self[id].display()
    }

    /// Shorthand for [`Graph::build`].
    pub fn graph(self, toplevel: ClauseId) -> Result<Graph, GrammarError> {
        Graph::build(self, toplevel)
    }
}

/// Panics if `id` was not produced by the builder of this grammar.
impl Index<ClauseId> for Grammar {
    type Output = Clause;

    fn index(&self, id: ClauseId) -> &Clause {
        &self.clauses[id.0]
    }
}
