use std::ops::Range;
use std::rc::Rc;

use bstr::BStr;

use crate::{
    clause::{Clause, ClauseId, ClauseType},
    memo::{Match, MemoTable},
};

/// A visible node of a reduced parse tree. Only active rules produce nodes, except for the
/// root, which is always kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode<'g, 't> {
    clause: ClauseId,
    clause_type: ClauseType,
    name: Option<&'g str>,
    start: usize,
    content: &'t BStr,
    children: Vec<TreeNode<'g, 't>>,
}

impl<'g, 't> TreeNode<'g, 't> {
    pub fn clause(&self) -> ClauseId {
        self.clause
    }

    pub fn clause_type(&self) -> ClauseType {
        self.clause_type
    }

    /// The rule name, or `None` for an anonymous root.
    pub fn name(&self) -> Option<&'g str> {
        self.name
    }

    pub fn is_clause(&self, id: ClauseId) -> bool {
        self.clause == id
    }

    pub fn content(&self) -> &'t BStr {
        self.content
    }

    pub fn span(&self) -> Range<usize> {
        self.start..self.start + self.content.len()
    }

    pub fn children(&self) -> &[TreeNode<'g, 't>] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TreeNode<'g, 't>> {
        self.children.iter()
    }

    /// Nth child. Out of range is `None`.
    pub fn child(&self, n: usize) -> Option<&TreeNode<'g, 't>> {
        self.children.get(n)
    }
}

impl<'a, 'g, 't> IntoIterator for &'a TreeNode<'g, 't> {
    type Item = &'a TreeNode<'g, 't>;
    type IntoIter = std::slice::Iter<'a, TreeNode<'g, 't>>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.iter()
    }
}

impl Drop for TreeNode<'_, '_> {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

/// A node under construction. `pending` is a stack: the next match to splice is on top.
struct Frame<'m, 'g, 't> {
    m: &'m Match,
    clause: Option<&'g Clause>,
    pending: Vec<&'m Match>,
    children: Vec<TreeNode<'g, 't>>,
}

impl<'m, 'g, 't> Frame<'m, 'g, 't> {
    fn new(m: &'m Match, memo: &MemoTable<'g, 't>) -> Frame<'m, 'g, 't> {
        let clause = memo.grammar().get(m.key.clause);
        Frame {
            m,
            clause,
            pending: reversed_elements(m, clause),
            children: vec![],
        }
    }

    fn finish(self, memo: &MemoTable<'g, 't>) -> TreeNode<'g, 't> {
        TreeNode {
            clause: self.m.key.clause,
            clause_type: self.clause.map_or(ClauseType::Seq, Clause::clause_type),
            name: self.clause.and_then(Clause::label),
            start: self.m.start(),
            content: memo.substring(self.m.start(), self.m.length),
            children: self.children,
        }
    }
}

/// Builds the visible tree for `m`. Transparent clauses below the root are spliced into their
/// parent, and repetition chains come out as one flat list of elements.
pub fn reduce<'g, 't>(m: &Match, memo: &MemoTable<'g, 't>) -> TreeNode<'g, 't> {
    let grammar = memo.grammar();
    let mut parents: Vec<Frame<'_, 'g, 't>> = vec![];
    let mut frame = Frame::new(m, memo);
    loop {
        match frame.pending.pop() {
            Some(sub) => {
                let clause = grammar.get(sub.key.clause);
                if clause.is_some_and(Clause::is_active) {
                    parents.push(std::mem::replace(&mut frame, Frame::new(sub, memo)));
                } else {
                    frame.pending.extend(reversed_elements(sub, clause));
                }
            }
            None => {
                let node = frame.finish(memo);
                match parents.pop() {
                    Some(parent) => {
                        frame = parent;
                        frame.children.push(node);
                    }
                    None => return node,
                }
            }
        }
    }
}

fn reversed_elements<'m>(m: &'m Match, clause: Option<&Clause>) -> Vec<&'m Match> {
    let mut subs = elements(m, clause.map(Clause::clause_type));
    subs.reverse();
    subs
}

/// Direct sub-matches, with a `Plus`/`Star` chain unrolled into its elements.
fn elements(m: &Match, clause_type: Option<ClauseType>) -> Vec<&Match> {
    if !clause_type.is_some_and(ClauseType::is_repetition) {
        return m.sub_matches.iter().map(Rc::as_ref).collect();
    }

    let mut out: Vec<&Match> = vec![];
    let mut link = m;
    loop {
        match link.sub_matches.as_slice() {
            [element, rest] if rest.key.clause == m.key.clause => {
                out.push(Rc::as_ref(element));
                link = Rc::as_ref(rest);
            }
            subs => {
                out.extend(subs.iter().map(Rc::as_ref));
                break;
            }
        }
    }
    out
}
