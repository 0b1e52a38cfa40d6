use std::collections::HashSet;
use std::rc::Rc;

use log::trace;

use crate::{
    Grammar,
    clause::{ClauseId, ClauseKind},
    memo::{Match, MemoKey, MemoTable},
};

/// Top-down memoizing matcher over the same clause model as [`Graph`](crate::Graph).
///
/// Every key is evaluated at most once. A key is marked before its clause runs, so a
/// left-recursive reference sees a failure instead of recursing; left recursion therefore
/// never grows here.
#[derive(Debug)]
pub struct Packrat<'g, 't> {
    memo: MemoTable<'g, 't>,
    attempted: HashSet<MemoKey>,
}

impl<'g, 't> Packrat<'g, 't> {
    pub fn new(grammar: &'g Grammar, target: &'t (impl AsRef<[u8]> + ?Sized)) -> Packrat<'g, 't> {
        Packrat {
            memo: MemoTable::new(grammar, target.as_ref()),
            attempted: HashSet::new(),
        }
    }

    pub fn memo(&self) -> &MemoTable<'g, 't> {
        &self.memo
    }

    pub fn into_memo(self) -> MemoTable<'g, 't> {
        self.memo
    }

    pub fn match_at(&mut self, clause: ClauseId, index: usize) -> Option<Rc<Match>> {
        let key = MemoKey::new(clause, index);
        if !self.attempted.insert(key) {
            return self.memo.get(key).cloned();
        }

        let grammar = self.memo.grammar();
        let kind = grammar.get(clause)?.kind();
        let (length, tie_break, subs) = self.evaluate(clause, kind, index)?;
        trace!("packrat matched {clause} at {index}, length {length}");

        self.memo
            .insert_if_better(Match::new(key, length, tie_break, subs));
        self.memo.get(key).cloned()
    }

    fn evaluate(
        &mut self,
        clause: ClauseId,
        kind: &ClauseKind,
        index: usize,
    ) -> Option<(usize, usize, Vec<Rc<Match>>)> {
        let symbol = self.memo.symbol(index);
        match kind {
            ClauseKind::Char(c) => (symbol == Some(*c)).then(|| (1, 0, vec![])),
            ClauseKind::CharRange(lo, hi) => symbol
                .is_some_and(|s| (*lo..=*hi).contains(&s))
                .then(|| (1, 0, vec![])),
            ClauseKind::Any => symbol.map(|_| (1, 0, vec![])),
            ClauseKind::Nothing => Some((0, 0, vec![])),
            ClauseKind::First => (index == 0).then(|| (0, 0, vec![])),
            ClauseKind::Seq(children) => {
                let mut subs = Vec::with_capacity(children.len());
                let mut end = index;
                for child in children {
                    let m = self.match_at(*child, end)?;
                    end += m.length;
                    subs.push(m);
                }
                Some((end - index, 0, subs))
            }
            ClauseKind::Ord(alternatives) => alternatives
                .iter()
                .enumerate()
                .find_map(|(n, alt)| self.match_at(*alt, index).map(|m| (m.length, n, vec![m]))),
            ClauseKind::Plus(child) | ClauseKind::Star(child) => {
                match self.match_at(*child, index) {
                    Some(head) => match self.match_at(clause, index + head.length) {
                        Some(tail) => Some((head.length + tail.length, 0, vec![head, tail])),
                        None => Some((head.length, 0, vec![head])),
                    },
                    None if matches!(kind, ClauseKind::Star(_)) => Some((0, 0, vec![])),
                    None => None,
                }
            }
            ClauseKind::Optional(child) => Some(match self.match_at(*child, index) {
                Some(m) => (m.length, 0, vec![m]),
                None => (0, 0, vec![]),
            }),
            ClauseKind::FollowedBy(child) => {
                self.match_at(*child, index).map(|_| (0, 0, vec![]))
            }
            ClauseKind::NotFollowedBy(child) => {
                self.match_at(*child, index).is_none().then(|| (0, 0, vec![]))
            }
        }
    }
}
