use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::rc::Rc;

use log::{debug, trace};

use crate::{
    Graph,
    clause::{ClauseId, ClauseKind},
    memo::{Match, MemoKey, MemoTable},
    tree::{TreeNode, reduce},
};

/// Outcome of one sweep: the filled memo table and the toplevel match at position 0, if any.
#[derive(Debug, Clone)]
pub struct Parse<'g, 't> {
    memo: MemoTable<'g, 't>,
    root: Option<Rc<Match>>,
}

impl<'g, 't> Parse<'g, 't> {
    pub fn matched(&self) -> Option<&Rc<Match>> {
        self.root.as_ref()
    }

    pub fn is_match(&self) -> bool {
        self.root.is_some()
    }

    pub fn memo(&self) -> &MemoTable<'g, 't> {
        &self.memo
    }

    pub fn into_memo(self) -> MemoTable<'g, 't> {
        self.memo
    }

    pub fn tree(&self) -> Option<TreeNode<'g, 't>> {
        self.root.as_deref().map(|m| reduce(m, &self.memo))
    }
}

/// Right-to-left column sweep. Positions are only ever visited once: by the time column `p`
/// runs, every match starting after `p` is final.
pub(crate) struct Sweep<'g, 't> {
    graph: &'g Graph,
    memo: MemoTable<'g, 't>,
    column: BinaryHeap<Reverse<(usize, ClauseId)>>,
    /// One past the position of the column being matched
    current_pos: usize,
}

impl<'g, 't> Sweep<'g, 't> {
    pub(crate) fn new(graph: &'g Graph, target: &'t [u8]) -> Sweep<'g, 't> {
        Sweep {
            graph,
            memo: MemoTable::new(graph.grammar(), target),
            column: BinaryHeap::new(),
            current_pos: target.len() + 1,
        }
    }

    pub(crate) fn run(mut self) -> Parse<'g, 't> {
        debug!(
            "sweeping {} columns with {} reachable clauses",
            self.current_pos,
            self.graph.terminals().len() + self.graph.nodes().len()
        );
        while self.match_column() {}

        let root = self.memo.get_at(self.graph.toplevel(), 0).cloned();
        debug!(
            "toplevel {}: {} memo entries, {}",
            self.graph.toplevel(),
            self.memo.len(),
            root.as_ref()
                .map_or_else(|| "no match".to_owned(), |m| format!("length {}", m.length))
        );
        Parse {
            memo: self.memo,
            root,
        }
    }

    fn position(&self) -> usize {
        self.current_pos - 1
    }

    fn schedule(&mut self, id: ClauseId) {
        if let Some(entry) = self.graph.entry(id) {
            self.column.push(Reverse((entry.topological_order, id)));
        }
    }

    /// Runs the worklist for one position to a fixpoint. Returns `false` once position 0 is done.
    fn match_column(&mut self) -> bool {
        if self.current_pos == 0 {
            return false;
        }
        debug_assert!(self.column.is_empty());
        trace!("column {}", self.position());

        let graph = self.graph;
        for id in graph.terminals().iter().chain(graph.always_retry()) {
            self.schedule(*id);
        }
        while let Some(Reverse((_, id))) = self.column.pop() {
            self.match_clause(id);
        }

        self.current_pos -= 1;
        true
    }

    fn try_add(&mut self, clause: ClauseId, length: usize, tie_break: usize, subs: Vec<Rc<Match>>) {
        let key = MemoKey::new(clause, self.position());
        let candidate = Match::new(key, length, tie_break, subs);
        if self.memo.insert_if_better(candidate) {
            trace!("matched {clause} at {}, length {length}: better match", key.position);
            let graph = self.graph;
            if let Some(entry) = graph.entry(clause) {
                for seed in &entry.seeds {
                    self.schedule(*seed);
                }
            }
        } else {
            trace!("matched {clause} at {}, length {length}: not a better match", key.position);
        }
    }

    fn lookup(&self, clause: ClauseId, position: usize) -> Option<Rc<Match>> {
        self.memo.get_at(clause, position).cloned()
    }

    fn match_clause(&mut self, id: ClauseId) {
        let pos = self.position();
        let graph = self.graph;
        let Some(clause) = graph.grammar().get(id) else {
            return;
        };
        trace!("trying {id} ({}) at {pos}", clause.clause_type());

        match clause.kind() {
            ClauseKind::Char(c) => {
                if self.memo.symbol(pos) == Some(*c) {
                    self.try_add(id, 1, 0, vec![]);
                }
            }
            ClauseKind::CharRange(lo, hi) => {
                if self.memo.symbol(pos).is_some_and(|s| (*lo..=*hi).contains(&s)) {
                    self.try_add(id, 1, 0, vec![]);
                }
            }
            ClauseKind::Any => {
                if !self.memo.at_end(pos) {
                    self.try_add(id, 1, 0, vec![]);
                }
            }
            ClauseKind::Nothing => self.try_add(id, 0, 0, vec![]),
            ClauseKind::First => {
                if pos == 0 {
                    self.try_add(id, 0, 0, vec![]);
                }
            }
            ClauseKind::Seq(children) => {
                let mut subs = Vec::with_capacity(children.len());
                let mut end = pos;
                for child in children {
                    let Some(m) = self.lookup(*child, end) else {
                        return;
                    };
                    end += m.length;
                    subs.push(m);
                }
                self.try_add(id, end - pos, 0, subs);
            }
            ClauseKind::Ord(alternatives) => {
                let found = alternatives
                    .iter()
                    .enumerate()
                    .find_map(|(n, alt)| self.lookup(*alt, pos).map(|m| (n, m)));
                if let Some((n, m)) = found {
                    self.try_add(id, m.length, n, vec![m]);
                }
            }
            ClauseKind::Plus(child) | ClauseKind::Star(child) => {
                if let Some(head) = self.lookup(*child, pos) {
                    let (length, subs) = match self.lookup(id, pos + head.length) {
                        Some(tail) => (head.length + tail.length, vec![head, tail]),
                        None => (head.length, vec![head]),
                    };
                    self.try_add(id, length, 0, subs);
                } else if matches!(clause.kind(), ClauseKind::Star(_)) {
                    self.try_add(id, 0, 0, vec![]);
                }
            }
            ClauseKind::Optional(child) => match self.lookup(*child, pos) {
                Some(m) => self.try_add(id, m.length, 0, vec![m]),
                None => self.try_add(id, 0, 0, vec![]),
            },
            ClauseKind::FollowedBy(child) => {
                if self.memo.contains(MemoKey::new(*child, pos)) {
                    self.try_add(id, 0, 0, vec![]);
                }
            }
            // Popped after every lower-ranked clause in this column, so an acyclic child has
            // already had its chance to match here
            ClauseKind::NotFollowedBy(child) => {
                if !self.memo.contains(MemoKey::new(*child, pos)) {
                    self.try_add(id, 0, 0, vec![]);
                }
            }
        }
    }
}
