use std::collections::{BTreeMap, HashMap};
use std::ops::Range;
use std::rc::Rc;

use bstr::BStr;

use crate::{
    Grammar,
    clause::{ClauseId, ClauseType},
};

/// Identifies the single canonical match of a clause at a start position.
///
/// Only these two fields take part in equality and hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemoKey {
    pub clause: ClauseId,
    pub position: usize,
}

impl MemoKey {
    pub fn new(clause: ClauseId, position: usize) -> MemoKey {
        MemoKey { clause, position }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub key: MemoKey,
    pub length: usize,
    /// For `Ord`, the ordinal of the alternative that produced this match
    pub tie_break_index: usize,
    /// One entry per consumed child. Repetitions nest: `[element, rest-of-repetition]`.
    pub sub_matches: Vec<Rc<Match>>,
}

impl Match {
    pub fn new(
        key: MemoKey,
        length: usize,
        tie_break_index: usize,
        sub_matches: Vec<Rc<Match>>,
    ) -> Match {
        Match {
            key,
            length,
            tie_break_index,
            sub_matches,
        }
    }

    pub fn start(&self) -> usize {
        self.key.position
    }

    pub fn end(&self) -> usize {
        self.key.position + self.length
    }

    pub fn span(&self) -> Range<usize> {
        self.start()..self.end()
    }

    /// Ordered choice prefers the earlier alternative and, within one alternative, the
    /// longer match; every other kind prefers the longer match.
    pub fn is_better_than(&self, that: &Match, clause_type: ClauseType) -> bool {
        if std::ptr::eq(self, that) {
            return false;
        }
        if clause_type == ClauseType::Ord {
            self.tie_break_index < that.tie_break_index
                || (self.tie_break_index == that.tie_break_index && self.length > that.length)
        } else {
            self.length > that.length
        }
    }
}

// Repetitions nest one link per element, so long inputs build chains as deep as the input.
impl Drop for Match {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.sub_matches);
        while let Some(sub) = stack.pop() {
            if let Some(mut m) = Rc::into_inner(sub) {
                stack.append(&mut m.sub_matches);
            }
        }
    }
}

/// Best-known matches for one input, keyed by clause and start position.
#[derive(Debug, Clone)]
pub struct MemoTable<'g, 't> {
    grammar: &'g Grammar,
    target: &'t [u8],
    entries: HashMap<MemoKey, Rc<Match>>,
}

impl<'g, 't> MemoTable<'g, 't> {
    pub fn new(grammar: &'g Grammar, target: &'t [u8]) -> MemoTable<'g, 't> {
        MemoTable {
            grammar,
            target,
            entries: HashMap::new(),
        }
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn target(&self) -> &'t [u8] {
        self.target
    }

    pub fn symbol(&self, index: usize) -> Option<u8> {
        self.target.get(index).copied()
    }

    pub fn at_end(&self, index: usize) -> bool {
        self.target.len() <= index
    }

    /// Clamped to the end of the input.
    pub fn substring(&self, start: usize, length: usize) -> &'t BStr {
        let start = start.min(self.target.len());
        let end = start.saturating_add(length).min(self.target.len());
        BStr::new(&self.target[start..end])
    }

    pub fn get(&self, key: MemoKey) -> Option<&Rc<Match>> {
        self.entries.get(&key)
    }

    pub fn get_at(&self, clause: ClauseId, position: usize) -> Option<&Rc<Match>> {
        self.get(MemoKey::new(clause, position))
    }

    pub fn contains(&self, key: MemoKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stores `candidate` if there is no match for its key yet or it ranks higher than the
    /// stored one. Returns whether the table changed.
    pub fn insert_if_better(&mut self, candidate: Match) -> bool {
        let clause_type = self
            .grammar
            .get(candidate.key.clause)
            .map_or(ClauseType::Seq, |c| c.clause_type());

        let replace = self
            .entries
            .get(&candidate.key)
            .is_none_or(|incumbent| candidate.is_better_than(incumbent, clause_type));
        if replace {
            self.entries.insert(candidate.key, Rc::new(candidate));
        }
        replace
    }

    /// Every stored match of `clause`, keyed by start position.
    pub fn ordered_matches(&self, clause: ClauseId) -> BTreeMap<usize, Rc<Match>> {
        self.entries
            .iter()
            .filter(|(key, _)| key.clause == clause)
            .map(|(key, m)| (key.position, Rc::clone(m)))
            .collect()
    }
}

/// Picks matches left to right, skipping any that start inside the previously picked one.
/// Zero-length matches cover nothing and are skipped.
pub fn nonoverlapping_matches(matches: &BTreeMap<usize, Rc<Match>>) -> Vec<Rc<Match>> {
    let mut picked: Vec<Rc<Match>> = vec![];
    let mut covered_until = 0;
    for (start, m) in matches {
        if m.length == 0 || *start < covered_until {
            continue;
        }
        covered_until = m.end();
        picked.push(Rc::clone(m));
    }
    picked
}
