use std::collections::HashSet;
use std::rc::Rc;

use log::debug;

use crate::{
    Grammar, Parse,
    clause::ClauseId,
    engine::Sweep,
    error::GrammarError,
    memo::Match,
};

/// Scheduling data for one reachable clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClauseTableEntry {
    pub clause: ClauseId,
    /// 0 for terminals, `1..=N` in post-order for everything else
    pub topological_order: usize,
    /// Clauses to retry whenever this clause gains or improves a match
    pub seeds: Vec<ClauseId>,
}

/// A grammar prepared for bottom-up matching from one toplevel clause.
///
/// Built once and reused for any number of inputs.
#[derive(Debug, Clone)]
pub struct Graph {
    grammar: Grammar,
    toplevel: ClauseId,
    entries: Vec<Option<ClauseTableEntry>>,
    terminals: Vec<ClauseId>,
    nodes: Vec<ClauseId>,
    always_retry: Vec<ClauseId>,
}

impl Graph {
    pub fn build(grammar: Grammar, toplevel: ClauseId) -> Result<Graph, GrammarError> {
        if !grammar.contains(toplevel) {
            return Err(GrammarError::UnknownClause(toplevel));
        }

        let mut visited = HashSet::new();
        let mut terminals = vec![];
        let mut nodes = vec![];
        dfs_traversal(&grammar, toplevel, &mut visited, &mut terminals, &mut nodes);

        let always_retry = nodes
            .iter()
            .copied()
            .filter(|id| grammar[*id].clause_type().is_always_retry())
            .collect();

        let mut entries: Vec<Option<ClauseTableEntry>> = vec![None; grammar.len()];
        for id in &terminals {
            entries[id.0] = Some(ClauseTableEntry {
                clause: *id,
                topological_order: 0,
                seeds: vec![],
            });
        }
        for (n, id) in nodes.iter().enumerate() {
            entries[id.0] = Some(ClauseTableEntry {
                clause: *id,
                topological_order: n + 1,
                seeds: vec![],
            });
        }

        for parent in &nodes {
            for child in grammar[*parent].children() {
                if let Some(entry) = &mut entries[child.0] {
                    if !entry.seeds.contains(parent) {
                        entry.seeds.push(*parent);
                    }
                }
            }
        }

        debug!(
            "graph for {toplevel}: {} terminals, {} non-terminals",
            terminals.len(),
            nodes.len()
        );

        Ok(Graph {
            grammar,
            toplevel,
            entries,
            terminals,
            nodes,
            always_retry,
        })
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn toplevel(&self) -> ClauseId {
        self.toplevel
    }

    /// `None` for clauses not reachable from the toplevel.
    pub fn entry(&self, id: ClauseId) -> Option<&ClauseTableEntry> {
        self.entries.get(id.0).and_then(Option::as_ref)
    }

    pub fn terminals(&self) -> &[ClauseId] {
        &self.terminals
    }

    /// Non-terminals in evaluation order.
    pub fn nodes(&self) -> &[ClauseId] {
        &self.nodes
    }

    pub fn always_retry(&self) -> &[ClauseId] {
        &self.always_retry
    }

    /// Runs the full right-to-left sweep over `target`.
    pub fn parse<'g, 't>(&'g self, target: &'t (impl AsRef<[u8]> + ?Sized)) -> Parse<'g, 't> {
        Sweep::new(self, target.as_ref()).run()
    }

    /// The toplevel match anchored at position 0, discarding the memo table.
    pub fn matches(&self, target: &(impl AsRef<[u8]> + ?Sized)) -> Option<Rc<Match>> {
        self.parse(target).matched().cloned()
    }
}

/// Post-order traversal that expands each clause on its first visit only, so cycles end here.
fn dfs_traversal(
    grammar: &Grammar,
    id: ClauseId,
    visited: &mut HashSet<ClauseId>,
    terminals: &mut Vec<ClauseId>,
    nodes: &mut Vec<ClauseId>,
) {
    if !visited.insert(id) {
        return;
    }
    let clause = &grammar[id];
    if clause.is_terminal() {
        terminals.push(id);
        return;
    }
    for child in clause.children() {
        dfs_traversal(grammar, *child, visited, terminals, nodes);
    }
    nodes.push(id);
}
