use std::collections::HashSet;

use crate::{
    Grammar,
    clause::{ClauseId, ClauseKind},
};

/// Renders every clause body once. A child that has a label is referred to by it, so the
/// recursion only descends through anonymous clauses.
pub(crate) fn display_all(kinds: &[ClauseKind], labels: &[Option<&str>]) -> Vec<String> {
    let mut renderer = Renderer {
        kinds,
        labels,
        cache: vec![None; kinds.len()],
        in_progress: vec![false; kinds.len()],
    };
    (0..kinds.len()).map(|n| renderer.display(n)).collect()
}

struct Renderer<'a> {
    kinds: &'a [ClauseKind],
    labels: &'a [Option<&'a str>],
    cache: Vec<Option<String>>,
    in_progress: Vec<bool>,
}

impl Renderer<'_> {
    fn reference(&mut self, id: ClauseId) -> String {
        match self.labels.get(id.0) {
            Some(Some(label)) => (*label).to_owned(),
            Some(None) => self.display(id.0),
            None => id.to_string(),
        }
    }

    fn display(&mut self, n: usize) -> String {
        if let Some(done) = &self.cache[n] {
            return done.clone();
        }
        if self.in_progress[n] {
            // Only reachable with ids borrowed from another builder
            return ClauseId(n).to_string();
        }
        self.in_progress[n] = true;

        let rendered = match &self.kinds[n] {
            ClauseKind::Char(c) => format!("'{}'", char::from(*c)),
            ClauseKind::CharRange(lo, hi) => {
                format!("['{}'-'{}']", char::from(*lo), char::from(*hi))
            }
            ClauseKind::Any => "ANYCHAR".to_owned(),
            ClauseKind::Nothing => "NOTHING".to_owned(),
            ClauseKind::First => "^".to_owned(),
            ClauseKind::Seq(children) => self.joined(children, " ~ "),
            ClauseKind::Ord(children) => self.joined(children, " / "),
            ClauseKind::Plus(child) => format!("( {} )+", self.reference(*child)),
            ClauseKind::Star(child) => format!("( {} )*", self.reference(*child)),
            ClauseKind::Optional(child) => format!("( {} )?", self.reference(*child)),
            ClauseKind::FollowedBy(child) => format!("&( {} )", self.reference(*child)),
            ClauseKind::NotFollowedBy(child) => format!("!( {} )", self.reference(*child)),
        };

        self.in_progress[n] = false;
        self.cache[n] = Some(rendered.clone());
        rendered
    }

    fn joined(&mut self, children: &[ClauseId], sep: &'static str) -> String {
        let mut out = String::from("( ");
        for (ind, child) in children.iter().enumerate() {
            if ind > 0 {
                out.push_str(sep);
            }
            let part = self.reference(*child);
            out.push_str(&part);
        }
        out.push_str(" )");
        out
    }
}

impl Grammar {
    /// One `Name <- body` line per labelled clause reachable from `toplevel`, dependencies first.
    pub fn dump(&self, toplevel: ClauseId) -> String {
        let mut output = String::new();
        let mut visited = HashSet::new();
        self.dump_inner(toplevel, &mut visited, &mut output);
        output
    }

    fn dump_inner(&self, id: ClauseId, visited: &mut HashSet<ClauseId>, output: &mut String) {
        let Some(clause) = self.get(id) else {
            return;
        };
        if !visited.insert(id) {
            return;
        }
        for child in clause.children() {
            self.dump_inner(*child, visited, output);
        }
        if let Some(label) = clause.label() {
            output.push_str(&format!("{label} <- {}\n", clause.display()));
        }
    }
}
