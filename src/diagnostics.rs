use std::io;
use std::ops::Range;

use ariadne::{Config, IndexType, Label, Report, ReportKind, Source};

use crate::{
    clause::ClauseId,
    interval::IntervalUnion,
    memo::{MemoTable, nonoverlapping_matches},
};

/// A region of the input that no match of the coverage clause accounts for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub span: Range<usize>,
    /// Rule name or notation of the clause that was expected to cover the region
    pub expected: String,
}

impl SyntaxError {
    pub fn report(&self) -> Report<'static, Range<usize>> {
        Report::build(ReportKind::Error, self.span.clone())
            .with_config(
                Config::default()
                    .with_color(false)
                    .with_index_type(IndexType::Byte),
            )
            .with_message(format!("input not matched by {}", self.expected))
            .with_label(
                Label::new(self.span.clone())
                    .with_message(format!("{} bytes unmatched", self.span.len())),
            )
            .finish()
    }

    /// Renders the report against `source`, which should be the text that was parsed.
    pub fn write(&self, source: &str, w: impl io::Write) -> io::Result<()> {
        self.report().write(Source::from(source), w)
    }
}

/// Gaps between the non-overlapping matches of `clause`, left to right.
///
/// A memo table from a completed sweep holds every match of every clause, so passing a
/// statement-level rule here reports the stretches that could not be parsed as any statement.
pub fn syntax_errors(memo: &MemoTable<'_, '_>, clause: ClauseId) -> Vec<SyntaxError> {
    let expected = memo.grammar().get(clause).map_or_else(
        || clause.to_string(),
        |c| c.label().unwrap_or(c.display()).to_owned(),
    );

    let covered: IntervalUnion = nonoverlapping_matches(&memo.ordered_matches(clause))
        .iter()
        .map(|m| m.span())
        .collect();

    covered
        .invert(0, memo.target().len())
        .segments()
        .map(|span| SyntaxError {
            span,
            expected: expected.clone(),
        })
        .collect()
}
