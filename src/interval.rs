use std::collections::BTreeMap;
use std::ops::Range;

/// A set of disjoint half-open intervals, stored as start -> end.
///
/// Touching intervals are merged, so `[0, 2)` and `[2, 5)` become one segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntervalUnion {
    segments: BTreeMap<usize, usize>,
}

impl IntervalUnion {
    pub fn new() -> IntervalUnion {
        IntervalUnion::default()
    }

    /// Empty intervals are ignored.
    pub fn add_interval(&mut self, start: usize, end: usize) {
        if end <= start {
            return;
        }
        let mut start = start;
        let mut end = end;

        if let Some((&prev_start, &prev_end)) = self.segments.range(..=start).next_back() {
            if prev_end >= start {
                start = prev_start;
                end = end.max(prev_end);
            }
        }

        let absorbed: Vec<_> = self
            .segments
            .range(start..=end)
            .map(|(s, e)| (*s, *e))
            .collect();
        for (s, e) in absorbed {
            end = end.max(e);
            self.segments.remove(&s);
        }
        self.segments.insert(start, end);
    }

    pub fn is_overlap(&self, start: usize, end: usize) -> bool {
        if end <= start {
            return false;
        }
        if let Some((_, &prev_end)) = self.segments.range(..=start).next_back() {
            if prev_end > start {
                return true;
            }
        }
        self.segments.range(start..end).next().is_some()
    }

    /// The gaps of this union within `[start, end)`.
    pub fn invert(&self, start: usize, end: usize) -> IntervalUnion {
        let mut gaps = IntervalUnion::new();
        let mut cursor = start;
        for (&s, &e) in &self.segments {
            if e <= cursor {
                continue;
            }
            if s >= end {
                break;
            }
            if s > cursor {
                gaps.add_interval(cursor, s);
            }
            cursor = e;
        }
        if cursor < end {
            gaps.add_interval(cursor, end);
        }
        gaps
    }

    /// Number of disjoint segments.
    pub fn size(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.segments.iter().map(|(s, e)| *s..*e)
    }

    pub fn contains(&self, point: usize) -> bool {
        self.is_overlap(point, point + 1)
    }
}

impl FromIterator<Range<usize>> for IntervalUnion {
    fn from_iter<I: IntoIterator<Item = Range<usize>>>(iter: I) -> IntervalUnion {
        let mut union = IntervalUnion::new();
        for r in iter {
            union.add_interval(r.start, r.end);
        }
        union
    }
}
