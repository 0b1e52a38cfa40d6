use bstr::ByteSlice;
use crate::{ClauseId, Graph, GrammarBuilder, IntervalUnion, Packrat, TreeNode, Visibility};
use proptest::prelude::*;
use proptest::prop_oneof;

const BOUND: usize = 48;

struct Arithmetic {
    graph: Graph,
    number: ClauseId,
    primary: ClauseId,
    multiplicative: ClauseId,
    additive: ClauseId,
}

fn arithmetic() -> Arithmetic {
    let mut g = GrammarBuilder::new();
    let additive = g.declare("Additive", Visibility::Active);
    let multiplicative = g.declare("Multiplicative", Visibility::Active);

    let digit = g.range(b'0', b'9');
    let digit = g.rule("Digit", Visibility::Hidden, digit).unwrap();
    let number = g.plus(digit);
    let number = g.rule("Number", Visibility::Active, number).unwrap();

    let open = g.char(b'(');
    let close = g.char(b')');
    let group = g.seq([open, additive, close]);
    let primary = g.ord([group, number]);
    let primary = g.rule("Primary", Visibility::Active, primary).unwrap();

    let star = g.char(b'*');
    let product = g.seq([primary, star, multiplicative]);
    let body = g.ord([product, primary]);
    g.define(multiplicative, body).unwrap();

    let plus = g.char(b'+');
    let sum = g.seq([multiplicative, plus, additive]);
    let body = g.ord([sum, multiplicative]);
    g.define(additive, body).unwrap();

    let first = g.first();
    let any = g.any();
    let end = g.not_followed_by(any);
    let top = g.seq([first, additive, end]);
    let top = g.rule("Toplevel", Visibility::Active, top).unwrap();

    Arithmetic {
        graph: g.build().unwrap().graph(top).unwrap(),
        number,
        primary,
        multiplicative,
        additive,
    }
}

impl Arithmetic {
    fn eval(&self, node: &TreeNode<'_, '_>) -> u64 {
        let id = node.clause();
        if id == self.number {
            node.content().to_str().unwrap().parse().unwrap()
        } else if id == self.multiplicative {
            node.iter()
                .fold(1, |acc: u64, child| acc.wrapping_mul(self.eval(child)))
        } else if id == self.additive {
            node.iter()
                .fold(0, |acc: u64, child| acc.wrapping_add(self.eval(child)))
        } else {
            assert!(id == self.primary || node.name() == Some("Toplevel"));
            self.eval(node.child(0).unwrap())
        }
    }
}

#[derive(Debug, Clone)]
enum Expr {
    Number(u64),
    Add(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Group(Box<Expr>),
}

impl Expr {
    fn render(&self) -> String {
        match self {
            Expr::Number(n) => n.to_string(),
            Expr::Add(a, b) => format!("{}+{}", a.render(), b.render()),
            Expr::Mul(a, b) => format!("{}*{}", a.operand(), b.operand()),
            Expr::Group(e) => format!("({})", e.render()),
        }
    }

    /// Sums bind looser than products, so they need brackets under `*`.
    fn operand(&self) -> String {
        match self {
            Expr::Add(..) => format!("({})", self.render()),
            _ => self.render(),
        }
    }

    fn value(&self) -> u64 {
        match self {
            Expr::Number(n) => *n,
            Expr::Add(a, b) => a.value().wrapping_add(b.value()),
            Expr::Mul(a, b) => a.value().wrapping_mul(b.value()),
            Expr::Group(e) => e.value(),
        }
    }
}

fn expr_strategy() -> impl Strategy<Value = Expr> {
    let leaf = (0u64..10_000).prop_map(Expr::Number);
    leaf.prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::Add(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::Mul(Box::new(a), Box::new(b))),
            inner.prop_map(|e| Expr::Group(Box::new(e))),
        ]
    })
}

fn bitmap(intervals: &[(usize, usize)]) -> [bool; BOUND] {
    let mut covered = [false; BOUND];
    for (start, len) in intervals {
        for slot in &mut covered[*start..(*start + *len).min(BOUND)] {
            *slot = true;
        }
    }
    covered
}

fn runs(covered: &[bool], value: bool) -> Vec<std::ops::Range<usize>> {
    let mut out = vec![];
    let mut start = None;
    for (n, bit) in covered.iter().chain([&!value]).enumerate() {
        match (start, *bit == value) {
            (None, true) => start = Some(n),
            (Some(s), false) => {
                out.push(s..n);
                start = None;
            }
            _ => {}
        }
    }
    out
}

#[test]
fn grammar_dump() {
    let arith = arithmetic();
    insta::assert_snapshot!(arith.graph.grammar().dump(arith.graph.toplevel()), @r"
    Digit <- ['0'-'9']
    Number <- ( Digit )+
    Primary <- ( ( '(' ~ Additive ~ ')' ) / Number )
    Multiplicative <- ( ( Primary ~ '*' ~ Multiplicative ) / Primary )
    Additive <- ( ( Multiplicative ~ '+' ~ Additive ) / Multiplicative )
    Toplevel <- ( ^ ~ Additive ~ !( ANYCHAR ) )
    ");
}

proptest! {
    #[test]
    fn evaluates_generated_arithmetic(expr in expr_strategy()) {
        let arith = arithmetic();
        let src = expr.render();
        let parse = arith.graph.parse(&src);
        let tree = parse.tree().unwrap_or_else(|| panic!("no match for {src}"));

        prop_assert_eq!(tree.span(), 0..src.len());
        prop_assert_eq!(arith.eval(&tree), expr.value(), "{}", src);
    }
}

proptest! {
    #[test]
    fn pika_agrees_with_packrat(expr in expr_strategy()) {
        let arith = arithmetic();
        let src = expr.render();
        let toplevel = arith.graph.toplevel();

        let pika = arith.graph.parse(&src);
        let mut packrat = Packrat::new(arith.graph.grammar(), &src);
        let top_down = packrat.match_at(toplevel, 0);

        prop_assert_eq!(pika.matched().map(|m| m.length), top_down.as_ref().map(|m| m.length));
        let top_down_tree = top_down.map(|m| crate::reduce(&m, packrat.memo()));
        prop_assert_eq!(pika.tree(), top_down_tree);
    }
}

proptest! {
    #[test]
    fn repeated_parses_are_identical(expr in expr_strategy()) {
        let arith = arithmetic();
        let src = expr.render();

        let first = arith.graph.parse(&src);
        let second = arith.graph.parse(&src);
        prop_assert_eq!(first.matched(), second.matched());
        prop_assert_eq!(first.tree(), second.tree());
    }
}

proptest! {
    #[test]
    fn interval_union_matches_bitmap(
        intervals in prop::collection::vec((0..BOUND, 0..8usize), 0..12),
        query in (0..BOUND, 1..8usize),
    ) {
        let clipped: Vec<_> = intervals
            .iter()
            .map(|&(start, len)| (start, len.min(BOUND - start)))
            .collect();
        let union: IntervalUnion = clipped.iter().map(|(s, l)| *s..*s + *l).collect();
        let covered = bitmap(&clipped);

        let segments: Vec<_> = union.segments().collect();
        prop_assert_eq!(segments, runs(&covered, true));
        prop_assert_eq!(union.size(), runs(&covered, true).len());

        let gaps: Vec<_> = union.invert(0, BOUND).segments().collect();
        prop_assert_eq!(gaps, runs(&covered, false));

        let (start, len) = query;
        let end = (start + len).min(BOUND);
        prop_assert_eq!(union.is_overlap(start, end), covered[start..end].contains(&true));
    }
}
