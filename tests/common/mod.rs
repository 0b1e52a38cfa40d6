#![allow(dead_code)]
use bstr::ByteSlice;
use pika_matcher::{ClauseId, Graph, GrammarBuilder, TreeNode, Visibility};

/// Right-recursive arithmetic over `+`, `*`, brackets and decimal numbers, anchored at both
/// ends of the input.
pub fn arithmetic() -> Graph {
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

    g.build().unwrap().graph(top).unwrap()
}

/// `Add <- ( ( Add ~ '+' ~ Number ) / Number )`, left recursive.
pub fn left_recursive_add() -> Graph {
    let mut g = GrammarBuilder::new();
    let add = g.declare("Add", Visibility::Active);
    let digit = g.range(b'0', b'9');
    let number = g.plus(digit);
    let number = g.rule("Number", Visibility::Active, number).unwrap();
    let plus = g.char(b'+');
    let recurse = g.seq([add, plus, number]);
    let body = g.ord([recurse, number]);
    g.define(add, body).unwrap();
    g.build().unwrap().graph(add).unwrap()
}

/// `MyString <- ( Prefix )*` where `Prefix <- ( ( 'c' )? ~ AorB )` and
/// `AorB <- ( 'a' / 'b' )` are both hidden.
pub fn my_string() -> Graph {
    let mut g = GrammarBuilder::new();
    let a = g.char(b'a');
    let b = g.char(b'b');
    let c = g.char(b'c');
    let a_or_b = g.ord([a, b]);
    let a_or_b = g.rule("AorB", Visibility::Hidden, a_or_b).unwrap();
    let maybe_c = g.optional(c);
    let prefix = g.seq([maybe_c, a_or_b]);
    let prefix = g.rule("Prefix", Visibility::Hidden, prefix).unwrap();
    let string = g.star(prefix);
    let string = g.rule("MyString", Visibility::Active, string).unwrap();
    g.build().unwrap().graph(string).unwrap()
}

/// `List <- ( ( List ~ 'a' ) / 'a' )`
pub fn list() -> Graph {
    let mut g = GrammarBuilder::new();
    let list = g.declare("List", Visibility::Active);
    let a = g.char(b'a');
    let more = g.seq([list, a]);
    let body = g.ord([more, a]);
    g.define(list, body).unwrap();
    g.build().unwrap().graph(list).unwrap()
}

/// `List2 <- ( 'a' )+`
pub fn list2() -> Graph {
    let mut g = GrammarBuilder::new();
    let a = g.char(b'a');
    let many = g.plus(a);
    let list = g.rule("List2", Visibility::Active, many).unwrap();
    g.build().unwrap().graph(list).unwrap()
}

/// Evaluates a tree produced by [`arithmetic`] or [`left_recursive_add`].
pub fn eval(node: &TreeNode<'_, '_>) -> u64 {
    match node.name() {
        Some("Number") => node.content().to_str().unwrap().parse().unwrap(),
        Some("Multiplicative") => node.iter().fold(1, |acc, n| acc.wrapping_mul(eval(n))),
        Some("Additive" | "Add") => node.iter().fold(0, |acc, n| acc.wrapping_add(eval(n))),
        Some("Primary" | "Toplevel") => eval(&node.children()[0]),
        other => panic!("unexpected node {other:?}"),
    }
}

pub fn clause(graph: &Graph, name: &str) -> ClauseId {
    graph
        .grammar()
        .find(name)
        .unwrap_or_else(|| panic!("no rule named {name}"))
}
