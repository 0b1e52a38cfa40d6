use crate::TreeNode;
use bstr::ByteSlice;
use display_tree::{AsTree, DisplayTree, Style};
use std::fmt::Formatter;

impl DisplayTree for TreeNode<'_, '_> {
    fn fmt(&self, f: &mut Formatter, style: Style) -> std::fmt::Result {
        let name = self.name().unwrap_or(self.clause_type().name());
        let span = self.span();
        writeln!(
            f,
            "{} [{}..{}]",
            style.leaf_style.apply(name),
            span.start,
            span.end
        )?;

        if self.is_empty() {
            let content = self.content().to_str_lossy();
            write!(
                f,
                "{}",
                style
                    .branch_style
                    .apply(&format!("{} '{}'", connector(style), content.escape_debug()))
            )
        } else {
            write_children(f, style, self.children())
        }
    }
}

fn connector(style: Style) -> String {
    let bar_width = style.indentation as usize - 1;
    format!(
        "{}{:bar_width$}",
        style.char_set.end_connector, style.char_set.horizontal
    )
}

/// Each child is headed by its index. A vertical bar runs down the margin until the last child.
fn write_children(
    f: &mut Formatter,
    style: Style,
    children: &[TreeNode<'_, '_>],
) -> std::fmt::Result {
    let connector = connector(style);
    let margin = " ".repeat(style.indentation as usize);
    let last = children.len().saturating_sub(1);
    let digits = last.to_string().len();
    let vertical = style
        .branch_style
        .apply(&style.char_set.vertical.to_string());

    for (n, child) in children.iter().enumerate() {
        let joiner = if n < last { vertical.as_str() } else { " " };
        let rendered = AsTree::with_style(child, style).to_string();
        for (line_no, line) in rendered.lines().enumerate() {
            let prefix = if n == 0 && line_no == 0 {
                &connector
            } else {
                &margin
            };
            let line = style.leaf_style.apply(line);
            if line_no == 0 {
                writeln!(f, "{prefix}{n:<0digits$}: {line}")?;
            } else {
                writeln!(f, "{prefix}{joiner} {:digits$}{line}", "")?;
            }
        }
    }
    Ok(())
}
