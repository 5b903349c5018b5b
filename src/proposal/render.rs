//! Output targets for a rendered proposal: HTML and plain terminal text.

use super::format::{Block, Inline, RenderedProposal, Table, inline_text, parse_inline};

const TERMINAL_RULE_WIDTH: usize = 60;

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn inline_html(content: &[Inline]) -> String {
    content
        .iter()
        .map(|i| match i {
            Inline::Text(s) => escape_html(s),
            Inline::Strong(s) => format!("<strong>{}</strong>", escape_html(s)),
        })
        .collect()
}

fn cell_html(tag: &str, cell: &str) -> String {
    format!("<{tag}>{}</{tag}>", inline_html(&parse_inline(cell)))
}

fn table_html(table: &Table) -> String {
    let head: String = table.header.iter().map(|c| cell_html("th", c)).collect();
    let body: String = table
        .rows
        .iter()
        .map(|row| {
            let cells: String = row.iter().map(|c| cell_html("td", c)).collect();
            format!("<tr>{cells}</tr>")
        })
        .collect();
    format!("<table><thead><tr>{head}</tr></thead><tbody>{body}</tbody></table>")
}

/// Width of the widest cell per column, counted in chars.
fn column_widths(table: &Table) -> Vec<usize> {
    let columns = table
        .rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(table.header.len()))
        .max()
        .unwrap_or(0);
    let mut widths = vec![0; columns];
    for row in std::iter::once(&table.header).chain(table.rows.iter()) {
        for (i, cell) in row.iter().enumerate() {
            let width = inline_text(&parse_inline(cell)).chars().count();
            widths[i] = widths[i].max(width);
        }
    }
    widths
}

fn table_row_terminal(row: &[String], widths: &[usize]) -> String {
    let cells: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(i, width)| {
            let cell = row
                .get(i)
                .map(|c| inline_text(&parse_inline(c)))
                .unwrap_or_default();
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    format!("| {} |", cells.join(" | "))
}

fn table_terminal(table: &Table) -> String {
    let widths = column_widths(table);
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat((*w).max(1))).collect();
    let mut lines = vec![
        table_row_terminal(&table.header, &widths),
        format!("|-{}-|", separator.join("-|-")),
    ];
    lines.extend(table.rows.iter().map(|row| table_row_terminal(row, &widths)));
    lines.join("\n")
}

impl RenderedProposal {
    /// Semantic HTML. Text is escaped; emphasis becomes `<strong>`.
    pub fn to_html(&self) -> String {
        self.blocks
            .iter()
            .map(|block| match block {
                Block::Heading { level, content } => {
                    format!("<h{level}>{}</h{level}>", inline_html(content))
                }
                Block::Paragraph { content } => format!("<p>{}</p>", inline_html(content)),
                Block::Table(table) => table_html(table),
                Block::Divider => "<hr>".to_string(),
            })
            .collect()
    }

    /// Plain text for a terminal: underlined headings, aligned tables.
    pub fn to_terminal(&self) -> String {
        let mut out: Vec<String> = Vec::with_capacity(self.blocks.len());
        for block in &self.blocks {
            match block {
                Block::Heading { level, content } => {
                    let text = inline_text(content);
                    let underline = if *level == 2 { '=' } else { '-' };
                    let rule: String = std::iter::repeat_n(underline, text.chars().count()).collect();
                    out.push(format!("\n{text}\n{rule}"));
                }
                Block::Paragraph { content } => out.push(inline_text(content)),
                Block::Table(table) => out.push(table_terminal(table)),
                Block::Divider => out.push("-".repeat(TERMINAL_RULE_WIDTH)),
            }
        }
        out.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use crate::proposal::format::render;

    #[test]
    fn html_for_each_block_kind() {
        let html = render("## Title\n### Sub\n---\nSome **bold** text\n").to_html();
        assert_eq!(
            html,
            "<h2>Title</h2><h3>Sub</h3><hr><p>Some <strong>bold</strong> text</p>"
        );
    }

    #[test]
    fn html_table() {
        let html = render("| A | **B** |\n|---|---|\n| 1 | 2 |\n").to_html();
        assert_eq!(
            html,
            "<table><thead><tr><th>A</th><th><strong>B</strong></th></tr></thead>\
             <tbody><tr><td>1</td><td>2</td></tr></tbody></table>"
        );
    }

    #[test]
    fn html_escapes_text() {
        let html = render("<script>alert('x')</script> & more").to_html();
        assert_eq!(
            html,
            "<p>&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; more</p>"
        );
    }

    #[test]
    fn terminal_aligns_table_columns() {
        let out = render("| Module | Time |\n|---|---|\n| Intro | 2h |\n| Deep dive | 10h |\n")
            .to_terminal();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "| Module    | Time |");
        assert_eq!(lines[1], "|-----------|------|");
        assert_eq!(lines[2], "| Intro     | 2h   |");
        assert_eq!(lines[3], "| Deep dive | 10h  |");
    }

    #[test]
    fn terminal_underlines_headings_and_drops_markers() {
        let out = render("## Plan\n**Note:** keep it short").to_terminal();
        assert!(out.contains("Plan\n===="));
        assert!(out.contains("Note: keep it short"));
        assert!(!out.contains("**"));
    }

    #[test]
    fn ragged_rows_are_padded() {
        let out = render("| a | b | c |\n|---|---|---|\n| 1 |\n").to_terminal();
        assert_eq!(out.lines().nth(2), Some("| 1 |   |   |"));
    }
}
