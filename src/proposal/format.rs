//! Proposal formatter — turns generated markdown-like text into blocks.
//!
//! This is a narrow, line-oriented pass, not a markdown parser. It knows
//! pipe tables, `##`/`###` headings, `---` rules and `**bold**` spans.
//! Everything else becomes a paragraph, one per non-blank line. Nested
//! emphasis, escaped pipes and multi-line paragraphs are not handled.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// `| a | b |` — a header row needs at least one character between the pipes.
static HEADER_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|(.+)\|$").expect("valid header row regex"));

/// `| a | b |` or `||` — body rows may be empty.
static BODY_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|(.*)\|$").expect("valid body row regex"));

/// `|---|:--:|` — every cell is dashes and colons, optionally padded.
static SEPARATOR_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|( *[-:]+ *\|)+$").expect("valid separator regex"));

static RULE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-{3,}$").expect("valid rule regex"));

static STRONG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid emphasis regex"));

/// A run of inline text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum Inline {
    Text(String),
    Strong(String),
}

/// A pipe table: one header row and zero or more body rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// One display block of the rendered proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// `level` is 2 for `##` and 3 for `###`.
    Heading { level: u8, content: Vec<Inline> },
    Paragraph { content: Vec<Inline> },
    Table(Table),
    Divider,
}

/// The display-ready form of a generated proposal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RenderedProposal {
    pub blocks: Vec<Block>,
}

impl RenderedProposal {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn headings(&self) -> impl Iterator<Item = (u8, String)> + '_ {
        self.blocks.iter().filter_map(|b| match b {
            Block::Heading { level, content } => Some((*level, inline_text(content))),
            _ => None,
        })
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }
}

/// Convert generated proposal text into blocks.
///
/// Never fails: lines that match nothing become paragraphs.
pub fn render(text: &str) -> RenderedProposal {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();

    let mut blocks = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        if let Some((table, consumed)) = parse_table(&lines[i..]) {
            blocks.push(Block::Table(table));
            i += consumed;
            continue;
        }
        if let Some(block) = parse_line(lines[i]) {
            blocks.push(block);
        }
        i += 1;
    }

    RenderedProposal { blocks }
}

/// Try to read a table starting at `lines[0]`; returns it and the line count used.
fn parse_table(lines: &[&str]) -> Option<(Table, usize)> {
    let header = *lines.first()?;
    let separator = *lines.get(1)?;
    if !HEADER_ROW.is_match(header) || !SEPARATOR_ROW.is_match(separator) {
        return None;
    }

    let rows: Vec<Vec<String>> = lines[2..]
        .iter()
        .take_while(|line| BODY_ROW.is_match(line))
        .map(|line| split_cells(line))
        .collect();
    let consumed = 2 + rows.len();

    Some((
        Table {
            header: split_cells(header),
            rows,
        },
        consumed,
    ))
}

/// Cells between the outer pipes, trimmed.
fn split_cells(row: &str) -> Vec<String> {
    let parts: Vec<&str> = row.split('|').collect();
    parts[1..parts.len() - 1]
        .iter()
        .map(|cell| cell.trim().to_string())
        .collect()
}

fn parse_line(line: &str) -> Option<Block> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    if RULE.is_match(trimmed) {
        return Some(Block::Divider);
    }
    if let Some(rest) = trimmed.strip_prefix("### ") {
        return Some(Block::Heading {
            level: 3,
            content: parse_inline(rest.trim()),
        });
    }
    if let Some(rest) = trimmed.strip_prefix("## ") {
        return Some(Block::Heading {
            level: 2,
            content: parse_inline(rest.trim()),
        });
    }
    Some(Block::Paragraph {
        content: parse_inline(trimmed),
    })
}

/// Split text into plain and `**strong**` runs. Unpaired markers stay literal.
pub fn parse_inline(text: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut last = 0;
    for caps in STRONG.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            out.push(Inline::Text(text[last..whole.start()].to_string()));
        }
        out.push(Inline::Strong(inner.as_str().to_string()));
        last = whole.end();
    }
    if last < text.len() {
        out.push(Inline::Text(text[last..].to_string()));
    }
    out
}

pub(crate) fn inline_text(content: &[Inline]) -> String {
    content
        .iter()
        .map(|i| match i {
            Inline::Text(s) | Inline::Strong(s) => s.as_str(),
        })
        .collect()
}
