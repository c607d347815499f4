//! Edge-list text format.
//!
//! ```text
//! # comment
//! lonely                 # declares an isolated node
//! a -> b                 # edge with weight 0
//! a -> c -3              # edge with explicit weight
//! "with space" -> b 2    # quoted ids may contain anything
//! ```
//!
//! Edge endpoints are created on first mention.

use std::fmt::Write as _;

use mcis_core::Graph;

use crate::error::FormatError;

const ARROW: &str = "->";

#[derive(Debug, PartialEq, Eq)]
struct Token {
    text: String,
    quoted: bool,
}

fn parse_error(line: usize, message: impl Into<String>) -> FormatError {
    FormatError::Parse {
        line,
        message: message.into(),
    }
}

/// Split a line into tokens, dropping any trailing `#` comment.
fn tokenize(line: &str, line_no: usize) -> Result<Vec<Token>, FormatError> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '#' {
            break;
        } else if c == '"' {
            chars.next();
            let mut text = String::new();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '\\' => match chars.next() {
                        Some(escaped) => text.push(escaped),
                        None => return Err(parse_error(line_no, "dangling escape")),
                    },
                    '"' => {
                        closed = true;
                        break;
                    }
                    _ => text.push(c),
                }
            }
            if !closed {
                return Err(parse_error(line_no, "unterminated quoted id"));
            }
            tokens.push(Token { text, quoted: true });
        } else {
            let mut text = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() || c == '#' || c == '"' {
                    break;
                }
                text.push(c);
                chars.next();
            }
            tokens.push(Token {
                text,
                quoted: false,
            });
        }
    }
    Ok(tokens)
}

fn ensure_node(graph: &mut Graph, id: &str) {
    if !graph.contains_node(id) {
        // Absence was just checked.
        let _ = graph.add_node(id);
    }
}

/// Parse an edge list into a graph.
pub fn parse_edge_list(text: &str) -> Result<Graph, FormatError> {
    let mut graph = Graph::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let tokens = tokenize(raw, line)?;

        match tokens.as_slice() {
            [] => {}
            [node] => ensure_node(&mut graph, &node.text),
            [from, arrow, to, rest @ ..] if !arrow.quoted && arrow.text == ARROW => {
                let weight = match rest {
                    [] => 0,
                    [w] if !w.quoted => w.text.parse::<i32>().map_err(|_| {
                        parse_error(line, format!("invalid weight '{}'", w.text))
                    })?,
                    _ => return Err(parse_error(line, "expected `from -> to [weight]`")),
                };
                ensure_node(&mut graph, &from.text);
                ensure_node(&mut graph, &to.text);
                graph
                    .add_edge(&from.text, &to.text, weight)
                    .map_err(|source| FormatError::Graph { line, source })?;
            }
            _ => {
                return Err(parse_error(
                    line,
                    "expected a node id or `from -> to [weight]`",
                ))
            }
        }
    }

    Ok(graph)
}

fn needs_quotes(id: &str) -> bool {
    id.is_empty()
        || id == ARROW
        || id
            .chars()
            .any(|c| c.is_whitespace() || c == '#' || c == '"' || c == '\\')
}

fn format_id(id: &str) -> String {
    if !needs_quotes(id) {
        return id.to_string();
    }
    let mut out = String::with_capacity(id.len() + 2);
    out.push('"');
    for c in id.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Render a graph as an edge list that [`parse_edge_list`] reads back to an
/// equal graph. Output is sorted by node id.
pub fn write_edge_list(graph: &Graph) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "# {} node(s), {} edge(s)",
        graph.node_count(),
        graph.edge_count()
    );
    for id in graph.node_ids_sorted() {
        let Some(node) = graph.get_node(id) else {
            continue;
        };
        if node.is_source() && node.is_sink() {
            let _ = writeln!(out, "{}", format_id(id));
        }
        for (child, weight) in node.children() {
            let _ = writeln!(out, "{} -> {} {weight}", format_id(id), format_id(child));
        }
    }
    out
}
