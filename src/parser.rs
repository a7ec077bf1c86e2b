use std::collections::HashMap;

use winnow::prelude::*;
use winnow::ascii::{space0, space1};
use winnow::combinator::{alt, eof, opt};
use winnow::token::{rest, take_while};

use crate::ast::*;
use crate::ident::node_id;
use crate::props::property_block;

/// Parse FlowDSL source into a diagram. Best-effort: lines that match no
/// rule are dropped, the call itself never fails.
pub fn parse_diagram(source: &str) -> FlowDiagram {
    let mut diagram = FlowDiagram::default();
    let mut open_subgraph: Option<Subgraph> = None;

    for raw in source.lines() {
        if let Some(line) = classify(raw.trim()) {
            collect(line, &mut diagram, &mut open_subgraph);
        }
    }
    // A subgraph still open at end of input was never finalized; its nodes
    // stay in the diagram, the grouping is lost.
    diagram
}

#[derive(Debug)]
enum Line {
    Title(String),
    Direction(Direction),
    SubgraphOpen(Subgraph),
    SubgraphClose,
    Relationships(Vec<Relationship>),
    Node(NodeDef),
}

fn classify(line: &str) -> Option<Line> {
    if line.is_empty() || line.starts_with("//") {
        return None;
    }
    if let Ok(title) = title_line.parse(line) {
        return Some(Line::Title(title));
    }
    if let Ok(direction) = direction_line.parse(line) {
        return Some(Line::Direction(direction));
    }
    if line == "}" {
        return Some(Line::SubgraphClose);
    }
    // The operator scan must run before the subgraph and node rules.
    if line.contains(" > ") || line.contains(" < ") {
        return Some(Line::Relationships(parse_relationship_line(line)));
    }
    if let Some(decl) = line.strip_suffix('{') {
        let (label, mut props) = labeled_decl.parse(decl.trim_end()).ok()?;
        return Some(Line::SubgraphOpen(Subgraph {
            id: node_id(&label),
            label,
            nodes: Vec::new(),
            color: props.remove("color"),
            icon: props.remove("icon"),
        }));
    }
    node_line(line)
}

fn collect(line: Line, diagram: &mut FlowDiagram, open_subgraph: &mut Option<Subgraph>) {
    match line {
        Line::Title(title) => diagram.title = Some(title),
        Line::Direction(direction) => diagram.direction = direction,
        Line::SubgraphOpen(subgraph) => *open_subgraph = Some(subgraph),
        Line::SubgraphClose => {
            if let Some(subgraph) = open_subgraph.take() {
                diagram.subgraphs.push(subgraph);
            }
        }
        Line::Relationships(relationships) => diagram.relationships.extend(relationships),
        Line::Node(node) => {
            if let Some(subgraph) = open_subgraph.as_mut() {
                subgraph.nodes.push(node.id.clone());
            }
            // Colliding ids overwrite the earlier definition in place.
            diagram.nodes.insert(node.id.clone(), node);
        }
    }
}

fn title_line(input: &mut &str) -> winnow::Result<String> {
    "title".parse_next(input)?;
    space1.parse_next(input)?;
    let text = rest.parse_next(input)?;
    Ok(text.to_string())
}

fn direction_line(input: &mut &str) -> winnow::Result<Direction> {
    "direction".parse_next(input)?;
    space1.parse_next(input)?;
    let word = rest.parse_next(input)?;
    Ok(Direction::from_keyword(word))
}

fn node_line(line: &str) -> Option<Line> {
    let (label, mut props) = labeled_decl.parse(line).ok()?;
    // A leftover operator marks a relationship line the scan did not
    // recognize; drop it instead of declaring a broken node.
    if label.contains('>') || label.contains('<') {
        return None;
    }
    Some(Line::Node(NodeDef {
        id: node_id(&label),
        label,
        shape: props.remove("shape"),
        color: props.remove("color"),
        icon: props.remove("icon"),
    }))
}

/// `<label>` with an optional trailing `[key: value, ...]` block. The label
/// is either quoted (brackets inside are literal) or bare text up to the
/// block.
fn labeled_decl(input: &mut &str) -> winnow::Result<(String, HashMap<String, String>)> {
    alt((
        (quoted_label, space0, opt(property_block), space0, eof)
            .map(|(label, _, props, _, _)| (label, props.unwrap_or_default())),
        (take_while(0.., |c: char| c != '['), opt(property_block), space0, eof).map(
            |(label, props, _, _): (&str, Option<HashMap<String, String>>, &str, &str)| {
                (label.trim_end().to_string(), props.unwrap_or_default())
            },
        ),
        rest.map(|line: &str| (strip_quotes(line).to_string(), HashMap::new())),
    ))
    .parse_next(input)
}

fn quoted_label(input: &mut &str) -> winnow::Result<String> {
    "\"".parse_next(input)?;
    let text = take_while(0.., |c: char| c != '"').parse_next(input)?;
    "\"".parse_next(input)?;
    Ok(text.to_string())
}

/// Split a relationship line on ` > ` / ` < ` into a chain of edges.
///
/// `A > B` points A at B; `A < B` is the same edge written backwards, so the
/// endpoints swap. Every operand after the first may carry a `: label`
/// suffix naming the edge that arrives at it; the suffix is cut before the
/// operand becomes an id.
pub fn parse_relationship_line(line: &str) -> Vec<Relationship> {
    let mut operands: Vec<&str> = Vec::new();
    let mut operators: Vec<char> = Vec::new();
    let mut tail = line;
    loop {
        let found = match (tail.find(" > "), tail.find(" < ")) {
            (Some(gt), Some(lt)) if lt < gt => Some((lt, '<')),
            (Some(gt), _) => Some((gt, '>')),
            (None, Some(lt)) => Some((lt, '<')),
            (None, None) => None,
        };
        let Some((at, op)) = found else { break };
        operands.push(&tail[..at]);
        operators.push(op);
        tail = &tail[at + 3..];
    }
    operands.push(tail);

    let mut names: Vec<String> = Vec::new();
    let mut labels: Vec<Option<String>> = Vec::new();
    for (i, raw) in operands.iter().enumerate() {
        let trimmed = raw.trim();
        let (name, label) = match (i > 0, trimmed.find(':')) {
            (true, Some(at)) => (
                trimmed[..at].trim_end(),
                Some(trimmed[at + 1..].trim().to_string()),
            ),
            _ => (trimmed, None),
        };
        names.push(node_id(strip_quotes(name)));
        labels.push(label);
    }

    operators
        .iter()
        .enumerate()
        .map(|(i, &op)| {
            let (from, to) = match op {
                '<' => (names[i + 1].clone(), names[i].clone()),
                _ => (names[i].clone(), names[i + 1].clone()),
            };
            Relationship {
                from,
                to,
                label: labels[i + 1].clone(),
            }
        })
        .collect()
}

fn strip_quotes(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
}
