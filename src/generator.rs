use crate::ast::{FlowDiagram, NodeDef};

const DARK_TEXT: &str = "#1A202C";
const LIGHT_TEXT: &str = "#FFFFFF";

/// Emit Mermaid flowchart markup for a parsed diagram.
///
/// Output order is fixed: header, title comment, node declarations, subgraph
/// blocks, relationships, then style directives (node styles before subgraph
/// styles). Lines are joined with `\n` and carry no trailing newline.
pub fn generate(diagram: &FlowDiagram) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut styles: Vec<String> = Vec::new();

    lines.push(format!("flowchart {}", diagram.direction.as_str()));
    if let Some(title) = &diagram.title {
        lines.push(format!("  %% {title}"));
    }

    for node in diagram.nodes.values() {
        let (open, close) = shape_brackets(node.shape.as_deref().unwrap_or("rectangle"));
        lines.push(format!("  {}{open}\"{}\"{close}", node.id, display_label(node)));
        if let Some(color) = &node.color {
            let hex = resolve_color(color);
            let text = text_color(&hex);
            styles.push(format!(
                "  style {} fill:{hex},stroke:{hex},color:{text}",
                node.id
            ));
        }
    }

    lines.push(String::new());
    for subgraph in &diagram.subgraphs {
        lines.push(format!("  subgraph {}[\"{}\"]", subgraph.id, subgraph.label));
        for id in &subgraph.nodes {
            lines.push(format!("    {id}"));
        }
        lines.push("  end".to_string());
        if let Some(color) = &subgraph.color {
            // Subgraphs get a translucent fill and no text override.
            let hex = resolve_color(color);
            styles.push(format!("  style {} fill:{hex}20,stroke:{hex}", subgraph.id));
        }
    }

    lines.push(String::new());
    for rel in &diagram.relationships {
        lines.push(match &rel.label {
            Some(label) => format!("  {} -->|\"{label}\"| {}", rel.from, rel.to),
            None => format!("  {} --> {}", rel.from, rel.to),
        });
    }

    lines.push(String::new());
    lines.extend(styles);

    lines.join("\n")
}

fn display_label(node: &NodeDef) -> String {
    match &node.icon {
        Some(icon) => format!("fa:fa-{icon} {}", node.label),
        None => node.label.clone(),
    }
}

fn shape_brackets(shape: &str) -> (&'static str, &'static str) {
    match shape {
        "oval" | "stadium" => ("([", "])"),
        "diamond" => ("{", "}"),
        "hexagon" => ("{{", "}}"),
        "parallelogram" => ("[/", "/]"),
        "trapezoid" => ("[/", "\\]"),
        "circle" => ("((", "))"),
        "database" => ("[(", ")]"),
        "subroutine" => ("[[", "]]"),
        "asymmetric" => (">", "]"),
        // Unknown shapes render as the default rectangle.
        _ => ("[", "]"),
    }
}

fn resolve_color(value: &str) -> String {
    match color_hex(&value.to_ascii_lowercase()) {
        Some(hex) => hex.to_string(),
        // Not a palette name: assume the value is already a color token.
        None => value.to_string(),
    }
}

fn color_hex(name: &str) -> Option<&'static str> {
    let hex = match name {
        "red" => "#F56565",
        "orange" => "#ED8936",
        "yellow" => "#F6E05E",
        "green" => "#48BB78",
        "teal" => "#38B2AC",
        "blue" => "#4299E1",
        "cyan" => "#0BC5EA",
        "purple" => "#9F7AEA",
        "pink" => "#ED64A6",
        "gray" | "grey" => "#A0AEC0",
        "darkred" => "#9B2C2C",
        "darkorange" => "#9C4221",
        "darkyellow" => "#975A16",
        "darkgreen" => "#276749",
        "darkteal" => "#285E61",
        "darkblue" => "#2C5282",
        "darkcyan" => "#086F83",
        "darkpurple" => "#553C9A",
        "darkpink" => "#97266D",
        "darkgray" | "darkgrey" => "#4A5568",
        "white" => "#FFFFFF",
        "black" => "#1A202C",
        _ => return None,
    };
    Some(hex)
}

/// Perceived luminance of a `#RRGGBB` token, 0.0 to 1.0. Anything else is
/// unmeasurable and yields `None`.
fn luminance(token: &str) -> Option<f64> {
    let hex = token.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()? as f64;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()? as f64;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()? as f64;
    Some((0.299 * r + 0.587 * g + 0.114 * b) / 255.0)
}

fn text_color(fill: &str) -> &'static str {
    match luminance(fill) {
        Some(l) if l > 0.5 => DARK_TEXT,
        _ => LIGHT_TEXT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_diagram;
    use pretty_assertions::assert_eq;

    fn compile(input: &str) -> String {
        generate(&parse_diagram(input))
    }

    #[test]
    fn header_uses_direction() {
        assert!(compile("direction right\nA\n").starts_with("flowchart LR\n"));
        assert!(compile("A\n").starts_with("flowchart TB\n"));
    }

    #[test]
    fn title_becomes_comment_line() {
        let output = compile("title My Flow\nA\n");
        assert!(output.contains("  %% My Flow\n"), "got:\n{output}");
    }

    #[test]
    fn node_defaults_to_rectangle() {
        let output = compile("My Node\n");
        assert!(output.contains("  my_node[\"My Node\"]"), "got:\n{output}");
    }

    #[test]
    fn unknown_shape_falls_back_to_rectangle() {
        let output = compile("A [shape: blob]\n");
        assert!(output.contains("  a[\"A\"]"), "got:\n{output}");
    }

    #[test]
    fn shape_bracket_table() {
        assert_eq!(shape_brackets("rectangle"), ("[", "]"));
        assert_eq!(shape_brackets("oval"), ("([", "])"));
        assert_eq!(shape_brackets("stadium"), ("([", "])"));
        assert_eq!(shape_brackets("diamond"), ("{", "}"));
        assert_eq!(shape_brackets("hexagon"), ("{{", "}}"));
        assert_eq!(shape_brackets("parallelogram"), ("[/", "/]"));
        assert_eq!(shape_brackets("trapezoid"), ("[/", "\\]"));
        assert_eq!(shape_brackets("circle"), ("((", "))"));
        assert_eq!(shape_brackets("database"), ("[(", ")]"));
        assert_eq!(shape_brackets("subroutine"), ("[[", "]]"));
        assert_eq!(shape_brackets("asymmetric"), (">", "]"));
    }

    #[test]
    fn icon_prefixes_display_label() {
        let output = compile("Server [shape: database, icon: server]\n");
        assert!(
            output.contains("  server[(\"fa:fa-server Server\")]"),
            "got:\n{output}"
        );
    }

    #[test]
    fn relationship_without_label() {
        let output = compile("A > B\n");
        assert!(output.contains("  a --> b"), "got:\n{output}");
    }

    #[test]
    fn relationship_with_label_is_quoted() {
        let output = compile("A > B: Yes\n");
        assert!(output.contains("  a -->|\"Yes\"| b"), "got:\n{output}");
    }

    #[test]
    fn edge_to_undeclared_id_still_emits() {
        let output = compile("Known\nKnown > Ghost\n");
        assert!(output.contains("  known --> ghost"), "got:\n{output}");
        assert!(!output.contains("ghost["), "no declaration for ghost");
    }

    #[test]
    fn subgraph_block_lists_bare_member_ids() {
        let output = compile("Group1 {\nX\nY\n}\n");
        assert!(output.contains("  subgraph group1[\"Group1\"]\n    x\n    y\n  end"));
    }

    #[test]
    fn light_fill_gets_dark_text() {
        let output = compile("A [color: yellow]\n");
        assert!(
            output.contains("  style a fill:#F6E05E,stroke:#F6E05E,color:#1A202C"),
            "got:\n{output}"
        );
    }

    #[test]
    fn dark_fill_gets_light_text() {
        let output = compile("A [color: darkblue]\n");
        assert!(
            output.contains("  style a fill:#2C5282,stroke:#2C5282,color:#FFFFFF"),
            "got:\n{output}"
        );
    }

    #[test]
    fn unknown_color_passes_through_as_token() {
        let output = compile("A [color: #123456]\n");
        assert!(
            output.contains("  style a fill:#123456,stroke:#123456,color:#FFFFFF"),
            "got:\n{output}"
        );
    }

    #[test]
    fn color_names_are_case_insensitive() {
        let output = compile("A [color: Yellow]\n");
        assert!(output.contains("fill:#F6E05E"), "got:\n{output}");
    }

    #[test]
    fn subgraph_style_uses_translucent_fill() {
        let output = compile("Group [color: blue] {\nA\n}\n");
        assert!(
            output.contains("  style group fill:#4299E120,stroke:#4299E1"),
            "got:\n{output}"
        );
        assert!(
            !output.contains("style group fill:#4299E1,"),
            "subgraph fill must carry the alpha suffix"
        );
    }

    #[test]
    fn node_styles_precede_subgraph_styles() {
        let output = compile("Group [color: blue] {\nA [color: red]\n}\n");
        let node_style = output.find("style a ").unwrap();
        let subgraph_style = output.find("style group ").unwrap();
        assert!(node_style < subgraph_style, "got:\n{output}");
    }

    #[test]
    fn luminance_of_white_and_black() {
        assert!(luminance("#FFFFFF").unwrap() > 0.99);
        assert_eq!(luminance("#000000"), Some(0.0));
    }

    #[test]
    fn luminance_rejects_non_hex_tokens() {
        assert_eq!(luminance("tomato"), None);
        assert_eq!(luminance("#12345"), None);
        assert_eq!(luminance("#12345G"), None);
        assert_eq!(luminance("#€€"), None);
    }

    #[test]
    fn generate_empty_diagram() {
        let output = compile("");
        assert_eq!(output, "flowchart TB\n\n\n");
    }
}
