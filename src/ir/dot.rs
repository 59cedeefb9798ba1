//! DOT format rendering of graphs.
//!
//! The output can be rendered with Graphviz (`dot -Tsvg graph.dot`). Edges
//! point from a node to its operands. Control operands are dashed and the
//! link from a node to its owning block is dotted.

use std::fmt::Write;

use crate::ir::{Graph, NodeId, Opcode};

/// Escapes a string for safe use in DOT labels.
///
/// # Arguments
///
/// * `s` - The string to escape
///
/// # Returns
///
/// A new string with quotes, backslashes, newlines and angle brackets escaped.
#[must_use]
pub fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "")
        .replace('<', "\\<")
        .replace('>', "\\>")
}

impl Graph {
    /// Generates a DOT representation of the graph.
    ///
    /// # Arguments
    ///
    /// * `title` - Optional title for the graph (e.g., function name)
    #[must_use]
    pub fn to_dot(&self, title: Option<&str>) -> String {
        render(self, title, |_| None)
    }
}

/// Renders `graph`, appending `annotate(node)` as an extra label line where it
/// returns `Some`.
pub(crate) fn render<F>(graph: &Graph, title: Option<&str>, annotate: F) -> String
where
    F: Fn(NodeId) -> Option<String>,
{
    let mut dot = String::new();

    dot.push_str("digraph IR {\n");
    if let Some(name) = title {
        let _ = writeln!(dot, "    label=\"{}\";", escape_dot(name));
    }
    dot.push_str("    labelloc=t;\n");
    dot.push_str("    node [shape=box, fontname=\"Courier\", fontsize=10];\n");
    dot.push_str("    edge [fontname=\"Courier\", fontsize=9];\n\n");

    for (id, node) in graph.nodes() {
        let mut label = format!("{id}: {} {}", node.opcode().name(), node.mode());
        match node.opcode() {
            Opcode::Const(value) => {
                let _ = write!(label, "\\n{value}");
            }
            Opcode::Proj(num) | Opcode::Param(num) | Opcode::Address(num) => {
                let _ = write!(label, "\\n#{num}");
            }
            _ => {}
        }
        if let Some(extra) = annotate(id) {
            let _ = write!(label, "\\n{}", escape_dot(&extra));
        }

        let style = if *node.opcode() == Opcode::Block {
            ", style=filled, fillcolor=lightgrey"
        } else if id == graph.end() {
            ", style=filled, fillcolor=lightcoral"
        } else {
            ""
        };
        let _ = writeln!(dot, "    {} [label=\"{label}\"{style}];", id.index());
    }

    dot.push('\n');

    for (id, node) in graph.nodes() {
        // edges point from user to operand, the direction demand flows
        for (index, operand) in node.operands().iter().enumerate() {
            let control = graph.node(*operand).is_some_and(|o| o.mode().is_control());
            let style = if control { " style=dashed," } else { "" };
            let _ = writeln!(
                dot,
                "    {} -> {} [{style} label=\"{index}\"];",
                id.index(),
                operand.index()
            );
        }
        if let Some(block) = node.block() {
            let _ = writeln!(
                dot,
                "    {} -> {} [style=dotted, color=grey];",
                id.index(),
                block.index()
            );
        }
    }

    dot.push_str("}\n");
    dot
}
