//! Serialization of a [`DomTree`] in the html5lib tree-construction test
//! format.
//!
//! ```text
//! | <!DOCTYPE html>
//! | <html>
//! |   <head>
//! |   <body>
//! |     <svg svg>
//! |       viewBox="0 0 1 1"
//! |     "text"
//! ```
//!
//! Each line is `| ` followed by two spaces per level of depth. Attributes
//! are sorted by their displayed name and appear one level deeper than their
//! element; template contents appear under a `content` line.

use std::fmt::Write;

use crate::{DomTree, Namespace, NodeId, NodeType};

/// Dump the whole document.
#[must_use]
pub fn test_format(tree: &DomTree) -> String {
    let mut out = String::new();
    for &child in tree.children(tree.root()) {
        write_node(tree, child, 0, &mut out);
    }
    out
}

/// Dump a list of sibling nodes, e.g. the result of fragment parsing.
#[must_use]
pub fn test_format_nodes(tree: &DomTree, nodes: &[NodeId]) -> String {
    let mut out = String::new();
    for &node in nodes {
        write_node(tree, node, 0, &mut out);
    }
    out
}

fn write_line(out: &mut String, depth: usize, text: &str) {
    let _ = writeln!(out, "| {}{text}", "  ".repeat(depth));
}

fn write_node(tree: &DomTree, id: NodeId, depth: usize, out: &mut String) {
    let Some(node) = tree.get(id) else {
        return;
    };
    match &node.node_type {
        NodeType::Document | NodeType::DocumentFragment => {}
        NodeType::Doctype(doctype) => {
            if doctype.public_id.is_empty() && doctype.system_id.is_empty() {
                write_line(out, depth, &format!("<!DOCTYPE {}>", doctype.name));
            } else {
                write_line(
                    out,
                    depth,
                    &format!(
                        "<!DOCTYPE {} \"{}\" \"{}\">",
                        doctype.name, doctype.public_id, doctype.system_id
                    ),
                );
            }
        }
        NodeType::Text(text) => write_line(out, depth, &format!("\"{text}\"")),
        NodeType::Comment(data) => write_line(out, depth, &format!("<!-- {data} -->")),
        NodeType::Element(element) => {
            let name = match element.namespace {
                Namespace::Html => element.tag_name.clone(),
                ns => format!("{ns} {}", element.tag_name),
            };
            write_line(out, depth, &format!("<{name}>"));

            let mut attrs: Vec<(String, &str)> = element
                .attrs
                .iter()
                .map(|attr| {
                    let shown = match attr.namespace {
                        Some(ns) => format!("{ns} {}", attr.local_name()),
                        None => attr.name.clone(),
                    };
                    (shown, attr.value.as_str())
                })
                .collect();
            attrs.sort();
            for (name, value) in attrs {
                write_line(out, depth + 1, &format!("{name}=\"{value}\""));
            }

            if let Some(contents) = element.template_contents {
                write_line(out, depth + 1, "content");
                for &child in tree.children(contents) {
                    write_node(tree, child, depth + 2, out);
                }
            }
        }
    }
    for &child in tree.children(id) {
        write_node(tree, child, depth + 1, out);
    }
}
