//! Tests for DOM tree mutation: detach, insert_before, move_children, and
//! the provider surface the tree builder relies on.

use weft_dom::dump::test_format;
use weft_dom::{DomError, DomProvider, DomTree, Namespace, NodeId, QuirksMode};

fn element(tree: &mut DomTree, tag: &str) -> NodeId {
    tree.create_element(Namespace::Html, tag)
        .expect("test names are valid")
}

// ========== remove_child ==========

#[test]
fn remove_middle_child_relinks_siblings() {
    let mut tree = DomTree::new();
    let parent = element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let a = element(&mut tree, "a");
    let b = element(&mut tree, "b");
    let c = element(&mut tree, "c");
    tree.append_child(parent, a);
    tree.append_child(parent, b);
    tree.append_child(parent, c);

    tree.remove_child(parent, b);

    assert_eq!(tree.children(parent), &[a, c]);
    assert_eq!(tree.next_sibling(a), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(a));
    assert_eq!(tree.parent(b), None);
    assert_eq!(tree.next_sibling(b), None);
}

#[test]
fn remove_child_ignores_non_children() {
    let mut tree = DomTree::new();
    let parent = element(&mut tree, "div");
    let other = element(&mut tree, "span");
    let child = element(&mut tree, "p");
    tree.append_child(other, child);

    tree.remove_child(parent, child);

    assert_eq!(tree.parent(child), Some(other));
}

// ========== append / insert_before ==========

#[test]
fn append_moves_node_from_previous_parent() {
    let mut tree = DomTree::new();
    let first = element(&mut tree, "div");
    let second = element(&mut tree, "section");
    let child = element(&mut tree, "p");
    tree.append_child(first, child);

    tree.append_child(second, child);

    assert!(tree.children(first).is_empty());
    assert_eq!(tree.children(second), &[child]);
}

#[test]
fn insert_before_first_child() {
    let mut tree = DomTree::new();
    let parent = element(&mut tree, "div");
    let b = element(&mut tree, "b");
    tree.append_child(parent, b);

    let a = element(&mut tree, "a");
    tree.insert_before(parent, a, b);

    assert_eq!(tree.children(parent), &[a, b]);
    assert_eq!(tree.prev_sibling(a), None);
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.prev_sibling(b), Some(a));
}

#[test]
fn insert_before_middle() {
    let mut tree = DomTree::new();
    let parent = element(&mut tree, "div");
    let a = element(&mut tree, "a");
    let c = element(&mut tree, "c");
    tree.append_child(parent, a);
    tree.append_child(parent, c);

    let b = element(&mut tree, "b");
    tree.insert_before(parent, b, c);

    assert_eq!(tree.children(parent), &[a, b, c]);
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.prev_sibling(c), Some(b));
}

// ========== move_children ==========

#[test]
fn move_children_appends_to_existing() {
    let mut tree = DomTree::new();
    let from = element(&mut tree, "div");
    let to = element(&mut tree, "span");
    let existing = element(&mut tree, "i");
    tree.append_child(to, existing);

    let a = element(&mut tree, "a");
    let b = element(&mut tree, "b");
    tree.append_child(from, a);
    tree.append_child(from, b);

    tree.move_children(from, to);

    assert!(tree.children(from).is_empty());
    assert_eq!(tree.children(to), &[existing, a, b]);
    assert_eq!(tree.parent(a), Some(to));
    assert_eq!(tree.prev_sibling(a), Some(existing));
}

// ========== creation ==========

#[test]
fn invalid_element_name_is_rejected() {
    let mut tree = DomTree::new();
    assert_eq!(
        tree.create_element(Namespace::Html, "a\"b"),
        Err(DomError::InvalidName("a\"b".to_string()))
    );
}

#[test]
fn template_gets_contents_fragment() {
    let mut tree = DomTree::new();
    let template = element(&mut tree, "template");
    let div = element(&mut tree, "div");

    assert!(tree.template_contents(template).is_some());
    assert!(tree.template_contents(div).is_none());
}

#[test]
fn set_attribute_overwrites_same_name() {
    let mut tree = DomTree::new();
    let div = element(&mut tree, "div");
    tree.set_attribute(div, None, "id", "one").unwrap();
    tree.set_attribute(div, None, "id", "two").unwrap();

    let data = tree.as_element(div).unwrap();
    assert_eq!(data.attrs.len(), 1);
    assert_eq!(data.get_attribute("id"), Some("two"));
}

#[test]
fn provider_reports_pristine_until_first_append() {
    let mut tree = DomTree::new();
    assert!(tree.is_pristine());
    let html = element(&mut tree, "html");
    assert!(tree.is_pristine());
    DomProvider::append_child(&mut tree, NodeId::ROOT, html);
    assert!(!tree.is_pristine());
}

#[test]
fn quirks_mode_round_trips_through_provider() {
    let mut tree = DomTree::new();
    DomProvider::set_quirks_mode(&mut tree, QuirksMode::LimitedQuirks);
    assert_eq!(tree.quirks_mode(), QuirksMode::LimitedQuirks);
}

// ========== dump ==========

#[test]
fn dump_sorts_attributes_and_prefixes_namespaces() {
    let mut tree = DomTree::new();
    let doctype = tree.create_doctype("html", "", "");
    tree.append_child(NodeId::ROOT, doctype);
    let html = element(&mut tree, "html");
    tree.append_child(NodeId::ROOT, html);
    let svg = tree.create_element(Namespace::Svg, "svg").unwrap();
    tree.append_child(html, svg);
    tree.set_attribute(svg, None, "width", "1").unwrap();
    tree.set_attribute(svg, Some(Namespace::XLink), "xlink:href", "#a").unwrap();
    let text = tree.create_text("hi");
    tree.append_child(svg, text);

    let expected = "\
| <!DOCTYPE html>
| <html>
|   <svg svg>
|     width=\"1\"
|     xlink href=\"#a\"
|     \"hi\"
";
    assert_eq!(test_format(&tree), expected);
}
