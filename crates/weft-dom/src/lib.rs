//! DOM tree implementation for the weft HTML parser.
//!
//! This crate provides an arena-based DOM tree structure following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/), plus the
//! [`DomProvider`] interface the tree builder drives.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues. Handles
//! compare by value, which is exactly the "same node" test the parsing
//! algorithms need.

pub mod dump;
pub mod name;
pub mod namespace;
pub mod provider;

pub use namespace::{Namespace, QuirksMode};
pub use provider::DomProvider;

use thiserror::Error;

/// Errors raised by DOM mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#dom-document-createelementns)
    ///
    /// "If qualifiedName does not match the QName production, then throw an
    /// "InvalidCharacterError" DOMException."
    #[error("invalid character in name {0:?}")]
    InvalidName(String),
}

/// A type-safe index into the DOM tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
#[derive(Debug, Clone)]
pub struct Node {
    /// "Each node has an associated node type"
    pub node_type: NodeType,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    pub parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    pub children: Vec<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-next-sibling)
    pub next_sibling: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    pub prev_sibling: Option<NodeId>,
}

impl Node {
    const fn detached(node_type: NodeType) -> Self {
        Self {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        }
    }
}

/// "Each node has an associated node type"
#[derive(Debug, Clone)]
pub enum NodeType {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.7 Interface DocumentFragment](https://dom.spec.whatwg.org/#interface-documentfragment)
    ///
    /// Used for `template` contents.
    DocumentFragment,
    /// [§ 4.6 Interface DocumentType](https://dom.spec.whatwg.org/#interface-documenttype)
    Doctype(DoctypeData),
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    Element(ElementData),
    /// [§ 4.10 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    Text(String),
    /// [§ 4.14 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment(String),
}

/// "Doctypes have an associated name, public ID, and system ID."
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctypeData {
    /// The doctype name (empty when the token had none).
    pub name: String,
    /// The public ID (empty when missing).
    pub public_id: String,
    /// The system ID (empty when missing).
    pub system_id: String,
}

/// [§ 4.9.2 Interface Attr](https://dom.spec.whatwg.org/#interface-attr)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// "An attribute has a namespace (null or a non-empty string)"
    pub namespace: Option<Namespace>,
    /// The qualified name, including any prefix (`xlink:href`).
    pub name: String,
    /// "a value"
    pub value: String,
}

impl Attribute {
    /// The local name: everything after the prefix for namespaced attributes.
    #[must_use]
    pub fn local_name(&self) -> &str {
        match (self.namespace, self.name.split_once(':')) {
            (Some(_), Some((_, local))) => local,
            _ => &self.name,
        }
    }
}

/// Element-specific data.
///
/// Per [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element):
/// "Elements have an associated namespace, namespace prefix, local name..."
#[derive(Debug, Clone)]
pub struct ElementData {
    /// The element's namespace.
    pub namespace: Namespace,
    /// "An element's local name"
    pub tag_name: String,
    /// "An element has an associated attribute list", in insertion order.
    pub attrs: Vec<Attribute>,
    /// [§ 4.12.3 The template element](https://html.spec.whatwg.org/multipage/scripting.html#template-contents)
    ///
    /// "Each template element has an associated DocumentFragment object that
    /// is its template contents."
    pub template_contents: Option<NodeId>,
}

impl ElementData {
    /// Returns the value of the first attribute named `name`.
    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Whether this is an HTML element with the given local name.
    #[must_use]
    pub fn is_html(&self, name: &str) -> bool {
        self.namespace == Namespace::Html && self.tag_name == name
    }
}

/// Arena-based DOM tree with O(1) node access and traversal.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// Every node ever created stays in the arena. Detached nodes (removed
/// children, template contents, fragment results) simply have no parent.
#[derive(Debug, Clone)]
pub struct DomTree {
    /// All nodes in the tree, indexed by `NodeId`.
    /// The Document node is always at index 0 (`NodeId::ROOT`).
    nodes: Vec<Node>,
    /// The document's mode, set by the DOCTYPE.
    quirks_mode: QuirksMode,
}

impl DomTree {
    /// Create a new DOM tree with just the Document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::detached(NodeType::Document)],
            quirks_mode: QuirksMode::NoQuirks,
        }
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Get the number of nodes in the arena.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the Document node is allocated up front.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The document's quirks mode.
    #[must_use]
    pub const fn quirks_mode(&self) -> QuirksMode {
        self.quirks_mode
    }

    /// Set the document's quirks mode.
    pub const fn set_quirks_mode(&mut self, mode: QuirksMode) {
        self.quirks_mode = mode;
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::detached(node_type));
        id
    }

    /// [§ 4.5 createElementNS](https://dom.spec.whatwg.org/#dom-document-createelementns)
    ///
    /// Allocate a detached element. `template` elements in the HTML namespace
    /// get their contents fragment allocated alongside.
    ///
    /// # Errors
    /// [`DomError::InvalidName`] when `name` is not an XML name.
    pub fn create_element(&mut self, namespace: Namespace, name: &str) -> Result<NodeId, DomError> {
        if !name::is_valid_name(name) {
            return Err(DomError::InvalidName(name.to_string()));
        }
        let template_contents = (namespace == Namespace::Html && name == "template")
            .then(|| self.alloc(NodeType::DocumentFragment));
        Ok(self.alloc(NodeType::Element(ElementData {
            namespace,
            tag_name: name.to_string(),
            attrs: Vec::new(),
            template_contents,
        })))
    }

    /// [§ 4.9 setAttributeNS](https://dom.spec.whatwg.org/#dom-element-setattributens)
    ///
    /// Adds the attribute, or replaces the value of an existing attribute with
    /// the same namespace and name. Non-elements are left untouched.
    ///
    /// # Errors
    /// [`DomError::InvalidName`] when `name` is not an XML name.
    pub fn set_attribute(
        &mut self,
        element: NodeId,
        namespace: Option<Namespace>,
        name: &str,
        value: &str,
    ) -> Result<(), DomError> {
        if !name::is_valid_name(name) {
            return Err(DomError::InvalidName(name.to_string()));
        }
        if let Some(NodeType::Element(data)) = self.get_mut(element).map(|n| &mut n.node_type) {
            if let Some(existing) = data
                .attrs
                .iter_mut()
                .find(|a| a.namespace == namespace && a.name == name)
            {
                existing.value = value.to_string();
            } else {
                data.attrs.push(Attribute {
                    namespace,
                    name: name.to_string(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before null."
    ///
    /// A child that already has a parent is removed from it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let prev_last_child = self.nodes[parent.0].children.last().copied();
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);

        if let Some(prev_id) = prev_last_child {
            self.nodes[prev_id.0].next_sibling = Some(child);
            self.nodes[child.0].prev_sibling = Some(prev_id);
        }
    }

    /// [§ 4.2.2 Pre-insert](https://dom.spec.whatwg.org/#concept-node-pre-insert)
    ///
    /// Insert `child` into `parent` immediately before `reference`. Falls back
    /// to appending when `reference` is not a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        self.detach(child);
        let Some(index) = self.nodes[parent.0]
            .children
            .iter()
            .position(|&id| id == reference)
        else {
            self.append_child(parent, child);
            return;
        };

        let before = index.checked_sub(1).map(|i| self.nodes[parent.0].children[i]);
        self.nodes[parent.0].children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[child.0].next_sibling = Some(reference);
        self.nodes[child.0].prev_sibling = before;
        self.nodes[reference.0].prev_sibling = Some(child);
        if let Some(before) = before {
            self.nodes[before.0].next_sibling = Some(child);
        }
    }

    /// [§ 4.2.4 Remove](https://dom.spec.whatwg.org/#concept-node-remove)
    ///
    /// Remove `child` from `parent`. Does nothing if `child` is not a child of
    /// `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if self.parent(child) == Some(parent) {
            self.detach(child);
        }
    }

    /// Remove `node` from whatever parent it has.
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes[node.0].parent else {
            return;
        };
        let prev = self.nodes[node.0].prev_sibling;
        let next = self.nodes[node.0].next_sibling;
        self.nodes[parent.0].children.retain(|&id| id != node);
        if let Some(prev) = prev {
            self.nodes[prev.0].next_sibling = next;
        }
        if let Some(next) = next {
            self.nodes[next.0].prev_sibling = prev;
        }
        let detached = &mut self.nodes[node.0];
        detached.parent = None;
        detached.prev_sibling = None;
        detached.next_sibling = None;
    }

    /// Move every child of `from` to the end of `to`, preserving order.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        let children = std::mem::take(&mut self.nodes[from.0].children);
        for child in children {
            let node = &mut self.nodes[child.0];
            node.parent = None;
            node.prev_sibling = None;
            node.next_sibling = None;
            self.append_child(to, child);
        }
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Append `data` to a text node. Returns `false` if `id` is not text.
    pub fn append_text(&mut self, id: NodeId, data: &str) -> bool {
        match self.get_mut(id).map(|n| &mut n.node_type) {
            Some(NodeType::Text(existing)) => {
                existing.push_str(data);
                true
            }
            _ => false,
        }
    }

    /// [§ 3.1.1 The document element](https://html.spec.whatwg.org/multipage/dom.html#the-html-element-2)
    ///
    /// "The document element of a document is the element whose parent is that
    /// document, if it exists; otherwise null."
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .find(|&&id| self.as_element(id).is_some())
            .copied()
    }

    /// [§ 3.1.3 The body element](https://html.spec.whatwg.org/multipage/dom.html#the-body-element-2)
    ///
    /// "The body element of a document is the first of the html element's children
    /// that is either a body element or a frameset element, or null if there is
    /// no such element."
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .iter()
            .find(|&&id| {
                self.as_element(id)
                    .is_some_and(|e| e.is_html("body") || e.is_html("frameset"))
            })
            .copied()
    }

    /// Concatenated data of all text descendants of `id`, in tree order.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        if let Some(text) = self.as_text(id) {
            out.push_str(text);
        }
        for &child in self.children(id) {
            self.collect_text(child, out);
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}
