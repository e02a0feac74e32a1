//! The interface the tree builder uses to build a document.
//!
//! The parser never touches [`DomTree`] directly; it goes through
//! [`DomProvider`], so any arena or reference-counted DOM can be the target.
//! Handles are plain values and identity is `==` on handles.

use std::fmt::Debug;

use crate::{
    Attribute, DoctypeData, DomError, DomTree, Namespace, NodeId, NodeType, QuirksMode,
};

/// Node factory and mutation surface for tree construction.
pub trait DomProvider {
    /// Opaque node reference. Two handles are the same node iff they are equal.
    type Handle: Copy + Eq + Debug;

    /// The Document node.
    fn document(&self) -> Self::Handle;

    /// True when nothing has been attached to the document yet.
    fn is_pristine(&self) -> bool;

    /// Create a detached element.
    ///
    /// # Errors
    /// [`DomError::InvalidName`] for names the DOM refuses.
    fn create_element(&mut self, namespace: Namespace, name: &str) -> Result<Self::Handle, DomError>;

    /// Set an attribute on an element, overwriting any same-named one.
    ///
    /// # Errors
    /// [`DomError::InvalidName`] for names the DOM refuses.
    fn set_attribute(
        &mut self,
        element: Self::Handle,
        namespace: Option<Namespace>,
        name: &str,
        value: &str,
    ) -> Result<(), DomError>;

    /// Create a detached text node.
    fn create_text(&mut self, data: &str) -> Self::Handle;

    /// Create a detached comment node.
    fn create_comment(&mut self, data: &str) -> Self::Handle;

    /// Create a detached doctype node.
    fn create_doctype(&mut self, name: &str, public_id: &str, system_id: &str) -> Self::Handle;

    /// Append `child` as the last child of `parent`.
    fn append_child(&mut self, parent: Self::Handle, child: Self::Handle);

    /// Insert `child` into `parent` before `reference`.
    fn insert_before(&mut self, parent: Self::Handle, child: Self::Handle, reference: Self::Handle);

    /// Detach `node` from its parent, if any.
    fn remove_from_parent(&mut self, node: Self::Handle);

    /// Move every child of `from` to the end of `to`.
    fn reparent_children(&mut self, from: Self::Handle, to: Self::Handle);

    /// Append to a text node's data. Returns `false` if `node` is not text.
    fn append_text(&mut self, node: Self::Handle, data: &str) -> bool;

    /// The parent of `node`.
    fn parent(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// The children of `node`, in order.
    fn children(&self, node: Self::Handle) -> Vec<Self::Handle>;

    /// The last child of `node`.
    fn last_child(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// The sibling immediately before `node`.
    fn previous_sibling(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// The namespace of an element; `None` for other node types.
    fn namespace(&self, node: Self::Handle) -> Option<Namespace>;

    /// The local name of an element; `None` for other node types.
    fn local_name(&self, node: Self::Handle) -> Option<&str>;

    /// The attributes of an element, in insertion order.
    fn attributes(&self, node: Self::Handle) -> Vec<Attribute>;

    /// Whether the element has a non-namespaced attribute named `name`.
    fn has_attribute(&self, node: Self::Handle, name: &str) -> bool {
        self.attributes(node)
            .iter()
            .any(|a| a.namespace.is_none() && a.name == name)
    }

    /// The contents fragment of an HTML `template` element.
    fn template_contents(&self, template: Self::Handle) -> Option<Self::Handle>;

    /// The document's quirks mode.
    fn quirks_mode(&self) -> QuirksMode;

    /// Set the document's quirks mode.
    fn set_quirks_mode(&mut self, mode: QuirksMode);
}

impl DomProvider for DomTree {
    type Handle = NodeId;

    fn document(&self) -> NodeId {
        NodeId::ROOT
    }

    fn is_pristine(&self) -> bool {
        self.children(NodeId::ROOT).is_empty()
    }

    fn create_element(&mut self, namespace: Namespace, name: &str) -> Result<NodeId, DomError> {
        Self::create_element(self, namespace, name)
    }

    fn set_attribute(
        &mut self,
        element: NodeId,
        namespace: Option<Namespace>,
        name: &str,
        value: &str,
    ) -> Result<(), DomError> {
        Self::set_attribute(self, element, namespace, name, value)
    }

    fn create_text(&mut self, data: &str) -> NodeId {
        self.alloc(NodeType::Text(data.to_string()))
    }

    fn create_comment(&mut self, data: &str) -> NodeId {
        self.alloc(NodeType::Comment(data.to_string()))
    }

    fn create_doctype(&mut self, name: &str, public_id: &str, system_id: &str) -> NodeId {
        self.alloc(NodeType::Doctype(DoctypeData {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        }))
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        Self::append_child(self, parent, child);
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        Self::insert_before(self, parent, child, reference);
    }

    fn remove_from_parent(&mut self, node: NodeId) {
        self.detach(node);
    }

    fn reparent_children(&mut self, from: NodeId, to: NodeId) {
        self.move_children(from, to);
    }

    fn append_text(&mut self, node: NodeId, data: &str) -> bool {
        Self::append_text(self, node, data)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        Self::parent(self, node)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        Self::children(self, node).to_vec()
    }

    fn last_child(&self, node: NodeId) -> Option<NodeId> {
        Self::last_child(self, node)
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.prev_sibling(node)
    }

    fn namespace(&self, node: NodeId) -> Option<Namespace> {
        self.as_element(node).map(|e| e.namespace)
    }

    fn local_name(&self, node: NodeId) -> Option<&str> {
        self.as_element(node).map(|e| e.tag_name.as_str())
    }

    fn attributes(&self, node: NodeId) -> Vec<Attribute> {
        self.as_element(node).map(|e| e.attrs.clone()).unwrap_or_default()
    }

    fn template_contents(&self, template: NodeId) -> Option<NodeId> {
        self.as_element(template).and_then(|e| e.template_contents)
    }

    fn quirks_mode(&self) -> QuirksMode {
        Self::quirks_mode(self)
    }

    fn set_quirks_mode(&mut self, mode: QuirksMode) {
        Self::set_quirks_mode(self, mode);
    }
}
