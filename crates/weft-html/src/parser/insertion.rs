//! [§ 13.2.6.1 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#creating-and-inserting-nodes)

use log::debug;
use weft_common::warning::warn_once;
use weft_dom::{DomProvider, Namespace};

use super::core::{HTMLTreeBuilder, InsertionMode};
use super::formatting::FormattingEntry;
use super::names;
use super::stack::OpenElement;
use crate::error::ParseErrorCode;
use crate::tokenizer::{Attribute, Tag, TokenizerState};

/// Where a new node goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionPoint<H> {
    /// As the last child of the node.
    AppendTo(H),
    /// Into `parent`, immediately before `sibling`.
    Before {
        /// The new parent.
        parent: H,
        /// The existing child to insert before.
        sibling: H,
    },
}

impl<H: Copy> InsertionPoint<H> {
    /// The node the insertion happens in.
    pub const fn parent(self) -> H {
        match self {
            Self::AppendTo(parent) | Self::Before { parent, .. } => parent,
        }
    }
}

impl<D: DomProvider> HTMLTreeBuilder<'_, D> {
    fn is_foster_target(&self, node: D::Handle) -> bool {
        self.dom.namespace(node) == Some(Namespace::Html)
            && matches!(
                self.dom.local_name(node),
                Some("table" | "tbody" | "tfoot" | "thead" | "tr")
            )
    }

    /// [§ 13.2.6.1 Appropriate place for inserting a node](https://html.spec.whatwg.org/multipage/parsing.html#appropriate-place-for-inserting-a-node)
    ///
    /// `None` only while nothing is open yet.
    pub(super) fn appropriate_place(
        &mut self,
        override_target: Option<D::Handle>,
    ) -> Option<InsertionPoint<D::Handle>> {
        // STEP 1: "If there was an override target specified, then let
        // target be the override target. Otherwise, let target be the
        // current node."
        let target = override_target.or_else(|| self.open_elements.current_node())?;

        // STEP 2: "Determine the adjusted insertion location using the first
        // matching steps from the following list:"
        let location = if self.foster_parenting && self.is_foster_target(target) {
            // "If foster parenting is enabled and target is a table, tbody,
            // tfoot, thead, or tr element"
            self.content_fostered = true;
            let last_template = self.open_elements.find(|n| n == "template");
            let last_table = self.open_elements.find(|n| n == "table");
            let node_at = |index: usize| self.open_elements.get(index).map(|e| e.node);
            match (last_template, last_table) {
                // "If there is a last template and either there is no last
                // table, or there is one, but last template is lower (more
                // recently added) than last table in the stack of open
                // elements, then: let adjusted insertion location be inside
                // last template's template contents, after its last child"
                (Some(template), table) if table.is_none_or(|table| template > table) => {
                    InsertionPoint::AppendTo(node_at(template)?)
                }
                // "If there is no last table, then let adjusted insertion
                // location be inside the first element in the stack of open
                // elements (the html element), after its last child (if any),
                // and abort these steps. (fragment case)"
                (_, None) => InsertionPoint::AppendTo(node_at(0)?),
                (_, Some(table_index)) => {
                    let table = node_at(table_index)?;
                    // "If last table has a parent node, then let adjusted
                    // insertion location be inside last table's parent node,
                    // immediately before last table, and abort these steps."
                    if let Some(parent) = self.dom.parent(table) {
                        InsertionPoint::Before {
                            parent,
                            sibling: table,
                        }
                    } else {
                        // "Let previous element be the element immediately
                        // above last table in the stack of open elements. Let
                        // adjusted insertion location be inside previous
                        // element, after its last child (if any)."
                        InsertionPoint::AppendTo(node_at(table_index.saturating_sub(1))?)
                    }
                }
            }
        } else {
            // "Otherwise: Let adjusted insertion location be inside target,
            // after its last child (if any)."
            InsertionPoint::AppendTo(target)
        };

        // STEP 3: "If the adjusted insertion location is inside a template
        // element, let it instead be inside the template element's template
        // contents, after its last child (if any)."
        Some(match location {
            InsertionPoint::AppendTo(node) => {
                InsertionPoint::AppendTo(self.dom.template_contents(node).unwrap_or(node))
            }
            before @ InsertionPoint::Before { .. } => before,
        })
    }

    /// Put `node` at `point`.
    pub(super) fn insert_at(&mut self, point: InsertionPoint<D::Handle>, node: D::Handle) {
        match point {
            InsertionPoint::AppendTo(parent) => self.dom.append_child(parent, node),
            InsertionPoint::Before { parent, sibling } => {
                self.dom.insert_before(parent, node, sibling);
            }
        }
    }

    /// [§ 13.2.6.1 Insert a character](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    ///
    /// Inserts a whole run at once; adjacent text merges into one node.
    pub(super) fn insert_characters(&mut self, data: &str) {
        if data.is_empty() {
            return;
        }
        // STEP 2: "Let the adjusted insertion location be the appropriate
        // place for inserting a node."
        let Some(point) = self.appropriate_place(None) else {
            return;
        };
        // STEP 3: "If the adjusted insertion location's parent is a Document
        // node, then return."
        if point.parent() == self.dom.document() {
            return;
        }
        if self.foster_parenting {
            debug!("foster parenting {} characters", data.len());
        }
        // STEP 4: "If there is a Text node immediately before the adjusted
        // insertion location, then append data to that Text node's data."
        let previous = match point {
            InsertionPoint::AppendTo(parent) => self.dom.last_child(parent),
            InsertionPoint::Before { sibling, .. } => self.dom.previous_sibling(sibling),
        };
        if let Some(previous) = previous
            && self.dom.append_text(previous, data)
        {
            return;
        }
        // STEP 5: "Otherwise, create a new Text node whose data is data and
        // whose node document is the same as that of the element in which
        // the adjusted insertion location finds itself, and insert the newly
        // created node at the adjusted insertion location."
        let text = self.dom.create_text(data);
        self.insert_at(point, text);
    }

    /// [§ 13.2.6.1 Insert a comment](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-comment)
    pub(super) fn insert_comment(&mut self, data: &str) {
        let point = self
            .appropriate_place(None)
            .unwrap_or_else(|| InsertionPoint::AppendTo(self.dom.document()));
        let comment = self.dom.create_comment(data);
        self.insert_at(point, comment);
    }

    /// Insert a comment as the last child of `parent`, for the modes that
    /// name an explicit position.
    pub(super) fn insert_comment_into(&mut self, data: &str, parent: D::Handle) {
        let comment = self.dom.create_comment(data);
        self.dom.append_child(parent, comment);
    }

    /// Create an element, escaping the name if the DOM refuses it.
    /// Returns the node and the name it was actually created with.
    ///
    /// # Panics
    /// If the DOM refuses even the escaped name.
    fn create_element_named(&mut self, namespace: Namespace, name: &str) -> (D::Handle, String) {
        if let Ok(node) = self.dom.create_element(namespace, name) {
            return (node, name.to_string());
        }
        let coerced = names::coerce_name(name).into_owned();
        self.parse_error(ParseErrorCode::CoercedName, &[name]);
        let _ = warn_once("names", &format!("element name {name:?} stored as {coerced:?}"));
        self.mangled_names = true;
        match self.dom.create_element(namespace, &coerced) {
            Ok(node) => (node, coerced),
            Err(error) => unreachable!("escaped element name was refused: {error}"),
        }
    }

    /// Set an attribute, escaping the name if the DOM refuses it.
    ///
    /// # Panics
    /// If the DOM refuses even the escaped name.
    pub(super) fn set_attribute_escaped(&mut self, node: D::Handle, attribute: &Attribute) {
        let Attribute {
            name,
            value,
            namespace,
        } = attribute;
        if self.dom.set_attribute(node, *namespace, name, value).is_ok() {
            return;
        }
        let coerced = names::coerce_name(name).into_owned();
        self.parse_error(ParseErrorCode::CoercedName, &[name]);
        let _ = warn_once("names", &format!("attribute name {name:?} stored as {coerced:?}"));
        self.mangled_names = true;
        if let Err(error) = self.dom.set_attribute(node, *namespace, &coerced, value) {
            unreachable!("escaped attribute name was refused: {error}");
        }
    }

    /// [§ 13.2.6.1 Create an element for a token](https://html.spec.whatwg.org/multipage/parsing.html#create-an-element-for-the-token)
    ///
    /// Returns the stack entry for the new, still detached, element.
    pub(super) fn create_element_for_token(
        &mut self,
        tag: &Tag,
        namespace: Namespace,
    ) -> OpenElement<D::Handle> {
        let (node, name) = self.create_element_named(namespace, &tag.name);

        // "Append each attribute in the given token to element."
        for attribute in &tag.attributes {
            self.set_attribute_escaped(node, attribute);
        }

        // "If element has an xmlns attribute in the XMLNS namespace whose
        // value is not exactly the same as element's namespace, that is a
        // parse error. Similarly, if element has an xmlns:xlink attribute in
        // the XMLNS namespace whose value is not the XLink Namespace, that is
        // a parse error."
        for attribute in &tag.attributes {
            if attribute.namespace != Some(Namespace::Xmlns) {
                continue;
            }
            let expected = match attribute.name.as_str() {
                "xmlns" => namespace.url(),
                "xmlns:xlink" => Namespace::XLink.url(),
                _ => continue,
            };
            if attribute.value != expected {
                self.parse_error(
                    ParseErrorCode::InvalidNamespaceAttributeValue,
                    &[&attribute.name],
                );
            }
        }

        let annotation_xml_is_html = namespace == Namespace::MathMl
            && name == "annotation-xml"
            && tag.attribute("encoding").is_some_and(|encoding| {
                encoding.eq_ignore_ascii_case("text/html")
                    || encoding.eq_ignore_ascii_case("application/xhtml+xml")
            });

        let mut element = OpenElement::new(node, namespace, name);
        element.annotation_xml_is_html = annotation_xml_is_html;
        element
    }

    /// [§ 13.2.6.1 Insert a foreign element](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-foreign-element)
    pub(super) fn insert_foreign_element(&mut self, tag: &Tag, namespace: Namespace) -> D::Handle {
        // STEP 1: "Let the adjusted insertion location be the appropriate
        // place for inserting a node."
        let point = self.appropriate_place(None);

        // STEP 2: "Let element be the result of creating an element for the
        // token in the given namespace, with the intended parent being the
        // element in which the adjusted insertion location finds itself."
        let element = self.create_element_for_token(tag, namespace);
        let node = element.node;

        // STEP 3: "If onlyAddToElementStack is false, then run insert an
        // element at the adjusted insertion location with element."
        if let Some(point) = point {
            self.insert_at(point, node);
        }

        // STEP 4: "Push element onto the stack of open elements so that it is
        // the new current node."
        self.open_elements.push(element);
        node
    }

    /// [§ 13.2.6.1 Insert an HTML element](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
    pub(super) fn insert_html_element(&mut self, tag: &Tag) -> D::Handle {
        self.insert_foreign_element(tag, Namespace::Html)
    }

    /// [§ 13.2.6.2 Parsing elements that contain only text](https://html.spec.whatwg.org/multipage/parsing.html#parsing-elements-that-contain-only-text)
    ///
    /// "The generic raw text element parsing algorithm and the generic RCDATA
    /// element parsing algorithm consist of the following steps."
    pub(super) fn parse_text_only_element(&mut self, tag: &Tag, state: TokenizerState) {
        // STEP 1: "Insert an HTML element for the token."
        let _ = self.insert_html_element(tag);
        // STEP 2: "If the algorithm that was invoked is the generic raw text
        // element parsing algorithm, switch the tokenizer to the RAWTEXT
        // state; otherwise the algorithm invoked was the generic RCDATA
        // element parsing algorithm, switch the tokenizer to the RCDATA
        // state."
        self.tokenizer.set_state(state);
        // STEP 3: "Set the original insertion mode to the current insertion
        // mode."
        self.original_insertion_mode = Some(self.insertion_mode);
        // STEP 4: "Then, switch the insertion mode to "text"."
        self.switch_mode(InsertionMode::Text);
    }

    /// [§ 13.2.4.3 Reconstruct the active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#reconstruct-the-active-formatting-elements)
    pub(super) fn reconstruct_active_formatting_elements(&mut self) {
        // STEP 1: "If there are no entries in the list of active formatting
        // elements, then there is nothing to reconstruct; stop this
        // algorithm."
        // STEP 2: "If the last (most recently added) entry in the list of
        // active formatting elements is a marker, or if it is an element that
        // is in the stack of open elements, then there is nothing to
        // reconstruct; stop this algorithm."
        let is_open = |entry: &FormattingEntry<D::Handle>| match entry {
            FormattingEntry::Marker => true,
            FormattingEntry::Element { node, .. } => self.open_elements.contains(*node),
        };
        match self.active_formatting_elements.last() {
            None => return,
            Some(entry) if is_open(entry) => return,
            Some(_) => {}
        }

        // STEP 3: "Let entry be the last (most recently added) element in the
        // list of active formatting elements."
        let mut index = self.active_formatting_elements.len() - 1;

        // STEP 4-6: "Rewind: If there are no entries before entry in the list
        // of active formatting elements, then jump to the step labeled
        // create. Let entry be the entry one earlier than entry in the list
        // of active formatting elements. If entry is neither a marker nor an
        // element that is also in the stack of open elements, go to the step
        // labeled rewind."
        while index > 0 {
            let earlier = self.active_formatting_elements.get(index - 1);
            if earlier.is_some_and(is_open) {
                break;
            }
            index -= 1;
        }

        // STEP 7-10: "Advance ... Create: Insert an HTML element for the
        // token for which the element entry was created, to obtain new
        // element. Replace the entry for entry in the list with an entry for
        // new element. If the entry for new element in the list of active
        // formatting elements is not the last entry in the list, return to
        // the step labeled advance."
        for index in index..self.active_formatting_elements.len() {
            let Some(FormattingEntry::Element { tag, .. }) =
                self.active_formatting_elements.get(index).cloned()
            else {
                continue;
            };
            let node = self.insert_html_element(&tag);
            self.active_formatting_elements.replace_node(index, node);
        }
    }
}
