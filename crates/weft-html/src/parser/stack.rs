//! [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
//!
//! "Initially, the stack of open elements is empty. The stack grows downwards;
//! the topmost node on the stack is the first one added to the stack, and the
//! bottommost node of the stack is the most recently added node in the stack."
//!
//! Entries carry the element's namespace and local name alongside its handle,
//! so the scope checks never have to go back to the DOM.

use weft_dom::Namespace;

use super::tag_sets;

/// One entry on the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenElement<H> {
    /// The DOM node.
    pub node: H,
    /// The element's namespace.
    pub namespace: Namespace,
    /// The element's local name, as created in the DOM.
    pub name: String,
    /// "A node is an HTML integration point if it is ... a MathML
    /// annotation-xml element whose start tag token had an attribute with the
    /// name "encoding" whose value was an ASCII case-insensitive match for the
    /// string "text/html" [or] "application/xhtml+xml""
    ///
    /// Recorded at creation, since the token is gone afterwards.
    pub annotation_xml_is_html: bool,
}

impl<H> OpenElement<H> {
    /// An entry for an element with no integration-point annotation.
    pub fn new(node: H, namespace: Namespace, name: impl Into<String>) -> Self {
        Self {
            node,
            namespace,
            name: name.into(),
            annotation_xml_is_html: false,
        }
    }

    /// An HTML element named `name`.
    #[must_use]
    pub fn is_html(&self, name: &str) -> bool {
        self.namespace == Namespace::Html && self.name == name
    }

    /// An HTML element whose name satisfies `names`.
    pub fn is_html_where(&self, names: impl Fn(&str) -> bool) -> bool {
        self.namespace == Namespace::Html && names(&self.name)
    }

    /// "in the special category"
    #[must_use]
    pub fn is_special(&self) -> bool {
        tag_sets::is_special(self.namespace, &self.name)
    }

    /// "A node is a MathML text integration point if it is one of the
    /// following elements: A MathML mi element, A MathML mo element, A MathML
    /// mn element, A MathML ms element, A MathML mtext element"
    #[must_use]
    pub fn is_mathml_text_integration_point(&self) -> bool {
        self.namespace == Namespace::MathMl
            && matches!(self.name.as_str(), "mi" | "mo" | "mn" | "ms" | "mtext")
    }

    /// "A node is an HTML integration point if it is one of the following
    /// elements: ... An SVG foreignObject element, An SVG desc element, An SVG
    /// title element"
    #[must_use]
    pub fn is_html_integration_point(&self) -> bool {
        match self.namespace {
            Namespace::MathMl => self.annotation_xml_is_html,
            Namespace::Svg => matches!(self.name.as_str(), "foreignObject" | "desc" | "title"),
            _ => false,
        }
    }
}

/// [§ 13.2.4.2 Has an element in scope](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
///
/// The element types that stop a scope search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// "has an element in scope"
    Default,
    /// "has an element in list item scope": adds `ol` and `ul`.
    ListItem,
    /// "has an element in button scope": adds `button`.
    Button,
    /// "has an element in table scope": only `html`, `table` and `template`.
    Table,
    /// "has an element in select scope": everything except `optgroup` and
    /// `option`.
    Select,
}

impl Scope {
    fn is_boundary<H>(self, element: &OpenElement<H>) -> bool {
        let name = element.name.as_str();
        let default = || match element.namespace {
            Namespace::Html => matches!(
                name,
                "applet" | "caption" | "html" | "table" | "td" | "th" | "marquee" | "object"
                    | "template"
            ),
            Namespace::MathMl => {
                matches!(name, "mi" | "mo" | "mn" | "ms" | "mtext" | "annotation-xml")
            }
            Namespace::Svg => matches!(name, "foreignObject" | "desc" | "title"),
            _ => false,
        };
        match self {
            Self::Default => default(),
            Self::ListItem => default() || element.is_html("ol") || element.is_html("ul"),
            Self::Button => default() || element.is_html("button"),
            Self::Table => element.is_html_where(|n| matches!(n, "html" | "table" | "template")),
            Self::Select => !element.is_html_where(|n| matches!(n, "optgroup" | "option")),
        }
    }
}

/// The stack itself. Index 0 is the topmost node (normally `html`).
#[derive(Debug, Clone)]
pub struct OpenElementsStack<H> {
    entries: Vec<OpenElement<H>>,
}

impl<H> Default for OpenElementsStack<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<H: Copy + Eq> OpenElementsStack<H> {
    /// Push onto the bottom of the stack.
    pub fn push(&mut self, element: OpenElement<H>) {
        self.entries.push(element);
    }

    /// Pop the current node.
    pub fn pop(&mut self) -> Option<OpenElement<H>> {
        self.entries.pop()
    }

    /// Number of open elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry at `index`, counting from the top.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&OpenElement<H>> {
        self.entries.get(index)
    }

    /// Entries from the top (`html`) down to the current node.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &OpenElement<H>> {
        self.entries.iter()
    }

    /// "The current node is the bottommost node in this stack of open
    /// elements."
    #[must_use]
    pub fn current(&self) -> Option<&OpenElement<H>> {
        self.entries.last()
    }

    /// The current node's handle.
    #[must_use]
    pub fn current_node(&self) -> Option<H> {
        self.current().map(|e| e.node)
    }

    /// Whether the current node is the HTML element `name`.
    #[must_use]
    pub fn current_is(&self, name: &str) -> bool {
        self.current().is_some_and(|e| e.is_html(name))
    }

    /// Where `node` sits on the stack.
    #[must_use]
    pub fn position_of(&self, node: H) -> Option<usize> {
        self.entries.iter().rposition(|e| e.node == node)
    }

    /// Whether `node` is open.
    #[must_use]
    pub fn contains(&self, node: H) -> bool {
        self.position_of(node).is_some()
    }

    /// Whether any HTML element called `name` is open, in or out of scope.
    #[must_use]
    pub fn contains_html(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.is_html(name))
    }

    /// The lowest HTML element satisfying `names`.
    pub fn find(&self, names: impl Fn(&str) -> bool) -> Option<usize> {
        self.entries.iter().rposition(|e| e.is_html_where(&names))
    }

    /// The first element, from the top, that does not satisfy `allowed`.
    pub fn find_not(&self, allowed: impl Fn(&OpenElement<H>) -> bool) -> Option<usize> {
        self.entries.iter().position(|e| !allowed(e))
    }

    /// [§ 13.2.4.3 Has an element in the specific scope](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
    ///
    /// "1. Initialize node to be the current node (the bottommost node of the
    /// stack).
    /// 2. If node is the target node, terminate in a match state.
    /// 3. Otherwise, if node is one of the element types in list, terminate in
    /// a failure state.
    /// 4. Otherwise, set node to the previous entry in the stack of open
    /// elements and return to step 2."
    ///
    /// Targets are HTML elements whose name satisfies `names`.
    pub fn has_in_scope(&self, names: impl Fn(&str) -> bool, scope: Scope) -> bool {
        for element in self.entries.iter().rev() {
            if element.is_html_where(&names) {
                return true;
            }
            if scope.is_boundary(element) {
                return false;
            }
        }
        false
    }

    /// Scope check for a single tag name.
    #[must_use]
    pub fn has_element_in_scope(&self, name: &str, scope: Scope) -> bool {
        self.has_in_scope(|n| n == name, scope)
    }

    /// Scope check for a specific node rather than a tag name.
    #[must_use]
    pub fn has_node_in_scope(&self, node: H, scope: Scope) -> bool {
        for element in self.entries.iter().rev() {
            if element.node == node {
                return true;
            }
            if scope.is_boundary(element) {
                return false;
            }
        }
        false
    }

    /// Pop until an HTML element satisfying `names` has been popped.
    /// Returns the popped element.
    pub fn pop_until(&mut self, names: impl Fn(&str) -> bool) -> Option<OpenElement<H>> {
        while let Some(element) = self.entries.pop() {
            if element.is_html_where(&names) {
                return Some(element);
            }
        }
        None
    }

    /// Pop until an HTML element called `name` has been popped.
    pub fn pop_until_named(&mut self, name: &str) -> Option<OpenElement<H>> {
        self.pop_until(|n| n == name)
    }

    /// Pop until `node` itself has been popped.
    pub fn pop_until_node(&mut self, node: H) {
        if let Some(index) = self.position_of(node) {
            self.entries.truncate(index);
        }
    }

    /// Pop everything below index `len`, keeping `len` entries.
    pub fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    /// Take `node` out of the stack wherever it is.
    pub fn remove_node(&mut self, node: H) -> Option<OpenElement<H>> {
        let index = self.position_of(node)?;
        Some(self.entries.remove(index))
    }

    /// Insert an entry at `index`.
    pub fn insert(&mut self, index: usize, element: OpenElement<H>) {
        self.entries.insert(index, element);
    }

    /// Put `element` in place of the entry at `index`.
    pub fn replace(&mut self, index: usize, element: OpenElement<H>) {
        if let Some(slot) = self.entries.get_mut(index) {
            *slot = element;
        }
    }

    /// [§ 13.2.6.3 Generate implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
    ///
    /// "while the current node is [one of the implied end tag elements], the
    /// UA must pop the current node off the stack of open elements."
    ///
    /// `except` names an element the caller wants to keep.
    pub fn generate_implied_end_tags(&mut self, except: Option<&str>) {
        while let Some(current) = self.current() {
            let implied = current.is_html_where(tag_sets::has_implied_end_tag)
                && except.is_none_or(|name| current.name != name);
            if !implied {
                break;
            }
            let _ = self.entries.pop();
        }
    }

    /// "generate all implied end tags thoroughly"
    pub fn generate_all_implied_end_tags_thoroughly(&mut self) {
        while self
            .current()
            .is_some_and(|e| e.is_html_where(tag_sets::has_implied_end_tag_thoroughly))
        {
            let _ = self.entries.pop();
        }
    }

    fn pop_while_current_is_not(&mut self, stop: impl Fn(&str) -> bool) {
        while self.current().is_some_and(|e| !e.is_html_where(&stop)) {
            let _ = self.entries.pop();
        }
    }

    /// "clear the stack back to a table context": "while the current node is
    /// not a table, template, or html element, pop elements from the stack of
    /// open elements."
    pub fn clear_back_to_table_context(&mut self) {
        self.pop_while_current_is_not(|n| matches!(n, "table" | "template" | "html"));
    }

    /// "clear the stack back to a table body context": "while the current node
    /// is not a tbody, tfoot, thead, template, or html element, pop elements
    /// from the stack of open elements."
    pub fn clear_back_to_table_body_context(&mut self) {
        self.pop_while_current_is_not(|n| {
            matches!(n, "tbody" | "tfoot" | "thead" | "template" | "html")
        });
    }

    /// "clear the stack back to a table row context": "while the current node
    /// is not a tr, template, or html element, pop elements from the stack of
    /// open elements."
    pub fn clear_back_to_table_row_context(&mut self) {
        self.pop_while_current_is_not(|n| matches!(n, "tr" | "template" | "html"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(names: &[(Namespace, &str)]) -> OpenElementsStack<usize> {
        let mut stack = OpenElementsStack::default();
        for (i, (ns, name)) in names.iter().enumerate() {
            stack.push(OpenElement::new(i, *ns, *name));
        }
        stack
    }

    fn html(names: &[&str]) -> OpenElementsStack<usize> {
        stack(&names.iter().map(|n| (Namespace::Html, *n)).collect::<Vec<_>>())
    }

    #[test]
    fn button_scope_stops_at_button() {
        let s = html(&["html", "body", "p", "button", "span"]);
        assert!(!s.has_element_in_scope("p", Scope::Button));
        assert!(s.has_element_in_scope("p", Scope::Default));
    }

    #[test]
    fn table_scope_ignores_ordinary_boundaries() {
        let s = html(&["html", "body", "table", "tbody", "tr", "td", "applet", "div"]);
        assert!(s.has_element_in_scope("td", Scope::Table));
        assert!(!s.has_element_in_scope("td", Scope::Default));
        assert!(!s.has_element_in_scope("body", Scope::Table));
    }

    #[test]
    fn select_scope_only_sees_through_options() {
        let s = html(&["html", "body", "select", "optgroup", "option"]);
        assert!(s.has_element_in_scope("select", Scope::Select));
        let s = html(&["html", "body", "select", "div"]);
        assert!(!s.has_element_in_scope("select", Scope::Select));
    }

    #[test]
    fn foreign_elements_are_not_targets() {
        let s = stack(&[
            (Namespace::Html, "html"),
            (Namespace::Html, "body"),
            (Namespace::Svg, "svg"),
            (Namespace::Svg, "p"),
        ]);
        assert!(!s.has_element_in_scope("p", Scope::Default));
        assert_eq!(s.find(|n| n == "body"), Some(1));
    }

    #[test]
    fn svg_title_bounds_the_default_scope() {
        let s = stack(&[
            (Namespace::Html, "html"),
            (Namespace::Html, "p"),
            (Namespace::Svg, "svg"),
            (Namespace::Svg, "title"),
        ]);
        assert!(!s.has_element_in_scope("p", Scope::Default));
    }

    #[test]
    fn implied_end_tags_respect_exception() {
        let mut s = html(&["html", "body", "ul", "li", "p"]);
        s.generate_implied_end_tags(Some("li"));
        assert!(s.current_is("li"));
        s.generate_implied_end_tags(None);
        assert!(s.current_is("ul"));
    }

    #[test]
    fn pop_until_named_pops_through_the_match() {
        let mut s = html(&["html", "body", "div", "span", "em"]);
        let popped = s.pop_until_named("div");
        assert_eq!(popped.map(|e| e.node), Some(2));
        assert!(s.current_is("body"));
    }

    #[test]
    fn clear_back_to_table_context_stops_at_table() {
        let mut s = html(&["html", "body", "table", "tbody", "tr"]);
        s.clear_back_to_table_context();
        assert!(s.current_is("table"));
    }

    #[test]
    fn remove_node_keeps_the_rest_in_order() {
        let mut s = html(&["html", "body", "b", "i"]);
        let removed = s.remove_node(2);
        assert_eq!(removed.map(|e| e.name), Some("b".to_string()));
        assert_eq!(s.iter().map(|e| e.node).collect::<Vec<_>>(), vec![0, 1, 3]);
    }
}
