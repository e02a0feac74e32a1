//! [§ 13.2.4.3 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
//!
//! "Initially, the list of active formatting elements is empty. It is used to
//! handle mis-nested formatting element tags."

use crate::tokenizer::Tag;

/// "The list contains elements in the formatting category, and markers."
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormattingEntry<H> {
    /// "Markers are inserted when entering applet, object, marquee, template,
    /// td, th, and caption elements, and are used to prevent formatting from
    /// 'leaking' into applet, object, marquee, template, td, th, and caption
    /// elements."
    Marker,
    /// A formatting element together with the token it was created for, so
    /// it can be recreated by reconstruction or the adoption agency.
    Element {
        /// The DOM node.
        node: H,
        /// "the token for which the element was created"
        tag: Tag,
    },
}

impl<H: Copy + Eq> FormattingEntry<H> {
    /// The node, for element entries.
    pub const fn node(&self) -> Option<H> {
        match self {
            Self::Marker => None,
            Self::Element { node, .. } => Some(*node),
        }
    }
}

/// The list. Index 0 is the oldest entry.
#[derive(Debug, Clone)]
pub struct ActiveFormattingElements<H> {
    entries: Vec<FormattingEntry<H>>,
}

impl<H> Default for ActiveFormattingElements<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

/// Two attribute lists are equal "as compared when the elements are created
/// by the parser", i.e. as sets of name/value pairs.
fn same_attributes(a: &Tag, b: &Tag) -> bool {
    a.attributes.len() == b.attributes.len()
        && a.attributes.iter().all(|attr| {
            b.attributes
                .iter()
                .any(|other| other.name == attr.name && other.value == attr.value)
        })
}

impl<H: Copy + Eq> ActiveFormattingElements<H> {
    /// Number of entries, markers included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FormattingEntry<H>> {
        self.entries.get(index)
    }

    /// The most recently added entry.
    #[must_use]
    pub fn last(&self) -> Option<&FormattingEntry<H>> {
        self.entries.last()
    }

    /// "Insert a marker at the end of the list of active formatting elements."
    pub fn push_marker(&mut self) {
        self.entries.push(FormattingEntry::Marker);
    }

    /// [§ 13.2.4.3 Push onto the list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#push-onto-the-list-of-active-formatting-elements)
    ///
    /// "1. If there are already three elements in the list of active
    /// formatting elements after the last marker, if any, or anywhere in the
    /// list if there are no markers, that have the same tag name, namespace,
    /// and attributes as element, then remove the earliest such element from
    /// the list of active formatting elements. For these purposes, the
    /// attributes must be compared as they were when the elements were
    /// created by the parser; two elements have the same attributes if all
    /// their parsed attributes can be paired such that the two attributes in
    /// each pair have identical names, namespaces, and values (the order of
    /// the attributes does not matter).
    ///
    /// NOTE: This is the Noah's Ark clause. But with three per family instead
    /// of two.
    ///
    /// 2. Add element to the list of active formatting elements."
    pub fn push(&mut self, node: H, tag: Tag) {
        let mut matching = Vec::new();
        for (index, entry) in self.entries.iter().enumerate().rev() {
            match entry {
                FormattingEntry::Marker => break,
                FormattingEntry::Element { tag: other, .. } => {
                    if other.name == tag.name && same_attributes(other, &tag) {
                        matching.push(index);
                    }
                }
            }
        }
        if matching.len() >= 3
            && let Some(&earliest) = matching.last()
        {
            let _ = self.entries.remove(earliest);
        }
        self.entries.push(FormattingEntry::Element { node, tag });
    }

    /// [§ 13.2.4.3 Clear the list of active formatting elements up to the last marker](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-list-of-active-formatting-elements-up-to-the-last-marker)
    ///
    /// "1. Let entry be the last (most recently added) entry in the list of
    /// active formatting elements.
    /// 2. Remove entry from the list of active formatting elements.
    /// 3. If entry was a marker, then stop the algorithm at this point.
    /// 4. Go to step 1."
    pub fn clear_to_last_marker(&mut self) {
        while let Some(entry) = self.entries.pop() {
            if matches!(entry, FormattingEntry::Marker) {
                break;
            }
        }
    }

    /// The last element called `name` between the end of the list and the
    /// last marker, with its index.
    #[must_use]
    pub fn find_after_last_marker(&self, name: &str) -> Option<(usize, H)> {
        for (index, entry) in self.entries.iter().enumerate().rev() {
            match entry {
                FormattingEntry::Marker => return None,
                FormattingEntry::Element { node, tag } if tag.name == name => {
                    return Some((index, *node));
                }
                FormattingEntry::Element { .. } => {}
            }
        }
        None
    }

    /// Where `node` is in the list.
    #[must_use]
    pub fn position_of(&self, node: H) -> Option<usize> {
        self.entries.iter().position(|e| e.node() == Some(node))
    }

    /// Whether `node` is in the list.
    #[must_use]
    pub fn contains(&self, node: H) -> bool {
        self.position_of(node).is_some()
    }

    /// The token `node` was created for.
    #[must_use]
    pub fn tag_of(&self, node: H) -> Option<&Tag> {
        self.entries.iter().find_map(|entry| match entry {
            FormattingEntry::Element { node: n, tag } if *n == node => Some(tag),
            _ => None,
        })
    }

    /// Remove `node`, returning the index it was at.
    pub fn remove_node(&mut self, node: H) -> Option<usize> {
        let index = self.position_of(node)?;
        let _ = self.entries.remove(index);
        Some(index)
    }

    /// Insert an element entry at `index`.
    pub fn insert(&mut self, index: usize, node: H, tag: Tag) {
        let index = index.min(self.entries.len());
        self.entries.insert(index, FormattingEntry::Element { node, tag });
    }

    /// Point the entry at `index` at a new node, keeping its token.
    pub fn replace_node(&mut self, index: usize, node: H) {
        if let Some(FormattingEntry::Element { node: slot, .. }) = self.entries.get_mut(index) {
            *slot = node;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Attribute;

    fn tag(name: &str, attrs: &[(&str, &str)]) -> Tag {
        Tag {
            name: name.to_string(),
            self_closing: false,
            attributes: attrs
                .iter()
                .map(|(n, v)| Attribute::new((*n).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    #[test]
    fn noahs_ark_keeps_three_of_a_kind() {
        let mut list = ActiveFormattingElements::default();
        for node in 0..5 {
            list.push(node, tag("b", &[]));
        }
        assert_eq!(list.len(), 3);
        assert_eq!(list.position_of(0), None);
        assert_eq!(list.position_of(1), None);
        assert_eq!(list.position_of(2), Some(0));
    }

    #[test]
    fn noahs_ark_compares_attributes_as_sets() {
        let mut list = ActiveFormattingElements::default();
        list.push(0, tag("b", &[("x", "1"), ("y", "2")]));
        list.push(1, tag("b", &[("y", "2"), ("x", "1")]));
        list.push(2, tag("b", &[("x", "1"), ("y", "2")]));
        list.push(3, tag("b", &[("x", "1")]));
        list.push(4, tag("b", &[("x", "1"), ("y", "2")]));
        assert!(!list.contains(0));
        assert!(list.contains(3));
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn markers_bound_the_ark_and_the_search() {
        let mut list = ActiveFormattingElements::default();
        list.push(0, tag("b", &[]));
        list.push(1, tag("b", &[]));
        list.push(2, tag("b", &[]));
        list.push_marker();
        list.push(3, tag("b", &[]));
        assert_eq!(list.len(), 5);
        assert_eq!(list.find_after_last_marker("b"), Some((4, 3)));
        list.clear_to_last_marker();
        assert_eq!(list.len(), 3);
        assert_eq!(list.find_after_last_marker("i"), None);
    }
}
