//! [§ 13.2.6.4.7 The adoption agency algorithm](https://html.spec.whatwg.org/multipage/parsing.html#adoption-agency-algorithm)

use log::debug;
use weft_dom::{DomProvider, Namespace};

use super::core::HTMLTreeBuilder;
use super::stack::Scope;
use crate::error::ParseErrorCode;

/// How an adoption agency run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Adoption {
    /// The end tag was handled.
    Done,
    /// "return and instead act as described in the "any other end tag"
    /// entry above"
    ActAsAnyOtherEndTag,
}

/// "If outer loop counter is greater than or equal to 8, then return."
const OUTER_LOOP_LIMIT: usize = 8;

/// "If inner loop counter is greater than 3 and node is in the list of active
/// formatting elements, then remove node from the list of active formatting
/// elements."
const INNER_LOOP_LIMIT: usize = 3;

impl<D: DomProvider> HTMLTreeBuilder<'_, D> {
    /// Run the adoption agency for the end tag (or implied end tag) `subject`.
    pub(super) fn run_adoption_agency(&mut self, subject: &str) -> Adoption {
        // STEP 2: "If the current node is an HTML element whose tag name is
        // subject, and the current node is not in the list of active
        // formatting elements, then pop the current node off the stack of
        // open elements and return."
        if let Some(current) = self.open_elements.current()
            && current.is_html(subject)
            && !self.active_formatting_elements.contains(current.node)
        {
            let _ = self.open_elements.pop();
            return Adoption::Done;
        }

        // STEP 3: "Let outer loop counter be 0."
        let mut outer_loop_counter = 0;

        // STEP 4: "While true:"
        loop {
            // STEP 4.1: "If outer loop counter is greater than or equal to 8,
            // then return."
            if outer_loop_counter >= OUTER_LOOP_LIMIT {
                debug!("adoption agency for </{subject}> hit the outer loop limit");
                return Adoption::Done;
            }

            // STEP 4.2: "Increment outer loop counter by 1."
            outer_loop_counter += 1;
            #[cfg(test)]
            {
                self.adoption_outer_loop_max = self.adoption_outer_loop_max.max(outer_loop_counter);
            }

            // STEP 4.3: "Let formatting element be the last element in the
            // list of active formatting elements that: is between the end of
            // the list and the last marker in the list, if any, or the start
            // of the list otherwise, and has the tag name subject. If there
            // is no such element, then return and instead act as described in
            // the "any other end tag" entry above."
            let Some((_, formatting_element)) =
                self.active_formatting_elements.find_after_last_marker(subject)
            else {
                return Adoption::ActAsAnyOtherEndTag;
            };

            // STEP 4.4: "If formatting element is not in the stack of open
            // elements, then this is a parse error; remove the element from
            // the list, and return."
            let Some(formatting_index) = self.open_elements.position_of(formatting_element) else {
                self.parse_error(ParseErrorCode::AdoptionAgencyNotOpen, &[subject]);
                let _ = self.active_formatting_elements.remove_node(formatting_element);
                return Adoption::Done;
            };

            // STEP 4.5: "If formatting element is in the stack of open
            // elements, but the element is not in scope, then this is a parse
            // error; return."
            if !self
                .open_elements
                .has_node_in_scope(formatting_element, Scope::Default)
            {
                self.parse_error(ParseErrorCode::AdoptionAgencyNotInScope, &[subject]);
                return Adoption::Done;
            }

            // STEP 4.6: "If formatting element is not the current node, this
            // is a parse error. (But do not return.)"
            if self.open_elements.current_node() != Some(formatting_element) {
                self.parse_error(ParseErrorCode::AdoptionAgencyNotCurrent, &[subject]);
            }

            // STEP 4.7: "Let furthest block be the topmost node in the stack
            // of open elements that is lower in the stack than formatting
            // element, and is an element in the special category. There might
            // not be one."
            let furthest_block_index = (formatting_index + 1..self.open_elements.len())
                .find(|&i| self.open_elements.get(i).is_some_and(|e| e.is_special()));

            // STEP 4.8: "If there is no furthest block, then the UA must first
            // pop all the nodes from the bottom of the stack of open elements,
            // from the current node up to and including formatting element,
            // then remove formatting element from the list of active
            // formatting elements, and finally return."
            let Some(furthest_block_index) = furthest_block_index else {
                self.open_elements.truncate(formatting_index);
                let _ = self.active_formatting_elements.remove_node(formatting_element);
                return Adoption::Done;
            };
            let Some(furthest_block) = self.open_elements.get(furthest_block_index).map(|e| e.node)
            else {
                return Adoption::Done;
            };

            // STEP 4.9: "Let common ancestor be the element immediately above
            // formatting element in the stack of open elements."
            let Some(common_ancestor) = formatting_index
                .checked_sub(1)
                .and_then(|i| self.open_elements.get(i))
                .map(|e| e.node)
            else {
                return Adoption::Done;
            };

            // STEP 4.10: "Let a bookmark note the position of formatting
            // element in the list of active formatting elements relative to
            // the elements on either side of it in the list."
            let Some(mut bookmark) = self.active_formatting_elements.position_of(formatting_element)
            else {
                return Adoption::Done;
            };

            // STEP 4.11: "Let node and last node be furthest block."
            let mut node_index = furthest_block_index;
            let mut last_node = furthest_block;

            // STEP 4.12: "Let inner loop counter be 0."
            let mut inner_loop_counter = 0;

            // STEP 4.13: "While true:"
            loop {
                // STEP 4.13.1: "Increment inner loop counter by 1."
                inner_loop_counter += 1;

                // STEP 4.13.2: "Let node be the element immediately above node
                // in the stack of open elements, or if node is no longer in
                // the stack of open elements (e.g. because it got removed by
                // this algorithm), the element that was immediately above node
                // in the stack of open elements before node was removed."
                node_index -= 1;
                let Some(node) = self.open_elements.get(node_index).map(|e| e.node) else {
                    break;
                };

                // STEP 4.13.3: "If node is formatting element, then break."
                if node == formatting_element {
                    break;
                }

                // STEP 4.13.4: "If inner loop counter is greater than 3 and
                // node is in the list of active formatting elements, then
                // remove node from the list of active formatting elements."
                if inner_loop_counter > INNER_LOOP_LIMIT
                    && let Some(removed) = self.active_formatting_elements.remove_node(node)
                    && removed < bookmark
                {
                    bookmark -= 1;
                }

                // STEP 4.13.5: "If node is not in the list of active
                // formatting elements, then remove node from the stack of open
                // elements and continue."
                let Some(entry_index) = self.active_formatting_elements.position_of(node) else {
                    let _ = self.open_elements.remove_node(node);
                    continue;
                };

                // STEP 4.13.6: "Create an element for the token for which the
                // element node was created, in the HTML namespace, with common
                // ancestor as the intended parent; replace the entry for node
                // in the list of active formatting elements with an entry for
                // the new element, replace the entry for node in the stack of
                // open elements with an entry for the new element, and let
                // node be the new element."
                let Some(tag) = self.active_formatting_elements.tag_of(node).cloned() else {
                    continue;
                };
                let element = self.create_element_for_token(&tag, Namespace::Html);
                let new_node = element.node;
                self.active_formatting_elements.replace_node(entry_index, new_node);
                self.open_elements.replace(node_index, element);

                // STEP 4.13.7: "If last node is furthest block, then move the
                // aforementioned bookmark to be immediately after the new node
                // in the list of active formatting elements."
                if last_node == furthest_block {
                    bookmark = entry_index + 1;
                }

                // STEP 4.13.8: "Append last node to node."
                self.dom.append_child(new_node, last_node);

                // STEP 4.13.9: "Set last node to node."
                last_node = new_node;
            }

            // STEP 4.14: "Insert whatever last node ended up being in the
            // previous step at the appropriate place for inserting a node, but
            // using common ancestor as the override target."
            if let Some(point) = self.appropriate_place(Some(common_ancestor)) {
                self.insert_at(point, last_node);
            }

            // STEP 4.15: "Create an element for the token for which formatting
            // element was created, in the HTML namespace, with furthest block
            // as the intended parent."
            let Some(tag) = self.active_formatting_elements.tag_of(formatting_element).cloned()
            else {
                return Adoption::Done;
            };
            let element = self.create_element_for_token(&tag, Namespace::Html);
            let new_element = element.node;

            // STEP 4.16: "Take all of the child nodes of furthest block and
            // append them to the element created in the last step."
            self.dom.reparent_children(furthest_block, new_element);

            // STEP 4.17: "Append that new element to furthest block."
            self.dom.append_child(furthest_block, new_element);

            // STEP 4.18: "Remove formatting element from the list of active
            // formatting elements, and insert the new element into the list
            // of active formatting elements at the position of the
            // aforementioned bookmark."
            if let Some(removed) = self.active_formatting_elements.remove_node(formatting_element)
                && removed < bookmark
            {
                bookmark -= 1;
            }
            self.active_formatting_elements.insert(bookmark, new_element, tag);

            // STEP 4.19: "Remove formatting element from the stack of open
            // elements, and insert the new element into the stack of open
            // elements immediately below the position of furthest block in
            // that stack."
            let _ = self.open_elements.remove_node(formatting_element);
            if let Some(index) = self.open_elements.position_of(furthest_block) {
                self.open_elements.insert(index + 1, element);
            }
        }
    }

    /// Whether any entry after the last marker is an element named `name`,
    /// used by the `a` start tag rule.
    pub(super) fn formatting_element_after_last_marker(&self, name: &str) -> Option<D::Handle> {
        self.active_formatting_elements
            .find_after_last_marker(name)
            .map(|(_, node)| node)
    }

    /// Drop `node` from both the list and the stack, as the `a` and `nobr`
    /// start tag rules do after running the agency.
    pub(super) fn forget_formatting_element(&mut self, node: D::Handle) {
        let _ = self.active_formatting_elements.remove_node(node);
        let _ = self.open_elements.remove_node(node);
    }
}

#[cfg(test)]
mod tests {
    use weft_dom::DomTree;
    use weft_dom::dump::test_format;

    use super::*;
    use crate::config::ParserOptions;
    use crate::tokenizer::HTMLTokenizer;

    fn parse(html: &str) -> (DomTree, usize) {
        let mut dom = DomTree::new();
        let max = {
            let mut builder = HTMLTreeBuilder::new(
                &mut dom,
                HTMLTokenizer::from_text(html),
                &ParserOptions::default(),
            );
            builder.run().expect("text input never restarts");
            builder.adoption_outer_loop_max
        };
        (dom, max)
    }

    #[test]
    fn misnested_bold_and_paragraph() {
        let (dom, _) = parse("<!DOCTYPE html><b>1<p>2</b>3</p>");
        assert_eq!(
            test_format(&dom),
            "| <!DOCTYPE html>\n| <html>\n|   <head>\n|   <body>\n|     <b>\n|       \"1\"\n|     <p>\n|       <b>\n|         \"2\"\n|       \"3\"\n"
        );
    }

    #[test]
    fn outer_loop_is_bounded_on_deep_misnesting() {
        let mut html = String::from("<!DOCTYPE html>");
        for _ in 0..600 {
            html.push_str("<b><i><div>");
        }
        for _ in 0..600 {
            html.push_str("</b></i>");
        }
        let (_, max) = parse(&html);
        assert!(max <= OUTER_LOOP_LIMIT, "outer loop ran {max} times");
    }

    /// Any mix of formatting and block tags keeps the outer loop in bounds.
    #[quickcheck_macros::quickcheck]
    fn outer_loop_bound_holds_for_any_tag_soup(picks: Vec<u8>) -> bool {
        const PIECES: [&str; 10] = [
            "<b>", "</b>", "<i>", "</i>", "<a>", "</a>", "<div>", "</div>", "<p>", "<table>",
        ];
        let html: String = picks
            .iter()
            .map(|&pick| PIECES[usize::from(pick) % PIECES.len()])
            .collect();
        parse(&html).1 <= OUTER_LOOP_LIMIT
    }
}
