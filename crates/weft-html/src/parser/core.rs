//! The tree builder: state, the token dispatcher and the reprocess loop.
//!
//! The insertion modes themselves live in `modes/`, foreign content in
//! `foreign_content/`, and the node-creation helpers in `insertion.rs`. They
//! are all further `impl HTMLTreeBuilder` blocks.

use log::{debug, trace};
use strum_macros::Display;
use weft_dom::{DomProvider, Namespace, QuirksMode};

use super::formatting::ActiveFormattingElements;
use super::stack::{OpenElement, OpenElementsStack};
use crate::config::ParserOptions;
use crate::error::{ParseError, ParseErrorCode, Restart};
use crate::tokenizer::{HTMLTokenizer, Tag, Token, TokenizerState};

/// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
///
/// "The insertion mode is a state variable that controls the primary operation
/// of the tree construction stage."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum InsertionMode {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    Initial,
    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    BeforeHtml,
    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    BeforeHead,
    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    InHead,
    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    InHeadNoscript,
    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    AfterHead,
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    InBody,
    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    Text,
    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    InTable,
    /// [§ 13.2.6.4.10 The "in table text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intabletext)
    InTableText,
    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    InCaption,
    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolumngroup)
    InColumnGroup,
    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intablebody)
    InTableBody,
    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inrow)
    InRow,
    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incell)
    InCell,
    /// [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    InSelect,
    /// [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    InSelectInTable,
    /// [§ 13.2.6.4.18 The "in template" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intemplate)
    InTemplate,
    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    AfterBody,
    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    InFrameset,
    /// [§ 13.2.6.4.21 The "after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    AfterFrameset,
    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    AfterAfterBody,
    /// [§ 13.2.6.4.23 The "after after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    AfterAfterFrameset,
}

/// What a rule did with its token.
#[derive(Debug)]
pub(crate) enum Step {
    /// The token is fully handled.
    Done,
    /// "Reprocess the token": run the dispatcher again, usually after the
    /// insertion mode changed. The token may have been rewritten.
    Reprocess(Token),
}

/// Every rule returns this. The `Err` side is the encoding restart, which
/// unwinds all the way out of the parse.
pub(crate) type Flow = Result<Step, Restart>;

/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
///
/// Pulls tokens from an [`HTMLTokenizer`] and builds a document through a
/// [`DomProvider`]. The builder borrows the DOM; node lifetimes belong to it.
pub struct HTMLTreeBuilder<'d, D: DomProvider> {
    pub(super) dom: &'d mut D,
    pub(super) tokenizer: HTMLTokenizer,

    /// [§ 13.2.1 The scripting flag](https://html.spec.whatwg.org/multipage/parsing.html#scripting-flag)
    pub(super) scripting: bool,
    /// Bound on reprocess passes for one token.
    max_reprocess: usize,

    /// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
    pub(super) insertion_mode: InsertionMode,

    /// "When the insertion mode is switched to "text" or "in table text", the
    /// original insertion mode is also set. This is the insertion mode to
    /// which the tree construction stage will return."
    pub(super) original_insertion_mode: Option<InsertionMode>,

    /// "The stack of template insertion modes"
    pub(super) template_insertion_modes: Vec<InsertionMode>,

    /// [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    pub(super) open_elements: OpenElementsStack<D::Handle>,

    /// [§ 13.2.4.3 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
    pub(super) active_formatting_elements: ActiveFormattingElements<D::Handle>,

    /// [§ 13.2.4.4 The element pointers](https://html.spec.whatwg.org/multipage/parsing.html#the-element-pointers)
    pub(super) head_element_pointer: Option<D::Handle>,

    /// "The form element pointer points to the last form element that was
    /// opened and whose end tag has not yet been seen."
    pub(super) form_element_pointer: Option<D::Handle>,

    /// The context element when parsing a fragment.
    pub(super) context_element: Option<OpenElement<D::Handle>>,

    /// The document's mode, as determined by the DOCTYPE or given for a
    /// fragment.
    pub(super) quirks_mode: QuirksMode,

    /// [§ 13.2.6.1 Foster parenting](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
    pub(super) foster_parenting: bool,
    /// Set when a node was actually placed by the foster parenting rules
    /// since the flag was last cleared.
    pub(super) content_fostered: bool,

    /// "The frameset-ok flag is set to "ok" when the parser is created."
    pub(super) frameset_ok: bool,

    /// "the pending table character tokens list", as one string.
    pub(super) pending_table_characters: String,
    /// Whether the pending table characters contain non-whitespace.
    pub(super) pending_table_characters_dirty: bool,

    /// "If the next token is a U+000A LINE FEED (LF) character token, then
    /// ignore that token and move on to the next one."
    pub(super) ignore_next_line_feed: bool,

    /// "acknowledge the token's self-closing flag"
    self_closing_acknowledged: bool,

    /// Set once any name had to be coerced; end tag names are coerced the
    /// same way from then on so they still match.
    pub(super) mangled_names: bool,

    /// "stop parsing"
    pub(super) stopped: bool,

    /// The most outer-loop iterations any adoption agency run took.
    #[cfg(test)]
    pub(super) adoption_outer_loop_max: usize,
}

impl<'d, D: DomProvider> HTMLTreeBuilder<'d, D> {
    /// Create a tree builder that parses a whole document into `dom`.
    ///
    /// # Panics
    /// If `dom` already has content: a document is built exactly once.
    pub fn new(dom: &'d mut D, tokenizer: HTMLTokenizer, options: &ParserOptions) -> Self {
        assert!(
            dom.is_pristine(),
            "the tree builder needs an empty document to build into"
        );
        Self {
            dom,
            tokenizer,
            scripting: options.scripting,
            max_reprocess: options.max_reprocess,
            insertion_mode: InsertionMode::Initial,
            original_insertion_mode: None,
            template_insertion_modes: Vec::new(),
            open_elements: OpenElementsStack::default(),
            active_formatting_elements: ActiveFormattingElements::default(),
            head_element_pointer: None,
            form_element_pointer: None,
            context_element: None,
            quirks_mode: QuirksMode::NoQuirks,
            foster_parenting: false,
            content_fostered: false,
            frameset_ok: true,
            pending_table_characters: String::new(),
            pending_table_characters_dirty: false,
            ignore_next_line_feed: false,
            self_closing_acknowledged: false,
            mangled_names: false,
            stopped: false,
            #[cfg(test)]
            adoption_outer_loop_max: 0,
        }
    }

    /// [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
    ///
    /// Set up for parsing a fragment in the context of the element `context`,
    /// which must be an element in `dom`. Returns the builder and the
    /// synthetic `html` root whose children are the result.
    pub fn new_fragment(
        dom: &'d mut D,
        tokenizer: HTMLTokenizer,
        options: &ParserOptions,
        context: D::Handle,
        quirks_mode: QuirksMode,
    ) -> (Self, D::Handle) {
        let mut builder = Self {
            dom,
            tokenizer,
            scripting: options.scripting,
            max_reprocess: options.max_reprocess,
            insertion_mode: InsertionMode::Initial,
            original_insertion_mode: None,
            template_insertion_modes: Vec::new(),
            open_elements: OpenElementsStack::default(),
            active_formatting_elements: ActiveFormattingElements::default(),
            head_element_pointer: None,
            form_element_pointer: None,
            context_element: None,
            // STEP 3: "If the context element's node document is in quirks
            // mode, then let the Document be in quirks mode. Otherwise, ..."
            quirks_mode,
            foster_parenting: false,
            content_fostered: false,
            frameset_ok: true,
            pending_table_characters: String::new(),
            pending_table_characters_dirty: false,
            ignore_next_line_feed: false,
            self_closing_acknowledged: false,
            mangled_names: false,
            stopped: false,
            #[cfg(test)]
            adoption_outer_loop_max: 0,
        };

        let namespace = builder.dom.namespace(context).unwrap_or(Namespace::Html);
        let name = builder.dom.local_name(context).unwrap_or_default().to_string();
        let annotation_xml_is_html = namespace == Namespace::MathMl
            && name == "annotation-xml"
            && builder.dom.attributes(context).iter().any(|a| {
                a.namespace.is_none()
                    && a.name == "encoding"
                    && (a.value.eq_ignore_ascii_case("text/html")
                        || a.value.eq_ignore_ascii_case("application/xhtml+xml"))
            });

        // STEP 4: "Set the state of the HTML parser's tokenization stage as
        // follows, switching on the context element"
        if namespace == Namespace::Html {
            let state = match name.as_str() {
                "title" | "textarea" => TokenizerState::RCDATA,
                "style" | "xmp" | "iframe" | "noembed" | "noframes" => TokenizerState::RAWTEXT,
                "script" => TokenizerState::ScriptData,
                "noscript" if builder.scripting => TokenizerState::RAWTEXT,
                "plaintext" => TokenizerState::PLAINTEXT,
                _ => TokenizerState::Data,
            };
            builder.tokenizer.set_state(state);
            builder.tokenizer.set_last_start_tag(Some(&name));
        }

        // STEP 5-7: "Let root be the result of creating an element given
        // document, "html", and the HTML namespace. Append the element root
        // to the Document node created above. Set up the HTML parser's stack
        // of open elements so that it contains just the single element root."
        let root = builder.create_element_for_token(&Tag::named("html"), Namespace::Html);
        let root_node = root.node;
        builder.open_elements.push(root);

        // STEP 8: "If the context element is a template element, then push
        // "in template" onto the stack of template insertion modes so that
        // it is the new current template insertion mode."
        if namespace == Namespace::Html && name == "template" {
            builder.template_insertion_modes.push(InsertionMode::InTemplate);
        }

        let mut context_element = OpenElement::new(context, namespace, name);
        context_element.annotation_xml_is_html = annotation_xml_is_html;
        builder.context_element = Some(context_element);

        // STEP 10: "Reset the parser's insertion mode appropriately."
        builder.reset_insertion_mode_appropriately();

        // STEP 11: "Set the parser's form element pointer to the nearest
        // node to the context element that is a form element (going straight
        // up the ancestor chain, and including the element itself, if it is
        // a form element), if any."
        let mut node = Some(context);
        while let Some(candidate) = node {
            if builder.dom.namespace(candidate) == Some(Namespace::Html)
                && builder.dom.local_name(candidate) == Some("form")
            {
                builder.form_element_pointer = Some(candidate);
                break;
            }
            node = builder.dom.parent(candidate);
        }

        (builder, root_node)
    }

    /// Run until the end-of-file token has been processed.
    ///
    /// # Errors
    /// [`Restart`] when a `<meta>` switches the encoding in a way that needs
    /// the whole parse to start again.
    pub fn run(&mut self) -> Result<(), Restart> {
        while !self.stopped {
            let foreign = self
                .adjusted_current_node()
                .is_some_and(|node| node.namespace != Namespace::Html);
            self.tokenizer.set_cdata_allowed(foreign);
            let Some(token) = self.tokenizer.next() else {
                break;
            };
            self.process_token(token)?;
        }
        Ok(())
    }

    /// Everything reported so far, tokenizer and tree builder alike, in
    /// order.
    pub fn take_errors(&mut self) -> Vec<ParseError> {
        self.tokenizer.take_errors()
    }

    /// The tokenizer, for its input stream's encoding details.
    #[must_use]
    pub const fn tokenizer(&self) -> &HTMLTokenizer {
        &self.tokenizer
    }

    /// The document mode the parse settled on.
    #[must_use]
    pub const fn quirks_mode(&self) -> QuirksMode {
        self.quirks_mode
    }

    /// The current insertion mode.
    #[must_use]
    pub const fn insertion_mode(&self) -> InsertionMode {
        self.insertion_mode
    }

    /// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
    ///
    /// Handle one token, including every reprocess pass it triggers.
    ///
    /// # Panics
    /// If one token is reprocessed more often than the configured bound,
    /// which means two rules are bouncing it between each other.
    fn process_token(&mut self, mut token: Token) -> Result<(), Restart> {
        if std::mem::take(&mut self.ignore_next_line_feed)
            && let Token::Whitespace { data } = &mut token
            && data.starts_with('\n')
        {
            let _ = data.remove(0);
            if data.is_empty() {
                return Ok(());
            }
        }

        if self.mangled_names
            && let Token::EndTag(tag) = &mut token
        {
            let coerced = super::names::coerce_name(&tag.name).into_owned();
            tag.name = coerced;
        }

        // "When a start tag token is emitted with its self-closing flag set,
        // if the flag is not acknowledged when it is processed by the tree
        // construction stage, that is a parse error."
        let self_closing = match &token {
            Token::StartTag(tag) if tag.self_closing => Some(tag.name.clone()),
            _ => None,
        };
        self.self_closing_acknowledged = false;

        let mut passes = 0;
        loop {
            match self.dispatch(token)? {
                Step::Done => break,
                Step::Reprocess(next) => {
                    passes += 1;
                    assert!(
                        passes <= self.max_reprocess,
                        "token {next} reprocessed {passes} times in {}",
                        self.insertion_mode
                    );
                    trace!("reprocessing {next} in {}", self.insertion_mode);
                    token = next;
                }
            }
        }

        if let Some(name) = self_closing
            && !self.self_closing_acknowledged
        {
            self.parse_error(
                ParseErrorCode::NonVoidHtmlElementStartTagWithTrailingSolidus,
                &[&name],
            );
        }
        Ok(())
    }

    /// [§ 13.2.6 Tree construction dispatcher](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    fn dispatch(&mut self, token: Token) -> Flow {
        if self.uses_html_content_rules(&token) {
            self.process_using_rules_for(self.insertion_mode, token)
        } else {
            self.process_using_foreign_content_rules(token)
        }
    }

    /// "If the stack of open elements is empty; If the adjusted current node
    /// is an element in the HTML namespace; If the adjusted current node is a
    /// MathML text integration point and the token is a start tag whose tag
    /// name is neither "mglyph" nor "malignmark"; If the adjusted current node
    /// is a MathML text integration point and the token is a character token;
    /// If the adjusted current node is a MathML annotation-xml element and the
    /// token is a start tag whose tag name is "svg"; If the adjusted current
    /// node is an HTML integration point and the token is a start tag; If the
    /// adjusted current node is an HTML integration point and the token is a
    /// character token; If the token is an end-of-file token
    ///
    /// Process the token according to the rules given in the section
    /// corresponding to the current insertion mode in HTML content."
    fn uses_html_content_rules(&self, token: &Token) -> bool {
        let Some(node) = self.adjusted_current_node() else {
            return true;
        };
        if node.namespace == Namespace::Html {
            return true;
        }
        match token {
            Token::EndOfFile => true,
            Token::StartTag(tag) => {
                (node.is_mathml_text_integration_point()
                    && !matches!(tag.name.as_str(), "mglyph" | "malignmark"))
                    || (node.namespace == Namespace::MathMl
                        && node.name == "annotation-xml"
                        && tag.name == "svg")
                    || node.is_html_integration_point()
            }
            Token::Character { .. } | Token::Whitespace { .. } | Token::NullCharacter { .. } => {
                node.is_mathml_text_integration_point() || node.is_html_integration_point()
            }
            _ => false,
        }
    }

    /// "process the token using the rules for" `mode`.
    pub(super) fn process_using_rules_for(&mut self, mode: InsertionMode, token: Token) -> Flow {
        match mode {
            InsertionMode::Initial => self.handle_initial_mode(token),
            InsertionMode::BeforeHtml => self.handle_before_html_mode(token),
            InsertionMode::BeforeHead => self.handle_before_head_mode(token),
            InsertionMode::InHead => self.handle_in_head_mode(token),
            InsertionMode::InHeadNoscript => self.handle_in_head_noscript_mode(token),
            InsertionMode::AfterHead => self.handle_after_head_mode(token),
            InsertionMode::InBody => self.handle_in_body_mode(token),
            InsertionMode::Text => self.handle_text_mode(token),
            InsertionMode::InTable => self.handle_in_table_mode(token),
            InsertionMode::InTableText => self.handle_in_table_text_mode(token),
            InsertionMode::InCaption => self.handle_in_caption_mode(token),
            InsertionMode::InColumnGroup => self.handle_in_column_group_mode(token),
            InsertionMode::InTableBody => self.handle_in_table_body_mode(token),
            InsertionMode::InRow => self.handle_in_row_mode(token),
            InsertionMode::InCell => self.handle_in_cell_mode(token),
            InsertionMode::InSelect => self.handle_in_select_mode(token),
            InsertionMode::InSelectInTable => self.handle_in_select_in_table_mode(token),
            InsertionMode::InTemplate => self.handle_in_template_mode(token),
            InsertionMode::AfterBody => self.handle_after_body_mode(token),
            InsertionMode::InFrameset => self.handle_in_frameset_mode(token),
            InsertionMode::AfterFrameset => self.handle_after_frameset_mode(token),
            InsertionMode::AfterAfterBody => self.handle_after_after_body_mode(token),
            InsertionMode::AfterAfterFrameset => self.handle_after_after_frameset_mode(token),
        }
    }

    /// Switch the insertion mode.
    pub(super) fn switch_mode(&mut self, mode: InsertionMode) {
        if mode != self.insertion_mode {
            debug!("insertion mode {} -> {mode}", self.insertion_mode);
        }
        self.insertion_mode = mode;
    }

    /// "Switch the insertion mode to" `mode` "and reprocess the token."
    pub(super) fn reprocess_in(&mut self, mode: InsertionMode, token: Token) -> Flow {
        self.switch_mode(mode);
        Ok(Step::Reprocess(token))
    }

    /// Record a tree construction error at the current input position.
    pub(super) fn parse_error(&mut self, code: ParseErrorCode, args: &[&str]) {
        self.tokenizer.input_mut().report(code, args);
    }

    /// The generic "parse error" for a token a mode does not expect.
    pub(super) fn unexpected(&mut self, token: &Token) {
        match token {
            Token::StartTag(tag) => {
                self.parse_error(ParseErrorCode::UnexpectedStartTag, &[&tag.name]);
            }
            Token::EndTag(tag) => self.parse_error(ParseErrorCode::UnexpectedEndTag, &[&tag.name]),
            Token::Doctype(_) => self.parse_error(ParseErrorCode::UnexpectedDoctype, &[]),
            Token::EndOfFile => self.parse_error(ParseErrorCode::ExpectedClosingTagButGotEof, &[]),
            Token::Comment { .. }
            | Token::Character { .. }
            | Token::Whitespace { .. }
            | Token::NullCharacter { .. } => {
                self.parse_error(ParseErrorCode::UnexpectedCharacters, &[]);
            }
        }
    }

    /// "Acknowledge the token's self-closing flag"
    pub(super) const fn acknowledge_self_closing(&mut self) {
        self.self_closing_acknowledged = true;
    }

    /// [§ 13.2.4.3 Adjusted current node](https://html.spec.whatwg.org/multipage/parsing.html#adjusted-current-node)
    ///
    /// "The adjusted current node is the context element if the parser was
    /// created as part of the HTML fragment parsing algorithm and the stack
    /// of open elements has only one element in it (fragment case);
    /// otherwise, the adjusted current node is the current node."
    pub(super) fn adjusted_current_node(&self) -> Option<&OpenElement<D::Handle>> {
        match &self.context_element {
            Some(context) if self.open_elements.len() == 1 => Some(context),
            _ => self.open_elements.current(),
        }
    }

    /// Whether this builder is running the fragment algorithm.
    pub(super) const fn is_fragment(&self) -> bool {
        self.context_element.is_some()
    }

    /// [§ 13.2.6.5 Stop parsing](https://html.spec.whatwg.org/multipage/parsing.html#stop-parsing)
    ///
    /// "Pop all the nodes off the stack of open elements."
    pub(super) fn stop_parsing(&mut self) -> Flow {
        debug!("stop parsing in {}", self.insertion_mode);
        while self.open_elements.pop().is_some() {}
        self.stopped = true;
        Ok(Step::Done)
    }

    /// [§ 13.2.4.1 Reset the insertion mode appropriately](https://html.spec.whatwg.org/multipage/parsing.html#reset-the-insertion-mode-appropriately)
    pub(super) fn reset_insertion_mode_appropriately(&mut self) {
        let mode = self.appropriate_insertion_mode();
        self.switch_mode(mode);
    }

    fn appropriate_insertion_mode(&self) -> InsertionMode {
        // STEP 1: "Let last be false."
        // STEP 2: "Let node be the last node in the stack of open elements."
        for index in (0..self.open_elements.len()).rev() {
            let Some(mut node) = self.open_elements.get(index) else {
                continue;
            };
            // STEP 3: "Loop: If node is the first node in the stack of open
            // elements, then set last to true, and, if the parser was created
            // as part of the HTML fragment parsing algorithm (fragment case),
            // set node to the context element passed to that algorithm."
            let last = index == 0;
            if last && let Some(context) = &self.context_element {
                node = context;
            }
            if node.namespace != Namespace::Html {
                if last {
                    return InsertionMode::InBody;
                }
                continue;
            }
            match node.name.as_str() {
                // STEP 4: "If node is a select element, run these substeps:"
                "select" => {
                    if !last {
                        for ancestor in (0..index).rev() {
                            match self.open_elements.get(ancestor) {
                                Some(a) if a.is_html("template") => break,
                                Some(a) if a.is_html("table") => {
                                    return InsertionMode::InSelectInTable;
                                }
                                _ => {}
                            }
                        }
                    }
                    return InsertionMode::InSelect;
                }
                // STEP 5: "If node is a td or th element and last is false,
                // then switch the insertion mode to "in cell" and return."
                "td" | "th" if !last => return InsertionMode::InCell,
                "tr" => return InsertionMode::InRow,
                "tbody" | "thead" | "tfoot" => return InsertionMode::InTableBody,
                "caption" => return InsertionMode::InCaption,
                "colgroup" => return InsertionMode::InColumnGroup,
                "table" => return InsertionMode::InTable,
                // STEP 12: "If node is a template element, then switch the
                // insertion mode to the current template insertion mode and
                // return."
                "template" => {
                    return self
                        .template_insertion_modes
                        .last()
                        .copied()
                        .unwrap_or(InsertionMode::InTemplate);
                }
                "head" if !last => return InsertionMode::InHead,
                "body" => return InsertionMode::InBody,
                "frameset" => return InsertionMode::InFrameset,
                // STEP 15: "If node is an html element, run these substeps:
                // If the head element pointer is null, switch the insertion
                // mode to "before head" and return. (fragment case)
                // Otherwise, the head element pointer is not null, switch the
                // insertion mode to "after head" and return."
                "html" => {
                    return if self.head_element_pointer.is_none() {
                        InsertionMode::BeforeHead
                    } else {
                        InsertionMode::AfterHead
                    };
                }
                _ => {}
            }
            // STEP 16: "If last is true, then switch the insertion mode to
            // "in body" and return. (fragment case)"
            if last {
                return InsertionMode::InBody;
            }
        }
        InsertionMode::InBody
    }
}
