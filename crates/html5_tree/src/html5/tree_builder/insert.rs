//! Node insertion and the shared stack algorithms most handlers lean on.

use super::formatting::FormattingEntry;
use super::stack::{ItemId, StackItem};
use super::{Html5TreeBuilder, InsertionMode, TreeSink};
use crate::html5::shared::{Attribute, Namespace, ParseErrorCode, TokenizerState};
use std::sync::Arc;

/// Elements whose end tag may be implied by `generate_implied_end_tags`.
const IMPLIED_END_TAGS: &[&str] = &["dd", "dt", "li", "option", "optgroup", "p", "rp", "rt"];

impl<S: TreeSink> Html5TreeBuilder<S> {
    /// Current node. The stack is never empty once tokens flow past
    /// `before html`.
    pub(crate) fn current(&self) -> &StackItem<S::Handle> {
        self.open_elements
            .top()
            .expect("stack of open elements is empty")
    }

    /// Current node is the HTML element `name`.
    pub(crate) fn current_is(&self, name: &str) -> bool {
        self.open_elements
            .top()
            .is_some_and(|current| current.is_html(name))
    }

    pub(crate) fn current_is_one_of(&self, names: &[&str]) -> bool {
        self.open_elements
            .top()
            .is_some_and(|current| current.is_html_one_of(names))
    }

    pub(crate) fn create_item(
        &mut self,
        namespace: Namespace,
        local_name: Arc<str>,
        attrs: Arc<[Attribute]>,
    ) -> StackItem<S::Handle> {
        let node = self.sink.create_element(namespace, &local_name, &attrs);
        let id = ItemId(self.next_item_id);
        self.next_item_id = self.next_item_id.wrapping_add(1);
        StackItem::new(id, namespace, local_name, attrs, node)
    }

    /// Attaches `node` where the next element or text goes: the current node,
    /// or the foster parent while table content is being redirected.
    fn attach_at_insertion_point(&mut self, node: &S::Handle) {
        let current = self.current();
        if self.redirect_attach_to_foster_parent && current.is_foster_parenting() {
            self.insert_into_foster_parent(node);
        } else {
            let parent = current.node().clone();
            self.sink.attach_node(node, &parent);
        }
    }

    /// Places `node` just before the nearest open `table`.
    pub(crate) fn insert_into_foster_parent(&mut self, node: &S::Handle) {
        let Some(table_index) = self.open_elements.find_index("table") else {
            // Fragment parsing with no table open: the root is the foster parent.
            if let Some(root) = self.open_elements.item(0) {
                let root = root.node().clone();
                self.sink.attach_node(node, &root);
            }
            return;
        };
        let Some(table) = self.open_elements.item(table_index).map(|item| item.node().clone())
        else {
            return;
        };
        if table_index == 0 {
            self.sink.attach_node(node, &table);
            return;
        }
        if let Some(stack_parent) = self
            .open_elements
            .item(table_index - 1)
            .map(|item| item.node().clone())
        {
            self.sink
                .attach_node_to_foster_parent(node, &table, &stack_parent);
        }
    }

    pub(crate) fn insert_element_with(
        &mut self,
        namespace: Namespace,
        local_name: Arc<str>,
        attrs: Arc<[Attribute]>,
        push: bool,
    ) -> StackItem<S::Handle> {
        let item = self.create_item(namespace, local_name, attrs);
        self.attach_at_insertion_point(item.node());
        if push {
            self.open_elements.push(item.clone());
        }
        item
    }

    pub(crate) fn insert_html_element(
        &mut self,
        name: &str,
        attrs: Vec<Attribute>,
    ) -> StackItem<S::Handle> {
        self.insert_element_with(Namespace::Html, Arc::from(name), Arc::from(attrs), true)
    }

    /// Inserts a void element: attached but never pushed.
    pub(crate) fn insert_self_closing_element(&mut self, name: &str, attrs: Vec<Attribute>) {
        self.acknowledge_self_closing();
        self.insert_element_with(Namespace::Html, Arc::from(name), Arc::from(attrs), false);
    }

    pub(crate) fn insert_formatting_element(&mut self, name: &str, attrs: Vec<Attribute>) {
        let item = self.insert_html_element(name, attrs);
        self.active_formatting.append(item);
    }

    pub(crate) fn insert_foreign_element(
        &mut self,
        namespace: Namespace,
        name: &str,
        attrs: Vec<Attribute>,
        self_closing: bool,
    ) {
        if self_closing {
            self.acknowledge_self_closing();
        }
        self.insert_element_with(namespace, Arc::from(name), Arc::from(attrs), !self_closing);
    }

    pub(crate) fn insert_comment(&mut self, text: &str) {
        let parent = self.current().node().clone();
        self.sink.insert_comment(text, &parent);
    }

    pub(crate) fn insert_comment_in_document(&mut self, text: &str) {
        let document = self.document.clone();
        self.sink.insert_comment(text, &document);
    }

    pub(crate) fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let current = self.current();
        if self.redirect_attach_to_foster_parent && current.is_foster_parenting() {
            let Some(table_index) = self.open_elements.find_index("table") else {
                let parent = current.node().clone();
                self.sink.insert_text(text, &parent);
                return;
            };
            let table = self.open_elements.item(table_index).map(|item| item.node().clone());
            let stack_parent = table_index
                .checked_sub(1)
                .and_then(|index| self.open_elements.item(index))
                .map(|item| item.node().clone());
            match (table, stack_parent) {
                (Some(table), Some(stack_parent)) => {
                    self.sink
                        .insert_text_to_foster_parent(text, &table, &stack_parent);
                }
                (Some(table), None) => self.sink.insert_text(text, &table),
                _ => {}
            }
        } else {
            let parent = current.node().clone();
            self.sink.insert_text(text, &parent);
        }
    }

    /// Inserts an RCDATA/RAWTEXT/script element and hands its content to the
    /// `text` mode.
    pub(crate) fn parse_text_element(
        &mut self,
        name: &str,
        attrs: Vec<Attribute>,
        state: TokenizerState,
    ) {
        self.insert_html_element(name, attrs);
        self.request_tokenizer_state(state);
        self.original_mode = self.mode;
        self.set_insertion_mode(InsertionMode::Text);
    }

    /// Pops elements whose end tag is implied, keeping `except` open.
    pub(crate) fn generate_implied_end_tags(&mut self, except: Option<&str>) {
        while let Some(current) = self.open_elements.top() {
            if !current.is_html_one_of(IMPLIED_END_TAGS)
                || except.is_some_and(|name| current.local_name() == name)
            {
                break;
            }
            self.open_elements.pop();
        }
    }

    pub(crate) fn close_p_element(&mut self) {
        self.generate_implied_end_tags(Some("p"));
        if !self.current_is("p") {
            self.error_named(ParseErrorCode::UnexpectedImpliedEndTag, "p");
        }
        self.open_elements.pop_until_popped("p");
    }

    pub(crate) fn close_p_in_button_scope(&mut self) {
        if self.open_elements.in_button_scope("p") {
            self.close_p_element();
        }
    }

    /// Reopens formatting elements that were implicitly closed since the last
    /// marker, replacing each stale list entry with its new element.
    pub(crate) fn reconstruct_active_formatting_elements(&mut self) {
        let Some(last) = self.active_formatting.last() else {
            return;
        };
        match last {
            FormattingEntry::Marker => return,
            FormattingEntry::Element(item) if self.open_elements.contains(item) => return,
            FormattingEntry::Element(_) => {}
        }

        let mut index = self.active_formatting.len() - 1;
        while index > 0 {
            let anchor = match self.active_formatting.get(index - 1) {
                Some(FormattingEntry::Element(item)) => self.open_elements.contains(item),
                _ => true,
            };
            if anchor {
                break;
            }
            index -= 1;
        }

        while index < self.active_formatting.len() {
            let Some(FormattingEntry::Element(entry)) = self.active_formatting.get(index).cloned()
            else {
                break;
            };
            let item = self.insert_element_with(
                entry.namespace(),
                entry.local_name_arc().clone(),
                entry.attributes_arc().clone(),
                true,
            );
            self.active_formatting.replace(index, item);
            index += 1;
        }
    }

    /// Re-derives the insertion mode from the stack of open elements.
    pub(crate) fn reset_insertion_mode(&mut self) {
        let mode = self.appropriate_insertion_mode();
        self.set_insertion_mode(mode);
    }

    fn appropriate_insertion_mode(&self) -> InsertionMode {
        for index in (0..self.open_elements.len()).rev() {
            let last = index == 0;
            let name = match (&self.context, self.open_elements.item(index)) {
                (Some(context), _) if last => &**context,
                (_, Some(item)) if item.namespace() == Namespace::Html => item.local_name(),
                _ => {
                    if last {
                        return InsertionMode::InBody;
                    }
                    continue;
                }
            };
            match name {
                "select" => return self.select_mode_for(index),
                "td" | "th" => return InsertionMode::InCell,
                "tr" => return InsertionMode::InRow,
                "tbody" | "thead" | "tfoot" => return InsertionMode::InTableBody,
                "caption" => return InsertionMode::InCaption,
                "colgroup" => return InsertionMode::InColumnGroup,
                "table" => return InsertionMode::InTable,
                "head" if !last => return InsertionMode::InHead,
                "body" => return InsertionMode::InBody,
                "frameset" => return InsertionMode::InFrameset,
                "html" => {
                    return if self.open_elements.head_element().is_none() {
                        InsertionMode::BeforeHead
                    } else {
                        InsertionMode::AfterHead
                    };
                }
                _ => {}
            }
            if last {
                return InsertionMode::InBody;
            }
        }
        InsertionMode::InBody
    }

    /// `in select in table` when a table encloses the select at `index`.
    fn select_mode_for(&self, index: usize) -> InsertionMode {
        for ancestor in (1..index).rev() {
            match self.open_elements.item(ancestor) {
                Some(item) if item.is_html("table") => return InsertionMode::InSelectInTable,
                _ => {}
            }
        }
        InsertionMode::InSelect
    }
}
