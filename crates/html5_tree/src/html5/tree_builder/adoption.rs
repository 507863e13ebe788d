//! Adoption agency algorithm for misnested formatting end tags.

use super::stack::StackItem;
use super::{Html5TreeBuilder, TreeSink};
use crate::html5::shared::{Namespace, ParseErrorCode};

const OUTER_LOOP_LIMIT: usize = 8;
const INNER_LOOP_LIMIT: usize = 3;

impl<S: TreeSink> Html5TreeBuilder<S> {
    /// Runs the adoption agency for end tag `name`.
    ///
    /// Returns `false` only when no usable formatting element exists, in which
    /// case the caller falls back to the generic end-tag handling.
    pub(crate) fn adoption_agency_end_tag(&mut self, name: &str) -> bool {
        self.counters.adoption_agency_runs = self.counters.adoption_agency_runs.saturating_add(1);

        for _ in 0..OUTER_LOOP_LIMIT {
            let Some(formatting) = self.active_formatting.find(name).cloned() else {
                self.error_named(ParseErrorCode::AdoptionAgency1_1, name);
                return false;
            };
            let on_stack = self.open_elements.contains(&formatting);
            if on_stack && !self.open_elements.element_in_scope(&formatting) {
                self.error_named(ParseErrorCode::AdoptionAgency4_4, name);
                return false;
            }
            if !on_stack {
                self.error_named(ParseErrorCode::AdoptionAgency1_2, name);
                self.active_formatting.remove(&formatting);
                return true;
            }
            if *self.current() != formatting {
                self.error_named(ParseErrorCode::AdoptionAgency1_3, name);
            }

            let Some(furthest_block) = self
                .open_elements
                .furthest_block_for_formatting_element(&formatting)
            else {
                self.open_elements
                    .remove_open_elements_until(|popped| *popped == formatting);
                self.active_formatting.remove(&formatting);
                return true;
            };

            let Some(formatting_index) = self.open_elements.index_of(&formatting) else {
                return true;
            };
            let Some(common_ancestor) = formatting_index
                .checked_sub(1)
                .and_then(|index| self.open_elements.item(index))
                .cloned()
            else {
                return true;
            };
            let mut bookmark = self
                .active_formatting
                .position(&formatting)
                .unwrap_or(self.active_formatting.len());

            let mut last_node = furthest_block.clone();
            let Some(mut index) = self.open_elements.index_of(&furthest_block) else {
                return true;
            };
            for _ in 0..INNER_LOOP_LIMIT {
                let Some(below) = index.checked_sub(1) else {
                    break;
                };
                index = below;
                let Some(node) = self.open_elements.item(index).cloned() else {
                    break;
                };
                let Some(list_index) = self.active_formatting.position(&node) else {
                    // Not a formatting element: drop it from the stack and
                    // keep walking.
                    self.open_elements.remove_at(index);
                    continue;
                };
                if node == formatting {
                    break;
                }
                if last_node == furthest_block {
                    bookmark = list_index + 1;
                }
                let clone = self.create_item(
                    node.namespace(),
                    node.local_name_arc().clone(),
                    node.attributes_arc().clone(),
                );
                self.active_formatting.replace(list_index, clone.clone());
                self.open_elements.replace_at(index, clone.clone());
                self.sink.detach_from_parent(last_node.node());
                self.sink.attach_node(last_node.node(), clone.node());
                last_node = clone;
            }

            self.sink.detach_from_parent(last_node.node());
            if common_ancestor.is_foster_parenting() {
                self.insert_into_foster_parent(last_node.node());
            } else {
                self.sink
                    .attach_node(last_node.node(), common_ancestor.node());
            }

            let formatting_clone = self.create_item(
                Namespace::Html,
                formatting.local_name_arc().clone(),
                formatting.attributes_arc().clone(),
            );
            self.sink
                .reparent_children(furthest_block.node(), formatting_clone.node());
            self.sink
                .attach_node(formatting_clone.node(), furthest_block.node());

            self.active_formatting.remove(&formatting);
            let bookmark = bookmark.min(self.active_formatting.len());
            self.active_formatting
                .insert(bookmark, formatting_clone.clone());
            self.open_elements.remove(&formatting);
            let after_block = self
                .open_elements
                .index_of(&furthest_block)
                .map_or(self.open_elements.len(), |index| index + 1);
            self.open_elements.insert_at(after_block, formatting_clone);
        }
        true
    }

    /// Drops a formatting element from both the list and the stack, if still
    /// present. Used after `<a>` inside `<a>`.
    pub(crate) fn forget_formatting_element(&mut self, item: &StackItem<S::Handle>) {
        self.active_formatting.remove(item);
        if self.open_elements.contains(item) {
            self.open_elements.remove(item);
        }
    }
}
