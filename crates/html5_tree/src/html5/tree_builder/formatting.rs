//! Active formatting elements list.

use super::stack::StackItem;

/// Noah's Ark capacity: a third equivalent entry evicts the older ones.
///
/// Eviction keeps the two newest and then appends, so three equivalent
/// entries sit between markers after `append` returns.
const NOAHS_ARK_CAPACITY: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum FormattingEntry<H> {
    /// Scope boundary pushed for applet/object/marquee/td/th/caption.
    Marker,
    Element(StackItem<H>),
}

impl<H> FormattingEntry<H> {
    pub(crate) fn element(&self) -> Option<&StackItem<H>> {
        match self {
            FormattingEntry::Marker => None,
            FormattingEntry::Element(item) => Some(item),
        }
    }

    pub(crate) fn is_marker(&self) -> bool {
        matches!(self, FormattingEntry::Marker)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct ActiveFormattingList<H> {
    entries: Vec<FormattingEntry<H>>,
    max_depth: u32,
}

impl<H> Default for ActiveFormattingList<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            max_depth: 0,
        }
    }
}

impl<H: Clone> ActiveFormattingList<H> {
    pub(crate) fn push_marker(&mut self) {
        self.push_entry(FormattingEntry::Marker);
    }

    /// Appends `item` after applying the Noah's Ark clause.
    ///
    /// Candidates are entries since the last marker with the same namespace,
    /// local name and attribute count, collected newest first. When at least
    /// three survive narrowing by each attribute of `item`, everything but
    /// the two newest is removed.
    pub(crate) fn append(&mut self, item: StackItem<H>) {
        let mut candidates: Vec<usize> = Vec::new();
        for (index, entry) in self.entries.iter().enumerate().rev() {
            let Some(existing) = entry.element() else {
                break;
            };
            if existing.local_name() != item.local_name()
                || existing.namespace() != item.namespace()
                || existing.attributes().len() != item.attributes().len()
            {
                continue;
            }
            candidates.push(index);
        }

        if candidates.len() >= NOAHS_ARK_CAPACITY {
            for attr in item.attributes().iter().rev() {
                candidates.retain(|&index| {
                    self.entries[index].element().is_some_and(|existing| {
                        existing
                            .attributes()
                            .iter()
                            .any(|other| other.same_as(attr))
                    })
                });
                if candidates.len() < NOAHS_ARK_CAPACITY {
                    break;
                }
            }
        }

        if candidates.len() >= NOAHS_ARK_CAPACITY {
            // Candidate indices are descending, so removal keeps the rest valid.
            for &index in &candidates[NOAHS_ARK_CAPACITY - 1..] {
                self.entries.remove(index);
            }
        }

        self.push_entry(FormattingEntry::Element(item));
    }

    fn push_entry(&mut self, entry: FormattingEntry<H>) {
        self.entries.push(entry);
        self.max_depth = self.max_depth.max(self.entries.len() as u32);
    }

    pub(crate) fn insert(&mut self, index: usize, item: StackItem<H>) {
        let index = index.min(self.entries.len());
        self.entries.insert(index, FormattingEntry::Element(item));
        self.max_depth = self.max_depth.max(self.entries.len() as u32);
    }

    pub(crate) fn replace(&mut self, index: usize, item: StackItem<H>) {
        self.entries[index] = FormattingEntry::Element(item);
    }

    /// Identity-based removal. Absent items are ignored.
    pub(crate) fn remove(&mut self, item: &StackItem<H>) {
        if let Some(index) = self.position(item) {
            self.entries.remove(index);
        }
    }

    /// Removes entries back through and including the nearest marker.
    pub(crate) fn clear_to_last_marker(&mut self) {
        while let Some(entry) = self.entries.pop() {
            if entry.is_marker() {
                break;
            }
        }
    }
}

impl<H> ActiveFormattingList<H> {
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&FormattingEntry<H>> {
        self.entries.get(index)
    }

    pub(crate) fn last(&self) -> Option<&FormattingEntry<H>> {
        self.entries.last()
    }

    pub(crate) fn position(&self, item: &StackItem<H>) -> Option<usize> {
        self.entries.iter().rposition(|entry| {
            entry
                .element()
                .is_some_and(|existing| existing.id() == item.id())
        })
    }

    /// Topmost entry named `local_name` after the last marker.
    pub(crate) fn find(&self, local_name: &str) -> Option<&StackItem<H>> {
        for entry in self.entries.iter().rev() {
            match entry {
                FormattingEntry::Marker => return None,
                FormattingEntry::Element(item) if item.local_name() == local_name => {
                    return Some(item);
                }
                FormattingEntry::Element(_) => {}
            }
        }
        None
    }

    pub(crate) fn max_depth(&self) -> u32 {
        self.max_depth
    }

    #[cfg(test)]
    pub(crate) fn names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| match entry {
                FormattingEntry::Marker => "|".to_string(),
                FormattingEntry::Element(item) => item.local_name().to_string(),
            })
            .collect()
    }
}
