//! Items and the ordered sets screens hand to the scan engine.
//!
//! A `NavigableSet` is built by a screen, given to a `ScanEngine`, and
//! replaced wholesale whenever the screen's visible content changes. The
//! engine only reads it.

/// One scannable item. An item with children is a row of a composite widget
/// (for example a keyboard row); scanning into it switches to item mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub label: String,
    pub visible: bool,
    pub children: Vec<Item>,
}

impl Item {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            visible: true,
            children: Vec::new(),
        }
    }

    /// A row whose children are scanned individually after it is selected.
    pub fn row(id: impl Into<String>, label: impl Into<String>, children: Vec<Item>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            visible: true,
            children,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Leaf items are activated directly by Select.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn first_visible_child(&self) -> Option<usize> {
        self.children.iter().position(|c| c.visible)
    }
}

/// Where `ScanBackward` lands when nothing is highlighted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackwardEntry {
    /// The last item (index N-1).
    #[default]
    LastItem,
    /// The header slot, if the set has one.
    Header,
}

/// Identifies what Select landed on, passed back to the owning screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemRef {
    /// Index into `NavigableSet::items`.
    pub index: usize,
    /// Child index when a composite row was scanned in item mode.
    pub child: Option<usize>,
}

impl ItemRef {
    pub fn item(index: usize) -> Self {
        Self { index, child: None }
    }

    pub fn child(index: usize, child: usize) -> Self {
        Self {
            index,
            child: Some(child),
        }
    }
}

/// Ordered, scannable content of one screen. Insertion order is scan order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavigableSet {
    header: Option<Item>,
    items: Vec<Item>,
    jump_target: Option<usize>,
    backward_entry: BackwardEntry,
}

impl NavigableSet {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            header: None,
            items,
            jump_target: None,
            backward_entry: BackwardEntry::LastItem,
        }
    }

    /// Add the synthetic header/back slot at logical index -1.
    pub fn with_header(mut self, header: Item) -> Self {
        self.header = Some(header);
        self
    }

    /// Designate the row long-press Select jumps to (e.g. predictions).
    pub fn with_jump_target(mut self, index: usize) -> Self {
        if index < self.items.len() {
            self.jump_target = Some(index);
        }
        self
    }

    pub fn with_backward_entry(mut self, entry: BackwardEntry) -> Self {
        self.backward_entry = entry;
        self
    }

    pub fn header(&self) -> Option<&Item> {
        self.header.as_ref()
    }

    pub fn has_header(&self) -> bool {
        self.header.is_some()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// A set with no items and no header has nothing to scan.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.header.is_none()
    }

    pub fn jump_target(&self) -> Option<usize> {
        self.jump_target
    }

    pub fn backward_entry(&self) -> BackwardEntry {
        self.backward_entry
    }

    /// Whether logical slot `index` can be highlighted. The header is always
    /// visible when present.
    pub fn is_slot_visible(&self, index: isize) -> bool {
        if index < 0 {
            return self.header.is_some();
        }
        self.items
            .get(index as usize)
            .is_some_and(|item| item.visible)
    }

    /// Label spoken for a logical slot.
    pub fn slot_label(&self, index: isize) -> Option<&str> {
        if index < 0 {
            return self.header.as_ref().map(|h| h.label.as_str());
        }
        self.items.get(index as usize).map(|i| i.label.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_counts_as_content() {
        let set = NavigableSet::new(vec![]).with_header(Item::new("back", "Back"));
        assert!(!set.is_empty());
        assert!(set.is_slot_visible(-1));
        assert_eq!(set.slot_label(-1), Some("Back"));
    }

    #[test]
    fn jump_target_out_of_range_is_ignored() {
        let set = NavigableSet::new(vec![Item::new("a", "A")]).with_jump_target(3);
        assert_eq!(set.jump_target(), None);
    }

    #[test]
    fn hidden_items_are_not_visible() {
        let set = NavigableSet::new(vec![Item::new("a", "A").hidden()]);
        assert!(!set.is_slot_visible(0));
        assert!(!set.is_slot_visible(1));
        assert!(!set.is_slot_visible(-1));
    }
}
