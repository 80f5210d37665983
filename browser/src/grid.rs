//! Paged nine-slot grids of genres or titles.
//!
//! A grid that fits on one page fills its slots in order and hides the rest.
//! A longer list shows seven entries per page between a "previous" slot and
//! a "next" slot, both of which wrap around. The back header sits at slot -1.

use crate::catalog::{MediaItem, TypeFilter};
use crate::modal::DetailModal;
use crate::BrowserContext;
use switchscan_core::{Activation, Item, ItemRef, NavigableSet, ScreenProvider};
use tracing::debug;

pub const GRID_SLOTS: usize = 9;
/// Entries per page once a list needs paging.
pub const ITEMS_PER_PAGE: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Previous,
    Entry(usize),
    Next,
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    len: usize,
    page: usize,
}

impl Pager {
    pub fn new(len: usize) -> Self {
        Self { len, page: 0 }
    }

    pub fn is_paged(&self) -> bool {
        self.len > ITEMS_PER_PAGE
    }

    pub fn page_count(&self) -> usize {
        self.len.div_ceil(ITEMS_PER_PAGE).max(1)
    }

    /// Zero-based current page.
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn next_page(&mut self) {
        self.page = (self.page + 1) % self.page_count();
    }

    pub fn previous_page(&mut self) {
        let count = self.page_count();
        self.page = (self.page + count - 1) % count;
    }

    pub fn slots(&self) -> [Slot; GRID_SLOTS] {
        let mut slots = [Slot::Empty; GRID_SLOTS];
        let start = self.page * ITEMS_PER_PAGE;
        let end = (start + ITEMS_PER_PAGE).min(self.len);
        let first = if self.is_paged() {
            slots[0] = Slot::Previous;
            slots[GRID_SLOTS - 1] = Slot::Next;
            1
        } else {
            0
        };
        for (offset, entry) in (start..end).enumerate() {
            slots[first + offset] = Slot::Entry(entry);
        }
        slots
    }

    pub fn previous_label(&self) -> &'static str {
        if self.page > 0 {
            "← Previous Page"
        } else {
            "← Last Page"
        }
    }

    pub fn next_label(&self) -> &'static str {
        if self.page + 1 < self.page_count() {
            "Next Page →"
        } else {
            "First Page →"
        }
    }
}

#[derive(Debug, Clone)]
enum Entries {
    Genres { filter: TypeFilter, genres: Vec<String> },
    Titles(Vec<MediaItem>),
}

impl Entries {
    fn label(&self, index: usize) -> &str {
        match self {
            Entries::Genres { genres, .. } => genres.get(index).map_or("", String::as_str),
            Entries::Titles(titles) => titles.get(index).map_or("", |t| t.title.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GridScreen {
    ctx: BrowserContext,
    title: String,
    back_label: String,
    entries: Entries,
    pager: Pager,
}

impl GridScreen {
    /// Genres of the titles passing `filter`. Choosing one opens its titles.
    pub fn genres(ctx: BrowserContext, filter: TypeFilter) -> Self {
        let genres = ctx.catalog.genres(filter);
        Self {
            ctx,
            title: filter.title().to_string(),
            back_label: "← Main Menu".to_string(),
            pager: Pager::new(genres.len()),
            entries: Entries::Genres { filter, genres },
        }
    }

    /// A list of titles. Choosing one opens its details.
    pub fn titles(
        ctx: BrowserContext,
        title: impl Into<String>,
        titles: Vec<MediaItem>,
        back_label: impl Into<String>,
    ) -> Self {
        Self {
            ctx,
            title: title.into(),
            back_label: back_label.into(),
            pager: Pager::new(titles.len()),
            entries: Entries::Titles(titles),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    fn page_announcement(&self) -> String {
        format!(
            "page {} of {}",
            self.pager.page() + 1,
            self.pager.page_count()
        )
    }

    fn open_entry(&self, index: usize) -> Activation {
        match &self.entries {
            Entries::Genres { filter, genres } => {
                let Some(genre) = genres.get(index) else {
                    return Activation::Stay;
                };
                let titles = self.ctx.catalog.titles_in_genre(*filter, genre);
                debug!(genre = %genre, titles = titles.len(), "open genre");
                Activation::Push(Box::new(GridScreen::titles(
                    self.ctx.clone(),
                    genre.clone(),
                    titles,
                    "← Genres",
                )))
            }
            Entries::Titles(titles) => match titles.get(index) {
                Some(item) => Activation::Push(Box::new(DetailModal::new(
                    self.ctx.clone(),
                    item.clone(),
                ))),
                None => Activation::Stay,
            },
        }
    }
}

impl ScreenProvider for GridScreen {
    fn name(&self) -> &str {
        "grid"
    }

    fn navigable_set(&self) -> NavigableSet {
        let items = self
            .pager
            .slots()
            .iter()
            .enumerate()
            .map(|(i, slot)| match slot {
                Slot::Previous => Item::new("previous", self.pager.previous_label()),
                Slot::Next => Item::new("next", self.pager.next_label()),
                Slot::Entry(entry) => Item::new(format!("slot{i}"), self.entries.label(*entry)),
                Slot::Empty => Item::new(format!("slot{i}"), "").hidden(),
            })
            .collect();
        NavigableSet::new(items).with_header(Item::new("back", self.back_label.as_str()))
    }

    fn activate(&mut self, target: ItemRef) -> Activation {
        match self.pager.slots().get(target.index) {
            Some(Slot::Previous) => {
                self.pager.previous_page();
                Activation::Speak(self.page_announcement())
            }
            Some(Slot::Next) => {
                self.pager.next_page();
                Activation::Speak(self.page_announcement())
            }
            Some(Slot::Entry(entry)) => self.open_entry(*entry),
            Some(Slot::Empty) | None => Activation::Stay,
        }
    }

    fn on_back(&mut self) -> Activation {
        Activation::Pop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_list_fills_slots_in_order() {
        let pager = Pager::new(3);
        assert!(!pager.is_paged());
        let slots = pager.slots();
        assert_eq!(&slots[..4], &[Slot::Entry(0), Slot::Entry(1), Slot::Entry(2), Slot::Empty]);
        assert_eq!(slots[8], Slot::Empty);
    }

    #[test]
    fn seven_entries_still_fit_one_page() {
        let pager = Pager::new(7);
        assert!(!pager.is_paged());
        assert_eq!(pager.slots()[6], Slot::Entry(6));
    }

    #[test]
    fn long_list_pages_by_seven_with_navigation_slots() {
        let mut pager = Pager::new(16);
        assert_eq!(pager.page_count(), 3);
        let slots = pager.slots();
        assert_eq!(slots[0], Slot::Previous);
        assert_eq!(slots[1], Slot::Entry(0));
        assert_eq!(slots[7], Slot::Entry(6));
        assert_eq!(slots[8], Slot::Next);
        assert_eq!(pager.previous_label(), "← Last Page");

        pager.next_page();
        pager.next_page();
        let slots = pager.slots();
        assert_eq!(slots[1], Slot::Entry(14));
        assert_eq!(slots[2], Slot::Entry(15));
        assert_eq!(slots[3], Slot::Empty);
        assert_eq!(pager.next_label(), "First Page →");

        pager.next_page();
        assert_eq!(pager.page(), 0);
        pager.previous_page();
        assert_eq!(pager.page(), 2);
    }

    #[test]
    fn empty_list_is_one_empty_page() {
        let pager = Pager::new(0);
        assert_eq!(pager.page_count(), 1);
        assert!(pager.slots().iter().all(|s| *s == Slot::Empty));
    }
}
