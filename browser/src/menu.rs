//! Root screen of the browser.

use crate::catalog::TypeFilter;
use crate::grid::GridScreen;
use crate::BrowserContext;
use switchscan_core::{Activation, Item, ItemRef, NavigableSet, ScreenProvider};

const MOVIES: usize = 0;
const SHOWS: usize = 1;
const BROWSE_ALL: usize = 2;
const EXIT: usize = 3;

#[derive(Debug, Clone)]
pub struct MainMenu {
    ctx: BrowserContext,
}

impl MainMenu {
    pub fn new(ctx: BrowserContext) -> Self {
        Self { ctx }
    }

    fn has_any(&self, filter: TypeFilter) -> bool {
        self.ctx.catalog.items().iter().any(|item| filter.matches(item))
    }
}

impl ScreenProvider for MainMenu {
    fn name(&self) -> &str {
        "menu"
    }

    /// Movies and TV Shows only appear when the catalog has some.
    fn navigable_set(&self) -> NavigableSet {
        NavigableSet::new(vec![
            Item::new("movies", TypeFilter::Movies.title())
                .with_visible(self.has_any(TypeFilter::Movies)),
            Item::new("shows", TypeFilter::Shows.title())
                .with_visible(self.has_any(TypeFilter::Shows)),
            Item::new("all", TypeFilter::All.title()),
            Item::new("exit", "Exit"),
        ])
    }

    fn activate(&mut self, target: ItemRef) -> Activation {
        match target.index {
            MOVIES => Activation::Push(Box::new(GridScreen::genres(
                self.ctx.clone(),
                TypeFilter::Movies,
            ))),
            SHOWS => Activation::Push(Box::new(GridScreen::genres(
                self.ctx.clone(),
                TypeFilter::Shows,
            ))),
            BROWSE_ALL => Activation::Push(Box::new(GridScreen::titles(
                self.ctx.clone(),
                TypeFilter::All.title(),
                self.ctx.catalog.titles(TypeFilter::All),
                "← Main Menu",
            ))),
            EXIT => Activation::Exit,
            _ => Activation::Stay,
        }
    }

    fn on_back(&mut self) -> Activation {
        Activation::Stay
    }
}
