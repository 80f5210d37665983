//! # switchscan-browser
//!
//! Media browser screens for two-switch scanning: a main menu, paged
//! nine-slot grids of genres and titles with a back header, and a detail
//! modal that pauses auto-scan while it is open.

pub mod catalog;
pub mod grid;
pub mod launcher;
pub mod menu;
pub mod modal;

pub use catalog::{Catalog, CatalogError, MediaItem, TypeFilter};
pub use grid::{GridScreen, Pager, Slot, GRID_SLOTS, ITEMS_PER_PAGE};
pub use launcher::{LaunchRequest, Launcher, RecordingLauncher};
pub use menu::MainMenu;
pub use modal::DetailModal;

use std::cell::RefCell;
use std::rc::Rc;

/// What every browser screen shares: the catalog and the launcher.
#[derive(Clone)]
pub struct BrowserContext {
    pub catalog: Rc<Catalog>,
    pub launcher: Rc<RefCell<dyn Launcher>>,
}

impl BrowserContext {
    pub fn new(catalog: Catalog, launcher: Rc<RefCell<dyn Launcher>>) -> Self {
        Self {
            catalog: Rc::new(catalog),
            launcher,
        }
    }
}

impl std::fmt::Debug for BrowserContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserContext")
            .field("titles", &self.catalog.len())
            .finish()
    }
}
