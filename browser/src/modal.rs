//! Detail modal for one title.

use crate::catalog::MediaItem;
use crate::launcher::LaunchRequest;
use crate::BrowserContext;
use switchscan_core::{Activation, Item, ItemRef, NavigableSet, ScreenKind, ScreenProvider};

const PLAY: usize = 0;
const READ_INFO: usize = 1;
const TRAILER: usize = 2;
const CLOSE: usize = 3;

/// Play, read the description, watch the trailer or close. Has no header;
/// Back closes it.
#[derive(Debug, Clone)]
pub struct DetailModal {
    ctx: BrowserContext,
    item: MediaItem,
}

impl DetailModal {
    pub fn new(ctx: BrowserContext, item: MediaItem) -> Self {
        Self { ctx, item }
    }

    pub fn item(&self) -> &MediaItem {
        &self.item
    }

    fn launch(&self, request: LaunchRequest) {
        self.ctx.launcher.borrow_mut().launch(request);
    }
}

impl ScreenProvider for DetailModal {
    fn name(&self) -> &str {
        "details"
    }

    fn navigable_set(&self) -> NavigableSet {
        NavigableSet::new(vec![
            Item::new("play", "▶ Play"),
            Item::new("info", "Read Info"),
            Item::new("trailer", "View Trailer").with_visible(self.item.trailer.is_some()),
            Item::new("close", "✕ Close"),
        ])
    }

    fn activate(&mut self, target: ItemRef) -> Activation {
        match target.index {
            PLAY => {
                self.launch(LaunchRequest::feature(&self.item));
                Activation::Pop
            }
            READ_INFO => Activation::Speak(self.item.info_text()),
            TRAILER => match LaunchRequest::trailer(&self.item) {
                Some(request) => {
                    self.launch(request);
                    Activation::Stay
                }
                None => Activation::Stay,
            },
            CLOSE => Activation::Pop,
            _ => Activation::Stay,
        }
    }

    fn on_back(&mut self) -> Activation {
        Activation::Pop
    }

    fn kind(&self) -> ScreenKind {
        ScreenKind::Modal
    }
}
