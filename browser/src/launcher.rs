//! Playback collaborator. Starting a player is the host's business; screens
//! only say what to play.

use crate::catalog::MediaItem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub title: String,
    pub url: String,
    pub trailer: bool,
}

impl LaunchRequest {
    pub fn feature(item: &MediaItem) -> Self {
        Self {
            title: item.title.clone(),
            url: item.url.clone(),
            trailer: false,
        }
    }

    /// `None` when the title has no trailer.
    pub fn trailer(item: &MediaItem) -> Option<Self> {
        item.trailer.as_ref().map(|url| Self {
            title: format!("{} - Trailer", item.title),
            url: url.clone(),
            trailer: true,
        })
    }
}

pub trait Launcher {
    fn launch(&mut self, request: LaunchRequest);
}

/// Keeps every request; for hosts that only log and for tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingLauncher {
    pub launched: Vec<LaunchRequest>,
}

impl Launcher for RecordingLauncher {
    fn launch(&mut self, request: LaunchRequest) {
        tracing::info!(title = %request.title, "launch requested");
        self.launched.push(request);
    }
}
