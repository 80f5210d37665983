//! The media catalog: titles with a type, genres and where to play them.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Genre for titles that list none.
pub const OTHER_GENRE: &str = "Other";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("catalog I/O: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MediaItem {
    pub title: String,
    /// Free-form type as the catalog source writes it ("movie", "TV series", ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Comma separated genres.
    pub genre: String,
    pub year: Option<u32>,
    pub description: Option<String>,
    pub url: String,
    pub trailer: Option<String>,
}

impl MediaItem {
    pub fn new(title: impl Into<String>, kind: impl Into<String>, genre: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: kind.into(),
            genre: genre.into(),
            ..Default::default()
        }
    }

    pub fn is_movie(&self) -> bool {
        self.kind.to_lowercase().contains("movie")
    }

    pub fn is_show(&self) -> bool {
        let kind = self.kind.to_lowercase();
        kind.contains("series") || kind.contains("show") || kind.contains("tv")
    }

    pub fn is_music(&self) -> bool {
        self.kind.eq_ignore_ascii_case("music")
    }

    /// Individual genres, trimmed. Titles without any count as "Other".
    pub fn genres(&self) -> Vec<&str> {
        let genres: Vec<&str> = self
            .genre
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .collect();
        if genres.is_empty() {
            vec![OTHER_GENRE]
        } else {
            genres
        }
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres().iter().any(|g| *g == genre)
    }

    /// What "Read Info" says.
    pub fn info_text(&self) -> String {
        let mut parts = vec![self.title.clone()];
        if let Some(year) = self.year {
            parts.push(year.to_string());
        }
        if let Some(desc) = self.description.as_deref().filter(|d| !d.trim().is_empty()) {
            parts.push(desc.trim().to_string());
        }
        parts.join(". ")
    }
}

/// Which titles a browse view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFilter {
    Movies,
    Shows,
    /// Everything except music.
    All,
}

impl TypeFilter {
    pub fn matches(self, item: &MediaItem) -> bool {
        match self {
            TypeFilter::Movies => item.is_movie(),
            TypeFilter::Shows => item.is_show(),
            TypeFilter::All => !item.is_music(),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            TypeFilter::Movies => "Movies",
            TypeFilter::Shows => "TV Shows",
            TypeFilter::All => "Browse All",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    items: Vec<MediaItem>,
}

impl Catalog {
    pub fn new(items: Vec<MediaItem>) -> Self {
        Self { items }
    }

    pub fn from_json_str(s: &str) -> Result<Self, CatalogError> {
        Ok(Self::new(serde_json::from_str(s)?))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let catalog = Self::from_json_str(&content)?;
        info!(titles = catalog.len(), path = %path.as_ref().display(), "catalog loaded");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    /// Titles passing `filter`, sorted by title.
    pub fn titles(&self, filter: TypeFilter) -> Vec<MediaItem> {
        let mut titles: Vec<MediaItem> = self
            .items
            .iter()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect();
        titles.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
        titles
    }

    /// Titles passing `filter` that list `genre`, sorted by title.
    pub fn titles_in_genre(&self, filter: TypeFilter, genre: &str) -> Vec<MediaItem> {
        let mut titles = self.titles(filter);
        titles.retain(|item| item.has_genre(genre));
        titles
    }

    /// Distinct genres of the titles passing `filter`, sorted, with "Other"
    /// moved to the end.
    pub fn genres(&self, filter: TypeFilter) -> Vec<String> {
        let mut genres: Vec<String> = self
            .items
            .iter()
            .filter(|item| filter.matches(item))
            .flat_map(|item| item.genres())
            .map(str::to_string)
            .collect();
        genres.sort();
        genres.dedup();
        if let Some(pos) = genres.iter().position(|g| g == OTHER_GENRE) {
            let other = genres.remove(pos);
            genres.push(other);
        }
        genres
    }
}
