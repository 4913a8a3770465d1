//! Typed views over common TMDB payloads.
//!
//! The client passes provider JSON through untouched. These records are for
//! callers that want a checked shape via
//! [`CatalogClient::fetch_as`](crate::CatalogClient::fetch_as); unknown fields
//! are ignored.

use serde::{Deserialize, Serialize};

/// One page of a paginated listing (trending, popular, search).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paged<T> {
    pub page: u32,
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u64,
}

/// A genre from the movie or TV vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

/// Response of `/genre/movie/list` and `/genre/tv/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreList {
    pub genres: Vec<Genre>,
}

impl GenreList {
    /// Look up a genre name by id.
    pub fn name_of(&self, id: u32) -> Option<&str> {
        self.genres
            .iter()
            .find(|g| g.id == id)
            .map(|g| g.name.as_str())
    }
}

/// Minimal entry of a listing or multi search result.
///
/// Movies carry `title`, series carry `name`; people come back from multi
/// search with `media_type = "person"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSummary {
    pub id: u64,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

impl MediaSummary {
    /// Display title regardless of media type.
    pub fn display_title(&self) -> Option<&str> {
        self.title.as_deref().or(self.name.as_deref())
    }
}
