//! Core type definitions for the application

use std::fmt;

/// Which results are shown
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    FavouritesOnly,
}

impl Filter {
    pub fn toggle(self) -> Self {
        match self {
            Filter::All => Filter::FavouritesOnly,
            Filter::FavouritesOnly => Filter::All,
        }
    }
}

/// User-facing search status line
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Searching,
    ResultsFound(String),
    NoResults(String),
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => write!(f, "Type a search and press Enter."),
            Status::Searching => write!(f, "Searching..."),
            Status::ResultsFound(term) => write!(f, "Showing results for \"{term}\"."),
            Status::NoResults(term) => write!(f, "No results for \"{term}\". Try another search."),
            Status::Error => write!(f, "Something went wrong. Try again."),
        }
    }
}

/// One result tile, flattened for rendering
#[derive(Clone, Debug, PartialEq)]
pub struct TrackRow {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub is_favourite: bool,
    pub is_playing: bool,
    pub has_preview: bool,
}

/// Everything the view needs for one frame
#[derive(Clone, Debug, Default)]
pub struct ViewState {
    pub query: String,
    pub status: String,
    pub loading: bool,
    pub filter: Filter,
    pub favourites_count: usize,
    pub rows: Vec<TrackRow>,
    pub selected: usize,
    pub now_playing: Option<String>,
    pub error_message: Option<String>,
    pub show_help: bool,
}
