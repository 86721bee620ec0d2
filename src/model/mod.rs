//! Model module - Application state and data types
//!
//! This module contains all the data structures and state management for the application.
//! It is organized into submodules by responsibility:
//!
//! - `types`: Core type definitions (filter, status, view snapshot)
//! - `content`: Catalog track records and the favourite projection
//! - `store`: String key-value stores backing persisted state
//! - `favourites`: Favourite set and its persisted copy
//! - `search_client`: Catalog search API client
//! - `playback`: Preview playback controller
//! - `app_model`: Main application model with state management methods

mod types;
mod content;
mod store;
mod favourites;
mod search_client;
mod playback;
mod app_model;

// Re-export the types the controller, view and audio layers use
pub use types::{Filter, TrackRow, ViewState};

pub use store::{JsonFileStore, KeyValueStore};

pub use search_client::{CatalogClient, SearchBackend};

pub use playback::{AudioDevice, AudioResource, PlaybackEvent};

pub use app_model::AppModel;

#[cfg(test)]
pub(crate) use types::Status;
#[cfg(test)]
pub(crate) use content::FavouriteRecord;
#[cfg(test)]
pub(crate) use store::MemoryStore;
#[cfg(test)]
pub(crate) use app_model::testing as model_testing;
#[cfg(test)]
pub(crate) use playback::testing as playback_testing;
