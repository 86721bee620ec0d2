//! Favourite tracks: the in-memory set and its persisted copy

use std::collections::{HashMap, VecDeque};

use crate::errors::StoreError;
use super::content::{FavouriteRecord, TrackId, TrackRecord};
use super::store::KeyValueStore;

pub const FAVOURITES_KEY: &str = "music-finder-favs-v1";

/// Favourite tracks keyed by track id, newest first
#[derive(Clone, Debug, Default)]
pub struct Favourites {
    order: VecDeque<TrackId>,
    records: HashMap<TrackId, FavouriteRecord>,
}

impl Favourites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a persisted list; later duplicates of an id are dropped.
    pub fn from_records(records: Vec<FavouriteRecord>) -> Self {
        let mut favourites = Self::new();
        for record in records {
            if favourites.records.contains_key(&record.track_id) {
                continue;
            }
            favourites.order.push_back(record.track_id);
            favourites.records.insert(record.track_id, record);
        }
        favourites
    }

    pub fn contains(&self, track_id: TrackId) -> bool {
        self.records.contains_key(&track_id)
    }

    /// Remove the track if present, otherwise add it at the front.
    ///
    /// Returns whether the track is a favourite afterwards.
    pub fn toggle(&mut self, track: &TrackRecord) -> bool {
        let id = track.track_id;
        if self.records.remove(&id).is_some() {
            self.order.retain(|existing| *existing != id);
            false
        } else {
            self.order.push_front(id);
            self.records.insert(id, FavouriteRecord::from(track));
            true
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FavouriteRecord> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    pub fn to_records(&self) -> Vec<FavouriteRecord> {
        self.iter().cloned().collect()
    }
}

/// Persists the favourite list under a single fixed key
pub struct FavouritesStore<S> {
    store: S,
}

impl<S: KeyValueStore> FavouritesStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read the persisted list. Missing or unreadable data yields an empty list.
    pub fn load(&self) -> Vec<FavouriteRecord> {
        let Some(raw) = self.store.get(FAVOURITES_KEY) else {
            return Vec::new();
        };

        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "Persisted favourites are corrupt, ignoring");
                Vec::new()
            }
        }
    }

    /// Overwrite the persisted list.
    pub fn save(&mut self, favourites: &[FavouriteRecord]) -> Result<(), StoreError> {
        let content = serde_json::to_string(favourites)?;
        self.store.set(FAVOURITES_KEY, content)?;
        tracing::debug!(count = favourites.len(), "Favourites saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::store::MemoryStore;

    fn track(id: TrackId) -> TrackRecord {
        TrackRecord {
            track_id: id,
            track_name: Some(format!("Track {id}")),
            artist_name: Some("Artist".into()),
            collection_name: Some("Album".into()),
            artwork_url100: None,
            preview_url: Some(format!("https://example.com/{id}.m4a")),
        }
    }

    #[test]
    fn toggle_adds_at_front_and_removes() {
        let mut favourites = Favourites::new();
        assert!(favourites.toggle(&track(1)));
        assert!(favourites.toggle(&track(2)));

        let ids: Vec<_> = favourites.iter().map(|f| f.track_id).collect();
        assert_eq!(ids, vec![2, 1]);

        assert!(!favourites.toggle(&track(2)));
        assert!(!favourites.contains(2));
        assert!(favourites.contains(1));
        assert_eq!(favourites.len(), 1);
    }

    #[test]
    fn re_adding_moves_track_to_front_once() {
        let mut favourites = Favourites::new();
        favourites.toggle(&track(1));
        favourites.toggle(&track(2));
        favourites.toggle(&track(1));
        favourites.toggle(&track(1));

        let ids: Vec<_> = favourites.iter().map(|f| f.track_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn duplicate_ids_in_persisted_list_collapse() {
        let records = vec![
            FavouriteRecord::from(&track(5)),
            FavouriteRecord::from(&track(4)),
            FavouriteRecord::from(&track(5)),
        ];
        let favourites = Favourites::from_records(records);
        let ids: Vec<_> = favourites.iter().map(|f| f.track_id).collect();
        assert_eq!(ids, vec![5, 4]);
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut favourites = Favourites::new();
        favourites.toggle(&track(1));
        favourites.toggle(&track(2));
        let mut no_preview = track(3);
        no_preview.preview_url = None;
        favourites.toggle(&no_preview);

        let mut store = FavouritesStore::new(MemoryStore::new());
        store.save(&favourites.to_records()).unwrap();

        assert_eq!(store.load(), favourites.to_records());
    }

    #[test]
    fn missing_key_loads_empty() {
        let store = FavouritesStore::new(MemoryStore::new());
        assert!(store.load().is_empty());
    }

    #[test]
    fn corrupt_values_load_empty() {
        for corrupt in ["", "not json", "{\"trackId\": 1}", "[{\"trackName\": \"no id\"}]", "null"] {
            let mut backing = MemoryStore::new();
            backing.set(FAVOURITES_KEY, corrupt.to_string()).unwrap();
            let store = FavouritesStore::new(backing);
            assert!(store.load().is_empty(), "value {corrupt:?} should load empty");
        }
    }

    #[test]
    fn persisted_value_is_a_json_array_under_the_fixed_key() {
        let backing = MemoryStore::new();
        let mut store = FavouritesStore::new(backing.clone());
        store.save(&[FavouriteRecord::from(&track(9))]).unwrap();

        let raw = backing.get(FAVOURITES_KEY).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["trackId"], 9);
        assert_eq!(value.as_array().map(Vec::len), Some(1));
    }
}
