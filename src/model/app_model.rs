//! Main application model with state management

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;

use super::content::TrackRecord;
use super::favourites::{Favourites, FavouritesStore};
use super::playback::{AudioDevice, PlaybackController, PlaybackEvent};
use super::search_client::{SearchBackend, SearchOutcome};
use super::store::KeyValueStore;
use super::types::{Filter, Status, TrackRow, ViewState};

const ERROR_DISPLAY_SECS: u64 = 5;

/// Main application model containing all state
pub struct AppModel<B, S, D: AudioDevice> {
    search: Arc<B>,
    favourites_store: FavouritesStore<S>,
    playback: PlaybackController<D>,
    query: String,
    status: Status,
    results: Vec<TrackRecord>,
    favourites: Favourites,
    filter: Filter,
    searches_in_flight: usize,
    selected: usize,
    error_message: Option<String>,
    error_timestamp: Option<Instant>,
    help_open: bool,
    should_quit: bool,
}

impl<B, S, D> AppModel<B, S, D>
where
    B: SearchBackend,
    S: KeyValueStore,
    D: AudioDevice,
{
    /// Build the model and load persisted favourites.
    pub fn new(
        search: B,
        store: S,
        device: D,
        playback_events: UnboundedSender<PlaybackEvent>,
        initial_query: impl Into<String>,
    ) -> Self {
        let favourites_store = FavouritesStore::new(store);
        let favourites = Favourites::from_records(favourites_store.load());
        if favourites.is_empty() {
            tracing::info!("No saved favourites");
        } else {
            tracing::info!(count = favourites.len(), "Favourites loaded");
        }

        Self {
            search: Arc::new(search),
            favourites_store,
            playback: PlaybackController::new(device, playback_events),
            query: initial_query.into(),
            status: Status::Idle,
            results: Vec::new(),
            favourites,
            filter: Filter::All,
            searches_in_flight: 0,
            selected: 0,
            error_message: None,
            error_timestamp: None,
            help_open: false,
            should_quit: false,
        }
    }

    // ========================================================================
    // Query & Search
    // ========================================================================

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn append_to_query(&mut self, c: char) {
        self.query.push(c);
    }

    pub fn backspace_query(&mut self) {
        self.query.pop();
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn results(&self) -> &[TrackRecord] {
        &self.results
    }

    pub fn is_loading(&self) -> bool {
        self.searches_in_flight > 0
    }

    pub fn search_backend(&self) -> Arc<B> {
        Arc::clone(&self.search)
    }

    /// Start a search for `term`. Returns the trimmed term to send to the
    /// backend, or `None` when there is nothing to search for.
    ///
    /// Searching stops any preview that is playing.
    pub fn begin_search(&mut self, term: &str) -> Option<String> {
        let term = term.trim();
        if term.is_empty() {
            return None;
        }

        self.status = Status::Searching;
        self.searches_in_flight += 1;
        self.playback.stop();
        Some(term.to_string())
    }

    /// Apply the outcome of a search started with [`Self::begin_search`].
    ///
    /// Overlapping searches are not cancelled; whichever finishes last
    /// decides what is shown. A failure keeps the previous results.
    pub fn finish_search(&mut self, term: &str, outcome: SearchOutcome) {
        self.searches_in_flight = self.searches_in_flight.saturating_sub(1);

        match outcome {
            SearchOutcome::Success(tracks) => {
                self.results = tracks;
                self.status = Status::ResultsFound(term.to_string());
                self.selected = 0;
            }
            SearchOutcome::Empty => {
                self.results = Vec::new();
                self.status = Status::NoResults(term.to_string());
                self.selected = 0;
            }
            SearchOutcome::Failure(e) => {
                tracing::warn!(term, error = %e, "Search failed, keeping previous results");
                self.status = Status::Error;
            }
        }

        self.clamp_selection();
    }

    /// Search and apply the outcome in one step.
    #[cfg(test)]
    pub async fn run_search(&mut self, term: &str) {
        let Some(term) = self.begin_search(term) else {
            return;
        };
        let outcome = self.search.search(&term).await;
        self.finish_search(&term, outcome);
    }

    // ========================================================================
    // Favourites & Filter
    // ========================================================================

    pub fn favourites(&self) -> &Favourites {
        &self.favourites
    }

    pub fn is_favourite(&self, track: &TrackRecord) -> bool {
        self.favourites.contains(track.track_id)
    }

    /// Add or remove `track` and persist the new list.
    ///
    /// Returns whether the track is a favourite afterwards.
    pub fn toggle_favourite(&mut self, track: &TrackRecord) -> bool {
        let now_favourite = self.favourites.toggle(track);
        tracing::info!(track_id = track.track_id, now_favourite, "Favourite toggled");

        if let Err(e) = self.favourites_store.save(&self.favourites.to_records()) {
            tracing::error!(error = %e, "Failed to persist favourites");
        }

        self.clamp_selection();
        now_favourite
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.clamp_selection();
    }

    pub fn cycle_filter(&mut self) {
        self.set_filter(self.filter.toggle());
    }

    /// Results after the current filter, in results order.
    pub fn visible(&self) -> Vec<&TrackRecord> {
        match self.filter {
            Filter::All => self.results.iter().collect(),
            Filter::FavouritesOnly => self
                .results
                .iter()
                .filter(|track| self.favourites.contains(track.track_id))
                .collect(),
        }
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_track(&self) -> Option<TrackRecord> {
        self.visible().get(self.selected).map(|track| (*track).clone())
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.visible().len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    // ========================================================================
    // Playback
    // ========================================================================

    pub fn playing_url(&self) -> Option<&str> {
        self.playback.current_url()
    }

    /// Play or pause the preview at `url`. Tracks without a preview are ignored.
    pub fn toggle_preview(&mut self, url: Option<&str>) {
        let Some(url) = url.filter(|url| !url.is_empty()) else {
            tracing::debug!("No preview available");
            return;
        };

        if let Err(e) = self.playback.toggle(url) {
            tracing::error!(url, error = %e, "Preview playback failed");
            self.set_error(format!("Audio unavailable: {e}"));
        }
    }

    pub fn stop_playback(&mut self) {
        self.playback.stop();
    }

    pub fn on_playback_event(&mut self, event: PlaybackEvent) {
        match event {
            PlaybackEvent::Ended { url } => self.playback.on_ended(&url),
            PlaybackEvent::Failed { url, reason } => {
                if self.playback.on_failed(&url) {
                    tracing::warn!(url = %url, reason = %reason, "Preview could not be played");
                    self.set_error(format!("Audio unavailable: {reason}"));
                } else {
                    tracing::debug!(url = %url, "Ignoring failure for a clip that is no longer current");
                }
            }
        }
    }

    pub fn shutdown(&mut self) {
        self.playback.release();
    }

    // ========================================================================
    // Errors & Lifecycle
    // ========================================================================

    pub fn set_error(&mut self, message: String) {
        self.error_message = Some(message);
        self.error_timestamp = Some(Instant::now());
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
        self.error_timestamp = None;
    }

    pub fn has_error(&self) -> bool {
        self.error_message.is_some()
    }

    pub fn auto_clear_old_errors(&mut self) {
        if let Some(timestamp) = self.error_timestamp {
            if timestamp.elapsed().as_secs() > ERROR_DISPLAY_SECS {
                self.clear_error();
            }
        }
    }

    pub fn show_help_popup(&mut self) {
        self.help_open = true;
    }

    pub fn hide_help_popup(&mut self) {
        self.help_open = false;
    }

    pub fn is_help_popup_open(&self) -> bool {
        self.help_open
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn set_should_quit(&mut self, quit: bool) {
        self.should_quit = quit;
    }

    /// Capture what the view needs to draw one frame.
    pub fn snapshot(&self) -> ViewState {
        let rows = self
            .visible()
            .into_iter()
            .map(|track| TrackRow {
                title: track.title().to_string(),
                artist: track.artist().to_string(),
                album: track.album().to_string(),
                is_favourite: self.is_favourite(track),
                is_playing: track
                    .preview()
                    .is_some_and(|url| self.playback.is_playing(url)),
                has_preview: track.preview().is_some(),
            })
            .collect();

        let now_playing = self.playing_url().map(|url| {
            self.results()
                .iter()
                .find(|track| track.preview() == Some(url))
                .map(|track| format!("{} | {}", track.title(), track.artist()))
                .unwrap_or_else(|| url.to_string())
        });

        ViewState {
            query: self.query.clone(),
            status: self.status.to_string(),
            loading: self.is_loading(),
            filter: self.filter,
            favourites_count: self.favourites().len(),
            rows,
            selected: self.selected_index(),
            now_playing,
            error_message: self.error_message.clone(),
            show_help: self.help_open,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use crate::errors::SearchError;
    use super::*;

    /// Canned reply for [`ScriptedSearch`]
    pub enum Reply {
        Tracks(Vec<TrackRecord>),
        Fail,
    }

    /// Search backend that answers from a script and records the terms it saw
    #[derive(Default)]
    pub struct ScriptedSearch {
        replies: Mutex<VecDeque<Reply>>,
        pub terms: Mutex<Vec<String>>,
    }

    impl ScriptedSearch {
        pub fn new(replies: Vec<Reply>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                terms: Mutex::new(Vec::new()),
            }
        }
    }

    impl SearchBackend for ScriptedSearch {
        async fn search(&self, term: &str) -> SearchOutcome {
            self.terms.lock().unwrap().push(term.to_string());
            match self.replies.lock().unwrap().pop_front() {
                Some(Reply::Tracks(tracks)) if tracks.is_empty() => SearchOutcome::Empty,
                Some(Reply::Tracks(tracks)) => SearchOutcome::Success(tracks),
                Some(Reply::Fail) | None => {
                    SearchOutcome::Failure(SearchError::Http("connection refused".into()))
                }
            }
        }
    }

    pub fn track(id: i64) -> TrackRecord {
        TrackRecord {
            track_id: id,
            track_name: Some(format!("Track {id}")),
            artist_name: Some("Drake".into()),
            collection_name: Some("Scorpion".into()),
            artwork_url100: Some(format!("https://example.com/{id}.jpg")),
            preview_url: Some(format!("https://example.com/{id}.m4a")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{track, Reply, ScriptedSearch};
    use super::*;
    use crate::model::favourites::FAVOURITES_KEY;
    use crate::model::playback::testing::RecordingDevice;
    use crate::model::store::MemoryStore;
    use crate::model::FavouriteRecord;
    use tokio::sync::mpsc;

    type TestModel = AppModel<ScriptedSearch, MemoryStore, RecordingDevice>;

    fn model_with(replies: Vec<Reply>, store: MemoryStore) -> (TestModel, RecordingDevice) {
        let device = RecordingDevice::default();
        let (tx, _rx) = mpsc::unbounded_channel();
        let model = AppModel::new(ScriptedSearch::new(replies), store, device.clone(), tx, "Drake");
        (model, device)
    }

    fn model(replies: Vec<Reply>) -> TestModel {
        model_with(replies, MemoryStore::new()).0
    }

    fn ids(tracks: &[&TrackRecord]) -> Vec<i64> {
        tracks.iter().map(|t| t.track_id).collect()
    }

    #[test]
    fn starts_idle_with_initial_query() {
        let model = model(vec![]);
        assert_eq!(model.query(), "Drake");
        assert_eq!(model.status(), &Status::Idle);
        assert!(model.results().is_empty());
        assert_eq!(model.filter(), Filter::All);
    }

    #[test]
    fn set_query_is_a_pure_update() {
        let mut model = model(vec![]);
        model.set_query("Oasis");
        model.append_to_query('!');
        model.backspace_query();
        assert_eq!(model.query(), "Oasis");
        assert_eq!(model.status(), &Status::Idle);
        assert!(model.search_backend().terms.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn successful_search_replaces_results() {
        let mut model = model(vec![Reply::Tracks(vec![track(1), track(2)])]);
        model.run_search("  Drake ").await;

        assert_eq!(model.status(), &Status::ResultsFound("Drake".into()));
        assert_eq!(ids(&model.visible()), vec![1, 2]);
        assert!(!model.is_loading());
        assert_eq!(*model.search_backend().terms.lock().unwrap(), vec!["Drake".to_string()]);
    }

    #[tokio::test]
    async fn empty_search_clears_results() {
        let mut model = model(vec![Reply::Tracks(vec![track(1)]), Reply::Tracks(vec![])]);
        model.run_search("Drake").await;
        model.run_search("zzzz").await;

        assert_eq!(model.status(), &Status::NoResults("zzzz".into()));
        assert!(model.results().is_empty());
    }

    #[tokio::test]
    async fn failed_search_sets_error_and_keeps_results() {
        let mut model = model(vec![Reply::Tracks(vec![track(1)]), Reply::Fail]);
        model.run_search("Drake").await;
        model.run_search("Oasis").await;

        assert_eq!(model.status(), &Status::Error);
        assert_eq!(model.status().to_string(), "Something went wrong. Try again.");
        assert_eq!(ids(&model.visible()), vec![1]);
    }

    #[tokio::test]
    async fn blank_terms_change_nothing() {
        let mut model = model(vec![Reply::Tracks(vec![track(1)])]);
        model.set_query("Drake");

        model.run_search("").await;
        model.run_search("   ").await;

        assert_eq!(model.status(), &Status::Idle);
        assert!(model.results().is_empty());
        assert_eq!(model.query(), "Drake");
        assert!(model.search_backend().terms.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn searching_stops_playback() {
        let (mut model, device) = model_with(
            vec![Reply::Tracks(vec![track(1)]), Reply::Tracks(vec![track(2)])],
            MemoryStore::new(),
        );
        model.run_search("Drake").await;
        let url = model.results()[0].preview_url.clone();
        model.toggle_preview(url.as_deref());
        assert!(model.playing_url().is_some());

        let term = model.begin_search("Oasis").unwrap();
        assert_eq!(model.status(), &Status::Searching);
        assert!(model.is_loading());
        assert_eq!(model.playing_url(), None);
        assert_eq!(device.calls().last().map(String::as_str), Some("pause https://example.com/1.m4a"));

        let outcome = model.search_backend().search(&term).await;
        model.finish_search(&term, outcome);
        assert_eq!(model.status(), &Status::ResultsFound("Oasis".into()));
    }

    #[tokio::test]
    async fn overlapping_searches_last_to_resolve_wins() {
        let mut model = model(vec![]);
        let first = model.begin_search("first").unwrap();
        let second = model.begin_search("second").unwrap();

        model.finish_search(&second, SearchOutcome::Success(vec![track(2)]));
        assert!(model.is_loading());
        model.finish_search(&first, SearchOutcome::Success(vec![track(1)]));

        assert!(!model.is_loading());
        assert_eq!(model.status(), &Status::ResultsFound("first".into()));
        assert_eq!(ids(&model.visible()), vec![1]);
    }

    #[tokio::test]
    async fn favourites_only_keeps_results_order() {
        let mut model = model(vec![Reply::Tracks(vec![track(1), track(2), track(3)])]);
        model.run_search("Drake").await;

        model.toggle_favourite(&track(3));
        model.toggle_favourite(&track(2));
        model.set_filter(Filter::FavouritesOnly);

        assert_eq!(ids(&model.visible()), vec![2, 3]);

        model.set_filter(Filter::All);
        assert_eq!(ids(&model.visible()), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn favourites_only_with_no_favourites_is_empty() {
        let mut model = model(vec![Reply::Tracks(vec![track(1)])]);
        model.run_search("Drake").await;
        model.cycle_filter();
        assert_eq!(model.filter(), Filter::FavouritesOnly);
        assert!(model.visible().is_empty());
        assert_eq!(model.selected_track(), None);
    }

    #[test]
    fn toggle_favourite_persists_every_change() {
        let store = MemoryStore::new();
        let (mut model, _) = model_with(vec![], store.clone());

        assert!(model.toggle_favourite(&track(1)));
        assert!(model.toggle_favourite(&track(2)));
        assert!(model.is_favourite(&track(1)));

        let saved: Vec<FavouriteRecord> =
            serde_json::from_str(&store.get(FAVOURITES_KEY).unwrap()).unwrap();
        assert_eq!(saved.iter().map(|f| f.track_id).collect::<Vec<_>>(), vec![2, 1]);

        assert!(!model.toggle_favourite(&track(2)));
        assert!(!model.is_favourite(&track(2)));
        let saved: Vec<FavouriteRecord> =
            serde_json::from_str(&store.get(FAVOURITES_KEY).unwrap()).unwrap();
        assert_eq!(saved.len(), 1);
    }

    #[test]
    fn favourites_are_loaded_at_startup() {
        let mut store = MemoryStore::new();
        let records = vec![FavouriteRecord::from(&track(7)), FavouriteRecord::from(&track(8))];
        store.set(FAVOURITES_KEY, serde_json::to_string(&records).unwrap()).unwrap();

        let (model, _) = model_with(vec![], store);
        assert_eq!(model.favourites().len(), 2);
        assert!(model.is_favourite(&track(7)));
    }

    #[test]
    fn corrupt_persisted_favourites_start_empty() {
        let mut store = MemoryStore::new();
        store.set(FAVOURITES_KEY, "][".to_string()).unwrap();

        let (model, _) = model_with(vec![], store);
        assert!(model.favourites().is_empty());
    }

    #[tokio::test]
    async fn selection_moves_within_visible_list() {
        let mut model = model(vec![Reply::Tracks(vec![track(1), track(2)])]);
        model.run_search("Drake").await;

        model.select_previous();
        assert_eq!(model.selected_index(), 0);
        model.select_next();
        model.select_next();
        assert_eq!(model.selected_track().map(|t| t.track_id), Some(2));

        model.toggle_favourite(&track(1));
        model.set_filter(Filter::FavouritesOnly);
        assert_eq!(model.selected_track().map(|t| t.track_id), Some(1));
    }

    #[tokio::test]
    async fn preview_toggle_and_natural_end() {
        let mut model = model(vec![Reply::Tracks(vec![track(1), track(2)])]);
        model.run_search("Drake").await;

        model.toggle_preview(Some("https://example.com/1.m4a"));
        let view = model.snapshot();
        assert!(view.rows[0].is_playing);
        assert!(!view.rows[1].is_playing);
        assert_eq!(view.now_playing.as_deref(), Some("Track 1 | Drake"));

        model.on_playback_event(PlaybackEvent::Ended {
            url: "https://example.com/1.m4a".into(),
        });
        assert_eq!(model.playing_url(), None);
        assert_eq!(model.snapshot().now_playing, None);
    }

    #[tokio::test]
    async fn failed_clip_falls_back_to_not_playing() {
        let mut model = model(vec![Reply::Tracks(vec![track(1), track(2)])]);
        model.run_search("Drake").await;

        model.toggle_preview(Some("https://example.com/1.m4a"));
        model.on_playback_event(PlaybackEvent::Failed {
            url: "https://example.com/1.m4a".into(),
            reason: "decode failed".into(),
        });

        let view = model.snapshot();
        assert_eq!(model.playing_url(), None);
        assert!(!view.rows[0].is_playing);
        assert_eq!(view.now_playing, None);
        assert_eq!(view.error_message.as_deref(), Some("Audio unavailable: decode failed"));
    }

    #[tokio::test]
    async fn failure_for_previous_clip_is_ignored() {
        let mut model = model(vec![Reply::Tracks(vec![track(1), track(2)])]);
        model.run_search("Drake").await;

        model.toggle_preview(Some("https://example.com/1.m4a"));
        model.toggle_preview(Some("https://example.com/2.m4a"));
        model.on_playback_event(PlaybackEvent::Failed {
            url: "https://example.com/1.m4a".into(),
            reason: "download failed".into(),
        });

        assert_eq!(model.playing_url(), Some("https://example.com/2.m4a"));
        assert!(!model.has_error());
    }

    #[test]
    fn missing_preview_is_ignored() {
        let (mut model, device) = model_with(vec![], MemoryStore::new());
        model.toggle_preview(None);
        model.toggle_preview(Some(""));
        assert_eq!(model.playing_url(), None);
        assert!(device.calls().is_empty());
    }

    #[test]
    fn audio_failure_surfaces_error_message() {
        let device = RecordingDevice {
            fail: true,
            ..RecordingDevice::default()
        };
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut model = AppModel::new(ScriptedSearch::default(), MemoryStore::new(), device, tx, "");

        model.toggle_preview(Some("https://example.com/1.m4a"));
        assert!(model.has_error());
        assert_eq!(model.playing_url(), None);

        model.clear_error();
        assert!(!model.has_error());
    }

    #[tokio::test]
    async fn snapshot_reflects_state() {
        let mut no_preview = track(2);
        no_preview.preview_url = None;
        let mut model = model(vec![Reply::Tracks(vec![track(1), no_preview])]);
        model.run_search("Drake").await;
        model.toggle_favourite(&track(1));

        let view = model.snapshot();
        assert_eq!(view.query, "Drake");
        assert_eq!(view.status, "Showing results for \"Drake\".");
        assert_eq!(view.favourites_count, 1);
        assert_eq!(view.rows.len(), 2);
        assert!(view.rows[0].is_favourite);
        assert!(view.rows[0].has_preview);
        assert!(!view.rows[1].has_preview);
        assert!(!view.loading);
    }
}
