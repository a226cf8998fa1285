//! Song catalog
//!
//! Holds the loaded song list and the current-song cursor, renders song
//! cards, forwards votes/plays to the API and backfills missing cover art.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use calico_common::Song;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinSet;

use crate::api::SongApi;

/// How long the vote acknowledgment stays on
pub const VOTE_FLASH_DURATION: Duration = Duration::from_millis(300);

pub const EMPTY_MESSAGE: &str = "No songs available";
pub const NO_DESCRIPTION: &str = "No description available";

/// Rendered song list
pub trait CatalogView: Send + Sync {
    fn render_songs(&self, cards: &[SongCard]);

    fn show_error(&self, message: &str);

    fn show_empty(&self, message: &str);

    fn update_image(&self, song_id: i64, image_url: &str);

    fn update_votes(&self, song_id: i64, votes: i64);

    fn update_play_count(&self, song_id: i64, label: &str);

    /// Transient "voted" acknowledgment on the vote button
    fn set_vote_flash(&self, song_id: i64, on: bool);

    fn set_description_expanded(&self, song_id: i64, expanded: bool);

    /// Mark the now-playing card, clearing any previous mark
    fn highlight(&self, song_id: i64);
}

/// View model for one song card
#[derive(Debug, Clone, PartialEq)]
pub struct SongCard {
    pub id: i64,
    /// Position in the catalog, used by the play button
    pub index: usize,
    pub title: String,
    pub artist: String,
    pub description: String,
    pub genre: Option<String>,
    pub duration: Option<String>,
    pub votes: i64,
    pub play_count_label: String,
    pub image_url: String,
    /// Play button shown only when the song has an audio file
    pub playable: bool,
    pub spotify_url: Option<String>,
    pub youtube_url: Option<String>,
}

impl SongCard {
    pub fn new(index: usize, song: &Song) -> Self {
        Self {
            id: song.id,
            index,
            title: song.title.clone(),
            artist: song.artist.clone(),
            description: song
                .description
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            genre: song.genre.clone(),
            duration: song.duration.clone(),
            votes: song.votes,
            play_count_label: play_count_label(song.play_count),
            image_url: song.display_image().to_string(),
            playable: song.is_playable(),
            spotify_url: song.spotify_url.clone(),
            youtube_url: song.youtube_url.clone(),
        }
    }
}

/// "1 play" / "N plays"
pub fn play_count_label(count: i64) -> String {
    if count == 1 {
        "1 play".to_string()
    } else {
        format!("{} plays", count)
    }
}

#[derive(Debug, Default)]
struct CatalogState {
    songs: Vec<Song>,
    current: usize,
    expanded: HashSet<i64>,
}

impl CatalogState {
    fn find_mut(&mut self, song_id: i64) -> Option<&mut Song> {
        self.songs.iter_mut().find(|s| s.id == song_id)
    }
}

pub struct Catalog {
    api: Arc<dyn SongApi>,
    view: Arc<dyn CatalogView>,
    state: Arc<RwLock<CatalogState>>,
    backfill: Mutex<JoinSet<()>>,
}

impl Catalog {
    pub fn new(api: Arc<dyn SongApi>, view: Arc<dyn CatalogView>) -> Self {
        Self {
            api,
            view,
            state: Arc::new(RwLock::new(CatalogState::default())),
            backfill: Mutex::new(JoinSet::new()),
        }
    }

    /// Fetch the song list
    ///
    /// Load failures and empty lists are reported through the view and
    /// return an empty list. Songs lacking real cover art get a background
    /// lookup each.
    pub async fn load(&self) -> Vec<Song> {
        let songs = match self.api.list_songs().await {
            Ok(songs) => songs,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load songs");
                self.view.show_error(&format!("Failed to load songs: {}", e));
                return Vec::new();
            }
        };

        {
            let mut state = self.state.write().await;
            state.songs = songs.clone();
            state.current = 0;
            state.expanded.clear();
        }

        if songs.is_empty() {
            self.view.show_empty(EMPTY_MESSAGE);
            return songs;
        }

        tracing::info!(count = songs.len(), "Songs loaded");

        let mut backfill = self.backfill.lock().await;
        // Reap lookups finished since the previous load
        while backfill.try_join_next().is_some() {}
        for song in songs.iter().filter(|s| s.needs_cover_art()) {
            backfill.spawn(backfill_cover(
                Arc::clone(&self.api),
                Arc::clone(&self.view),
                Arc::clone(&self.state),
                song.id,
            ));
        }

        songs
    }

    /// Wait for every outstanding cover lookup
    pub async fn wait_for_backfill(&self) {
        let mut backfill = self.backfill.lock().await;
        while let Some(result) = backfill.join_next().await {
            if let Err(e) = result {
                tracing::warn!(error = %e, "Cover backfill task failed");
            }
        }
    }

    pub async fn render(&self) {
        let state = self.state.read().await;
        let cards: Vec<SongCard> = state
            .songs
            .iter()
            .enumerate()
            .map(|(index, song)| SongCard::new(index, song))
            .collect();
        self.view.render_songs(&cards);
    }

    /// Move the cursor to `index` and return that song
    pub async fn select(&self, index: usize) -> Option<Song> {
        let mut state = self.state.write().await;
        let song = state.songs.get(index).cloned()?;
        state.current = index;
        Some(song)
    }

    pub async fn toggle_description(&self, song_id: i64) -> bool {
        let mut state = self.state.write().await;
        let expanded = if state.expanded.remove(&song_id) {
            false
        } else {
            state.expanded.insert(song_id);
            true
        };
        self.view.set_description_expanded(song_id, expanded);
        expanded
    }

    /// Vote for a song; the card counter is patched on success
    pub async fn vote(&self, song_id: i64) {
        let updated = match self.api.vote(song_id).await {
            Ok(song) => song,
            Err(e) => {
                tracing::warn!(song_id, error = %e, "Vote failed");
                return;
            }
        };

        if let Some(song) = self.state.write().await.find_mut(song_id) {
            song.votes = updated.votes;
        }
        self.view.update_votes(song_id, updated.votes);
        self.view.set_vote_flash(song_id, true);

        let view = Arc::clone(&self.view);
        tokio::spawn(async move {
            tokio::time::sleep(VOTE_FLASH_DURATION).await;
            view.set_vote_flash(song_id, false);
        });
    }

    pub async fn register_play(&self, song_id: i64) {
        let updated = match self.api.register_play(song_id).await {
            Ok(song) => song,
            Err(e) => {
                tracing::warn!(song_id, error = %e, "Play registration failed");
                return;
            }
        };

        if let Some(song) = self.state.write().await.find_mut(song_id) {
            song.play_count = updated.play_count;
        }
        self.view
            .update_play_count(song_id, &play_count_label(updated.play_count));
    }

    pub fn highlight(&self, song_id: i64) {
        self.view.highlight(song_id);
    }

    pub async fn current(&self) -> Option<Song> {
        let state = self.state.read().await;
        state.songs.get(state.current).cloned()
    }

    /// Advance the cursor, wrapping after the last song
    pub async fn get_next(&self) -> Option<Song> {
        let mut state = self.state.write().await;
        let len = state.songs.len();
        if len == 0 {
            return None;
        }
        state.current = (state.current + 1) % len;
        state.songs.get(state.current).cloned()
    }

    /// Step the cursor back, wrapping before the first song
    pub async fn get_previous(&self) -> Option<Song> {
        let mut state = self.state.write().await;
        let len = state.songs.len();
        if len == 0 {
            return None;
        }
        state.current = (state.current + len - 1) % len;
        state.songs.get(state.current).cloned()
    }

    pub async fn current_index(&self) -> usize {
        self.state.read().await.current
    }

    /// Snapshot of the loaded songs
    pub async fn songs(&self) -> Vec<Song> {
        self.state.read().await.songs.clone()
    }
}

async fn backfill_cover(
    api: Arc<dyn SongApi>,
    view: Arc<dyn CatalogView>,
    state: Arc<RwLock<CatalogState>>,
    song_id: i64,
) {
    let result = match api.fetch_cover(song_id).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(song_id, error = %e, "Cover lookup failed");
            return;
        }
    };

    let Some(cover_url) = result.cover_url else {
        tracing::debug!(song_id, "No cover art found");
        return;
    };

    if let Some(song) = state.write().await.find_mut(song_id) {
        song.image_url = Some(cover_url.clone());
    }
    view.update_image(song_id, &cover_url);
}
