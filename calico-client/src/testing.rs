//! In-memory fakes of the seam traits for unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use calico_common::{CoverSearchResult, Song};
use chrono::Utc;

use crate::api::SongApi;
use crate::artwork::{ArtworkExtractor, EmbeddedArtwork};
use crate::catalog::{CatalogView, SongCard};
use crate::error::{ClientError, Result};
use crate::playback::{MediaElement, PlayerView};
use crate::visualizer::{Bar, Canvas, FrequencyAnalyser};

pub fn song(id: i64, title: &str, audio_file: Option<&str>) -> Song {
    Song {
        id,
        title: title.to_string(),
        artist: "Artist".to_string(),
        audio_file: audio_file.map(str::to_string),
        image_url: None,
        description: None,
        spotify_url: None,
        youtube_url: None,
        genre: None,
        duration: None,
        votes: 0,
        play_count: 0,
        created_at: Utc::now(),
    }
}

// =============================================================================
// API
// =============================================================================

pub struct FakeApi {
    songs: Mutex<Vec<Song>>,
    covers: HashMap<i64, String>,
    fail_list: bool,
    fail_mutations: AtomicBool,
    cover_requests: Mutex<Vec<i64>>,
}

impl FakeApi {
    pub fn new(songs: Vec<Song>) -> Self {
        Self {
            songs: Mutex::new(songs),
            covers: HashMap::new(),
            fail_list: false,
            fail_mutations: AtomicBool::new(false),
            cover_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_list: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn with_cover(mut self, song_id: i64, url: &str) -> Self {
        self.covers.insert(song_id, url.to_string());
        self
    }

    pub fn fail_mutations(&self) {
        self.fail_mutations.store(true, Ordering::SeqCst);
    }

    pub fn cover_requests(&self) -> Vec<i64> {
        self.cover_requests.lock().unwrap().clone()
    }

    fn mutate(&self, song_id: i64, apply: impl FnOnce(&mut Song)) -> Result<Song> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(ClientError::Api {
                status: 500,
                message: "Database unavailable".to_string(),
            });
        }
        let mut songs = self.songs.lock().unwrap();
        let song = songs
            .iter_mut()
            .find(|s| s.id == song_id)
            .ok_or_else(|| ClientError::Api {
                status: 404,
                message: "Song not found".to_string(),
            })?;
        apply(song);
        Ok(song.clone())
    }
}

#[async_trait]
impl SongApi for FakeApi {
    async fn list_songs(&self) -> Result<Vec<Song>> {
        if self.fail_list {
            return Err(ClientError::Api {
                status: 500,
                message: "Failed to load songs".to_string(),
            });
        }
        Ok(self.songs.lock().unwrap().clone())
    }

    async fn vote(&self, song_id: i64) -> Result<Song> {
        self.mutate(song_id, |s| s.votes += 1)
    }

    async fn register_play(&self, song_id: i64) -> Result<Song> {
        self.mutate(song_id, |s| s.play_count += 1)
    }

    async fn fetch_cover(&self, song_id: i64) -> Result<CoverSearchResult> {
        self.cover_requests.lock().unwrap().push(song_id);
        Ok(match self.covers.get(&song_id) {
            Some(url) => CoverSearchResult::archive_hit(url.clone(), Some("Release".to_string())),
            None => CoverSearchResult::none(),
        })
    }
}

// =============================================================================
// Catalog view
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ViewCall {
    Render(usize),
    Error(String),
    Empty(String),
    Image(i64, String),
    Votes(i64, i64),
    PlayCount(i64, String),
    Flash(i64, bool),
    Expanded(i64, bool),
    Highlight(i64),
}

#[derive(Default)]
pub struct RecordingCatalogView {
    calls: Mutex<Vec<ViewCall>>,
    rendered: Mutex<Vec<SongCard>>,
}

impl RecordingCatalogView {
    pub fn calls(&self) -> Vec<ViewCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn rendered(&self) -> Vec<SongCard> {
        self.rendered.lock().unwrap().clone()
    }

    fn record(&self, call: ViewCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl CatalogView for RecordingCatalogView {
    fn render_songs(&self, cards: &[SongCard]) {
        *self.rendered.lock().unwrap() = cards.to_vec();
        self.record(ViewCall::Render(cards.len()));
    }

    fn show_error(&self, message: &str) {
        self.record(ViewCall::Error(message.to_string()));
    }

    fn show_empty(&self, message: &str) {
        self.record(ViewCall::Empty(message.to_string()));
    }

    fn update_image(&self, song_id: i64, image_url: &str) {
        self.record(ViewCall::Image(song_id, image_url.to_string()));
    }

    fn update_votes(&self, song_id: i64, votes: i64) {
        self.record(ViewCall::Votes(song_id, votes));
    }

    fn update_play_count(&self, song_id: i64, label: &str) {
        self.record(ViewCall::PlayCount(song_id, label.to_string()));
    }

    fn set_vote_flash(&self, song_id: i64, on: bool) {
        self.record(ViewCall::Flash(song_id, on));
    }

    fn set_description_expanded(&self, song_id: i64, expanded: bool) {
        self.record(ViewCall::Expanded(song_id, expanded));
    }

    fn highlight(&self, song_id: i64) {
        self.record(ViewCall::Highlight(song_id));
    }
}

// =============================================================================
// Media element and player view
// =============================================================================

pub struct FakeMedia {
    pub source: Option<String>,
    pub paused: bool,
    pub duration: f64,
    pub current_time: f64,
    pub volume: f64,
    pub muted: bool,
    refuse_play: bool,
}

impl Default for FakeMedia {
    fn default() -> Self {
        Self {
            source: None,
            paused: true,
            duration: f64::NAN,
            current_time: 0.0,
            volume: 1.0,
            muted: false,
            refuse_play: false,
        }
    }
}

impl FakeMedia {
    pub fn refusing() -> Self {
        Self {
            refuse_play: true,
            ..Self::default()
        }
    }

    pub fn with_duration(duration: f64) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }
}

#[async_trait]
impl MediaElement for FakeMedia {
    fn set_source(&mut self, source: &str) {
        self.source = Some(source.to_string());
        self.current_time = 0.0;
    }

    async fn play(&mut self) -> Result<()> {
        if self.refuse_play {
            return Err(ClientError::Media("autoplay blocked".to_string()));
        }
        self.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.current_time = seconds;
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }

    fn is_muted(&self) -> bool {
        self.muted
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
}

#[derive(Default)]
struct PlayerViewState {
    now_playing: Option<(String, String, String)>,
    visible: bool,
    playing: Option<bool>,
    progress: Option<(f64, String)>,
    total_time: Option<String>,
    muted_icon: Option<bool>,
}

#[derive(Default)]
pub struct RecordingPlayerView {
    state: Mutex<PlayerViewState>,
}

impl RecordingPlayerView {
    pub fn now_playing(&self) -> Option<(String, String, String)> {
        self.state.lock().unwrap().now_playing.clone()
    }

    pub fn visible(&self) -> bool {
        self.state.lock().unwrap().visible
    }

    pub fn playing(&self) -> Option<bool> {
        self.state.lock().unwrap().playing
    }

    pub fn progress(&self) -> Option<(f64, String)> {
        self.state.lock().unwrap().progress.clone()
    }

    pub fn total_time(&self) -> Option<String> {
        self.state.lock().unwrap().total_time.clone()
    }

    pub fn muted_icon(&self) -> Option<bool> {
        self.state.lock().unwrap().muted_icon
    }
}

impl PlayerView for RecordingPlayerView {
    fn show_now_playing(&self, title: &str, artist: &str, image_url: &str) {
        self.state.lock().unwrap().now_playing =
            Some((title.to_string(), artist.to_string(), image_url.to_string()));
    }

    fn set_now_playing_image(&self, image_url: &str) {
        if let Some((_, _, image)) = self.state.lock().unwrap().now_playing.as_mut() {
            *image = image_url.to_string();
        }
    }

    fn set_visible(&self, visible: bool) {
        self.state.lock().unwrap().visible = visible;
    }

    fn set_playing(&self, playing: bool) {
        self.state.lock().unwrap().playing = Some(playing);
    }

    fn set_progress(&self, percent: f64, current_time: &str) {
        self.state.lock().unwrap().progress = Some((percent, current_time.to_string()));
    }

    fn set_total_time(&self, total_time: &str) {
        self.state.lock().unwrap().total_time = Some(total_time.to_string());
    }

    fn set_muted_icon(&self, muted: bool) {
        self.state.lock().unwrap().muted_icon = Some(muted);
    }
}

// =============================================================================
// Embedded artwork
// =============================================================================

/// Returns a fixed picture for one audio file and nothing for the rest
#[derive(Default)]
pub struct FakeArtwork {
    pictures: HashMap<String, EmbeddedArtwork>,
    fail: bool,
    delay: Option<Duration>,
    requests: Mutex<Vec<String>>,
}

impl FakeArtwork {
    pub fn found(audio_file: &str, artwork: EmbeddedArtwork) -> Self {
        let mut fake = Self::default();
        fake.pictures.insert(audio_file.to_string(), artwork);
        fake
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtworkExtractor for FakeArtwork {
    async fn extract(&self, audio_file: &str) -> Result<Option<EmbeddedArtwork>> {
        self.requests.lock().unwrap().push(audio_file.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(ClientError::Artwork("no tags".to_string()));
        }
        Ok(self.pictures.get(audio_file).cloned())
    }
}

// =============================================================================
// Visualizer
// =============================================================================

pub struct FakeAnalyser {
    bins: usize,
    level: u8,
}

impl FakeAnalyser {
    pub fn new(bins: usize, level: u8) -> Self {
        Self { bins, level }
    }
}

impl FrequencyAnalyser for FakeAnalyser {
    fn bin_count(&self) -> usize {
        self.bins
    }

    fn frequency_data(&mut self, bins: &mut [u8]) {
        bins.fill(self.level);
    }
}

#[derive(Default)]
struct CanvasState {
    resizes: usize,
    clears: usize,
    frames: usize,
    last_bar_count: usize,
    info: Option<(String, String)>,
    visible: bool,
}

#[derive(Default)]
pub struct RecordingCanvas {
    state: Mutex<CanvasState>,
}

impl RecordingCanvas {
    pub fn resizes(&self) -> usize {
        self.state.lock().unwrap().resizes
    }

    pub fn clears(&self) -> usize {
        self.state.lock().unwrap().clears
    }

    pub fn frames(&self) -> usize {
        self.state.lock().unwrap().frames
    }

    pub fn last_bar_count(&self) -> usize {
        self.state.lock().unwrap().last_bar_count
    }

    pub fn info(&self) -> Option<(String, String)> {
        self.state.lock().unwrap().info.clone()
    }

    pub fn visible(&self) -> bool {
        self.state.lock().unwrap().visible
    }
}

impl Canvas for RecordingCanvas {
    fn resize(&self) {
        self.state.lock().unwrap().resizes += 1;
    }

    fn size(&self) -> (f64, f64) {
        (640.0, 160.0)
    }

    fn clear(&self) {
        self.state.lock().unwrap().clears += 1;
    }

    fn draw_bars(&self, bars: &[Bar]) {
        let mut state = self.state.lock().unwrap();
        state.frames += 1;
        state.last_bar_count = bars.len();
    }

    fn set_info(&self, title: &str, artist: &str) {
        self.state.lock().unwrap().info = Some((title.to_string(), artist.to_string()));
    }

    fn set_visible(&self, visible: bool) {
        self.state.lock().unwrap().visible = visible;
    }
}
