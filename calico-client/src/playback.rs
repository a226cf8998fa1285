//! Playback controller
//!
//! Owns the single media element, keeps the player view in sync with it
//! and reports transport actions on the [`EventBus`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use calico_common::Song;
use tokio::sync::Mutex;

use crate::artwork::ArtworkExtractor;
use crate::error::Result;
use crate::events::{EventBus, PlayerEvent};
use crate::visualizer::Visualizer;

/// Volume applied when the controller is created
pub const DEFAULT_VOLUME: f64 = 0.7;

/// An audio output that can load a source and play it
#[async_trait]
pub trait MediaElement: Send {
    fn set_source(&mut self, source: &str);

    /// Begin playback of the current source
    async fn play(&mut self) -> Result<()>;

    fn pause(&mut self);

    fn is_paused(&self) -> bool;

    /// Track length in seconds; NaN until metadata is loaded
    fn duration(&self) -> f64;

    fn set_current_time(&mut self, seconds: f64);

    fn volume(&self) -> f64;

    fn set_volume(&mut self, volume: f64);

    fn is_muted(&self) -> bool;

    fn set_muted(&mut self, muted: bool);
}

/// Notifications from the media element
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaEvent {
    TimeUpdate { current_time: f64, duration: f64 },
    LoadedMetadata { duration: f64 },
    Ended,
}

/// Now-playing bar
pub trait PlayerView: Send + Sync {
    fn show_now_playing(&self, title: &str, artist: &str, image_url: &str);

    /// Replace only the now-playing image
    fn set_now_playing_image(&self, image_url: &str);

    fn set_visible(&self, visible: bool);

    /// `true` shows the pause icon, `false` the play icon
    fn set_playing(&self, playing: bool);

    fn set_progress(&self, percent: f64, current_time: &str);

    fn set_total_time(&self, total_time: &str);

    fn set_muted_icon(&self, muted: bool);
}

pub struct PlaybackController<M: MediaElement> {
    media: Mutex<M>,
    view: Arc<dyn PlayerView>,
    visualizer: Arc<Visualizer>,
    events: Arc<EventBus>,
    artwork: Option<Arc<dyn ArtworkExtractor>>,
    /// Bumped on every successful start; stale artwork lookups compare against it
    generation: Arc<AtomicU64>,
}

impl<M: MediaElement> PlaybackController<M> {
    pub fn new(
        mut media: M,
        view: Arc<dyn PlayerView>,
        visualizer: Arc<Visualizer>,
        events: Arc<EventBus>,
    ) -> Self {
        media.set_volume(DEFAULT_VOLUME);
        Self {
            media: Mutex::new(media),
            view,
            visualizer,
            events,
            artwork: None,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Look for embedded cover art whenever a track starts
    pub fn set_artwork_extractor(&mut self, extractor: Arc<dyn ArtworkExtractor>) {
        self.artwork = Some(extractor);
    }

    /// Load and play `song`
    ///
    /// Returns `true` when playback started. Songs without an audio file are
    /// ignored; a refused start is logged and leaves the view as it was.
    pub async fn play(&self, song: &Song) -> bool {
        let Some(source) = song.audio_file.as_deref().filter(|f| !f.trim().is_empty()) else {
            tracing::debug!(song_id = song.id, "Song has no audio file, not playing");
            return false;
        };

        {
            let mut media = self.media.lock().await;
            media.set_source(source);
            if let Err(e) = media.play().await {
                tracing::warn!(song_id = song.id, error = %e, "Playback failed to start");
                return false;
            }
        }

        self.view
            .show_now_playing(&song.title, &song.artist, song.display_image());
        self.visualizer.update_info(&song.title, &song.artist);
        self.visualizer.show();
        self.view.set_visible(true);
        self.view.set_playing(true);
        self.visualizer.start().await;

        tracing::info!(song_id = song.id, title = %song.title, artist = %song.artist, "Now playing");
        self.events.emit_lossy(PlayerEvent::PlayStarted(song.id));
        self.spawn_artwork_lookup(song.id, source);
        true
    }

    /// Swap in the file's embedded picture unless another track has started since
    fn spawn_artwork_lookup(&self, song_id: i64, source: &str) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let Some(extractor) = self.artwork.clone() else {
            return;
        };

        let current = Arc::clone(&self.generation);
        let view = Arc::clone(&self.view);
        let source = source.to_string();
        tokio::spawn(async move {
            match extractor.extract(&source).await {
                Ok(Some(artwork)) if current.load(Ordering::SeqCst) == generation => {
                    tracing::debug!(song_id, mime_type = %artwork.mime_type, "Using embedded artwork");
                    view.set_now_playing_image(&artwork.to_data_url());
                }
                Ok(Some(_)) => tracing::debug!(song_id, "Track changed, embedded artwork dropped"),
                Ok(None) => tracing::debug!(song_id, "No embedded artwork"),
                Err(e) => tracing::debug!(song_id, error = %e, "Embedded artwork unavailable"),
            }
        });
    }

    /// Resume when paused, pause when playing
    pub async fn toggle_play_pause(&self) {
        let mut media = self.media.lock().await;

        if media.is_paused() {
            if let Err(e) = media.play().await {
                tracing::warn!(error = %e, "Resume failed");
                return;
            }
            drop(media);
            self.view.set_playing(true);
            self.visualizer.start().await;
        } else {
            media.pause();
            drop(media);
            self.view.set_playing(false);
            self.visualizer.stop().await;
        }
    }

    /// Jump to `percent` (0-100) of the track
    pub async fn seek(&self, percent: f64) {
        let mut media = self.media.lock().await;
        let duration = media.duration();
        if !duration.is_finite() || duration <= 0.0 {
            return;
        }
        media.set_current_time(percent.clamp(0.0, 100.0) / 100.0 * duration);
    }

    /// Set the volume as a fraction (0.0-1.0)
    pub async fn set_volume(&self, volume: f64) {
        let mut media = self.media.lock().await;
        media.set_volume(volume.clamp(0.0, 1.0));
        self.view.set_muted_icon(shows_muted(&*media));
    }

    pub async fn toggle_mute(&self) {
        let mut media = self.media.lock().await;
        let muted = !media.is_muted();
        media.set_muted(muted);
        self.view.set_muted_icon(shows_muted(&*media));
    }

    pub fn handle_media_event(&self, event: MediaEvent) {
        match event {
            MediaEvent::TimeUpdate {
                current_time,
                duration,
            } => {
                if duration.is_finite() && duration > 0.0 {
                    let percent = current_time / duration * 100.0;
                    self.view.set_progress(percent, &format_time(current_time));
                }
            }
            MediaEvent::LoadedMetadata { duration } => {
                self.view.set_total_time(&format_time(duration));
            }
            MediaEvent::Ended => self.events.emit_lossy(PlayerEvent::Ended),
        }
    }

    pub fn request_next(&self) {
        self.events.emit_lossy(PlayerEvent::NextRequested);
    }

    pub fn request_previous(&self) {
        self.events.emit_lossy(PlayerEvent::PreviousRequested);
    }

    pub async fn is_paused(&self) -> bool {
        self.media.lock().await.is_paused()
    }

    pub async fn volume(&self) -> f64 {
        self.media.lock().await.volume()
    }
}

fn shows_muted<M: MediaElement>(media: &M) -> bool {
    media.is_muted() || media.volume() == 0.0
}

/// `m:ss`; `0:00` for NaN, infinite or negative input
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{}:{:02}", minutes, secs)
}
