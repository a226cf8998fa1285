//! Application coordinator
//!
//! Wires the catalog, playback controller and visualizer together and
//! routes player events: a started track registers a play, an ended or
//! skipped track advances the catalog ring.

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;

use crate::api::SongApi;
use crate::artwork::ArtworkExtractor;
use crate::catalog::{Catalog, CatalogView};
use crate::error::Result;
use crate::events::{EventBus, PlayerEvent};
use crate::playback::{MediaElement, PlaybackController, PlayerView};
use crate::visualizer::{Canvas, FrequencyAnalyser, Visualizer};

/// Player event buffer per subscriber
pub const EVENT_BUS_CAPACITY: usize = 64;

/// Builds the audio analyser the first time a song is played
pub type AnalyserFactory = Box<dyn Fn() -> Result<Box<dyn FrequencyAnalyser>> + Send + Sync>;

pub struct RadioApp<M: MediaElement> {
    catalog: Catalog,
    player: PlaybackController<M>,
    visualizer: Arc<Visualizer>,
    events: Arc<EventBus>,
    receiver: Mutex<Option<broadcast::Receiver<PlayerEvent>>>,
    analyser_factory: AnalyserFactory,
}

impl<M: MediaElement> RadioApp<M> {
    pub fn new(
        api: Arc<dyn SongApi>,
        catalog_view: Arc<dyn CatalogView>,
        media: M,
        player_view: Arc<dyn PlayerView>,
        canvas: Arc<dyn Canvas>,
        analyser_factory: AnalyserFactory,
    ) -> Self {
        Self::with_visualizer(
            api,
            catalog_view,
            media,
            player_view,
            Arc::new(Visualizer::new(canvas)),
            analyser_factory,
        )
    }

    pub fn with_visualizer(
        api: Arc<dyn SongApi>,
        catalog_view: Arc<dyn CatalogView>,
        media: M,
        player_view: Arc<dyn PlayerView>,
        visualizer: Arc<Visualizer>,
        analyser_factory: AnalyserFactory,
    ) -> Self {
        let events = Arc::new(EventBus::new(EVENT_BUS_CAPACITY));
        // Subscribe now so events raised before run() are kept
        let receiver = events.subscribe();
        let player = PlaybackController::new(
            media,
            player_view,
            Arc::clone(&visualizer),
            Arc::clone(&events),
        );

        Self {
            catalog: Catalog::new(api, catalog_view),
            player,
            visualizer,
            events,
            receiver: Mutex::new(Some(receiver)),
            analyser_factory,
        }
    }

    /// Show embedded cover art once a track starts
    pub fn with_artwork_extractor(mut self, extractor: Arc<dyn ArtworkExtractor>) -> Self {
        self.player.set_artwork_extractor(extractor);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn player(&self) -> &PlaybackController<M> {
        &self.player
    }

    pub fn visualizer(&self) -> &Arc<Visualizer> {
        &self.visualizer
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Load the catalog and render it; returns the number of songs
    pub async fn init(&self) -> usize {
        let songs = self.catalog.load().await;
        if !songs.is_empty() {
            self.catalog.render().await;
        }
        songs.len()
    }

    /// Play the song at `index` (play button on a card)
    pub async fn play_song(&self, index: usize) -> bool {
        let Some(song) = self.catalog.select(index).await else {
            tracing::warn!(index, "No song at index");
            return false;
        };

        self.visualizer.setup(|| (self.analyser_factory)()).await;
        let started = self.player.play(&song).await;
        self.catalog.highlight(song.id);
        started
    }

    async fn play_next(&self) {
        if let Some(song) = self.catalog.get_next().await {
            self.player.play(&song).await;
            self.catalog.highlight(song.id);
        }
    }

    async fn play_previous(&self) {
        if let Some(song) = self.catalog.get_previous().await {
            self.player.play(&song).await;
            self.catalog.highlight(song.id);
        }
    }

    pub async fn handle_event(&self, event: PlayerEvent) {
        tracing::debug!(?event, "Player event");
        match event {
            PlayerEvent::PlayStarted(song_id) => self.catalog.register_play(song_id).await,
            PlayerEvent::Ended | PlayerEvent::NextRequested => self.play_next().await,
            PlayerEvent::PreviousRequested => self.play_previous().await,
        }
    }

    /// Consume player events until `shutdown` fires
    ///
    /// Only one run loop may own the event stream; a second call returns
    /// immediately.
    pub async fn run(&self, shutdown: CancellationToken) {
        let Some(mut receiver) = self.receiver.lock().await.take() else {
            tracing::warn!("Event loop already running");
            return;
        };

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                received = receiver.recv() => match received {
                    Ok(event) => self.handle_event(event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Player event loop lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }

        self.visualizer.stop().await;
        tracing::info!("Player event loop stopped");
    }
}
