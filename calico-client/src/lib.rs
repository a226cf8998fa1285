//! calico-client - Radio Calico player client
//!
//! The browser-side half of Radio Calico as a library. Rendering and audio
//! output live behind seam traits ([`catalog::CatalogView`],
//! [`playback::PlayerView`], [`playback::MediaElement`],
//! [`visualizer::Canvas`], [`visualizer::FrequencyAnalyser`]) so a host
//! (web view, TUI, native player) only implements those. Embedded cover
//! art is read through [`artwork::ArtworkExtractor`].
//!
//! Components talk through the [`events::EventBus`]; [`app::RadioApp`]
//! wires them together.

pub mod api;
pub mod app;
pub mod artwork;
pub mod catalog;
pub mod error;
pub mod events;
pub mod playback;
pub mod visualizer;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ClientConfig, RadioApiClient, SongApi};
pub use app::RadioApp;
pub use artwork::{ArtworkExtractor, EmbeddedArtwork, HttpArtworkExtractor};
pub use catalog::{Catalog, CatalogView, SongCard};
pub use error::{ClientError, Result};
pub use events::{EventBus, PlayerEvent};
pub use playback::{MediaElement, MediaEvent, PlaybackController, PlayerView};
pub use visualizer::{Canvas, FrequencyAnalyser, Visualizer};
