//! Frequency-bar visualizer
//!
//! `Idle → Running → Idle`. While running, a spawned task samples the
//! analyser once per frame and redraws 64 bars on the canvas. The analyser
//! is created lazily on first [`Visualizer::setup`] and reused for every
//! later track.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::Result;

/// Number of bars drawn per frame
pub const BAR_COUNT: usize = 64;

/// Default frame period (60 fps)
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

/// Canvas sizing runs this long after setup, once the host has laid out
pub const CANVAS_SIZING_DELAY: Duration = Duration::from_millis(100);

const HUE_STEP: f64 = 0.5;
const REFLECTION_RATIO: f64 = 0.3;

/// Source of byte frequency magnitudes (0-255 per bin)
pub trait FrequencyAnalyser: Send {
    fn bin_count(&self) -> usize;

    /// Fill `bins` (length [`bin_count`](Self::bin_count)) with the current spectrum
    fn frequency_data(&mut self, bins: &mut [u8]);
}

/// Drawing surface and its surrounding section
pub trait Canvas: Send + Sync {
    /// Match the backing store to the displayed size
    fn resize(&self);

    /// Logical (width, height)
    fn size(&self) -> (f64, f64);

    fn clear(&self);

    fn draw_bars(&self, bars: &[Bar]);

    fn set_info(&self, title: &str, artist: &str);

    fn set_visible(&self, visible: bool);
}

/// HSLA colour stop along a bar's vertical gradient
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// 0.0 at the bar's base, 1.0 at its top
    pub offset: f64,
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
    pub alpha: f64,
}

/// One bar of a frame, in canvas coordinates (origin top-left)
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub x: f64,
    /// Top edge of the bar
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub stops: [GradientStop; 3],
    /// Mirror drawn below the baseline, fading from alpha 0.1 to 0
    pub reflection_height: f64,
}

/// Lay out one frame of bars from raw bin magnitudes
///
/// Bar `i` samples bin `floor(i * bins.len() / 64)`; an empty spectrum
/// yields flat bars.
pub fn compute_frame(bins: &[u8], width: f64, height: f64, hue: f64) -> Vec<Bar> {
    let slot_width = width / BAR_COUNT as f64;

    (0..BAR_COUNT)
        .map(|i| {
            let value = if bins.is_empty() {
                0.0
            } else {
                f64::from(bins[i * bins.len() / BAR_COUNT]) / 255.0
            };
            let bar_height = value * height * 0.9;
            let bar_hue = (hue + i as f64 * 360.0 / BAR_COUNT as f64) % 360.0;
            let saturation = 70.0 + value * 30.0;
            let lightness = 50.0 + value * 20.0;

            let stop = |offset: f64, hue_shift: f64, lightness_shift: f64, alpha: f64| GradientStop {
                offset,
                hue: (bar_hue + hue_shift) % 360.0,
                saturation,
                lightness: lightness + lightness_shift,
                alpha,
            };

            Bar {
                x: i as f64 * slot_width,
                y: height - bar_height,
                width: (slot_width - 2.0).max(0.0),
                height: bar_height,
                stops: [
                    stop(0.0, 0.0, 0.0, 0.8),
                    stop(0.5, 20.0, 10.0, 0.9),
                    stop(1.0, 40.0, 20.0, 1.0),
                ],
                reflection_height: bar_height * REFLECTION_RATIO,
            }
        })
        .collect()
}

/// Hue after one more frame
pub fn advance_hue(hue: f64) -> f64 {
    (hue + HUE_STEP) % 360.0
}

enum State {
    Idle { hue: f64 },
    Running {
        cancel: CancellationToken,
        task: JoinHandle<f64>,
    },
}

pub struct Visualizer {
    canvas: Arc<dyn Canvas>,
    analyser: Arc<Mutex<Option<Box<dyn FrequencyAnalyser>>>>,
    state: Mutex<State>,
    frame_interval: Duration,
}

impl Visualizer {
    pub fn new(canvas: Arc<dyn Canvas>) -> Self {
        Self::with_frame_interval(canvas, DEFAULT_FRAME_INTERVAL)
    }

    pub fn with_frame_interval(canvas: Arc<dyn Canvas>, frame_interval: Duration) -> Self {
        Self {
            canvas,
            analyser: Arc::new(Mutex::new(None)),
            state: Mutex::new(State::Idle { hue: 0.0 }),
            frame_interval,
        }
    }

    /// Attach an analyser (first call only) and schedule canvas sizing
    ///
    /// A failing factory leaves the visualizer without an analyser; frames
    /// then draw nothing.
    pub async fn setup<F>(&self, factory: F)
    where
        F: FnOnce() -> Result<Box<dyn FrequencyAnalyser>>,
    {
        {
            let mut analyser = self.analyser.lock().await;
            if analyser.is_none() {
                match factory() {
                    Ok(created) => {
                        tracing::info!(bins = created.bin_count(), "Audio analyser created");
                        *analyser = Some(created);
                    }
                    Err(e) => tracing::error!(error = %e, "Failed to create audio analyser"),
                }
            }
        }

        let canvas = Arc::clone(&self.canvas);
        tokio::spawn(async move {
            tokio::time::sleep(CANVAS_SIZING_DELAY).await;
            canvas.resize();
            let (width, height) = canvas.size();
            tracing::debug!(width, height, "Canvas sized");
        });
    }

    pub async fn has_analyser(&self) -> bool {
        self.analyser.lock().await.is_some()
    }

    pub async fn is_running(&self) -> bool {
        matches!(*self.state.lock().await, State::Running { .. })
    }

    /// Start the frame loop; no-op when already running
    pub async fn start(&self) {
        let mut state = self.state.lock().await;
        let hue = match *state {
            State::Running { .. } => return,
            State::Idle { hue } => hue,
        };

        tracing::debug!("Starting visualizer");
        let cancel = CancellationToken::new();
        let task = tokio::spawn(frame_loop(
            Arc::clone(&self.canvas),
            Arc::clone(&self.analyser),
            cancel.clone(),
            self.frame_interval,
            hue,
        ));
        *state = State::Running { cancel, task };
    }

    /// Stop the frame loop and clear the canvas
    pub async fn stop(&self) {
        let mut state = self.state.lock().await;
        if let State::Running { cancel, task } = std::mem::replace(&mut *state, State::Idle { hue: 0.0 }) {
            cancel.cancel();
            let hue = match task.await {
                Ok(hue) => hue,
                Err(e) => {
                    tracing::warn!(error = %e, "Visualizer task ended abnormally");
                    0.0
                }
            };
            *state = State::Idle { hue };
            tracing::debug!("Visualizer stopped");
        }
        self.canvas.clear();
    }

    pub fn update_info(&self, title: &str, artist: &str) {
        self.canvas.set_info(title, artist);
    }

    pub fn show(&self) {
        self.canvas.set_visible(true);
    }

    pub fn hide(&self) {
        self.canvas.set_visible(false);
    }
}

/// Per-frame loop; returns the hue reached so a restart continues from it
async fn frame_loop(
    canvas: Arc<dyn Canvas>,
    analyser: Arc<Mutex<Option<Box<dyn FrequencyAnalyser>>>>,
    cancel: CancellationToken,
    frame_interval: Duration,
    mut hue: f64,
) -> f64 {
    let mut ticker = tokio::time::interval(frame_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut bins: Vec<u8> = Vec::new();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                {
                    let mut guard = analyser.lock().await;
                    let Some(analyser) = guard.as_mut() else {
                        continue;
                    };
                    bins.resize(analyser.bin_count(), 0);
                    analyser.frequency_data(&mut bins);
                }

                let (width, height) = canvas.size();
                hue = advance_hue(hue);
                canvas.clear();
                canvas.draw_bars(&compute_frame(&bins, width, height, hue));
            }
        }
    }

    hue
}
