//! Per-frame presenters.
//!
//! A presenter receives decoded frames through a [`FrameReceiver`] and
//! draws the most recent one into its backend once per display
//! refresh, independent of the decode cadence. Two variants exist,
//! selected by surface capability: [`DirectPresenter`] draws the frame
//! as uploaded, [`UpscalingPresenter`] additionally runs the spatial
//! upscaling pass when the source is below the drawable's native
//! resolution.
//!
//! Nothing on the draw path propagates errors: a frame that fails
//! validation or upload is logged and skipped, and the previous frame
//! stays on screen.

use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::warn;

use starbeam_core::StreamConfig;

use crate::backend::RenderBackend;
use crate::frame::{FrameReceiver, VideoFrame};
use crate::geometry::{DrawableSize, VideoRect, ViewportState};

// ── PresenterStats ───────────────────────────────────────────────

/// Presentation statistics exposed to UI chrome.
#[derive(Debug, Clone, Default)]
pub struct PresenterStats {
    /// Smoothed frames per second actually presented.
    pub fps: f64,
    /// Draws that presented frame content.
    pub frames_presented: u64,
    /// Frames overwritten in the slot before a draw could take them
    /// (includes at most one frame still pending).
    pub frames_dropped: u64,
    /// Last source frame width.
    pub source_width: u32,
    /// Last source frame height.
    pub source_height: u32,
}

// ── FramePresenter ───────────────────────────────────────────────

/// Draw-side interface the surface drives once per refresh.
pub trait FramePresenter: Send {
    /// Note a drawable size change. Takes effect on the next draw;
    /// idempotent for repeated identical sizes.
    fn on_drawable_resize(&mut self, new_size: DrawableSize);

    /// Draw the most recent frame (or re-draw the previous one).
    /// Runs on the display callback path; never propagates errors.
    fn draw_frame(&mut self);

    /// The active video content rectangle.
    fn video_rect(&self) -> VideoRect;

    /// The current drawable size.
    fn drawable_size(&self) -> DrawableSize;

    /// Subscribe to presentation statistics.
    fn stats(&self) -> watch::Receiver<PresenterStats>;
}

/// Select the presenter variant for the backend's capabilities and the
/// session configuration.
pub fn presenter_for<B: RenderBackend + 'static>(
    backend: B,
    config: &StreamConfig,
    initial_size: DrawableSize,
    frames: FrameReceiver,
) -> Box<dyn FramePresenter> {
    if backend.capabilities().spatial_upscaling && config.scaling.upscaling {
        Box::new(UpscalingPresenter::new(backend, initial_size, frames))
    } else {
        Box::new(DirectPresenter::new(backend, initial_size, frames))
    }
}

// ── Shared core ──────────────────────────────────────────────────

/// State shared by both presenter variants.
struct PresenterCore<B: RenderBackend> {
    backend: B,
    viewport: ViewportState,
    frames: FrameReceiver,
    /// Last frame successfully uploaded; re-drawn when nothing new
    /// arrives so the screen never flickers to black.
    current: Option<VideoFrame>,
    /// Resize noted since the last draw; applied at draw start.
    pending_resize: Option<DrawableSize>,
    accepted: u64,
    presented: u64,
    fps_samples: Vec<Duration>,
    last_present: Option<Instant>,
    stats_tx: watch::Sender<PresenterStats>,
    stats_rx: watch::Receiver<PresenterStats>,
}

impl<B: RenderBackend> PresenterCore<B> {
    fn new(backend: B, initial_size: DrawableSize, frames: FrameReceiver) -> Self {
        let (stats_tx, stats_rx) = watch::channel(PresenterStats::default());
        Self {
            backend,
            viewport: ViewportState::new(initial_size),
            frames,
            current: None,
            pending_resize: None,
            accepted: 0,
            presented: 0,
            fps_samples: Vec::with_capacity(64),
            last_present: None,
            stats_tx,
            stats_rx,
        }
    }

    fn note_resize(&mut self, new_size: DrawableSize) {
        if new_size == self.viewport.size() && self.pending_resize.is_none() {
            return;
        }
        self.pending_resize = Some(new_size);
    }

    fn draw(&mut self, upscale: bool) {
        // A resize that arrived since the last draw takes effect now,
        // never mid-draw.
        if let Some(size) = self.pending_resize.take() {
            self.viewport.resize(size);
        }

        // Only the last submitted frame matters. Validation and upload
        // failures keep the previous frame current.
        if let Some(frame) = self.frames.take_latest() {
            self.accepted += 1;
            match frame.validate().and_then(|()| self.backend.upload(&frame)) {
                Ok(()) => {
                    self.viewport.set_source(frame.width, frame.height);
                    self.current = Some(frame);
                }
                Err(e) => warn!("skipping undrawable frame: {e}"),
            }
        }

        let target = self.viewport.size();
        let Some(frame) = self.current.as_ref() else {
            // Nothing drawable yet — the defined blank state.
            if let Err(e) = self
                .backend
                .clear(target)
                .and_then(|()| self.backend.present())
            {
                warn!("blank draw failed: {e}");
            }
            return;
        };
        let (source_w, source_h) = (frame.width, frame.height);

        if upscale {
            let rect = self.viewport.video_rect();
            let (tw, th) = (rect.width.round() as u32, rect.height.round() as u32);
            if source_w < tw || source_h < th {
                if let Err(e) = self.backend.run_upscale_pass(tw, th) {
                    warn!("upscale pass failed: {e}");
                }
            }
        }

        let quad = *self.viewport.quad();
        match self
            .backend
            .draw(&quad, target)
            .and_then(|()| self.backend.present())
        {
            Ok(()) => self.record_present(source_w, source_h),
            Err(e) => warn!("frame draw failed: {e}"),
        }
    }

    fn record_present(&mut self, source_w: u32, source_h: u32) {
        self.presented += 1;

        let now = Instant::now();
        if let Some(last) = self.last_present {
            self.fps_samples.push(now.duration_since(last));
            if self.fps_samples.len() > 60 {
                self.fps_samples.remove(0);
            }
        }
        self.last_present = Some(now);

        let fps = if self.fps_samples.is_empty() {
            0.0
        } else {
            let avg: f64 = self.fps_samples.iter().map(|d| d.as_secs_f64()).sum::<f64>()
                / self.fps_samples.len() as f64;
            if avg > 0.0 { 1.0 / avg } else { 0.0 }
        };

        let _ = self.stats_tx.send(PresenterStats {
            fps,
            frames_presented: self.presented,
            frames_dropped: self.frames.submitted().saturating_sub(self.accepted),
            source_width: source_w,
            source_height: source_h,
        });
    }
}

// ── DirectPresenter ──────────────────────────────────────────────

/// Presenter that draws the uploaded frame as-is.
pub struct DirectPresenter<B: RenderBackend> {
    core: PresenterCore<B>,
}

impl<B: RenderBackend> DirectPresenter<B> {
    pub fn new(backend: B, initial_size: DrawableSize, frames: FrameReceiver) -> Self {
        Self {
            core: PresenterCore::new(backend, initial_size, frames),
        }
    }

    /// The owned backend, for inspection in tests and tooling.
    pub fn backend(&self) -> &B {
        &self.core.backend
    }
}

impl<B: RenderBackend> FramePresenter for DirectPresenter<B> {
    fn on_drawable_resize(&mut self, new_size: DrawableSize) {
        self.core.note_resize(new_size);
    }

    fn draw_frame(&mut self) {
        self.core.draw(false);
    }

    fn video_rect(&self) -> VideoRect {
        self.core.viewport.video_rect()
    }

    fn drawable_size(&self) -> DrawableSize {
        self.core.viewport.size()
    }

    fn stats(&self) -> watch::Receiver<PresenterStats> {
        self.core.stats_rx.clone()
    }
}

// ── UpscalingPresenter ───────────────────────────────────────────

/// Presenter that inserts the spatial upscaling pass before the quad
/// draw whenever the source resolution is below the video rectangle.
pub struct UpscalingPresenter<B: RenderBackend> {
    core: PresenterCore<B>,
}

impl<B: RenderBackend> UpscalingPresenter<B> {
    pub fn new(backend: B, initial_size: DrawableSize, frames: FrameReceiver) -> Self {
        Self {
            core: PresenterCore::new(backend, initial_size, frames),
        }
    }

    /// The owned backend, for inspection in tests and tooling.
    pub fn backend(&self) -> &B {
        &self.core.backend
    }
}

impl<B: RenderBackend> FramePresenter for UpscalingPresenter<B> {
    fn on_drawable_resize(&mut self, new_size: DrawableSize) {
        self.core.note_resize(new_size);
    }

    fn draw_frame(&mut self) {
        self.core.draw(true);
    }

    fn video_rect(&self) -> VideoRect {
        self.core.viewport.video_rect()
    }

    fn drawable_size(&self) -> DrawableSize {
        self.core.viewport.size()
    }

    fn stats(&self) -> watch::Receiver<PresenterStats> {
        self.core.stats_rx.clone()
    }
}

// ── Tests ────────────────────────────────────────────────────────
