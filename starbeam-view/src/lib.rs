//! # starbeam-view
//!
//! Presentation layer for the Starbeam game-streaming client: the
//! stream surface, the per-frame presenters and everything between the
//! decode pipeline's output and the platform drawable.
//!
//! This crate contains:
//! - **Frames**: `VideoFrame` / `PixelLayout` and the last-writer-wins
//!   `FrameSlot` handoff between the decode thread and the draw callback
//! - **Geometry**: `ViewportState` — letterbox fitting and quad generation
//! - **Backend**: the `RenderBackend` seam wrapping the platform graphics
//!   API, with the CPU `SoftwareBackend` reference implementation
//! - **Presenters**: `DirectPresenter` and `UpscalingPresenter`, selected
//!   per surface capability
//! - **Surface**: `StreamSurface` — overlay, pointer/keyboard/monitor
//!   bridging, interaction notifications and draw lifecycle
//! - **Router**: pass-through forwarding of raw input to a single sink
//! - **Error**: `ViewError` — typed, `thiserror`-based error hierarchy

pub mod backend;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod overlay;
pub mod presenter;
pub mod router;
pub mod surface;
pub mod upscale;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use backend::{RenderBackend, SoftwareBackend, SoftwareImage, SurfaceCapabilities};
pub use error::ViewError;
pub use frame::{FramePlane, FrameReceiver, FrameSlot, PixelLayout, VideoFrame, frame_slot};
pub use geometry::{DrawableSize, QuadVertices, Vertex, VideoRect, ViewportState, fit_video_rect};
pub use overlay::OnScreenControls;
pub use presenter::{
    DirectPresenter, FramePresenter, PresenterStats, UpscalingPresenter, presenter_for,
};
pub use router::{InputSink, PassthroughRouter};
pub use surface::{DrawDelegate, InteractionDelegate, MonitorInfo, StreamSurface};
pub use upscale::{BilinearUpscaler, Upscaler};
