//! # starbeam-core
//!
//! Platform-independent core for the Starbeam game-streaming client.
//!
//! This crate contains:
//! - **Host model**: `HostRecord`, `PersistedHost`, `PairState`, `AppEntry`
//!   and the `HostStore` persistence seam
//! - **Input types**: raw touch / pointer / keyboard events shared between
//!   the surface layer and the lower input pipeline
//! - **Configuration**: `StreamConfig` loaded from TOML with per-section
//!   defaults, plus the `ControllerSupport` value object
//! - **Error**: `CoreError` — typed, `thiserror`-based error hierarchy

pub mod config;
pub mod error;
pub mod host;
pub mod input;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use config::{
    ControlScheme, ControllerSupport, ControlsConfig, LoggingConfig, OscLevel, ScalingConfig,
    StreamConfig, VideoConfig,
};
pub use error::CoreError;
pub use host::{AppEntry, HostRecord, HostStore, MemoryHostStore, PairState, PersistedHost};
pub use input::{KeyEvent, Modifiers, PointerButton, PointerEvent, TouchEvent, TouchPhase};
