//! The stream surface.
//!
//! `StreamSurface` owns the presenter, the on-screen-controls overlay
//! and the pass-through input router, and bridges pointer, keyboard
//! and monitor state on surfaces that have them. The platform drawable
//! drives it through [`DrawDelegate`]; the application observes input
//! bursts through [`InteractionDelegate`].
//!
//! Draw callbacks and input all run on the surface's owning thread;
//! the only cross-thread traffic is the frame slot returned by
//! [`StreamSurface::configure`].

use std::collections::BTreeSet;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use starbeam_core::{
    ControllerSupport, KeyEvent, OscLevel, PointerEvent, StreamConfig, TouchEvent,
};

use crate::backend::RenderBackend;
use crate::error::ViewError;
use crate::frame::{FrameSlot, frame_slot};
use crate::geometry::DrawableSize;
use crate::overlay::OnScreenControls;
use crate::presenter::{FramePresenter, PresenterStats, presenter_for};
use crate::router::{InputSink, PassthroughRouter};

// ── Delegates ────────────────────────────────────────────────────

/// Notified around input bursts so the application can suppress idle
/// timeouts or adjust chrome.
pub trait InteractionDelegate: Send {
    fn interaction_began(&mut self);
    fn interaction_ended(&mut self);
}

/// Hooks the platform drawable invokes: one draw per refresh plus
/// resize notifications.
pub trait DrawDelegate {
    fn on_draw_requested(&mut self);
    fn on_resize(&mut self, new_size: DrawableSize);
}

// ── Pointer bridge ───────────────────────────────────────────────

/// One display attached to the remote host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorInfo {
    pub name: String,
    pub size: DrawableSize,
}

/// Cursor, keyboard and monitor state for pointer-capable surfaces.
#[derive(Debug)]
struct PointerBridge {
    cursor: (f32, f32),
    is_mouse: bool,
    keyboard_open: bool,
    monitors: Vec<MonitorInfo>,
    current_monitor: usize,
}

impl PointerBridge {
    fn new(initial: DrawableSize) -> Self {
        Self {
            cursor: (0.0, 0.0),
            is_mouse: false,
            keyboard_open: false,
            monitors: vec![MonitorInfo {
                name: "Primary".into(),
                size: initial,
            }],
            current_monitor: 0,
        }
    }
}

// ── StreamSurface ────────────────────────────────────────────────

/// Owns the rendering surface state and bridges platform input to the
/// interaction delegate.
pub struct StreamSurface {
    backend: Option<Box<dyn RenderBackend>>,
    initial_size: DrawableSize,
    presenter: Option<Box<dyn FramePresenter>>,
    overlay: Option<OnScreenControls>,
    interaction: Option<Box<dyn InteractionDelegate>>,
    router: Option<PassthroughRouter<Box<dyn InputSink>>>,
    pointer: Option<PointerBridge>,
    config: StreamConfig,
    shutdown: CancellationToken,
    active_contacts: BTreeSet<u64>,
    pointer_buttons_down: u32,
}

impl StreamSurface {
    /// Surface bound to a platform render backend.
    pub fn new(backend: impl RenderBackend + 'static, initial_size: DrawableSize) -> Self {
        Self::build(Some(Box::new(backend)), initial_size)
    }

    /// Surface whose platform failed to provide a graphics device.
    /// `configure` reports the missing capability.
    pub fn detached(initial_size: DrawableSize) -> Self {
        Self::build(None, initial_size)
    }

    fn build(backend: Option<Box<dyn RenderBackend>>, initial_size: DrawableSize) -> Self {
        Self {
            backend,
            initial_size,
            presenter: None,
            overlay: None,
            interaction: None,
            router: None,
            pointer: None,
            config: StreamConfig::default(),
            shutdown: CancellationToken::new(),
            active_contacts: BTreeSet::new(),
            pointer_buttons_down: 0,
        }
    }

    /// One-time setup. Establishes the presenter (variant chosen from
    /// the backend's capabilities), the overlay and, on pointer-capable
    /// surfaces, the cursor/keyboard/monitor bridge. Must be called
    /// before the first draw.
    ///
    /// Returns the [`FrameSlot`] the decode pipeline submits into.
    pub fn configure(
        &mut self,
        controller_support: ControllerSupport,
        interaction: Box<dyn InteractionDelegate>,
        sink: Box<dyn InputSink>,
        config: StreamConfig,
    ) -> Result<FrameSlot, ViewError> {
        if self.presenter.is_some() {
            return Err(ViewError::AlreadyConfigured);
        }
        let backend = self.backend.take().ok_or(ViewError::NoRenderCapability)?;
        let caps = backend.capabilities();

        let (slot, receiver) = frame_slot();
        self.presenter = Some(presenter_for(
            backend,
            &config,
            self.initial_size,
            receiver,
        ));
        self.overlay = Some(OnScreenControls::new(&controller_support));
        self.interaction = Some(interaction);
        self.router = Some(PassthroughRouter::new(sink));
        if caps.pointer_input {
            self.pointer = Some(PointerBridge::new(self.initial_size));
        }
        self.config = config;
        Ok(slot)
    }

    fn presenter(&self) -> Result<&dyn FramePresenter, ViewError> {
        self.presenter.as_deref().ok_or(ViewError::NotConfigured)
    }

    // ── Draw path ────────────────────────────────────────────────

    /// Draw once. Invoked by the platform once per display refresh.
    pub fn draw_frame(&mut self) {
        if self.shutdown.is_cancelled() {
            return;
        }
        match self.presenter.as_mut() {
            Some(p) => p.draw_frame(),
            None => debug!("draw requested before configure"),
        }
    }

    /// Note a drawable size change; takes effect on the next draw.
    pub fn on_drawable_resize(&mut self, new_size: DrawableSize) {
        if let Some(p) = self.presenter.as_mut() {
            p.on_drawable_resize(new_size);
        } else {
            self.initial_size = new_size;
        }
    }

    /// Refresh-interval draw loop for headless use; platform surfaces
    /// call [`DrawDelegate::on_draw_requested`] instead. A tick that
    /// overruns the interval skips that refresh rather than queueing.
    pub async fn run_draw_loop(&mut self) {
        let fps = self.config.video.fps.max(1);
        let mut ticker = tokio::time::interval(Duration::from_secs_f64(1.0 / f64::from(fps)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let token = self.shutdown.clone();
        loop {
            tokio::select! {
                () = token.cancelled() => break,
                _ = ticker.tick() => self.draw_frame(),
            }
        }
    }

    /// Stop all further draws, then release render resources.
    ///
    /// Cancellation happens first so a concurrently running
    /// [`run_draw_loop`](Self::run_draw_loop) observes it before the
    /// presenter (and its backend) is dropped; `&mut self` guarantees
    /// no draw is in flight on this surface.
    pub fn teardown(&mut self) {
        self.shutdown.cancel();
        self.presenter = None;
    }

    /// Token cancelled at teardown.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Presentation statistics of the active presenter.
    pub fn stats(&self) -> Result<tokio::sync::watch::Receiver<PresenterStats>, ViewError> {
        Ok(self.presenter()?.stats())
    }

    // ── Overlay ──────────────────────────────────────────────────

    /// Make the on-screen controls visible at their effective level.
    pub fn show_on_screen_controls(&mut self) -> Result<(), ViewError> {
        let overlay = self.overlay.as_mut().ok_or(ViewError::NotConfigured)?;
        overlay.show();
        Ok(())
    }

    /// Current effective on-screen-controls level.
    pub fn on_screen_controls_level(&self) -> Result<OscLevel, ViewError> {
        Ok(self
            .overlay
            .as_ref()
            .ok_or(ViewError::NotConfigured)?
            .level())
    }

    // ── Input ────────────────────────────────────────────────────

    /// Route a raw touch event. Pass-through: the event reaches the
    /// sink unmodified; only the burst edges are observed here.
    pub fn handle_touch(&mut self, event: TouchEvent) -> Result<(), ViewError> {
        if self.shutdown.is_cancelled() {
            return Err(ViewError::TornDown);
        }
        if self.router.is_none() {
            return Err(ViewError::NotConfigured);
        }

        let was_active = self.burst_active();
        if event.phase.is_terminal() {
            self.active_contacts.remove(&event.id);
        } else {
            self.active_contacts.insert(event.id);
        }
        if let Some(router) = self.router.as_mut() {
            router.route_touch(event);
        }
        self.notify_burst_edge(was_active);
        Ok(())
    }

    /// Route a raw pointer event.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Result<(), ViewError> {
        if self.shutdown.is_cancelled() {
            return Err(ViewError::TornDown);
        }
        if self.router.is_none() {
            return Err(ViewError::NotConfigured);
        }

        let was_active = self.burst_active();
        if let PointerEvent::Button { pressed, .. } = event {
            if pressed {
                self.pointer_buttons_down += 1;
            } else {
                self.pointer_buttons_down = self.pointer_buttons_down.saturating_sub(1);
            }
        }
        if let Some(router) = self.router.as_mut() {
            router.route_pointer(event);
        }
        self.notify_burst_edge(was_active);
        Ok(())
    }

    /// Route a raw keyboard event.
    pub fn handle_key(&mut self, event: KeyEvent) -> Result<(), ViewError> {
        if self.shutdown.is_cancelled() {
            return Err(ViewError::TornDown);
        }
        self.router
            .as_mut()
            .ok_or(ViewError::NotConfigured)?
            .route_key(event);
        Ok(())
    }

    fn burst_active(&self) -> bool {
        !self.active_contacts.is_empty() || self.pointer_buttons_down > 0
    }

    fn notify_burst_edge(&mut self, was_active: bool) {
        let is_active = self.burst_active();
        if was_active == is_active {
            return;
        }
        if let Some(delegate) = self.interaction.as_mut() {
            if is_active {
                delegate.interaction_began();
            } else {
                delegate.interaction_ended();
            }
        }
    }

    // ── Pointer bridge ───────────────────────────────────────────

    fn pointer_mut(&mut self) -> Result<&mut PointerBridge, ViewError> {
        if self.router.is_none() {
            return Err(ViewError::NotConfigured);
        }
        self.pointer.as_mut().ok_or(ViewError::PointerUnsupported)
    }

    fn pointer_ref(&self) -> Result<&PointerBridge, ViewError> {
        if self.router.is_none() {
            return Err(ViewError::NotConfigured);
        }
        self.pointer.as_ref().ok_or(ViewError::PointerUnsupported)
    }

    /// Record the latest cursor position in surface-local coordinates.
    pub fn update_cursor_location(
        &mut self,
        x: f32,
        y: f32,
        is_mouse: bool,
    ) -> Result<(), ViewError> {
        let bridge = self.pointer_mut()?;
        bridge.cursor = (x, y);
        bridge.is_mouse = is_mouse;
        Ok(())
    }

    /// Last cursor position and whether it came from a real mouse.
    pub fn cursor_location(&self) -> Result<(f32, f32, bool), ViewError> {
        let bridge = self.pointer_ref()?;
        Ok((bridge.cursor.0, bridge.cursor.1, bridge.is_mouse))
    }

    /// Map a surface-local point into the active video content
    /// rectangle, accounting for letterboxing. Points in the bars
    /// clamp to the nearest video edge.
    pub fn adjust_coordinates_for_video_area(
        &self,
        x: f32,
        y: f32,
    ) -> Result<(f32, f32), ViewError> {
        self.pointer_ref()?;
        let rect = self.presenter()?.video_rect();
        let (cx, cy) = rect.clamp(x, y);
        Ok((cx - rect.x, cy - rect.y))
    }

    /// Size of the active video content rectangle.
    pub fn video_area_size(&self) -> Result<(f32, f32), ViewError> {
        self.pointer_ref()?;
        let rect = self.presenter()?.video_rect();
        Ok((rect.width, rect.height))
    }

    pub fn open_keyboard(&mut self) -> Result<(), ViewError> {
        self.pointer_mut()?.keyboard_open = true;
        Ok(())
    }

    pub fn close_keyboard(&mut self) -> Result<(), ViewError> {
        self.pointer_mut()?.keyboard_open = false;
        Ok(())
    }

    pub fn keyboard_open(&self) -> Result<bool, ViewError> {
        Ok(self.pointer_ref()?.keyboard_open)
    }

    /// Replace the known remote monitor list. The current index is
    /// reset when it no longer fits.
    pub fn set_monitors(&mut self, monitors: Vec<MonitorInfo>) -> Result<(), ViewError> {
        if monitors.is_empty() {
            warn!("ignoring empty monitor list");
            return Ok(());
        }
        let bridge = self.pointer_mut()?;
        if bridge.current_monitor >= monitors.len() {
            bridge.current_monitor = 0;
        }
        bridge.monitors = monitors;
        Ok(())
    }

    /// Cycle to the previous monitor, wrapping around.
    pub fn previous_monitor(&mut self) -> Result<MonitorInfo, ViewError> {
        let bridge = self.pointer_mut()?;
        let len = bridge.monitors.len();
        bridge.current_monitor = (bridge.current_monitor + len - 1) % len;
        Ok(bridge.monitors[bridge.current_monitor].clone())
    }

    /// Cycle to the next monitor, wrapping around.
    pub fn next_monitor(&mut self) -> Result<MonitorInfo, ViewError> {
        let bridge = self.pointer_mut()?;
        bridge.current_monitor = (bridge.current_monitor + 1) % bridge.monitors.len();
        Ok(bridge.monitors[bridge.current_monitor].clone())
    }

    /// The currently selected monitor.
    pub fn current_monitor(&self) -> Result<MonitorInfo, ViewError> {
        let bridge = self.pointer_ref()?;
        Ok(bridge.monitors[bridge.current_monitor].clone())
    }
}

impl DrawDelegate for StreamSurface {
    fn on_draw_requested(&mut self) {
        self.draw_frame();
    }

    fn on_resize(&mut self, new_size: DrawableSize) {
        self.on_drawable_resize(new_size);
    }
}
