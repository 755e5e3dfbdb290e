//! Viewport state and letterbox geometry.
//!
//! The presenter draws one full-viewport quad per frame. The quad's
//! position maps the video content rectangle — the aspect-preserving
//! fit of the source frame into the drawable — into normalized device
//! coordinates, leaving black bars where the shapes differ.

// ── DrawableSize ─────────────────────────────────────────────────

/// Size of the platform drawable in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawableSize {
    pub width: u32,
    pub height: u32,
}

impl DrawableSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

// ── VideoRect ────────────────────────────────────────────────────

/// The video content rectangle inside the drawable, in drawable-local
/// pixel coordinates (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VideoRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl VideoRect {
    /// Clamp a drawable-local point into this rectangle.
    pub fn clamp(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x.clamp(self.x, self.x + self.width),
            y.clamp(self.y, self.y + self.height),
        )
    }

    /// Whether the point lies inside (or on the edge of) the rect.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// Aspect-preserving fit of a `source_w x source_h` frame into the
/// drawable: scaled to the largest size that fits, centered, with
/// letterbox/pillarbox bars making up the difference.
pub fn fit_video_rect(drawable: DrawableSize, source_w: u32, source_h: u32) -> VideoRect {
    if drawable.width == 0 || drawable.height == 0 || source_w == 0 || source_h == 0 {
        return VideoRect::default();
    }
    let dw = drawable.width as f32;
    let dh = drawable.height as f32;
    let sw = source_w as f32;
    let sh = source_h as f32;

    let scale = (dw / sw).min(dh / sh);
    let width = sw * scale;
    let height = sh * scale;
    VideoRect {
        x: (dw - width) / 2.0,
        y: (dh - height) / 2.0,
        width,
        height,
    }
}

// ── Vertex ───────────────────────────────────────────────────────

/// One vertex of the frame quad: position in normalized device
/// coordinates plus texture coordinates.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: [f32; 2],
    pub tex_coords: [f32; 2],
}

/// Triangle-strip quad: top-left, top-right, bottom-left, bottom-right.
pub type QuadVertices = [Vertex; 4];

/// Generate the strip quad for a video rect inside a drawable.
pub fn quad_for_rect(rect: VideoRect, drawable: DrawableSize) -> QuadVertices {
    let to_ndc = |x: f32, y: f32| -> [f32; 2] {
        if drawable.width == 0 || drawable.height == 0 {
            return [0.0, 0.0];
        }
        [
            x / drawable.width as f32 * 2.0 - 1.0,
            1.0 - y / drawable.height as f32 * 2.0,
        ]
    };
    let (left, top) = (rect.x, rect.y);
    let (right, bottom) = (rect.x + rect.width, rect.y + rect.height);
    [
        Vertex { position: to_ndc(left, top), tex_coords: [0.0, 0.0] },
        Vertex { position: to_ndc(right, top), tex_coords: [1.0, 0.0] },
        Vertex { position: to_ndc(left, bottom), tex_coords: [0.0, 1.0] },
        Vertex { position: to_ndc(right, bottom), tex_coords: [1.0, 1.0] },
    ]
}

// ── ViewportState ────────────────────────────────────────────────

/// Current drawable size, source dimensions and the generated quad.
///
/// The quad is regenerated only when the drawable or source actually
/// changes; repeated identical resizes leave it untouched.
#[derive(Debug, Clone)]
pub struct ViewportState {
    size: DrawableSize,
    source: Option<(u32, u32)>,
    quad: QuadVertices,
}

impl ViewportState {
    pub fn new(size: DrawableSize) -> Self {
        let mut state = Self {
            size,
            source: None,
            quad: quad_for_rect(VideoRect::default(), size),
        };
        state.regenerate();
        state
    }

    /// Update the drawable size. Returns whether anything changed;
    /// idempotent for repeated identical sizes.
    pub fn resize(&mut self, new_size: DrawableSize) -> bool {
        if new_size == self.size {
            return false;
        }
        self.size = new_size;
        self.regenerate();
        true
    }

    /// Update the source frame dimensions. Returns whether anything
    /// changed.
    pub fn set_source(&mut self, width: u32, height: u32) -> bool {
        if self.source == Some((width, height)) {
            return false;
        }
        self.source = Some((width, height));
        self.regenerate();
        true
    }

    /// The active video content rectangle. Covers the whole drawable
    /// until a source is known.
    pub fn video_rect(&self) -> VideoRect {
        match self.source {
            Some((w, h)) => fit_video_rect(self.size, w, h),
            None => VideoRect {
                x: 0.0,
                y: 0.0,
                width: self.size.width as f32,
                height: self.size.height as f32,
            },
        }
    }

    pub fn quad(&self) -> &QuadVertices {
        &self.quad
    }

    pub fn size(&self) -> DrawableSize {
        self.size
    }

    pub fn source(&self) -> Option<(u32, u32)> {
        self.source
    }

    fn regenerate(&mut self) {
        self.quad = quad_for_rect(self.video_rect(), self.size);
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pillarbox_for_narrow_source() {
        // 4:3 source into a 16:9 drawable → bars left and right.
        let rect = fit_video_rect(DrawableSize::new(1920, 1080), 640, 480);
        assert_eq!(rect.height, 1080.0);
        assert_eq!(rect.width, 1440.0);
        assert_eq!(rect.x, 240.0);
        assert_eq!(rect.y, 0.0);
    }

    #[test]
    fn letterbox_for_wide_source() {
        // 16:9 source into a 4:3 drawable → bars top and bottom.
        let rect = fit_video_rect(DrawableSize::new(1024, 768), 1920, 1080);
        assert_eq!(rect.width, 1024.0);
        assert_eq!(rect.height, 576.0);
        assert_eq!(rect.x, 0.0);
        assert_eq!(rect.y, 96.0);
    }

    #[test]
    fn exact_fit_has_no_bars() {
        let rect = fit_video_rect(DrawableSize::new(1920, 1080), 1920, 1080);
        assert_eq!(rect, VideoRect { x: 0.0, y: 0.0, width: 1920.0, height: 1080.0 });
    }

    #[test]
    fn degenerate_sizes_yield_empty_rect() {
        assert_eq!(fit_video_rect(DrawableSize::new(0, 0), 640, 480), VideoRect::default());
        assert_eq!(fit_video_rect(DrawableSize::new(640, 480), 0, 0), VideoRect::default());
    }

    #[test]
    fn full_viewport_quad_spans_ndc() {
        let size = DrawableSize::new(800, 600);
        let quad = quad_for_rect(
            VideoRect { x: 0.0, y: 0.0, width: 800.0, height: 600.0 },
            size,
        );
        assert_eq!(quad[0].position, [-1.0, 1.0]);
        assert_eq!(quad[1].position, [1.0, 1.0]);
        assert_eq!(quad[2].position, [-1.0, -1.0]);
        assert_eq!(quad[3].position, [1.0, -1.0]);
        assert_eq!(quad[0].tex_coords, [0.0, 0.0]);
        assert_eq!(quad[3].tex_coords, [1.0, 1.0]);
    }

    #[test]
    fn resize_is_idempotent_for_identical_sizes() {
        let mut vp = ViewportState::new(DrawableSize::new(1280, 720));
        vp.set_source(640, 480);
        let quad_before = *vp.quad();

        assert!(!vp.resize(DrawableSize::new(1280, 720)));
        assert_eq!(*vp.quad(), quad_before);

        assert!(vp.resize(DrawableSize::new(1920, 1080)));
        assert_ne!(*vp.quad(), quad_before);
    }

    #[test]
    fn set_source_is_idempotent_too() {
        let mut vp = ViewportState::new(DrawableSize::new(1280, 720));
        assert!(vp.set_source(640, 480));
        let quad_before = *vp.quad();
        assert!(!vp.set_source(640, 480));
        assert_eq!(*vp.quad(), quad_before);
    }

    #[test]
    fn clamp_pulls_points_into_rect() {
        let rect = VideoRect { x: 240.0, y: 0.0, width: 1440.0, height: 1080.0 };
        assert_eq!(rect.clamp(0.0, 500.0), (240.0, 500.0));
        assert_eq!(rect.clamp(1900.0, 1200.0), (1680.0, 1080.0));
        assert_eq!(rect.clamp(960.0, 540.0), (960.0, 540.0));
        assert!(rect.contains(240.0, 0.0));
        assert!(!rect.contains(100.0, 10.0));
    }
}
