//! Render backend seam.
//!
//! [`RenderBackend`] stands in for the platform graphics API: the
//! presenter uploads decoded frame planes into backend textures and
//! issues one quad draw per refresh. Platform GPU adapters implement
//! this trait out of tree and are selected at build/link time;
//! [`SoftwareBackend`] is the in-tree reference implementation, a CPU
//! compositor used by tests and headless tooling.

use crate::error::ViewError;
use crate::frame::{PixelLayout, VideoFrame};
use crate::geometry::{DrawableSize, QuadVertices};
use crate::upscale::{BilinearUpscaler, Upscaler};

// ── SurfaceCapabilities ──────────────────────────────────────────

/// What the surface's backend/platform combination can do. Drives
/// presenter variant selection and pointer bridging, replacing
/// compile-time platform conditionals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceCapabilities {
    /// A spatial upscaling pass is available.
    pub spatial_upscaling: bool,
    /// The platform reports pointer/keyboard input (handheld and
    /// desktop form factors; TV-style surfaces report false).
    pub pointer_input: bool,
}

// ── RenderBackend ────────────────────────────────────────────────

/// The composition seam wrapping a platform drawable.
///
/// All methods run on the render callback thread; implementations do
/// not need internal locking.
pub trait RenderBackend: Send {
    fn capabilities(&self) -> SurfaceCapabilities;

    /// Upload the frame's planes into sampleable textures, replacing
    /// the previous contents. Allocation is the backend's concern; a
    /// layout or size change reallocates internally.
    fn upload(&mut self, frame: &VideoFrame) -> Result<(), ViewError>;

    /// Run the spatial upscaling pass, scaling the uploaded frame to
    /// `target_w x target_h`. Returns whether a pass was performed.
    fn run_upscale_pass(&mut self, target_w: u32, target_h: u32) -> Result<bool, ViewError> {
        let _ = (target_w, target_h);
        Ok(false)
    }

    /// Draw the quad, sampling the uploaded frame, into a target of
    /// the given size. Areas outside the quad are cleared to black.
    fn draw(&mut self, quad: &QuadVertices, target: DrawableSize) -> Result<(), ViewError>;

    /// Clear the target to the defined blank state (opaque black).
    fn clear(&mut self, target: DrawableSize) -> Result<(), ViewError>;

    /// Present the drawn target to the display.
    fn present(&mut self) -> Result<(), ViewError>;
}

impl RenderBackend for Box<dyn RenderBackend> {
    fn capabilities(&self) -> SurfaceCapabilities {
        (**self).capabilities()
    }
    fn upload(&mut self, frame: &VideoFrame) -> Result<(), ViewError> {
        (**self).upload(frame)
    }
    fn run_upscale_pass(&mut self, target_w: u32, target_h: u32) -> Result<bool, ViewError> {
        (**self).run_upscale_pass(target_w, target_h)
    }
    fn draw(&mut self, quad: &QuadVertices, target: DrawableSize) -> Result<(), ViewError> {
        (**self).draw(quad, target)
    }
    fn clear(&mut self, target: DrawableSize) -> Result<(), ViewError> {
        (**self).clear(target)
    }
    fn present(&mut self) -> Result<(), ViewError> {
        (**self).present()
    }
}

// ── SoftwareImage ────────────────────────────────────────────────

/// A CPU-side RGBA8 image.
#[derive(Debug, Clone, PartialEq)]
pub struct SoftwareImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl SoftwareImage {
    /// Opaque black image.
    pub fn new(width: u32, height: u32) -> Self {
        let mut pixels = vec![0u8; width as usize * height as usize * 4];
        for px in pixels.chunks_exact_mut(4) {
            px[3] = 0xFF;
        }
        Self { width, height, pixels }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let off = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[off],
            self.pixels[off + 1],
            self.pixels[off + 2],
            self.pixels[off + 3],
        ]
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, px: [u8; 4]) {
        let off = (y as usize * self.width as usize + x as usize) * 4;
        self.pixels[off..off + 4].copy_from_slice(&px);
    }

    /// Bilinear sample at normalized coordinates, edges clamped.
    pub fn sample_bilinear(&self, u: f32, v: f32) -> [u8; 4] {
        if self.width == 0 || self.height == 0 {
            return [0, 0, 0, 0xFF];
        }
        let max_x = (self.width - 1) as f32;
        let max_y = (self.height - 1) as f32;
        let tx = (u * self.width as f32 - 0.5).clamp(0.0, max_x);
        let ty = (v * self.height as f32 - 0.5).clamp(0.0, max_y);

        let x0 = tx.floor() as u32;
        let y0 = ty.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let fx = tx - x0 as f32;
        let fy = ty - y0 as f32;

        let p00 = self.pixel(x0, y0);
        let p10 = self.pixel(x1, y0);
        let p01 = self.pixel(x0, y1);
        let p11 = self.pixel(x1, y1);

        let mut out = [0u8; 4];
        for c in 0..4 {
            let top = p00[c] as f32 * (1.0 - fx) + p10[c] as f32 * fx;
            let bottom = p01[c] as f32 * (1.0 - fx) + p11[c] as f32 * fx;
            out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
        }
        out
    }
}

// ── SoftwareBackend ──────────────────────────────────────────────

/// CPU compositor implementing [`RenderBackend`].
///
/// `upload` converts the frame's planes into an RGBA staging image
/// (the "texture"); `draw` samples it bilinearly into the video
/// rectangle of an RGBA framebuffer, leaving the bars black.
#[derive(Debug)]
pub struct SoftwareBackend {
    caps: SurfaceCapabilities,
    staging: Option<SoftwareImage>,
    framebuffer: SoftwareImage,
    presented: u64,
}

impl SoftwareBackend {
    pub fn new() -> Self {
        Self::with_capabilities(SurfaceCapabilities {
            spatial_upscaling: true,
            pointer_input: true,
        })
    }

    /// Backend with explicit capabilities, for variant-selection tests
    /// and TV-style surfaces.
    pub fn with_capabilities(caps: SurfaceCapabilities) -> Self {
        Self {
            caps,
            staging: None,
            framebuffer: SoftwareImage::new(0, 0),
            presented: 0,
        }
    }

    /// The last drawn target.
    pub fn framebuffer(&self) -> &SoftwareImage {
        &self.framebuffer
    }

    /// The uploaded (and possibly upscaled) frame texture, if any.
    pub fn staging(&self) -> Option<&SoftwareImage> {
        self.staging.as_ref()
    }

    /// Number of completed presents.
    pub fn presented(&self) -> u64 {
        self.presented
    }

    fn ensure_target(&mut self, target: DrawableSize) {
        if self.framebuffer.width() != target.width || self.framebuffer.height() != target.height {
            self.framebuffer = SoftwareImage::new(target.width, target.height);
        }
    }

    fn fill_black(&mut self) {
        let (w, h) = (self.framebuffer.width(), self.framebuffer.height());
        for y in 0..h {
            for x in 0..w {
                self.framebuffer.put_pixel(x, y, [0, 0, 0, 0xFF]);
            }
        }
    }

    fn convert_packed(frame: &VideoFrame, swap_rb: bool) -> SoftwareImage {
        let mut img = SoftwareImage::new(frame.width, frame.height);
        let plane = &frame.planes[0];
        let stride = plane.stride as usize;
        for y in 0..frame.height {
            let row = &plane.data[y as usize * stride..];
            for x in 0..frame.width {
                let off = x as usize * 4;
                let (b0, b1, b2, b3) = (row[off], row[off + 1], row[off + 2], row[off + 3]);
                let px = if swap_rb {
                    [b2, b1, b0, b3]
                } else {
                    [b0, b1, b2, b3]
                };
                img.put_pixel(x, y, px);
            }
        }
        img
    }

    /// BT.601 limited-range biplanar conversion.
    fn convert_nv12(frame: &VideoFrame) -> SoftwareImage {
        let mut img = SoftwareImage::new(frame.width, frame.height);
        let luma = &frame.planes[0];
        let chroma = &frame.planes[1];
        let l_stride = luma.stride as usize;
        let c_stride = chroma.stride as usize;

        for y in 0..frame.height {
            let c_row = &chroma.data[(y / 2) as usize * c_stride..];
            let l_row = &luma.data[y as usize * l_stride..];
            for x in 0..frame.width {
                let yv = l_row[x as usize] as f32;
                let c_off = (x / 2) as usize * 2;
                let cb = c_row[c_off] as f32 - 128.0;
                let cr = c_row[c_off + 1] as f32 - 128.0;

                let yl = (yv - 16.0) * 1.164;
                let r = yl + 1.596 * cr;
                let g = yl - 0.392 * cb - 0.813 * cr;
                let b = yl + 2.017 * cb;

                img.put_pixel(
                    x,
                    y,
                    [
                        r.round().clamp(0.0, 255.0) as u8,
                        g.round().clamp(0.0, 255.0) as u8,
                        b.round().clamp(0.0, 255.0) as u8,
                        0xFF,
                    ],
                );
            }
        }
        img
    }
}

impl Default for SoftwareBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for SoftwareBackend {
    fn capabilities(&self) -> SurfaceCapabilities {
        self.caps
    }

    fn upload(&mut self, frame: &VideoFrame) -> Result<(), ViewError> {
        frame.validate()?;
        let img = match frame.layout {
            PixelLayout::Rgba8 => Self::convert_packed(frame, false),
            PixelLayout::Bgra8 => Self::convert_packed(frame, true),
            PixelLayout::Nv12 => Self::convert_nv12(frame),
        };
        self.staging = Some(img);
        Ok(())
    }

    fn run_upscale_pass(&mut self, target_w: u32, target_h: u32) -> Result<bool, ViewError> {
        if !self.caps.spatial_upscaling || target_w == 0 || target_h == 0 {
            return Ok(false);
        }
        let Some(src) = self.staging.as_ref() else {
            return Ok(false);
        };
        if src.width() >= target_w && src.height() >= target_h {
            return Ok(false);
        }
        self.staging = Some(BilinearUpscaler.upscale(src, target_w, target_h));
        Ok(true)
    }

    fn draw(&mut self, quad: &QuadVertices, target: DrawableSize) -> Result<(), ViewError> {
        self.ensure_target(target);
        self.fill_black();

        let Some(staging) = self.staging.take() else {
            // Nothing uploaded yet — the cleared target is the blank state.
            return Ok(());
        };

        // Strip quad corners: [0] top-left, [3] bottom-right. Map NDC
        // back to target pixels.
        let tw = target.width as f32;
        let th = target.height as f32;
        let left = (quad[0].position[0] + 1.0) / 2.0 * tw;
        let top = (1.0 - quad[0].position[1]) / 2.0 * th;
        let right = (quad[3].position[0] + 1.0) / 2.0 * tw;
        let bottom = (1.0 - quad[3].position[1]) / 2.0 * th;

        let (u0, v0) = (quad[0].tex_coords[0], quad[0].tex_coords[1]);
        let (u1, v1) = (quad[3].tex_coords[0], quad[3].tex_coords[1]);

        let x_start = left.max(0.0).floor() as u32;
        let x_end = (right.min(tw).ceil() as u32).min(target.width);
        let y_start = top.max(0.0).floor() as u32;
        let y_end = (bottom.min(th).ceil() as u32).min(target.height);

        let span_x = (right - left).max(f32::EPSILON);
        let span_y = (bottom - top).max(f32::EPSILON);

        for y in y_start..y_end {
            let v = v0 + (v1 - v0) * ((y as f32 + 0.5 - top) / span_y);
            for x in x_start..x_end {
                let u = u0 + (u1 - u0) * ((x as f32 + 0.5 - left) / span_x);
                let px = staging.sample_bilinear(u, v);
                self.framebuffer.put_pixel(x, y, px);
            }
        }

        self.staging = Some(staging);
        Ok(())
    }

    fn clear(&mut self, target: DrawableSize) -> Result<(), ViewError> {
        self.ensure_target(target);
        self.fill_black();
        Ok(())
    }

    fn present(&mut self) -> Result<(), ViewError> {
        self.presented += 1;
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────
