//! Decoded frame types and the cross-thread frame slot.
//!
//! These are **internal** presentation-side representations. The decode
//! pipeline produces [`VideoFrame`]s and hands them over through a
//! [`FrameSlot`]; the presenter takes the most recent one per draw.
//! Frames are never mutated after submission, and plane storage is
//! shared ([`bytes::Bytes`]) so a submit is a constant-time handoff.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use tokio::sync::watch;

use crate::error::ViewError;

// ── PixelLayout ──────────────────────────────────────────────────

/// Pixel layout of a decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelLayout {
    /// 4 bytes per pixel, packed: Blue, Green, Red, Alpha.
    Bgra8,
    /// 4 bytes per pixel, packed: Red, Green, Blue, Alpha.
    Rgba8,
    /// Biplanar YUV 4:2:0: full-resolution luma plane followed by a
    /// half-resolution interleaved CbCr plane.
    Nv12,
}

impl PixelLayout {
    /// Number of planes a frame in this layout carries.
    pub const fn plane_count(self) -> usize {
        match self {
            PixelLayout::Bgra8 | PixelLayout::Rgba8 => 1,
            PixelLayout::Nv12 => 2,
        }
    }

    /// Minimum row stride in bytes for the given plane.
    pub fn min_stride(self, plane: usize, width: u32) -> usize {
        match (self, plane) {
            (PixelLayout::Bgra8 | PixelLayout::Rgba8, 0) => width as usize * 4,
            // Luma: one byte per pixel.
            (PixelLayout::Nv12, 0) => width as usize,
            // Chroma: one CbCr pair per 2x2 block, two bytes per pair.
            (PixelLayout::Nv12, 1) => (width as usize).div_ceil(2) * 2,
            _ => 0,
        }
    }

    /// Number of rows the given plane holds.
    pub fn plane_rows(self, plane: usize, height: u32) -> usize {
        match (self, plane) {
            (PixelLayout::Nv12, 1) => (height as usize).div_ceil(2),
            _ => height as usize,
        }
    }
}

// ── VideoFrame ───────────────────────────────────────────────────

/// One plane of a decoded frame.
#[derive(Debug, Clone)]
pub struct FramePlane {
    /// Plane bytes — `rows * stride`, rows may be padded.
    pub data: Bytes,
    /// Row pitch in bytes (may exceed the minimum stride).
    pub stride: u32,
}

/// An immutable decoded video frame.
///
/// Cloning shares the plane storage; the presenter keeps a clone of the
/// last drawable frame so redraws never require the decode pipeline to
/// hold buffers for us.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel layout.
    pub layout: PixelLayout,
    /// Plane data, `layout.plane_count()` entries.
    pub planes: Vec<FramePlane>,
}

impl VideoFrame {
    /// Build a single-plane packed frame with a tight stride.
    ///
    /// # Panics
    ///
    /// Panics if `layout` is planar; use explicit planes for those.
    pub fn packed(width: u32, height: u32, layout: PixelLayout, data: Bytes) -> Self {
        assert_eq!(layout.plane_count(), 1, "packed frame from planar layout");
        let stride = layout.min_stride(0, width) as u32;
        Self {
            width,
            height,
            layout,
            planes: vec![FramePlane { data, stride }],
        }
    }

    /// Check plane count, strides and plane sizes against the layout.
    ///
    /// An invalid frame is a per-frame error: the presenter logs it and
    /// keeps the previous frame on screen.
    pub fn validate(&self) -> Result<(), ViewError> {
        if self.width == 0 || self.height == 0 {
            return Err(ViewError::InvalidFrame("zero dimension"));
        }
        if self.planes.len() != self.layout.plane_count() {
            return Err(ViewError::InvalidFrame("wrong plane count"));
        }
        for (i, plane) in self.planes.iter().enumerate() {
            let min_stride = self.layout.min_stride(i, self.width);
            if (plane.stride as usize) < min_stride {
                return Err(ViewError::InvalidFrame("stride below minimum"));
            }
            let need = plane.stride as usize * self.layout.plane_rows(i, self.height);
            if plane.data.len() < need {
                return Err(ViewError::PlaneTooShort {
                    plane: i,
                    len: plane.data.len(),
                    need,
                });
            }
        }
        Ok(())
    }
}

// ── FrameSlot ────────────────────────────────────────────────────

/// Create a connected slot/receiver pair.
pub fn frame_slot() -> (FrameSlot, FrameReceiver) {
    let (tx, rx) = watch::channel(None);
    let submitted = Arc::new(AtomicU64::new(0));
    (
        FrameSlot {
            tx,
            submitted: Arc::clone(&submitted),
        },
        FrameReceiver { rx, submitted },
    )
}

/// Producer half of the frame handoff.
///
/// This is the sole cross-thread handoff point between the decode
/// pipeline and the draw callback. A submit is non-blocking and
/// last-writer-wins: it overwrites any previously submitted frame that
/// has not been drawn yet. Frame drops under backpressure are expected;
/// visual freshness outweighs completeness.
#[derive(Debug)]
pub struct FrameSlot {
    tx: watch::Sender<Option<VideoFrame>>,
    submitted: Arc<AtomicU64>,
}

impl FrameSlot {
    /// Publish the most recent decoded frame. Constant time; never
    /// blocks on the render thread's pace.
    pub fn submit(&self, frame: VideoFrame) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
        let _ = self.tx.send(Some(frame));
    }

    /// Total frames submitted since construction.
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }
}

/// Consumer half, owned by the presenter.
#[derive(Debug)]
pub struct FrameReceiver {
    rx: watch::Receiver<Option<VideoFrame>>,
    submitted: Arc<AtomicU64>,
}

impl FrameReceiver {
    /// Take the latest frame if one arrived since the last take.
    ///
    /// Returns `None` when nothing new was submitted; the caller then
    /// re-draws its previous frame. A final frame published right
    /// before the producer went away is still delivered.
    pub fn take_latest(&mut self) -> Option<VideoFrame> {
        let value = self.rx.borrow_and_update();
        if value.has_changed() {
            (*value).clone()
        } else {
            None
        }
    }

    /// Total frames submitted into the slot so far.
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn bgra_frame(w: u32, h: u32, fill: u8) -> VideoFrame {
        VideoFrame::packed(
            w,
            h,
            PixelLayout::Bgra8,
            Bytes::from(vec![fill; (w * h * 4) as usize]),
        )
    }

    #[test]
    fn only_last_submitted_frame_is_taken() {
        let (slot, mut rx) = frame_slot();
        slot.submit(bgra_frame(2, 2, 1));
        slot.submit(bgra_frame(2, 2, 2));
        slot.submit(bgra_frame(4, 4, 3));

        let taken = rx.take_latest().unwrap();
        assert_eq!(taken.width, 4);
        assert_eq!(taken.planes[0].data[0], 3);

        // Nothing new since — the previous frame stays current.
        assert!(rx.take_latest().is_none());
        assert_eq!(rx.submitted(), 3);
    }

    #[test]
    fn empty_slot_yields_nothing() {
        let (_slot, mut rx) = frame_slot();
        assert!(rx.take_latest().is_none());
    }

    #[test]
    fn take_after_sender_drop_is_safe() {
        let (slot, mut rx) = frame_slot();
        slot.submit(bgra_frame(2, 2, 9));
        drop(slot);
        // The already-published frame is still observable once.
        assert!(rx.take_latest().is_some());
        assert!(rx.take_latest().is_none());
    }

    #[test]
    fn validate_accepts_tight_packed_frame() {
        assert!(bgra_frame(640, 480, 0).validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_dimension() {
        let f = VideoFrame {
            width: 0,
            height: 480,
            layout: PixelLayout::Bgra8,
            planes: vec![FramePlane { data: Bytes::new(), stride: 0 }],
        };
        assert!(matches!(f.validate(), Err(ViewError::InvalidFrame(_))));
    }

    #[test]
    fn validate_rejects_short_plane() {
        let f = VideoFrame {
            width: 4,
            height: 4,
            layout: PixelLayout::Rgba8,
            planes: vec![FramePlane {
                data: Bytes::from(vec![0u8; 10]),
                stride: 16,
            }],
        };
        assert!(matches!(f.validate(), Err(ViewError::PlaneTooShort { .. })));
    }

    #[test]
    fn validate_rejects_wrong_plane_count() {
        let f = VideoFrame {
            width: 4,
            height: 4,
            layout: PixelLayout::Nv12,
            planes: vec![FramePlane {
                data: Bytes::from(vec![0u8; 16]),
                stride: 4,
            }],
        };
        assert!(matches!(f.validate(), Err(ViewError::InvalidFrame(_))));
    }

    #[test]
    fn nv12_plane_geometry() {
        // 6x4: luma 6 bytes/row x 4 rows, chroma 6 bytes/row x 2 rows.
        assert_eq!(PixelLayout::Nv12.min_stride(0, 6), 6);
        assert_eq!(PixelLayout::Nv12.min_stride(1, 6), 6);
        assert_eq!(PixelLayout::Nv12.plane_rows(0, 4), 4);
        assert_eq!(PixelLayout::Nv12.plane_rows(1, 4), 2);

        // Odd dimensions round the chroma plane up.
        assert_eq!(PixelLayout::Nv12.min_stride(1, 5), 6);
        assert_eq!(PixelLayout::Nv12.plane_rows(1, 5), 3);

        let f = VideoFrame {
            width: 6,
            height: 4,
            layout: PixelLayout::Nv12,
            planes: vec![
                FramePlane { data: Bytes::from(vec![0u8; 24]), stride: 6 },
                FramePlane { data: Bytes::from(vec![0u8; 12]), stride: 6 },
            ],
        };
        assert!(f.validate().is_ok());
    }
}
