//! Pass-through input routing.
//!
//! Every raw event received on the surface is forwarded, unmodified,
//! to a single owning sink. No gesture interpretation happens here —
//! the layer below runs its own recognizers instead of the platform's
//! default chain. No state machine: every event type maps 1:1 to a
//! forwarding call.

use starbeam_core::{KeyEvent, PointerEvent, TouchEvent};

/// The single consumer of raw surface input.
pub trait InputSink: Send {
    fn touch(&mut self, event: TouchEvent);
    fn pointer(&mut self, event: PointerEvent);
    fn key(&mut self, event: KeyEvent);
}

impl InputSink for Box<dyn InputSink> {
    fn touch(&mut self, event: TouchEvent) {
        (**self).touch(event);
    }
    fn pointer(&mut self, event: PointerEvent) {
        (**self).pointer(event);
    }
    fn key(&mut self, event: KeyEvent) {
        (**self).key(event);
    }
}

/// Forwards raw events 1:1 to the owning sink.
pub struct PassthroughRouter<S: InputSink> {
    sink: S,
}

impl<S: InputSink> PassthroughRouter<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn route_touch(&mut self, event: TouchEvent) {
        self.sink.touch(event);
    }

    pub fn route_pointer(&mut self, event: PointerEvent) {
        self.sink.pointer(event);
    }

    pub fn route_key(&mut self, event: KeyEvent) {
        self.sink.key(event);
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use starbeam_core::{Modifiers, TouchPhase};

    #[derive(Default)]
    struct Recorder {
        touches: Vec<TouchEvent>,
        pointers: Vec<PointerEvent>,
        keys: Vec<KeyEvent>,
    }

    impl InputSink for Recorder {
        fn touch(&mut self, event: TouchEvent) {
            self.touches.push(event);
        }
        fn pointer(&mut self, event: PointerEvent) {
            self.pointers.push(event);
        }
        fn key(&mut self, event: KeyEvent) {
            self.keys.push(event);
        }
    }

    #[test]
    fn every_event_is_forwarded_unmodified() {
        let mut router = PassthroughRouter::new(Recorder::default());

        let touch = TouchEvent { id: 7, phase: TouchPhase::Began, x: 10.0, y: 20.0 };
        let pointer = PointerEvent::Move { x: 1.5, y: 2.5 };
        let key = KeyEvent::press(0x41, Modifiers::SHIFT);

        router.route_touch(touch);
        router.route_pointer(pointer);
        router.route_key(key);

        assert_eq!(router.sink().touches, vec![touch]);
        assert_eq!(router.sink().pointers, vec![pointer]);
        assert_eq!(router.sink().keys, vec![key]);
    }

    #[test]
    fn ordering_is_preserved() {
        let mut router = PassthroughRouter::new(Recorder::default());
        for i in 0..5 {
            router.route_touch(TouchEvent {
                id: i,
                phase: TouchPhase::Moved,
                x: i as f32,
                y: 0.0,
            });
        }
        let ids: Vec<u64> = router.sink().touches.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }
}
