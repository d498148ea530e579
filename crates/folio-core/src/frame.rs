//! Frame scheduling.
//!
//! `FrameLoop` stands in for the host's animation-frame callback: callbacks
//! registered with `request` run once per `tick` until cancelled. Callbacks
//! registered with `request_while` also drop out once they return `false`.

use tracing::trace;

/// Handle to a registered frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

type FrameCallback = Box<dyn FnMut(f64) -> bool>;

#[derive(Default)]
pub struct FrameLoop {
    next_id: u64,
    callbacks: Vec<(FrameHandle, FrameCallback)>,
    frames: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a recurring callback that receives the frame time in ms.
    pub fn request(&mut self, mut callback: impl FnMut(f64) + 'static) -> FrameHandle {
        self.request_while(move |now_ms| {
            callback(now_ms);
            true
        })
    }

    /// Registers a callback that stays registered while it returns `true`.
    pub fn request_while(&mut self, callback: impl FnMut(f64) -> bool + 'static) -> FrameHandle {
        let handle = FrameHandle(self.next_id);
        self.next_id += 1;
        self.callbacks.push((handle, Box::new(callback)));
        handle
    }

    /// Removes a callback. Returns `false` if it was not registered.
    pub fn cancel(&mut self, handle: FrameHandle) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(h, _)| *h != handle);
        before != self.callbacks.len()
    }

    pub fn is_registered(&self, handle: FrameHandle) -> bool {
        self.callbacks.iter().any(|(h, _)| *h == handle)
    }

    /// Runs every registered callback once, in registration order, and
    /// drops the ones that asked to stop.
    pub fn tick(&mut self, now_ms: f64) {
        self.frames += 1;
        trace!(frame = self.frames, now_ms, callbacks = self.callbacks.len(), "frame");
        self.callbacks.retain_mut(|(handle, callback)| {
            let keep = callback(now_ms);
            if !keep {
                trace!(?handle, "frame callback finished");
            }
            keep
        });
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }

    /// Number of ticks run so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl std::fmt::Debug for FrameLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameLoop")
            .field("callbacks", &self.callbacks.len())
            .field("frames", &self.frames)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn callbacks_run_every_tick_until_cancelled() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut frames = FrameLoop::new();

        let sink = seen.clone();
        let handle = frames.request(move |now| sink.borrow_mut().push(now));
        frames.tick(0.0);
        frames.tick(16.0);
        assert!(frames.cancel(handle));
        assert!(!frames.cancel(handle));
        frames.tick(32.0);

        assert_eq!(*seen.borrow(), vec![0.0, 16.0]);
        assert_eq!(frames.callback_count(), 0);
        assert_eq!(frames.frames(), 3);
    }

    #[test]
    fn finished_callbacks_drop_out_on_tick() {
        let mut frames = FrameLoop::new();
        let mut left = 2;
        let handle = frames.request_while(move |_| {
            left -= 1;
            left > 0
        });
        frames.tick(0.0);
        assert!(frames.is_registered(handle));
        frames.tick(16.0);
        assert!(!frames.is_registered(handle));
        assert_eq!(frames.callback_count(), 0);
    }
}
