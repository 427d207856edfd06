//! # Redraw Batching
//!
//! Many mutations can request a redraw within a single frame. [`Batch`] queues those
//! requests and asks the host's [`FrameScheduler`] for one animation tick; when the
//! tick fires, every queued callback runs once, in insertion order.
//!
//! Requests may carry a key. A keyed request replaces the queued callback with the same
//! key in place: the newest callback wins but keeps the position of the first request.
//!
//! Each `add` cancels the pending tick and requests a new one, so only the most recent
//! request's tick survives.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Handle of a scheduled animation tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Host capability: "run before the next repaint" and "never mind".
pub trait FrameScheduler {
    /// Requests a tick. The host later calls [`Scene::run_frame`](crate::scene::Scene::run_frame)
    /// with the returned handle.
    fn request_frame(&mut self) -> FrameHandle;
    /// Cancels a tick that has not fired yet.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[derive(Debug, Default)]
struct ManualFramesState {
    next: u64,
    pending: Option<FrameHandle>,
    requested: usize,
    cancelled: usize,
}

/// A [`FrameScheduler`] driven by hand.
///
/// Clones share state, so a host (or test) can keep one clone to inspect and fire
/// frames while the scene owns the other.
#[derive(Clone, Debug, Default)]
pub struct ManualFrames {
    state: Rc<RefCell<ManualFramesState>>,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// The tick that would fire next, if any.
    pub fn pending(&self) -> Option<FrameHandle> {
        self.state.borrow().pending
    }

    /// Total number of ticks requested so far.
    pub fn requested(&self) -> usize {
        self.state.borrow().requested
    }

    /// Total number of ticks cancelled so far.
    pub fn cancelled(&self) -> usize {
        self.state.borrow().cancelled
    }

    /// Takes the pending tick, as if the host's animation frame fired.
    pub fn fire(&self) -> Option<FrameHandle> {
        self.state.borrow_mut().pending.take()
    }
}

impl FrameScheduler for ManualFrames {
    fn request_frame(&mut self) -> FrameHandle {
        let mut state = self.state.borrow_mut();
        state.next += 1;
        state.requested += 1;
        let handle = FrameHandle(state.next);
        state.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut state = self.state.borrow_mut();
        state.cancelled += 1;
        if state.pending == Some(handle) {
            state.pending = None;
        }
    }
}

/// A deferred callback run against the batch's context.
pub type BatchCallback<C> = Box<dyn FnOnce(&mut C)>;

struct BatchEntry<C, K> {
    key: Option<K>,
    callback: BatchCallback<C>,
}

/// Coalescing queue of callbacks run on the next animation tick.
pub struct Batch<C, K> {
    queue: Vec<BatchEntry<C, K>>,
    pending: Option<FrameHandle>,
    scheduler: Box<dyn FrameScheduler>,
}

impl<C, K: fmt::Debug> fmt::Debug for Batch<C, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Batch")
            .field("queued", &self.queue.len())
            .field("keys", &self.queue.iter().map(|e| &e.key).collect::<Vec<_>>())
            .field("pending", &self.pending)
            .finish()
    }
}

impl<C, K: PartialEq> Batch<C, K> {
    pub fn new(scheduler: Box<dyn FrameScheduler>) -> Self {
        Self {
            queue: Vec::new(),
            pending: None,
            scheduler,
        }
    }

    /// Queues `callback` and (re)schedules the tick.
    pub fn add(&mut self, callback: impl FnOnce(&mut C) + 'static, key: Option<K>) {
        let callback: BatchCallback<C> = Box::new(callback);
        let existing = key
            .as_ref()
            .and_then(|k| self.queue.iter_mut().find(|e| e.key.as_ref() == Some(k)));
        match existing {
            Some(entry) => entry.callback = callback,
            None => self.queue.push(BatchEntry { key, callback }),
        }
        self.schedule();
    }

    fn schedule(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
        self.pending = Some(self.scheduler.request_frame());
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// The tick the queue is waiting on.
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Returns true if a callback with `key` is queued.
    pub fn contains_key(&self, key: &K) -> bool {
        self.queue.iter().any(|e| e.key.as_ref() == Some(key))
    }

    /// Claims the queue for the tick `handle`.
    ///
    /// Returns `None` for a stale or cancelled handle. Anything added after this call
    /// lands in a fresh queue and waits for the next tick.
    pub fn take_frame(&mut self, handle: FrameHandle) -> Option<Vec<BatchCallback<C>>> {
        if self.pending != Some(handle) {
            tracing::trace!(?handle, "ignoring stale frame");
            return None;
        }
        self.pending = None;
        Some(self.queue.drain(..).map(|e| e.callback).collect())
    }

    /// Runs the tick `handle` against `ctx`, returning how many callbacks ran.
    pub fn invoke(&mut self, handle: FrameHandle, ctx: &mut C) -> usize {
        let Some(callbacks) = self.take_frame(handle) else {
            return 0;
        };
        let count = callbacks.len();
        for callback in callbacks {
            callback(ctx);
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(frames: &ManualFrames) -> Batch<Vec<u32>, &'static str> {
        Batch::new(Box::new(frames.clone()))
    }

    #[test]
    fn unkeyed_callbacks_run_once_in_order() {
        let frames = ManualFrames::new();
        let mut batch = batch(&frames);
        for i in 0..5 {
            batch.add(move |log: &mut Vec<u32>| log.push(i), None);
        }
        assert_eq!(batch.len(), 5);
        assert_eq!(frames.requested(), 5);
        assert_eq!(frames.cancelled(), 4);

        let mut log = Vec::new();
        let handle = frames.fire().unwrap();
        assert_eq!(batch.invoke(handle, &mut log), 5);
        assert_eq!(log, vec![0, 1, 2, 3, 4]);
        assert!(batch.is_empty());
        assert_eq!(batch.invoke(handle, &mut log), 0);
    }

    #[test]
    fn same_key_keeps_only_the_latest_callback() {
        let frames = ManualFrames::new();
        let mut batch = batch(&frames);
        batch.add(|log: &mut Vec<u32>| log.push(1), Some("a"));
        batch.add(|log: &mut Vec<u32>| log.push(2), None);
        batch.add(|log: &mut Vec<u32>| log.push(3), Some("a"));
        assert_eq!(batch.len(), 2);
        assert!(batch.contains_key(&"a"));

        let mut log = Vec::new();
        batch.invoke(frames.fire().unwrap(), &mut log);
        assert_eq!(log, vec![3, 2]);
    }

    #[test]
    fn stale_handles_are_ignored() {
        let frames = ManualFrames::new();
        let mut batch = batch(&frames);
        batch.add(|log: &mut Vec<u32>| log.push(1), None);
        let first = batch.pending_frame().unwrap();
        batch.add(|log: &mut Vec<u32>| log.push(2), None);

        let mut log = Vec::new();
        assert_eq!(batch.invoke(first, &mut log), 0);
        assert!(log.is_empty());
        assert_eq!(batch.invoke(frames.fire().unwrap(), &mut log), 2);
        assert_eq!(log, vec![1, 2]);
    }
}
