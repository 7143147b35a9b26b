//! Cancelable next-frame and zero-delay task queue.
//!
//! The editor has two deferred behaviors: coalescing simulated group
//! transforms onto the next animation frame, and a zero-delay focus check
//! after a selection click. Both go through this queue. The host drains it
//! from its frame tick with [`FrameScheduler::flush`]; tasks queued while
//! flushing wait for the next flush.

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod scheduler_test;

use std::cell::{Cell, RefCell};
use std::fmt;

type Task = Box<dyn FnOnce()>;

/// Token for a queued task, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHandle(u64);

#[derive(Default)]
pub struct FrameScheduler {
    next_id: Cell<u64>,
    queue: RefCell<Vec<(FrameHandle, Task)>>,
}

impl fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameScheduler").field("pending", &self.pending()).finish()
    }
}

impl FrameScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, task: Task) -> FrameHandle {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let handle = FrameHandle(id);
        self.queue.borrow_mut().push((handle, task));
        handle
    }

    /// Run `task` on the next animation frame.
    pub fn request_frame(&self, task: impl FnOnce() + 'static) -> FrameHandle {
        self.push(Box::new(task))
    }

    /// Run `task` as soon as the current event has finished dispatching.
    pub fn defer(&self, task: impl FnOnce() + 'static) -> FrameHandle {
        self.push(Box::new(task))
    }

    /// Drop a queued task. Handles that already ran are ignored.
    pub fn cancel(&self, handle: FrameHandle) {
        self.queue.borrow_mut().retain(|(h, _)| *h != handle);
    }

    /// Run every task queued before this call, in order. Returns how many ran.
    pub fn flush(&self) -> usize {
        let tasks = std::mem::take(&mut *self.queue.borrow_mut());
        let count = tasks.len();
        for (_, task) in tasks {
            task();
        }
        count
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }
}
