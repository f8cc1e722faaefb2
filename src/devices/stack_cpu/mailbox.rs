/*!
`Mailbox`: the hardware-interrupt FIFO. A classic mutex-protected queue —
no lock-free structure is warranted for a handful of pending interrupt
codes.
*/

use std::collections::VecDeque;
use std::sync::Mutex;

pub(crate) struct Mailbox {
    queue: Mutex<VecDeque<u32>>,
}

impl Mailbox {
    pub(crate) fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }

    /// Enqueue `code`. Called from any device's thread via `interrupt`.
    pub(crate) fn push(&self, code: u32) {
        self.queue.lock().expect("mailbox mutex poisoned").push_back(code);
    }

    /// Dequeue the oldest pending code, if any. Called from the CPU's own
    /// dispatch loop.
    pub(crate) fn pop(&self) -> Option<u32> {
        self.queue.lock().expect("mailbox mutex poisoned").pop_front()
    }

    pub(crate) fn clear(&self) {
        self.queue.lock().expect("mailbox mutex poisoned").clear();
    }
}
