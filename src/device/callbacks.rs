/*!
`HostCallbacks`: the function table a motherboard lends to each device it
registers so it can read/write global memory and raise interrupts on peers.
*/

use std::sync::Weak;

use crate::motherboard::Motherboard;

/// Cloneable handle a device uses to talk back to the fabric that registered
/// it: read/write the global memory map, or send an interrupt to a peer.
///
/// Holds a [`Weak`] reference rather than a strong one so that a device
/// squirreling this away past the motherboard's own lifetime observes a
/// clean failure (`-1`) instead of keeping the motherboard alive forever via
/// a reference cycle.
#[derive(Clone)]
pub struct HostCallbacks {
    motherboard: Weak<Motherboard>,
}

impl HostCallbacks {
    pub(crate) fn new(motherboard: Weak<Motherboard>) -> Self {
        Self { motherboard }
    }

    /// Read `len` bytes of global memory starting at `global_addr` into
    /// `out`. Returns `0` on success, `-1` if the motherboard has since been
    /// destroyed.
    pub fn read_bytes(&self, global_addr: u64, len: u32, out: &mut [u8]) -> i32 {
        match self.motherboard.upgrade() {
            Some(mb) => mb.read_bytes(global_addr, len, out),
            None => -1,
        }
    }

    /// Write `len` bytes of global memory starting at `global_addr` from
    /// `data`. Returns `0` on success, `-1` if the motherboard has since
    /// been destroyed.
    pub fn write_bytes(&self, global_addr: u64, len: u32, data: &[u8]) -> i32 {
        match self.motherboard.upgrade() {
            Some(mb) => mb.write_bytes(global_addr, len, data),
            None => -1,
        }
    }

    /// Route an interrupt to `target_device_id`. Returns `0` on success, `1`
    /// if no such device is registered, `-1` if the motherboard has since
    /// been destroyed.
    pub fn send_interrupt(&self, target_device_id: u32, code: u32) -> i32 {
        match self.motherboard.upgrade() {
            Some(mb) => match mb.send_interrupt(target_device_id, code) {
                Ok(()) => 0,
                Err(_) => 1,
            },
            None => -1,
        }
    }
}
