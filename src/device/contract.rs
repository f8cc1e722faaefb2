/*!
`Device`, `Runnable`, and `InterruptSink`: the trait-based device contract.
*/

use super::callbacks::HostCallbacks;

/// Mandatory surface every device plugged into a [`crate::motherboard::Motherboard`]
/// implements.
///
/// `load_bytes`/`write_bytes`/`register_motherboard` are required. `init`,
/// `reset`, and `cleanup` default to a no-op success, matching devices (like a
/// pure interrupt sink with no exported memory) that have nothing to do at
/// those lifecycle points.
pub trait Device: Send + Sync {
    /// Opaque 64-bit tag identifying this device's class.
    fn device_type(&self) -> u64;

    /// Number of bytes this device contributes to the global memory map.
    /// `0` means the device is not memory-mapped.
    fn export_memory_size(&self) -> u32 {
        0
    }

    /// Load up to `len` bytes starting at `local_addr` into `out` (which is
    /// exactly `len` bytes long). Implementations should fill as much of
    /// `out` as is within bounds and silently ignore the rest — the caller
    /// (the motherboard) does not split requests across device boundaries.
    fn load_bytes(&self, local_addr: u32, len: u32, out: &mut [u8]) -> i32;

    /// Write up to `len` bytes from `data` (exactly `len` bytes long) starting
    /// at `local_addr`. Same best-effort/partial-fill contract as
    /// `load_bytes`.
    fn write_bytes(&self, local_addr: u32, len: u32, data: &[u8]) -> i32;

    /// Receive the host-callback table. Called once, before `init`, `reset`,
    /// or `boot`. `device_id` is the id the fabric assigned this device at
    /// `add_device` time.
    fn register_motherboard(&self, device_id: u32, callbacks: HostCallbacks) -> i32;

    /// Allocate/prepare resources ahead of the first `reset`. Device init
    /// order across slots is undefined.
    fn init(&self) -> i32 {
        0
    }

    /// Return the device to its power-on state. Called after `init`, and
    /// again on every `reboot`. Device reset order across slots is
    /// undefined.
    fn reset(&self) -> i32 {
        0
    }

    /// Release resources acquired in `init`. Called once boot has fully
    /// stopped. Device cleanup order across slots is undefined.
    fn cleanup(&self) -> i32 {
        0
    }

    /// `Some(self)` if this device wants its own boot thread.
    fn runnable(&self) -> Option<&dyn Runnable> {
        None
    }

    /// `Some(self)` if this device can receive interrupts.
    fn interrupt_sink(&self) -> Option<&dyn InterruptSink> {
        None
    }
}

/// Capability: a device that runs its own loop on a dedicated thread once
/// the motherboard boots, and can be asked (politely — there is no forced
/// termination) to stop.
pub trait Runnable: Send + Sync {
    /// Loop until shut down. Called once per motherboard boot, after `init`
    /// and `reset`. Other devices may be freely accessed from here.
    fn boot(&self) -> i32;

    /// Ask a running `boot` loop to return soon. Advisory: there is no forced
    /// termination, so a `boot` that never returns hangs the motherboard.
    fn halt(&self) -> i32;
}

/// Capability: a device that can receive interrupts from its peers.
pub trait InterruptSink: Send + Sync {
    /// Deliver an interrupt code. Must be safe to call concurrently from any
    /// number of other devices' threads.
    fn interrupt(&self, code: u32) -> i32;
}
