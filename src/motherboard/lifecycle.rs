/*!
Boot/halt/reboot orchestration.

The sequence is: register -> init -> reset -> spawn boot threads -> join ->
cleanup. A nonzero return from `register_motherboard`, `init`, or `reset`
aborts the sequence; devices already initialized are cleaned up in reverse
insertion order before the error is returned. Normal (non-aborted) cleanup
at the end of a full run instead walks slots in insertion order — the two
orders are intentionally different.
*/

use std::sync::{Arc, Weak};
use std::thread;

use super::slot::DeviceSlot;
use super::Motherboard;
use crate::device::HostCallbacks;
use crate::error::MotherboardError;

pub(crate) fn register_all(
    slots: &[DeviceSlot],
    motherboard: &Weak<Motherboard>,
) -> Result<(), MotherboardError> {
    for slot in slots {
        let callbacks = HostCallbacks::new(motherboard.clone());
        let rc = slot.device.register_motherboard(slot.device_id, callbacks);
        log::debug!("device {} register_motherboard -> {}", slot.device_id, rc);
        if rc != 0 {
            return Err(MotherboardError::RegisterFailed {
                device_id: slot.device_id,
                code: rc,
            });
        }
    }
    Ok(())
}

pub(crate) fn init_all(slots: &[DeviceSlot]) -> Result<(), MotherboardError> {
    for (i, slot) in slots.iter().enumerate() {
        let rc = slot.device.init();
        log::debug!("device {} init -> {}", slot.device_id, rc);
        if rc != 0 {
            cleanup_reverse(&slots[..i]);
            return Err(MotherboardError::InitFailed {
                device_id: slot.device_id,
                code: rc,
            });
        }
    }
    Ok(())
}

pub(crate) fn reset_all(slots: &[DeviceSlot]) -> Result<(), MotherboardError> {
    for slot in slots {
        let rc = slot.device.reset();
        log::debug!("device {} reset -> {}", slot.device_id, rc);
        if rc != 0 {
            // Every slot has already passed init by the time reset runs, so
            // the abort cleanup walks the full table.
            cleanup_reverse(slots);
            return Err(MotherboardError::ResetFailed {
                device_id: slot.device_id,
                code: rc,
            });
        }
    }
    Ok(())
}

pub(crate) fn cleanup_reverse(slots: &[DeviceSlot]) {
    for slot in slots.iter().rev() {
        let rc = slot.device.cleanup();
        log::debug!("device {} cleanup (abort path) -> {}", slot.device_id, rc);
    }
}

pub(crate) fn cleanup_forward(slots: &[DeviceSlot]) {
    for slot in slots {
        let rc = slot.device.cleanup();
        log::debug!("device {} cleanup -> {}", slot.device_id, rc);
    }
}

/// Spawn one thread per `Runnable` slot, run its `boot`, and wait for all of
/// them to return. Slots without a `Runnable` capability contribute no
/// thread.
pub(crate) fn run_boot_threads(slots: &[DeviceSlot]) {
    thread::scope(|scope| {
        let mut handles = Vec::new();
        for slot in slots {
            if slot.device.runnable().is_none() {
                continue;
            }
            let device: Arc<dyn crate::device::Device> = Arc::clone(&slot.device);
            let device_id = slot.device_id;
            handles.push(scope.spawn(move || {
                // Re-borrow the capability inside the thread: the Arc clone
                // keeps the device alive for the scope's duration, so this
                // borrow is trivially valid.
                let rc = device
                    .runnable()
                    .expect("checked above")
                    .boot();
                log::info!("device {} boot returned {}", device_id, rc);
                rc
            }));
        }
        for handle in handles {
            let _ = handle.join();
        }
    });
}

/// Call `halt` on every `Runnable` slot. Best-effort: a device that never
/// returns from `boot` hangs the motherboard regardless.
pub(crate) fn halt_all(slots: &[DeviceSlot]) {
    for slot in slots {
        if let Some(runnable) = slot.device.runnable() {
            let rc = runnable.halt();
            log::debug!("device {} halt -> {}", slot.device_id, rc);
        }
    }
}
