/*!
Interrupt routing: `send_interrupt` resolves a target device id to a slot
and forwards the code to its `InterruptSink` capability, if any.
*/

use super::slot::DeviceSlot;
use crate::error::MotherboardError;

/// Route `code` to the device with id `target_device_id`. Dropped silently
/// if the target has no `InterruptSink` capability; `UnknownDevice` if no
/// slot has that id.
pub(crate) fn send_interrupt(
    slots: &[DeviceSlot],
    target_device_id: u32,
    code: u32,
) -> Result<(), MotherboardError> {
    let slot = slots
        .iter()
        .find(|s| s.device_id == target_device_id)
        .ok_or(MotherboardError::UnknownDevice(target_device_id))?;

    if let Some(sink) = slot.device.interrupt_sink() {
        let rc = sink.interrupt(code);
        log::trace!(
            "send_interrupt: device {} <- code {} (rc {})",
            target_device_id,
            code,
            rc
        );
    } else {
        log::debug!(
            "send_interrupt: device {} has no interrupt sink, dropping code {}",
            target_device_id,
            code
        );
    }
    Ok(())
}
