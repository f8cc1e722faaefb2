/*!
`DeviceSlot`: a single entry in the motherboard's fixed-capacity device
table.
*/

use std::sync::Arc;

use crate::device::Device;

/// One registered device plus the attributes the fabric cached about it at
/// `add_device` time (so routing never has to re-invoke `device_type`/
/// `export_memory_size` on the hot path).
pub(crate) struct DeviceSlot {
    pub(crate) device: Arc<dyn Device>,
    pub(crate) device_id: u32,
    pub(crate) device_type: u64,
    pub(crate) export_memory_size: u32,
}

impl DeviceSlot {
    pub(crate) fn new(device: Arc<dyn Device>, device_id: u32) -> Self {
        let device_type = device.device_type();
        let export_memory_size = device.export_memory_size();
        Self {
            device,
            device_id,
            device_type,
            export_memory_size,
        }
    }
}
