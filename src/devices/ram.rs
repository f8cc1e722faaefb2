/*!
`RamDevice`: a linear byte buffer behind the standard device contract. No
mirroring, no banking — every local address in `0..memory_size` maps to
exactly one byte.
*/

use std::sync::Mutex;

use crate::device::{Device, HostCallbacks, RAM_DEVICE_TYPE};
use crate::error::DeviceConfigError;

/// Configuration for [`RamDevice::new`].
pub struct RamConfig {
    pub memory_size: u32,
}

/// A plain linear memory device.
pub struct RamDevice {
    memory: Mutex<Vec<u8>>,
    memory_size: u32,
}

impl RamDevice {
    /// Allocate `config.memory_size` bytes, zero-initialized.
    pub fn new(config: &RamConfig) -> Result<Self, DeviceConfigError> {
        if config.memory_size == 0 {
            return Err(DeviceConfigError::ZeroSizedField { field: "memory_size" });
        }
        Ok(Self {
            memory: Mutex::new(vec![0u8; config.memory_size as usize]),
            memory_size: config.memory_size,
        })
    }
}

impl Device for RamDevice {
    fn device_type(&self) -> u64 {
        RAM_DEVICE_TYPE
    }

    fn export_memory_size(&self) -> u32 {
        self.memory_size
    }

    /// Best-effort fill: copies as many in-bounds bytes as `out` and the
    /// buffer's remaining length allow, leaving the rest of `out`
    /// untouched.
    fn load_bytes(&self, local_addr: u32, len: u32, out: &mut [u8]) -> i32 {
        let memory = self.memory.lock().expect("ram mutex poisoned");
        let start = local_addr as usize;
        if start >= memory.len() {
            return 0;
        }
        let n = (len as usize).min(out.len()).min(memory.len() - start);
        out[..n].copy_from_slice(&memory[start..start + n]);
        0
    }

    /// Best-effort write: copies as many in-bounds bytes from `data` as fit,
    /// dropping the remainder.
    fn write_bytes(&self, local_addr: u32, len: u32, data: &[u8]) -> i32 {
        let mut memory = self.memory.lock().expect("ram mutex poisoned");
        let start = local_addr as usize;
        if start >= memory.len() {
            return 0;
        }
        let n = (len as usize).min(data.len()).min(memory.len() - start);
        memory[start..start + n].copy_from_slice(&data[..n]);
        0
    }

    fn register_motherboard(&self, _device_id: u32, _callbacks: HostCallbacks) -> i32 {
        0
    }
}
