/*!
Motherboard fabric: device registration, the global memory map, interrupt
routing, and boot/halt/reboot orchestration.

Modules
=======
- `slot`: `DeviceSlot`, one entry in the fixed-capacity device table.
- `memory_map`: `MemoryMap`, the finalized global-address linearization.
- `interrupts`: `send_interrupt` routing.
- `lifecycle`: register/init/reset/boot-thread/cleanup orchestration.

Usage
=====
```no_run
use std::sync::Arc;
use bridgesim::device::Device;
use bridgesim::devices::ram::{RamConfig, RamDevice};
use bridgesim::devices::stack_cpu::{StackCpu, StackCpuConfig};
use bridgesim::motherboard::{Motherboard, MotherboardConfig};

let ram: Arc<dyn Device> = Arc::new(RamDevice::new(&RamConfig { memory_size: 0x1000 }).unwrap());
let cpu: Arc<dyn Device> = Arc::new(StackCpu::new(&StackCpuConfig { stack_size: 64 }).unwrap());

let mut mb = Motherboard::new(&MotherboardConfig { max_devices: 4 }).unwrap();
mb.add_device(ram).unwrap();
mb.add_device(cpu).unwrap();

let mb = Arc::new(mb);
mb.boot().unwrap();
```
*/

mod interrupts;
mod lifecycle;
mod memory_map;
mod slot;

use std::sync::{Arc, OnceLock};

use memory_map::MemoryMap;
use slot::DeviceSlot;

use crate::device::Device;
use crate::error::MotherboardError;

/// Per-device field rejected with [`MotherboardError::InvalidConfig`] if
/// `max_devices == 0`.
pub struct MotherboardConfig {
    pub max_devices: u32,
}

/// A motherboard: a fixed-capacity table of devices sharing one global
/// memory map and one interrupt bus.
pub struct Motherboard {
    max_devices: u32,
    slots: Vec<DeviceSlot>,
    memory_map: OnceLock<MemoryMap>,
}

impl Motherboard {
    /// Allocate a motherboard with room for `config.max_devices` devices.
    pub fn new(config: &MotherboardConfig) -> Result<Self, MotherboardError> {
        if config.max_devices == 0 {
            return Err(MotherboardError::InvalidConfig("max_devices must be nonzero"));
        }
        Ok(Self {
            max_devices: config.max_devices,
            slots: Vec::new(),
            memory_map: OnceLock::new(),
        })
    }

    /// Total number of device slots (the table's capacity).
    pub fn num_slots(&self) -> u32 {
        self.max_devices
    }

    /// Number of slots currently occupied.
    pub fn slots_filled(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Whether every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.slots_filled() == self.num_slots()
    }

    /// Plug a device in, assigning it the next sequential device id. Must be
    /// called before the motherboard is wrapped in an `Arc` and booted —
    /// the slot table is set up single-threaded and read-only thereafter.
    pub fn add_device(&mut self, device: Arc<dyn Device>) -> Result<u32, MotherboardError> {
        if self.is_full() {
            return Err(MotherboardError::Full);
        }
        let device_id = self.slots.len() as u32;
        self.slots.push(DeviceSlot::new(device, device_id));
        log::info!("device {} added to slot {}", device_id, device_id);
        Ok(device_id)
    }

    fn finalize_memory_map(&self) -> &MemoryMap {
        self.memory_map
            .get_or_init(|| MemoryMap::finalize(&self.slots))
    }

    /// Resolve `global_addr` to a slot and forward a read. Unmapped
    /// addresses are zero-filled.
    pub fn read_bytes(&self, global_addr: u64, len: u32, out: &mut [u8]) -> i32 {
        let map = self.finalize_memory_map();
        match map.resolve(global_addr) {
            Some(range) => {
                let local_addr = (global_addr - range.base) as u32;
                let slot = &self.slots[range.slot_index];
                let _ = slot.device.load_bytes(local_addr, len, out);
                0
            }
            None => {
                log::trace!("read_bytes: {:#x} is unmapped, returning zeros", global_addr);
                for byte in out.iter_mut().take(len as usize) {
                    *byte = 0;
                }
                0
            }
        }
    }

    /// Resolve `global_addr` to a slot and forward a write. Unmapped writes
    /// are dropped silently.
    pub fn write_bytes(&self, global_addr: u64, len: u32, data: &[u8]) -> i32 {
        let map = self.finalize_memory_map();
        match map.resolve(global_addr) {
            Some(range) => {
                let local_addr = (global_addr - range.base) as u32;
                let slot = &self.slots[range.slot_index];
                let _ = slot.device.write_bytes(local_addr, len, data);
                0
            }
            None => {
                log::trace!("write_bytes: {:#x} is unmapped, dropping", global_addr);
                0
            }
        }
    }

    /// Route an interrupt to `target_device_id`.
    pub fn send_interrupt(&self, target_device_id: u32, code: u32) -> Result<(), MotherboardError> {
        interrupts::send_interrupt(&self.slots, target_device_id, code)
    }

    /// Run the full boot lifecycle: finalize the memory map, register,
    /// init, reset, spawn every `Runnable` device's boot thread, and wait
    /// for them all to return, then clean up. Returns once every boot
    /// thread has exited, whether because a device shut itself down or
    /// because an external `halt` asked it to.
    pub fn boot(self: &Arc<Self>) -> Result<(), MotherboardError> {
        self.finalize_memory_map();

        let weak_self = Arc::downgrade(self);
        lifecycle::register_all(&self.slots, &weak_self)?;
        lifecycle::init_all(&self.slots)?;
        lifecycle::reset_all(&self.slots)?;

        lifecycle::run_boot_threads(&self.slots);

        lifecycle::cleanup_forward(&self.slots);
        Ok(())
    }

    /// Ask every `Runnable` device to stop. Advisory: a device that never
    /// returns from `boot` keeps its thread alive regardless.
    pub fn halt(&self) {
        lifecycle::halt_all(&self.slots);
    }

    /// `halt` followed by a fresh reset-through-boot, without re-running
    /// `register_motherboard`/`init` and without tearing devices down.
    ///
    /// Modeled as a call usable once a prior `boot()` has returned (rather
    /// than a live interrupt-driven restart of a `boot()` still blocked on
    /// thread joins) — see DESIGN.md Open Questions.
    pub fn reboot(&self) -> Result<(), MotherboardError> {
        self.halt();
        lifecycle::reset_all(&self.slots)?;
        lifecycle::run_boot_threads(&self.slots);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::ram::{RamConfig, RamDevice};

    #[test]
    fn rejects_zero_capacity() {
        let err = Motherboard::new(&MotherboardConfig { max_devices: 0 });
        assert!(matches!(err, Err(MotherboardError::InvalidConfig(_))));
    }

    #[test]
    fn add_device_tracks_capacity() {
        let mut mb = Motherboard::new(&MotherboardConfig { max_devices: 1 }).unwrap();
        assert_eq!(mb.slots_filled(), 0);
        assert!(!mb.is_full());

        let ram: Arc<dyn Device> =
            Arc::new(RamDevice::new(&RamConfig { memory_size: 16 }).unwrap());
        mb.add_device(ram.clone()).unwrap();
        assert_eq!(mb.slots_filled(), 1);
        assert!(mb.is_full());

        let err = mb.add_device(ram);
        assert!(matches!(err, Err(MotherboardError::Full)));
    }

    #[test]
    fn unmapped_read_is_zero_filled_and_write_is_dropped() {
        let mut mb = Motherboard::new(&MotherboardConfig { max_devices: 1 }).unwrap();
        let ram: Arc<dyn Device> =
            Arc::new(RamDevice::new(&RamConfig { memory_size: 16 }).unwrap());
        mb.add_device(ram).unwrap();

        let mut buf = [0xFFu8; 4];
        mb.read_bytes(1000, 4, &mut buf);
        assert_eq!(buf, [0, 0, 0, 0]);

        // Dropped write should not panic and reports success.
        assert_eq!(mb.write_bytes(1000, 4, &[1, 2, 3, 4]), 0);
    }

    #[test]
    fn round_trip_through_mapped_ram() {
        let mut mb = Motherboard::new(&MotherboardConfig { max_devices: 1 }).unwrap();
        let ram: Arc<dyn Device> =
            Arc::new(RamDevice::new(&RamConfig { memory_size: 16 }).unwrap());
        mb.add_device(ram).unwrap();

        mb.write_bytes(4, 4, &[0xDE, 0xAD, 0xBE, 0xEF]);
        let mut buf = [0u8; 4];
        mb.read_bytes(4, 4, &mut buf);
        assert_eq!(buf, [0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn send_interrupt_to_unknown_device_errors() {
        let mb = Motherboard::new(&MotherboardConfig { max_devices: 1 }).unwrap();
        let err = mb.send_interrupt(42, 1);
        assert!(matches!(err, Err(MotherboardError::UnknownDevice(42))));
    }
}
