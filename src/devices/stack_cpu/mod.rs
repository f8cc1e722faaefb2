/*!
`StackCpu`: a stack-oriented virtual processor. Every instruction is two
bytes (`opcode`, `argument`) fetched from the global address space at `ip`;
most opcodes are size-polymorphic over six operand types selected by
`argument`. See `types`, `state`, `mailbox`, `dispatch`, and `ops` for the
pieces.
*/

mod dispatch;
mod mailbox;
mod ops;
mod state;
mod types;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use mailbox::Mailbox;
use state::CpuState;

use crate::device::{Device, HostCallbacks, InterruptSink, Runnable, STACK_CPU_DEVICE_TYPE};
use crate::error::DeviceConfigError;

/// Configuration for [`StackCpu::new`].
pub struct StackCpuConfig {
    pub stack_size: u32,
}

/// A stack-oriented virtual processor device.
pub struct StackCpu {
    pub(crate) state: Mutex<CpuState>,
    pub(crate) mailbox: Mailbox,
    pub(crate) callbacks: Mutex<Option<HostCallbacks>>,
    pub(crate) stack_size: u32,
    pub(crate) halt_requested: AtomicBool,
}

impl StackCpu {
    /// Allocate a CPU with an internal stack of `config.stack_size` words.
    pub fn new(config: &StackCpuConfig) -> Result<Self, DeviceConfigError> {
        if config.stack_size == 0 {
            return Err(DeviceConfigError::ZeroSizedField { field: "stack_size" });
        }
        Ok(Self {
            state: Mutex::new(CpuState::new(config.stack_size)),
            mailbox: Mailbox::new(),
            callbacks: Mutex::new(None),
            stack_size: config.stack_size,
            halt_requested: AtomicBool::new(false),
        })
    }

    /// Snapshot of the `errors` register, for tests and diagnostics.
    pub fn errors(&self) -> u32 {
        self.state.lock().expect("cpu state mutex poisoned").errors
    }

    /// Snapshot of `ip`.
    pub fn ip(&self) -> u64 {
        self.state.lock().expect("cpu state mutex poisoned").ip
    }

    /// Snapshot of `sp`.
    pub fn sp(&self) -> u32 {
        self.state.lock().expect("cpu state mutex poisoned").sp
    }

    fn read_global(&self, addr: u64, len: u32, out: &mut [u8]) -> i32 {
        let guard = self.callbacks.lock().expect("callbacks mutex poisoned");
        match guard.as_ref() {
            Some(cb) => cb.read_bytes(addr, len, out),
            None => -1,
        }
    }

    fn write_global(&self, addr: u64, len: u32, data: &[u8]) -> i32 {
        let guard = self.callbacks.lock().expect("callbacks mutex poisoned");
        match guard.as_ref() {
            Some(cb) => cb.write_bytes(addr, len, data),
            None => -1,
        }
    }
}

impl Device for StackCpu {
    fn device_type(&self) -> u64 {
        STACK_CPU_DEVICE_TYPE
    }

    // The CPU does not export memory of its own; its state is only visible
    // through the `P` opcode.
    fn load_bytes(&self, _local_addr: u32, _len: u32, _out: &mut [u8]) -> i32 {
        0
    }

    fn write_bytes(&self, _local_addr: u32, _len: u32, _data: &[u8]) -> i32 {
        0
    }

    fn register_motherboard(&self, _device_id: u32, callbacks: HostCallbacks) -> i32 {
        *self.callbacks.lock().expect("callbacks mutex poisoned") = Some(callbacks);
        0
    }

    fn reset(&self) -> i32 {
        self.state.lock().expect("cpu state mutex poisoned").reset();
        self.mailbox.clear();
        self.halt_requested.store(false, Ordering::Release);
        0
    }

    fn runnable(&self) -> Option<&dyn Runnable> {
        Some(self)
    }

    fn interrupt_sink(&self) -> Option<&dyn InterruptSink> {
        Some(self)
    }
}

impl Runnable for StackCpu {
    fn boot(&self) -> i32 {
        dispatch::run(self)
    }

    fn halt(&self) -> i32 {
        self.halt_requested.store(true, Ordering::Release);
        0
    }
}

impl InterruptSink for StackCpu {
    fn interrupt(&self, code: u32) -> i32 {
        self.mailbox.push(code);
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_stack_size() {
        let err = StackCpu::new(&StackCpuConfig { stack_size: 0 });
        assert!(matches!(err, Err(DeviceConfigError::ZeroSizedField { .. })));
    }

    #[test]
    fn reset_clears_mailbox_and_halt_flag() {
        let cpu = StackCpu::new(&StackCpuConfig { stack_size: 4 }).unwrap();
        cpu.interrupt(5);
        cpu.halt_requested.store(true, Ordering::Release);
        cpu.reset();
        assert!(cpu.mailbox.pop().is_none());
        assert!(!cpu.halt_requested.load(Ordering::Acquire));
    }

    #[test]
    fn unregistered_global_access_reports_failure() {
        let cpu = StackCpu::new(&StackCpuConfig { stack_size: 4 }).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(cpu.read_global(0, 4, &mut buf), -1);
        assert_eq!(cpu.write_global(0, 4, &buf), -1);
    }
}
