/*!
Memory-crossing opcodes: `R r W`, and the "shift region" pair `S U`.

`S`/`U` use the internal stack pointer directly as a global byte address —
a known quirk carried over unchanged rather than fixed, since fixing it
would change where interrupt prologues and shift/unshift programs land in
global memory (see DESIGN.md).
*/

use super::{decode_operand, StepOutcome};
use crate::devices::stack_cpu::types::{TypedValue, ValueType};
use crate::devices::stack_cpu::StackCpu;

/// `R`: pop a `u64` global address, read a `T` from it, push the result.
/// A failed host read (the motherboard itself is gone) is non-fatal: it
/// yields a zero value rather than shutting the CPU down.
pub(crate) fn read_memory(cpu: &StackCpu, argument: u8) -> StepOutcome {
    let Some(vt) = decode_operand(cpu, argument) else {
        return StepOutcome::Continue;
    };
    let addr = pop_addr(cpu);
    let mut buf = vec![0u8; vt.width_bytes() as usize];
    let value = if cpu.read_global(addr, vt.width_bytes(), &mut buf) == 0 {
        TypedValue::from_le_bytes(vt, &buf)
    } else {
        TypedValue::zero(vt)
    };
    cpu.state.lock().expect("cpu state mutex poisoned").push_typed(value);
    StepOutcome::Continue
}

/// `r`: read a `T` immediate from `ip`, advance `ip` by its width, push it.
/// A failed fetch is fatal — it mirrors a bus fault on instruction fetch.
pub(crate) fn read_immediate(cpu: &StackCpu, argument: u8) -> StepOutcome {
    let Some(vt) = decode_operand(cpu, argument) else {
        return StepOutcome::Continue;
    };
    let ip = cpu.state.lock().expect("cpu state mutex poisoned").ip;
    let width = vt.width_bytes();
    let mut buf = vec![0u8; width as usize];
    if cpu.read_global(ip, width, &mut buf) != 0 {
        return StepOutcome::Fatal;
    }
    let mut state = cpu.state.lock().expect("cpu state mutex poisoned");
    state.ip += width as u64;
    state.push_typed(TypedValue::from_le_bytes(vt, &buf));
    StepOutcome::Continue
}

/// `W`: pop a `u64` address, pop a `T` value, write it to global memory.
pub(crate) fn write_memory(cpu: &StackCpu, argument: u8) -> StepOutcome {
    let Some(vt) = decode_operand(cpu, argument) else {
        return StepOutcome::Continue;
    };
    let addr = pop_addr(cpu);
    let value = cpu.state.lock().expect("cpu state mutex poisoned").pop_typed(vt);
    let _ = cpu.write_global(addr, vt.width_bytes(), &value.to_le_bytes());
    StepOutcome::Continue
}

/// `S`: pop a `T` value (one normal decrement of `sp`), decrement `sp` a
/// second time by the same width, then write the value to the global
/// address equal to the resulting `sp` — not a scaled byte address, the
/// raw word index, per the documented quirk.
pub(crate) fn shift(cpu: &StackCpu, argument: u8) -> StepOutcome {
    let Some(vt) = decode_operand(cpu, argument) else {
        return StepOutcome::Continue;
    };
    let (value, addr) = {
        let mut state = cpu.state.lock().expect("cpu state mutex poisoned");
        let value = state.pop_typed(vt);
        state.sp = state.sp.saturating_sub(vt.width_words());
        (value, state.sp as u64)
    };
    let _ = cpu.write_global(addr, vt.width_bytes(), &value.to_le_bytes());
    StepOutcome::Continue
}

/// `U`: read a `T` from the global address equal to the current `sp`
/// without moving it, then push the value normally (which does move `sp`,
/// as any push does).
pub(crate) fn unshift(cpu: &StackCpu, argument: u8) -> StepOutcome {
    let Some(vt) = decode_operand(cpu, argument) else {
        return StepOutcome::Continue;
    };
    let addr = cpu.state.lock().expect("cpu state mutex poisoned").sp as u64;
    let mut buf = vec![0u8; vt.width_bytes() as usize];
    let value = if cpu.read_global(addr, vt.width_bytes(), &mut buf) == 0 {
        TypedValue::from_le_bytes(vt, &buf)
    } else {
        TypedValue::zero(vt)
    };
    cpu.state.lock().expect("cpu state mutex poisoned").push_typed(value);
    StepOutcome::Continue
}

fn pop_addr(cpu: &StackCpu) -> u64 {
    cpu.state
        .lock()
        .expect("cpu state mutex poisoned")
        .pop_typed(ValueType::U64)
        .to_bits()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::ram::{RamConfig, RamDevice};
    use crate::device::Device;
    use crate::motherboard::{Motherboard, MotherboardConfig};
    use crate::devices::stack_cpu::StackCpuConfig;
    use std::sync::Arc;

    fn wired_cpu() -> (Arc<Motherboard>, Arc<StackCpu>) {
        let mut mb = Motherboard::new(&MotherboardConfig { max_devices: 2 }).unwrap();
        let ram: Arc<dyn Device> = Arc::new(RamDevice::new(&RamConfig { memory_size: 256 }).unwrap());
        mb.add_device(ram).unwrap();
        let cpu = Arc::new(StackCpu::new(&StackCpuConfig { stack_size: 16 }).unwrap());
        let cpu_as_device: Arc<dyn Device> = cpu.clone();
        mb.add_device(cpu_as_device).unwrap();
        let mb = Arc::new(mb);
        let weak = Arc::downgrade(&mb);
        cpu.register_motherboard(1, crate::device::HostCallbacks::new(weak));
        (mb, cpu)
    }

    #[test]
    fn write_then_read_memory_round_trips() {
        let (_mb, cpu) = wired_cpu();
        {
            let mut state = cpu.state.lock().unwrap();
            state.push_typed(TypedValue::U32(0xDEAD_BEEF));
            state.push_typed(TypedValue::U64(16));
        }
        write_memory(&cpu, 5);
        cpu.state.lock().unwrap().push_typed(TypedValue::U64(16));
        read_memory(&cpu, 5);
        match cpu.state.lock().unwrap().pop_typed(ValueType::U32) {
            TypedValue::U32(v) => assert_eq!(v, 0xDEAD_BEEF),
            _ => panic!("wrong variant"),
        }
    }
}
