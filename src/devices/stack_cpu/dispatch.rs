/*!
The fetch-execute loop and the hardware/software interrupt prologue.
*/

use std::sync::atomic::Ordering;

use super::ops::{self, StepOutcome};
use super::state::SETTINGS_INTERRUPTS_ENABLED;
use super::types::ValueType;
use super::StackCpu;

/// Run until a shutdown interrupt (code `0`), `halt()` is called, or a
/// fatal fetch failure occurs. Mirrors `Runnable::boot`'s return value:
/// `0` on a clean stop.
pub(crate) fn run(cpu: &StackCpu) -> i32 {
    loop {
        if cpu.halt_requested.load(Ordering::Acquire) {
            return 0;
        }

        let interrupts_enabled = cpu.state.lock().expect("cpu state mutex poisoned").settings
            & SETTINGS_INTERRUPTS_ENABLED
            != 0;

        if interrupts_enabled {
            if let Some(code) = cpu.mailbox.pop() {
                if code == 0 {
                    return 0;
                }
                process_interrupt(cpu, code);
                continue;
            }
        }

        match fetch_and_execute(cpu) {
            StepOutcome::Continue => {}
            StepOutcome::Fatal => return 1,
        }
    }
}

/// Deliver `code`: if `interrupt_table` has a vector for it, save `ip` to
/// the shift region (one decrement, not `S`'s double-decrement, since there
/// is no stack operand to consume) and jump to the vector entry. Codes past
/// `interrupt_count` are dropped.
pub(crate) fn process_interrupt(cpu: &StackCpu, code: u32) {
    let mut state = cpu.state.lock().expect("cpu state mutex poisoned");
    if code >= state.interrupt_count {
        log::debug!("dropping interrupt {} (no vector configured)", code);
        return;
    }
    let saved_ip = state.ip;
    state.sp = state.sp.saturating_sub(ValueType::U64.width_words());
    let shift_addr = state.sp as u64;
    let vector_addr = state.interrupt_table + (code as u64) * 8;
    drop(state);

    let _ = cpu.write_global(shift_addr, 8, &saved_ip.to_le_bytes());

    let mut vector_buf = [0u8; 8];
    if cpu.read_global(vector_addr, 8, &mut vector_buf) == 0 {
        let target = u64::from_le_bytes(vector_buf);
        cpu.state.lock().expect("cpu state mutex poisoned").ip = target;
    }
}

fn fetch_and_execute(cpu: &StackCpu) -> StepOutcome {
    let ip = cpu.state.lock().expect("cpu state mutex poisoned").ip;
    let mut header = [0u8; 2];
    if cpu.read_global(ip, 2, &mut header) != 0 {
        return StepOutcome::Fatal;
    }
    cpu.state.lock().expect("cpu state mutex poisoned").ip = ip + 2;

    let opcode = header[0];
    let argument = header[1];
    execute(cpu, opcode, argument)
}

fn execute(cpu: &StackCpu, opcode: u8, argument: u8) -> StepOutcome {
    match opcode {
        0x00 => ops::stack_ops::nop(cpu, argument),
        b'+' => ops::arithmetic::add(cpu, argument),
        b'-' => ops::arithmetic::sub(cpu, argument),
        b'*' => ops::arithmetic::mul(cpu, argument),
        b'/' => ops::arithmetic::div(cpu, argument),
        b'&' => ops::arithmetic::band(cpu, argument),
        b'|' => ops::arithmetic::bor(cpu, argument),
        b'^' => ops::arithmetic::bxor(cpu, argument),
        b'~' => ops::arithmetic::bnot(cpu, argument),
        b'_' => ops::arithmetic::neg(cpu, argument),
        b'<' => ops::compare::lt(cpu, argument),
        b'>' => ops::compare::gt(cpu, argument),
        b'l' => ops::compare::le(cpu, argument),
        b'g' => ops::compare::ge(cpu, argument),
        b'=' => ops::compare::eq(cpu, argument),
        b'!' => ops::compare::ne(cpu, argument),
        b'C' => ops::stack_ops::dup(cpu, argument),
        b'D' => ops::stack_ops::discard(cpu, argument),
        b'$' => ops::stack_ops::swap(cpu, argument),
        b'z' => ops::stack_ops::resize(cpu, argument),
        b'R' => ops::memory_ops::read_memory(cpu, argument),
        b'r' => ops::memory_ops::read_immediate(cpu, argument),
        b'W' => ops::memory_ops::write_memory(cpu, argument),
        b'S' => ops::memory_ops::shift(cpu, argument),
        b'U' => ops::memory_ops::unshift(cpu, argument),
        b'P' => ops::registers::read(cpu, argument),
        b'p' => ops::registers::write(cpu, argument),
        b'J' => ops::control::jump_if(cpu, argument),
        b'I' => ops::control::software_interrupt(cpu, argument),
        _ => {
            cpu.state.lock().expect("cpu state mutex poisoned").errors |=
                crate::devices::stack_cpu::state::ERR_INVALID_OPCODE;
            StepOutcome::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Device, Runnable};
    use crate::devices::ram::{RamConfig, RamDevice};
    use crate::devices::stack_cpu::StackCpuConfig;
    use crate::motherboard::{Motherboard, MotherboardConfig};
    use std::sync::Arc;

    /// Wire a RAM-backed program to a fresh CPU, boot on a background
    /// thread, let it run briefly, then ask it to halt and wait for it to
    /// stop. Every program here pads out to NOPs, so `halt` is what ends
    /// the run rather than the program itself.
    fn run_program(program: &[u8]) -> (Arc<Motherboard>, Arc<StackCpu>) {
        let mut mb = Motherboard::new(&MotherboardConfig { max_devices: 2 }).unwrap();
        let ram = RamDevice::new(&RamConfig { memory_size: 512 }).unwrap();
        for (i, byte) in program.iter().enumerate() {
            ram.write_bytes(i as u32, 1, std::slice::from_ref(byte));
        }
        let ram: Arc<dyn Device> = Arc::new(ram);
        mb.add_device(ram).unwrap();

        let cpu = Arc::new(StackCpu::new(&StackCpuConfig { stack_size: 64 }).unwrap());
        let cpu_device: Arc<dyn Device> = cpu.clone();
        mb.add_device(cpu_device).unwrap();

        let mb = Arc::new(mb);
        let boot_mb = mb.clone();
        let handle = std::thread::spawn(move || boot_mb.boot());
        std::thread::sleep(std::time::Duration::from_millis(50));
        cpu.halt();
        handle.join().unwrap().unwrap();
        (mb, cpu)
    }

    #[test]
    fn addition_program_writes_result_to_memory() {
        // r u32 7 ; r u32 0x23 ; + u32 ; r u64 0x100 ; W u32
        let mut program = Vec::new();
        program.extend_from_slice(&[b'r', 5]);
        program.extend_from_slice(&7u32.to_le_bytes());
        program.extend_from_slice(&[b'r', 5]);
        program.extend_from_slice(&0x23u32.to_le_bytes());
        program.extend_from_slice(&[b'+', 5]);
        program.extend_from_slice(&[b'r', 6]);
        program.extend_from_slice(&0x100u64.to_le_bytes());
        program.extend_from_slice(&[b'W', 5]);

        let (mb, _cpu) = run_program(&program);

        let mut result = [0u8; 4];
        mb.read_bytes(0x100, 4, &mut result);
        assert_eq!(u32::from_le_bytes(result), 0x2A);
    }

    #[test]
    fn unknown_opcode_sets_error_bit_and_advances_ip() {
        let program = [0xFFu8, 0x00];
        let (_mb, cpu) = run_program(&program);
        assert_eq!(
            cpu.errors() & crate::devices::stack_cpu::state::ERR_INVALID_OPCODE,
            crate::devices::stack_cpu::state::ERR_INVALID_OPCODE
        );
    }

    #[test]
    fn underflow_on_empty_stack_sets_error_bit_and_holds_sp() {
        let program = [b'+', 5];
        let (_mb, cpu) = run_program(&program);
        assert_eq!(
            cpu.errors() & crate::devices::stack_cpu::state::ERR_UNDERFLOW,
            crate::devices::stack_cpu::state::ERR_UNDERFLOW
        );
        assert_eq!(cpu.sp(), 0);
    }

    #[test]
    fn interrupt_code_zero_shuts_the_cpu_down() {
        // r u32 1 ; p settings   -- enable interrupts, then idle on NOPs
        // until an external shutdown interrupt arrives. Reset (part of the
        // boot lifecycle, run before the program starts) would clobber a
        // pre-set `settings` register, so this is done from inside the
        // program instead of poked directly beforehand.
        let mut program = Vec::new();
        program.extend_from_slice(&[b'r', 5]);
        program.extend_from_slice(&1u32.to_le_bytes());
        program.extend_from_slice(&[b'p', 5]);

        let mut mb = Motherboard::new(&MotherboardConfig { max_devices: 2 }).unwrap();
        let ram = RamDevice::new(&RamConfig { memory_size: 64 }).unwrap();
        for (i, byte) in program.iter().enumerate() {
            ram.write_bytes(i as u32, 1, std::slice::from_ref(byte));
        }
        let ram: Arc<dyn Device> = Arc::new(ram);
        mb.add_device(ram).unwrap();

        let cpu = Arc::new(StackCpu::new(&StackCpuConfig { stack_size: 16 }).unwrap());
        let cpu_device: Arc<dyn Device> = cpu.clone();
        let cpu_id = mb.add_device(cpu_device).unwrap();

        let mb = Arc::new(mb);
        let boot_mb = mb.clone();
        let handle = std::thread::spawn(move || boot_mb.boot());

        std::thread::sleep(std::time::Duration::from_millis(20));
        mb.send_interrupt(cpu_id, 0).unwrap();

        handle.join().unwrap().unwrap();
    }
}
