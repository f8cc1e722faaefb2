/*!
Register-access opcodes: `P` (read) and `p` (write).
*/

use super::StepOutcome;
use crate::devices::stack_cpu::state::{RegisterSelector, CpuState, ERR_INVALID_ARGUMENT, ERR_PROTECTION, SETTINGS_PROTECTED};
use crate::devices::stack_cpu::StackCpu;

fn read_selected(state: &CpuState, sel: RegisterSelector) -> u64 {
    match sel {
        RegisterSelector::Sp => state.sp as u64,
        RegisterSelector::Ip => state.ip,
        RegisterSelector::InterruptStack => state.interrupt_stack,
        RegisterSelector::InterruptTable => state.interrupt_table,
        RegisterSelector::InterruptCount => state.interrupt_count as u64,
        RegisterSelector::Settings => state.settings as u64,
        RegisterSelector::Errors => state.errors as u64,
    }
}

fn write_selected(state: &mut CpuState, sel: RegisterSelector, value: u64) {
    match sel {
        RegisterSelector::Sp => state.sp = value as u32,
        RegisterSelector::Ip => state.ip = value,
        RegisterSelector::InterruptStack => state.interrupt_stack = value,
        RegisterSelector::InterruptTable => state.interrupt_table = value,
        RegisterSelector::InterruptCount => state.interrupt_count = value as u32,
        RegisterSelector::Settings => state.settings = value as u32,
        RegisterSelector::Errors => state.errors = value as u32,
    }
}

/// `P`: push the selected register's value. An out-of-range selector sets
/// `ERR_INVALID_ARGUMENT` and pushes a single zero word.
pub(crate) fn read(cpu: &StackCpu, argument: u8) -> StepOutcome {
    let mut state = cpu.state.lock().expect("cpu state mutex poisoned");
    let Some(sel) = RegisterSelector::from_code(argument) else {
        state.errors |= ERR_INVALID_ARGUMENT;
        state.push_word(0);
        return StepOutcome::Continue;
    };
    let value = read_selected(&state, sel);
    if sel.is_double_word() {
        state.push_word(value as u32);
        state.push_word((value >> 32) as u32);
    } else {
        state.push_word(value as u32);
    }
    StepOutcome::Continue
}

/// `p`: pop and write the selected register. Writes to the interrupt-vector
/// registers and to `settings` itself are rejected with `ERR_PROTECTION`
/// while protected mode is on; `sp` and `errors` are always writable. The
/// operand is popped unconditionally, even when the write is rejected.
pub(crate) fn write(cpu: &StackCpu, argument: u8) -> StepOutcome {
    let mut state = cpu.state.lock().expect("cpu state mutex poisoned");
    let Some(sel) = RegisterSelector::from_code(argument) else {
        state.errors |= ERR_INVALID_ARGUMENT;
        state.pop_word();
        return StepOutcome::Continue;
    };
    let value = if sel.is_double_word() {
        let hi = state.pop_word() as u64;
        let lo = state.pop_word() as u64;
        (hi << 32) | lo
    } else {
        state.pop_word() as u64
    };
    let protected = state.settings & SETTINGS_PROTECTED != 0;
    if protected && !sel.always_writable() {
        state.errors |= ERR_PROTECTION;
        return StepOutcome::Continue;
    }
    write_selected(&mut state, sel, value);
    StepOutcome::Continue
}
