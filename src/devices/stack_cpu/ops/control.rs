/*!
Control-flow opcodes: `J` (conditional jump) and `I` (software interrupt).
*/

use super::StepOutcome;
use crate::devices::stack_cpu::dispatch::process_interrupt;
use crate::devices::stack_cpu::types::ValueType;
use crate::devices::stack_cpu::StackCpu;

/// `J`: pop a `u64` address, then an `i32`-width condition word; jump if
/// the condition is nonzero.
pub(crate) fn jump_if(cpu: &StackCpu, _argument: u8) -> StepOutcome {
    let mut state = cpu.state.lock().expect("cpu state mutex poisoned");
    let addr = state.pop_typed(ValueType::U64).to_bits();
    let cond = state.pop_word();
    if cond != 0 {
        state.ip = addr;
    }
    StepOutcome::Continue
}

/// `I`: pop a `u32` code and deliver it straight to this CPU's interrupt
/// processor, bypassing the hardware mailbox (and its `settings` bit 0
/// enabled/disabled gate — a software interrupt always fires).
pub(crate) fn software_interrupt(cpu: &StackCpu, _argument: u8) -> StepOutcome {
    let code = cpu.state.lock().expect("cpu state mutex poisoned").pop_word();
    process_interrupt(cpu, code);
    StepOutcome::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::stack_cpu::types::TypedValue;
    use crate::devices::stack_cpu::StackCpuConfig;

    #[test]
    fn jump_taken_when_condition_nonzero() {
        let cpu = StackCpu::new(&StackCpuConfig { stack_size: 8 }).unwrap();
        {
            let mut state = cpu.state.lock().unwrap();
            state.push_word(1); // cond, pushed first -> bottom
            state.push_typed(TypedValue::U64(0x1000)); // addr, pushed last -> top
        }
        jump_if(&cpu, 0);
        assert_eq!(cpu.ip(), 0x1000);
    }

    #[test]
    fn jump_not_taken_when_condition_zero() {
        let cpu = StackCpu::new(&StackCpuConfig { stack_size: 8 }).unwrap();
        {
            let mut state = cpu.state.lock().unwrap();
            state.ip = 0x42;
            state.push_word(0);
            state.push_typed(TypedValue::U64(0x1000));
        }
        jump_if(&cpu, 0);
        assert_eq!(cpu.ip(), 0x42);
    }
}
