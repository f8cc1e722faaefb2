/*!
Comparison opcodes: `< > l g = !`. Each pops `b` then `a` (of type `T`
selected by `argument`) and pushes a one-word `0`/`1` result.
*/

use super::{decode_operand, StepOutcome};
use crate::devices::stack_cpu::state::ERR_UNDERFLOW;
use crate::devices::stack_cpu::types::TypedValue;
use crate::devices::stack_cpu::StackCpu;

fn compare(cpu: &StackCpu, argument: u8, cmp: fn(TypedValue, TypedValue) -> bool) -> StepOutcome {
    let Some(vt) = decode_operand(cpu, argument) else {
        return StepOutcome::Continue;
    };
    let mut state = cpu.state.lock().expect("cpu state mutex poisoned");
    let underflowed_before = state.errors & ERR_UNDERFLOW != 0;
    let b = state.pop_typed(vt);
    let a = state.pop_typed(vt);
    // See the matching note in arithmetic.rs's `binary`: a fresh underflow
    // must suppress the push so sp doesn't rise after the pops held it.
    if underflowed_before || state.errors & ERR_UNDERFLOW == 0 {
        state.push_word(if cmp(a, b) { 1 } else { 0 });
    }
    StepOutcome::Continue
}

macro_rules! same_type_cmp {
    ($name:ident, $op:tt) => {
        fn $name(a: TypedValue, b: TypedValue) -> bool {
            match (a, b) {
                (TypedValue::F32(x), TypedValue::F32(y)) => x $op y,
                (TypedValue::F64(x), TypedValue::F64(y)) => x $op y,
                (TypedValue::U8(x), TypedValue::U8(y)) => x $op y,
                (TypedValue::U16(x), TypedValue::U16(y)) => x $op y,
                (TypedValue::U32(x), TypedValue::U32(y)) => x $op y,
                (TypedValue::U64(x), TypedValue::U64(y)) => x $op y,
                _ => unreachable!("both operands were decoded from the same type code"),
            }
        }
    };
}

same_type_cmp!(apply_lt, <);
same_type_cmp!(apply_gt, >);
same_type_cmp!(apply_le, <=);
same_type_cmp!(apply_ge, >=);
same_type_cmp!(apply_eq, ==);
same_type_cmp!(apply_ne, !=);

pub(crate) fn lt(cpu: &StackCpu, argument: u8) -> StepOutcome {
    compare(cpu, argument, apply_lt)
}

pub(crate) fn gt(cpu: &StackCpu, argument: u8) -> StepOutcome {
    compare(cpu, argument, apply_gt)
}

pub(crate) fn le(cpu: &StackCpu, argument: u8) -> StepOutcome {
    compare(cpu, argument, apply_le)
}

pub(crate) fn ge(cpu: &StackCpu, argument: u8) -> StepOutcome {
    compare(cpu, argument, apply_ge)
}

pub(crate) fn eq(cpu: &StackCpu, argument: u8) -> StepOutcome {
    compare(cpu, argument, apply_eq)
}

pub(crate) fn ne(cpu: &StackCpu, argument: u8) -> StepOutcome {
    compare(cpu, argument, apply_ne)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::stack_cpu::StackCpuConfig;

    #[test]
    fn less_than_pushes_one_when_true() {
        let cpu = StackCpu::new(&StackCpuConfig { stack_size: 8 }).unwrap();
        {
            let mut state = cpu.state.lock().unwrap();
            state.push_typed(TypedValue::U32(3));
            state.push_typed(TypedValue::U32(5));
        }
        lt(&cpu, 5);
        assert_eq!(cpu.state.lock().unwrap().pop_word(), 1);
    }

    #[test]
    fn not_equal_pushes_zero_when_equal() {
        let cpu = StackCpu::new(&StackCpuConfig { stack_size: 8 }).unwrap();
        {
            let mut state = cpu.state.lock().unwrap();
            state.push_typed(TypedValue::U32(9));
            state.push_typed(TypedValue::U32(9));
        }
        ne(&cpu, 5);
        assert_eq!(cpu.state.lock().unwrap().pop_word(), 0);
    }

    #[test]
    fn compare_on_empty_stack_sets_underflow_and_holds_sp_at_zero() {
        let cpu = StackCpu::new(&StackCpuConfig { stack_size: 8 }).unwrap();
        lt(&cpu, 5);
        assert_eq!(cpu.errors(), ERR_UNDERFLOW);
        assert_eq!(cpu.sp(), 0);
    }
}
