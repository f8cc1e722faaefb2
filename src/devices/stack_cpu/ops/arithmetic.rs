/*!
Arithmetic and bitwise opcodes: `+ - * / & | ^ ~ _`.
*/

use std::ops::{BitAnd, BitOr, BitXor};

use super::{decode_operand, decode_operand_integer, StepOutcome};
use crate::devices::stack_cpu::state::ERR_UNDERFLOW;
use crate::devices::stack_cpu::types::TypedValue;
use crate::devices::stack_cpu::StackCpu;

fn binary(cpu: &StackCpu, argument: u8, integer_only: bool, op: fn(TypedValue, TypedValue) -> TypedValue) -> StepOutcome {
    let vt = if integer_only {
        decode_operand_integer(cpu, argument)
    } else {
        decode_operand(cpu, argument)
    };
    let Some(vt) = vt else { return StepOutcome::Continue };
    let mut state = cpu.state.lock().expect("cpu state mutex poisoned");
    let underflowed_before = state.errors & ERR_UNDERFLOW != 0;
    let b = state.pop_typed(vt);
    let a = state.pop_typed(vt);
    // A pop that underflows holds sp at 0 and sets the error bit; pushing a
    // result on top of that would raise sp back to 1 even though nothing
    // was actually consumed. `errors` is sticky, so only a pop that just
    // now set the bit should suppress the push.
    if underflowed_before || state.errors & ERR_UNDERFLOW == 0 {
        state.push_typed(op(a, b));
    }
    StepOutcome::Continue
}

fn unary(cpu: &StackCpu, argument: u8, integer_only: bool, op: fn(TypedValue) -> TypedValue) -> StepOutcome {
    let vt = if integer_only {
        decode_operand_integer(cpu, argument)
    } else {
        decode_operand(cpu, argument)
    };
    let Some(vt) = vt else { return StepOutcome::Continue };
    let mut state = cpu.state.lock().expect("cpu state mutex poisoned");
    let underflowed_before = state.errors & ERR_UNDERFLOW != 0;
    let a = state.pop_typed(vt);
    if underflowed_before || state.errors & ERR_UNDERFLOW == 0 {
        state.push_typed(op(a));
    }
    StepOutcome::Continue
}

macro_rules! same_type_binop {
    ($name:ident, $int_op:ident, $float_op:tt) => {
        fn $name(a: TypedValue, b: TypedValue) -> TypedValue {
            match (a, b) {
                (TypedValue::F32(x), TypedValue::F32(y)) => TypedValue::F32(x $float_op y),
                (TypedValue::F64(x), TypedValue::F64(y)) => TypedValue::F64(x $float_op y),
                (TypedValue::U8(x), TypedValue::U8(y)) => TypedValue::U8(x.$int_op(y)),
                (TypedValue::U16(x), TypedValue::U16(y)) => TypedValue::U16(x.$int_op(y)),
                (TypedValue::U32(x), TypedValue::U32(y)) => TypedValue::U32(x.$int_op(y)),
                (TypedValue::U64(x), TypedValue::U64(y)) => TypedValue::U64(x.$int_op(y)),
                _ => unreachable!("both operands were decoded from the same type code"),
            }
        }
    };
}

// Bitwise ops are always invoked with `integer_only = true`, so the operands
// are never `F32`/`F64` in practice; unlike the arithmetic ops above, `&`/`|`/`^`
// have no float implementation, so this variant omits the float arms instead
// of trying to route them through an operator that doesn't exist for floats.
macro_rules! integer_only_binop {
    ($name:ident, $int_op:ident) => {
        fn $name(a: TypedValue, b: TypedValue) -> TypedValue {
            match (a, b) {
                (TypedValue::U8(x), TypedValue::U8(y)) => TypedValue::U8(x.$int_op(y)),
                (TypedValue::U16(x), TypedValue::U16(y)) => TypedValue::U16(x.$int_op(y)),
                (TypedValue::U32(x), TypedValue::U32(y)) => TypedValue::U32(x.$int_op(y)),
                (TypedValue::U64(x), TypedValue::U64(y)) => TypedValue::U64(x.$int_op(y)),
                _ => unreachable!("both operands were decoded from the same type code"),
            }
        }
    };
}

same_type_binop!(apply_add, wrapping_add, +);
same_type_binop!(apply_sub, wrapping_sub, -);
same_type_binop!(apply_mul, wrapping_mul, *);
integer_only_binop!(apply_band, bitand);
integer_only_binop!(apply_bor, bitor);
integer_only_binop!(apply_bxor, bitxor);

fn apply_div(a: TypedValue, b: TypedValue) -> TypedValue {
    // Integer division by zero pushes 0 and raises no error bit; float
    // division by zero follows IEEE 754 (inf/NaN) and needs no guard.
    match (a, b) {
        (TypedValue::F32(x), TypedValue::F32(y)) => TypedValue::F32(x / y),
        (TypedValue::F64(x), TypedValue::F64(y)) => TypedValue::F64(x / y),
        (TypedValue::U8(x), TypedValue::U8(y)) => TypedValue::U8(if y == 0 { 0 } else { x / y }),
        (TypedValue::U16(x), TypedValue::U16(y)) => TypedValue::U16(if y == 0 { 0 } else { x / y }),
        (TypedValue::U32(x), TypedValue::U32(y)) => TypedValue::U32(if y == 0 { 0 } else { x / y }),
        (TypedValue::U64(x), TypedValue::U64(y)) => TypedValue::U64(if y == 0 { 0 } else { x / y }),
        _ => unreachable!("both operands were decoded from the same type code"),
    }
}

fn apply_bnot(a: TypedValue) -> TypedValue {
    match a {
        TypedValue::U8(x) => TypedValue::U8(!x),
        TypedValue::U16(x) => TypedValue::U16(!x),
        TypedValue::U32(x) => TypedValue::U32(!x),
        TypedValue::U64(x) => TypedValue::U64(!x),
        _ => unreachable!("integer-only opcode operand was already remapped"),
    }
}

fn apply_neg(a: TypedValue) -> TypedValue {
    match a {
        TypedValue::F32(x) => TypedValue::F32(-x),
        TypedValue::F64(x) => TypedValue::F64(-x),
        TypedValue::U8(x) => TypedValue::U8(x.wrapping_neg()),
        TypedValue::U16(x) => TypedValue::U16(x.wrapping_neg()),
        TypedValue::U32(x) => TypedValue::U32(x.wrapping_neg()),
        TypedValue::U64(x) => TypedValue::U64(x.wrapping_neg()),
    }
}

pub(crate) fn add(cpu: &StackCpu, argument: u8) -> StepOutcome {
    binary(cpu, argument, false, apply_add)
}

pub(crate) fn sub(cpu: &StackCpu, argument: u8) -> StepOutcome {
    binary(cpu, argument, false, apply_sub)
}

pub(crate) fn mul(cpu: &StackCpu, argument: u8) -> StepOutcome {
    binary(cpu, argument, false, apply_mul)
}

pub(crate) fn div(cpu: &StackCpu, argument: u8) -> StepOutcome {
    binary(cpu, argument, false, apply_div)
}

pub(crate) fn band(cpu: &StackCpu, argument: u8) -> StepOutcome {
    binary(cpu, argument, true, apply_band)
}

pub(crate) fn bor(cpu: &StackCpu, argument: u8) -> StepOutcome {
    binary(cpu, argument, true, apply_bor)
}

pub(crate) fn bxor(cpu: &StackCpu, argument: u8) -> StepOutcome {
    binary(cpu, argument, true, apply_bxor)
}

pub(crate) fn bnot(cpu: &StackCpu, argument: u8) -> StepOutcome {
    unary(cpu, argument, true, apply_bnot)
}

pub(crate) fn neg(cpu: &StackCpu, argument: u8) -> StepOutcome {
    unary(cpu, argument, false, apply_neg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::stack_cpu::StackCpuConfig;

    fn cpu_with(values: &[TypedValue]) -> StackCpu {
        let cpu = StackCpu::new(&StackCpuConfig { stack_size: 16 }).unwrap();
        let mut state = cpu.state.lock().unwrap();
        for v in values {
            state.push_typed(*v);
        }
        drop(state);
        cpu
    }

    #[test]
    fn add_u32() {
        let cpu = cpu_with(&[TypedValue::U32(7), TypedValue::U32(35)]);
        add(&cpu, 5);
        match cpu.state.lock().unwrap().pop_typed(crate::devices::stack_cpu::types::ValueType::U32) {
            TypedValue::U32(v) => assert_eq!(v, 42),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn sub_order_matches_rpn_convention() {
        // push 10, push 3, then `-` computes 10 - 3.
        let cpu = cpu_with(&[TypedValue::U32(10), TypedValue::U32(3)]);
        sub(&cpu, 5);
        match cpu.state.lock().unwrap().pop_typed(crate::devices::stack_cpu::types::ValueType::U32) {
            TypedValue::U32(v) => assert_eq!(v, 7),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn integer_division_by_zero_pushes_zero_without_setting_errors() {
        let cpu = cpu_with(&[TypedValue::U32(10), TypedValue::U32(0)]);
        div(&cpu, 5);
        assert_eq!(cpu.errors(), 0);
        match cpu.state.lock().unwrap().pop_typed(crate::devices::stack_cpu::types::ValueType::U32) {
            TypedValue::U32(v) => assert_eq!(v, 0),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn invalid_argument_sets_error_bit_and_leaves_stack_untouched() {
        let cpu = cpu_with(&[TypedValue::U32(1), TypedValue::U32(2)]);
        add(&cpu, 200);
        assert_eq!(cpu.errors(), crate::devices::stack_cpu::state::ERR_INVALID_ARGUMENT);
        assert_eq!(cpu.sp(), 2);
    }

    #[test]
    fn binary_op_on_empty_stack_sets_underflow_and_holds_sp_at_zero() {
        let cpu = StackCpu::new(&StackCpuConfig { stack_size: 16 }).unwrap();
        add(&cpu, 5);
        assert_eq!(cpu.errors(), crate::devices::stack_cpu::state::ERR_UNDERFLOW);
        assert_eq!(cpu.sp(), 0);
    }

    #[test]
    fn unary_op_on_empty_stack_sets_underflow_and_holds_sp_at_zero() {
        let cpu = StackCpu::new(&StackCpuConfig { stack_size: 16 }).unwrap();
        neg(&cpu, 5);
        assert_eq!(cpu.errors(), crate::devices::stack_cpu::state::ERR_UNDERFLOW);
        assert_eq!(cpu.sp(), 0);
    }
}
