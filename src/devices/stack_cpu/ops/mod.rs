/*!
Opcode families, grouped the way the opcode table groups them: arithmetic,
comparison, stack manipulation, memory access, register access, and
control flow.
*/

pub(crate) mod arithmetic;
pub(crate) mod compare;
pub(crate) mod control;
pub(crate) mod memory_ops;
pub(crate) mod registers;
pub(crate) mod stack_ops;

use super::state::ERR_INVALID_ARGUMENT;
use super::types::ValueType;
use super::StackCpu;

/// What the dispatch loop should do after one opcode has executed.
pub(crate) enum StepOutcome {
    /// Keep running.
    Continue,
    /// A host-callback fetch failed in a way that must shut the CPU down.
    Fatal,
}

/// Decode `argument` as any of the six operand types. Sets
/// `ERR_INVALID_ARGUMENT` and returns `None` if it isn't one.
pub(crate) fn decode_operand(cpu: &StackCpu, argument: u8) -> Option<ValueType> {
    match ValueType::from_code(argument) {
        Some(vt) => Some(vt),
        None => {
            cpu.state.lock().expect("cpu state mutex poisoned").errors |= ERR_INVALID_ARGUMENT;
            None
        }
    }
}

/// Decode `argument` for an integer-only opcode (`& | ^ ~`): float codes
/// silently remap to their same-width integer type.
pub(crate) fn decode_operand_integer(cpu: &StackCpu, argument: u8) -> Option<ValueType> {
    decode_operand(cpu, argument).map(ValueType::to_integer_operand)
}
