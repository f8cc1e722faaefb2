/*!
Simulator-fault error types. In-sim faults are never represented here —
they live in the CPU's `errors` register (see `devices::stack_cpu::state`).
*/

use thiserror::Error;

/// Failures the motherboard fabric itself can report. These are all
/// "invalid use of the simulator" faults: bad configuration, exhausted
/// capacity, or a device that misbehaved during a lifecycle callback.
#[derive(Debug, Error)]
pub enum MotherboardError {
    #[error("motherboard configuration is invalid: {0}")]
    InvalidConfig(&'static str),

    #[error("motherboard has no free device slots")]
    Full,

    #[error("invalid device argument: {0}")]
    InvalidArgument(&'static str),

    /// Retained for API completeness: a device providing `boot` without
    /// `halt` is ruled out at compile time by the `Runnable` trait bundling
    /// both methods, so this variant is unreachable through
    /// `Motherboard::add_device`. See DESIGN.md.
    #[error("device declares a boot capability without a matching halt")]
    InvalidDeviceContract,

    #[error("no device registered with id {0}")]
    UnknownDevice(u32),

    #[error("device {device_id} failed register_motherboard with code {code}")]
    RegisterFailed { device_id: u32, code: i32 },

    #[error("device {device_id} failed init with code {code}")]
    InitFailed { device_id: u32, code: i32 },

    #[error("device {device_id} failed reset with code {code}")]
    ResetFailed { device_id: u32, code: i32 },
}

/// Failures constructing a device from its configuration struct.
#[derive(Debug, Error)]
pub enum DeviceConfigError {
    #[error("{field} must be nonzero")]
    ZeroSizedField { field: &'static str },

    #[error("failed to allocate {bytes} bytes for device memory")]
    AllocationFailed { bytes: u64 },
}
