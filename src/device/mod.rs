/*!
Device contract: the capability surface every pluggable device exposes.

Overview
========
Each device plugged into a motherboard advertises a small set of traits
rather than a struct of nullable function pointers:

```text
Device          - mandatory surface every device implements.
Runnable        - optional capability: a device that wants its own
                  thread (`boot`) and a way to be asked to stop (`halt`).
InterruptSink   - optional capability: a device that can receive
                  interrupts from its peers.
```

A device advertises a capability by implementing the corresponding trait and
overriding `Device::runnable`/`Device::interrupt_sink` to return `Some(self)`.
Because `Runnable` bundles `boot` and `halt` into one trait, a device that
provides boot must also provide halt as a consequence of the type checker,
rather than via a runtime check at `add_device` time.

Thread safety
=============
Every trait here requires `Send + Sync`: `load_bytes`, `write_bytes`, and
`interrupt` may be called concurrently from any device's thread, so a device
must use interior mutability (typically a `Mutex`) to satisfy that bound
while keeping `&self`-only methods.
*/

mod callbacks;
mod contract;

pub use callbacks::HostCallbacks;
pub use contract::{Device, InterruptSink, Runnable};

/// `device_type` identifying the RAM device class: `(1 << 32) | 1`.
pub const RAM_DEVICE_TYPE: u64 = (1u64 << 32) | 1;

/// `device_type` identifying the stack-CPU device class.
pub const STACK_CPU_DEVICE_TYPE: u64 = 2;
