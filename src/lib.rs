/*!
bridgesim: a pluggable hardware computer simulator. A [`motherboard::Motherboard`]
hosts a fixed-capacity set of [`device::Device`]s sharing one global memory
address space and one interrupt bus. [`devices::ram`] and [`devices::stack_cpu`]
are the two devices shipped with the crate.
*/

pub mod device;
pub mod devices;
pub mod error;
pub mod motherboard;
