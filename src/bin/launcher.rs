//! Demo binary: wires a [`RamDevice`] and a [`StackCpu`] to a [`Motherboard`],
//! loads a small addition program, boots, and reports the result.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bridgesim::device::{Device, Runnable};
use bridgesim::devices::ram::{RamConfig, RamDevice};
use bridgesim::devices::stack_cpu::{StackCpu, StackCpuConfig};
use bridgesim::motherboard::{Motherboard, MotherboardConfig};

/// `r u32 7 ; r u32 0x23 ; + u32 ; r u64 0x100 ; W u32` — add two immediates
/// and store the result at global address `0x100`.
fn addition_program() -> Vec<u8> {
    let mut program = Vec::new();
    program.extend_from_slice(&[b'r', 5]);
    program.extend_from_slice(&7u32.to_le_bytes());
    program.extend_from_slice(&[b'r', 5]);
    program.extend_from_slice(&0x23u32.to_le_bytes());
    program.extend_from_slice(&[b'+', 5]);
    program.extend_from_slice(&[b'r', 6]);
    program.extend_from_slice(&0x100u64.to_le_bytes());
    program.extend_from_slice(&[b'W', 5]);
    program
}

fn main() {
    env_logger::init();

    let ram = RamDevice::new(&RamConfig { memory_size: 0x200 }).expect("ram config");
    let program = addition_program();
    ram.write_bytes(0, program.len() as u32, &program);
    log::info!("created a ram device holding a {}-byte program", program.len());

    let mut mb = Motherboard::new(&MotherboardConfig { max_devices: 4 }).expect("motherboard config");
    log::info!("created a motherboard with {} slots", mb.num_slots());

    let ram: Arc<dyn Device> = Arc::new(ram);
    mb.add_device(ram).expect("attach ram device");
    log::info!("attached the ram device to the motherboard");

    let cpu = Arc::new(StackCpu::new(&StackCpuConfig { stack_size: 64 }).expect("cpu config"));
    let cpu_device: Arc<dyn Device> = cpu.clone();
    mb.add_device(cpu_device).expect("attach cpu device");
    log::info!("attached the stack cpu to the motherboard");

    let mb = Arc::new(mb);
    let boot_mb = mb.clone();
    log::info!("booting");
    let handle = thread::spawn(move || boot_mb.boot());

    // The program above is a handful of instructions; it finishes well
    // before this sleep elapses. Halt to stop the CPU's fetch loop, which
    // would otherwise spin on whatever garbage follows the program in RAM.
    thread::sleep(Duration::from_millis(50));
    cpu.halt();
    handle.join().expect("boot thread panicked").expect("motherboard boot failed");

    let mut result = [0u8; 4];
    mb.read_bytes(0x100, 4, &mut result);
    println!("7 + 0x23 = {}", u32::from_le_bytes(result));
}
