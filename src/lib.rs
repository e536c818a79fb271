//! Interpreter core for a CHIP-8-class virtual machine.
//!
//! The [`Machine`] owns all architectural state: 4 KiB of memory with the
//! hex font installed at 0x000, sixteen 8-bit registers plus the 16-bit
//! index register, a bounded call stack, the delay/sound timers, a 64x32
//! monochrome framebuffer and the 16-key keypad state.
//!
//! A host driver owns the window, keyboard and audio device and feeds the
//! machine through a small surface: `load` a program image, `step` one
//! instruction at a time, `tick_timers` at 60 Hz, mirror key states in with
//! `set_key`, and rasterize `render_target` however it likes. Instruction
//! execution and timer decay are deliberately decoupled so a key-wait stall
//! never freezes the timers or the display.

pub mod display;
pub mod keypad;
pub mod machine;
pub mod memory;
pub mod opcode;
pub mod registers;
pub mod stack;
pub mod timer;

use thiserror::Error;

/// Faults surfaced to the driver. Unknown opcodes are not here on purpose:
/// they are reported through `tracing` and skipped, keeping execution live.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("program image of {size} bytes exceeds the {capacity}-byte program area")]
    ProgramTooLarge { size: usize, capacity: usize },

    #[error("call stack overflow at {pc:#05x}: nesting deeper than {max} calls")]
    StackOverflow { pc: u16, max: usize },

    #[error("call stack underflow at {pc:#05x}: return with no caller")]
    StackUnderflow { pc: u16 },
}

pub type MachineResult<T> = Result<T, MachineError>;

pub use display::FrameBuffer;
pub use machine::Machine;
pub use opcode::Opcode;
