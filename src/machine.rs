use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::display::FrameBuffer;
use crate::keypad::Keypad;
use crate::memory::{Memory, PROGRAM_START};
use crate::opcode::Opcode;
use crate::registers::Registers;
use crate::stack::{CallStack, MAX_DEPTH};
use crate::timer::Timers;
use crate::{MachineError, MachineResult};

/// Execution mode. `WaitingForKey` is the cooperative stall raised by the
/// key-wait opcode: stepping is suspended until a press edge delivers a
/// symbol into the destination register, while timers and rendering carry
/// on outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Running,
    WaitingForKey { dest: u8 },
}

/// The whole virtual machine: memory, registers, call stack, timers,
/// framebuffer and keypad, driven one instruction at a time.
pub struct Machine {
    memory: Memory,
    regs: Registers,
    stack: CallStack,
    fb: FrameBuffer,
    keypad: Keypad,
    timers: Timers,
    /// Program counter; fetches mask it modulo the memory size.
    pc: u16,
    /// The 16-bit index register I, memory pointer for sprite, BCD and
    /// block-transfer opcodes.
    index: u16,
    mode: Mode,
    rng: StdRng,
}

impl Machine {
    pub fn new() -> Self {
        Self {
            memory: Memory::new(),
            regs: Registers::new(),
            stack: CallStack::new(),
            fb: FrameBuffer::new(),
            keypad: Keypad::new(),
            timers: Timers::new(),
            pc: PROGRAM_START,
            index: 0,
            mode: Mode::Running,
            // seeded once for the lifetime of the machine, never per call
            rng: StdRng::from_entropy(),
        }
    }

    /// Copy a program image into memory at 0x200.
    pub fn load(&mut self, image: &[u8]) -> MachineResult<()> {
        self.memory.load_program(image)
    }

    /// Decode and execute exactly one instruction. A no-op while a key-wait
    /// is pending. Call-stack faults are fatal and surface as errors; the
    /// driver decides whether to halt.
    pub fn step(&mut self) -> MachineResult<()> {
        if let Mode::WaitingForKey { .. } = self.mode {
            return Ok(());
        }
        let word = self.memory.read_word(self.pc);
        self.execute(Opcode::decode(word))
    }

    /// One 60 Hz timer tick, independent of instruction throughput and of
    /// any key-wait stall.
    pub fn tick_timers(&mut self) {
        self.timers.tick();
    }

    pub fn render_target(&self) -> &FrameBuffer {
        &self.fb
    }

    /// Mirror one host key state into the keypad. A fresh press edge (not a
    /// held key) also satisfies a pending key-wait: the symbol lands in the
    /// destination register and execution resumes past the wait opcode.
    pub fn set_key(&mut self, symbol: u8, pressed: bool) {
        let edge = self.keypad.set(symbol, pressed);
        if !edge {
            return;
        }
        if let Mode::WaitingForKey { dest } = self.mode {
            self.regs.set(dest, symbol);
            self.pc = self.pc.wrapping_add(2);
            self.mode = Mode::Running;
        }
    }

    pub fn is_waiting_for_key(&self) -> bool {
        matches!(self.mode, Mode::WaitingForKey { .. })
    }

    /// Audio cue for the host: true while the sound timer runs.
    pub fn sound_active(&self) -> bool {
        self.timers.sound_active()
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn register(&self, reg: u8) -> u8 {
        self.regs.get(reg)
    }

    fn advance(&mut self) {
        self.pc = self.pc.wrapping_add(2);
    }

    /// Advance past this instruction, skipping one more when `cond` holds.
    fn skip_if(&mut self, cond: bool) {
        self.pc = self.pc.wrapping_add(if cond { 4 } else { 2 });
    }

    fn execute(&mut self, op: Opcode) -> MachineResult<()> {
        match op {
            Opcode::Clear => {
                self.fb.clear();
                self.advance();
            }
            Opcode::Return => {
                self.pc = self
                    .stack
                    .pop()
                    .ok_or(MachineError::StackUnderflow { pc: self.pc })?;
            }
            Opcode::Sys(_) => self.advance(),
            Opcode::Jump(addr) => self.pc = addr,
            Opcode::Call(addr) => {
                self.stack
                    .push(self.pc.wrapping_add(2))
                    .ok_or(MachineError::StackOverflow {
                        pc: self.pc,
                        max: MAX_DEPTH,
                    })?;
                self.pc = addr;
            }
            Opcode::SkipEqImm(x, imm) => self.skip_if(self.regs.get(x) == imm),
            Opcode::SkipNeImm(x, imm) => self.skip_if(self.regs.get(x) != imm),
            Opcode::SkipEqReg(x, y) => self.skip_if(self.regs.get(x) == self.regs.get(y)),
            Opcode::SkipNeReg(x, y) => self.skip_if(self.regs.get(x) != self.regs.get(y)),
            Opcode::LoadImm(x, imm) => {
                self.regs.set(x, imm);
                self.advance();
            }
            Opcode::AddImm(x, imm) => {
                self.regs.set(x, self.regs.get(x).wrapping_add(imm));
                self.advance();
            }
            Opcode::Copy(x, y) => {
                self.regs.set(x, self.regs.get(y));
                self.advance();
            }
            Opcode::Or(x, y) => {
                self.regs.set(x, self.regs.get(x) | self.regs.get(y));
                self.advance();
            }
            Opcode::And(x, y) => {
                self.regs.set(x, self.regs.get(x) & self.regs.get(y));
                self.advance();
            }
            Opcode::Xor(x, y) => {
                self.regs.set(x, self.regs.get(x) ^ self.regs.get(y));
                self.advance();
            }
            // The flag lands after the result so it wins when x is VF.
            Opcode::Add(x, y) => {
                let (a, b) = (self.regs.get(x), self.regs.get(y));
                let carry = a > 0xFF - b;
                self.regs.set(x, a.wrapping_add(b));
                self.regs.set_flag(carry as u8);
                self.advance();
            }
            Opcode::Sub(x, y) => {
                let (a, b) = (self.regs.get(x), self.regs.get(y));
                let no_borrow = a >= b;
                self.regs.set(x, a.wrapping_sub(b));
                self.regs.set_flag(no_borrow as u8);
                self.advance();
            }
            Opcode::SubReverse(x, y) => {
                let (a, b) = (self.regs.get(x), self.regs.get(y));
                let no_borrow = b >= a;
                self.regs.set(x, b.wrapping_sub(a));
                self.regs.set_flag(no_borrow as u8);
                self.advance();
            }
            Opcode::ShiftRight(x) => {
                let value = self.regs.get(x);
                self.regs.set(x, value >> 1);
                self.regs.set_flag(value & 0x01);
                self.advance();
            }
            Opcode::ShiftLeft(x) => {
                let value = self.regs.get(x);
                self.regs.set(x, value << 1);
                self.regs.set_flag(value >> 7);
                self.advance();
            }
            Opcode::LoadIndex(addr) => {
                self.index = addr;
                self.advance();
            }
            Opcode::JumpOffset(addr) => {
                self.pc = addr.wrapping_add(self.regs.get(0) as u16);
            }
            Opcode::Random(x, mask) => {
                let byte: u8 = self.rng.gen();
                self.regs.set(x, byte & mask);
                self.advance();
            }
            Opcode::Draw(x, y, n) => {
                let mut rows = [0u8; 16];
                let n = n as usize;
                for (row, slot) in rows[..n].iter_mut().enumerate() {
                    *slot = self.memory.read(self.index.wrapping_add(row as u16));
                }
                // VF drops before the coordinates are read, so a sprite
                // positioned by VF draws from a cleared flag.
                self.regs.set_flag(0);
                let px = self.regs.get(x);
                let py = self.regs.get(y);
                let collision = self.fb.draw_sprite(px, py, &rows[..n]);
                self.regs.set_flag(collision as u8);
                self.advance();
            }
            Opcode::SkipKeyPressed(x) => {
                self.skip_if(self.keypad.is_pressed(self.regs.get(x)));
            }
            Opcode::SkipKeyReleased(x) => {
                self.skip_if(!self.keypad.is_pressed(self.regs.get(x)));
            }
            Opcode::ReadDelay(x) => {
                self.regs.set(x, self.timers.delay);
                self.advance();
            }
            Opcode::WaitKey(x) => {
                // PC holds on this instruction until a press edge arrives.
                self.mode = Mode::WaitingForKey { dest: x };
            }
            Opcode::SetDelay(x) => {
                self.timers.delay = self.regs.get(x);
                self.advance();
            }
            Opcode::SetSound(x) => {
                self.timers.sound = self.regs.get(x);
                self.advance();
            }
            Opcode::AddIndex(x) => {
                self.index = self.index.wrapping_add(self.regs.get(x) as u16);
                self.advance();
            }
            Opcode::FontAddress(x) => {
                self.index = self.regs.get(x) as u16 * 5;
                self.advance();
            }
            Opcode::StoreBcd(x) => {
                let value = self.regs.get(x);
                self.memory.write(self.index, value / 100);
                self.memory.write(self.index.wrapping_add(1), value / 10 % 10);
                self.memory.write(self.index.wrapping_add(2), value % 10);
                self.advance();
            }
            Opcode::StoreRegisters(x) => {
                for reg in 0..=x {
                    self.memory
                        .write(self.index.wrapping_add(reg as u16), self.regs.get(reg));
                }
                self.advance();
            }
            Opcode::LoadRegisters(x) => {
                for reg in 0..=x {
                    let value = self.memory.read(self.index.wrapping_add(reg as u16));
                    self.regs.set(reg, value);
                }
                self.advance();
            }
            Opcode::Unknown(word) => {
                tracing::warn!("unknown opcode {word:#06x} at {:#05x}, skipping", self.pc);
                self.advance();
            }
        }
        Ok(())
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine_with(program: &[u8]) -> Machine {
        let mut machine = Machine::new();
        machine.load(program).unwrap();
        machine
    }

    #[test]
    fn carry_flag_lands_after_the_sum_when_x_is_vf() {
        // VF = 200, V1 = 100, VF += V1: the carry must win
        let mut m = machine_with(&[0x6F, 0xC8, 0x61, 0x64, 0x8F, 0x14]);
        for _ in 0..3 {
            m.step().unwrap();
        }
        assert_eq!(m.register(0xF), 1);
    }

    #[test]
    fn shift_left_reports_the_high_bit() {
        // V0 = 0b0000_1000: bit 3 set must not leak into the flag
        let mut m = machine_with(&[0x60, 0x08, 0x80, 0x0E]);
        m.step().unwrap();
        m.step().unwrap();
        assert_eq!(m.register(0), 0x10);
        assert_eq!(m.register(0xF), 0);

        // V1 = 0b1000_0001 shifts its top bit out
        let mut m = machine_with(&[0x61, 0x81, 0x81, 0x0E]);
        m.step().unwrap();
        m.step().unwrap();
        assert_eq!(m.register(1), 0x02);
        assert_eq!(m.register(0xF), 1);
    }

    #[test]
    fn shift_right_reports_the_low_bit() {
        let mut m = machine_with(&[0x60, 0x05, 0x80, 0x06]);
        m.step().unwrap();
        m.step().unwrap();
        assert_eq!(m.register(0), 0x02);
        assert_eq!(m.register(0xF), 1);
    }

    #[test]
    fn draw_clears_the_flag_before_reading_coordinates() {
        // VF = 3 doubles as the x coordinate; the sprite must land at the
        // cleared flag value 0, not at 3
        let mut m = machine_with(&[0x6F, 0x03, 0xA0, 0x00, 0xDF, 0x15]);
        for _ in 0..3 {
            m.step().unwrap();
        }
        assert!(m.render_target().pixel(0, 0));
        assert!(!m.render_target().pixel(4, 0));
        assert_eq!(m.register(0xF), 0);
    }

    #[test]
    fn font_address_points_into_the_glyph_table() {
        let mut m = machine_with(&[0x60, 0x0A, 0xF0, 0x29]);
        m.step().unwrap();
        m.step().unwrap();
        assert_eq!(m.index(), 10 * 5);
    }

    #[test]
    fn random_respects_the_immediate_mask() {
        let mut m = machine_with(&[0xC0, 0x0F, 0xC1, 0x00]);
        m.step().unwrap();
        m.step().unwrap();
        assert_eq!(m.register(0) & 0xF0, 0);
        assert_eq!(m.register(1), 0);
    }

    #[test]
    fn jump_offset_adds_v0() {
        let mut m = machine_with(&[0x60, 0x04, 0xB3, 0x00]);
        m.step().unwrap();
        m.step().unwrap();
        assert_eq!(m.pc(), 0x304);
    }

    #[test]
    fn sys_is_ignored_and_stepped_over() {
        let mut m = machine_with(&[0x01, 0x23, 0x60, 0x42]);
        m.step().unwrap();
        assert_eq!(m.pc(), 0x202);
        m.step().unwrap();
        assert_eq!(m.register(0), 0x42);
    }
}
