use crate::{MachineError, MachineResult};

pub const MEM_SIZE: usize = 4096;

/// Where loaded program images begin; everything below is interpreter
/// territory holding the font table.
pub const PROGRAM_START: u16 = 0x200;

/// The canonical hex font: 16 glyphs of 5 bytes each, installed at 0x000.
const FONT: [u8; 5 * 16] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Byte-addressable 4 KiB store. Every access is taken modulo the memory
/// size, so index-register arithmetic that runs past the 12-bit address
/// space wraps deterministically instead of faulting.
pub struct Memory {
    bytes: [u8; MEM_SIZE],
}

impl Memory {
    pub fn new() -> Self {
        let mut bytes = [0; MEM_SIZE];
        bytes[..FONT.len()].copy_from_slice(&FONT);
        Self { bytes }
    }

    pub fn read(&self, addr: u16) -> u8 {
        self.bytes[addr as usize % MEM_SIZE]
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        self.bytes[addr as usize % MEM_SIZE] = value;
    }

    /// Big-endian instruction word at `addr`.
    pub fn read_word(&self, addr: u16) -> u16 {
        let hi = self.read(addr);
        let lo = self.read(addr.wrapping_add(1));
        (hi as u16) << 8 | lo as u16
    }

    /// Copy a program image in at 0x200. Images that do not fit are
    /// rejected outright rather than truncated.
    pub fn load_program(&mut self, image: &[u8]) -> MachineResult<()> {
        let start = PROGRAM_START as usize;
        let capacity = MEM_SIZE - start;
        if image.len() > capacity {
            return Err(MachineError::ProgramTooLarge {
                size: image.len(),
                capacity,
            });
        }
        self.bytes[start..start + image.len()].copy_from_slice(image);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_is_installed_at_zero() {
        let mem = Memory::new();
        // glyph "0" leads the table, glyph "F" ends at 0x04F
        assert_eq!(mem.read(0x000), 0xF0);
        assert_eq!(mem.read(0x001), 0x90);
        assert_eq!(mem.read(0x04F), 0x80);
        assert_eq!(mem.read(0x050), 0x00);
    }

    #[test]
    fn addresses_wrap_modulo_memory_size() {
        let mut mem = Memory::new();
        mem.write(0x1005, 0xAB);
        assert_eq!(mem.read(0x005), 0xAB);
        assert_eq!(mem.read(0x1005), 0xAB);
    }

    #[test]
    fn words_are_big_endian() {
        let mut mem = Memory::new();
        mem.write(0x400, 0x12);
        mem.write(0x401, 0x34);
        assert_eq!(mem.read_word(0x400), 0x1234);
    }

    #[test]
    fn program_lands_at_the_program_start() {
        let mut mem = Memory::new();
        mem.load_program(&[0x60, 0x05, 0x70, 0x03]).unwrap();
        assert_eq!(mem.read(0x200), 0x60);
        assert_eq!(mem.read(0x203), 0x03);
    }

    #[test]
    fn oversized_image_is_rejected() {
        let mut mem = Memory::new();
        let exact_fit = vec![0; MEM_SIZE - PROGRAM_START as usize];
        assert!(mem.load_program(&exact_fit).is_ok());

        let too_big = vec![0; MEM_SIZE - PROGRAM_START as usize + 1];
        assert!(matches!(
            mem.load_program(&too_big),
            Err(MachineError::ProgramTooLarge { .. })
        ));
    }
}
