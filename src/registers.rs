/// Index of VF, the implicit carry/borrow/collision output. Arithmetic,
/// shift and draw opcodes clobber it; programs must not expect its value to
/// survive across them.
pub const FLAG: u8 = 0xF;

/// The sixteen 8-bit general-purpose registers V0..=VF.
pub struct Registers {
    v: [u8; 16],
}

impl Registers {
    pub fn new() -> Self {
        Self { v: [0; 16] }
    }

    pub fn get(&self, reg: u8) -> u8 {
        self.v[reg as usize]
    }

    pub fn set(&mut self, reg: u8, value: u8) {
        self.v[reg as usize] = value;
    }

    pub fn set_flag(&mut self, value: u8) {
        self.v[FLAG as usize] = value;
    }
}
