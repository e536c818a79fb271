/// One decoded instruction. Field order follows the encoding: register
/// indices x/y are the embedded 4-bit fields, `u8` immediates are the low
/// byte, `u16` addresses the low 12 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// 00E0 - blank the framebuffer
    Clear,
    /// 00EE - pop the call stack into the program counter
    Return,
    /// 0nnn - legacy machine-code jump, deliberately ignored
    Sys(u16),
    /// 1nnn
    Jump(u16),
    /// 2nnn
    Call(u16),
    /// 3xkk - skip next instruction if Vx == kk
    SkipEqImm(u8, u8),
    /// 4xkk - skip next instruction if Vx != kk
    SkipNeImm(u8, u8),
    /// 5xy0 - skip next instruction if Vx == Vy
    SkipEqReg(u8, u8),
    /// 6xkk - Vx = kk
    LoadImm(u8, u8),
    /// 7xkk - Vx += kk, wrapping, no flag
    AddImm(u8, u8),
    /// 8xy0 - Vx = Vy
    Copy(u8, u8),
    /// 8xy1
    Or(u8, u8),
    /// 8xy2
    And(u8, u8),
    /// 8xy3
    Xor(u8, u8),
    /// 8xy4 - Vx += Vy, VF = carry
    Add(u8, u8),
    /// 8xy5 - Vx -= Vy, VF = no borrow
    Sub(u8, u8),
    /// 8xy6 - Vx >>= 1, VF = bit shifted out
    ShiftRight(u8),
    /// 8xy7 - Vx = Vy - Vx, VF = no borrow
    SubReverse(u8, u8),
    /// 8xyE - Vx <<= 1, VF = bit shifted out
    ShiftLeft(u8),
    /// 9xy0 - skip next instruction if Vx != Vy
    SkipNeReg(u8, u8),
    /// Annn - I = nnn
    LoadIndex(u16),
    /// Bnnn - jump to nnn + V0
    JumpOffset(u16),
    /// Cxkk - Vx = random byte AND kk
    Random(u8, u8),
    /// Dxyn - XOR an n-row sprite from I at (Vx, Vy), VF = collision
    Draw(u8, u8, u8),
    /// Ex9E - skip if the key numbered by Vx is down
    SkipKeyPressed(u8),
    /// ExA1 - skip if the key numbered by Vx is up
    SkipKeyReleased(u8),
    /// Fx07 - Vx = delay timer
    ReadDelay(u8),
    /// Fx0A - stall until a key press edge lands in Vx
    WaitKey(u8),
    /// Fx15 - delay timer = Vx
    SetDelay(u8),
    /// Fx18 - sound timer = Vx
    SetSound(u8),
    /// Fx1E - I += Vx
    AddIndex(u8),
    /// Fx29 - I = address of the font glyph for Vx
    FontAddress(u8),
    /// Fx33 - hundreds/tens/ones of Vx stored at I, I+1, I+2
    StoreBcd(u8),
    /// Fx55 - V0..=Vx stored at I onward
    StoreRegisters(u8),
    /// Fx65 - V0..=Vx loaded from I onward
    LoadRegisters(u8),
    /// No mapped header/sub-code combination; reported and skipped
    Unknown(u16),
}

impl Opcode {
    /// Decode one big-endian instruction word.
    pub fn decode(word: u16) -> Self {
        let header = (word >> 12) as u8;
        let address = word & 0x0FFF;
        let nibble = (word & 0x000F) as u8;
        let x = ((word >> 8) & 0x0F) as u8;
        let y = ((word >> 4) & 0x0F) as u8;
        let imm = (word & 0x00FF) as u8;

        match header {
            0x0 => match word {
                0x00E0 => Opcode::Clear,
                0x00EE => Opcode::Return,
                _ => Opcode::Sys(address),
            },
            0x1 => Opcode::Jump(address),
            0x2 => Opcode::Call(address),
            0x3 => Opcode::SkipEqImm(x, imm),
            0x4 => Opcode::SkipNeImm(x, imm),
            // the low nibble of 5xy0/9xy0 is not inspected
            0x5 => Opcode::SkipEqReg(x, y),
            0x6 => Opcode::LoadImm(x, imm),
            0x7 => Opcode::AddImm(x, imm),
            0x8 => match nibble {
                0x0 => Opcode::Copy(x, y),
                0x1 => Opcode::Or(x, y),
                0x2 => Opcode::And(x, y),
                0x3 => Opcode::Xor(x, y),
                0x4 => Opcode::Add(x, y),
                0x5 => Opcode::Sub(x, y),
                0x6 => Opcode::ShiftRight(x),
                0x7 => Opcode::SubReverse(x, y),
                0xE => Opcode::ShiftLeft(x),
                _ => Opcode::Unknown(word),
            },
            0x9 => Opcode::SkipNeReg(x, y),
            0xA => Opcode::LoadIndex(address),
            0xB => Opcode::JumpOffset(address),
            0xC => Opcode::Random(x, imm),
            0xD => Opcode::Draw(x, y, nibble),
            0xE => match imm {
                0x9E => Opcode::SkipKeyPressed(x),
                0xA1 => Opcode::SkipKeyReleased(x),
                _ => Opcode::Unknown(word),
            },
            0xF => match imm {
                0x07 => Opcode::ReadDelay(x),
                0x0A => Opcode::WaitKey(x),
                0x15 => Opcode::SetDelay(x),
                0x18 => Opcode::SetSound(x),
                0x1E => Opcode::AddIndex(x),
                0x29 => Opcode::FontAddress(x),
                0x33 => Opcode::StoreBcd(x),
                0x55 => Opcode::StoreRegisters(x),
                0x65 => Opcode::LoadRegisters(x),
                _ => Opcode::Unknown(word),
            },
            _ => unreachable!("4-bit header"),
        }
    }
}
