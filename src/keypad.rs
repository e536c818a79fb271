pub const NUM_KEYS: usize = 16;

/// State of the 16-symbol hex keypad, indexed 0x0..=0xF. The host input
/// collaborator mirrors its key states in every frame; the machine reads
/// them for the key-test opcodes and watches for press edges to satisfy a
/// pending key-wait.
pub struct Keypad {
    keys: [bool; NUM_KEYS],
}

impl Keypad {
    pub fn new() -> Self {
        Self {
            keys: [false; NUM_KEYS],
        }
    }

    /// Record the state of one key. Returns true only on a fresh press edge,
    /// not while the key is held. Symbols above 0xF are ignored.
    pub fn set(&mut self, symbol: u8, pressed: bool) -> bool {
        let Some(slot) = self.keys.get_mut(symbol as usize) else {
            return false;
        };
        let was_pressed = *slot;
        *slot = pressed;
        pressed && !was_pressed
    }

    /// Key-test lookup. An out-of-range value reads as "not pressed".
    pub fn is_pressed(&self, value: u8) -> bool {
        self.keys.get(value as usize).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_edge_fires_once_until_released() {
        let mut keypad = Keypad::new();
        assert!(keypad.set(0x4, true));
        assert!(!keypad.set(0x4, true)); // held, no new edge
        assert!(!keypad.set(0x4, false));
        assert!(keypad.set(0x4, true));
    }

    #[test]
    fn out_of_range_reads_as_released() {
        let mut keypad = Keypad::new();
        keypad.set(0xF, true);
        assert!(keypad.is_pressed(0xF));
        assert!(!keypad.is_pressed(0x10));
        assert!(!keypad.is_pressed(0xFF));
    }

    #[test]
    fn out_of_range_set_is_ignored() {
        let mut keypad = Keypad::new();
        assert!(!keypad.set(0x20, true));
        for symbol in 0..NUM_KEYS as u8 {
            assert!(!keypad.is_pressed(symbol));
        }
    }
}
