pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;

/// The 64x32 monochrome framebuffer, row-major, one bool per pixel. Purely
/// in-memory state: presentation belongs to the host, which rasterizes
/// `pixels()` into whatever surface it drives.
pub struct FrameBuffer {
    bits: [bool; WIDTH * HEIGHT],
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            bits: [false; WIDTH * HEIGHT],
        }
    }

    pub fn clear(&mut self) {
        self.bits = [false; WIDTH * HEIGHT];
    }

    /// XOR a sprite into the buffer at (x, y), one byte per row, the high
    /// bit leftmost. Coordinates wrap modulo the screen size on both axes.
    /// Returns true when any pixel flipped from on to off; once observed,
    /// a collision is never un-reported within the same draw.
    pub fn draw_sprite(&mut self, x: u8, y: u8, rows: &[u8]) -> bool {
        let mut collision = false;
        for (row, &byte) in rows.iter().enumerate() {
            let py = (y as usize + row) % HEIGHT;
            for col in 0..8 {
                let px = (x as usize + col) % WIDTH;
                let sprite_bit = byte & (0x80 >> col) != 0;
                let idx = py * WIDTH + px;
                let before = self.bits[idx];
                self.bits[idx] = before ^ sprite_bit;
                if before && !self.bits[idx] {
                    collision = true;
                }
            }
        }
        collision
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.bits[y * WIDTH + x]
    }

    /// Row-major pixel slice for the rendering collaborator.
    pub fn pixels(&self) -> &[bool] {
        &self.bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drawing_twice_erases_and_reports_collision() {
        let mut fb = FrameBuffer::new();
        let sprite = [0xF0, 0x90, 0xF0];

        assert!(!fb.draw_sprite(4, 2, &sprite));
        assert!(fb.pixel(4, 2));

        assert!(fb.draw_sprite(4, 2, &sprite));
        assert!(fb.pixels().iter().all(|&on| !on));
    }

    #[test]
    fn collision_sticks_across_rows() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(0, 0, &[0x80]);
        // first row collides, second row draws clean; the flag must hold
        assert!(fb.draw_sprite(0, 0, &[0x80, 0x80]));
        assert!(fb.pixel(0, 1));
    }

    #[test]
    fn sprites_wrap_around_both_edges() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(62, 31, &[0xC0, 0xC0]);

        // 2x2 block split across all four corners
        assert!(fb.pixel(62, 31));
        assert!(fb.pixel(63, 31));
        assert!(fb.pixel(62, 0));
        assert!(fb.pixel(63, 0));

        fb.clear();
        fb.draw_sprite(60, 0, &[0xFF]);
        assert!(fb.pixel(63, 0));
        assert!(fb.pixel(0, 0)); // columns 64..67 wrap to 0..3
        assert!(fb.pixel(3, 0));
        assert!(!fb.pixel(4, 0));
    }

    #[test]
    fn clear_blanks_every_pixel() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(10, 10, &[0xFF, 0xFF]);
        fb.clear();
        assert!(fb.pixels().iter().all(|&on| !on));
    }
}
