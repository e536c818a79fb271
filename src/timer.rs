/// The two 8-bit countdown timers. Both decay by at most 1 per tick and
/// stop at zero; the driver supplies the nominal 60 Hz cadence.
pub struct Timers {
    pub delay: u8,
    pub sound: u8,
}

impl Timers {
    pub fn new() -> Self {
        Self { delay: 0, sound: 0 }
    }

    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    /// The audio cue: the host plays a tone while this holds.
    pub fn sound_active(&self) -> bool {
        self.sound > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_and_clamps_at_zero() {
        let mut timers = Timers::new();
        timers.delay = 2;
        timers.tick();
        assert_eq!(timers.delay, 1);
        for _ in 0..10 {
            timers.tick();
        }
        assert_eq!(timers.delay, 0);
        assert_eq!(timers.sound, 0);
    }

    #[test]
    fn sound_cue_follows_the_sound_timer() {
        let mut timers = Timers::new();
        assert!(!timers.sound_active());
        timers.sound = 1;
        assert!(timers.sound_active());
        timers.tick();
        assert!(!timers.sound_active());
    }
}
