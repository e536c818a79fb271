/// Deepest allowed subroutine nesting, the ISA's canonical limit.
pub const MAX_DEPTH: usize = 16;

/// Array-backed call stack of return addresses. Overflow and underflow are
/// reported to the caller instead of wrapping or reading stale frames.
pub struct CallStack {
    frames: [u16; MAX_DEPTH],
    depth: usize,
}

impl CallStack {
    pub fn new() -> Self {
        Self {
            frames: [0; MAX_DEPTH],
            depth: 0,
        }
    }

    /// Push a return address; `None` when all frames are in use.
    pub fn push(&mut self, addr: u16) -> Option<()> {
        if self.depth == MAX_DEPTH {
            return None;
        }
        self.frames[self.depth] = addr;
        self.depth += 1;
        Some(())
    }

    /// Pop the most recent return address; `None` when the stack is empty.
    pub fn pop(&mut self) -> Option<u16> {
        if self.depth == 0 {
            return None;
        }
        self.depth -= 1;
        Some(self.frames[self.depth])
    }

    pub fn is_empty(&self) -> bool {
        self.depth == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushes_and_pops_in_lifo_order() {
        let mut stack = CallStack::new();
        stack.push(0x202).unwrap();
        stack.push(0x304).unwrap();
        assert_eq!(stack.pop(), Some(0x304));
        assert_eq!(stack.pop(), Some(0x202));
        assert!(stack.is_empty());
    }

    #[test]
    fn refuses_the_seventeenth_frame() {
        let mut stack = CallStack::new();
        for i in 0..MAX_DEPTH {
            assert!(stack.push(0x200 + i as u16).is_some());
        }
        assert!(stack.push(0xAAA).is_none());
    }

    #[test]
    fn pop_on_empty_reports_underflow() {
        let mut stack = CallStack::new();
        assert_eq!(stack.pop(), None);
    }
}
