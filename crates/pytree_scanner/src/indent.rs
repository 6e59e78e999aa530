//! The indentation tracker.
//!
//! A stack of the whitespace prefixes of the currently open suites,
//! outermost first. Widths (string lengths) strictly increase toward the
//! top. A shorter line pops every entry wider than it; landing between
//! two known widths is an inconsistency the caller reports as a fatal
//! syntax error.

/// Result of comparing a new line's indentation against the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentChange {
    /// Same width as the current level.
    Same,
    /// Wider: the caller pushes and emits one INDENT.
    Deeper,
    /// Narrower: pop this many levels, emitting that many DEDENTs.
    Shallower(u32),
    /// Narrower, but the width was never on the stack.
    Inconsistent,
}

#[derive(Debug, Clone, Default)]
pub struct IndentTracker {
    stack: Vec<String>,
}

impl IndentTracker {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Number of open indentation levels.
    pub fn depth(&self) -> u32 {
        self.stack.len() as u32
    }

    /// Width of the current level, 0 at top level.
    pub fn current_width(&self) -> usize {
        self.stack.last().map_or(0, |s| s.len())
    }

    /// Classify a new line's indentation prefix.
    pub fn classify(&self, indent: &str) -> IndentChange {
        let width = indent.len();
        let current = self.current_width();
        if width > current {
            IndentChange::Deeper
        } else if width == current {
            IndentChange::Same
        } else {
            let pops = self
                .stack
                .iter()
                .rev()
                .take_while(|entry| entry.len() > width)
                .count() as u32;
            let remaining = self.stack.len() - pops as usize;
            let landing = if remaining == 0 {
                0
            } else {
                self.stack[remaining - 1].len()
            };
            if landing == width {
                IndentChange::Shallower(pops)
            } else {
                IndentChange::Inconsistent
            }
        }
    }

    /// Open a deeper level. The caller has already classified the line
    /// as `Deeper`.
    pub fn push(&mut self, indent: String) {
        debug_assert!(indent.len() > self.current_width());
        self.stack.push(indent);
    }

    /// Close `count` levels.
    pub fn pop(&mut self, count: u32) {
        for _ in 0..count {
            self.stack.pop();
        }
    }

    /// Close every open level, returning how many were open.
    pub fn drain(&mut self) -> u32 {
        let depth = self.depth();
        self.stack.clear();
        depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_same() {
        let mut tracker = IndentTracker::new();
        assert_eq!(tracker.classify("    "), IndentChange::Deeper);
        tracker.push("    ".to_string());
        assert_eq!(tracker.classify("    "), IndentChange::Same);
        assert_eq!(tracker.classify(""), IndentChange::Shallower(1));
    }

    #[test]
    fn test_multi_dedent() {
        let mut tracker = IndentTracker::new();
        tracker.push("  ".to_string());
        tracker.push("    ".to_string());
        tracker.push("      ".to_string());
        assert_eq!(tracker.classify(""), IndentChange::Shallower(3));
        assert_eq!(tracker.classify("  "), IndentChange::Shallower(2));
        assert_eq!(tracker.classify("    "), IndentChange::Shallower(1));
    }

    #[test]
    fn test_inconsistent_dedent() {
        let mut tracker = IndentTracker::new();
        tracker.push("    ".to_string());
        tracker.push("        ".to_string());
        // Width 6 was never on the stack.
        assert_eq!(tracker.classify("      "), IndentChange::Inconsistent);
    }

    #[test]
    fn test_drain() {
        let mut tracker = IndentTracker::new();
        tracker.push(" ".to_string());
        tracker.push("  ".to_string());
        assert_eq!(tracker.drain(), 2);
        assert_eq!(tracker.depth(), 0);
    }
}
