//! Rising-edge D-type flip-flop with asynchronous-style SET and CLEAR.

/// One stored bit plus the CLK level seen in the previous cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DType {
    stored: bool,
    last_clk: bool,
}

impl DType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored(&self) -> bool {
        self.stored
    }

    /// Commit against this cycle's stable input levels.
    ///
    /// SET wins over CLEAR, and both win over the clock edge.
    pub fn latch(&mut self, data: bool, clk: bool, set: bool, clear: bool) {
        if set {
            self.stored = true;
        } else if clear {
            self.stored = false;
        } else if clk && !self.last_clk {
            self.stored = data;
        }
        self.last_clk = clk;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latches_on_rising_edge_only() {
        let mut d = DType::new();
        d.latch(true, false, false, false);
        assert!(!d.stored());
        d.latch(true, true, false, false);
        assert!(d.stored());
        // CLK stays high: no new edge
        d.latch(false, true, false, false);
        assert!(d.stored());
        d.latch(false, false, false, false);
        d.latch(false, true, false, false);
        assert!(!d.stored());
    }

    #[test]
    fn test_set_and_clear_take_priority() {
        let mut d = DType::new();
        d.latch(false, true, true, false);
        assert!(d.stored());
        d.latch(true, false, false, true);
        assert!(!d.stored());
        d.latch(false, true, true, true);
        assert!(d.stored());
    }
}
