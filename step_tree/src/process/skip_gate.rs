//! Subtree suppression gate
//!
//! The gate remembers the depth of the record that set it. While active, every record
//! strictly deeper than that owner is dropped unseen; the first record at or above the
//! owner depth closes the gate and is processed normally.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipGate {
    owner_depth: Option<i32>,
}

impl SkipGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, depth: i32) {
        self.owner_depth = Some(depth);
    }

    pub fn reset(&mut self) {
        self.owner_depth = None;
    }

    pub fn is_active(&self) -> bool {
        self.owner_depth.is_some()
    }

    pub fn owner_depth(&self) -> Option<i32> {
        self.owner_depth
    }

    /// Shallowest depth that is dropped while the gate is active
    pub fn threshold(&self) -> Option<i32> {
        self.owner_depth.map(|depth| depth + 1)
    }

    /// Decide whether a record at `depth` is dropped.
    ///
    /// A record that does not reach the threshold closes the gate and is not dropped.
    pub fn should_skip(&mut self, depth: i32) -> bool {
        match self.threshold() {
            Some(threshold) if depth >= threshold => true,
            Some(_) => {
                self.reset();
                false
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inactive_gate_admits_everything() {
        let mut gate = SkipGate::new();
        assert!(!gate.should_skip(0));
        assert!(!gate.should_skip(42));
        assert!(!gate.is_active());
    }

    #[test]
    fn test_drops_deeper_records_until_shallower_one_arrives() {
        let mut gate = SkipGate::new();
        gate.set(2);
        assert_eq!(gate.threshold(), Some(3));

        assert!(gate.should_skip(3));
        assert!(gate.should_skip(5));
        assert!(gate.is_active());

        // The closing record itself is kept
        assert!(!gate.should_skip(2));
        assert!(!gate.is_active());
        assert!(!gate.should_skip(4));
    }

    #[test]
    fn test_set_overrides_previous_owner() {
        let mut gate = SkipGate::new();
        gate.set(4);
        gate.set(1);
        assert_eq!(gate.owner_depth(), Some(1));
        assert!(gate.should_skip(2));

        gate.reset();
        assert_eq!(gate.threshold(), None);
    }
}
