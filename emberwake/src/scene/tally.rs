//! Collection scoring tally
//!
//! There is no scene-wide collector singleton: the host constructs
//! one tally and passes it to the collect system explicitly.

use tracing::info;

/// Clamped crystal count with a completion target
#[derive(Debug, Clone)]
pub struct CollectionTally {
    current: i32,
    target: i32,
}

impl CollectionTally {
    /// Create a tally counting from zero toward `target` (raised to at
    /// least 1).
    pub fn new(target: i32) -> Self {
        Self {
            current: 0,
            target: target.max(1),
        }
    }

    /// Apply a signed score delta, clamped into `[0, target]`. Returns the
    /// new total.
    pub fn add(&mut self, delta: i32) -> i32 {
        let before = self.current;
        self.current = (self.current + delta).clamp(0, self.target);
        if before < self.target && self.current == self.target {
            info!(target = self.target, "collection complete");
        }
        self.current
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn target(&self) -> i32 {
        self.target
    }

    /// Progress toward the target in \[0, 1\], for progress-bar style UI.
    pub fn progress01(&self) -> f32 {
        self.current as f32 / self.target as f32
    }

    /// Counter text in "current / target" form, ready for a HUD label.
    pub fn summary(&self) -> String {
        format!("{} / {}", self.current, self.target)
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_clamps_to_bounds() {
        let mut tally = CollectionTally::new(10);
        assert_eq!(tally.add(3), 3);
        assert_eq!(tally.add(-5), 0);
        assert_eq!(tally.add(25), 10);
        assert!(tally.is_complete());
    }

    #[test]
    fn test_progress_and_summary() {
        let mut tally = CollectionTally::new(4);
        tally.add(1);
        assert!((tally.progress01() - 0.25).abs() < f32::EPSILON);
        assert_eq!(tally.summary(), "1 / 4");
    }

    #[test]
    fn test_target_floor_is_one() {
        let tally = CollectionTally::new(0);
        assert_eq!(tally.target(), 1);
        assert!(!tally.is_complete());
    }

    #[test]
    fn test_negative_delta_from_wrong_crystal() {
        let mut tally = CollectionTally::new(10);
        tally.add(5);
        assert_eq!(tally.add(-2), 3);
    }
}
