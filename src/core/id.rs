//! Monotonic id allocation for model entities.
//!
//! Ids are plain `u64` values scoped to their owner (a project allocates
//! track and clip ids, the history engine allocates action ids, a renderer
//! allocates handle ids). They are never reused within an owner's lifetime,
//! which keeps undo payloads unambiguous.

use serde::{Deserialize, Serialize};

/// Simple monotonic id generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdGen {
    next: u64,
}

impl IdGen {
    /// Create a generator starting at 1 (0 is reserved as "no id").
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Allocate the next id.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for IdGen {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let mut gen = IdGen::new();
        let a = gen.next_id();
        let b = gen.next_id();
        let c = gen.next_id();
        assert!(a < b && b < c);
        assert_eq!(a, 1);
    }
}
