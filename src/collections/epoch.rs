//! Generational stamp array.
//!
//! Each slot remembers the epoch it was last touched in. A slot whose stamp
//! falls in `[epoch, epoch + phases)` is marked in phase `stamp - epoch`;
//! anything else reads as untouched. Advancing the epoch by `phases` forgets
//! every mark in O(1). When the counter nears `u32::MAX` all stamps are zeroed
//! once and the epoch restarts at 1, so a stale stamp can never alias a live one.

#[derive(Debug, Clone)]
pub struct EpochSlots {
    stamps: Vec<u32>,
    epoch: u32,
    phases: u32,
}

impl EpochSlots {
    /// Creates `len` untouched slots, each markable in `phases` distinct states.
    ///
    /// # Panics
    ///
    /// Panics if `phases` is zero.
    #[must_use]
    pub fn new(len: usize, phases: u32) -> Self {
        assert!(phases > 0, "epoch slots need at least one phase");
        Self {
            stamps: vec![0; len],
            epoch: 1,
            phases,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    /// Grows the array to at least `len` slots; new slots are untouched.
    pub fn ensure_len(&mut self, len: usize) {
        if self.stamps.len() < len {
            self.stamps.resize(len, 0);
        }
    }

    /// Phase of `slot` in the current epoch, or `None` if untouched.
    #[must_use]
    pub fn phase(&self, slot: usize) -> Option<u32> {
        let stamp = self.stamps[slot];
        (stamp >= self.epoch && stamp - self.epoch < self.phases).then(|| stamp - self.epoch)
    }

    #[must_use]
    pub fn is_marked(&self, slot: usize) -> bool {
        self.phase(slot).is_some()
    }

    pub fn mark(&mut self, slot: usize, phase: u32) {
        debug_assert!(phase < self.phases);
        self.stamps[slot] = self.epoch + phase;
    }

    /// Forgets every mark.
    pub fn advance(&mut self) {
        if self.epoch > u32::MAX - 2 * self.phases {
            self.stamps.fill(0);
            self.epoch = 1;
        } else {
            self.epoch += self.phases;
        }
    }

    #[must_use]
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Moves the counter to an arbitrary value, for exercising wraparound.
    #[cfg(test)]
    pub(crate) fn set_epoch(&mut self, epoch: u32) {
        self.epoch = epoch;
    }
}
