use std::fmt;

/// Seed for engine-allocated ids. Counts down from here.
pub const ENGINE_ID_SEED: u64 = 0xFFFF_FFFA;

/// Identifies a pending timer.
///
/// Author ids come from guide files and are what `stop_timer` can target.
/// Engine ids are allocated internally. The two never compare equal, so an
/// author can't accidentally cancel (or overwrite) an engine timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKey {
    Author(u32),
    Engine(u64),
}

impl fmt::Display for TimerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Author(id) => write!(f, "author:{id}"),
            Self::Engine(id) => write!(f, "engine:{id}"),
        }
    }
}

/// Hands out engine ids, counting down from [`ENGINE_ID_SEED`] and wrapping.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::starting_at(ENGINE_ID_SEED)
    }

    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }

    /// Next id for which `in_use` is false.
    ///
    /// Zero is skipped since game ids treat it as "nothing".
    pub fn allocate(&mut self, in_use: impl Fn(u64) -> bool) -> u64 {
        loop {
            let id = self.next;
            self.next = self.next.wrapping_sub(1);
            if id != 0 && !in_use(id) {
                return id;
            }
        }
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_down_from_seed() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate(|_| false), ENGINE_ID_SEED);
        assert_eq!(ids.allocate(|_| false), ENGINE_ID_SEED - 1);
    }

    #[test]
    fn test_wraps_and_skips_zero() {
        let mut ids = IdAllocator::starting_at(1);
        assert_eq!(ids.allocate(|_| false), 1);
        assert_eq!(ids.allocate(|_| false), u64::MAX);
    }

    #[test]
    fn test_skips_ids_in_use() {
        let mut ids = IdAllocator::starting_at(10);
        assert_eq!(ids.allocate(|id| id == 10 || id == 9), 8);
    }

    #[test]
    fn test_author_and_engine_keys_never_collide() {
        assert_ne!(TimerKey::Author(7), TimerKey::Engine(7));
    }
}
