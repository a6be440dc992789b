//! Strategies deciding the draw order of a match catalog.

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::state::game::Song;

/// Arranges a freshly fetched catalog into the order songs will be drawn in.
pub trait SongOrder: Send {
    /// Reorder `songs` in place.
    fn arrange(&mut self, songs: &mut [Song]);
}

/// Production order: an unbiased Fisher–Yates shuffle driven by a seedable RNG.
#[derive(Debug, Clone)]
pub struct RandomOrder {
    rng: StdRng,
}

impl RandomOrder {
    /// Seed from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible order, for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomOrder {
    fn default() -> Self {
        Self::new()
    }
}

impl SongOrder for RandomOrder {
    fn arrange(&mut self, songs: &mut [Song]) {
        songs.shuffle(&mut self.rng);
    }
}

/// Keeps the catalog in provider order.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepOrder;

impl SongOrder for KeepOrder {
    fn arrange(&mut self, _songs: &mut [Song]) {}
}
