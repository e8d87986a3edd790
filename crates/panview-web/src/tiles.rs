#![forbid(unsafe_code)]

//! Tile-creation coordination.
//!
//! Several independent things want tile creation off: a fling in progress,
//! a zoom animation, the settle period after a zoom commit, or the tile
//! cache being disabled outright. [`TileCoordinator`] keeps one flag per
//! reason and reports when the combined answer flips, so the engine is told
//! exactly once per change.

use bitflags::bitflags;

use crate::engine::EngineSignal;

bitflags! {
    /// Reasons tile creation is currently paused.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TilePause: u8 {
        /// Content is flinging.
        const KINETIC        = 0b0001;
        /// A zoom animation is interpolating.
        const ZOOM_ANIMATION = 0b0010;
        /// A zoom was committed and the engine is re-laying out.
        const ZOOM_COMMIT    = 0b0100;
        /// The tile cache is turned off by configuration.
        const DISABLED       = 0b1000;
    }
}

/// Tile lifecycle counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileStats {
    pub created: u64,
    pub removed: u64,
    pub painted: u64,
}

impl TileStats {
    /// Tiles currently alive, as far as the signals tell.
    #[must_use]
    pub fn live(&self) -> u64 {
        self.created.saturating_sub(self.removed)
    }

    /// Count a tile signal. Returns `false` for non-tile signals.
    pub fn record(&mut self, signal: &EngineSignal) -> bool {
        match signal {
            EngineSignal::TileCreated { .. } => self.created += 1,
            EngineSignal::TileRemoved { .. } => self.removed += 1,
            EngineSignal::TilePainted { .. } => self.painted += 1,
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct TileCoordinator {
    paused: TilePause,
    stats: TileStats,
}

impl TileCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_creation_enabled(&self) -> bool {
        self.paused.is_empty()
    }

    #[must_use]
    pub fn reasons(&self) -> TilePause {
        self.paused
    }

    #[must_use]
    pub fn stats(&self) -> TileStats {
        self.stats
    }

    pub fn stats_mut(&mut self) -> &mut TileStats {
        &mut self.stats
    }

    /// Set or clear `reason`. Returns the new enabled state if it flipped.
    pub fn set_paused(&mut self, reason: TilePause, paused: bool) -> Option<bool> {
        let before = self.is_creation_enabled();
        self.paused.set(reason, paused);
        let after = self.is_creation_enabled();
        (before != after).then_some(after)
    }
}
