//! Error taxonomy for the simulation core.
//!
//! Only construction-time failures are fatal (`InvalidDimensions`). Every
//! runtime domain error is reported through a `bool`/event/log instead of a
//! `Result`, so it never unwinds through a tick. See the crate docs.

use thiserror::Error;

use crate::core::RandomDomain;
use crate::game::Position;

/// Errors the simulation core can report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    /// Board dimensions or tile-type count are out of range.
    #[error(
        "invalid board dimensions: {width}x{height} with {tile_types_count} tile types \
         (width/height must be positive, tile_types_count must be >= 3)"
    )]
    InvalidDimensions {
        /// Requested board width.
        width: i32,
        /// Requested board height.
        height: i32,
        /// Requested number of tile-type variants.
        tile_types_count: u8,
    },

    /// A requested swap is not a legal move.
    #[error("invalid move from {from:?} to {to:?}")]
    InvalidMove {
        /// The cell the move was requested from.
        from: Position,
        /// The cell the move was requested to.
        to: Position,
    },

    /// `run_until_stable` hit its tick cap without reaching stability.
    #[error("simulation did not stabilize within {ticks_run} ticks")]
    SimulationOverrun {
        /// Number of ticks run before the cap was hit.
        ticks_run: u32,
    },

    /// `RngStream::set_state` was called with an invalid state.
    #[error("refused to set corrupt RNG state for domain {domain:?}")]
    RngStateCorrupt {
        /// The domain whose stream rejected the state.
        domain: RandomDomain,
    },
}
