//! Event Collection
//!
//! A tagged-variant event log plus the enable/disable collector protocol:
//! `emit`, `emit_batch`, `count`, `get_events` (non-destructive),
//! `drain_events` (returns and clears), `clear`, `is_enabled`. Disabled
//! collection must be allocation-free, so `EventCollector` is a trait with
//! two concrete implementations rather than a single always-buffering `Vec`.

use serde::{Deserialize, Serialize};

use crate::game::grid::{BombKind, Position, TileType};

/// Why a tile was destroyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestroyReason {
    /// Part of a matched group.
    Match,
    /// Cleared by a bomb's blast region.
    Bomb,
    /// Cleared transitively by a chained bomb detonation.
    Chain,
}

/// A single simulation event. Every variant carries `tick` and `sim_time`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// A tick began.
    TickStarted {
        /// Tick index.
        tick: i64,
        /// Simulation time in seconds at tick start.
        sim_time: f32,
    },
    /// A tile was removed from the grid.
    TileDestroyed {
        /// Tick index.
        tick: i64,
        /// Simulation time in seconds.
        sim_time: f32,
        /// The destroyed tile's id.
        tile_id: u64,
        /// Cell it occupied.
        grid_position: Position,
        /// The tile's color at destruction.
        tile_type: TileType,
        /// Why it was destroyed.
        reason: DestroyReason,
    },
    /// A new tile was created (match bomb, or refill spawn).
    TileCreated {
        /// Tick index.
        tick: i64,
        /// Simulation time in seconds.
        sim_time: f32,
        /// The new tile's id.
        tile_id: u64,
        /// Cell it was created at.
        grid_position: Position,
        /// Its color.
        tile_type: TileType,
    },
    /// A tile moved from one cell to another (gravity or refill).
    TileMoved {
        /// Tick index.
        tick: i64,
        /// Simulation time in seconds.
        sim_time: f32,
        /// The moved tile's id.
        tile_id: u64,
        /// Cell moved from.
        from: Position,
        /// Cell moved to.
        to: Position,
    },
    /// A bomb tile was created by match processing.
    BombCreated {
        /// Tick index.
        tick: i64,
        /// Simulation time in seconds.
        sim_time: f32,
        /// The bomb tile's id.
        tile_id: u64,
        /// Cell the bomb occupies.
        grid_position: Position,
        /// Which kind of bomb.
        kind: BombKind,
    },
    /// A bomb tile was activated (swap-triggered or chained).
    BombActivated {
        /// Tick index.
        tick: i64,
        /// Simulation time in seconds.
        sim_time: f32,
        /// The activated bomb's id.
        tile_id: u64,
        /// Cell the bomb occupied.
        grid_position: Position,
        /// Which kind of bomb.
        kind: BombKind,
    },
    /// One match-phase pass resolved, clearing one or more groups.
    MatchResolved {
        /// Tick index.
        tick: i64,
        /// Simulation time in seconds.
        sim_time: f32,
        /// Number of groups cleared this pass.
        groups_cleared: u32,
        /// Score gained this pass.
        score_gained: i32,
    },
    /// A tick completed.
    TickCompleted {
        /// Tick index.
        tick: i64,
        /// Simulation time in seconds.
        sim_time: f32,
        /// Whether the board was stable at tick end.
        is_stable: bool,
    },
    /// `run_until_stable` hit its tick cap before the board stabilized.
    SimulationOverrun {
        /// Tick index.
        tick: i64,
        /// Simulation time in seconds.
        sim_time: f32,
        /// Number of ticks run before the cap was hit.
        ticks_run: u32,
    },
}

impl Event {
    /// The tick every variant carries.
    pub fn tick(&self) -> i64 {
        match self {
            Event::TickStarted { tick, .. }
            | Event::TileDestroyed { tick, .. }
            | Event::TileCreated { tick, .. }
            | Event::TileMoved { tick, .. }
            | Event::BombCreated { tick, .. }
            | Event::BombActivated { tick, .. }
            | Event::MatchResolved { tick, .. }
            | Event::TickCompleted { tick, .. }
            | Event::SimulationOverrun { tick, .. } => *tick,
        }
    }
}

/// The emit/drain protocol shared by both collector implementations.
pub trait EventCollector {
    /// Record a single event.
    fn emit(&mut self, event: Event);

    /// Record a batch of events, preserving order.
    fn emit_batch(&mut self, events: impl IntoIterator<Item = Event>)
    where
        Self: Sized,
    {
        for event in events {
            self.emit(event);
        }
    }

    /// Number of events currently buffered.
    fn count(&self) -> usize;

    /// Non-destructive view of buffered events, in emission order.
    fn get_events(&self) -> &[Event];

    /// Return and clear all buffered events, in emission order.
    fn drain_events(&mut self) -> Vec<Event>;

    /// Discard all buffered events without returning them.
    fn clear(&mut self);

    /// Whether this collector actually records anything.
    fn is_enabled(&self) -> bool;
}

/// Disabled collector: every `emit` is a no-op, no allocation ever occurs.
///
/// There is exactly one useful instance; [`NullCollector::instance`] always
/// returns the same value (it is zero-sized, so "same instance" is
/// structural rather than a shared pointer).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NullCollector;

impl NullCollector {
    /// The singleton null collector.
    pub const fn instance() -> Self {
        NullCollector
    }
}

impl EventCollector for NullCollector {
    #[inline]
    fn emit(&mut self, _event: Event) {}

    #[inline]
    fn count(&self) -> usize {
        0
    }

    #[inline]
    fn get_events(&self) -> &[Event] {
        &[]
    }

    #[inline]
    fn drain_events(&mut self) -> Vec<Event> {
        Vec::new()
    }

    #[inline]
    fn clear(&mut self) {}

    #[inline]
    fn is_enabled(&self) -> bool {
        false
    }
}

/// Enabled collector: an ordered, growable event buffer.
#[derive(Clone, Debug, Default)]
pub struct BufferedCollector {
    events: Vec<Event>,
}

impl BufferedCollector {
    /// An empty buffered collector.
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }
}

impl EventCollector for BufferedCollector {
    fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    fn count(&self) -> usize {
        self.events.len()
    }

    fn get_events(&self) -> &[Event] {
        &self.events
    }

    fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    fn clear(&mut self) {
        self.events.clear();
    }

    fn is_enabled(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick_event(tick: i64) -> Event {
        Event::TickCompleted {
            tick,
            sim_time: tick as f32 / 60.0,
            is_stable: true,
        }
    }

    #[test]
    fn test_null_collector_singleton_and_disabled() {
        let a = NullCollector::instance();
        let b = NullCollector::instance();
        assert_eq!(a, b);

        let mut c = NullCollector::instance();
        c.emit(tick_event(0));
        assert_eq!(c.count(), 0);
        assert!(!c.is_enabled());
        assert!(c.drain_events().is_empty());
    }

    #[test]
    fn test_buffered_collector_preserves_order() {
        let mut collector = BufferedCollector::new();
        for tick in 0..10 {
            collector.emit(tick_event(tick));
        }

        let view = collector.get_events();
        for (i, event) in view.iter().enumerate() {
            assert_eq!(event.tick(), i as i64);
        }
        assert_eq!(collector.count(), 10);

        let drained = collector.drain_events();
        assert_eq!(drained.len(), 10);
        assert_eq!(collector.count(), 0);
    }

    #[test]
    fn test_get_events_is_non_destructive() {
        let mut collector = BufferedCollector::new();
        collector.emit(tick_event(0));
        let first = collector.get_events().to_vec();
        let second = collector.get_events().to_vec();
        assert_eq!(first, second);
        assert_eq!(collector.count(), 1);
    }

    #[test]
    fn test_drain_empty_collector_is_empty() {
        let mut collector = BufferedCollector::new();
        assert!(collector.drain_events().is_empty());
        assert!(collector.drain_events().is_empty());
    }

    #[test]
    fn test_emit_batch_preserves_order() {
        let mut collector = BufferedCollector::new();
        collector.emit_batch((0..5).map(tick_event));
        assert_eq!(collector.count(), 5);
        for (i, event) in collector.get_events().iter().enumerate() {
            assert_eq!(event.tick(), i as i64);
        }
    }

    #[test]
    fn test_clear_discards_events() {
        let mut collector = BufferedCollector::new();
        collector.emit(tick_event(0));
        collector.clear();
        assert_eq!(collector.count(), 0);
    }
}
