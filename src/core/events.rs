//! Event Queue System for Decoupled Communication
//!
//! Gameplay systems push events describing what happened this frame; the
//! host's audio, HUD and effects read them one frame later. The queue is
//! double-buffered so the order in which enemies tick never changes what a
//! reader sees.
//!
//! # Example
//!
//! ```ignore
//! // In the combat pass
//! services.emit(GameEvent::UnitDamaged {
//!     entity,
//!     amount: 10,
//!     origin: UnitType::Snowman,
//! });
//!
//! // In the host, next frame
//! for event in services.events.iter() {
//!     if let GameEvent::UnitDied { entity, .. } = event {
//!         play_death_sound(*entity);
//!     }
//! }
//! ```

use std::collections::VecDeque;

use glam::Vec3;
use hecs::Entity;

use crate::ai::StateKey;
use crate::combat::{AttackKind, UnitType};

// ============================================================================
// Event Types
// ============================================================================

/// Gameplay events for inter-system communication.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum GameEvent {
    // -------------------------------------------------------------------------
    // Combat Events
    // -------------------------------------------------------------------------
    /// A unit took damage from an attack.
    UnitDamaged {
        /// The damaged unit
        entity: Entity,
        /// Damage applied
        amount: i32,
        /// Archetype of the attacker
        origin: UnitType,
    },

    /// A unit's health reached zero.
    UnitDied {
        /// The unit that died
        entity: Entity,
        /// Its archetype
        unit_type: UnitType,
    },

    /// An attack entity was spawned.
    AttackSpawned {
        /// The new attack entity
        attack: Entity,
        /// Unit that requested it
        instigator: Entity,
        /// Melee or ranged
        kind: AttackKind,
        /// Spawn position
        position: Vec3,
    },

    /// An entity was removed from the world.
    EntityDespawned {
        /// The removed entity
        entity: Entity,
    },

    // -------------------------------------------------------------------------
    // AI Events
    // -------------------------------------------------------------------------
    /// An enemy's perception confirmed line of sight to the player.
    PlayerSpotted {
        /// The enemy that saw the player
        enemy: Entity,
        /// Distance of the confirming ray hit
        distance: f32,
    },

    /// An enemy's state machine switched states.
    StateChanged {
        /// The enemy
        enemy: Entity,
        /// Previous state, if any
        from: Option<StateKey>,
        /// New state
        to: StateKey,
    },
}

// ============================================================================
// Event Queue
// ============================================================================

/// Double-buffered event queue for frame-consistent event processing.
///
/// Events pushed during frame N are available for reading during frame N+1.
#[derive(Debug)]
pub struct EventQueue {
    /// Events being written this frame
    pending: VecDeque<GameEvent>,
    /// Events from previous frame, ready for processing
    processing: VecDeque<GameEvent>,
}

impl EventQueue {
    /// Default initial capacity for event queues.
    const DEFAULT_CAPACITY: usize = 64;

    /// Create a new event queue with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a new event queue with specified initial capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            processing: VecDeque::with_capacity(capacity),
        }
    }

    /// Push an event to be processed next frame.
    #[inline]
    pub fn push(&mut self, event: GameEvent) {
        self.pending.push_back(event);
    }

    /// Swap the pending and processing queues.
    ///
    /// Called once per frame at the start of the tick.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.processing);
        self.pending.clear();
    }

    /// Iterate over events from the previous frame.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.processing.iter()
    }

    /// Iterate over events pushed so far this frame.
    #[inline]
    pub fn iter_pending(&self) -> impl Iterator<Item = &GameEvent> {
        self.pending.iter()
    }

    /// Drain all events from the previous frame.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.processing.drain(..)
    }

    /// Check if there are any events to process.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processing.is_empty()
    }

    /// Get the number of events ready for processing.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.processing.len()
    }

    /// Get the number of events pending for next frame.
    #[must_use]
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Clear all events (both pending and processing).
    pub fn clear(&mut self) {
        self.pending.clear();
        self.processing.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
