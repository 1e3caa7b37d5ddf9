//! Event port and event bus.
//!
//! Two channels with different jobs:
//! - [`EventManager::notify`] is the synchronous request/response port the
//!   attack components call to fetch targets and announce swings.
//! - [`EventBus`] collects fire-and-forget [`GameEvent`]s for whoever drains
//!   it at the end of the frame (HUD, audio, logs).

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use vanguard_common::EntityId;

/// Start or end of a player swing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackSignal {
    /// Swing accepted
    Start,
    /// Swing finished
    End,
}

/// Requests sent through [`EventManager::notify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventMessage {
    /// Ask for every player-side sprite.
    GetPlayerSprites,
    /// Ask for every mob sprite.
    GetMobSprites,
    /// Announce a player swing starting or ending.
    PlayerAttack {
        /// Which edge of the swing
        state: AttackSignal,
    },
}

impl EventMessage {
    /// Short name used in logs and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GetPlayerSprites => "get_player_sprites",
            Self::GetMobSprites => "get_mob_sprites",
            Self::PlayerAttack { .. } => "player_attack",
        }
    }
}

/// Answers from [`EventManager::notify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventReply {
    /// Snapshot of sprite IDs. Owned, so the caller may kill sprites while
    /// walking it.
    Sprites(Vec<EntityId>),
    /// Notification received; nothing to return.
    Ack,
}

impl EventReply {
    /// Unwraps a sprite snapshot, `None` if this was an acknowledgement.
    #[must_use]
    pub fn into_sprites(self) -> Option<Vec<EntityId>> {
        match self {
            Self::Sprites(ids) => Some(ids),
            Self::Ack => None,
        }
    }
}

/// Request/response port used by attack components.
pub trait EventManager {
    /// Handles one request.
    fn notify(&mut self, message: EventMessage) -> EventReply;
}

/// Events broadcast on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Player swing started or ended
    PlayerAttack {
        /// Which edge of the swing
        state: AttackSignal,
    },
    /// Sprite took damage
    EntityDamaged {
        /// Sprite ID
        entity_id: EntityId,
        /// Damage amount
        damage: i32,
        /// Life left after the hit (may be negative)
        remaining_life: i32,
    },
    /// Sprite was shoved sideways
    EntityKnockedBack {
        /// Sprite ID
        entity_id: EntityId,
        /// Horizontal displacement in pixels
        dx: i32,
    },
    /// Sprite's life ran out
    EntityDefeated {
        /// Sprite ID
        entity_id: EntityId,
    },
    /// Sprite removed from the world
    EntityDestroyed {
        /// Sprite ID
        entity_id: EntityId,
    },
}

/// Event bus for broadcasting events to subscribers.
#[derive(Debug)]
pub struct EventBus {
    sender: Sender<GameEvent>,
    receiver: Receiver<GameEvent>,
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        Self {
            sender,
            receiver,
            capacity: capacity.max(1),
        }
    }

    /// Publishes an event. Never blocks; drops the event when full.
    pub fn publish(&self, event: GameEvent) {
        if self.sender.try_send(event).is_err() {
            tracing::warn!("event bus full, dropping event");
        }
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<GameEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
