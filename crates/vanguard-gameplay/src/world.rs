//! The world the combat components act on.
//!
//! Components never own sprites. They hold IDs and reach sprites through a
//! [`CombatWorld`], which bundles the sprite capabilities ([`SpriteStore`])
//! with the request/response port ([`EventManager`]).

use tracing::{debug, info};
use vanguard_common::EntityId;

use crate::entity::{Sprite, SpriteArena, SpriteKind};
use crate::events::{EventBus, EventManager, EventMessage, EventReply, GameEvent};

/// Sprite capabilities combat relies on.
pub trait SpriteStore {
    /// Looks up a live sprite.
    fn sprite(&self, id: EntityId) -> Option<&Sprite>;

    /// Looks up a live sprite mutably.
    fn sprite_mut(&mut self, id: EntityId) -> Option<&mut Sprite>;

    /// Applies damage. Returns remaining life, or `None` if the sprite is gone.
    fn receive_damage(&mut self, id: EntityId, amount: i32) -> Option<i32> {
        self.sprite_mut(id).map(|sprite| sprite.receive_damage(amount))
    }

    /// Shifts a sprite horizontally. Returns `false` if the sprite is gone.
    fn displace(&mut self, id: EntityId, dx: i32) -> bool {
        match self.sprite_mut(id) {
            Some(sprite) => {
                let cx = sprite.rect.centerx();
                sprite.rect.set_centerx(cx + dx);
                true
            },
            None => false,
        }
    }

    /// Defeat notification: the sprite's life ran out.
    fn defeat(&mut self, id: EntityId);

    /// Removes the sprite from the active set.
    fn kill(&mut self, id: EntityId);
}

/// Everything an attack component needs from its surroundings.
pub trait CombatWorld: EventManager + SpriteStore {}

impl<T: EventManager + SpriteStore + ?Sized> CombatWorld for T {}

/// Arena-backed world that reports outcomes on an [`EventBus`].
#[derive(Debug, Default)]
pub struct SpriteWorld {
    arena: SpriteArena,
    bus: EventBus,
}

impl SpriteWorld {
    /// Creates an empty world with the default bus capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sprite to the world.
    pub fn spawn(&mut self, sprite: Sprite) -> EntityId {
        self.arena.spawn(sprite)
    }

    /// Read access to the sprite storage.
    #[must_use]
    pub const fn arena(&self) -> &SpriteArena {
        &self.arena
    }

    /// The world's event bus.
    #[must_use]
    pub const fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Drains every event published since the last drain.
    pub fn drain_events(&self) -> Vec<GameEvent> {
        self.bus.drain()
    }

    /// Live sprites on one side.
    #[must_use]
    pub fn count(&self, kind: SpriteKind) -> usize {
        self.arena.iter_by_kind(kind).count()
    }
}

impl EventManager for SpriteWorld {
    fn notify(&mut self, message: EventMessage) -> EventReply {
        match message {
            EventMessage::GetPlayerSprites => {
                EventReply::Sprites(self.arena.ids_by_kind(SpriteKind::Player))
            },
            EventMessage::GetMobSprites => EventReply::Sprites(self.arena.ids_by_kind(SpriteKind::Mob)),
            EventMessage::PlayerAttack { state } => {
                self.bus.publish(GameEvent::PlayerAttack { state });
                EventReply::Ack
            },
        }
    }
}

impl SpriteStore for SpriteWorld {
    fn sprite(&self, id: EntityId) -> Option<&Sprite> {
        self.arena.get(id).ok()
    }

    fn sprite_mut(&mut self, id: EntityId) -> Option<&mut Sprite> {
        self.arena.get_mut(id).ok()
    }

    fn receive_damage(&mut self, id: EntityId, amount: i32) -> Option<i32> {
        let remaining_life = self.arena.get_mut(id).ok()?.receive_damage(amount);
        self.bus.publish(GameEvent::EntityDamaged {
            entity_id: id,
            damage: amount,
            remaining_life,
        });
        Some(remaining_life)
    }

    fn displace(&mut self, id: EntityId, dx: i32) -> bool {
        let Ok(sprite) = self.arena.get_mut(id) else {
            return false;
        };
        let cx = sprite.rect.centerx();
        sprite.rect.set_centerx(cx + dx);
        self.bus.publish(GameEvent::EntityKnockedBack { entity_id: id, dx });
        true
    }

    fn defeat(&mut self, id: EntityId) {
        if let Ok(sprite) = self.arena.get_mut(id) {
            if sprite.defeat() {
                info!(entity = %id, life = sprite.life(), "sprite defeated");
                self.bus.publish(GameEvent::EntityDefeated { entity_id: id });
            }
        }
    }

    fn kill(&mut self, id: EntityId) {
        match self.arena.despawn(id) {
            Ok(_) => self.bus.publish(GameEvent::EntityDestroyed { entity_id: id }),
            Err(e) => debug!("kill ignored: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Image;
    use crate::events::AttackSignal;
    use vanguard_common::FrameId;

    fn sprite(kind: SpriteKind, x: i32, life: i32) -> Sprite {
        Sprite::new(kind, Image::new(FrameId::new(1), 20, 20), (x, 0), life)
    }

    #[test]
    fn test_queries_split_by_side() {
        let mut world = SpriteWorld::new();
        let player = world.spawn(sprite(SpriteKind::Player, 0, 10));
        let mob = world.spawn(sprite(SpriteKind::Mob, 50, 10));

        assert_eq!(
            world.notify(EventMessage::GetPlayerSprites),
            EventReply::Sprites(vec![player])
        );
        assert_eq!(
            world.notify(EventMessage::GetMobSprites),
            EventReply::Sprites(vec![mob])
        );
    }

    #[test]
    fn test_player_attack_notification_published() {
        let mut world = SpriteWorld::new();
        let reply = world.notify(EventMessage::PlayerAttack { state: AttackSignal::Start });
        assert_eq!(reply, EventReply::Ack);
        assert_eq!(
            world.drain_events(),
            vec![GameEvent::PlayerAttack { state: AttackSignal::Start }]
        );
    }

    #[test]
    fn test_defeat_fires_once_then_kill_removes() {
        let mut world = SpriteWorld::new();
        let mob = world.spawn(sprite(SpriteKind::Mob, 0, 1));

        world.defeat(mob);
        world.defeat(mob);
        world.kill(mob);
        world.kill(mob);

        assert!(world.sprite(mob).is_none());
        assert_eq!(
            world.drain_events(),
            vec![
                GameEvent::EntityDefeated { entity_id: mob },
                GameEvent::EntityDestroyed { entity_id: mob },
            ]
        );
    }

    #[test]
    fn test_displace_and_damage_missing_sprite() {
        let mut world = SpriteWorld::new();
        let ghost = EntityId::from_raw(u64::MAX);
        assert!(!world.displace(ghost, 10));
        assert_eq!(world.receive_damage(ghost, 3), None);
        assert!(world.drain_events().is_empty());
    }

    #[test]
    fn test_displace_moves_center() {
        let mut world = SpriteWorld::new();
        let mob = world.spawn(sprite(SpriteKind::Mob, 100, 5));
        assert!(world.displace(mob, -90));
        assert_eq!(world.sprite(mob).map(|s| s.rect.centerx()), Some(10));
    }
}
