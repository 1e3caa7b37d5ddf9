//! Per-frame driver tying sprites to their components.
//!
//! A [`Stage`] owns the [`SpriteWorld`] together with every component acting
//! on it. Each [`Stage::tick`] runs in a fixed order:
//! 1. Base animations, except for sprites that are mid-swing
//! 2. The player attack
//! 3. Every mob attack
//!
//! Components whose sprite has been removed are dropped between phases.

use ahash::{AHashMap, AHashSet};
use tracing::{debug, info};
use vanguard_common::EntityId;

use crate::animation::AnimationDriver;
use crate::attack::{AttackComponent, AttackType, CombatResult};
use crate::attack_table::AttackTable;
use crate::entity::{Sprite, SpriteKind};
use crate::events::GameEvent;
use crate::player_attack::{PlayerAttack, PlayerAttackConfig};
use crate::simple_attack::{SimpleAttack, SimpleAttackConfig};
use crate::world::{SpriteStore, SpriteWorld};

/// A running fight.
#[derive(Debug)]
pub struct Stage {
    world: SpriteWorld,
    table: AttackTable,
    player: Option<PlayerAttack>,
    mobs: Vec<SimpleAttack>,
    animations: AHashMap<EntityId, AnimationDriver>,
    tick_count: u64,
}

impl Stage {
    /// Creates an empty stage whose player attacks come from `table`.
    #[must_use]
    pub fn new(table: AttackTable) -> Self {
        Self::with_world(SpriteWorld::new(), table)
    }

    /// Creates a stage around an existing world.
    #[must_use]
    pub fn with_world(world: SpriteWorld, table: AttackTable) -> Self {
        Self {
            world,
            table,
            player: None,
            mobs: Vec::new(),
            animations: AHashMap::new(),
            tick_count: 0,
        }
    }

    /// Spawns the player sprite and arms its attack.
    ///
    /// A previous player keeps its sprite but loses its attack component.
    pub fn spawn_player(&mut self, sprite: Sprite, config: PlayerAttackConfig) -> CombatResult<EntityId> {
        let id = sprite.id();
        let attack = PlayerAttack::new(id, config, &self.table)?;
        self.world.spawn(sprite);
        if let Some(previous) = self.player.replace(attack) {
            debug!(previous = %previous.owner(), player = %id, "player replaced");
        }
        info!(player = %id, "player spawned");
        Ok(id)
    }

    /// Spawns a mob with a lunge attack.
    pub fn spawn_mob(&mut self, sprite: Sprite, config: &SimpleAttackConfig) -> EntityId {
        let id = self.world.spawn(sprite);
        self.mobs.push(SimpleAttack::new(id, config));
        debug!(mob = %id, "mob spawned");
        id
    }

    /// Gives a sprite a looping base animation, replacing any previous one.
    pub fn attach_animation(&mut self, id: EntityId, driver: AnimationDriver) {
        self.animations.insert(id, driver);
    }

    /// Requests a player swing. `Ok(false)` if there is no player or it is busy.
    pub fn player_attack(&mut self, attack_type: AttackType) -> CombatResult<bool> {
        match self.player.as_mut() {
            Some(attack) => attack.attack(&mut self.world, attack_type),
            None => Ok(false),
        }
    }

    /// Requests a player swing by raw attack number.
    ///
    /// Unknown numbers fail with
    /// [`CombatError::UnknownAttackType`](crate::attack::CombatError::UnknownAttackType).
    pub fn player_attack_raw(&mut self, raw: u8) -> CombatResult<bool> {
        let attack_type = AttackType::from_raw(raw)?;
        self.player_attack(attack_type)
    }

    /// Requests a lunge from one mob. `Ok(false)` if it is unknown, busy or
    /// cooling down.
    pub fn mob_attack(&mut self, id: EntityId) -> CombatResult<bool> {
        match self.mobs.iter_mut().find(|m| m.owner() == id) {
            Some(attack) => attack.attack(&mut self.world, ()),
            None => Ok(false),
        }
    }

    /// Advances everything by one frame.
    pub fn tick(&mut self, delta_time: f32) -> CombatResult<()> {
        self.tick_count += 1;

        let swinging: AHashSet<EntityId> = self
            .player
            .iter()
            .filter(|p| p.is_attacking())
            .map(PlayerAttack::owner)
            .chain(self.mobs.iter().filter(|m| m.is_attacking()).map(SimpleAttack::owner))
            .collect();

        for (id, driver) in &mut self.animations {
            if swinging.contains(id) {
                continue;
            }
            if let Some(sprite) = self.world.sprite_mut(*id) {
                driver.update(sprite, delta_time);
            }
        }

        self.prune();
        if let Some(player) = self.player.as_mut() {
            let was_attacking = player.is_attacking();
            player.update(&mut self.world, delta_time)?;
            if was_attacking && player.state().is_idle() {
                if let Some(driver) = self.animations.get_mut(&player.owner()) {
                    driver.reset();
                }
            }
        }

        self.prune();
        for mob in &mut self.mobs {
            let was_attacking = mob.is_attacking();
            mob.update(&mut self.world, delta_time)?;
            if was_attacking && mob.state().is_idle() {
                if let Some(driver) = self.animations.get_mut(&mob.owner()) {
                    driver.reset();
                }
            }
        }
        Ok(())
    }

    fn prune(&mut self) {
        let arena = self.world.arena();
        if self.player.as_ref().is_some_and(|p| !arena.contains(p.owner())) {
            info!("player removed from stage");
            self.player = None;
        }
        self.mobs.retain(|m| arena.contains(m.owner()));
        self.animations.retain(|id, _| arena.contains(*id));
    }

    /// The player's attack component, while the player lives.
    #[must_use]
    pub const fn player(&self) -> Option<&PlayerAttack> {
        self.player.as_ref()
    }

    /// The player's sprite ID, while the player lives.
    #[must_use]
    pub fn player_id(&self) -> Option<EntityId> {
        self.player.as_ref().map(PlayerAttack::owner)
    }

    /// A mob's attack component.
    #[must_use]
    pub fn mob(&self, id: EntityId) -> Option<&SimpleAttack> {
        self.mobs.iter().find(|m| m.owner() == id)
    }

    /// IDs of mobs that still have an attack component.
    #[must_use]
    pub fn mob_ids(&self) -> Vec<EntityId> {
        self.mobs.iter().map(SimpleAttack::owner).collect()
    }

    /// Live sprites on one side.
    #[must_use]
    pub fn count(&self, kind: SpriteKind) -> usize {
        self.world.count(kind)
    }

    /// Ticks run so far.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Attack table the player attack was built from.
    #[must_use]
    pub const fn table(&self) -> &AttackTable {
        &self.table
    }

    /// The sprite world.
    #[must_use]
    pub const fn world(&self) -> &SpriteWorld {
        &self.world
    }

    /// Mutable access to the sprite world, e.g. to move sprites.
    pub fn world_mut(&mut self) -> &mut SpriteWorld {
        &mut self.world
    }

    /// Drains the events published since the last call.
    pub fn drain_events(&self) -> Vec<GameEvent> {
        self.world.drain_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attack::CombatError;
    use crate::entity::{Facing, Image};
    use vanguard_common::FrameId;

    fn image(frame: u32) -> Image {
        Image::new(FrameId::new(frame), 20, 20)
    }

    fn player_sprite(x: i32) -> Sprite {
        Sprite::new(SpriteKind::Player, image(1), (x, 0), 100).with_facing(Facing::Right)
    }

    fn mob_sprite(x: i32, life: i32) -> Sprite {
        Sprite::new(SpriteKind::Mob, image(2), (x, 0), life)
            .with_facing(Facing::Left)
            .with_attacking_image(image(3))
    }

    fn mob_config() -> SimpleAttackConfig {
        SimpleAttackConfig {
            damage: 7,
            duration: 4,
            range: 40,
            sound: None,
        }
    }

    fn walk_cycle() -> AnimationDriver {
        AnimationDriver::new(vec![image(10), image(11)], 10.0).expect("valid driver")
    }

    #[test]
    fn test_player_attack_without_player() {
        let mut stage = Stage::new(AttackTable::standard());
        assert_eq!(stage.player_attack(AttackType::Slash), Ok(false));
    }

    #[test]
    fn test_raw_attack_type_fails_fast() {
        let mut stage = Stage::new(AttackTable::standard());
        stage
            .spawn_player(player_sprite(0), PlayerAttackConfig::default())
            .expect("standard table is complete");

        assert_eq!(stage.player_attack_raw(3), Err(CombatError::UnknownAttackType(3)));
        assert_eq!(stage.player_attack_raw(1), Ok(true));
    }

    #[test]
    fn test_mob_attack_unknown_id() {
        let mut stage = Stage::new(AttackTable::standard());
        assert_eq!(stage.mob_attack(EntityId::from_raw(u64::MAX)), Ok(false));
    }

    #[test]
    fn test_killed_mob_loses_components() {
        let mut stage = Stage::new(AttackTable::standard());
        stage
            .spawn_player(player_sprite(0), PlayerAttackConfig::default())
            .expect("standard table is complete");
        let mob = stage.spawn_mob(mob_sprite(40, 1), &mob_config());
        stage.attach_animation(mob, walk_cycle());

        assert_eq!(stage.player_attack(AttackType::Cannon), Ok(true));
        for _ in 0..10 {
            stage.tick(1.0 / 60.0).expect("tick");
        }

        assert!(stage.world().sprite(mob).is_none());
        assert!(stage.mob(mob).is_none());
        assert!(stage.mob_ids().is_empty());
        assert_eq!(stage.count(SpriteKind::Mob), 0);
    }

    #[test]
    fn test_mob_lunge_hurts_player() {
        let mut stage = Stage::new(AttackTable::standard());
        let player = stage
            .spawn_player(player_sprite(0), PlayerAttackConfig::default())
            .expect("standard table is complete");
        let mob = stage.spawn_mob(mob_sprite(25, 50), &mob_config());

        assert_eq!(stage.mob_attack(mob), Ok(true));
        assert_eq!(stage.mob_attack(mob), Ok(false));
        for _ in 0..4 {
            stage.tick(1.0 / 60.0).expect("tick");
        }

        assert_eq!(stage.world().sprite(player).map(Sprite::life), Some(93));
        assert!(stage.mob(mob).is_some_and(|m| m.state().is_idle()));
        assert_eq!(
            stage.world().sprite(mob).map(|s| s.image.frame),
            Some(FrameId::new(2))
        );
    }

    #[test]
    fn test_base_animation_paused_mid_swing() {
        let mut stage = Stage::new(AttackTable::standard());
        let mob = stage.spawn_mob(mob_sprite(500, 50), &mob_config());
        stage.attach_animation(mob, walk_cycle());

        stage.tick(0.0).expect("tick");
        assert_eq!(
            stage.world().sprite(mob).map(|s| s.image.frame),
            Some(FrameId::new(10))
        );

        let marker = image(99);
        if let Some(sprite) = stage.world_mut().sprite_mut(mob) {
            sprite.image = marker;
        }
        stage.mob_attack(mob).expect("mob exists");
        stage.tick(0.0).expect("tick");
        assert_eq!(stage.world().sprite(mob).map(|s| s.image), Some(marker));
    }

    #[test]
    fn test_swing_end_restarts_base_animation() {
        let mut stage = Stage::new(AttackTable::standard());
        let mob = stage.spawn_mob(mob_sprite(500, 50), &mob_config());
        stage.attach_animation(mob, walk_cycle());

        stage.mob_attack(mob).expect("mob exists");
        for _ in 0..4 {
            stage.tick(0.0).expect("tick");
        }
        assert!(stage.mob(mob).is_some_and(|m| m.state().is_idle()));

        stage.tick(0.0).expect("tick");
        assert_eq!(
            stage.world().sprite(mob).map(|s| s.image.frame),
            Some(FrameId::new(10))
        );
        assert_eq!(stage.tick_count(), 5);
    }

    #[test]
    fn test_dead_player_is_dropped() {
        let mut stage = Stage::new(AttackTable::standard());
        let player = stage
            .spawn_player(player_sprite(0), PlayerAttackConfig::default())
            .expect("standard table is complete");
        stage.player_attack(AttackType::Slash).expect("player exists");
        stage.world_mut().kill(player);

        stage.tick(0.1).expect("tick without player");
        assert_eq!(stage.player_id(), None);
        assert_eq!(stage.player_attack(AttackType::Slash), Ok(false));
    }
}
