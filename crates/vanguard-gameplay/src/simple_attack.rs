//! Single-phase lunge attack used by simple mobs.
//!
//! A swing lasts a fixed number of ticks. Every tick the mob checks its own
//! bounding box against the player sprites and slides one step along a
//! straight lunge toward `start + range * facing`. On contact it deals its
//! damage once and jumps `range` pixels past the target. When the lunge
//! completes, one more contact check runs before the hit latch is released.

use serde::{Deserialize, Serialize};
use tracing::debug;
use vanguard_common::{EntityId, SoundId};

use crate::attack::{
    inflict_damage, query_sprites, AttackComponent, AttackState, CombatError, CombatResult,
};
use crate::events::EventMessage;
use crate::world::CombatWorld;

/// Ticks between two accepted swings.
pub const COOLDOWN_DURATION: u32 = 30;

/// Tuning for a [`SimpleAttack`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleAttackConfig {
    /// Damage per landed swing
    pub damage: i32,
    /// Swing length in ticks (at least 1)
    pub duration: u32,
    /// Lunge distance in pixels
    pub range: i32,
    /// Sound handle handed to the audio layer
    #[serde(default)]
    pub sound: Option<SoundId>,
}

impl Default for SimpleAttackConfig {
    fn default() -> Self {
        Self {
            damage: 10,
            duration: 20,
            range: 80,
            sound: None,
        }
    }
}

/// Tick-driven lunge attack.
#[derive(Debug, Clone)]
pub struct SimpleAttack {
    owner: EntityId,
    attack_damage: i32,
    initial_attack_duration: u32,
    attack_range: i32,
    attack_sound: Option<SoundId>,
    state: AttackState,
    attack_duration: u32,
    attack_cooldown: u32,
    attack_progress: f32,
    lunge_ticks: u32,
    hit_target: bool,
    attack_start_position: Option<i32>,
    attack_end_position: Option<i32>,
}

impl SimpleAttack {
    /// Creates an idle attack for `owner`.
    #[must_use]
    pub fn new(owner: EntityId, config: &SimpleAttackConfig) -> Self {
        let duration = config.duration.max(1);
        Self {
            owner,
            attack_damage: config.damage,
            initial_attack_duration: duration,
            attack_range: config.range,
            attack_sound: config.sound,
            state: AttackState::Idle,
            attack_duration: duration,
            attack_cooldown: 0,
            attack_progress: 0.0,
            lunge_ticks: 0,
            hit_target: false,
            attack_start_position: None,
            attack_end_position: None,
        }
    }

    /// Ticks left in the current swing.
    #[must_use]
    pub const fn attack_duration(&self) -> u32 {
        self.attack_duration
    }

    /// Ticks until a new swing may start.
    #[must_use]
    pub const fn attack_cooldown(&self) -> u32 {
        self.attack_cooldown
    }

    /// Fraction of the lunge covered, 0 to 1.
    #[must_use]
    pub const fn attack_progress(&self) -> f32 {
        self.attack_progress
    }

    /// Whether this swing already connected.
    #[must_use]
    pub const fn has_hit(&self) -> bool {
        self.hit_target
    }

    /// Lunge start and end x, once a swing has begun.
    #[must_use]
    pub const fn lunge(&self) -> Option<(i32, i32)> {
        match (self.attack_start_position, self.attack_end_position) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    /// Damage per landed swing.
    #[must_use]
    pub const fn damage(&self) -> i32 {
        self.attack_damage
    }

    /// Lunge distance.
    #[must_use]
    pub const fn range(&self) -> i32 {
        self.attack_range
    }

    /// Sound handle for the audio layer.
    #[must_use]
    pub const fn sound(&self) -> Option<SoundId> {
        self.attack_sound
    }

    fn perform_attack<W: CombatWorld + ?Sized>(&mut self, world: &mut W) -> CombatResult<()> {
        let targets = query_sprites(world, EventMessage::GetPlayerSprites)?;

        for target in targets {
            if self.hit_target {
                break;
            }
            let own_rect = world
                .sprite(self.owner)
                .ok_or(CombatError::MissingEntity(self.owner))?
                .rect;
            let Some(target_rect) = world.sprite(target).map(|s| s.rect) else {
                continue;
            };

            if own_rect.colliderect(&target_rect) {
                self.hit_target = true;
                self.set_attacking_image(world)?;
                inflict_damage(world, target, self.attack_damage)?;
                self.move_through_target(world, target_rect.centerx())?;
                debug!(attacker = %self.owner, target = %target, "lunge connected");
            }
        }
        Ok(())
    }

    fn update_attack_movement<W: CombatWorld + ?Sized>(&mut self, world: &mut W) -> CombatResult<()> {
        let Some((start, end)) = self.lunge() else {
            return Ok(());
        };

        // Progress is derived from whole ticks so the final tick lands on 1.0 exactly.
        self.lunge_ticks += 1;
        self.attack_progress = self.lunge_ticks as f32 / self.initial_attack_duration as f32;
        let new_x = f64::from(start) + f64::from(end - start) * f64::from(self.attack_progress);

        world
            .sprite_mut(self.owner)
            .ok_or(CombatError::MissingEntity(self.owner))?
            .rect
            .set_centerx(new_x.round_ties_even() as i32);

        self.check_attack_progress(world)
    }

    fn check_attack_progress<W: CombatWorld + ?Sized>(&mut self, world: &mut W) -> CombatResult<()> {
        if self.attack_progress >= 1.0 {
            if self.state.is_attacking() {
                self.perform_attack(world)?;
            }
            self.hit_target = false;
        }
        Ok(())
    }

    fn set_attacking_image<W: CombatWorld + ?Sized>(&self, world: &mut W) -> CombatResult<()> {
        let sprite = world
            .sprite_mut(self.owner)
            .ok_or(CombatError::MissingEntity(self.owner))?;
        if let Some(image) = sprite.attacking_image {
            sprite.image = if sprite.facing.is_right() {
                image
            } else {
                image.mirrored()
            };
        }
        Ok(())
    }

    fn move_through_target<W: CombatWorld + ?Sized>(
        &self,
        world: &mut W,
        target_x: i32,
    ) -> CombatResult<()> {
        let rect = &mut world
            .sprite_mut(self.owner)
            .ok_or(CombatError::MissingEntity(self.owner))?
            .rect;
        let distance = if target_x > rect.centerx() {
            self.attack_range
        } else {
            -self.attack_range
        };
        let cx = rect.centerx();
        rect.set_centerx(cx + distance);
        Ok(())
    }

    fn reset_attack<W: CombatWorld + ?Sized>(&mut self, world: &mut W) -> CombatResult<()> {
        let sprite = world
            .sprite_mut(self.owner)
            .ok_or(CombatError::MissingEntity(self.owner))?;
        sprite.image = sprite.default_image;
        self.state = AttackState::Idle;
        self.attack_progress = 0.0;
        debug!(attacker = %self.owner, "lunge finished");
        Ok(())
    }
}

impl AttackComponent for SimpleAttack {
    type Request = ();

    fn owner(&self) -> EntityId {
        self.owner
    }

    fn state(&self) -> AttackState {
        self.state
    }

    fn attack<W: CombatWorld + ?Sized>(&mut self, world: &mut W, _request: ()) -> CombatResult<bool> {
        if !self.state.is_idle() || self.attack_cooldown != 0 {
            return Ok(false);
        }

        let sprite = world
            .sprite(self.owner)
            .ok_or(CombatError::MissingEntity(self.owner))?;
        let start = sprite.rect.centerx();
        let end = start + self.attack_range * sprite.facing.sign();

        self.state = AttackState::Attacking;
        self.attack_duration = self.initial_attack_duration;
        self.attack_cooldown = COOLDOWN_DURATION;
        self.attack_start_position = Some(start);
        self.attack_end_position = Some(end);
        self.lunge_ticks = 0;
        debug!(attacker = %self.owner, start, end, "lunge started");
        Ok(true)
    }

    /// Advances one tick. The delta is ignored: timing is counted in calls.
    fn update<W: CombatWorld + ?Sized>(&mut self, world: &mut W, _delta_time: f32) -> CombatResult<()> {
        if self.state.is_attacking() {
            if self.attack_duration > 0 {
                self.perform_attack(world)?;
                self.update_attack_movement(world)?;
                self.attack_duration -= 1;
            }
            if self.attack_duration == 0 {
                self.reset_attack(world)?;
            }
        }
        if self.attack_cooldown > 0 {
            self.attack_cooldown -= 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Facing, Image, Sprite, SpriteKind};
    use crate::events::GameEvent;
    use crate::world::{SpriteStore, SpriteWorld};
    use vanguard_common::FrameId;

    const DEFAULT_FRAME: FrameId = FrameId::new(1);
    const ATTACK_FRAME: FrameId = FrameId::new(2);

    fn mob(x: i32, facing: Facing) -> Sprite {
        Sprite::new(SpriteKind::Mob, Image::new(DEFAULT_FRAME, 20, 20), (x, 0), 30)
            .with_facing(facing)
            .with_attacking_image(Image::new(ATTACK_FRAME, 20, 20))
    }

    fn player(x: i32, life: i32) -> Sprite {
        Sprite::new(SpriteKind::Player, Image::new(FrameId::new(3), 20, 20), (x, 0), life)
    }

    fn config(duration: u32, range: i32) -> SimpleAttackConfig {
        SimpleAttackConfig {
            damage: 5,
            duration,
            range,
            sound: Some(SoundId::new(4)),
        }
    }

    fn damage_events(world: &SpriteWorld) -> usize {
        world
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::EntityDamaged { .. }))
            .count()
    }

    #[test]
    fn test_attack_seeds_timers() {
        let mut world = SpriteWorld::new();
        let owner = world.spawn(mob(0, Facing::Right));
        let mut attack = SimpleAttack::new(owner, &config(10, 50));

        assert_eq!(attack.attack(&mut world, ()), Ok(true));
        assert_eq!(attack.state(), AttackState::Attacking);
        assert_eq!(attack.attack_cooldown(), COOLDOWN_DURATION);
        assert_eq!(attack.attack_duration(), 10);
        assert_eq!(attack.lunge(), Some((0, 50)));
        assert_eq!(attack.sound(), Some(SoundId::new(4)));
    }

    #[test]
    fn test_lunge_direction_follows_facing() {
        let mut world = SpriteWorld::new();
        let owner = world.spawn(mob(100, Facing::Left));
        let mut attack = SimpleAttack::new(owner, &config(10, 50));

        attack.attack(&mut world, ()).expect("owner exists");
        assert_eq!(attack.lunge(), Some((100, 50)));
    }

    #[test]
    fn test_second_attack_without_update_ignored() {
        let mut world = SpriteWorld::new();
        let owner = world.spawn(mob(0, Facing::Right));
        let mut attack = SimpleAttack::new(owner, &config(10, 50));

        assert_eq!(attack.attack(&mut world, ()), Ok(true));
        assert_eq!(attack.attack(&mut world, ()), Ok(false));
        assert_eq!(attack.attack_cooldown(), COOLDOWN_DURATION);
    }

    #[test]
    fn test_full_swing_without_target() {
        let mut world = SpriteWorld::new();
        let owner = world.spawn(mob(0, Facing::Right));
        let mut attack = SimpleAttack::new(owner, &config(10, 50));

        attack.attack(&mut world, ()).expect("owner exists");
        for _ in 0..10 {
            attack.update(&mut world, 0.016).expect("owner exists");
        }

        let sprite = world.sprite(owner).expect("mob alive");
        assert_eq!(attack.state(), AttackState::Idle);
        assert_eq!(attack.attack_progress(), 0.0);
        assert_eq!(sprite.image.frame, DEFAULT_FRAME);
        assert_eq!(sprite.rect.centerx(), 50);
    }

    #[test]
    fn test_lunge_steps_are_linear() {
        let mut world = SpriteWorld::new();
        let owner = world.spawn(mob(0, Facing::Right));
        let mut attack = SimpleAttack::new(owner, &config(4, 10));

        attack.attack(&mut world, ()).expect("owner exists");
        let mut xs = Vec::new();
        for _ in 0..4 {
            attack.update(&mut world, 0.0).expect("owner exists");
            xs.push(world.sprite(owner).map(|s| s.rect.centerx()));
        }
        // Halfway positions round to even.
        assert_eq!(xs, vec![Some(2), Some(5), Some(8), Some(10)]);
    }

    #[test]
    fn test_lunge_steps_round_to_even_facing_left() {
        let mut world = SpriteWorld::new();
        let owner = world.spawn(mob(0, Facing::Left));
        let mut attack = SimpleAttack::new(owner, &config(4, 10));

        attack.attack(&mut world, ()).expect("owner exists");
        assert_eq!(attack.lunge(), Some((0, -10)));
        let mut xs = Vec::new();
        for _ in 0..4 {
            attack.update(&mut world, 0.0).expect("owner exists");
            xs.push(world.sprite(owner).map(|s| s.rect.centerx()));
        }
        assert_eq!(xs, vec![Some(-2), Some(-5), Some(-8), Some(-10)]);
    }

    #[test]
    fn test_cooldown_blocks_then_expires() {
        let mut world = SpriteWorld::new();
        let owner = world.spawn(mob(0, Facing::Right));
        let mut attack = SimpleAttack::new(owner, &config(5, 10));

        attack.attack(&mut world, ()).expect("owner exists");
        for _ in 0..5 {
            attack.update(&mut world, 0.0).expect("owner exists");
        }
        assert!(attack.state().is_idle());
        assert_eq!(attack.attack(&mut world, ()), Ok(false));

        for _ in 0..COOLDOWN_DURATION - 5 {
            attack.update(&mut world, 0.0).expect("owner exists");
        }
        assert_eq!(attack.attack_cooldown(), 0);
        assert_eq!(attack.attack(&mut world, ()), Ok(true));
    }

    #[test]
    fn test_contact_hits_once_and_passes_through() {
        let mut world = SpriteWorld::new();
        let owner = world.spawn(mob(0, Facing::Right));
        let target = world.spawn(player(10, 100));
        let mut attack = SimpleAttack::new(owner, &config(10, 50));

        attack.attack(&mut world, ()).expect("owner exists");
        attack.update(&mut world, 0.0).expect("owner exists");

        assert!(attack.has_hit());
        assert_eq!(world.sprite(target).map(Sprite::life), Some(95));
        let sprite = world.sprite(owner).expect("mob alive");
        assert_eq!(sprite.image.frame, ATTACK_FRAME);
        assert!(!sprite.image.flipped);
        // Passed through to 50, then the lunge step snapped it to 5.
        assert_eq!(sprite.rect.centerx(), 5);
    }

    #[test]
    fn test_attacking_image_mirrored_when_facing_left() {
        let mut world = SpriteWorld::new();
        let owner = world.spawn(mob(0, Facing::Left));
        world.spawn(player(-5, 100));
        let mut attack = SimpleAttack::new(owner, &config(10, 50));

        attack.attack(&mut world, ()).expect("owner exists");
        attack.update(&mut world, 0.0).expect("owner exists");
        assert!(world.sprite(owner).is_some_and(|s| s.image.flipped));
    }

    #[test]
    fn test_overlapping_target_hit_once_per_swing() {
        let mut world = SpriteWorld::new();
        let owner = world.spawn(mob(0, Facing::Right));
        // Wide target covering the whole lunge path.
        world.spawn(Sprite::new(
            SpriteKind::Player,
            Image::new(FrameId::new(3), 400, 20),
            (0, 0),
            1000,
        ));
        let mut attack = SimpleAttack::new(owner, &config(10, 50));

        attack.attack(&mut world, ()).expect("owner exists");
        for _ in 0..10 {
            attack.update(&mut world, 0.0).expect("owner exists");
        }
        let hits = damage_events(&world);
        // Latch from the first contact also covers the lunge-end check.
        assert_eq!(hits, 1);
        assert!(!attack.has_hit());
    }

    #[test]
    fn test_lunge_completion_check_catches_late_target() {
        let mut world = SpriteWorld::new();
        let owner = world.spawn(mob(0, Facing::Right));
        // Only reachable once the mob stands at the lunge end.
        let target = world.spawn(player(75, 100));
        let mut attack = SimpleAttack::new(owner, &config(5, 60));

        attack.attack(&mut world, ()).expect("owner exists");
        for _ in 0..5 {
            attack.update(&mut world, 0.0).expect("owner exists");
        }

        assert_eq!(world.sprite(target).map(Sprite::life), Some(95));
        assert_eq!(damage_events(&world), 1);
        assert!(!attack.has_hit());
        assert!(attack.state().is_idle());
    }

    #[test]
    fn test_killing_blow_defeats_target() {
        let mut world = SpriteWorld::new();
        let owner = world.spawn(mob(0, Facing::Right));
        let target = world.spawn(player(5, 3));
        let mut attack = SimpleAttack::new(owner, &config(10, 50));

        attack.attack(&mut world, ()).expect("owner exists");
        attack.update(&mut world, 0.0).expect("owner exists");

        assert!(world.sprite(target).is_none());
        let events = world.drain_events();
        assert!(events.contains(&GameEvent::EntityDefeated { entity_id: target }));
    }

    #[test]
    fn test_missing_owner_is_error() {
        let mut world = SpriteWorld::new();
        let owner = world.spawn(mob(0, Facing::Right));
        let mut attack = SimpleAttack::new(owner, &config(10, 50));
        world.kill(owner);

        assert_eq!(
            attack.attack(&mut world, ()),
            Err(CombatError::MissingEntity(owner))
        );
    }

    #[test]
    fn test_zero_duration_clamped() {
        let owner = EntityId::from_raw(1);
        let attack = SimpleAttack::new(owner, &config(0, 50));
        assert_eq!(attack.attack_duration(), 1);
    }
}
