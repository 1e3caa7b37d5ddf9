//! Multi-phase player attack.
//!
//! Frame timing lives in [`AttackAnimation`] and collision in
//! [`AttackHitbox`]; this component sequences them and resolves hits. A
//! slash damages each target once per swing. The cannon has no hit memory
//! and keeps damaging whatever stays inside its beam.

use std::collections::BTreeMap;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vanguard_common::{EntityId, SoundId};

use crate::attack::{
    inflict_damage, knockback_target, query_sprites, AttackComponent, AttackState, AttackType,
    CombatError, CombatResult,
};
use crate::attack_animation::AttackAnimation;
use crate::attack_hitbox::AttackHitbox;
use crate::attack_table::AttackTable;
use crate::events::{AttackSignal, EventMessage};
use crate::world::CombatWorld;

/// Tuning for a [`PlayerAttack`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerAttackConfig {
    /// Damage dealt by a slash
    pub attack_damage: i32,
    /// Damage dealt per frame by the cannon
    pub cannon_damage: i32,
    /// Sound handles by name, passed through to the audio layer
    pub sounds: BTreeMap<String, SoundId>,
}

impl Default for PlayerAttackConfig {
    fn default() -> Self {
        Self {
            attack_damage: 20,
            cannon_damage: 5,
            sounds: BTreeMap::new(),
        }
    }
}

/// Player attack driven by animation frames.
#[derive(Debug, Clone)]
pub struct PlayerAttack {
    owner: EntityId,
    config: PlayerAttackConfig,
    state: AttackState,
    attack_type: Option<AttackType>,
    animation: AttackAnimation,
    hitbox: AttackHitbox,
    hit_targets: AHashSet<EntityId>,
}

impl PlayerAttack {
    /// Creates an idle attack for `owner`.
    ///
    /// Fails with [`CombatError::MissingProfile`] if `table` lacks a profile
    /// for any known attack type.
    pub fn new(owner: EntityId, config: PlayerAttackConfig, table: &AttackTable) -> CombatResult<Self> {
        if let Some(missing) = AttackType::ALL
            .into_iter()
            .find(|t| table.profile(*t).is_none())
        {
            return Err(CombatError::MissingProfile(missing));
        }

        Ok(Self {
            owner,
            config,
            state: AttackState::Idle,
            attack_type: None,
            animation: AttackAnimation::new(table),
            hitbox: AttackHitbox::new(table),
            hit_targets: AHashSet::new(),
        })
    }

    /// Attack being swung, if any.
    #[must_use]
    pub const fn attack_type(&self) -> Option<AttackType> {
        self.attack_type
    }

    /// Targets already struck by the current slash.
    #[must_use]
    pub fn hit_targets(&self) -> &AHashSet<EntityId> {
        &self.hit_targets
    }

    /// Frame timing sub-driver.
    #[must_use]
    pub const fn animation(&self) -> &AttackAnimation {
        &self.animation
    }

    /// Collision sub-driver.
    #[must_use]
    pub const fn hitbox(&self) -> &AttackHitbox {
        &self.hitbox
    }

    /// Component tuning.
    #[must_use]
    pub const fn config(&self) -> &PlayerAttackConfig {
        &self.config
    }

    /// Named sound handle, if configured.
    #[must_use]
    pub fn sound(&self, name: &str) -> Option<SoundId> {
        self.config.sounds.get(name).copied()
    }

    /// Damage per hit and whether a hit is remembered for the rest of the swing.
    const fn attack_details(&self, attack_type: AttackType) -> (i32, bool) {
        match attack_type {
            AttackType::Slash => (self.config.attack_damage, true),
            AttackType::Cannon => (self.config.cannon_damage, false),
        }
    }

    fn perform_attack<W: CombatWorld + ?Sized>(
        &mut self,
        world: &mut W,
        attack_type: AttackType,
    ) -> CombatResult<()> {
        let targets = query_sprites(world, EventMessage::GetMobSprites)?;
        let (damage, remember) = self.attack_details(attack_type);

        for target in targets {
            if self.hit_targets.contains(&target) {
                continue;
            }
            let Some(sprite) = world.sprite(target) else {
                continue;
            };
            if !self.hitbox.hit_target(sprite) {
                continue;
            }

            inflict_damage(world, target, damage)?;
            knockback_target(world, self.owner, target)?;
            if remember {
                self.hit_targets.insert(target);
            }
            debug!(attacker = %self.owner, target = %target, ?attack_type, damage, "player hit");
        }
        Ok(())
    }

    fn reset_attack<W: CombatWorld + ?Sized>(&mut self, world: &mut W) {
        self.state = AttackState::Idle;
        self.attack_type = None;
        self.animation.reset();
        self.hitbox.clear();
        self.hit_targets.clear();
        world.notify(EventMessage::PlayerAttack {
            state: AttackSignal::End,
        });
        debug!(attacker = %self.owner, "player swing finished");
    }
}

impl AttackComponent for PlayerAttack {
    type Request = AttackType;

    fn owner(&self) -> EntityId {
        self.owner
    }

    fn state(&self) -> AttackState {
        self.state
    }

    fn attack<W: CombatWorld + ?Sized>(
        &mut self,
        world: &mut W,
        attack_type: AttackType,
    ) -> CombatResult<bool> {
        if !self.state.is_idle() {
            return Ok(false);
        }

        self.animation.start_animation(attack_type)?;
        self.hitbox.clear();
        self.hit_targets.clear();
        self.attack_type = Some(attack_type);
        self.state = AttackState::Attacking;
        world.notify(EventMessage::PlayerAttack {
            state: AttackSignal::Start,
        });
        debug!(attacker = %self.owner, ?attack_type, "player swing started");
        Ok(true)
    }

    fn update<W: CombatWorld + ?Sized>(&mut self, world: &mut W, delta_time: f32) -> CombatResult<()> {
        let Some(attack_type) = self.attack_type.filter(|_| self.state.is_attacking()) else {
            return Ok(());
        };

        let sprite = world
            .sprite_mut(self.owner)
            .ok_or(CombatError::MissingEntity(self.owner))?;
        self.animation.update_animation(sprite, delta_time);
        self.hitbox
            .update_hitbox(sprite, attack_type, self.animation.current_frame_index());

        self.perform_attack(world, attack_type)?;

        if self.animation.duration_timer() <= 0.0 {
            self.reset_attack(world);
        }
        Ok(())
    }
}
