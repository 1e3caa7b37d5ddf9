//! Shared attack machinery.
//!
//! This module provides:
//! - The two-state swing machine ([`AttackState`])
//! - The interface every attack component implements ([`AttackComponent`])
//! - Damage and knockback helpers used by all components

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use vanguard_common::EntityId;

use crate::world::{CombatWorld, SpriteStore};

/// Horizontal push applied to a target on hit, in pixels.
pub const KNOCKBACK_DISTANCE: i32 = 90;

/// Errors raised while resolving attacks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    /// Attack type outside the known table. Always a caller bug.
    #[error("unknown attack type: {0}")]
    UnknownAttackType(u8),
    /// No profile was configured for a known attack type.
    #[error("no attack profile configured for {0:?}")]
    MissingProfile(AttackType),
    /// A sprite the component relies on is gone.
    #[error("sprite not found: {0}")]
    MissingEntity(EntityId),
    /// A query came back without a sprite list.
    #[error("`{0}` did not answer with a sprite list")]
    UnexpectedReply(&'static str),
}

/// Result type for combat operations.
pub type CombatResult<T> = Result<T, CombatError>;

/// Swing state shared by every attack component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackState {
    /// Ready for a new swing
    #[default]
    Idle,
    /// Swing in progress
    Attacking,
}

impl AttackState {
    /// Check if a swing may start.
    #[must_use]
    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Check if a swing is in progress.
    #[must_use]
    pub const fn is_attacking(self) -> bool {
        matches!(self, Self::Attacking)
    }
}

/// Player attack variants, keyed by their raw table number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AttackType {
    /// Melee slash (type 1).
    Slash,
    /// Cannon blast (type 2).
    Cannon,
}

impl AttackType {
    /// All known attack types.
    pub const ALL: [Self; 2] = [Self::Slash, Self::Cannon];

    /// Resolves a raw attack number.
    pub fn from_raw(raw: u8) -> CombatResult<Self> {
        match raw {
            1 => Ok(Self::Slash),
            2 => Ok(Self::Cannon),
            other => Err(CombatError::UnknownAttackType(other)),
        }
    }

    /// Raw attack number.
    #[must_use]
    pub const fn raw(self) -> u8 {
        match self {
            Self::Slash => 1,
            Self::Cannon => 2,
        }
    }
}

impl TryFrom<u8> for AttackType {
    type Error = CombatError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::from_raw(raw)
    }
}

impl From<AttackType> for u8 {
    fn from(attack_type: AttackType) -> Self {
        attack_type.raw()
    }
}

/// Interface for attack components.
///
/// `attack` asks for a new swing and reports whether it was accepted; an
/// ineligible request is not an error. `update` advances the swing by one
/// frame. Each implementation keeps its own collision pass and reset as
/// private steps of `update`.
pub trait AttackComponent {
    /// Extra input needed to start a swing.
    type Request;

    /// Sprite that owns this component.
    fn owner(&self) -> EntityId;

    /// Current swing state.
    fn state(&self) -> AttackState;

    /// Requests a swing. Returns `Ok(false)` when the request was ignored.
    fn attack<W: CombatWorld + ?Sized>(
        &mut self,
        world: &mut W,
        request: Self::Request,
    ) -> CombatResult<bool>;

    /// Advances the component by one frame.
    fn update<W: CombatWorld + ?Sized>(&mut self, world: &mut W, delta_time: f32) -> CombatResult<()>;

    /// Check if a swing is in progress.
    fn is_attacking(&self) -> bool {
        self.state().is_attacking()
    }
}

/// Damages `target`; on life ≤ 0 fires defeat, then removes it.
pub fn inflict_damage<W: SpriteStore + ?Sized>(
    world: &mut W,
    target: EntityId,
    amount: i32,
) -> CombatResult<()> {
    let remaining = world
        .receive_damage(target, amount)
        .ok_or(CombatError::MissingEntity(target))?;
    debug!(target = %target, amount, remaining, "damage inflicted");

    if remaining <= 0 {
        world.defeat(target);
        world.kill(target);
    }
    Ok(())
}

/// Pushes `target` [`KNOCKBACK_DISTANCE`] pixels away from `attacker`.
///
/// A target that was removed earlier in the same frame is left alone.
pub fn knockback_target<W: SpriteStore + ?Sized>(
    world: &mut W,
    attacker: EntityId,
    target: EntityId,
) -> CombatResult<()> {
    let attacker_x = world
        .sprite(attacker)
        .ok_or(CombatError::MissingEntity(attacker))?
        .rect
        .centerx();
    let Some(target_x) = world.sprite(target).map(|s| s.rect.centerx()) else {
        return Ok(());
    };

    let dx = if target_x > attacker_x {
        KNOCKBACK_DISTANCE
    } else {
        -KNOCKBACK_DISTANCE
    };
    world.displace(target, dx);
    Ok(())
}

/// Fetches a sprite snapshot through the event port.
pub(crate) fn query_sprites<W: CombatWorld + ?Sized>(
    world: &mut W,
    message: crate::events::EventMessage,
) -> CombatResult<Vec<EntityId>> {
    world
        .notify(message)
        .into_sprites()
        .ok_or(CombatError::UnexpectedReply(message.name()))
}
