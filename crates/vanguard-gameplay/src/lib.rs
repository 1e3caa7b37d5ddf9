//! # Vanguard Gameplay
//!
//! Combat and animation systems for Vanguard.
//!
//! This crate provides the sprite layer and everything that fights with it:
//! - Sprites with arena storage
//! - Event port and event bus
//! - Looping frame animation
//! - Attack state machine with damage and knockback helpers
//! - Mob lunge attack
//! - Player attack with animation-driven hitboxes
//! - Attack tables (RON)
//! - Stage driver running one frame at a time

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod animation;
pub mod attack;
pub mod attack_animation;
pub mod attack_hitbox;
pub mod attack_table;
pub mod entity;
pub mod events;
pub mod player_attack;
pub mod simple_attack;
pub mod stage;
pub mod world;


/// Prelude for convenient imports
pub mod prelude {
    pub use crate::animation::*;
    pub use crate::attack::*;
    pub use crate::attack_animation::*;
    pub use crate::attack_hitbox::*;
    pub use crate::attack_table::*;
    pub use crate::entity::*;
    pub use crate::events::*;
    pub use crate::player_attack::*;
    pub use crate::simple_attack::*;
    pub use crate::stage::*;
    pub use crate::world::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use vanguard_common::FrameId;

    #[test]
    fn test_prelude_builds_a_fight() {
        let mut stage = Stage::new(AttackTable::default());
        let player = Sprite::new(SpriteKind::Player, Image::new(FrameId::new(1), 32, 48), (0, 0), 100);
        assert!(stage.spawn_player(player, PlayerAttackConfig::default()).is_ok());
        assert_eq!(stage.count(SpriteKind::Player), 1);
    }

    #[test]
    fn test_attack_state_transitions() {
        let mut world = SpriteWorld::new();
        let mob = world.spawn(Sprite::new(
            SpriteKind::Mob,
            Image::new(FrameId::new(2), 20, 20),
            (0, 0),
            10,
        ));
        let mut attack = SimpleAttack::new(mob, &SimpleAttackConfig::default());

        assert!(!attack.is_attacking());
        assert_eq!(attack.attack(&mut world, ()), Ok(true));
        assert!(attack.is_attacking());
    }
}
