//! Per-frame attack hitboxes.

use ahash::AHashMap;
use vanguard_common::Rect;

use crate::attack::AttackType;
use crate::attack_table::{AttackTable, HitboxFrame};
use crate::entity::Sprite;

/// Collision region of the running attack.
///
/// Reshaped every frame from the attack table; inactive on frames without a
/// box, in which case nothing is hit.
#[derive(Debug, Clone)]
pub struct AttackHitbox {
    frames: AHashMap<AttackType, Vec<Option<HitboxFrame>>>,
    rect: Option<Rect>,
}

impl AttackHitbox {
    /// Copies the hitbox tables out of `table`.
    #[must_use]
    pub fn new(table: &AttackTable) -> Self {
        Self {
            frames: table
                .profiles()
                .iter()
                .map(|p| (p.attack_type, p.hitboxes.clone()))
                .collect(),
            rect: None,
        }
    }

    /// Places the box for `attack_type` at `frame_index` around `attacker`.
    pub fn update_hitbox(&mut self, attacker: &Sprite, attack_type: AttackType, frame_index: usize) {
        let frame = self
            .frames
            .get(&attack_type)
            .and_then(|boxes| boxes.get(frame_index).copied().flatten());

        self.rect = frame.map(|f| {
            let (cx, cy) = attacker.rect.center();
            Rect::from_center(
                cx + f.offset_x * attacker.facing.sign(),
                cy + f.offset_y,
                f.width,
                f.height,
            )
        });
    }

    /// Whether the current box overlaps `target`.
    #[must_use]
    pub fn hit_target(&self, target: &Sprite) -> bool {
        self.rect.is_some_and(|rect| rect.colliderect(&target.rect))
    }

    /// Deactivates the box.
    pub fn clear(&mut self) {
        self.rect = None;
    }

    /// Current box, if active.
    #[must_use]
    pub const fn rect(&self) -> Option<Rect> {
        self.rect
    }
}
