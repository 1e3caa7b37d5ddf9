//! Frame timing for player attacks.
//!
//! Unlike the looping [`AnimationDriver`](crate::animation::AnimationDriver),
//! an attack clip plays once: the frame index holds on the last frame and a
//! separate duration timer decides when the swing is over.

use ahash::AHashMap;
use tracing::trace;

use crate::attack::{AttackType, CombatError, CombatResult};
use crate::attack_table::AttackTable;
use crate::entity::{Image, Sprite};

#[derive(Debug, Clone)]
struct Clip {
    frames: Vec<Image>,
    speed: f32,
    duration: f32,
}

/// Drives the frames of the running attack.
#[derive(Debug, Clone)]
pub struct AttackAnimation {
    clips: AHashMap<AttackType, Clip>,
    attack_type: Option<AttackType>,
    frame_counter: f32,
    current_frame_index: usize,
    last_frame_index: Option<usize>,
    duration_timer: f32,
}

impl AttackAnimation {
    /// Builds clips for every profile in `table`.
    #[must_use]
    pub fn new(table: &AttackTable) -> Self {
        let clips = table
            .profiles()
            .iter()
            .map(|p| {
                (
                    p.attack_type,
                    Clip {
                        frames: p.frames.clone(),
                        speed: p.speed,
                        duration: p.duration,
                    },
                )
            })
            .collect();

        Self {
            clips,
            attack_type: None,
            frame_counter: 0.0,
            current_frame_index: 0,
            last_frame_index: None,
            duration_timer: 0.0,
        }
    }

    /// Arms the clip for `attack_type` from its first frame.
    pub fn start_animation(&mut self, attack_type: AttackType) -> CombatResult<()> {
        let clip = self
            .clips
            .get(&attack_type)
            .ok_or(CombatError::MissingProfile(attack_type))?;

        self.duration_timer = clip.duration;
        self.attack_type = Some(attack_type);
        self.frame_counter = 0.0;
        self.current_frame_index = 0;
        self.last_frame_index = None;
        Ok(())
    }

    /// Advances the clip and shows the current frame on `sprite`.
    pub fn update_animation(&mut self, sprite: &mut Sprite, delta_time: f32) {
        let Some(clip) = self.attack_type.and_then(|t| self.clips.get(&t)) else {
            return;
        };
        let delta_time = delta_time.max(0.0);

        self.frame_counter += clip.speed * delta_time;
        self.current_frame_index = (self.frame_counter as usize).min(clip.frames.len() - 1);
        self.duration_timer -= delta_time;

        if self.last_frame_index != Some(self.current_frame_index) {
            let mut image = clip.frames[self.current_frame_index];
            // Attack art is drawn facing right.
            if !sprite.facing.is_right() {
                image = image.mirrored();
            }
            let center = sprite.rect.center();
            sprite.image = image;
            sprite.rect = image.rect_centered_on(center);
            self.last_frame_index = Some(self.current_frame_index);
            trace!(entity = %sprite.id(), frame = self.current_frame_index, "attack frame");
        }
    }

    /// Stops the clip.
    pub fn reset(&mut self) {
        self.attack_type = None;
        self.frame_counter = 0.0;
        self.current_frame_index = 0;
        self.last_frame_index = None;
        self.duration_timer = 0.0;
    }

    /// Attack being played, if any.
    #[must_use]
    pub const fn attack_type(&self) -> Option<AttackType> {
        self.attack_type
    }

    /// Index of the frame being shown.
    #[must_use]
    pub const fn current_frame_index(&self) -> usize {
        self.current_frame_index
    }

    /// Seconds left in the swing. Zero or below means finished.
    #[must_use]
    pub const fn duration_timer(&self) -> f32 {
        self.duration_timer
    }
}
