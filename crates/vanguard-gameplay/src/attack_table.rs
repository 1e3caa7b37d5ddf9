//! Player attack definitions.
//!
//! Each [`AttackProfile`] describes one attack type: the frames it plays,
//! how fast, how long the swing lasts, and the hitbox active on each frame.
//! Tables are plain data and can be loaded from RON:
//!
//! ```ron
//! (profiles: [
//!     (
//!         attack_type: 1,
//!         frames: [(frame: 100, width: 96, height: 64)],
//!         speed: 12.0,
//!         duration: 0.5,
//!         hitboxes: [Some((offset_x: 40, offset_y: 0, width: 60, height: 48))],
//!     ),
//! ])
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vanguard_common::FrameId;

use crate::attack::AttackType;
use crate::entity::Image;

/// Errors raised while loading or validating an attack table.
#[derive(Debug, Error)]
pub enum AttackTableError {
    /// RON text could not be parsed
    #[error("failed to parse attack table: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// A profile is malformed
    #[error("invalid profile for {attack_type:?}: {reason}")]
    InvalidProfile {
        /// Offending attack type
        attack_type: AttackType,
        /// What was wrong with it
        reason: String,
    },
    /// The same attack type appears twice
    #[error("duplicate profile for {0:?}")]
    Duplicate(AttackType),
}

/// Result type for attack table operations.
pub type AttackTableResult<T> = Result<T, AttackTableError>;

/// Hitbox for one frame, relative to the attacker's center when facing right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitboxFrame {
    /// Horizontal offset of the box center (mirrored for left-facing attackers)
    pub offset_x: i32,
    /// Vertical offset of the box center
    pub offset_y: i32,
    /// Box width
    pub width: i32,
    /// Box height
    pub height: i32,
}

impl HitboxFrame {
    /// Creates a hitbox frame.
    #[must_use]
    pub const fn new(offset_x: i32, offset_y: i32, width: i32, height: i32) -> Self {
        Self {
            offset_x,
            offset_y,
            width,
            height,
        }
    }
}

/// Definition of one attack type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackProfile {
    /// Which attack this profile drives
    pub attack_type: AttackType,
    /// Animation frames, drawn facing right
    pub frames: Vec<Image>,
    /// Frames per second
    pub speed: f32,
    /// Swing length in seconds
    pub duration: f32,
    /// Hitbox per frame; `None` or a missing entry means no hitbox
    #[serde(default)]
    pub hitboxes: Vec<Option<HitboxFrame>>,
}

impl AttackProfile {
    fn validate(&self) -> AttackTableResult<()> {
        let invalid = |reason: &str| AttackTableError::InvalidProfile {
            attack_type: self.attack_type,
            reason: reason.to_owned(),
        };

        if self.frames.is_empty() {
            return Err(invalid("no frames"));
        }
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(invalid("speed must be positive"));
        }
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(invalid("duration must be positive"));
        }
        if self.hitboxes.len() > self.frames.len() {
            return Err(invalid("more hitboxes than frames"));
        }
        if self
            .hitboxes
            .iter()
            .flatten()
            .any(|h| h.width <= 0 || h.height <= 0)
        {
            return Err(invalid("hitbox with empty size"));
        }
        Ok(())
    }

    /// Hitbox for a frame, if that frame has one.
    #[must_use]
    pub fn hitbox(&self, frame_index: usize) -> Option<HitboxFrame> {
        self.hitboxes.get(frame_index).copied().flatten()
    }
}

/// Validated collection of attack profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAttackTable")]
pub struct AttackTable {
    profiles: Vec<AttackProfile>,
}

#[derive(Deserialize)]
struct RawAttackTable {
    profiles: Vec<AttackProfile>,
}

impl TryFrom<RawAttackTable> for AttackTable {
    type Error = AttackTableError;

    fn try_from(raw: RawAttackTable) -> Result<Self, Self::Error> {
        Self::new(raw.profiles)
    }
}

impl AttackTable {
    /// Validates and wraps a set of profiles.
    pub fn new(profiles: Vec<AttackProfile>) -> AttackTableResult<Self> {
        for (i, profile) in profiles.iter().enumerate() {
            profile.validate()?;
            if profiles[..i]
                .iter()
                .any(|p| p.attack_type == profile.attack_type)
            {
                return Err(AttackTableError::Duplicate(profile.attack_type));
            }
        }
        Ok(Self { profiles })
    }

    /// Parses a table from RON text.
    pub fn from_ron_str(text: &str) -> AttackTableResult<Self> {
        Ok(ron::from_str(text)?)
    }

    /// Profile for an attack type.
    #[must_use]
    pub fn profile(&self, attack_type: AttackType) -> Option<&AttackProfile> {
        self.profiles.iter().find(|p| p.attack_type == attack_type)
    }

    /// All profiles.
    #[must_use]
    pub fn profiles(&self) -> &[AttackProfile] {
        &self.profiles
    }

    /// Stock sword slash and cannon blast.
    #[must_use]
    pub fn standard() -> Self {
        let strip = |first: u32, count: u32| -> Vec<Image> {
            (first..first + count)
                .map(|id| Image::new(FrameId::new(id), 96, 64))
                .collect()
        };

        let slash_box = HitboxFrame::new(40, 0, 60, 48);
        let cannon_box = HitboxFrame::new(140, 4, 200, 24);

        Self {
            profiles: vec![
                AttackProfile {
                    attack_type: AttackType::Slash,
                    frames: strip(100, 6),
                    speed: 12.0,
                    duration: 0.5,
                    hitboxes: vec![
                        None,
                        None,
                        Some(slash_box),
                        Some(HitboxFrame::new(48, -4, 70, 56)),
                        Some(slash_box),
                        None,
                    ],
                },
                AttackProfile {
                    attack_type: AttackType::Cannon,
                    frames: strip(200, 4),
                    speed: 8.0,
                    duration: 0.5,
                    hitboxes: vec![None, Some(cannon_box), Some(cannon_box), Some(cannon_box)],
                },
            ],
        }
    }
}

impl Default for AttackTable {
    fn default() -> Self {
        Self::standard()
    }
}
