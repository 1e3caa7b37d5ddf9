//! Frame-advance animation driver.
//!
//! The driver accumulates `speed * delta_time` into a floating frame counter
//! and shows `trunc(counter)`. Once the counter reaches the frame count it
//! snaps back to zero instead of wrapping, so any overshoot past the last
//! frame is discarded.

use thiserror::Error;
use tracing::trace;

use crate::entity::{Image, Sprite};

/// Errors raised when building an animation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnimationError {
    /// No frames to cycle through
    #[error("animation needs at least one frame")]
    NoFrames,
    /// Speed is negative, NaN or infinite
    #[error("invalid animation speed: {0}")]
    InvalidSpeed(f32),
}

/// Result type for animation construction.
pub type AnimationResult<T> = Result<T, AnimationError>;

/// Cycles a sprite through a list of frames.
#[derive(Debug, Clone)]
pub struct AnimationDriver {
    frames: Vec<Image>,
    /// Frames per second
    speed: f32,
    frame_counter: f32,
    current_frame_index: usize,
    last_frame_index: Option<usize>,
}

impl AnimationDriver {
    /// Creates a driver over `frames`, advancing `speed` frames per second.
    pub fn new(frames: Vec<Image>, speed: f32) -> AnimationResult<Self> {
        if frames.is_empty() {
            return Err(AnimationError::NoFrames);
        }
        if !speed.is_finite() || speed < 0.0 {
            return Err(AnimationError::InvalidSpeed(speed));
        }
        Ok(Self {
            frames,
            speed,
            frame_counter: 0.0,
            current_frame_index: 0,
            last_frame_index: None,
        })
    }

    /// Advances the animation and refreshes the sprite when the frame changes.
    ///
    /// Non-positive deltas leave the counter where it is.
    pub fn update(&mut self, sprite: &mut Sprite, delta_time: f32) {
        self.increment_counter(delta_time);
        self.current_frame_index = self.frame_counter as usize;
        self.apply_frame(sprite);
    }

    fn increment_counter(&mut self, delta_time: f32) {
        self.frame_counter += self.speed * delta_time.max(0.0);
        if self.frame_counter >= self.frames.len() as f32 {
            self.frame_counter = 0.0;
        }
    }

    fn apply_frame(&mut self, sprite: &mut Sprite) {
        if self.last_frame_index == Some(self.current_frame_index) {
            return;
        }

        let mut image = self.frames[self.current_frame_index];
        // Source art faces left; mirror for right-facing sprites.
        if sprite.facing.is_right() {
            image = image.mirrored();
        }
        let center = sprite.rect.center();
        sprite.image = image;
        sprite.rect = image.rect_centered_on(center);

        trace!(
            entity = %sprite.id(),
            frame = self.current_frame_index,
            "animation frame changed"
        );
        self.last_frame_index = Some(self.current_frame_index);
    }

    /// Rewinds to frame 0; the next update re-applies it to the sprite.
    pub fn reset(&mut self) {
        self.frame_counter = 0.0;
        self.current_frame_index = 0;
        self.last_frame_index = None;
    }

    /// Index of the frame being shown.
    #[must_use]
    pub const fn current_frame_index(&self) -> usize {
        self.current_frame_index
    }

    /// Image of the frame being shown (unmirrored).
    #[must_use]
    pub fn current_frame(&self) -> &Image {
        &self.frames[self.current_frame_index]
    }

    /// Raw floating frame counter.
    #[must_use]
    pub const fn frame_counter(&self) -> f32 {
        self.frame_counter
    }

    /// Number of frames in the cycle.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Frames per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }
}
