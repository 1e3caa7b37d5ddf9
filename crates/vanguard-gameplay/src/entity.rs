//! Sprites and arena-based sprite storage.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vanguard_common::{EntityId, FrameId, Rect};

/// Error types for sprite storage operations.
#[derive(Debug, Error)]
pub enum EntityError {
    /// Sprite not found
    #[error("Sprite not found: {0}")]
    NotFound(EntityId),
    /// Sprite slot already emptied
    #[error("Sprite already despawned: {0}")]
    AlreadyDespawned(EntityId),
}

/// Result type for sprite storage operations.
pub type EntityResult<T> = Result<T, EntityError>;

/// Which side of the fight a sprite belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpriteKind {
    /// The player character
    Player,
    /// Hostile mob
    Mob,
}

/// Horizontal facing of a sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// Facing toward negative x
    Left,
    /// Facing toward positive x
    #[default]
    Right,
}

impl Facing {
    /// `+1` when facing right, `-1` when facing left.
    #[must_use]
    pub const fn sign(self) -> i32 {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }

    /// Whether the sprite faces right.
    #[must_use]
    pub const fn is_right(self) -> bool {
        matches!(self, Self::Right)
    }
}

/// A displayable image: a frame handle plus its size and orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Image {
    /// Frame handle
    pub frame: FrameId,
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
    /// Mirrored horizontally
    #[serde(default)]
    pub flipped: bool,
}

impl Image {
    /// Creates an unmirrored image.
    #[must_use]
    pub const fn new(frame: FrameId, width: i32, height: i32) -> Self {
        Self {
            frame,
            width,
            height,
            flipped: false,
        }
    }

    /// Returns the horizontally mirrored image.
    #[must_use]
    pub const fn mirrored(self) -> Self {
        Self {
            flipped: !self.flipped,
            ..self
        }
    }

    /// Bounds of this image centered on a point.
    #[must_use]
    pub const fn rect_centered_on(&self, center: (i32, i32)) -> Rect {
        Rect::from_center(center.0, center.1, self.width, self.height)
    }
}

/// A combatant in the game world.
///
/// `rect`, `image` and `facing` are freely mutated by the components driving
/// the sprite. Life only moves through [`Sprite::receive_damage`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sprite {
    id: EntityId,
    kind: SpriteKind,
    /// Bounding rectangle in world pixels
    pub rect: Rect,
    /// Currently displayed image
    pub image: Image,
    /// Image restored once a lunge attack ends
    pub default_image: Image,
    /// Image shown while a lunge attack connects
    pub attacking_image: Option<Image>,
    /// Horizontal facing
    pub facing: Facing,
    life: i32,
    defeated: bool,
}

impl Sprite {
    /// Creates a sprite whose bounds match `image`, centered on `center`.
    #[must_use]
    pub fn new(kind: SpriteKind, image: Image, center: (i32, i32), life: i32) -> Self {
        Self {
            id: EntityId::new(),
            kind,
            rect: image.rect_centered_on(center),
            image,
            default_image: image,
            attacking_image: None,
            facing: Facing::Right,
            life,
            defeated: false,
        }
    }

    /// Sets the initial facing.
    #[must_use]
    pub fn with_facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }

    /// Sets the image shown when a lunge attack lands.
    #[must_use]
    pub fn with_attacking_image(mut self, image: Image) -> Self {
        self.attacking_image = Some(image);
        self
    }

    /// Returns the sprite's unique ID.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the sprite's side.
    #[must_use]
    pub const fn kind(&self) -> SpriteKind {
        self.kind
    }

    /// Remaining life. Can go negative.
    #[must_use]
    pub const fn life(&self) -> i32 {
        self.life
    }

    /// Whether the defeat notification already fired.
    #[must_use]
    pub const fn is_defeated(&self) -> bool {
        self.defeated
    }

    /// Subtracts `amount` from life and returns what is left.
    ///
    /// Life may go negative; it saturates at the `i32` bounds.
    pub fn receive_damage(&mut self, amount: i32) -> i32 {
        self.life = self.life.saturating_sub(amount);
        self.life
    }

    /// Flags the sprite as defeated. Returns `false` if it already was.
    pub fn defeat(&mut self) -> bool {
        !std::mem::replace(&mut self.defeated, true)
    }
}

/// Arena-based sprite storage.
///
/// Free slots are recycled; lookups go through an id-to-slot map. Iteration
/// follows slot order, which keeps target queries deterministic.
#[derive(Debug, Default)]
pub struct SpriteArena {
    slots: Vec<Option<Sprite>>,
    free_list: Vec<usize>,
    id_to_index: std::collections::HashMap<EntityId, usize>,
}

impl SpriteArena {
    /// Creates a new empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sprites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.id_to_index.len()
    }

    /// Returns true if there are no live sprites.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id_to_index.is_empty()
    }

    /// Total slots, including free ones.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Moves a sprite into the arena and returns its ID.
    pub fn spawn(&mut self, sprite: Sprite) -> EntityId {
        let id = sprite.id();

        let index = if let Some(free_index) = self.free_list.pop() {
            self.slots[free_index] = Some(sprite);
            free_index
        } else {
            self.slots.push(Some(sprite));
            self.slots.len() - 1
        };

        self.id_to_index.insert(id, index);
        id
    }

    /// Removes a sprite and hands it back.
    pub fn despawn(&mut self, id: EntityId) -> EntityResult<Sprite> {
        let index = self
            .id_to_index
            .remove(&id)
            .ok_or(EntityError::NotFound(id))?;

        let sprite = self.slots[index]
            .take()
            .ok_or(EntityError::AlreadyDespawned(id))?;

        self.free_list.push(index);
        Ok(sprite)
    }

    /// Gets a sprite by ID.
    pub fn get(&self, id: EntityId) -> EntityResult<&Sprite> {
        let index = self.id_to_index.get(&id).ok_or(EntityError::NotFound(id))?;
        self.slots[*index].as_ref().ok_or(EntityError::NotFound(id))
    }

    /// Gets a mutable sprite by ID.
    pub fn get_mut(&mut self, id: EntityId) -> EntityResult<&mut Sprite> {
        let index = self.id_to_index.get(&id).ok_or(EntityError::NotFound(id))?;
        self.slots[*index].as_mut().ok_or(EntityError::NotFound(id))
    }

    /// Checks if a sprite with the given ID is alive.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.id_to_index.contains_key(&id)
    }

    /// Iterates live sprites in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Sprite> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Iterates live sprites of one side.
    pub fn iter_by_kind(&self, kind: SpriteKind) -> impl Iterator<Item = &Sprite> {
        self.iter().filter(move |s| s.kind() == kind)
    }

    /// Snapshot of the IDs of one side, in slot order.
    #[must_use]
    pub fn ids_by_kind(&self, kind: SpriteKind) -> Vec<EntityId> {
        self.iter_by_kind(kind).map(Sprite::id).collect()
    }

    /// Clears all sprites.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.id_to_index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> Image {
        Image::new(FrameId::new(1), 32, 48)
    }

    #[test]
    fn test_sprite_bounds_follow_image() {
        let sprite = Sprite::new(SpriteKind::Mob, image(), (100, 200), 10);
        assert_eq!(sprite.rect.center(), (100, 200));
        assert_eq!((sprite.rect.w, sprite.rect.h), (32, 48));
        assert_eq!(sprite.default_image, image());
    }

    #[test]
    fn test_receive_damage_goes_negative() {
        let mut sprite = Sprite::new(SpriteKind::Mob, image(), (0, 0), 10);
        assert_eq!(sprite.receive_damage(15), -5);
        assert_eq!(sprite.life(), -5);
    }

    #[test]
    fn test_receive_damage_saturates() {
        let mut sprite = Sprite::new(SpriteKind::Mob, image(), (0, 0), -10);
        assert_eq!(sprite.receive_damage(i32::MAX), i32::MIN);

        let mut sprite = Sprite::new(SpriteKind::Mob, image(), (0, 0), i32::MAX);
        assert_eq!(sprite.receive_damage(i32::MIN), i32::MAX);
    }

    #[test]
    fn test_defeat_only_once() {
        let mut sprite = Sprite::new(SpriteKind::Mob, image(), (0, 0), 10);
        assert!(sprite.defeat());
        assert!(!sprite.defeat());
        assert!(sprite.is_defeated());
    }

    #[test]
    fn test_image_mirrored_toggles() {
        let img = image();
        assert!(img.mirrored().flipped);
        assert_eq!(img.mirrored().mirrored(), img);
    }

    #[test]
    fn test_facing_sign() {
        assert_eq!(Facing::Right.sign(), 1);
        assert_eq!(Facing::Left.sign(), -1);
    }

    #[test]
    fn test_arena_spawn_and_get() {
        let mut arena = SpriteArena::new();
        let id = arena.spawn(Sprite::new(SpriteKind::Player, image(), (0, 0), 100));

        assert!(id.is_valid());
        assert_eq!(arena.len(), 1);
        let sprite = arena.get(id).expect("sprite should exist");
        assert_eq!(sprite.kind(), SpriteKind::Player);
    }

    #[test]
    fn test_arena_despawn_and_reuse_slot() {
        let mut arena = SpriteArena::new();
        let first = arena.spawn(Sprite::new(SpriteKind::Mob, image(), (0, 0), 5));
        arena.despawn(first).expect("despawn should succeed");
        assert!(arena.get(first).is_err());
        assert!(arena.despawn(first).is_err());

        let second = arena.spawn(Sprite::new(SpriteKind::Mob, image(), (0, 0), 5));
        assert_eq!(arena.capacity(), 1);
        assert_ne!(first, second);
    }

    #[test]
    fn test_arena_ids_by_kind_in_slot_order() {
        let mut arena = SpriteArena::new();
        let mob_a = arena.spawn(Sprite::new(SpriteKind::Mob, image(), (0, 0), 5));
        arena.spawn(Sprite::new(SpriteKind::Player, image(), (0, 0), 5));
        let mob_b = arena.spawn(Sprite::new(SpriteKind::Mob, image(), (0, 0), 5));

        assert_eq!(arena.ids_by_kind(SpriteKind::Mob), vec![mob_a, mob_b]);
        assert_eq!(arena.iter_by_kind(SpriteKind::Player).count(), 1);
    }

    #[test]
    fn test_arena_clear() {
        let mut arena = SpriteArena::new();
        arena.spawn(Sprite::new(SpriteKind::Mob, image(), (0, 0), 5));
        arena.clear();
        assert!(arena.is_empty());
    }
}
