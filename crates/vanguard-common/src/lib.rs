//! # Vanguard Common
//!
//! Common types, utilities, and shared abstractions for Vanguard.
//!
//! This crate provides foundational types used across all Vanguard subsystems:
//! - Screen-space rectangles (pixel geometry)
//! - ID types (EntityId, FrameId, SoundId)
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod geometry;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::geometry::*;
    pub use crate::ids::*;
}

pub use prelude::*;
