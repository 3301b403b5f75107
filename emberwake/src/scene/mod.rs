//! Scene props and per-tick systems
//!
//! This module holds the prop logic for a voice-reactive scene:
//! - Torch flames whose brightness follows the microphone when the player
//!   is inside their trigger radius
//! - Collectible crystals feeding a clamped scoring tally
//! - Timed despawn of collected props
//!
//! Components are plain structs over a thin `hecs` world wrapper; systems
//! are free functions the host calls once per tick.

pub mod components;
pub mod layout;
pub mod systems;
pub mod tally;
pub mod world;


// Re-export commonly used types
pub use components::{
    Collectible, DespawnTimer, ProximityState, TorchFlame, Transform, ZoneEdge,
};
pub use layout::{CrystalSpec, LayoutError, SceneLayout, TorchSpec};
pub use systems::{
    collect_grab_system, despawn_timer_system, flame_update_system, CollectFeedback, GrabEvent,
};
pub use tally::CollectionTally;
pub use world::{Entity, World};
