//! Scene layout files
//!
//! JSON descriptions of torch and crystal placements, loaded at startup and
//! spawned into the world. Validation happens here so a bad layout fails the
//! load instead of producing NaNs mid-session.

use crate::audio::{ConfigError, IntensityResponder, ResponderConfig};
use crate::scene::components::{Collectible, ProximityState, TorchFlame, Transform};
use crate::scene::world::World;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Errors that can occur while loading or spawning a layout
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid prop parameters: {0}")]
    Config(#[from] ConfigError),
}

/// Placement and tuning for one torch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TorchSpec {
    pub position: [f32; 3],
    /// Brightness mapping and smoothing rates
    pub flame: ResponderConfig,
    pub trigger_radius: f32,
    pub require_proximity: bool,
    pub emission_color: [f32; 3],
}

impl Default for TorchSpec {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            flame: ResponderConfig::default(),
            trigger_radius: 2.0,
            require_proximity: true,
            emission_color: [1.0, 0.5, 0.1],
        }
    }
}

/// Placement and scoring for one crystal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrystalSpec {
    pub position: [f32; 3],
    pub value: i32,
    pub wrong: bool,
}

impl Default for CrystalSpec {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            value: 1,
            wrong: false,
        }
    }
}

/// A scene layout: every prop the host should spawn
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneLayout {
    #[serde(default)]
    pub torches: Vec<TorchSpec>,
    #[serde(default)]
    pub crystals: Vec<CrystalSpec>,
}

impl SceneLayout {
    /// Load a layout from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let layout: SceneLayout = serde_json::from_str(&json)?;
        info!(
            path = %path.display(),
            torches = layout.torches.len(),
            crystals = layout.crystals.len(),
            "loaded scene layout"
        );
        Ok(layout)
    }

    /// Save the layout as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LayoutError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Spawn every prop into `world`, validating each torch's responder
    /// parameters. Returns the number of entities spawned.
    pub fn spawn_into(&self, world: &mut World) -> Result<usize, LayoutError> {
        let mut spawned = 0;

        for spec in &self.torches {
            let responder = IntensityResponder::new(spec.flame.clone())?;
            let mut flame = TorchFlame::new(responder);
            flame.trigger_radius = spec.trigger_radius;
            flame.require_proximity = spec.require_proximity;
            flame.emission_color = Vec3::from(spec.emission_color);

            let entity = world.spawn((
                Transform::from_position(Vec3::from(spec.position)),
                flame,
                ProximityState::default(),
            ));
            debug!(entity = ?entity, position = ?spec.position, "spawned torch");
            spawned += 1;
        }

        for spec in &self.crystals {
            let entity = world.spawn((
                Transform::from_position(Vec3::from(spec.position)),
                Collectible::new(spec.value, spec.wrong),
            ));
            debug!(entity = ?entity, position = ?spec.position, wrong = spec.wrong, "spawned crystal");
            spawned += 1;
        }

        Ok(spawned)
    }
}
