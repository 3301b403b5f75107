//! Prop components for the scene world

use crate::audio::{IntensityResponder, ResponderConfig};
use crate::math::lerp;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Light output switches off below this intensity.
pub const LIGHT_ENABLE_THRESHOLD: f32 = 0.01;
/// Particles start playing above this intensity.
pub const PARTICLE_PLAY_THRESHOLD: f32 = 0.05;
/// Particles stop once intensity decays to this or below.
pub const PARTICLE_STOP_THRESHOLD: f32 = 0.01;

/// Position of a prop in world space
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Transform {
    /// Position in world space
    pub position: Vec3,
}

impl Transform {
    /// Create a new transform at the given position
    pub fn from_position(position: Vec3) -> Self {
        Self { position }
    }
}

/// A torch flame prop: smoothed loudness response plus the visual outputs
/// the host maps onto its light, particle system, and emissive material.
#[derive(Debug, Clone)]
pub struct TorchFlame {
    /// Loudness-to-brightness smoothing
    pub responder: IntensityResponder,
    /// Whether the player must be inside the trigger radius for the flame
    /// to react
    pub require_proximity: bool,
    /// Radius of the trigger sphere around the torch
    pub trigger_radius: f32,
    /// Emissive tint for the flame material
    pub emission_color: Vec3,
    /// Multiplier applied to the auxiliary level for emissive energy
    pub emission_boost: f32,
    /// Particle emission rate at full auxiliary level
    pub max_particle_rate: f32,

    // Outputs refreshed each tick
    /// Smoothed light intensity
    pub light_intensity: f32,
    /// Whether the light should be on at all
    pub light_enabled: bool,
    /// Particle emission rate
    pub particle_rate: f32,
    /// Particle play/stop state with hysteresis
    pub particles_playing: bool,
    /// Emissive energy; scale `emission_color` by this
    pub emission_energy: f32,
    /// Loudness fed to the responder on the last tick (0 while gated off)
    pub last_level01: f32,
}

impl TorchFlame {
    /// Build a flame around an already validated responder.
    pub fn new(responder: IntensityResponder) -> Self {
        Self {
            responder,
            require_proximity: true,
            trigger_radius: 2.0,
            emission_color: Vec3::new(1.0, 0.5, 0.1),
            emission_boost: 2.5,
            max_particle_rate: 40.0,
            light_intensity: 0.0,
            light_enabled: false,
            particle_rate: 0.0,
            particles_playing: false,
            emission_energy: 0.0,
            last_level01: 0.0,
        }
    }

    /// Recompute the visual outputs from the responder state.
    pub fn refresh_outputs(&mut self) {
        let intensity = self.responder.current_intensity();
        let aux = self.responder.aux01();

        self.light_intensity = intensity;
        self.light_enabled = intensity > LIGHT_ENABLE_THRESHOLD;
        self.particle_rate = lerp(0.0, self.max_particle_rate, aux);
        if intensity > PARTICLE_PLAY_THRESHOLD && !self.particles_playing {
            self.particles_playing = true;
        }
        if intensity <= PARTICLE_STOP_THRESHOLD && self.particles_playing {
            self.particles_playing = false;
        }
        self.emission_energy = aux * self.emission_boost;
    }
}

impl Default for TorchFlame {
    fn default() -> Self {
        let responder = IntensityResponder::new(ResponderConfig::default())
            .expect("default responder config is valid");
        Self::new(responder)
    }
}

/// Edge produced when the player crosses a trigger boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneEdge {
    Entered,
    Exited,
}

/// Tracks whether the player is inside a prop's trigger zone, reporting
/// enter/exit edges
#[derive(Debug, Clone, Copy, Default)]
pub struct ProximityState {
    inside: bool,
}

impl ProximityState {
    /// Record the current containment test, returning an edge when it
    /// changed since the last tick.
    pub fn update(&mut self, inside: bool) -> Option<ZoneEdge> {
        if inside == self.inside {
            return None;
        }
        self.inside = inside;
        Some(if inside {
            ZoneEdge::Entered
        } else {
            ZoneEdge::Exited
        })
    }

    /// Whether the player was inside on the last update.
    pub fn is_inside(&self) -> bool {
        self.inside
    }
}

/// A collectible crystal with its score contribution
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Collectible {
    /// Base score value. Negative values are allowed directly for props
    /// that always penalize.
    pub value: i32,
    /// Marks a wrong crystal: grabbing it subtracts the value's magnitude
    pub wrong: bool,
    /// Latched once a grab has been counted
    #[serde(skip)]
    pub collected: bool,
}

impl Collectible {
    pub fn new(value: i32, wrong: bool) -> Self {
        Self {
            value,
            wrong,
            collected: false,
        }
    }

    /// Score delta applied when this prop is grabbed.
    pub fn signed_delta(&self) -> i32 {
        if self.wrong {
            -self.value.abs()
        } else {
            self.value
        }
    }
}

impl Default for Collectible {
    fn default() -> Self {
        Self::new(1, false)
    }
}

/// Removes a prop once the timer runs out (collected crystals linger a few
/// seconds so their feedback effects can play out)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DespawnTimer {
    /// Seconds until the entity is despawned
    pub remaining: f32,
}

impl DespawnTimer {
    pub fn new(seconds: f32) -> Self {
        Self { remaining: seconds }
    }
}
