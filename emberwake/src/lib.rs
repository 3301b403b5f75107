//! Voice-reactive prop toolkit
//!
//! This crate provides the engine-independent core of a voice-reactive scene:
//! microphone loudness sensing, smoothed intensity response for flame props,
//! collectible scoring, and proximity gating. The host application owns the
//! tick loop and the rendering/haptics collaborators; everything here is
//! driven through explicit `tick(dt)` calls.

pub mod audio;
pub mod math;
pub mod scene;

// Re-export commonly used types
pub mod prelude {
    // Sensing and response
    pub use crate::audio::{
        CaptureConfig, CaptureError, CaptureSource, ConfigError, IntensityResponder,
        LoudnessSensor, MicCapture, ResponderConfig, SensorConfig,
    };

    // Scene types
    pub use crate::scene::{
        collect_grab_system, despawn_timer_system, flame_update_system, CollectFeedback,
        Collectible, CollectionTally, CrystalSpec, DespawnTimer, GrabEvent, ProximityState,
        SceneLayout, TorchFlame, TorchSpec, Transform, World,
    };

    // Math types
    pub use glam::Vec3;

    pub use cpal;
}

/// Initialize logging for the library and demos
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cpal=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
