//! Microphone loudness sensing and intensity response
//!
//! This module provides the audio side of the toolkit:
//! - A fixed-capacity sample ring fed by the capture callback
//! - A cpal-backed microphone capture with device-name filtering
//! - RMS -> dB -> normalized loudness conversion with calibrated bounds
//! - Asymmetric exponential smoothing toward a gated intensity target

pub mod capture;
pub mod level;
pub mod meter;
pub mod responder;
pub mod ring;

// Re-export commonly used types
pub use capture::{CaptureConfig, CaptureError, CaptureSource, MicCapture};
pub use level::{LoudnessSensor, SensorConfig};
pub use meter::meter_line;
pub use responder::{IntensityResponder, ResponderConfig};
pub use ring::SampleRing;

/// Numerical floor applied before `sqrt` and `log10` so silence maps to a
/// finite dB value instead of negative infinity.
pub const DB_EPSILON: f32 = 1e-12;

/// Errors raised when sensor or responder parameters are rejected at
/// construction time
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("calibration bounds are degenerate: floor {floor_db} dB must be below ceil {ceil_db} dB")]
    DegenerateCalibration { floor_db: f32, ceil_db: f32 },

    #[error("{name} must be positive, got {value}")]
    NonPositiveRate { name: &'static str, value: f32 },

    #[error("min intensity {min} exceeds max intensity {max}")]
    InvertedIntensityBounds { min: f32, max: f32 },

    #[error("sample rate must be positive")]
    ZeroSampleRate,

    #[error("sample window must hold at least one sample")]
    EmptyWindow,
}
