//! Loudness sensing: window RMS -> dB -> normalized level
//!
//! The sensor reads a fixed window of the most recent capture samples each
//! tick and maps their energy into a calibrated \[0, 1\] level. Silence and
//! a not-yet-ready device both report level 0; nothing here can fail at
//! runtime once the configuration is accepted.

use crate::audio::capture::CaptureSource;
use crate::audio::{ConfigError, DB_EPSILON};
use crate::math::{clamp01, inverse_lerp};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

/// Smallest window the sensor will accept when configured.
pub const MIN_SAMPLE_COUNT: usize = 64;

/// Calibration and window parameters for the loudness sensor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Silence / background noise level in dB
    pub floor_db: f32,
    /// Full-yell / maximum level in dB
    pub ceil_db: f32,
    /// Number of samples read per tick (raised to [`MIN_SAMPLE_COUNT`])
    pub sample_count: usize,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            floor_db: -50.0,
            ceil_db: -18.0,
            sample_count: 512,
        }
    }
}

impl SensorConfig {
    /// Reject degenerate calibration so the dB mapping can never divide by
    /// zero at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.floor_db >= self.ceil_db {
            return Err(ConfigError::DegenerateCalibration {
                floor_db: self.floor_db,
                ceil_db: self.ceil_db,
            });
        }
        if self.sample_count == 0 {
            return Err(ConfigError::EmptyWindow);
        }
        Ok(())
    }
}

/// Normalized microphone loudness derived from a rolling capture buffer
pub struct LoudnessSensor {
    floor_db: f32,
    ceil_db: f32,
    window: Vec<f32>,
    current_db: f32,
    level01: f32,
    ready: bool,
}

impl LoudnessSensor {
    /// Build a sensor from a validated config.
    pub fn new(config: SensorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let sample_count = config.sample_count.max(MIN_SAMPLE_COUNT);
        debug!(
            floor_db = config.floor_db,
            ceil_db = config.ceil_db,
            sample_count,
            "loudness sensor created"
        );
        Ok(Self {
            floor_db: config.floor_db,
            ceil_db: config.ceil_db,
            window: vec![0.0; sample_count],
            current_db: config.floor_db,
            level01: 0.0,
            ready: false,
        })
    }

    /// Normalized loudness in \[0, 1\].
    pub fn level01(&self) -> f32 {
        self.level01
    }

    /// Most recent dB reading. Meaningful only once [`Self::ready`] is true.
    pub fn current_db(&self) -> f32 {
        self.current_db
    }

    /// Whether the capture device has produced its first sample.
    pub fn ready(&self) -> bool {
        self.ready
    }

    /// Configured window length in samples.
    pub fn sample_count(&self) -> usize {
        self.window.len()
    }

    /// Read the latest window from `capture` and recompute the level.
    /// A device that has not produced anything yet reports level 0 and
    /// leaves the dB reading untouched.
    pub fn tick(&mut self, capture: &dyn CaptureSource) {
        if capture.write_position() == 0 {
            self.level01 = 0.0;
            self.ready = false;
            return;
        }

        if !self.ready {
            self.ready = true;
            info!("microphone ready");
        }

        let count = capture.read_latest(&mut self.window);
        if count == 0 {
            // Transient read gap, not an error
            self.level01 = 0.0;
            return;
        }

        let db = window_db(&self.window[..count]);
        self.current_db = db;
        self.level01 = clamp01(inverse_lerp(self.floor_db, self.ceil_db, db));
        trace!(db, level01 = self.level01, "loudness updated");
    }
}

/// Mean-square energy of a window, with the epsilon floor applied before the
/// square root so an all-zero window still yields a finite dB value.
pub fn window_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    let ms = (sum_sq / samples.len() as f64) as f32;
    (ms + DB_EPSILON).sqrt()
}

/// dB level of a sample window: `20 * log10(rms + epsilon)`.
pub fn window_db(samples: &[f32]) -> f32 {
    20.0 * (window_rms(samples) + DB_EPSILON).log10()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Capture stand-in that replays a fixed window.
    struct ScriptedCapture {
        samples: Vec<f32>,
        position: u64,
    }

    impl ScriptedCapture {
        fn new(samples: Vec<f32>) -> Self {
            let position = samples.len() as u64;
            Self { samples, position }
        }

        fn silent() -> Self {
            Self {
                samples: Vec::new(),
                position: 0,
            }
        }
    }

    impl CaptureSource for ScriptedCapture {
        fn write_position(&self) -> u64 {
            self.position
        }

        fn read_latest(&self, out: &mut [f32]) -> usize {
            let count = out.len().min(self.samples.len());
            out[..count].copy_from_slice(&self.samples[self.samples.len() - count..]);
            count
        }
    }

    fn sensor() -> LoudnessSensor {
        LoudnessSensor::new(SensorConfig::default()).unwrap()
    }

    #[test]
    fn test_not_ready_reports_zero() {
        let mut s = sensor();
        let capture = ScriptedCapture::silent();
        s.tick(&capture);
        assert!(!s.ready());
        assert_eq!(s.level01(), 0.0);
    }

    #[test]
    fn test_all_zero_window_is_silence_floor() {
        let mut s = sensor();
        let capture = ScriptedCapture::new(vec![0.0; 512]);
        s.tick(&capture);
        assert!(s.ready());
        // epsilon keeps the dB finite; -50 dB floor sits far above it
        assert_eq!(s.level01(), 0.0);
        assert!(s.current_db() < -100.0);
    }

    #[test]
    fn test_rms_point_one_maps_near_ceiling() {
        // Constant 0.1 amplitude: rms = 0.1, db = -20,
        // level = (-20 + 50) / 32 = 0.9375
        let mut s = sensor();
        let capture = ScriptedCapture::new(vec![0.1; 512]);
        s.tick(&capture);
        assert!((s.current_db() - (-20.0)).abs() < 1e-3);
        assert!((s.level01() - 0.9375).abs() < 1e-3);
    }

    #[test]
    fn test_loud_window_clamps_to_one() {
        let mut s = sensor();
        let capture = ScriptedCapture::new(vec![1.0; 512]);
        s.tick(&capture);
        // 0 dB is well above the -18 dB ceiling
        assert_eq!(s.level01(), 1.0);
    }

    #[test]
    fn test_level_monotone_in_amplitude() {
        let mut previous = -1.0;
        for amp in [0.001, 0.005, 0.02, 0.05, 0.1, 0.3] {
            let mut s = sensor();
            let capture = ScriptedCapture::new(vec![amp; 512]);
            s.tick(&capture);
            assert!(
                s.level01() >= previous,
                "level not monotone at amplitude {amp}"
            );
            previous = s.level01();
        }
    }

    #[test]
    fn test_db_untouched_until_first_read() {
        let mut s = sensor();
        let before = s.current_db();
        s.tick(&ScriptedCapture::silent());
        assert_eq!(s.current_db(), before);
    }

    #[test]
    fn test_window_raised_to_minimum() {
        let s = LoudnessSensor::new(SensorConfig {
            sample_count: 8,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(s.sample_count(), MIN_SAMPLE_COUNT);
    }

    #[test]
    fn test_degenerate_calibration_rejected() {
        let config = SensorConfig {
            floor_db: -20.0,
            ceil_db: -20.0,
            ..Default::default()
        };
        assert!(matches!(
            LoudnessSensor::new(config).err(),
            Some(ConfigError::DegenerateCalibration { .. })
        ));
    }

    #[test]
    fn test_empty_window_rejected() {
        let config = SensorConfig {
            sample_count: 0,
            ..Default::default()
        };
        assert!(matches!(
            LoudnessSensor::new(config).err(),
            Some(ConfigError::EmptyWindow)
        ));
    }

    #[test]
    fn test_window_rms_empty_is_zero() {
        assert_eq!(window_rms(&[]), 0.0);
    }
}
