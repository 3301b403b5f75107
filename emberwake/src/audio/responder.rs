//! Intensity response: asymmetric exponential smoothing toward a gated target
//!
//! One responder drives one visual output (a light, a particle emitter, an
//! emissive material). The gate only swaps which target feeds the filter, so
//! a fire fades out when the player leaves instead of snapping off.

use crate::audio::ConfigError;
use crate::math::{clamp01, inverse_lerp, lerp};
use serde::{Deserialize, Serialize};

/// Brightness mapping and smoothing rates for an [`IntensityResponder`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponderConfig {
    /// Output at zero loudness (and the baseline decayed to when gated off)
    pub min_intensity: f32,
    /// Output at full loudness
    pub max_intensity: f32,
    /// Smoothing rate while brightening (1/seconds)
    pub rise_rate: f32,
    /// Smoothing rate while dimming (1/seconds)
    pub fall_rate: f32,
    /// Fraction of `max_intensity` at which the auxiliary normalized output
    /// saturates. Flame emission tuning works well at 0.6.
    pub aux_fraction: f32,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            min_intensity: 0.0,
            max_intensity: 3.5,
            rise_rate: 12.0,
            fall_rate: 6.0,
            aux_fraction: 0.6,
        }
    }
}

impl ResponderConfig {
    /// Reject inverted bounds and non-positive rates up front; the tick path
    /// assumes both.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_intensity > self.max_intensity {
            return Err(ConfigError::InvertedIntensityBounds {
                min: self.min_intensity,
                max: self.max_intensity,
            });
        }
        if self.rise_rate <= 0.0 {
            return Err(ConfigError::NonPositiveRate {
                name: "rise_rate",
                value: self.rise_rate,
            });
        }
        if self.fall_rate <= 0.0 {
            return Err(ConfigError::NonPositiveRate {
                name: "fall_rate",
                value: self.fall_rate,
            });
        }
        Ok(())
    }
}

/// First-order smoothed intensity that exponentially approaches a
/// loudness-driven target while active and decays to baseline while not.
#[derive(Debug, Clone)]
pub struct IntensityResponder {
    config: ResponderConfig,
    current: f32,
    aux01: f32,
}

impl IntensityResponder {
    /// Build a responder from a validated config, starting at the baseline.
    pub fn new(config: ResponderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let current = config.min_intensity;
        Ok(Self {
            config,
            current,
            aux01: 0.0,
        })
    }

    /// Current smoothed intensity, always within the configured bounds.
    pub fn current_intensity(&self) -> f32 {
        self.current
    }

    /// Normalized \[0, 1\] value for secondary effects (particle emission
    /// rate, emissive energy), saturating at `max_intensity * aux_fraction`.
    pub fn aux01(&self) -> f32 {
        self.aux01
    }

    pub fn config(&self) -> &ResponderConfig {
        &self.config
    }

    /// Advance the filter by `dt` seconds. `level01` is the sensor's
    /// normalized loudness; `active` is the host-supplied gate.
    pub fn tick(&mut self, dt: f32, level01: f32, active: bool) {
        let cfg = &self.config;
        let target = if active {
            lerp(cfg.min_intensity, cfg.max_intensity, clamp01(level01))
        } else {
            cfg.min_intensity
        };

        let rate = if target > self.current {
            cfg.rise_rate
        } else {
            cfg.fall_rate
        };
        let blend = 1.0 - (-rate * dt.max(0.0)).exp();
        self.current = lerp(self.current, target, blend);
        // The exp form cannot overshoot for sane dt, but a frame spike must
        // not leave the output outside its bounds.
        self.current = self.current.clamp(cfg.min_intensity, cfg.max_intensity);

        self.aux01 = clamp01(inverse_lerp(
            0.0,
            cfg.max_intensity * cfg.aux_fraction,
            self.current,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn responder() -> IntensityResponder {
        IntensityResponder::new(ResponderConfig::default()).unwrap()
    }

    #[test]
    fn test_starts_at_baseline() {
        let r = responder();
        assert_eq!(r.current_intensity(), 0.0);
        assert_eq!(r.aux01(), 0.0);
    }

    #[test]
    fn test_single_tick_rise_value() {
        // rise_rate 12, dt 1/60: 3.5 * (1 - exp(-0.2)) ~= 0.6344
        let mut r = responder();
        r.tick(DT, 1.0, true);
        assert!((r.current_intensity() - 0.6344).abs() < 1e-3);
    }

    #[test]
    fn test_converges_monotonically() {
        let mut r = responder();
        let target = 3.5;
        let mut previous_error = target;
        for _ in 0..25 {
            r.tick(DT, 1.0, true);
            let error = (target - r.current_intensity()).abs();
            assert!(error < previous_error, "error did not shrink: {error}");
            previous_error = error;
        }
        // ceil(5 / (rate * dt)) = 25 ticks puts the error below 1% of range
        assert!(previous_error < target * 0.01);
    }

    #[test]
    fn test_never_leaves_bounds() {
        let mut r = responder();
        let levels = [0.0, 1.0, 0.3, 1.0, 0.0, 0.9, 0.1];
        for _ in 0..200 {
            for (i, &level) in levels.iter().enumerate() {
                r.tick(DT, level, i % 3 != 0);
                let v = r.current_intensity();
                assert!((0.0..=3.5).contains(&v), "intensity escaped bounds: {v}");
            }
        }
    }

    #[test]
    fn test_gate_off_decays_without_jump() {
        let mut r = responder();
        for _ in 0..120 {
            r.tick(DT, 1.0, true);
        }
        let before = r.current_intensity();
        r.tick(DT, 1.0, false);
        let after = r.current_intensity();
        // Continuous decay toward baseline, bounded by the smoothing formula
        let max_step = before * (1.0 - (-6.0 * DT).exp());
        assert!(after < before);
        assert!(before - after <= max_step + 1e-5);
    }

    #[test]
    fn test_fall_uses_fall_rate() {
        let mut rise_only = responder();
        for _ in 0..300 {
            rise_only.tick(DT, 1.0, true);
        }
        let mut a = rise_only.clone();
        let mut b = rise_only;
        a.tick(DT, 0.0, true);
        b.tick(DT, 1.0, false);
        // Both fall; with identical fall rates the trajectories match
        assert!((a.current_intensity() - b.current_intensity()).abs() < 1e-5);
    }

    #[test]
    fn test_aux_saturates_at_fraction_of_max() {
        let mut r = responder();
        for _ in 0..600 {
            r.tick(DT, 1.0, true);
        }
        // current ~= 3.5, aux ceiling is 3.5 * 0.6 = 2.1
        assert_eq!(r.aux01(), 1.0);

        // At 30% of max, aux = clamp01(1.05 / 2.1) = 0.5
        let mut half = IntensityResponder::new(ResponderConfig::default()).unwrap();
        half.current = 1.05;
        half.tick(0.0, 0.3, true);
        assert!((half.aux01() - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_nonzero_baseline_holds_when_inactive() {
        let config = ResponderConfig {
            min_intensity: 0.5,
            ..Default::default()
        };
        let mut r = IntensityResponder::new(config).unwrap();
        for _ in 0..120 {
            r.tick(DT, 0.0, false);
        }
        assert!((r.current_intensity() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let inverted = ResponderConfig {
            min_intensity: 2.0,
            max_intensity: 1.0,
            ..Default::default()
        };
        assert!(matches!(
            inverted.validate(),
            Err(ConfigError::InvertedIntensityBounds { .. })
        ));

        let bad_rate = ResponderConfig {
            rise_rate: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            bad_rate.validate(),
            Err(ConfigError::NonPositiveRate { name: "rise_rate", .. })
        ));

        let bad_fall = ResponderConfig {
            fall_rate: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            bad_fall.validate(),
            Err(ConfigError::NonPositiveRate { name: "fall_rate", .. })
        ));
    }
}
