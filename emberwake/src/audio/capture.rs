//! Microphone capture backed by cpal
//!
//! The capture side owns the sample ring and fills it from the input stream
//! callback. Everything downstream of this module only sees the
//! [`CaptureSource`] trait, so tests and headless hosts can substitute a
//! scripted source.

use crate::audio::ring::SampleRing;
use crate::audio::ConfigError;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// The consumed capture interface: a monotonically advancing write position
/// and a windowed read ending at the newest sample.
pub trait CaptureSource {
    /// Total samples written so far. Zero means the device has not produced
    /// its first sample yet.
    fn write_position(&self) -> u64;

    /// Copy the most recent `out.len()` samples into `out`, returning how
    /// many were valid.
    fn read_latest(&self, out: &mut [f32]) -> usize;
}

/// Capture device selection and stream parameters
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Case-insensitive substring matched against device names. Empty picks
    /// the default (or first) input device.
    pub device_filter: String,
    /// Requested capture sample rate in Hz
    pub sample_rate: u32,
    /// Length of the rolling capture buffer in seconds
    pub loop_seconds: f32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_filter: String::new(),
            sample_rate: 22_050,
            loop_seconds: 1.0,
        }
    }
}

/// Errors raised while opening or driving the capture device
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("no input device available (filter: {filter:?})")]
    DeviceUnavailable { filter: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("device enumeration failed: {0}")]
    Devices(#[from] cpal::DevicesError),

    #[error("no usable stream config: {0}")]
    StreamConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start input stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),
}

/// cpal-backed microphone capture writing into a shared [`SampleRing`]
pub struct MicCapture {
    device_name: String,
    ring: Arc<Mutex<SampleRing>>,
    stream: Option<cpal::Stream>,
}

impl MicCapture {
    /// Enumerate input device names on the default host.
    pub fn devices() -> Result<Vec<String>, CaptureError> {
        let host = cpal::default_host();
        let mut names = Vec::new();
        for device in host.input_devices()? {
            if let Ok(name) = device.name() {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// Open the capture device selected by `config` and start streaming into
    /// the rolling buffer.
    pub fn open(config: &CaptureConfig) -> Result<Self, CaptureError> {
        if config.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate.into());
        }

        let host = cpal::default_host();
        let device = select_device(&host, &config.device_filter)?;
        let device_name = device.name().unwrap_or_else(|_| "<unknown>".to_string());

        let supported = device.default_input_config()?;
        let channels = supported.channels() as usize;
        let stream_config = cpal::StreamConfig {
            channels: supported.channels(),
            sample_rate: cpal::SampleRate(config.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let capacity = (config.sample_rate as f32 * config.loop_seconds.max(0.0)).ceil() as usize;
        let ring = Arc::new(Mutex::new(SampleRing::new(capacity.max(1))));

        let stream = match supported.sample_format() {
            cpal::SampleFormat::F32 => {
                build_stream_f32(&device, &stream_config, channels, Arc::clone(&ring))?
            }
            cpal::SampleFormat::I16 => {
                build_stream_i16(&device, &stream_config, channels, Arc::clone(&ring))?
            }
            cpal::SampleFormat::U16 => {
                build_stream_u16(&device, &stream_config, channels, Arc::clone(&ring))?
            }
            other => return Err(CaptureError::UnsupportedFormat(other.to_string())),
        };
        stream.play()?;

        info!(
            device = %device_name,
            sample_rate = config.sample_rate,
            channels,
            "microphone capture started"
        );

        Ok(Self {
            device_name,
            ring,
            stream: Some(stream),
        })
    }

    /// Name of the device the capture is bound to.
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Whether the stream is currently held open.
    pub fn is_running(&self) -> bool {
        self.stream.is_some()
    }

    /// Release the input stream. Safe to call repeatedly; a stopped capture
    /// keeps reporting its last write position so readers degrade cleanly.
    pub fn stop(&mut self) {
        if self.stream.take().is_some() {
            debug!(device = %self.device_name, "microphone capture stopped");
        }
    }
}

impl Drop for MicCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

impl CaptureSource for MicCapture {
    fn write_position(&self) -> u64 {
        match self.ring.lock() {
            Ok(guard) => guard.position(),
            Err(_) => 0,
        }
    }

    fn read_latest(&self, out: &mut [f32]) -> usize {
        match self.ring.lock() {
            Ok(guard) => guard.read_latest(out),
            Err(_) => 0,
        }
    }
}

/// Pick the first input device whose name contains the filter substring
/// (case-insensitive), falling back to the host default when the filter is
/// empty.
fn select_device(host: &cpal::Host, filter: &str) -> Result<cpal::Device, CaptureError> {
    if !filter.is_empty() {
        let needle = filter.to_lowercase();
        for device in host.input_devices()? {
            if let Ok(name) = device.name() {
                if name.to_lowercase().contains(&needle) {
                    return Ok(device);
                }
            }
        }
        warn!(filter = %filter, "no input device matched filter, falling back to default");
    }

    host.default_input_device()
        .or_else(|| host.input_devices().ok().and_then(|mut d| d.next()))
        .ok_or_else(|| CaptureError::DeviceUnavailable {
            filter: filter.to_string(),
        })
}

/// Downmix an interleaved buffer to mono by averaging each frame's channels.
#[inline]
fn downmix_into(mono: &mut Vec<f32>, data: &[f32], channels: usize) {
    mono.clear();
    if channels <= 1 {
        mono.extend_from_slice(data);
        return;
    }
    for frame in data.chunks_exact(channels) {
        let sum: f32 = frame.iter().sum();
        mono.push(sum / channels as f32);
    }
}

fn build_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    ring: Arc<Mutex<SampleRing>>,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    let mut mono: Vec<f32> = Vec::new();
    device.build_input_stream(
        config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            downmix_into(&mut mono, data, channels);
            if let Ok(mut guard) = ring.lock() {
                guard.write(&mono);
            }
        },
        stream_error_logger(),
        None,
    )
}

fn build_stream_i16(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    ring: Arc<Mutex<SampleRing>>,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    let mut scratch: Vec<f32> = Vec::new();
    let mut mono: Vec<f32> = Vec::new();
    device.build_input_stream(
        config,
        move |data: &[i16], _: &cpal::InputCallbackInfo| {
            scratch.clear();
            scratch.extend(data.iter().map(|&s| s as f32 / i16::MAX as f32));
            downmix_into(&mut mono, &scratch, channels);
            if let Ok(mut guard) = ring.lock() {
                guard.write(&mono);
            }
        },
        stream_error_logger(),
        None,
    )
}

fn build_stream_u16(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    ring: Arc<Mutex<SampleRing>>,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    let mut scratch: Vec<f32> = Vec::new();
    let mut mono: Vec<f32> = Vec::new();
    device.build_input_stream(
        config,
        move |data: &[u16], _: &cpal::InputCallbackInfo| {
            scratch.clear();
            scratch.extend(
                data.iter()
                    .map(|&s| (s as f32 / u16::MAX as f32) * 2.0 - 1.0),
            );
            downmix_into(&mut mono, &scratch, channels);
            if let Ok(mut guard) = ring.lock() {
                guard.write(&mono);
            }
        },
        stream_error_logger(),
        None,
    )
}

fn stream_error_logger() -> impl FnMut(cpal::StreamError) {
    |err| warn!(error = %err, "capture stream error")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_config_defaults() {
        let config = CaptureConfig::default();
        assert!(config.device_filter.is_empty());
        assert_eq!(config.sample_rate, 22_050);
        assert!((config.loop_seconds - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        let config = CaptureConfig {
            sample_rate: 0,
            ..Default::default()
        };
        match MicCapture::open(&config).err() {
            Some(CaptureError::Config(ConfigError::ZeroSampleRate)) => {}
            other => panic!("expected ZeroSampleRate rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_downmix_stereo_averages_channels() {
        let mut mono = Vec::new();
        downmix_into(&mut mono, &[1.0, 0.0, 0.5, 0.5, -1.0, 1.0], 2);
        assert_eq!(mono, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_downmix_mono_passthrough() {
        let mut mono = Vec::new();
        downmix_into(&mut mono, &[0.1, 0.2, 0.3], 1);
        assert_eq!(mono, vec![0.1, 0.2, 0.3]);
    }
}
