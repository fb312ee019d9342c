//! Audio capture from microphone

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, StreamConfig};
use tokio::time::Instant;

use super::SpeechDetector;
use crate::assistant::{Capture, Utterance};
use crate::config::ListenConfig;
use crate::{Error, Result};

/// Sample rate for audio capture (16kHz for speech)
pub const SAMPLE_RATE: u32 = 16000;

/// How often the capture buffer is drained while listening
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Raw sample capture from the default input device
pub struct AudioCapture {
    device: Device,
    config: StreamConfig,
    buffer: Arc<Mutex<Vec<f32>>>,
    stream: Option<Stream>,
}

impl AudioCapture {
    /// Open the default input device
    ///
    /// # Errors
    ///
    /// Returns error if no mono 16kHz input is available
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| Error::Audio("no input device available".to_string()))?;

        let supported_config = device
            .supported_input_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .find(|c| {
                c.channels() == 1
                    && c.min_sample_rate() <= SampleRate(SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(SAMPLE_RATE)
            })
            .ok_or_else(|| Error::Audio("no suitable audio config found".to_string()))?;

        let config = supported_config
            .with_sample_rate(SampleRate(SAMPLE_RATE))
            .config();

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = SAMPLE_RATE,
            "audio capture initialized"
        );

        Ok(Self {
            device,
            config,
            buffer: Arc::new(Mutex::new(Vec::new())),
            stream: None,
        })
    }

    /// Start the input stream; a no-op if already running
    ///
    /// # Errors
    ///
    /// Returns error if the stream cannot be built or started
    pub fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let buffer = Arc::clone(&self.buffer);
        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend_from_slice(data);
                    }
                },
                |err| {
                    tracing::error!(error = %err, "audio capture error");
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;
        self.stream = Some(stream);

        tracing::debug!("audio capture started");
        Ok(())
    }

    /// Stop the input stream
    pub fn stop(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!("audio capture stopped");
        }
    }

    /// Drain and return the samples captured since the last call
    #[must_use]
    pub fn take_buffer(&self) -> Vec<f32> {
        self.buffer
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default()
    }

    /// Discard any captured samples
    pub fn clear_buffer(&self) {
        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }
    }

    /// Get the sample rate
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }
}

/// Microphone that listens for one utterance at a time
///
/// The input stream only runs while [`Capture::capture`] is waiting, so the
/// assistant's own spoken responses are never recorded.
pub struct Microphone {
    audio: AudioCapture,
    detector: SpeechDetector,
    ambient_calibration: Duration,
    max_utterance: Duration,
}

impl Microphone {
    /// Open the default microphone
    ///
    /// # Errors
    ///
    /// Returns error if the input device cannot be opened
    pub fn new(config: &ListenConfig) -> Result<Self> {
        Ok(Self {
            audio: AudioCapture::new()?,
            detector: SpeechDetector::default(),
            ambient_calibration: config.ambient_calibration,
            max_utterance: config.max_utterance,
        })
    }
}

/// Drains samples for the endpointing loop
pub trait SampleSource {
    /// Samples captured since the last call
    fn take_samples(&mut self) -> Vec<f32>;
}

impl SampleSource for AudioCapture {
    fn take_samples(&mut self) -> Vec<f32> {
        self.take_buffer()
    }
}

/// Wait for one utterance from `source`
///
/// Polls every 100ms and returns `None` if no speech has started once
/// `timeout` has passed since the call. A noise burst the detector discards
/// does not end the wait. Speech running past `max_utterance` is cut off.
#[allow(clippy::future_not_send)]
pub async fn record_utterance<S: SampleSource + ?Sized>(
    source: &mut S,
    detector: &mut SpeechDetector,
    timeout: Duration,
    max_utterance: Duration,
) -> Option<Vec<f32>> {
    let started = Instant::now();
    let mut speech_began: Option<Instant> = None;

    loop {
        tokio::time::sleep(POLL_INTERVAL).await;

        let samples = source.take_samples();
        if detector.process(&samples) {
            return Some(detector.take_speech_buffer());
        }

        if detector.is_speaking() {
            let began = *speech_began.get_or_insert_with(Instant::now);
            if began.elapsed() >= max_utterance {
                tracing::debug!(limit = ?max_utterance, "utterance cut at length limit");
                return Some(detector.take_speech_buffer());
            }
        } else {
            speech_began = None;
            if started.elapsed() >= timeout {
                detector.reset();
                return None;
            }
        }
    }
}

#[async_trait(?Send)]
impl Capture for Microphone {
    async fn capture(&mut self, timeout: Duration) -> Result<Option<Utterance>> {
        self.detector.reset();
        self.audio.clear_buffer();
        self.audio.start()?;

        if !self.ambient_calibration.is_zero() {
            tokio::time::sleep(self.ambient_calibration).await;
            let ambient = self.audio.take_buffer();
            self.detector.calibrate(&ambient);
        }

        let recorded =
            record_utterance(&mut self.audio, &mut self.detector, timeout, self.max_utterance)
                .await;
        self.audio.stop();

        let Some(samples) = recorded else {
            tracing::debug!(?timeout, "no speech before timeout");
            return Ok(None);
        };

        Ok(Some(Utterance {
            samples,
            sample_rate: SAMPLE_RATE,
        }))
    }
}

/// Convert f32 samples to WAV bytes for STT APIs
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;

        for &sample in samples {
            #[allow(clippy::cast_possible_truncation)]
            let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer
                .write_sample(sample_i16)
                .map_err(|e| Error::Audio(e.to_string()))?;
        }

        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}
