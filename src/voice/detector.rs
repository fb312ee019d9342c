//! Energy-based speech endpointing
//!
//! Decides when an utterance has started and ended from RMS energy alone.
//! The threshold is raised above the room's noise floor by calibrating on a
//! short stretch of ambient audio before each listen.

/// Lowest threshold calibration may settle on
const ENERGY_FLOOR: f32 = 0.01;

/// Threshold used before any calibration
const DEFAULT_THRESHOLD: f32 = 0.03;

/// Speech must be this many times louder than ambient noise
const AMBIENT_MULTIPLIER: f32 = 1.5;

/// Minimum duration of speech to count as an utterance (in samples at 16kHz)
const MIN_SPEECH_SAMPLES: usize = 4800; // 0.3 seconds

/// Silence that ends an utterance (in samples at 16kHz)
const SILENCE_SAMPLES: usize = 12800; // 0.8 seconds

/// State of the detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    /// Waiting for speech
    Idle,
    /// Speech started, accumulating
    Speaking,
    /// Speech followed by enough silence
    Complete,
}

/// Finds the start and end of a spoken utterance
pub struct SpeechDetector {
    threshold: f32,
    state: DetectorState,
    speech_buffer: Vec<f32>,
    silence_counter: usize,
}

impl Default for SpeechDetector {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl SpeechDetector {
    /// Create a detector with a fixed energy threshold
    #[must_use]
    pub const fn new(threshold: f32) -> Self {
        Self {
            threshold,
            state: DetectorState::Idle,
            speech_buffer: Vec::new(),
            silence_counter: 0,
        }
    }

    /// Set the threshold from a sample of ambient noise
    ///
    /// Returns the new threshold. An empty sample leaves it unchanged.
    pub fn calibrate(&mut self, ambient: &[f32]) -> f32 {
        if ambient.is_empty() {
            return self.threshold;
        }

        let noise = calculate_energy(ambient);
        self.threshold = (noise * AMBIENT_MULTIPLIER).max(ENERGY_FLOOR);
        tracing::debug!(noise, threshold = self.threshold, "calibrated for ambient noise");
        self.threshold
    }

    /// Feed audio samples
    ///
    /// Returns true once an utterance is complete
    pub fn process(&mut self, samples: &[f32]) -> bool {
        if samples.is_empty() {
            return self.state == DetectorState::Complete;
        }

        let energy = calculate_energy(samples);
        let is_speech = energy > self.threshold;

        match self.state {
            DetectorState::Idle => {
                if is_speech {
                    self.state = DetectorState::Speaking;
                    self.speech_buffer.clear();
                    self.speech_buffer.extend_from_slice(samples);
                    self.silence_counter = 0;
                    tracing::trace!(energy, "speech started");
                }
            }
            DetectorState::Speaking => {
                self.speech_buffer.extend_from_slice(samples);

                if is_speech {
                    self.silence_counter = 0;
                } else {
                    self.silence_counter += samples.len();
                }

                if self.silence_counter > SILENCE_SAMPLES
                    && self.speech_buffer.len() > MIN_SPEECH_SAMPLES + self.silence_counter
                {
                    tracing::debug!(samples = self.speech_buffer.len(), "utterance complete");
                    self.state = DetectorState::Complete;
                } else if self.silence_counter > SILENCE_SAMPLES {
                    // A blip too short to be speech
                    tracing::trace!("discarding short noise burst");
                    self.reset();
                }
            }
            DetectorState::Complete => {}
        }

        self.state == DetectorState::Complete
    }

    /// Whether speech has started but not yet ended
    #[must_use]
    pub fn is_speaking(&self) -> bool {
        self.state == DetectorState::Speaking
    }

    /// Get the accumulated speech buffer
    #[must_use]
    pub fn speech_buffer(&self) -> &[f32] {
        &self.speech_buffer
    }

    /// Take the speech buffer and return to idle
    pub fn take_speech_buffer(&mut self) -> Vec<f32> {
        let buffer = std::mem::take(&mut self.speech_buffer);
        self.reset();
        buffer
    }

    /// Reset to idle, keeping the calibrated threshold
    pub fn reset(&mut self) {
        self.state = DetectorState::Idle;
        self.speech_buffer.clear();
        self.silence_counter = 0;
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> DetectorState {
        self.state
    }

    /// Current energy threshold
    #[must_use]
    pub const fn threshold(&self) -> f32 {
        self.threshold
    }
}

/// Calculate RMS energy of audio samples
#[allow(clippy::cast_precision_loss)]
pub fn calculate_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}
