//! Voice pipeline integration tests
//!
//! Tests voice components without requiring audio hardware

use std::collections::VecDeque;
use std::io::Cursor;
use std::time::Duration;

use tokio::time::Instant;
use voice_assist::voice::{
    DetectorState, SAMPLE_RATE, SampleSource, SpeechDetector, record_utterance, samples_to_wav,
};

/// Samples delivered per 100ms poll
const CHUNK: usize = 1600;

/// Source that replays chunks, then repeats a filler chunk
struct ChunkSource {
    chunks: VecDeque<Vec<f32>>,
    filler: f32,
}

impl ChunkSource {
    fn new(filler: f32) -> Self {
        Self {
            chunks: VecDeque::new(),
            filler,
        }
    }

    fn then(mut self, level: f32, count: usize) -> Self {
        for _ in 0..count {
            self.chunks.push_back(vec![level; CHUNK]);
        }
        self
    }
}

impl SampleSource for ChunkSource {
    fn take_samples(&mut self) -> Vec<f32> {
        self.chunks
            .pop_front()
            .unwrap_or_else(|| vec![self.filler; CHUNK])
    }
}

/// Generate sine wave audio samples
fn generate_sine_samples(frequency: f32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

/// Generate silence
fn generate_silence(duration_secs: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    vec![0.0; num_samples]
}

/// Feed audio in 100ms chunks, as the microphone does
fn feed(detector: &mut SpeechDetector, samples: &[f32]) -> bool {
    let mut complete = false;
    for chunk in samples.chunks(1600) {
        complete = detector.process(chunk);
    }
    complete
}

#[test]
fn test_silence_never_starts_speech() {
    let mut detector = SpeechDetector::default();

    assert!(!feed(&mut detector, &generate_silence(2.0)));
    assert_eq!(detector.state(), DetectorState::Idle);
    assert!(detector.speech_buffer().is_empty());
}

#[test]
fn test_utterance_completes_after_trailing_silence() {
    let mut detector = SpeechDetector::default();

    assert!(!feed(&mut detector, &generate_sine_samples(440.0, 0.6, 0.3)));
    assert!(detector.is_speaking());

    // Pauses shorter than the end-of-utterance gap keep it open
    assert!(!feed(&mut detector, &generate_silence(0.3)));
    assert!(!feed(&mut detector, &generate_sine_samples(440.0, 0.3, 0.3)));

    assert!(feed(&mut detector, &generate_silence(1.0)));
    assert_eq!(detector.state(), DetectorState::Complete);
}

#[test]
fn test_take_speech_buffer_resets() {
    let mut detector = SpeechDetector::default();

    let speech = generate_sine_samples(440.0, 0.6, 0.3);
    feed(&mut detector, &speech);
    feed(&mut detector, &generate_silence(1.0));

    let taken = detector.take_speech_buffer();
    assert!(taken.len() >= speech.len());
    assert!(detector.speech_buffer().is_empty());
    assert_eq!(detector.state(), DetectorState::Idle);
}

#[test]
fn test_calibration_ignores_room_noise() {
    let mut detector = SpeechDetector::default();
    let hum = generate_sine_samples(60.0, 1.0, 0.05);

    detector.calibrate(&hum);

    // The same hum no longer counts as speech
    assert!(!feed(&mut detector, &hum));
    assert_eq!(detector.state(), DetectorState::Idle);

    // Louder speech still does
    feed(&mut detector, &generate_sine_samples(440.0, 0.2, 0.4));
    assert!(detector.is_speaking());
}

#[test]
fn test_samples_to_wav() {
    let samples = generate_sine_samples(440.0, 0.1, 0.5);
    let wav_data = samples_to_wav(&samples, SAMPLE_RATE).unwrap();

    assert_eq!(&wav_data[0..4], b"RIFF");
    assert_eq!(&wav_data[8..12], b"WAVE");
    assert!(wav_data.len() > 44);
}

#[test]
fn test_wav_roundtrip() {
    let original_samples: Vec<f32> = vec![0.0, 0.5, -0.5, 1.0, -1.0, 0.25];
    let wav_data = samples_to_wav(&original_samples, SAMPLE_RATE).unwrap();

    let mut reader = hound::WavReader::new(Cursor::new(wav_data)).unwrap();

    let spec = reader.spec();
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    assert_eq!(spec.channels, 1);

    let read_samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(read_samples.len(), original_samples.len());
}

#[tokio::test(start_paused = true)]
async fn test_recording_times_out_on_silence() {
    let mut source = ChunkSource::new(0.0);
    let mut detector = SpeechDetector::default();
    let started = Instant::now();

    let recorded = record_utterance(
        &mut source,
        &mut detector,
        Duration::from_secs(1),
        Duration::from_secs(15),
    )
    .await;

    assert!(recorded.is_none());
    assert!(started.elapsed() >= Duration::from_secs(1));
    assert!(started.elapsed() < Duration::from_millis(1200));
    assert_eq!(detector.state(), DetectorState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_recording_returns_utterance() {
    // 0.6s of speech, then silence
    let mut source = ChunkSource::new(0.0).then(0.2, 6);
    let mut detector = SpeechDetector::default();

    let recorded = record_utterance(
        &mut source,
        &mut detector,
        Duration::from_secs(5),
        Duration::from_secs(15),
    )
    .await
    .expect("utterance");

    // Speech plus the trailing silence that ended it
    assert_eq!(recorded.len(), 6 * CHUNK + 9 * CHUNK);
    assert!(detector.speech_buffer().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_recording_cut_at_max_length() {
    let mut source = ChunkSource::new(0.2);
    let mut detector = SpeechDetector::default();
    let started = Instant::now();

    let recorded = record_utterance(
        &mut source,
        &mut detector,
        Duration::from_secs(5),
        Duration::from_secs(2),
    )
    .await
    .expect("utterance");

    assert!(recorded.len() >= 20 * CHUNK);
    assert!(recorded.len() <= 22 * CHUNK);
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_noise_burst_does_not_end_wait() {
    // A 0.1s click, a second of quiet, then real speech
    let mut source = ChunkSource::new(0.0)
        .then(0.5, 1)
        .then(0.0, 10)
        .then(0.2, 6);
    let mut detector = SpeechDetector::default();

    let recorded = record_utterance(
        &mut source,
        &mut detector,
        Duration::from_secs(5),
        Duration::from_secs(15),
    )
    .await
    .expect("utterance");

    // The click was discarded; the utterance starts with the speech
    assert!((recorded[0] - 0.2).abs() < f32::EPSILON);
    assert_eq!(recorded.len(), 6 * CHUNK + 9 * CHUNK);
}

#[tokio::test(start_paused = true)]
async fn test_noise_burst_then_silence_still_times_out() {
    let mut source = ChunkSource::new(0.0).then(0.5, 1);
    let mut detector = SpeechDetector::default();
    let started = Instant::now();

    let recorded = record_utterance(
        &mut source,
        &mut detector,
        Duration::from_secs(2),
        Duration::from_secs(15),
    )
    .await;

    assert!(recorded.is_none());
    assert!(started.elapsed() >= Duration::from_secs(2));
    assert!(started.elapsed() < Duration::from_millis(2200));
}
