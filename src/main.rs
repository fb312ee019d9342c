use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use voice_assist::voice::{
    AudioCapture, AudioPlayback, Microphone, PLAYBACK_SAMPLE_RATE, SpeechToText, TextToSpeech,
    calculate_energy,
};
use voice_assist::{
    Assistant, BrowserSearch, Command, Config, ConsoleOutput, Output, SpokenOutput, classify,
};

/// Assist - a voice-command assistant
#[derive(Parser)]
#[command(name = "assist", version, about)]
struct Cli {
    /// Path to a config file (defaults to ~/.config/voice-assist/config.toml)
    #[arg(short, long, env = "ASSIST_CONFIG")]
    config: Option<PathBuf>,

    /// Seconds to wait for speech before giving up on a listen
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Print responses without speaking them
    #[arg(long)]
    mute: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Listen for voice commands until told to exit (default)
    Listen,
    /// Show how a typed command would be understood
    Classify {
        /// Command text
        text: String,
    },
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
    /// Test TTS output
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn,voice_assist=info",
        1 => "info,voice_assist=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load_from(cli.config.as_deref())?;
    if let Some(secs) = cli.timeout {
        config.listen.timeout = Duration::from_secs(secs);
    }
    if cli.mute {
        config.tts.provider = None;
    }
    tracing::debug!(?config, "loaded configuration");

    match cli.command.unwrap_or(Cmd::Listen) {
        Cmd::Listen => listen(&config).await,
        Cmd::Classify { text } => {
            classify_text(&text);
            Ok(())
        }
        Cmd::TestMic { duration } => test_mic(duration).await,
        Cmd::TestSpeaker => test_speaker().await,
        Cmd::TestTts { text } => test_tts(&config, &text).await,
    }
}

/// Run the assistant with the microphone
#[allow(clippy::future_not_send)]
async fn listen(config: &Config) -> anyhow::Result<()> {
    match TextToSpeech::from_config(&config.tts, &config.api_keys)? {
        Some(tts) => {
            let output = SpokenOutput::new(tts, AudioPlayback::new()?);
            run_assistant(config, output).await
        }
        None => run_assistant(config, ConsoleOutput).await,
    }
}

#[allow(clippy::future_not_send)]
async fn run_assistant<O: Output>(config: &Config, output: O) -> anyhow::Result<()> {
    let microphone = Microphone::new(&config.listen)?;
    let stt = SpeechToText::from_config(&config.stt, &config.api_keys)?;
    let search = BrowserSearch::from_config(&config.search)?;

    let mut assistant = Assistant::new(microphone, stt, output, search)
        .with_listen_timeout(config.listen.timeout);

    assistant.run().await?;
    Ok(())
}

/// Print the normalized command and intent for typed text
fn classify_text(text: &str) {
    if text.trim().is_empty() {
        println!("(empty command)");
        return;
    }

    let command = Command::normalize(text);
    println!("raw:        {}", command.raw);
    println!("normalized: {}", command.normalized);
    println!("intent:     {:?}", classify(&command));
}

/// Test microphone input
#[allow(clippy::future_not_send)]
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut capture = AudioCapture::new()?;
    capture.start()?;

    println!("Sample rate: {} Hz", capture.sample_rate());
    println!("---");

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = capture.take_buffer();
        let energy = calculate_energy(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "█".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!("[{:2}s] RMS: {energy:.4} | Peak: {peak:.4} | [{meter}]", i + 1);
    }

    capture.stop();

    println!("\n---");
    println!("If you saw movement in the meter, your mic is working!");
    println!("If RMS stayed near 0, check your default input device.");

    Ok(())
}

/// Test speaker output with a sine wave
#[allow(clippy::future_not_send)]
async fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let mut playback = AudioPlayback::new()?;

    let frequency = 440.0_f32;
    #[allow(clippy::cast_precision_loss)]
    let rate = PLAYBACK_SAMPLE_RATE as f32;

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..PLAYBACK_SAMPLE_RATE * 2)
        .map(|i| {
            let t = i as f32 / rate;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3
        })
        .collect();

    playback.play(samples).await?;

    println!("If you heard the tone, your speakers are working!");
    Ok(())
}

/// Test TTS output
#[allow(clippy::future_not_send)]
async fn test_tts(config: &Config, text: &str) -> anyhow::Result<()> {
    println!("Testing TTS with text: \"{text}\"\n");

    let tts = TextToSpeech::from_config(&config.tts, &config.api_keys)?
        .ok_or_else(|| anyhow::anyhow!("TTS is disabled; set tts.provider"))?;

    let mp3 = tts.synthesize(text).await?;
    println!("Got {} bytes of audio data", mp3.len());

    let mut playback = AudioPlayback::new()?;
    playback.play_mp3(&mp3).await?;

    println!("If you heard the speech, TTS is working!");
    Ok(())
}
