use anyhow::{Context, Result};
use clap::Parser;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::io::AsyncBufReadExt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;
use voicedrone_command::{LogSink, PresentationSink};
use voicedrone_core::{HandPosition, SharedCell, SpeechInput, SurfaceSize};
use voicedrone_session::Session;

#[derive(Parser)]
#[command(name = "voicedrone", about = "Place markers at your hand by voice command")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Log effects instead of drawing them; utterances are read from stdin
    #[arg(long)]
    headless: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = voicedrone_core::AppConfig::load_from_file(&cli.config)
        .with_context(|| format!("failed to load config from {:?}", cli.config))?;
    let headless = cli.headless || config.presentation.headless;

    // The TUI owns the terminal, so logs go to its pane instead of stderr
    let log_buffer = Arc::new(Mutex::new(VecDeque::<String>::new()));
    let tui_log_layer =
        (!headless).then(|| voicedrone_tui::TuiLogLayer::new(Arc::clone(&log_buffer), 1000));
    let fmt_layer = headless.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(false)
    });

    let env_filter = EnvFilter::try_new(&config.general.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .with(tui_log_layer);

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    tracing::info!(headless, "voicedrone starting");

    let hand = SharedCell::new(HandPosition::default());
    let surface = SharedCell::new(if headless {
        SurfaceSize {
            width: config.presentation.width,
            height: config.presentation.height,
        }
    } else {
        SurfaceSize::default()
    });

    let (sink, effects) = if headless {
        let sink: Arc<dyn PresentationSink> = Arc::new(LogSink);
        (sink, None)
    } else {
        let (sink, effects) = voicedrone_tui::ChannelSink::new();
        let sink: Arc<dyn PresentationSink> = Arc::new(sink);
        (sink, Some(effects))
    };

    let sensors = voicedrone_sensor::SensorRegistry::new();
    let recognizers = voicedrone_speech::RecognizerRegistry::new();
    for info in recognizers.installed_recognizers() {
        tracing::debug!(
            id = %info.id,
            culture = %info.culture,
            sensor_optimized = info.is_sensor_optimized(),
            "installed recognizer"
        );
    }

    let mut session = Session::new();
    session
        .start(&config, &sensors, &recognizers, sink, hand.clone(), surface.clone())
        .await
        .context("failed to start session")?;
    let speech_input = session
        .speech_input()
        .context("speech recognition did not start")?;

    let microphone = if session.wants_microphone(&config.audio) {
        let devices = voicedrone_audio::DeviceManager::new();
        match voicedrone_audio::Microphone::open(&devices, &config.audio, speech_input.clone()) {
            Ok(mic) => Some(mic),
            Err(e) => {
                session.teardown().await;
                return Err(e).with_context(|| {
                    format!("failed to open microphone '{}'", config.audio.device_name)
                });
            }
        }
    } else {
        tracing::info!("microphone not in use; type utterances instead");
        None
    };

    let ui_result = match effects {
        Some(effects) => {
            tracing::info!("TUI active; type a command and press Enter, Esc to quit");
            voicedrone_tui::run(voicedrone_tui::TuiContext {
                effects,
                speech_input: Some(speech_input),
                hand,
                surface,
                log_buffer,
            })
            .await
            .context("TUI error")
        }
        None => {
            tokio::spawn(read_utterances(speech_input));
            tokio::select! {
                _ = tokio::signal::ctrl_c() => tracing::info!("interrupted"),
                exit = session.wait() => tracing::info!(?exit, "session ended"),
            }
            Ok(())
        }
    };

    tracing::info!("shutting down");
    session.teardown().await;
    if let Some(mic) = microphone {
        mic.close();
    }

    ui_result
}

/// Feed stdin lines to the recognizer as typed utterances.
async fn read_utterances(speech_input: tokio::sync::mpsc::UnboundedSender<SpeechInput>) {
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => {
                if speech_input.send(SpeechInput::Transcript(line)).is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("failed to read stdin: {e}");
                break;
            }
        }
    }
}
