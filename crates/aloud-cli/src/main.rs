use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use aloud_core::config::Config;
use aloud_tts::{protocol, OutputFormat, SpeechRequest, Synthesizer};

#[derive(Parser)]
#[command(
    name = "aloud",
    about = "Streaming read-aloud synthesis gateway with subtitle tracks",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Port to listen on (default: 8787)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Synthesize one text to an audio file
    Say {
        /// Text to synthesize
        text: String,

        /// Voice short-name (e.g. en-US-AriaNeural)
        #[arg(long)]
        voice: Option<String>,

        /// Output format identifier
        #[arg(long)]
        format: Option<String>,

        /// Prosody rate delta (e.g. "-10%")
        #[arg(long)]
        rate: Option<String>,

        /// Prosody volume delta
        #[arg(long)]
        volume: Option<String>,

        /// Output audio file (default: aloud.mp3)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write word/sentence WEBVTT files next to the audio
        #[arg(long)]
        subtitles: bool,
    },

    /// List available voices
    Voices {
        /// Filter by locale prefix (e.g. "en", "zh-CN")
        #[arg(long)]
        locale: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Validate the configuration file
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    // Load config
    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(Config::config_path);

    let config = Config::load(&config_path)?;

    match cli.command {
        Commands::Serve { port } => {
            let port = port.unwrap_or_else(|| config.gateway_port());
            tracing::info!("Starting aloud gateway on port {port}");

            let state = Arc::new(aloud_gateway::GatewayState::new(Arc::new(config)));
            aloud_gateway::start_gateway(state, port).await?;
        }

        Commands::Say {
            text,
            voice,
            format,
            rate,
            volume,
            output,
            subtitles,
        } => {
            let synth = Synthesizer::from_config(config.tts.as_ref());

            let mut request =
                SpeechRequest::new(text, voice.unwrap_or_else(|| config.default_voice()));
            if let Some(format) = format {
                request = request.format(format.parse::<OutputFormat>()?);
            }
            if let Some(rate) = rate {
                request = request.rate(rate);
            }
            if let Some(volume) = volume {
                request = request.volume(volume);
            }

            let result = synth.synthesize(&request).await?;
            let out = output.unwrap_or_else(|| PathBuf::from("aloud.mp3"));
            tokio::fs::write(&out, result.audio_bytes()).await?;
            tracing::info!(path = %out.display(), chunks = result.audio.len(), "Audio written");

            if subtitles {
                let words = out.with_extension("words.vtt");
                let sentences = out.with_extension("sentences.vtt");
                tokio::fs::write(&words, &result.word_subtitle).await?;
                tokio::fs::write(&sentences, &result.sentence_subtitle).await?;
                tracing::info!(
                    words = %words.display(),
                    sentences = %sentences.display(),
                    "Subtitle tracks written"
                );
            }
        }

        Commands::Voices { locale } => {
            let endpoint = config
                .tts
                .as_ref()
                .and_then(|t| t.voices_endpoint.clone())
                .unwrap_or_else(protocol::voices_endpoint);

            let mut voices = aloud_tts::list_voices(&endpoint).await?;
            if let Some(prefix) = locale {
                voices.retain(|v| v.locale.starts_with(&prefix));
            }

            for voice in &voices {
                println!("{:<40} {:<8} {}", voice.short_name, voice.gender, voice.locale);
            }
            tracing::info!(count = voices.len(), "Voices listed");
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let json = serde_json::to_string_pretty(&config)?;
                println!("{json}");
            }
            ConfigAction::Check => {
                let (warnings, errors) = config.validate();
                for warning in &warnings {
                    println!("warning: {warning}");
                }
                for error in &errors {
                    println!("error: {error}");
                }
                if errors.is_empty() {
                    println!("Config OK ({})", config_path.display());
                } else {
                    std::process::exit(1);
                }
            }
        },
    }

    Ok(())
}
