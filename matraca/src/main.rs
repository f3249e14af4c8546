//! matraca - convert long texts into a single narrated MP3 using a remote
//! speech service.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use matraca::config::MatracaConfig;
use matraca::pipeline::{JobEvent, JobRequest, Narrator};
use matraca::tts::{AudioSettings, EdgeSpeechClient};
use matraca::voices;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;

#[derive(Parser, Debug)]
#[command(name = "matraca")]
#[command(about = "Convert long texts into a single narrated MP3 using a remote speech service", long_about = None)]
#[command(version)]
struct Args {
    /// Text file to narrate (reads stdin when omitted)
    input: Option<PathBuf>,

    /// Output MP3 path (default: <input-name>.mp3)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Voice: a catalog label (see 'matraca voices') or a raw service voice id
    #[arg(long)]
    voice: Option<String>,

    /// Speaking rate multiplier (0.25-4.0)
    #[arg(long)]
    rate: Option<f32>,

    /// Volume percentage (20-200)
    #[arg(long)]
    volume: Option<f32>,

    /// Pitch shift in Hz (-20 to +20)
    #[arg(long)]
    pitch: Option<f32>,

    /// Narrate only the opening of the text and print the artifact path
    #[arg(long, default_value_t = false)]
    preview: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the built-in voice catalog
    Voices {
        /// Only list voices for this locale (e.g. pt-BR)
        locale: Option<String>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set the default voice (catalog label or service voice id)
    SetVoice {
        /// Voice to use
        voice: String,
    },
    /// Set the default speaking rate multiplier
    SetRate {
        /// Value (0.25-4.0)
        value: f32,
    },
    /// Set the default volume percentage
    SetVolume {
        /// Value (20-200)
        value: f32,
    },
    /// Set the default pitch shift
    SetPitch {
        /// Value in Hz (-20 to +20)
        value: f32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match &args.command {
        Some(Commands::Voices { locale }) => return print_voices(locale.as_deref()),
        Some(Commands::Config { action }) => return handle_config_command(action),
        None => {}
    }

    let config = MatracaConfig::load().context("Failed to load configuration")?;

    let text = read_input(args.input.as_deref())?;

    let voice = args.voice.clone().or_else(|| config.voice.clone()).ok_or_else(|| {
        anyhow::anyhow!(
            "No voice selected. Pass --voice or set one with 'matraca config set-voice'.\n\
             Run 'matraca voices' to list the catalog."
        )
    })?;
    // Catalog labels resolve to service ids; anything else is passed through
    // as an opaque service voice id.
    let voice_id = voices::resolve(&voice)
        .map(str::to_string)
        .unwrap_or(voice);

    let settings = AudioSettings::new(
        args.rate.unwrap_or(config.rate),
        args.volume.unwrap_or(config.volume),
        args.pitch.unwrap_or(config.pitch),
    );

    let client = Arc::new(EdgeSpeechClient::new(
        config.endpoint.clone(),
        config.api_key.clone(),
    ));
    let narrator = Narrator::with_limits(
        client,
        matraca::config::MAX_INPUT_CHARS,
        config.chunk_chars,
    );

    if args.preview {
        let rx = narrator.preview(&text, &voice_id, &settings)?;
        let path = consume_events(rx).await?;
        eprintln!("Preview written to: {}", path.display());
        return Ok(());
    }

    let destination = resolve_output(&args)?;
    let rx = narrator.submit(JobRequest {
        text,
        voice_id,
        settings,
        destination,
    })?;
    let path = consume_events(rx).await?;

    let size_mb = std::fs::metadata(&path)?.len() as f64 / (1024.0 * 1024.0);
    eprintln!("Output: {} ({:.1} MB)", path.display(), size_mb);

    Ok(())
}

/// Read the text to narrate from a file or stdin.
fn read_input(input: Option<&std::path::Path>) -> Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

/// Pick the destination path from the arguments.
fn resolve_output(args: &Args) -> Result<PathBuf> {
    if let Some(output) = &args.output {
        return Ok(output.clone());
    }
    let input = args.input.as_ref().ok_or_else(|| {
        anyhow::anyhow!("Reading from stdin requires an explicit output path (-o)")
    })?;
    let stem = input.file_stem().unwrap_or_default();
    Ok(input.with_file_name(format!("{}.mp3", stem.to_string_lossy())))
}

/// Drain the job's event stream into a progress bar; return the final path.
async fn consume_events(mut rx: Receiver<JobEvent>) -> Result<PathBuf> {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {percent}% {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut outcome: Option<Result<PathBuf>> = None;
    while let Some(event) = rx.recv().await {
        match event {
            JobEvent::Status(message) => pb.set_message(message),
            JobEvent::Progress(fraction) => {
                pb.set_position((fraction * 100.0).round() as u64);
            }
            JobEvent::Done(path) => outcome = Some(Ok(path)),
            JobEvent::Error(message) => outcome = Some(Err(anyhow::anyhow!(message))),
        }
    }
    pb.finish_and_clear();

    outcome.unwrap_or_else(|| Err(anyhow::anyhow!("Job ended without reporting a result")))
}

fn print_voices(locale: Option<&str>) -> Result<()> {
    let listing: Vec<&voices::LocaleVoices> = match locale {
        Some(tag) => {
            let entry = voices::find_locale(tag)
                .ok_or_else(|| anyhow::anyhow!("Unknown locale: {tag}"))?;
            vec![entry]
        }
        None => voices::CATALOG.iter().collect(),
    };
    for locale in listing {
        println!("{} [{}]", locale.language, locale.locale);
        for (label, id) in locale.voices {
            println!("  {label:<38} {id}");
        }
        println!();
    }
    Ok(())
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = MatracaConfig::load()?;
            println!("Configuration file: {:?}", MatracaConfig::config_path()?);
            println!();
            println!("endpoint = \"{}\"", config.endpoint);
            if let Some(voice) = &config.voice {
                println!("voice = \"{}\"", voice);
            } else {
                println!("voice = (none)");
            }
            println!("rate = {}", config.rate);
            println!("volume = {}", config.volume);
            println!("pitch = {}", config.pitch);
            println!("chunk_chars = {}", config.chunk_chars);
        }
        ConfigAction::SetVoice { voice } => {
            let mut config = MatracaConfig::load()?;
            config.voice = Some(voice.clone());
            config.save()?;
            println!("Default voice set to: {}", voice);
        }
        ConfigAction::SetRate { value } => {
            let mut config = MatracaConfig::load()?;
            config.rate = value.clamp(0.25, 4.0);
            config.save()?;
            println!("Default rate set to: {}", config.rate);
        }
        ConfigAction::SetVolume { value } => {
            let mut config = MatracaConfig::load()?;
            config.volume = value.clamp(20.0, 200.0);
            config.save()?;
            println!("Default volume set to: {}", config.volume);
        }
        ConfigAction::SetPitch { value } => {
            let mut config = MatracaConfig::load()?;
            config.pitch = value.clamp(-20.0, 20.0);
            config.save()?;
            println!("Default pitch set to: {}", config.pitch);
        }
    }
    Ok(())
}
