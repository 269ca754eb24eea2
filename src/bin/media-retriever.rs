use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Map, Value, json};
use media_retriever::{
    FfmpegLogLevel, ImageBuffer, MediaSession, ScalingAlgorithm, SeekPolicy, SessionOptions,
};

const CLI_AFTER_HELP: &str = "Examples:\n  media-retriever metadata input.mp4 --json\n  media-retriever metadata input.mp4 --key video_codec\n  media-retriever frame input.mp4 --at 0:00:05 --policy previous-sync --out thumb.png\n  media-retriever cover album.mp3 --out cover\n  media-retriever completions zsh > _media-retriever";

#[derive(Debug, Parser)]
#[command(
    name = "media-retriever",
    version,
    about = "Read metadata, still frames, and cover art from media files",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a spinner while a frame is being located.
    #[arg(long, global = true)]
    progress: bool,

    /// Allow overwriting existing output files.
    #[arg(long, global = true)]
    overwrite: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<FfmpegLogLevel>,

    /// Pixel interpolation for re-encoded frames (fast-bilinear, bilinear, bicubic, lanczos, point).
    #[arg(long, global = true)]
    scaling: Option<ScalingAlgorithm>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the metadata dictionary.
    #[command(
        about = "Print media metadata",
        visible_alias = "probe",
        after_help = "Examples:\n  media-retriever metadata input.mp4\n  media-retriever metadata input.mp4 --key duration"
    )]
    Metadata {
        /// Input media path.
        input: PathBuf,
        /// Print only this key.
        #[arg(long)]
        key: Option<String>,
        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Write one still frame to a file.
    #[command(
        about = "Extract a still frame",
        after_help = "Examples:\n  media-retriever frame input.mp4 --out first.png\n  media-retriever frame input.mp4 --at 12.5 --policy closest --out exact.png"
    )]
    Frame {
        /// Input media path.
        input: PathBuf,
        /// Output file. The extension is replaced to match the image format.
        #[arg(long)]
        out: PathBuf,
        /// Timestamp (seconds, MM:SS, or HH:MM:SS). Omit for the first frame.
        #[arg(long)]
        at: Option<String>,
        /// Seek policy (closest, closest-sync, next-sync, previous-sync).
        #[arg(long, default_value = "closest-sync")]
        policy: SeekPolicy,
    },

    /// Write the embedded cover picture to a file.
    #[command(about = "Extract embedded cover art")]
    Cover {
        /// Input media path.
        input: PathBuf,
        /// Output file. The extension is replaced to match the image format.
        #[arg(long)]
        out: PathBuf,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_timecode(value: &str) -> Result<Duration, Box<dyn std::error::Error>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("time value cannot be empty".into());
    }

    if let Ok(seconds) = trimmed.parse::<f64>() {
        return Ok(Duration::try_from_secs_f64(seconds.max(0.0))?);
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(format!("invalid time format: {trimmed}").into());
    }

    let (hours, minutes, seconds_str) = if parts.len() == 3 {
        (parts[0].parse::<u64>()?, parts[1].parse::<u64>()?, parts[2])
    } else {
        (0_u64, parts[0].parse::<u64>()?, parts[1])
    };

    let seconds = seconds_str.parse::<f64>()?;
    let total_seconds = (hours as f64 * 3600.0) + (minutes as f64 * 60.0) + seconds;
    Ok(Duration::try_from_secs_f64(total_seconds.max(0.0))?)
}

fn session_options(global: &GlobalOptions) -> SessionOptions {
    let mut options = SessionOptions::new();
    if let Some(level) = global.log_level {
        options = options.with_ffmpeg_log_level(level);
    }
    if let Some(scaling) = global.scaling {
        options = options.with_scaling_algorithm(scaling);
    }
    options
}

fn output_path_for(out: &Path, image: &ImageBuffer) -> PathBuf {
    out.with_extension(image.format().extension())
}

fn write_image(
    image: &ImageBuffer,
    out: &Path,
    overwrite: bool,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = output_path_for(out, image);
    if path.exists() {
        if overwrite {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                format!("overwriting {}", path.display()).yellow()
            );
        } else {
            return Err(format!(
                "output already exists: {} (use --overwrite to replace)",
                path.display()
            )
            .into());
        }
    }
    image.save(&path)?;
    Ok(path)
}

fn spinner(enabled: bool, message: String) -> Result<Option<ProgressBar>, Box<dyn std::error::Error>> {
    if !enabled {
        return Ok(None);
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    Ok(Some(bar))
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let options = session_options(&cli.global);

    match cli.command {
        Commands::Metadata { input, key, json } => {
            let session = MediaSession::open_with_options(&input, &options)?;
            let dictionary = session.metadata_dictionary();

            if let Some(key) = key {
                let value = dictionary
                    .get(&key)
                    .ok_or_else(|| format!("no metadata entry named {key}"))?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&json!({ key: value }))?);
                } else {
                    println!("{value}");
                }
                return Ok(());
            }

            let mut entries: Vec<(&str, &str)> = dictionary.iter().collect();
            entries.sort_unstable();

            if json {
                let map: Map<String, Value> = entries
                    .iter()
                    .map(|(key, value)| (key.to_string(), Value::from(*value)))
                    .collect();
                let streams: Vec<Value> = session
                    .streams()
                    .iter()
                    .map(|stream| {
                        json!({
                            "index": stream.index,
                            "kind": format!("{:?}", stream.kind).to_lowercase(),
                            "codec": stream.codec_name,
                            "attached_picture": stream.attached_picture,
                        })
                    })
                    .collect();
                let payload = json!({ "metadata": map, "streams": streams });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                for (key, value) in entries {
                    println!("{}: {}", key.cyan().bold(), value);
                }
                if cli.global.verbose {
                    for stream in session.streams() {
                        eprintln!(
                            "stream {}: {:?} {}{}",
                            stream.index,
                            stream.kind,
                            stream.codec_name,
                            if stream.attached_picture { " (attached picture)" } else { "" }
                        );
                    }
                }
            }
        }
        Commands::Frame {
            input,
            out,
            at,
            policy,
        } => {
            let timestamp = at.as_deref().map(parse_timecode).transpose()?;
            let mut session = MediaSession::open_with_options(&input, &options)?;

            let label = match timestamp {
                Some(time) => format!("locating frame at {:.3}s ({policy})", time.as_secs_f64()),
                None => "locating first frame".to_string(),
            };
            let progress = spinner(cli.global.progress, label)?;

            let image = match timestamp {
                Some(time) => session.frame_at(time, policy),
                None => session.next_frame(),
            };

            if let Some(bar) = progress {
                bar.finish_and_clear();
            }

            let image = image.ok_or("no frame could be retrieved")?;
            let path = write_image(&image, &out, cli.global.overwrite)?;
            if cli.global.verbose {
                eprintln!("{} bytes, {}", image.len(), image.format().mime_type());
            }
            println!("{} {}", "saved".green().bold(), path.display());
        }
        Commands::Cover { input, out } => {
            let mut session = MediaSession::open_with_options(&input, &options)?;
            let image = session
                .embedded_picture()
                .ok_or("no embedded picture found")?;
            let path = write_image(&image, &out, cli.global.overwrite)?;
            println!("{} {}", "saved".green().bold(), path.display());
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(
                shell,
                &mut command,
                "media-retriever",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
