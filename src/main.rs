// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{error, info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::PathBuf;
use std::io::Write;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand, Args};
use clap_complete::{generate, Shell};

use substyle::app_config::{self, Config};
use substyle::app_controller::{Controller, RunOutcome, Workflow};
use substyle::presets::Preset;
use substyle::tracks::TrackQuery;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for Preset to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliPreset {
    Gandhi,
    GandhiUw,
    Noto,
    Jpn,
    Kor,
    Sc,
    Tc,
    Thai,
    Arab,
}

impl From<CliPreset> for Preset {
    fn from(cli_preset: CliPreset) -> Self {
        match cli_preset {
            CliPreset::Gandhi => Preset::Gandhi,
            CliPreset::GandhiUw => Preset::GandhiUw,
            CliPreset::Noto => Preset::Noto,
            CliPreset::Jpn => Preset::Jpn,
            CliPreset::Kor => Preset::Kor,
            CliPreset::Sc => Preset::Sc,
            CliPreset::Tc => Preset::Tc,
            CliPreset::Thai => Preset::Thai,
            CliPreset::Arab => Preset::Arab,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Restyle a Crunchyroll release
    Cr(CrArgs),

    /// Restyle a BD DX era release
    #[command(name = "bd-dx")]
    BdDx(InputArgs),

    /// List the subtitle tracks of a video file
    Tracks {
        /// Video file to inspect
        #[arg(value_name = "VIDEO")]
        video: PathBuf,
    },

    /// Generate shell completions for substyle
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// ASS file, video file or directory to process
    #[arg(value_name = "INPUT")]
    input_path: PathBuf,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Write output here instead of next to the input
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Style preset to apply
    #[arg(short, long, value_enum)]
    preset: Option<CliPreset>,

    /// Title of the subtitle track to take from video files
    #[arg(long)]
    track_name: Option<String>,

    /// Language of the subtitle track to take from video files (en, eng, English, en-US)
    #[arg(long)]
    track_lang: Option<String>,

    /// Take the forced subtitle track
    #[arg(long)]
    forced: bool,

    /// Keep the container delay of extracted tracks
    #[arg(long)]
    preserve_delay: bool,
}

#[derive(Args, Debug)]
struct CrArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Keep credit lines
    #[arg(long)]
    keep_credits: bool,

    /// Keep macrons in romanized text
    #[arg(long)]
    keep_macrons: bool,

    /// Render glyphs most fonts lack in a font that has them
    #[arg(long)]
    fix_glyphs: bool,
}

/// substyle - restyle and clean ASS subtitles
#[derive(Parser, Debug)]
#[command(name = "substyle")]
#[command(version)]
#[command(about = "Restyle and clean ASS subtitles")]
#[command(long_about = "substyle normalizes the styles of Crunchyroll and BD DX subtitle releases,
strips junk characters and credits, and applies a consistent style preset.

EXAMPLES:
    substyle cr episode.ass                      # Restyle a Crunchyroll subtitle
    substyle cr --track-lang en episode.mkv      # Take the English track of a video
    substyle cr --preset noto --fix-glyphs dir/  # Process a whole directory
    substyle bd-dx -f episode.ass                # Restyle a BD DX subtitle, overwriting output
    substyle tracks episode.mkv                  # List subtitle tracks
    substyle completions bash > substyle.bash    # Generate bash completions

CONFIGURATION:
    Configuration is stored in substyle.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "substyle.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and marker for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "✖"),
            Level::Warn => ("\x1B[1;33m", "!"),
            Level::Info => ("\x1B[1;32m", " "),
            Level::Debug => ("\x1B[1;36m", "?"),
            Level::Trace => ("\x1B[1;35m", "·"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, marker) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {} {}\x1B[0m",
                color, now, marker, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Everything is let through here; the real level is set once the
    // config is loaded
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "substyle", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = Config::load_or_create(&cli.config_path)
        .with_context(|| format!("Failed to load config from {}", cli.config_path))?;
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    let result = match cli.command {
        Commands::Cr(args) => {
            config.restyle.apply_flags(args.keep_credits, args.keep_macrons, args.fix_glyphs);
            run_workflow(config, args.input, Workflow::Cr).await
        }
        Commands::BdDx(args) => run_workflow(config, args, Workflow::BdDx).await,
        Commands::Tracks { video } => list_tracks(config, video).await,
        Commands::Completions { .. } => Ok(()),
    };

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}

async fn run_workflow(mut config: Config, args: InputArgs, workflow: Workflow) -> Result<()> {
    if let Some(preset) = args.preset {
        config.restyle.preset = preset.into();
    }

    let query = TrackQuery {
        name: args.track_name,
        lang: args.track_lang,
        is_forced: args.forced,
        is_default: None,
    };
    let controller = Controller::with_config(config)?
        .with_track_query(query)
        .with_preserve_delay(args.preserve_delay);

    if args.input_path.is_dir() {
        let summary = controller
            .run_folder(args.input_path, args.output_dir, workflow, args.force_overwrite)
            .await?;
        if summary.failed > 0 {
            return Err(anyhow!("{} file(s) failed", summary.failed));
        }
        return Ok(());
    }

    let output_dir = match args.output_dir {
        Some(dir) => dir,
        None => args.input_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    match controller.run(args.input_path, output_dir, workflow, args.force_overwrite).await? {
        RunOutcome::Written(path) => info!("Done: {}", path.display()),
        RunOutcome::Skipped(path) => info!("Left existing file alone: {}", path.display()),
    }
    Ok(())
}

async fn list_tracks(config: Config, video: PathBuf) -> Result<()> {
    let controller = Controller::with_config(config)?;
    let tracks = controller.list_tracks(&video).await?;
    if tracks.is_empty() {
        info!("No subtitle tracks in {}", video.display());
    }
    for track in tracks {
        println!("{}", track);
    }
    Ok(())
}
