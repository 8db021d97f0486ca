use anyhow::{Result, Context, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, warn, info, debug};
use std::path::{Path, PathBuf};
use crate::app_config::Config;
use crate::document::AssDocument;
use crate::file_utils::{FileManager, FileType};
use crate::restyle::Restyler;
use crate::style::Style;
use crate::tracks::{self, SubtitleTrack, TrackQuery};

// @module: Application controller for restyling files and folders

/// Which restyle workflow to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workflow {
    /// Crunchyroll release
    Cr,
    /// BD DX era release
    BdDx,
}

/// What happened to one input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Restyled and written to this path
    Written(PathBuf),
    /// Output already existed and overwriting was not forced
    Skipped(PathBuf),
}

/// Counts for a folder run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    restyler: Restyler,
    // @field: Track to take from video inputs
    track_query: TrackQuery,
    preserve_delay: bool,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        debug!("Using style preset {}", config.restyle.preset.display_name());

        Ok(Self {
            restyler: Restyler::new(config.clone()),
            config,
            track_query: TrackQuery::default(),
            preserve_delay: false,
        })
    }

    /// Pick video tracks with this query instead of the first unforced one
    pub fn with_track_query(mut self, query: TrackQuery) -> Self {
        self.track_query = query;
        self
    }

    /// Apply the container delay of extracted tracks
    pub fn with_preserve_delay(mut self, preserve_delay: bool) -> Self {
        self.preserve_delay = preserve_delay;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Styles the configured preset applies
    pub fn styles(&self) -> Vec<Style> {
        self.config.restyle.preset.styles()
    }

    /// Read the input as a document, pulling the subtitle track out of videos
    pub async fn load_document(&self, input_file: &Path) -> Result<AssDocument> {
        match FileManager::detect_file_type(input_file)? {
            FileType::Subtitle => {
                debug!("Reading subtitle file {:?}", input_file);
                AssDocument::from_file(input_file)
                    .with_context(|| format!("Failed to parse subtitle file {:?}", input_file))
            }
            FileType::Video => {
                info!("Extracting subtitle track ({}) from {:?}", self.track_query, input_file);
                let document = tracks::get_sub_track(input_file, &self.track_query, self.preserve_delay).await?;
                Ok(document)
            }
            FileType::Unknown => Err(anyhow!("Unsupported input file: {:?}", input_file)),
        }
    }

    /// Run the workflow over a document in place
    pub fn process_document(&self, document: &mut AssDocument, workflow: Workflow) {
        let styles = self.styles();
        match workflow {
            Workflow::Cr => self.restyler.restyle_cr(document, &styles),
            Workflow::BdDx => self.restyler.restyle_bd_dx(document, &styles),
        }
    }

    /// Restyle one file into `output_dir`
    pub async fn run(&self, input_file: PathBuf, output_dir: PathBuf, workflow: Workflow, force_overwrite: bool) -> Result<RunOutcome> {
        let start_time = std::time::Instant::now();

        if !input_file.exists() {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        FileManager::ensure_dir(&output_dir)?;

        let output_path = FileManager::generate_output_path(&input_file, &output_dir);
        if output_path.exists() && !force_overwrite {
            warn!("Skipping {:?}, output already exists (use -f to force overwrite)", input_file);
            return Ok(RunOutcome::Skipped(output_path));
        }

        let mut document = self.load_document(&input_file).await?;
        self.process_document(&mut document, workflow);
        document.write_to_file(&output_path)
            .with_context(|| format!("Failed to write {:?}", output_path))?;

        info!("Wrote {:?} in {:.2?}", output_path, start_time.elapsed());
        Ok(RunOutcome::Written(output_path))
    }

    /// Restyle every ASS and video file below `input_dir`. Output goes
    /// next to each input unless `output_dir` is given. A failing file is
    /// logged and counted, not fatal.
    pub async fn run_folder(&self, input_dir: PathBuf, output_dir: Option<PathBuf>, workflow: Workflow, force_overwrite: bool) -> Result<FolderSummary> {
        let start_time = std::time::Instant::now();

        if !input_dir.is_dir() {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let inputs = FileManager::find_inputs(&input_dir)?;
        if inputs.is_empty() {
            return Err(anyhow!("No subtitle or video files found in directory: {:?}", input_dir));
        }

        let progress = ProgressBar::new(inputs.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress.set_style(style.progress_chars("=>-"));

        let mut summary = FolderSummary::default();
        for input in &inputs {
            let file_name = input.file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            progress.set_message(file_name.clone());

            let target_dir = match (&output_dir, input.parent()) {
                (Some(dir), _) => dir.clone(),
                (None, Some(parent)) => parent.to_path_buf(),
                (None, None) => input_dir.clone(),
            };

            match self.run(input.clone(), target_dir, workflow, force_overwrite).await {
                Ok(RunOutcome::Written(_)) => summary.written += 1,
                Ok(RunOutcome::Skipped(_)) => summary.skipped += 1,
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    summary.failed += 1;
                }
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        info!("Processed {} files in {:.2?}: {} written, {} skipped, {} failed",
            inputs.len(), start_time.elapsed(), summary.written, summary.skipped, summary.failed);
        Ok(summary)
    }

    /// Subtitle tracks of a video
    pub async fn list_tracks(&self, video_file: &Path) -> Result<Vec<SubtitleTrack>> {
        let tracks = tracks::list_subtitle_tracks(video_file).await?;
        Ok(tracks)
    }
}
