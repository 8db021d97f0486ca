use anyhow::{anyhow, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use crate::errors::AppError;
use crate::presets::Preset;

/// Application configuration module
/// This module holds every table the line transforms work from (credit
/// markers, stray code points, glyph fonts, legacy alignment styles), so
/// a release can tweak them in the config file without a rebuild.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Layout headers written by both restyle workflows
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Substrings that mark a line as a credit line
    #[serde(default = "default_credits")]
    pub credits: Vec<String>,

    /// Code points to strip or replace
    #[serde(default)]
    pub unicode: UnicodeConfig,

    /// Glyphs most fonts lack, with the font to render them in
    #[serde(default = "default_glyph_fonts")]
    pub glyph_fonts: Vec<GlyphFont>,

    /// Legacy BD DX style names and their alignment tags
    #[serde(default)]
    pub legacy_alignment: LegacyAlignmentConfig,

    /// Crunchyroll style names normalized by `unfuck_cr` in the CR workflow
    #[serde(default = "CrQuirks::for_restyle_cr")]
    pub cr_quirks: CrQuirks,

    /// Options for the Crunchyroll workflow
    #[serde(default)]
    pub restyle: RestyleOptions,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Script resolution and rendering headers
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LayoutConfig {
    #[serde(default = "default_res_x")]
    pub res_x: u32,

    #[serde(default = "default_res_y")]
    pub res_y: u32,

    #[serde(default = "default_true")]
    pub scaled_border_and_shadow: bool,

    #[serde(default = "default_ycbcr_matrix")]
    pub ycbcr_matrix: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            res_x: default_res_x(),
            res_y: default_res_y(),
            scaled_border_and_shadow: true,
            ycbcr_matrix: default_ycbcr_matrix(),
        }
    }
}

/// Stray code points found in streaming releases
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UnicodeConfig {
    /// Removed outright
    #[serde(default = "default_unicode_delete")]
    pub delete: Vec<char>,

    /// Replaced with a plain equivalent, after deletion
    #[serde(default = "default_unicode_replace")]
    pub replace: Vec<(char, String)>,
}

impl Default for UnicodeConfig {
    fn default() -> Self {
        Self {
            delete: default_unicode_delete(),
            replace: default_unicode_replace(),
        }
    }
}

/// Font to use for a single glyph
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GlyphFont {
    pub glyph: char,
    pub font: String,
}

impl GlyphFont {
    pub fn new(glyph: char, font: &str) -> Self {
        Self { glyph, font: font.to_string() }
    }
}

/// Maps a legacy style to an `\anN` tag
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AlignmentRule {
    /// Style name, or a substring of it unless `exact`
    pub style: String,

    /// Numpad alignment, 1..=9
    pub alignment: u8,

    /// Require case-insensitive equality instead of containment
    #[serde(default)]
    pub exact: bool,
}

impl AlignmentRule {
    pub fn new(style: &str, alignment: u8, exact: bool) -> Self {
        Self { style: style.to_string(), alignment, exact }
    }

    pub fn tag(&self) -> String {
        format!("\\an{}", self.alignment)
    }
}

/// Tables for `unfuck_bd_dx`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LegacyAlignmentConfig {
    /// Style renamed straight to the default style, since `\an2` is implied
    #[serde(default = "default_bd_dx_style")]
    pub rename_style: String,

    /// Applied in order, after the rename
    #[serde(default = "default_alignment_rules")]
    pub rules: Vec<AlignmentRule>,

    #[serde(default = "default_style_name")]
    pub default_style: String,

    #[serde(default = "default_signs_style")]
    pub signs_style: String,

    /// Actor name marking on-screen text
    #[serde(default = "default_sign_actor")]
    pub sign_actor: String,
}

impl Default for LegacyAlignmentConfig {
    fn default() -> Self {
        Self {
            rename_style: default_bd_dx_style(),
            rules: default_alignment_rules(),
            default_style: default_style_name(),
            signs_style: default_signs_style(),
            sign_actor: default_sign_actor(),
        }
    }
}

/// Crunchyroll style names and what they normalize to
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CrQuirks {
    #[serde(default = "default_style_name")]
    pub default_style: String,

    #[serde(default = "default_alt_style")]
    pub alt_style: String,

    /// Renamed to the default style
    #[serde(default = "default_dialogue_styles")]
    pub dialogue_styles: Vec<String>,

    /// Renamed to the default style with `\an8`
    #[serde(default = "default_top_styles")]
    pub top_styles: Vec<String>,

    /// Renamed to the default style with `\i1`
    #[serde(default = "default_italics_styles")]
    pub italics_styles: Vec<String>,

    /// Renamed to the alt style
    #[serde(default = "default_alt_styles")]
    pub alt_styles: Vec<String>,
}

impl Default for CrQuirks {
    fn default() -> Self {
        Self {
            default_style: default_style_name(),
            alt_style: default_alt_style(),
            dialogue_styles: default_dialogue_styles(),
            top_styles: default_top_styles(),
            italics_styles: default_italics_styles(),
            alt_styles: default_alt_styles(),
        }
    }
}

impl CrQuirks {
    /// Style lists used by the Crunchyroll restyle workflow
    pub fn for_restyle_cr() -> Self {
        Self {
            dialogue_styles: to_strings(&["main", "default", "narrator", "narration", "bottomcenter"]),
            alt_styles: to_strings(&["alt", "overlap"]),
            ..Self::default()
        }
    }
}

/// Switches for the optional steps of the Crunchyroll workflow
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RestyleOptions {
    #[serde(default = "default_true")]
    pub remove_credits: bool,

    #[serde(default = "default_true")]
    pub purge_macrons: bool,

    #[serde(default)]
    pub replace_glyph_font: bool,

    #[serde(default)]
    pub preset: Preset,
}

impl Default for RestyleOptions {
    fn default() -> Self {
        Self {
            remove_credits: true,
            purge_macrons: true,
            replace_glyph_font: false,
            preset: Preset::default(),
        }
    }
}

impl RestyleOptions {
    /// Apply command line flags. A flag only ever moves its switch away
    /// from the default; without it the configured value stays.
    pub fn apply_flags(&mut self, keep_credits: bool, keep_macrons: bool, fix_glyphs: bool) {
        if keep_credits {
            self.remove_credits = false;
        }
        if keep_macrons {
            self.purge_macrons = false;
        }
        if fix_glyphs {
            self.replace_glyph_font = true;
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_true() -> bool {
    true
}

fn default_res_x() -> u32 {
    640
}

fn default_res_y() -> u32 {
    360
}

fn default_ycbcr_matrix() -> String {
    "TV.709".to_string()
}

fn default_credits() -> Vec<String> {
    // Keep these specific, anything loose would eat dialogue
    to_strings(&[
        "Übersetzung:",
        "Spotting:",
        "Revision:",
        "Typesetting:",
        "Qualitätskontrolle:",
        "Projektleitung:",
        "ToonsHub",
        "KawaSubs",
        "Subtitle Timing",
        "Editing & Typesetting",
    ])
}

fn default_unicode_delete() -> Vec<char> {
    vec!['\u{200E}', '\u{200B}', '\u{05B9}']
}

fn default_unicode_replace() -> Vec<(char, String)> {
    vec![
        ('\u{2011}', "-".to_string()),
        ('\u{FF01}', "!".to_string()),
    ]
}

fn default_glyph_fonts() -> Vec<GlyphFont> {
    vec![
        GlyphFont::new('♪', "Arial"),
        GlyphFont::new('・', "Arial Unicode MS"),
        GlyphFont::new('）', "Yu Gothic"),
        GlyphFont::new('（', "Yu Gothic"),
        GlyphFont::new('α', "Arial"),
        GlyphFont::new('☆', "Segoe UI Symbol"),
        GlyphFont::new('❤', "Segoe UI Symbol"),
        GlyphFont::new('「', "Yu Gothic UI Semibold"),
        GlyphFont::new('」', "Yu Gothic UI Semibold"),
    ]
}

fn default_bd_dx_style() -> String {
    "BD DX".to_string()
}

fn default_alignment_rules() -> Vec<AlignmentRule> {
    vec![
        AlignmentRule::new("Bottom Left", 1, false),
        AlignmentRule::new("Bottom Right", 3, false),
        AlignmentRule::new("Center Left", 4, false),
        // Exact, "BD Center" hides inside longer names
        AlignmentRule::new("BD Center", 5, true),
        AlignmentRule::new("Center Right", 6, false),
        AlignmentRule::new("Top Left", 7, false),
        AlignmentRule::new("Top DX", 8, false),
        AlignmentRule::new("Top Right", 9, false),
    ]
}

fn default_style_name() -> String {
    "Default".to_string()
}

fn default_signs_style() -> String {
    "Signs".to_string()
}

fn default_sign_actor() -> String {
    "On-screen".to_string()
}

fn default_alt_style() -> String {
    "Alt".to_string()
}

fn default_dialogue_styles() -> Vec<String> {
    to_strings(&["main", "default", "narrator", "narration"])
}

fn default_top_styles() -> Vec<String> {
    to_strings(&["top"])
}

fn default_italics_styles() -> Vec<String> {
    to_strings(&["italics", "internal"])
}

fn default_alt_styles() -> Vec<String> {
    to_strings(&["alt"])
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: LogLevel::default(),
            layout: LayoutConfig::default(),
            credits: default_credits(),
            unicode: UnicodeConfig::default(),
            glyph_fonts: default_glyph_fonts(),
            legacy_alignment: LegacyAlignmentConfig::default(),
            cr_quirks: CrQuirks::for_restyle_cr(),
            restyle: RestyleOptions::default(),
        }
    }
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.layout.res_x == 0 || self.layout.res_y == 0 {
            return Err(anyhow!("Layout resolution must be non-zero, got {}x{}",
                self.layout.res_x, self.layout.res_y));
        }

        if let Some(rule) = self.legacy_alignment.rules.iter()
            .find(|r| !(1..=9).contains(&r.alignment)) {
            return Err(anyhow!("Alignment for style '{}' must be between 1 and 9, got {}",
                rule.style, rule.alignment));
        }

        let legacy = &self.legacy_alignment;
        let names = legacy.rules.iter().map(|r| r.style.as_str())
            .chain([
                legacy.rename_style.as_str(),
                legacy.default_style.as_str(),
                legacy.signs_style.as_str(),
                self.cr_quirks.default_style.as_str(),
                self.cr_quirks.alt_style.as_str(),
            ]);
        for name in names {
            if name.trim().is_empty() {
                return Err(anyhow!("Style names in the config must not be empty"));
            }
        }

        if let Some(entry) = self.glyph_fonts.iter().find(|g| g.font.trim().is_empty()) {
            return Err(anyhow!("No font given for glyph '{}'", entry.glyph));
        }

        if self.credits.iter().any(|c| c.is_empty()) {
            // An empty marker matches every line
            return Err(anyhow!("Credit markers must not be empty"));
        }

        Ok(())
    }

    /// Load the config file, or write the defaults there if it doesn't exist yet
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> std::result::Result<Self, AppError> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .map_err(|e| AppError::File(format!("Failed to open config file {:?}: {}", path, e)))?;
            let config: Config = serde_json::from_reader(BufReader::new(file))
                .map_err(|e| AppError::Config(format!("Failed to parse config file {:?}: {}", path, e)))?;
            return Ok(config);
        }

        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config)
            .map_err(|e| AppError::Config(format!("Failed to serialize default config: {}", e)))?;
        std::fs::write(path, json)
            .map_err(|e| AppError::File(format!("Failed to write default config to {:?}: {}", path, e)))?;
        Ok(config)
    }
}
