use serde::{Deserialize, Serialize};
use crate::style::{Color, Style};

// @module: Static style presets

/// Named style presets that can be applied with `restyle`
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    #[default]
    Gandhi,
    /// Smaller text for ultrawide content
    GandhiUw,
    Noto,
    Jpn,
    Kor,
    Sc,
    Tc,
    Thai,
    Arab,
}

impl Preset {
    // @returns: Default style plus its complementing styles
    pub fn styles(&self) -> Vec<Style> {
        match self {
            Self::Gandhi => gandhi(),
            Self::GandhiUw => gandhi_uw(),
            Self::Noto => noto_family("Noto Sans"),
            Self::Jpn => noto_family("Noto Sans JP"),
            Self::Kor => noto_family("Noto Sans KR"),
            Self::Sc => noto_family("Noto Sans SC"),
            Self::Tc => noto_family("Noto Sans TC"),
            Self::Thai => noto_family("Noto Sans Thai"),
            Self::Arab => noto_family("Noto Sans Arabic"),
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::Gandhi => "Gandhi Sans",
            Self::GandhiUw => "Gandhi Sans (ultrawide)",
            Self::Noto => "Noto Sans",
            Self::Jpn => "Noto Sans JP",
            Self::Kor => "Noto Sans KR",
            Self::Sc => "Noto Sans SC",
            Self::Tc => "Noto Sans TC",
            Self::Thai => "Noto Sans Thai",
            Self::Arab => "Noto Sans Arabic",
        }
    }
}

/// Shared look of every dialogue preset; only font and metrics differ
fn dialogue_default(fontname: &str) -> Style {
    Style {
        name: "Default".to_string(),
        fontname: fontname.to_string(),
        fontsize: 75.0,
        primary_color: Color::new(0xFF, 0xFF, 0xFF, 0x00),
        secondary_color: Color::new(0xFF, 0x00, 0x00, 0x00),
        outline_color: Color::new(0x00, 0x00, 0x00, 0x00),
        back_color: Color::new(0x00, 0x00, 0x00, 0xA0),
        bold: true,
        italic: false,
        underline: false,
        strike_out: false,
        scale_x: 100.0,
        scale_y: 100.0,
        spacing: 0.0,
        angle: 0.0,
        border_style: 1,
        outline: 3.6,
        shadow: 1.5,
        alignment: 2,
        // Narrower than usual so long lines wrap into two, not three
        margin_l: 150,
        margin_r: 150,
        margin_v: 55,
        encoding: 1,
    }
}

/// Styles that go with a dialogue default: "Alt" for the second speaker
/// and "Overlap" for overlapping speech, both at the top of the screen.
pub fn complementing_styles(default: &Style) -> Vec<Style> {
    let mut alt = default.renamed("Alt");
    alt.alignment = 8;

    let mut overlap = default.renamed("Overlap");
    overlap.alignment = 8;
    overlap.outline_color = Color::new(0x00, 0x00, 0x40, 0x00);

    vec![alt, overlap]
}

fn with_complements(default: Style) -> Vec<Style> {
    let mut styles = complementing_styles(&default);
    styles.insert(0, default);
    styles
}

pub fn gandhi() -> Vec<Style> {
    with_complements(dialogue_default("Gandhi Sans"))
}

pub fn gandhi_uw() -> Vec<Style> {
    let default = Style {
        fontsize: 57.0,
        outline: 2.7,
        shadow: 1.125,
        margin_l: 220,
        margin_r: 220,
        margin_v: 40,
        ..dialogue_default("Gandhi Sans")
    };
    with_complements(default)
}

fn noto_family(fontname: &str) -> Vec<Style> {
    with_complements(dialogue_default(fontname))
}

fn sign_style(name: &str) -> Style {
    Style {
        name: name.to_string(),
        fontname: "Arial".to_string(),
        fontsize: 60.0,
        bold: true,
        outline: 4.0,
        shadow: 0.0,
        alignment: 8,
        margin_l: 60,
        margin_r: 60,
        margin_v: 60,
        ..dialogue_default("Arial")
    }
}

/// "Signs" and its singular spelling "Sign"
pub fn signs() -> Vec<Style> {
    vec![sign_style("Signs"), sign_style("Sign")]
}
