use std::fmt;
use std::fs;
use std::path::Path;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use crate::app_config::CrQuirks;
use crate::errors::DocumentError;
use crate::manipulators;
use crate::style::{Style, STYLE_FORMAT};

// @module: ASS documents and the operations the restyle workflows need

// @const: ASS event timestamp regex (H:MM:SS.cc)
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{1,2}):(\d{1,2})[.:](\d{1,3})$").unwrap()
});

/// Field order of the `Format:` line written for `[Events]`
pub const EVENT_FORMAT: [&str; 10] = [
    "Layer", "Start", "End", "Style", "Name", "MarginL", "MarginR", "MarginV", "Effect", "Text",
];

// @struct: Single subtitle line (an ASS event)
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    // @field: Comment instead of Dialogue
    pub comment: bool,

    pub layer: i32,

    // @field: Start time in ms
    pub start_ms: u64,

    // @field: End time in ms
    pub end_ms: u64,

    // @field: Style name, compared case-insensitively
    pub style: String,

    // @field: Actor, often used as a category ("On-screen")
    pub name: String,

    pub margin_l: i32,
    pub margin_r: i32,
    pub margin_v: i32,
    pub effect: String,

    // @field: Text including `{...}` override blocks
    pub text: String,
}

impl Line {
    /// Creates a dialogue line with zeroed timing and margins
    pub fn new(style: &str, name: &str, text: &str) -> Self {
        Line {
            comment: false,
            layer: 0,
            start_ms: 0,
            end_ms: 0,
            style: style.to_string(),
            name: name.to_string(),
            margin_l: 0,
            margin_r: 0,
            margin_v: 0,
            effect: String::new(),
            text: text.to_string(),
        }
    }

    /// Parse an ASS timestamp to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64, DocumentError> {
        let invalid = || DocumentError::InvalidTimestamp(timestamp.to_string());
        let caps = TIMESTAMP_REGEX.captures(timestamp.trim()).ok_or_else(invalid)?;

        let field = |i: usize| -> Result<u64, DocumentError> {
            caps.get(i)
                .ok_or_else(invalid)?
                .as_str()
                .parse()
                .map_err(|_| invalid())
        };
        let hours = field(1)?;
        let minutes = field(2)?;
        let seconds = field(3)?;
        let fraction = caps.get(4).map_or("0", |m| m.as_str());
        let millis: u64 = match fraction.len() {
            1 => field(4)? * 100,
            2 => field(4)? * 10,
            _ => field(4)?,
        };

        if minutes >= 60 || seconds >= 60 {
            return Err(invalid());
        }

        hours.checked_mul(3_600_000)
            .and_then(|ms| ms.checked_add(minutes * 60_000 + seconds * 1_000 + millis))
            .ok_or_else(invalid)
    }

    /// Format milliseconds as an ASS timestamp (centisecond precision)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let centis = (ms % 1_000) / 10;

        format!("{}:{:02}:{:02}.{:02}", hours, minutes, seconds, centis)
    }

    /// Build a line from the values of an event row, keyed by the section's
    /// `Format:` field names
    fn from_fields(comment: bool, format: &[String], values: &[&str], line: usize) -> Result<Self, DocumentError> {
        let mut event = Line::new("Default", "", "");
        event.comment = comment;
        for (key, raw) in format.iter().zip(values.iter()) {
            let err = |what: &str| DocumentError::Parse {
                line,
                message: format!("Invalid {} value: {}", what, raw),
            };
            match key.to_lowercase().as_str() {
                "layer" => event.layer = raw.trim().parse().map_err(|_| err("Layer"))?,
                "start" => event.start_ms = Self::parse_timestamp(raw)?,
                "end" => event.end_ms = Self::parse_timestamp(raw)?,
                "style" => event.style = raw.trim().to_string(),
                "name" | "actor" => event.name = raw.trim().to_string(),
                "marginl" => event.margin_l = raw.trim().parse().map_err(|_| err("MarginL"))?,
                "marginr" => event.margin_r = raw.trim().parse().map_err(|_| err("MarginR"))?,
                "marginv" => event.margin_v = raw.trim().parse().map_err(|_| err("MarginV"))?,
                "effect" => event.effect = raw.to_string(),
                // Text keeps its whitespace
                "text" => event.text = raw.to_string(),
                _ => {}
            }
        }
        Ok(event)
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: {},{},{},{},{},{},{},{},{},{}",
            if self.comment { "Comment" } else { "Dialogue" },
            self.layer,
            Self::format_timestamp(self.start_ms),
            Self::format_timestamp(self.end_ms),
            self.style,
            self.name,
            self.margin_l,
            self.margin_r,
            self.margin_v,
            self.effect,
            self.text,
        )
    }
}

/// `[Script Info]` headers the restyle workflows set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssHeader {
    LayoutResX,
    LayoutResY,
    PlayResX,
    PlayResY,
    ScaledBorderAndShadow,
    YCbCrMatrix,
    WrapStyle,
    Title,
}

impl AssHeader {
    // @returns: Key as written in the file
    pub fn key(&self) -> &'static str {
        match self {
            Self::LayoutResX => "LayoutResX",
            Self::LayoutResY => "LayoutResY",
            Self::PlayResX => "PlayResX",
            Self::PlayResY => "PlayResY",
            Self::ScaledBorderAndShadow => "ScaledBorderAndShadow",
            Self::YCbCrMatrix => "YCbCr Matrix",
            Self::WrapStyle => "WrapStyle",
            Self::Title => "Title",
        }
    }
}

/// Value of a `[Script Info]` header
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    Int(i64),
    /// Written as `yes`/`no`
    Bool(bool),
    Text(String),
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", if *v { "yes" } else { "no" }),
            Self::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<u32> for HeaderValue {
    fn from(value: u32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<bool> for HeaderValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// What the restyle workflows need from a subtitle file
pub trait SubtitleDocument {
    fn lines(&self) -> &[Line];

    fn lines_mut(&mut self) -> &mut Vec<Line>;

    fn styles(&self) -> &[Style];

    /// Set (or add) `[Script Info]` headers
    fn set_headers(&mut self, headers: &[(AssHeader, HeaderValue)]);

    /// Replace styles with the same name (ignoring case), append the rest
    fn restyle(&mut self, styles: &[Style]);

    /// Run a line transform over the document's lines
    fn manipulate_lines<F>(&mut self, transform: F)
    where
        F: FnOnce(&mut Vec<Line>),
        Self: Sized,
    {
        transform(self.lines_mut());
    }

    /// Normalize Crunchyroll style names
    fn unfuck_cr(&mut self, quirks: &CrQuirks) {
        manipulators::unfuck_cr(self.lines_mut(), quirks);
    }

    /// Strip macrons from romanized text
    fn purge_macrons(&mut self) {
        manipulators::purge_macrons(self.lines_mut());
    }
}

enum Section {
    ScriptInfo,
    Styles,
    Events,
    Other(usize),
}

/// An ASS file held in memory
#[derive(Debug, Clone, PartialEq)]
pub struct AssDocument {
    /// Key/value pairs in file order; comments are stored under ";"
    script_info: Vec<(String, String)>,
    styles: Vec<Style>,
    lines: Vec<Line>,
    /// Sections we don't interpret (fonts, graphics, project garbage)
    extra_sections: Vec<(String, Vec<String>)>,
}

impl Default for AssDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl AssDocument {
    /// Empty v4.00+ script
    pub fn new() -> Self {
        AssDocument {
            script_info: vec![("ScriptType".to_string(), "v4.00+".to_string())],
            styles: Vec::new(),
            lines: Vec::new(),
            extra_sections: Vec::new(),
        }
    }

    /// Document with the given styles and lines
    pub fn with_content(styles: Vec<Style>, lines: Vec<Line>) -> Self {
        AssDocument {
            styles,
            lines,
            ..Self::new()
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Write the document to a file, creating the parent directory if needed
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let io_err = |source| DocumentError::Io { path: path.to_path_buf(), source };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        fs::write(path, self.to_string()).map_err(io_err)
    }

    /// Parse ASS text
    pub fn parse(content: &str) -> Result<Self, DocumentError> {
        let mut doc = AssDocument {
            script_info: Vec::new(),
            styles: Vec::new(),
            lines: Vec::new(),
            extra_sections: Vec::new(),
        };
        let mut section: Option<Section> = None;
        let mut style_format: Vec<String> = STYLE_FORMAT.iter().map(|s| s.to_string()).collect();
        let mut event_format: Option<Vec<String>> = None;
        let mut has_events = false;

        let content = content.trim_start_matches('\u{FEFF}');
        for (i, raw_line) in content.lines().enumerate() {
            let line_no = i + 1;
            let line = raw_line.trim_end_matches('\r');
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                let name = &trimmed[1..trimmed.len() - 1];
                section = Some(match name.to_lowercase().as_str() {
                    "script info" => Section::ScriptInfo,
                    "v4+ styles" | "v4 styles" => Section::Styles,
                    "events" => {
                        has_events = true;
                        Section::Events
                    }
                    _ => {
                        doc.extra_sections.push((name.to_string(), Vec::new()));
                        Section::Other(doc.extra_sections.len() - 1)
                    }
                });
                continue;
            }

            match &section {
                None => {
                    return Err(DocumentError::Parse {
                        line: line_no,
                        message: format!("Content before the first section: {}", trimmed),
                    });
                }
                Some(Section::ScriptInfo) => {
                    if let Some(comment) = trimmed.strip_prefix(';') {
                        doc.script_info.push((";".to_string(), comment.to_string()));
                    } else if let Some((key, value)) = trimmed.split_once(':') {
                        doc.script_info.push((key.trim().to_string(), value.trim().to_string()));
                    } else {
                        warn!("Ignoring malformed script info at line {}: {}", line_no, trimmed);
                    }
                }
                Some(Section::Styles) => {
                    let Some((kind, rest)) = trimmed.split_once(':') else {
                        warn!("Ignoring malformed style entry at line {}: {}", line_no, trimmed);
                        continue;
                    };
                    match kind.trim().to_lowercase().as_str() {
                        "format" => style_format = split_format(rest),
                        "style" => {
                            let values: Vec<&str> = rest.trim_start().splitn(style_format.len(), ',').collect();
                            doc.styles.push(Style::from_fields(&style_format, &values, line_no)?);
                        }
                        _ => debug!("Skipping style section entry at line {}", line_no),
                    }
                }
                Some(Section::Events) => {
                    let Some((kind, rest)) = line.split_once(':') else {
                        warn!("Ignoring malformed event at line {}: {}", line_no, trimmed);
                        continue;
                    };
                    let comment = match kind.trim().to_lowercase().as_str() {
                        "format" => {
                            event_format = Some(split_format(rest));
                            continue;
                        }
                        "dialogue" => false,
                        "comment" => true,
                        other => {
                            debug!("Skipping {} event at line {}", other, line_no);
                            continue;
                        }
                    };
                    let format = event_format.as_ref()
                        .ok_or_else(|| DocumentError::MissingSection("[Events] Format line".to_string()))?;
                    // Only the single space after the colon is syntax
                    let rest = rest.strip_prefix(' ').unwrap_or(rest);
                    let values: Vec<&str> = rest.splitn(format.len(), ',').collect();
                    if values.len() < format.len() {
                        return Err(DocumentError::Parse {
                            line: line_no,
                            message: format!("Expected {} fields, found {}", format.len(), values.len()),
                        });
                    }
                    doc.lines.push(Line::from_fields(comment, format, &values, line_no)?);
                }
                Some(Section::Other(index)) => {
                    doc.extra_sections[*index].1.push(line.to_string());
                }
            }
        }

        if !has_events {
            return Err(DocumentError::MissingSection("[Events]".to_string()));
        }

        Ok(doc)
    }

    /// Value of a `[Script Info]` header, matched ignoring case
    pub fn header(&self, key: &str) -> Option<&str> {
        self.script_info.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Move every line by `delay_ms`, clamping at zero
    pub fn shift(&mut self, delay_ms: i64) {
        let apply = |ms: u64| -> u64 {
            if delay_ms >= 0 {
                ms.saturating_add(delay_ms as u64)
            } else {
                ms.saturating_sub(delay_ms.unsigned_abs())
            }
        };
        for line in &mut self.lines {
            line.start_ms = apply(line.start_ms);
            line.end_ms = apply(line.end_ms);
        }
    }
}

fn split_format(rest: &str) -> Vec<String> {
    rest.split(',').map(|s| s.trim().to_string()).collect()
}

impl SubtitleDocument for AssDocument {
    fn lines(&self) -> &[Line] {
        &self.lines
    }

    fn lines_mut(&mut self) -> &mut Vec<Line> {
        &mut self.lines
    }

    fn styles(&self) -> &[Style] {
        &self.styles
    }

    fn set_headers(&mut self, headers: &[(AssHeader, HeaderValue)]) {
        for (header, value) in headers {
            let key = header.key();
            let value = value.to_string();
            match self.script_info.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
                Some(entry) => entry.1 = value,
                None => self.script_info.push((key.to_string(), value)),
            }
        }
    }

    fn restyle(&mut self, styles: &[Style]) {
        for style in styles {
            match self.styles.iter_mut().find(|s| s.name.to_lowercase() == style.name.to_lowercase()) {
                Some(existing) => *existing = style.clone(),
                None => self.styles.push(style.clone()),
            }
        }
    }
}

impl fmt::Display for AssDocument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "[Script Info]")?;
        for (key, value) in &self.script_info {
            if key == ";" {
                writeln!(f, ";{}", value)?;
            } else {
                writeln!(f, "{}: {}", key, value)?;
            }
        }
        writeln!(f)?;

        writeln!(f, "[V4+ Styles]")?;
        writeln!(f, "Format: {}", STYLE_FORMAT.join(", "))?;
        for style in &self.styles {
            writeln!(f, "{}", style)?;
        }
        writeln!(f)?;

        writeln!(f, "[Events]")?;
        writeln!(f, "Format: {}", EVENT_FORMAT.join(", "))?;
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }

        for (name, content) in &self.extra_sections {
            writeln!(f)?;
            writeln!(f, "[{}]", name)?;
            for line in content {
                writeln!(f, "{}", line)?;
            }
        }
        Ok(())
    }
}
