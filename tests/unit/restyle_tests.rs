/*!
 * Tests for the restyle workflows
 */

use anyhow::Result;
use substyle::app_config::Config;
use substyle::document::{AssDocument, AssHeader, HeaderValue, Line, SubtitleDocument};
use substyle::presets;
use substyle::restyle::{get_style, restyle_bd_dx, restyle_cr, Restyler};
use substyle::style::Style;
use crate::common::{self, BD_DX_SUBTITLE, CR_SUBTITLE, texts};

/// Records which document operations were called, in order
#[derive(Default)]
struct RecordingDocument {
    lines: Vec<Line>,
    styles: Vec<Style>,
    calls: Vec<String>,
}

impl SubtitleDocument for RecordingDocument {
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
        self.calls.push(format!("set_headers({})", headers.len()));
    }

    fn restyle(&mut self, styles: &[Style]) {
        let names: Vec<&str> = styles.iter().map(|s| s.name.as_str()).collect();
        self.calls.push(format!("restyle({})", names.join(",")));
        self.styles.extend_from_slice(styles);
    }

    fn unfuck_cr(&mut self, quirks: &substyle::app_config::CrQuirks) {
        self.calls.push("unfuck_cr".to_string());
        substyle::manipulators::unfuck_cr(&mut self.lines, quirks);
    }

    fn purge_macrons(&mut self) {
        self.calls.push("purge_macrons".to_string());
        substyle::manipulators::purge_macrons(&mut self.lines);
    }
}

#[test]
fn test_restyle_cr_withCrSubtitle_shouldNormalizeEverything() -> Result<()> {
    common::init_logger();
    let mut doc = AssDocument::parse(CR_SUBTITLE)?;
    restyle_cr(&mut doc, &presets::gandhi(), true, true, true);

    assert_eq!(doc.header("LayoutResX"), Some("640"));
    assert_eq!(doc.header("LayoutResY"), Some("360"));
    assert_eq!(doc.header("ScaledBorderAndShadow"), Some("yes"));
    assert_eq!(doc.header("YCbCr Matrix"), Some("TV.709"));

    assert_eq!(
        texts(doc.lines()),
        vec![
            "Hello there!",
            "{\\an8}Up here",
            "{\\i1}Thinking...",
            "Osaka, here we come",
            "La la {\\fnArial}♪{\\fn}",
        ]
    );
    assert!(doc.lines().iter().all(|l| l.style == "Default"));

    let default = get_style(doc.styles(), "Default").expect("preset style applied");
    assert_eq!(default.fontname, "Gandhi Sans");
    assert!(get_style(doc.styles(), "Alt").is_some());
    // Old styles are kept, only same-named ones are replaced
    assert!(get_style(doc.styles(), "main").is_some());
    Ok(())
}

#[test]
fn test_restyle_cr_withAllOptionalStepsOff_shouldKeepCreditsAndMacrons() -> Result<()> {
    let mut doc = AssDocument::parse(CR_SUBTITLE)?;
    restyle_cr(&mut doc, &presets::gandhi(), false, false, false);

    let all = texts(doc.lines());
    assert_eq!(all.len(), 6);
    assert!(all.contains(&"Ōsaka, here we come"));
    assert!(all.contains(&"La la ♪"));
    assert!(all.contains(&"Übersetzung: Someone"));
    Ok(())
}

#[test]
fn test_restyle_cr_withRecordingDocument_shouldRunStepsInFixedOrder() {
    let mut doc = RecordingDocument::default();
    restyle_cr(&mut doc, &presets::gandhi(), true, true, true);

    assert_eq!(
        doc.calls,
        vec!["set_headers(4)", "unfuck_cr", "restyle(Default,Alt,Overlap)", "purge_macrons"]
    );
}

#[test]
fn test_restyle_cr_withMacronsOff_shouldSkipOnlyThatStep() {
    let mut doc = RecordingDocument::default();
    restyle_cr(&mut doc, &presets::gandhi(), true, false, true);

    assert_eq!(doc.calls, vec!["set_headers(4)", "unfuck_cr", "restyle(Default,Alt,Overlap)"]);
}

#[test]
fn test_restyle_cr_withCreditInNewStyleText_shouldRemoveAfterRestyle() {
    let mut doc = RecordingDocument {
        lines: vec![common::line("main", "", "ToonsHub"), common::line("main", "", "Line")],
        ..Default::default()
    };
    restyle_cr(&mut doc, &presets::gandhi(), true, false, false);

    assert_eq!(texts(&doc.lines), vec!["Line"]);
}

#[test]
fn test_restyle_bd_dx_withBdDxSubtitle_shouldTagAndApplySignsThenPreset() -> Result<()> {
    let mut doc = AssDocument::parse(BD_DX_SUBTITLE)?;
    restyle_bd_dx(&mut doc, &presets::gandhi());

    assert_eq!(texts(doc.lines()), vec!["Bottom text", "{\\an8}Top text", "{\\an2}A sign"]);
    let styles: Vec<&str> = doc.lines().iter().map(|l| l.style.as_str()).collect();
    assert_eq!(styles, vec!["Default", "Default", "Signs"]);

    assert_eq!(get_style(doc.styles(), "Signs").map(|s| s.fontname.as_str()), Some("Arial"));
    assert_eq!(get_style(doc.styles(), "Default").map(|s| s.fontname.as_str()), Some("Gandhi Sans"));
    assert_eq!(doc.header("LayoutResY"), Some("360"));
    Ok(())
}

#[test]
fn test_restyle_bd_dx_withRecordingDocument_shouldRestyleSignsFirst() {
    let mut doc = RecordingDocument::default();
    restyle_bd_dx(&mut doc, &presets::gandhi());

    assert_eq!(
        doc.calls,
        vec!["set_headers(4)", "unfuck_cr", "restyle(Signs,Sign)", "restyle(Default,Alt,Overlap)"]
    );
}

#[test]
fn test_restyler_withCustomLayout_shouldWriteConfiguredHeaders() -> Result<()> {
    let mut config = Config::default();
    config.layout.res_x = 1920;
    config.layout.res_y = 1080;
    config.layout.scaled_border_and_shadow = false;
    let mut doc = AssDocument::parse(CR_SUBTITLE)?;
    Restyler::new(config).restyle_cr(&mut doc, &presets::gandhi());

    assert_eq!(doc.header("LayoutResX"), Some("1920"));
    assert_eq!(doc.header("ScaledBorderAndShadow"), Some("no"));
    Ok(())
}

#[test]
fn test_restyler_withConfiguredCredits_shouldUseThem() {
    let mut config = Config::default();
    config.credits = vec!["Fansub Group".to_string()];
    config.restyle.purge_macrons = false;
    let mut doc = AssDocument::with_content(
        Vec::new(),
        vec![common::line("main", "", "Fansub Group presents"), common::line("main", "", "Übersetzung: kept")],
    );
    Restyler::new(config).restyle_cr(&mut doc, &presets::gandhi());

    assert_eq!(texts(doc.lines()), vec!["Übersetzung: kept"]);
}

#[test]
fn test_get_style_withExactName_shouldReturnFirstMatch() {
    let styles = vec![
        Style { name: "Default".to_string(), fontsize: 1.0, ..Style::default() },
        Style { name: "Default".to_string(), fontsize: 2.0, ..Style::default() },
    ];

    assert_eq!(get_style(&styles, "Default").map(|s| s.fontsize), Some(1.0));
}

#[test]
fn test_get_style_withDifferentCase_shouldNotMatch() {
    let styles = presets::gandhi();

    assert!(get_style(&styles, "default").is_none());
    assert!(get_style(&styles, "Missing").is_none());
}
