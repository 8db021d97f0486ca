/*!
 * Tests for ASS parsing, writing and the document operations
 */

use anyhow::Result;
use substyle::app_config::CrQuirks;
use substyle::document::{AssDocument, AssHeader, HeaderValue, Line, SubtitleDocument};
use substyle::errors::DocumentError;
use substyle::manipulators::replace_substr;
use substyle::style::Style;
use crate::common::{self, CR_SUBTITLE};

#[test]
fn test_parse_withCrSubtitle_shouldReadAllSections() -> Result<()> {
    let doc = AssDocument::parse(CR_SUBTITLE)?;

    assert_eq!(doc.header("Title"), Some("Episode 1"));
    assert_eq!(doc.header("playresx"), Some("1920"));
    assert_eq!(doc.styles().len(), 3);
    assert!(doc.styles()[2].italic);
    assert_eq!(doc.lines().len(), 6);

    let first = &doc.lines()[0];
    assert_eq!(first.start_ms, 1_000);
    assert_eq!(first.end_ms, 3_500);
    assert_eq!(first.style, "main");
    assert_eq!(first.text, "Hello\u{200B} there\u{FF01}");

    assert!(doc.lines()[5].comment);
    Ok(())
}

#[test]
fn test_parse_withCrlfLineEndings_shouldMatchLf() -> Result<()> {
    let crlf = CR_SUBTITLE.replace('\n', "\r\n");
    assert_eq!(AssDocument::parse(&crlf)?, AssDocument::parse(CR_SUBTITLE)?);
    Ok(())
}

#[test]
fn test_parse_withCommasInText_shouldKeepThemInText() -> Result<()> {
    let content = "[Events]\nFormat: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\nDialogue: 0,0:00:00.00,0:00:01.00,Default,,0,0,0,,One, two,  three\n";
    let doc = AssDocument::parse(content)?;

    assert_eq!(doc.lines()[0].text, "One, two,  three");
    Ok(())
}

#[test]
fn test_parse_withReorderedEventFormat_shouldFollowFormatLine() -> Result<()> {
    let content = "[Events]\nFormat: Start, End, Style, Text\nDialogue: 0:00:02.00,0:00:03.00,Top,Hi\n";
    let doc = AssDocument::parse(content)?;

    let l = &doc.lines()[0];
    assert_eq!(l.start_ms, 2_000);
    assert_eq!(l.style, "Top");
    assert_eq!(l.text, "Hi");
    Ok(())
}

#[test]
fn test_parse_withoutEvents_shouldFail() {
    let result = AssDocument::parse("[Script Info]\nTitle: x\n");
    assert!(matches!(result, Err(DocumentError::MissingSection(_))));
}

#[test]
fn test_parse_withDialogueBeforeFormat_shouldFail() {
    let result = AssDocument::parse("[Events]\nDialogue: 0,0:00:00.00,0:00:01.00,Default,,0,0,0,,Hi\n");
    assert!(matches!(result, Err(DocumentError::MissingSection(_))));
}

#[test]
fn test_parse_withBadTimestamp_shouldFail() {
    let content = "[Events]\nFormat: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\nDialogue: 0,0:00:xx.00,0:00:01.00,Default,,0,0,0,,Hi\n";
    assert!(matches!(AssDocument::parse(content), Err(DocumentError::InvalidTimestamp(_))));
}

#[test]
fn test_parse_timestamp_withVariousPrecisions_shouldReturnMillis() -> Result<()> {
    assert_eq!(Line::parse_timestamp("0:00:01.5")?, 1_500);
    assert_eq!(Line::parse_timestamp("0:00:01.50")?, 1_500);
    assert_eq!(Line::parse_timestamp("1:02:03.004")?, 3_723_004);
    assert!(Line::parse_timestamp("0:61:00.00").is_err());
    Ok(())
}

#[test]
fn test_parse_timestamp_withHugeHours_shouldFailWithoutOverflow() {
    let result = Line::parse_timestamp("99999999999999:00:00.00");
    assert!(matches!(result, Err(DocumentError::InvalidTimestamp(_))));
}

#[test]
fn test_format_timestamp_withMillis_shouldTruncateToCentis() {
    assert_eq!(Line::format_timestamp(3_723_456), "1:02:03.45");
    assert_eq!(Line::format_timestamp(0), "0:00:00.00");
}

#[test]
fn test_to_string_withParsedDocument_shouldReparseToSameDocument() -> Result<()> {
    let doc = AssDocument::parse(CR_SUBTITLE)?;
    let reparsed = AssDocument::parse(&doc.to_string())?;

    assert_eq!(doc, reparsed);
    Ok(())
}

#[test]
fn test_parse_withUnknownSection_shouldWriteItBack() -> Result<()> {
    let content = format!("{}\n[Aegisub Project Garbage]\nActive Line: 3\n", CR_SUBTITLE);
    let doc = AssDocument::parse(&content)?;
    let written = doc.to_string();

    assert!(written.contains("[Aegisub Project Garbage]\nActive Line: 3"));
    Ok(())
}

#[test]
fn test_set_headers_withExistingAndNewKeys_shouldUpsert() -> Result<()> {
    let mut doc = AssDocument::parse(CR_SUBTITLE)?;
    doc.set_headers(&[
        (AssHeader::PlayResX, HeaderValue::from(640u32)),
        (AssHeader::ScaledBorderAndShadow, HeaderValue::from(true)),
        (AssHeader::YCbCrMatrix, HeaderValue::from("TV.709")),
    ]);

    assert_eq!(doc.header("PlayResX"), Some("640"));
    assert_eq!(doc.header("ScaledBorderAndShadow"), Some("yes"));
    assert_eq!(doc.header("YCbCr Matrix"), Some("TV.709"));
    assert_eq!(doc.to_string().matches("PlayResX").count(), 1);
    Ok(())
}

#[test]
fn test_restyle_withSameNameDifferentCase_shouldReplaceAndAppend() {
    let mut doc = AssDocument::with_content(
        vec![Style { name: "default".to_string(), fontsize: 10.0, ..Style::default() }],
        Vec::new(),
    );
    doc.restyle(&[
        Style { name: "Default".to_string(), fontsize: 75.0, ..Style::default() },
        Style { name: "Alt".to_string(), ..Style::default() },
    ]);

    assert_eq!(doc.styles().len(), 2);
    assert_eq!(doc.styles()[0].name, "Default");
    assert_eq!(doc.styles()[0].fontsize, 75.0);
    assert_eq!(doc.styles()[1].name, "Alt");
}

#[test]
fn test_manipulate_lines_withBoxedTransform_shouldApplyIt() {
    let mut doc = AssDocument::with_content(Vec::new(), vec![common::line("Default", "", "colour")]);
    doc.manipulate_lines(replace_substr("colour", "color", None));

    assert_eq!(doc.lines()[0].text, "color");
}

#[test]
fn test_manipulate_lines_withClosure_shouldSeeAllLines() {
    let mut doc = AssDocument::with_content(
        Vec::new(),
        vec![common::line("A", "", "1"), common::line("B", "", "2")],
    );
    doc.manipulate_lines(|lines| lines.retain(|l| l.style == "B"));

    assert_eq!(doc.lines().len(), 1);
}

#[test]
fn test_unfuck_cr_and_purge_macrons_withDocument_shouldDelegate() {
    let mut doc = AssDocument::with_content(Vec::new(), vec![common::line("narrator", "", "Kyōto")]);
    doc.unfuck_cr(&CrQuirks::default());
    doc.purge_macrons();

    assert_eq!(doc.lines()[0].style, "Default");
    assert_eq!(doc.lines()[0].text, "Kyoto");
}

#[test]
fn test_shift_withNegativeDelay_shouldClampAtZero() {
    let mut l = Line::new("Default", "", "x");
    l.start_ms = 500;
    l.end_ms = 2_000;
    let mut doc = AssDocument::with_content(Vec::new(), vec![l]);
    doc.shift(-1_000);

    assert_eq!(doc.lines()[0].start_ms, 0);
    assert_eq!(doc.lines()[0].end_ms, 1_000);
}

#[test]
fn test_write_to_file_withNestedPath_shouldCreateDirAndRoundTrip() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("out").join("episode.ass");
    let doc = AssDocument::parse(CR_SUBTITLE)?;
    doc.write_to_file(&path)?;

    assert_eq!(AssDocument::from_file(&path)?, doc);
    Ok(())
}

#[test]
fn test_from_file_withMissingFile_shouldReturnIoError() {
    let result = AssDocument::from_file("/definitely/not/here.ass");
    assert!(matches!(result, Err(DocumentError::Io { .. })));
}
