/*!
 * Tests for application controller functionality
 */

use std::fs;
use anyhow::Result;
use substyle::app_config::Config;
use substyle::app_controller::{Controller, FolderSummary, RunOutcome, Workflow};
use substyle::document::{AssDocument, SubtitleDocument};
use substyle::presets::Preset;
use crate::common;

/// Test creating a controller with a specific configuration
#[test]
fn test_with_config_withValidConfig_shouldCreateController() -> Result<()> {
    let mut config = Config::default();
    config.restyle.preset = Preset::Noto;
    let controller = Controller::with_config(config)?;

    assert_eq!(controller.styles()[0].fontname, "Noto Sans");
    Ok(())
}

#[test]
fn test_with_config_withInvalidConfig_shouldFail() {
    let mut config = Config::default();
    config.layout.res_y = 0;

    assert!(Controller::with_config(config).is_err());
}

#[tokio::test]
async fn test_run_withCrSubtitle_shouldWriteRestyledFile() -> Result<()> {
    common::init_logger();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_cr_subtitle(temp_dir.path(), "ep01.ass")?;
    let output_dir = temp_dir.path().join("out");
    let controller = Controller::with_config(Config::default())?;

    let outcome = controller.run(input, output_dir.clone(), Workflow::Cr, false).await?;
    let expected = output_dir.join("ep01.restyled.ass");
    assert_eq!(outcome, RunOutcome::Written(expected.clone()));

    let doc = AssDocument::from_file(&expected)?;
    assert_eq!(doc.header("LayoutResX"), Some("640"));
    assert_eq!(doc.lines().len(), 5);
    assert!(doc.lines().iter().all(|l| l.style == "Default"));
    Ok(())
}

#[tokio::test]
async fn test_run_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_bd_dx_subtitle(temp_dir.path(), "ep02.ass")?;
    let existing = common::create_test_file(temp_dir.path(), "ep02.restyled.ass", "old")?;
    let controller = Controller::with_config(Config::default())?;

    let outcome = controller.run(input.clone(), temp_dir.path().to_path_buf(), Workflow::BdDx, false).await?;
    assert_eq!(outcome, RunOutcome::Skipped(existing.clone()));
    assert_eq!(fs::read_to_string(&existing)?, "old");

    let outcome = controller.run(input, temp_dir.path().to_path_buf(), Workflow::BdDx, true).await?;
    assert_eq!(outcome, RunOutcome::Written(existing.clone()));
    assert!(fs::read_to_string(&existing)?.contains("{\\an2}A sign"));
    Ok(())
}

#[tokio::test]
async fn test_run_withMissingInput_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(Config::default())?;

    let result = controller
        .run(temp_dir.path().join("nope.ass"), temp_dir.path().to_path_buf(), Workflow::Cr, false)
        .await;
    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn test_load_document_withUnsupportedFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "notes.txt", "hello")?;
    let controller = Controller::with_config(Config::default())?;

    assert!(controller.load_document(&input).await.is_err());
    Ok(())
}

#[test]
fn test_process_document_withBdDxWorkflow_shouldApplySignsAndPreset() -> Result<()> {
    let controller = Controller::with_config(Config::default())?;
    let mut doc = AssDocument::parse(common::BD_DX_SUBTITLE)?;
    controller.process_document(&mut doc, Workflow::BdDx);

    let names: Vec<&str> = doc.styles().iter().map(|s| s.name.as_str()).collect();
    assert!(names.contains(&"Signs"));
    assert!(names.contains(&"Overlap"));
    Ok(())
}

#[tokio::test]
async fn test_run_folder_withMixedFiles_shouldCountOutcomes() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_cr_subtitle(temp_dir.path(), "ep01.ass")?;
    common::create_cr_subtitle(temp_dir.path(), "season/ep02.ass")?;
    common::create_test_file(temp_dir.path(), "broken.ass", "[Script Info]\nTitle: no events\n")?;
    let controller = Controller::with_config(Config::default())?;

    let summary = controller.run_folder(temp_dir.path().to_path_buf(), None, Workflow::Cr, false).await?;
    assert_eq!(summary, FolderSummary { written: 2, skipped: 0, failed: 1 });
    assert!(temp_dir.path().join("season").join("ep02.restyled.ass").exists());

    // Outputs from the first pass are not picked up as inputs
    let summary = controller.run_folder(temp_dir.path().to_path_buf(), None, Workflow::Cr, false).await?;
    assert_eq!(summary, FolderSummary { written: 0, skipped: 2, failed: 1 });
    Ok(())
}

#[tokio::test]
async fn test_run_folder_withEmptyDirectory_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(Config::default())?;

    let result = controller.run_folder(temp_dir.path().to_path_buf(), None, Workflow::Cr, false).await;
    assert!(result.is_err());
    Ok(())
}
