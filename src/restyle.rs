/*!
 * Restyle workflows.
 *
 * `restyle_cr` cleans up a Crunchyroll release, `restyle_bd_dx` an old
 * BD DX release. Both only go through `SubtitleDocument`, so they work
 * the same on a parsed file or a track pulled out of a video.
 */

use log::{debug, info};
use crate::app_config::{Config, CrQuirks, LayoutConfig};
use crate::document::{AssHeader, HeaderValue, SubtitleDocument};
use crate::manipulators;
use crate::presets;
use crate::style::Style;

/// Runs the workflows with the tables and switches of a `Config`
#[derive(Debug, Clone, Default)]
pub struct Restyler {
    config: Config,
}

impl Restyler {
    pub fn new(config: Config) -> Self {
        Restyler { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn set_layout_headers<D: SubtitleDocument>(&self, doc: &mut D) {
        doc.set_headers(&layout_headers(&self.config.layout));
    }

    /// Crunchyroll workflow. Credits, macrons and glyph fonts are each
    /// handled only when switched on in `config.restyle`, always in that
    /// order and after the new styles are in place.
    pub fn restyle_cr<D: SubtitleDocument>(&self, doc: &mut D, styles: &[Style]) {
        let options = &self.config.restyle;

        self.set_layout_headers(doc);
        doc.unfuck_cr(&self.config.cr_quirks);
        manipulators::strip_weird_unicode_with(doc.lines_mut(), &self.config.unicode);
        doc.restyle(styles);

        if options.remove_credits {
            manipulators::remove_credits_with(doc.lines_mut(), &self.config.credits);
        }
        if options.purge_macrons {
            doc.purge_macrons();
        }
        if options.replace_glyph_font {
            manipulators::fix_missing_glyphs_with(doc.lines_mut(), &self.config.glyph_fonts);
        }

        info!("Restyled {} lines with {} styles (CR)", doc.lines().len(), styles.len());
    }

    /// BD DX workflow. Signs styles go in first, then `styles` on top.
    pub fn restyle_bd_dx<D: SubtitleDocument>(&self, doc: &mut D, styles: &[Style]) {
        self.set_layout_headers(doc);
        manipulators::unfuck_bd_dx_with(doc.lines_mut(), &self.config.legacy_alignment);
        doc.unfuck_cr(&CrQuirks::default());
        manipulators::strip_weird_unicode_with(doc.lines_mut(), &self.config.unicode);
        doc.restyle(&presets::signs());
        doc.restyle(styles);

        info!("Restyled {} lines with {} styles (BD DX)", doc.lines().len(), styles.len());
    }
}

/// The four layout headers both workflows write
pub fn layout_headers(layout: &LayoutConfig) -> [(AssHeader, HeaderValue); 4] {
    [
        (AssHeader::LayoutResX, HeaderValue::from(layout.res_x)),
        (AssHeader::LayoutResY, HeaderValue::from(layout.res_y)),
        (AssHeader::ScaledBorderAndShadow, HeaderValue::from(layout.scaled_border_and_shadow)),
        (AssHeader::YCbCrMatrix, HeaderValue::from(layout.ycbcr_matrix.as_str())),
    ]
}

/// Crunchyroll workflow with the built-in tables
pub fn restyle_cr<D: SubtitleDocument>(
    doc: &mut D,
    styles: &[Style],
    remove_credits: bool,
    purge_macrons: bool,
    replace_glyph_font: bool,
) {
    let mut config = Config::default();
    config.restyle.remove_credits = remove_credits;
    config.restyle.purge_macrons = purge_macrons;
    config.restyle.replace_glyph_font = replace_glyph_font;
    debug!("restyle_cr: credits={} macrons={} glyphs={}", remove_credits, purge_macrons, replace_glyph_font);
    Restyler::new(config).restyle_cr(doc, styles);
}

/// BD DX workflow with the built-in tables
pub fn restyle_bd_dx<D: SubtitleDocument>(doc: &mut D, styles: &[Style]) {
    Restyler::default().restyle_bd_dx(doc, styles);
}

/// First style named exactly `name`
pub fn get_style<'a>(styles: &'a [Style], name: &str) -> Option<&'a Style> {
    styles.iter().find(|style| style.name == name)
}
