/*!
 * Line transforms for use with `SubtitleDocument::manipulate_lines`.
 *
 * Every transform takes the document's full line list and edits it in
 * place. Transforms never create lines; `remove_credits` is the only one
 * that drops any. Factories such as `replace_substr` capture their
 * parameters and hand back a boxed `LineTransform`.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use crate::app_config::{CrQuirks, GlyphFont, LegacyAlignmentConfig, UnicodeConfig};
use crate::app_config::Config;
use crate::document::Line;

/// A reusable line transform
pub type LineTransform = Box<dyn Fn(&mut Vec<Line>) + Send + Sync>;

// Font override tag; only counts when followed by `\` or `}`
static FONT_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\fn([^\\}]+)").unwrap()
});

static DEFAULT_CONFIG: Lazy<Config> = Lazy::new(Config::default);

fn eq_fold(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn contains_fold(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn style_allowed(style: &str, styles: Option<&[String]>) -> bool {
    match styles {
        None | Some([]) => true,
        Some(list) => list.iter().any(|s| eq_fold(s, style)),
    }
}

/// Prepend `{tag}` to a line's text and move it to `default_style` when its
/// style matches. With `exact` the style must equal `style` ignoring case,
/// otherwise `style` only has to occur in it. A missing leading backslash
/// is added to the tag. Returns whether the line matched.
pub fn replace_style_with_tag(line: &mut Line, style: &str, tag: &str, exact: bool, default_style: &str) -> bool {
    let matched = if exact {
        eq_fold(&line.style, style)
    } else {
        contains_fold(&line.style, style)
    };
    if !matched {
        return false;
    }

    let tag = if tag.starts_with('\\') {
        tag.to_string()
    } else {
        format!("\\{}", tag)
    };
    line.text = format!("{{{}}}{}", tag, line.text);
    line.style = default_style.to_string();
    true
}

/// Turn BD DX era positional styles ("Bottom Left", "Top DX", ...) into
/// `\anN` tags on the default style, and move on-screen lines into the
/// signs style.
///
/// The "Default" and "Signs" styles have to exist in the document.
pub fn unfuck_bd_dx(lines: &mut Vec<Line>) {
    unfuck_bd_dx_with(lines, &DEFAULT_CONFIG.legacy_alignment);
}

/// `unfuck_bd_dx` with explicit tables
pub fn unfuck_bd_dx_with(lines: &mut Vec<Line>, config: &LegacyAlignmentConfig) {
    let mut tagged = 0;
    let mut promoted = 0;

    for line in lines.iter_mut() {
        // \an2 is the default alignment, a rename is enough
        if eq_fold(&line.style, &config.rename_style) {
            line.style = config.default_style.clone();
        }

        for rule in &config.rules {
            if replace_style_with_tag(line, &rule.style, &rule.tag(), rule.exact, &config.default_style) {
                tagged += 1;
            }
        }

        // Must see the renamed style
        if contains_fold(&line.name, &config.sign_actor) {
            let is_dialogue_style = ["Default", config.default_style.as_str(), config.rename_style.as_str()]
                .iter()
                .any(|s| eq_fold(s, &line.style));
            if is_dialogue_style {
                if !line.text.to_lowercase().contains("\\an") {
                    line.text = format!("{{\\an2}}{}", line.text);
                }
                line.style = config.signs_style.clone();
                promoted += 1;
            }
        }
    }

    debug!("unfuck_bd_dx: tagged {} lines, moved {} lines to {}", tagged, promoted, config.signs_style);
}

/// Drop every line whose text contains one of the configured credit
/// markers. Matching is case sensitive.
pub fn remove_credits(lines: &mut Vec<Line>) {
    remove_credits_with(lines, &DEFAULT_CONFIG.credits);
}

/// `remove_credits` with an explicit marker list
pub fn remove_credits_with(lines: &mut Vec<Line>, markers: &[String]) {
    let before = lines.len();
    lines.retain(|line| !markers.iter().any(|marker| line.text.contains(marker.as_str())));
    debug!("remove_credits: removed {} lines", before - lines.len());
}

/// Delete invisible marks and swap odd punctuation for ASCII
pub fn strip_weird_unicode(lines: &mut Vec<Line>) {
    strip_weird_unicode_with(lines, &DEFAULT_CONFIG.unicode);
}

/// `strip_weird_unicode` with explicit tables
pub fn strip_weird_unicode_with(lines: &mut Vec<Line>, config: &UnicodeConfig) {
    for line in lines.iter_mut() {
        if line.text.contains(config.delete.as_slice()) {
            line.text.retain(|c| !config.delete.contains(&c));
        }
        for (from, to) in &config.replace {
            if line.text.contains(*from) {
                line.text = line.text.replace(*from, to);
            }
        }
    }
}

/// Positions (of the terminating `\` or `}`) and names of every font tag
fn font_tags(text: &str) -> Vec<(usize, &str)> {
    FONT_TAG_REGEX.captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            // The greedy name stops at a terminator or the end of the text
            match text[whole.end()..].chars().next() {
                Some('\\') | Some('}') => Some((whole.end(), name.as_str())),
                _ => None,
            }
        })
        .collect()
}

/// Wrap every `glyph` in `{\fn<font>}glyph{\fn<previous>}`, where
/// `<previous>` is the last font tag before the glyph (empty means the
/// style's font). Tags are looked up in `text` as it was before this call.
fn wrap_glyph(text: &str, entry: &GlyphFont) -> String {
    let tags = font_tags(text);
    let mut next_tag = 0;
    let mut last_font = "";

    let mut out = String::with_capacity(text.len() + 32);
    let mut copied = 0;
    for (pos, _) in text.match_indices(entry.glyph) {
        while next_tag < tags.len() && tags[next_tag].0 < pos {
            last_font = tags[next_tag].1;
            next_tag += 1;
        }
        out.push_str(&text[copied..pos]);
        out.push_str(&format!("{{\\fn{}}}{}{{\\fn{}}}", entry.font, entry.glyph, last_font));
        copied = pos + entry.glyph.len_utf8();
    }
    out.push_str(&text[copied..]);
    out
}

/// Glyphs are handled in table order, so a later glyph restores fonts
/// inserted for an earlier one.
fn replace_fonts(lines: &mut [Line], fonts: &[GlyphFont], styles: Option<&[String]>) -> usize {
    let mut changed = 0;
    for line in lines.iter_mut() {
        if !style_allowed(&line.style, styles) {
            continue;
        }
        let mut touched = false;
        for entry in fonts {
            if line.text.contains(entry.glyph) {
                line.text = wrap_glyph(&line.text, entry);
                touched = true;
            }
        }
        if touched {
            changed += 1;
        }
    }
    changed
}

/// Render `glyphs` in `replacement_font`. After each glyph the font goes
/// back to the last `\fn` tag before it, or to the style's font if there
/// is none. `styles` limits this to lines of those styles; `None` or an
/// empty list means every line.
pub fn replace_font_for_glyphs(glyphs: &[char], replacement_font: &str, styles: Option<Vec<String>>) -> LineTransform {
    let fonts: Vec<GlyphFont> = glyphs.iter()
        .map(|&glyph| GlyphFont::new(glyph, replacement_font))
        .collect();
    Box::new(move |lines: &mut Vec<Line>| {
        let changed = replace_fonts(lines, &fonts, styles.as_deref());
        debug!("replace_font_for_glyphs: changed {} lines", changed);
    })
}

/// Swap in fonts for glyphs that most fonts don't include.
///
/// This touches every line regardless of style, comments included.
pub fn fix_missing_glyphs(lines: &mut Vec<Line>) {
    fix_missing_glyphs_with(lines, &DEFAULT_CONFIG.glyph_fonts);
}

/// `fix_missing_glyphs` with an explicit glyph table
pub fn fix_missing_glyphs_with(lines: &mut Vec<Line>, glyph_fonts: &[GlyphFont]) {
    let changed = replace_fonts(lines, glyph_fonts, None);
    debug!("fix_missing_glyphs: changed {} lines", changed);
}

/// Replace every occurrence of `old` with `new`. With `styles` only lines
/// of those styles (ignoring case on both sides) are changed.
pub fn replace_substr(old: &str, new: &str, styles: Option<Vec<String>>) -> LineTransform {
    let old = old.to_string();
    let new = new.to_string();
    Box::new(move |lines: &mut Vec<Line>| {
        for line in lines.iter_mut() {
            if style_allowed(&line.style, styles.as_deref()) && line.text.contains(&old) {
                line.text = line.text.replace(&old, &new);
            }
        }
    })
}

/// Rename every line of style `old` (ignoring case) to exactly `new`
pub fn replace_style(old: &str, new: &str) -> LineTransform {
    let old = old.to_string();
    let new = new.to_string();
    Box::new(move |lines: &mut Vec<Line>| {
        for line in lines.iter_mut() {
            if eq_fold(&line.style, &old) {
                line.style = new.clone();
            }
        }
    })
}

/// Strip macrons from romanized vowels (ō -> o)
pub fn purge_macrons(lines: &mut Vec<Line>) {
    const MACRONS: [(char, char); 10] = [
        ('ā', 'a'), ('ē', 'e'), ('ī', 'i'), ('ō', 'o'), ('ū', 'u'),
        ('Ā', 'A'), ('Ē', 'E'), ('Ī', 'I'), ('Ō', 'O'), ('Ū', 'U'),
    ];
    for line in lines.iter_mut() {
        if !line.text.contains(|c: char| MACRONS.iter().any(|(m, _)| *m == c)) {
            continue;
        }
        line.text = line.text.chars()
            .map(|c| MACRONS.iter().find(|(m, _)| *m == c).map_or(c, |(_, plain)| *plain))
            .collect();
    }
}

/// Fold the many Crunchyroll dialogue style names into the default and
/// alt styles, keeping their positioning and italics as tags.
pub fn unfuck_cr(lines: &mut Vec<Line>, quirks: &CrQuirks) {
    let in_list = |style: &str, list: &[String]| list.iter().any(|s| eq_fold(s, style));

    for line in lines.iter_mut() {
        if in_list(&line.style, &quirks.dialogue_styles) {
            line.style = quirks.default_style.clone();
        } else if in_list(&line.style, &quirks.top_styles) {
            if !line.text.to_lowercase().contains("\\an") {
                line.text = format!("{{\\an8}}{}", line.text);
            }
            line.style = quirks.default_style.clone();
        } else if in_list(&line.style, &quirks.italics_styles) {
            line.text = format!("{{\\i1}}{}", line.text);
            line.style = quirks.default_style.clone();
        } else if in_list(&line.style, &quirks.alt_styles) {
            line.style = quirks.alt_style.clone();
        }
    }
}
