use isolang::Language;

// @module: Language tag utilities for track matching
// Containers label tracks as `jpn`, `ger`, `en`, `en-US` or even `English`;
// everything here resolves those to one `isolang::Language`.

// ISO 639-2/B codes that differ from their 639-2/T counterpart
const PART2B_TO_PART2T: [(&str, &str); 18] = [
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

fn part2b_to_part2t(code: &str) -> Option<&'static str> {
    PART2B_TO_PART2T.iter()
        .find(|(b, _)| *b == code)
        .map(|(_, t)| *t)
}

/// Resolve a code, English name or IETF tag to a language
pub fn resolve_language(tag: &str) -> Option<Language> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        return None;
    }

    // IETF tags: only the primary subtag names the language
    let primary = trimmed.split(['-', '_']).next().unwrap_or(trimmed).to_lowercase();
    let by_code = match primary.len() {
        2 => Language::from_639_1(&primary),
        3 => match part2b_to_part2t(&primary) {
            Some(part2t) => Language::from_639_3(part2t),
            None => Language::from_639_3(&primary),
        },
        _ => None,
    };
    if by_code.is_some() {
        return by_code;
    }

    let wanted = trimmed.to_lowercase();
    Language::from_name(trimmed)
        .or_else(|| Language::from_name(&title_case(&wanted)))
}

fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Check if two tags name the same language. Either side may be an
/// ISO 639 code, an English name or an IETF tag
pub fn language_tags_match(tag1: &str, tag2: &str) -> bool {
    match (resolve_language(tag1), resolve_language(tag2)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
