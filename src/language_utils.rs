//! Language utilities for caption track language codes
//!
//! Track language codes are BCP 47 style tags such as `en`, `zh-TW` or
//! `pt-BR`. These helpers split them and turn them into readable names for
//! track listings; selection itself compares the raw codes.

use isolang::Language;

/// Primary language subtag of a tag (`zh` for `zh-TW`)
pub fn primary_subtag(code: &str) -> &str {
    code.split(['-', '_']).next().unwrap_or(code).trim()
}

/// Region or script subtag of a tag (`TW` for `zh-TW`), if any
pub fn region_subtag(code: &str) -> Option<&str> {
    code.split(['-', '_'])
        .nth(1)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Look up the ISO 639 language for a tag's primary subtag
pub fn lookup_language(code: &str) -> Option<Language> {
    let primary = primary_subtag(code).to_lowercase();
    match primary.len() {
        2 => Language::from_639_1(&primary),
        3 => Language::from_639_3(&primary),
        _ => None,
    }
}

/// English display name for a tag, e.g. "Chinese (TW)"; falls back to the tag itself
pub fn display_name(code: &str) -> String {
    match (lookup_language(code), region_subtag(code)) {
        (Some(language), Some(region)) => format!("{} ({})", language.to_name(), region),
        (Some(language), None) => language.to_name().to_string(),
        (None, _) => code.to_string(),
    }
}
