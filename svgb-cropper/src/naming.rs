//! Output filename normalization
//!
//! `normalize` turns a source icon filename into the canonical output name:
//!
//! ```text
//! IconTypeArrow Left.SVG  ->  icon--arrow-left.svg
//! ArrowIcon.svg (outline) ->  icon--arrow-outline.svg
//! ```
//!
//! The function is pure and total. Inputs whose stem is made entirely of
//! noise tokens and punctuation collapse to an empty stem (`icon--.svg`), so
//! distinct sources can map to the same output file.

use serde::Serialize;
use svgb_common::config::NamingConfig;

/// Separator substituted for every character outside `[a-z0-9]`
const SEPARATOR: char = '-';

/// Which output variant the session produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMode {
    #[default]
    Normal,
    /// Outline icons; output names carry the alternate suffix
    Alternate,
}

/// Naming constants applied by `normalize`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingRules {
    /// Asset extension including the dot, matched case-insensitively
    pub extension: String,
    /// Removed case-insensitively, in this order
    pub noise_tokens: Vec<String>,
    pub prefix: String,
    pub alternate_suffix: String,
}

impl Default for NamingRules {
    fn default() -> Self {
        Self {
            extension: ".svg".to_string(),
            noise_tokens: vec!["Type".to_string(), "Icon".to_string()],
            prefix: "icon--".to_string(),
            alternate_suffix: "-outline".to_string(),
        }
    }
}

impl NamingRules {
    /// Defaults overridden by whatever the `[naming]` table sets
    pub fn from_config(config: &NamingConfig) -> Self {
        let defaults = Self::default();
        Self {
            extension: config.extension.clone().unwrap_or(defaults.extension),
            noise_tokens: config.noise_tokens.clone().unwrap_or(defaults.noise_tokens),
            prefix: config.prefix.clone().unwrap_or(defaults.prefix),
            alternate_suffix: config
                .alternate_suffix
                .clone()
                .unwrap_or(defaults.alternate_suffix),
        }
    }

    /// Does `name` end with the asset extension (case-insensitive)?
    pub fn has_extension(&self, name: &str) -> bool {
        strip_suffix_ignore_ascii_case(name, &self.extension).is_some()
    }
}

/// Map a raw asset name to its output filename
pub fn normalize(raw_name: &str, mode: ProcessingMode, rules: &NamingRules) -> String {
    let base = strip_suffix_ignore_ascii_case(raw_name, &rules.extension).unwrap_or(raw_name);

    let mut cleaned = base.to_string();
    for token in &rules.noise_tokens {
        cleaned = remove_ignore_ascii_case(&cleaned, token);
    }

    let mut stem = collapse_separators(&cleaned.to_lowercase());

    if mode == ProcessingMode::Alternate {
        stem.push_str(&rules.alternate_suffix);
    }

    format!(
        "{}{}{}",
        rules.prefix,
        stem,
        rules.extension.to_ascii_lowercase()
    )
}

/// Replace non-`[a-z0-9]` characters with the separator, collapse runs of
/// separators, and trim them from both ends.
fn collapse_separators(lowered: &str) -> String {
    let mut out = String::with_capacity(lowered.len());
    let mut pending_separator = false;

    for c in lowered.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_separator && !out.is_empty() {
                out.push(SEPARATOR);
            }
            pending_separator = false;
            out.push(c);
        } else {
            pending_separator = true;
        }
    }

    out
}

/// Remove every non-overlapping occurrence of `token`, scanning left to right
fn remove_ignore_ascii_case(haystack: &str, token: &str) -> String {
    if token.is_empty() {
        return haystack.to_string();
    }

    let needle = token.as_bytes();
    let mut out = String::with_capacity(haystack.len());
    let mut rest = haystack;

    while !rest.is_empty() {
        if rest.len() >= needle.len() && rest.as_bytes()[..needle.len()].eq_ignore_ascii_case(needle)
        {
            // A match covers a whole UTF-8 sequence, so the slice stays on a char boundary
            rest = &rest[needle.len()..];
            continue;
        }

        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }

    out
}

fn strip_suffix_ignore_ascii_case<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    if suffix.is_empty() || name.len() < suffix.len() {
        return None;
    }
    let split = name.len() - suffix.len();
    if !name.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = name.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}
