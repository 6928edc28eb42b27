//! Line classification for the engine's configuration dialect.
//!
//! A line is one of: a comment (or blank), a section header such as
//! `[ext_resource path="res://icon.png" type="Texture" id=1]`, a property
//! such as `config/name="My Game"`, or anything else, which the parser
//! treats as a continuation of the previous property.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::convert::{ASSIGN_SEPARATOR, clean_string};

/// `key="quoted value"` or `key=digits` inside a section header.
static SECTION_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r#"([A-Za-z0-9_]+){}("(.*?)"|[0-9]+)"#,
        regex::escape(ASSIGN_SEPARATOR)
    );
    Regex::new(&pattern).expect("section attribute pattern is valid")
});

/// A key starting with a letter followed by word characters or `/`, then `=`
/// with at most one space on each side.
static PROPERTY: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"^([A-Za-z][A-Za-z0-9_/]+)\s?{}\s?(.*)$",
        regex::escape(ASSIGN_SEPARATOR)
    );
    Regex::new(&pattern).expect("property pattern is valid")
});

/// Returns `true` for blank lines and lines starting with `;`.
pub fn is_line_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with(';')
}

/// Returns `true` if the trimmed line is `[...]` with non-blank content.
pub fn is_valid_section(line: &str) -> bool {
    section_body(line).is_some()
}

fn section_body(line: &str) -> Option<&str> {
    let body = line.trim().strip_prefix('[')?.strip_suffix(']')?;
    if body.trim().is_empty() { None } else { Some(body) }
}

/// Extracts the section name, which is the first token left once the
/// attributes are removed from the header.
///
/// Returns `None` if the line is not a section header or if nothing but
/// attributes is present.
pub fn section_name(line: &str) -> Option<String> {
    let body = section_body(line)?;
    SECTION_ATTRIBUTE
        .split(body)
        .map(str::trim)
        .find(|part| !part.is_empty())
        .map(str::to_string)
}

/// Extracts the `key=value` attributes of a section header.
///
/// Quoted values are returned without their quotes. Returns `None` if the
/// line is not a section header.
pub fn section_attributes(line: &str) -> Option<HashMap<String, String>> {
    let body = section_body(line)?;
    let attributes = SECTION_ATTRIBUTE
        .captures_iter(body)
        .map(|caps| {
            let key = clean_string(&caps[1]).to_string();
            let value = clean_string(&caps[2]).to_string();
            (key, value)
        })
        .collect();
    Some(attributes)
}

/// Returns `true` if the trimmed line matches the property grammar.
pub fn is_valid_property(line: &str) -> bool {
    PROPERTY.is_match(line.trim())
}

/// Splits a property line into its cleaned key and value.
///
/// Both sides are trimmed and stripped of one layer of surrounding quotes.
pub fn property_entry(line: &str) -> Option<(String, String)> {
    let caps = PROPERTY.captures(line.trim())?;
    let key = clean_string(caps[1].trim()).to_string();
    let value = clean_string(caps[2].trim()).to_string();
    Some((key, value))
}
