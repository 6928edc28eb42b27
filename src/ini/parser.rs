use std::io;

use log::trace;

use super::grammar;
use super::section::{Section, SectionId};
use crate::convert::clean_string;

/// State carried from one line to the next during a single parse.
#[derive(Debug)]
pub(crate) struct ParseCursor {
    section: SectionId,
    buffer: Option<String>,
    last_property: Option<String>,
}

impl ParseCursor {
    pub(crate) fn new(section: SectionId) -> Self {
        Self {
            section,
            buffer: None,
            last_property: None,
        }
    }

    /// Classifies one line and applies it to `sections`.
    pub(crate) fn feed(&mut self, line: &str, sections: &mut Vec<Section>, default: SectionId) {
        if grammar::is_line_comment(line) {
            return;
        }

        self.flush(sections);

        if grammar::is_valid_section(line) {
            self.open_section(line, sections, default);
        } else if let Some((key, value)) = grammar::property_entry(line) {
            sections[self.section.0].insert_property(key.clone(), value);
            self.last_property = Some(key);
        } else if self.buffer.is_none() {
            self.buffer = Some(line.to_string());
        } else {
            trace!("dropping orphan line while another is pending: {line:?}");
        }
    }

    /// Flushes any pending continuation and ends the parse.
    pub(crate) fn finish(mut self, sections: &mut [Section]) {
        self.flush(sections);
        if let Some(buffer) = self.buffer {
            trace!("discarding orphan line with no property to attach to: {buffer:?}");
        }
    }

    /// Appends the pending orphan line to the last written property, if that
    /// property exists in the current section.
    fn flush(&mut self, sections: &mut [Section]) {
        let Some(buffer) = self.buffer.as_deref() else {
            return;
        };
        let Some(key) = self.last_property.as_deref() else {
            return;
        };
        let section = &mut sections[self.section.0];
        let Ok(existing) = section.property(key) else {
            return;
        };

        let joined = format!("{} {}", existing.trim(), buffer.trim());
        let value = clean_string(joined.trim()).to_string();
        section.insert_property(key.to_string(), value);
        self.buffer = None;
    }

    fn open_section(&mut self, line: &str, sections: &mut Vec<Section>, default: SectionId) {
        let Some(name) = grammar::section_name(line) else {
            trace!("ignoring section header without a name: {line:?}");
            return;
        };

        let mut section = Section::new(name, Some(default));
        if let Some(attributes) = grammar::section_attributes(line) {
            section.extend_attributes(attributes);
        }

        self.section = SectionId(sections.len());
        sections.push(section);
    }
}

/// Parses in-memory `text`, appending new sections to `sections`.
/// Properties before the first header go to `default`.
pub(crate) fn parse_text(text: &str, sections: &mut Vec<Section>, default: SectionId) {
    let mut cursor = ParseCursor::new(default);
    for line in text.lines() {
        cursor.feed(line, sections, default);
    }
    cursor.finish(sections);
}

/// Runs the line-oriented parse over `lines`, appending new sections to
/// `sections`. Properties before the first header go to `default`.
///
/// # Errors
///
/// Returns the first I/O error produced by `lines`. Malformed lines never fail.
pub(crate) fn parse_lines<I>(
    lines: I,
    sections: &mut Vec<Section>,
    default: SectionId,
) -> io::Result<()>
where
    I: IntoIterator<Item = io::Result<String>>,
{
    let mut cursor = ParseCursor::new(default);
    for line in lines {
        cursor.feed(&line?, sections, default);
    }
    cursor.finish(sections);
    Ok(())
}
