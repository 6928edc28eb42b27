//! Tolerant parser for the bracket-section, `key=value` dialect used by the
//! engine's project files (`project.godot`, `engine.cfg`) and its text scene
//! and resource files (`.tscn`, `.tres`).
//!
//! ```ini
//! config_version=4
//!
//! [application]
//! config/name="My Game"
//! run/main_scene="res://Scenes/Main.tscn"
//!
//! [ext_resource path="res://icon.png" type="Texture" id=1]
//! ```

mod grammar;
mod parser;
/// Sections and their typed property accessors.
pub mod section;

use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use crate::filesystem::{self, FilesystemError};
pub use grammar::{
    is_line_comment, is_valid_property, is_valid_section, property_entry, section_attributes,
    section_name,
};
pub use section::{PropertyError, Section, SectionId};

/// Name of the section holding properties that appear before any header.
pub const DEFAULT_SECTION_NAME: &str = "Default";

/// File extensions accepted by [`Ini::load_from_path`] unless configured otherwise.
pub const VALID_EXTENSIONS: [&str; 5] = ["tscn", "tres", "godot", "ini", "cfg"];

const DEFAULT_SECTION_ID: SectionId = SectionId(0);

/// Errors raised while loading a document.
#[derive(Debug, Error)]
pub enum IniError {
    /// The backing file does not exist.
    #[error("File location {path:?} not exists")]
    NotFound { path: PathBuf },
    /// The backing file's extension is not in the allow-list.
    #[error("Target file {path:?} is not a valid INI file")]
    InvalidExtension { path: PathBuf },
    /// The path could not be resolved.
    #[error("Invalid path: {0}")]
    Path(#[from] FilesystemError),
    /// Wrapper for read failures.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl IniError {
    /// Returns `true` for the I/O failure class: extension rejection, path
    /// resolution, or read faults.
    pub fn is_io_failure(&self) -> bool {
        !matches!(self, Self::NotFound { .. })
    }
}

/// Options controlling which files an [`Ini`] accepts.
#[derive(Debug, Clone)]
pub struct IniOptions {
    /// Extensions (without the dot) accepted by [`Ini::load_from_path`].
    pub extensions: Vec<String>,
}

impl Default for IniOptions {
    fn default() -> Self {
        Self {
            extensions: VALID_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }
}

impl IniOptions {
    /// Adds an accepted extension.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extensions.push(extension.into());
        self
    }

    fn accepts(&self, path: &Path) -> bool {
        filesystem::extension_of(path)
            .is_some_and(|ext| self.extensions.iter().any(|allowed| *allowed == ext))
    }
}

#[derive(Debug, Clone)]
enum Source {
    File(PathBuf),
    Text(String),
}

/// A parsed document: the default section plus every section found in the text.
///
/// Sections with the same name coexist; [`Ini::section`] returns the first
/// one and [`Ini::sections`] returns them all. Loading and reloading take
/// `&mut self`, so a parse can never overlap another parse or a read of the
/// same document.
#[derive(Debug)]
pub struct Ini {
    options: IniOptions,
    sections: Vec<Section>,
    source: Option<Source>,
    initialized: bool,
}

impl Default for Ini {
    fn default() -> Self {
        Self::new()
    }
}

impl Ini {
    /// Creates an empty document holding only the default section.
    pub fn new() -> Self {
        Self::with_options(IniOptions::default())
    }

    /// Creates an empty document with custom options.
    ///
    /// # Arguments
    ///
    /// * `options` - Options applied to every later load and reload.
    ///
    /// # Examples
    ///
    /// ```
    /// use godot_utils::{Ini, IniOptions};
    ///
    /// let ini = Ini::with_options(IniOptions::default().with_extension("import"));
    /// assert!(!ini.is_initialized());
    /// ```
    pub fn with_options(options: IniOptions) -> Self {
        Self {
            options,
            sections: vec![default_section()],
            source: None,
            initialized: false,
        }
    }

    /// Creates a document and loads it from `path`.
    ///
    /// # Errors
    ///
    /// See [`Ini::load_from_path`].
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, IniError> {
        let mut ini = Self::new();
        ini.load_from_path(path)?;
        Ok(ini)
    }

    /// Creates a document and parses `text` into it.
    pub fn parse_str(text: &str) -> Self {
        let mut ini = Self::new();
        ini.load_from_str(text);
        ini
    }

    /// Loads and parses the file at `path`. A leading `~` is expanded.
    ///
    /// # Errors
    ///
    /// Returns `IniError::NotFound` if the file does not exist,
    /// `IniError::InvalidExtension` if its extension is not accepted, and
    /// `IniError::Io` if reading fails.
    ///
    /// # Panics
    ///
    /// Panics if the document was already loaded. Use [`Ini::update_content`]
    /// to reparse.
    pub fn load_from_path<P: AsRef<Path>>(&mut self, path: P) -> Result<(), IniError> {
        assert!(!self.initialized, "Ini content already initialized");
        let path = filesystem::expand_home(path)?;
        self.source = Some(Source::File(path));
        self.reload()
    }

    /// Parses in-memory text. No extension check applies.
    ///
    /// # Panics
    ///
    /// Panics if the document was already loaded.
    pub fn load_from_str(&mut self, text: &str) {
        assert!(!self.initialized, "Ini content already initialized");
        self.source = Some(Source::Text(text.to_string()));
        self.sections = parse_text(text);
        self.initialized = true;
    }

    /// Discards every section and parses the loaded source again.
    ///
    /// # Errors
    ///
    /// Same as [`Ini::load_from_path`] for file-backed documents. On error
    /// only a fresh default section remains and the document is no longer
    /// initialized.
    ///
    /// # Panics
    ///
    /// Panics if the document has not been loaded yet.
    pub fn update_content(&mut self) -> Result<(), IniError> {
        assert!(self.initialized, "Ini content is not initialized");
        self.reload()
    }

    fn reload(&mut self) -> Result<(), IniError> {
        self.initialized = false;
        self.sections = vec![default_section()];

        let sections = match &self.source {
            Some(Source::File(path)) => read_sections(path, &self.options)?,
            Some(Source::Text(text)) => parse_text(text),
            None => vec![default_section()],
        };

        debug!(
            "parsed {} sections from {}",
            sections.len(),
            self.path().map_or_else(|| "text".into(), |path| path.display().to_string())
        );
        self.sections = sections;
        self.initialized = true;
        Ok(())
    }

    /// Returns `true` once a load or reload has completed successfully.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Path of the backing file, if the document was loaded from one.
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            Some(Source::File(path)) => Some(path),
            _ => None,
        }
    }

    /// Options this document was created with.
    pub fn options(&self) -> &IniOptions {
        &self.options
    }

    /// Section holding the properties found before the first header.
    pub fn default_section(&self) -> &Section {
        &self.sections[DEFAULT_SECTION_ID.0]
    }

    /// Handle of the default section, stable across reloads.
    pub fn default_section_id(&self) -> SectionId {
        DEFAULT_SECTION_ID
    }

    /// Resolves a section handle.
    ///
    /// # Returns
    ///
    /// The section, or `None` if the handle does not belong to the current
    /// section table.
    pub fn section_by_id(&self, id: SectionId) -> Option<&Section> {
        self.sections.get(id.0)
    }

    /// Resolves the fallback section of `section`, if it has one.
    pub fn fallback_of(&self, section: &Section) -> Option<&Section> {
        section.default_section().and_then(|id| self.section_by_id(id))
    }

    /// Returns `true` if any section is named `name`.
    pub fn section_exists(&self, name: &str) -> bool {
        self.sections.iter().any(|section| section.name() == name)
    }

    /// Returns the first section named `name`.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.name() == name)
    }

    /// Returns the first section named `name` for editing. Edits are lost on
    /// the next reload.
    pub fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|section| section.name() == name)
    }

    /// Returns every section named `name`.
    pub fn sections(&self, name: &str) -> Vec<&Section> {
        self.sections
            .iter()
            .filter(|section| section.name() == name)
            .collect()
    }

    /// Every section, the default one included.
    pub fn all_sections(&self) -> &[Section] {
        &self.sections
    }
}

fn default_section() -> Section {
    Section::new(DEFAULT_SECTION_NAME, None)
}

fn parse_text(text: &str) -> Vec<Section> {
    let mut sections = vec![default_section()];
    parser::parse_text(text, &mut sections, DEFAULT_SECTION_ID);
    sections
}

fn read_sections(path: &Path, options: &IniOptions) -> Result<Vec<Section>, IniError> {
    if !path.exists() {
        return Err(IniError::NotFound {
            path: path.to_path_buf(),
        });
    }
    if !options.accepts(path) {
        return Err(IniError::InvalidExtension {
            path: path.to_path_buf(),
        });
    }

    let mut sections = vec![default_section()];
    parser::parse_lines(filesystem::read_lines(path)?, &mut sections, DEFAULT_SECTION_ID)?;
    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;

    const PROJECT: &str = r#"; Engine configuration file.
; It's best edited using the editor UI and not directly,

config_version=4

[application]

config/name="Platformer"
config/description="A small demo
spanning two lines"
run/main_scene="res://Scenes/2dScene.tscn"
config/icon="res://icon.png"

[input]

ui_page_down={
"deadzone": 0.5,
"events": [  ]
}

[rendering]

quality/driver/driver_name="GLES2"
vram_compression/import_etc=true
environment/default_clear_color=Color( 0.1, 0.1, 0.1, 1 )
"#;

    fn write_temp_file(name: &str, content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join(name);
        let mut file = File::create(&file_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, file_path)
    }

    #[test]
    fn new_document_has_only_default_section() {
        let ini = Ini::new();
        assert!(!ini.is_initialized());
        assert_eq!(ini.all_sections().len(), 1);
        assert_eq!(ini.default_section().name(), DEFAULT_SECTION_NAME);
        assert!(ini.section_exists(DEFAULT_SECTION_NAME));
    }

    #[test]
    fn parses_project_file() {
        let (_dir, file_path) = write_temp_file("project.godot", PROJECT);
        let ini = Ini::from_path(&file_path).unwrap();

        assert!(ini.is_initialized());
        assert_eq!(ini.path(), Some(file_path.as_path()));
        assert_eq!(ini.default_section().property("config_version").unwrap(), "4");

        let application = ini.section("application").unwrap();
        assert_eq!(application.property("config/name").unwrap(), "Platformer");
        assert_eq!(
            application.property("run/main_scene").unwrap(),
            "res://Scenes/2dScene.tscn"
        );
        assert_eq!(
            application.property("config/description").unwrap(),
            "A small demo spanning two lines"
        );

        let rendering = ini.section("rendering").unwrap();
        assert!(rendering.boolean_property("vram_compression/import_etc").unwrap());
        assert_eq!(
            rendering.property("environment/default_clear_color").unwrap(),
            "Color( 0.1, 0.1, 0.1, 1 )"
        );
        assert_eq!(
            rendering
                .property_list("environment/default_clear_color", None)
                .unwrap()
                .len(),
            4
        );
    }

    #[test]
    fn multi_line_dictionary_is_joined() {
        let ini = Ini::parse_str(PROJECT);
        let input = ini.section("input").unwrap();
        assert_eq!(
            input.property("ui_page_down").unwrap(),
            r#"{ "deadzone": 0.5, "events": [  ] }"#
        );
    }

    #[test]
    fn sections_point_to_default_section() {
        let ini = Ini::parse_str(PROJECT);
        let application = ini.section("application").unwrap();

        assert_eq!(application.default_section(), Some(ini.default_section_id()));
        let fallback = ini.fallback_of(application).unwrap();
        assert_eq!(fallback.name(), DEFAULT_SECTION_NAME);
        assert_eq!(fallback.property("config_version").unwrap(), "4");
        assert!(ini.fallback_of(ini.default_section()).is_none());
    }

    #[test]
    fn lookup_does_not_consult_fallback() {
        let ini = Ini::parse_str(PROJECT);
        let application = ini.section("application").unwrap();
        assert!(matches!(
            application.property("config_version"),
            Err(PropertyError::NotFound(_))
        ));
    }

    #[test]
    fn parses_section_attributes() {
        let ini = Ini::parse_str("[Name attr=\"X\" id=3]\n[NormalSection]\n");

        let named = ini.section("Name").unwrap();
        assert_eq!(named.attribute("attr"), Some("X"));
        assert_eq!(named.attribute("id"), Some("3"));
        assert_eq!(named.attributes().len(), 2);
        assert!(ini.section("NormalSection").unwrap().attributes().is_empty());
    }

    #[test]
    fn keeps_duplicate_sections() {
        let scene = r#"[gd_scene load_steps=3 format=2]

[ext_resource path="res://player.gd" type="Script" id=1]

[ext_resource path="res://icon.png" type="Texture" id=2]

[node name="Player" type="KinematicBody2D"]
script = ExtResource( 1 )
"#;
        let ini = Ini::parse_str(scene);

        let resources = ini.sections("ext_resource");
        assert_eq!(resources.len(), 2);
        let paths: Vec<_> = resources
            .iter()
            .filter_map(|section| section.attribute("path"))
            .collect();
        assert!(paths.contains(&"res://player.gd"));
        assert!(paths.contains(&"res://icon.png"));

        let first = ini.section("ext_resource").unwrap();
        assert!(resources.iter().any(|section| std::ptr::eq(*section, first)));

        assert_eq!(
            ini.section("node").unwrap().property("script").unwrap(),
            "ExtResource( 1 )"
        );
        assert!(ini.sections("missing").is_empty());
        assert!(ini.section("missing").is_none());
    }

    #[test]
    fn reparse_is_idempotent() {
        let (_dir, file_path) = write_temp_file("project.godot", PROJECT);
        let mut ini = Ini::from_path(&file_path).unwrap();
        let before = ini.all_sections().to_vec();

        ini.update_content().unwrap();
        assert_eq!(ini.all_sections(), before.as_slice());

        ini.update_content().unwrap();
        assert_eq!(ini.all_sections(), before.as_slice());
    }

    #[test]
    fn reparse_discards_renamed_sections_and_picks_up_changes() {
        let (_dir, file_path) = write_temp_file("settings.ini", "[video]\nwidth=800\n");
        let mut ini = Ini::from_path(&file_path).unwrap();
        ini.section_mut("video").unwrap().change_name("renamed");
        assert!(!ini.section_exists("video"));

        fs::write(&file_path, "[video]\nwidth=1024\n").unwrap();
        ini.update_content().unwrap();

        assert!(!ini.section_exists("renamed"));
        assert_eq!(ini.section("video").unwrap().integer_property("width").unwrap(), 1024);
    }

    #[test]
    fn reparse_of_text_source() {
        let mut ini = Ini::parse_str("[a]\nkey=1\n");
        ini.update_content().unwrap();
        assert_eq!(ini.all_sections().len(), 2);
        assert_eq!(ini.path(), None);
    }

    #[test]
    fn returns_not_found_for_missing_file() {
        let mut ini = Ini::new();
        let err = ini.load_from_path("non_existent_file.godot").unwrap_err();
        assert!(matches!(err, IniError::NotFound { .. }));
        assert!(!err.is_io_failure());
        assert!(!ini.is_initialized());
    }

    #[test]
    fn rejects_unlisted_extension() {
        let (_dir, file_path) = write_temp_file("notes.txt", "[a]\nkey=1\n");
        let err = Ini::from_path(&file_path).unwrap_err();
        assert!(matches!(err, IniError::InvalidExtension { .. }));
        assert!(err.is_io_failure());
    }

    #[test]
    fn accepts_extension_added_by_caller() {
        let (_dir, file_path) = write_temp_file("notes.txt", "[a]\nkey=1\n");
        let mut ini = Ini::with_options(IniOptions::default().with_extension("txt"));
        ini.load_from_path(&file_path).unwrap();
        assert_eq!(ini.section("a").unwrap().property("key").unwrap(), "1");
    }

    #[test]
    fn failed_reparse_leaves_fresh_default_section() {
        let (dir, file_path) = write_temp_file("project.godot", PROJECT);
        let mut ini = Ini::from_path(&file_path).unwrap();
        drop(dir);

        assert!(matches!(ini.update_content(), Err(IniError::NotFound { .. })));
        assert!(!ini.is_initialized());
        assert_eq!(ini.all_sections().len(), 1);
        assert!(ini.default_section().properties().is_empty());
    }

    #[test]
    fn reports_read_fault_as_io_error() {
        let (_dir, file_path) = write_temp_file("broken.cfg", "");
        fs::write(&file_path, [b'k', b'=', 0xFF, 0xFE, b'\n']).unwrap();
        let err = Ini::from_path(&file_path).unwrap_err();
        assert!(matches!(err, IniError::Io(_)));
    }

    #[test]
    #[should_panic(expected = "already initialized")]
    fn loading_twice_panics() {
        let mut ini = Ini::parse_str("key=value");
        ini.load_from_str("key=value");
    }

    #[test]
    #[should_panic(expected = "not initialized")]
    fn updating_before_load_panics() {
        let mut ini = Ini::new();
        let _ = ini.update_content();
    }

    #[test]
    fn typed_defaults_on_parsed_document() {
        let ini = Ini::parse_str("[display]\nwindow/size/width=1280\n");
        let display = ini.section("display").unwrap();
        assert_eq!(display.integer_property_or_default("missing", 7), 7);
        assert!(display.integer_property("missing").is_err());
        assert_eq!(display.integer_property("window/size/width").unwrap(), 1280);
    }
}
