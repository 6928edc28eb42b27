/// The `convert` module provides the text-to-value conversions used by typed
/// property access. It includes quote stripping, boolean literal parsing, and
/// strict numeric parsing for every supported width.
///
/// All failures are reported as `ConvertError` values; nothing here panics.
pub mod convert;

/// The `ini` module implements the configuration dialect shared by the
/// engine's project files and its text scene and resource files.
///
/// It provides the `Ini` document, which parses bracketed sections (with
/// optional header attributes) and `key=value` properties, and the `Section`
/// type with string, numeric, boolean and list accessors.
pub mod ini;

/// The `filesystem` module provides helpers for working with user-supplied
/// paths, such as `~` expansion, existence checks and line-by-line reading.
pub mod filesystem;

/// The `resource` module describes files that belong to a project. It
/// resolves `res://` paths, classifies files by extension, and exposes the
/// parsed content of project, scene and resource files.
pub mod resource;

/// The `project` module reads project metadata (name, description, main
/// scene, icon and video driver) from a project's `project.godot` or
/// `engine.cfg` file, following the layout of each engine release.
pub mod project;

pub use ini::{Ini, IniError, IniOptions, PropertyError, Section, SectionId};
