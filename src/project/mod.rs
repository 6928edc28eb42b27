use std::path::{Path, PathBuf};

use log::debug;
use serde::Serialize;
use thiserror::Error;

use crate::filesystem::{self, FilesystemError};
use crate::ini::{Ini, IniError, Section};
use crate::resource::{self, Resource, ResourceError};

/// Errors raised while opening or inspecting a project.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// The project location is not a directory.
    #[error("Target location {0:?} is not a valid directory")]
    NotADirectory(PathBuf),
    /// None of the version's project files exist in the directory.
    #[error("Directory {dir:?} does not contain any of the project files {expected:?}")]
    ProjectFileNotFound {
        dir: PathBuf,
        expected: &'static [&'static str],
    },
    /// The path could not be resolved.
    #[error("Invalid path: {0}")]
    Path(#[from] FilesystemError),
    /// The project file failed to load.
    #[error("Failed to load project file: {0}")]
    Config(#[from] IniError),
    /// A resource referenced by the project could not be described.
    #[error("Invalid project resource: {0}")]
    Resource(#[from] ResourceError),
}

/// Major engine release a project targets.
///
/// The release decides the project file name, the scene file extensions,
/// and the keys holding project metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EngineVersion {
    V1,
    V2,
    V3,
    V4,
}

impl EngineVersion {
    /// Every supported release, oldest first.
    pub const ALL: [EngineVersion; 4] = [Self::V1, Self::V2, Self::V3, Self::V4];

    /// The release recommended for new projects.
    pub fn recommended() -> Self {
        Self::V3
    }

    /// Looks up a release by its major version number.
    ///
    /// # Arguments
    ///
    /// * `code` - Major version, such as `3`.
    ///
    /// # Returns
    ///
    /// The matching release, or `None` for an unsupported number.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|version| version.code() == code)
    }

    /// Major version number of the release.
    pub fn code(self) -> u32 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
            Self::V3 => 3,
            Self::V4 => 4,
        }
    }

    /// File names that mark a project root.
    pub fn project_files(self) -> &'static [&'static str] {
        match self {
            Self::V1 | Self::V2 => &["engine.cfg"],
            Self::V3 | Self::V4 => &["project.godot"],
        }
    }

    /// Extensions of scene files.
    pub fn scene_extensions(self) -> &'static [&'static str] {
        match self {
            Self::V1 => &["scn"],
            Self::V2 | Self::V3 | Self::V4 => &["tscn", "scn"],
        }
    }

    fn is_legacy(self) -> bool {
        matches!(self, Self::V1 | Self::V2)
    }
}

/// Rendering backend configured for a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VideoDriver {
    #[serde(rename = "GLES2")]
    Gles2,
    #[serde(rename = "GLES3")]
    Gles3,
    Vulkan,
}

impl VideoDriver {
    /// Name the engine uses in its configuration files.
    pub fn name(self) -> &'static str {
        match self {
            Self::Gles2 => "GLES2",
            Self::Gles3 => "GLES3",
            Self::Vulkan => "Vulkan",
        }
    }

    /// Looks up a driver by name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        [Self::Gles2, Self::Gles3, Self::Vulkan]
            .into_iter()
            .find(|driver| driver.name().eq_ignore_ascii_case(name.trim()))
    }
}

/// Serializable summary of a project's metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectInfo {
    pub version: EngineVersion,
    pub name: Option<String>,
    pub description: Option<String>,
    pub main_scene: Option<String>,
    pub icon: Option<String>,
    pub video_driver: Option<VideoDriver>,
}

/// An engine project on disk, read through its project file.
#[derive(Debug)]
pub struct Project {
    root: PathBuf,
    project_file: PathBuf,
    version: EngineVersion,
    config: Ini,
}

impl Project {
    /// Opens the project in `dir`, expecting the layout of `version`.
    ///
    /// Only the top level of `dir` is searched for the project file.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::NotADirectory` if `dir` is not a directory,
    /// `ProjectError::ProjectFileNotFound` if no project file is present, and
    /// `ProjectError::Config` if the project file cannot be parsed.
    pub fn open<P: AsRef<Path>>(dir: P, version: EngineVersion) -> Result<Self, ProjectError> {
        let root = filesystem::expand_home(dir)?;
        if !filesystem::dir_exists(&root) {
            return Err(ProjectError::NotADirectory(root));
        }

        let project_file = version
            .project_files()
            .iter()
            .map(|name| root.join(name))
            .find(|path| filesystem::file_exists(path))
            .ok_or_else(|| ProjectError::ProjectFileNotFound {
                dir: root.clone(),
                expected: version.project_files(),
            })?;

        let config = Ini::from_path(&project_file)?;
        debug!("opened {version:?} project at {}", root.display());

        Ok(Self {
            root,
            project_file,
            version,
            config,
        })
    }

    /// Project root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the `project.godot` or `engine.cfg` file.
    pub fn project_file(&self) -> &Path {
        &self.project_file
    }

    /// Release the project targets.
    pub fn version(&self) -> EngineVersion {
        self.version
    }

    /// Parsed project file.
    pub fn config(&self) -> &Ini {
        &self.config
    }

    /// Reparses the project file.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::Config` if the file can no longer be read.
    pub fn reload(&mut self) -> Result<(), ProjectError> {
        self.config.update_content()?;
        Ok(())
    }

    fn application(&self) -> Option<&Section> {
        self.config.section("application")
    }

    fn application_property(&self, legacy_key: &str, key: &str) -> Option<&str> {
        let key = if self.version.is_legacy() { legacy_key } else { key };
        self.application()?.property(key).ok()
    }

    /// The project name from the `application` section.
    pub fn name(&self) -> Option<&str> {
        self.application_property("name", "config/name")
    }

    /// The project description. Only recorded by V3 and later projects.
    pub fn description(&self) -> Option<&str> {
        if self.version.is_legacy() {
            return None;
        }
        self.application()?.property("config/description").ok()
    }

    /// `res://` path of the scene run on startup.
    pub fn main_scene_path(&self) -> Option<&str> {
        self.application_property("main_scene", "run/main_scene")
    }

    /// `res://` path of the project icon.
    pub fn icon_path(&self) -> Option<&str> {
        self.application_property("icon", "config/icon")
    }

    /// The scene run on startup, resolved against the project root.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::Resource` if the resolved path is a directory.
    pub fn main_scene(&self) -> Result<Option<Resource>, ProjectError> {
        self.main_scene_path()
            .map(|path| self.resource(path))
            .transpose()
    }

    /// The project icon, resolved against the project root.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::Resource` if the resolved path is a directory.
    pub fn icon(&self) -> Result<Option<Resource>, ProjectError> {
        self.icon_path().map(|path| self.resource(path)).transpose()
    }

    /// The configured video driver, falling back to the version's default
    /// when nothing is configured. `None` for unrecognized driver names.
    pub fn video_driver(&self) -> Option<VideoDriver> {
        let (section, key, default) = if self.version.is_legacy() {
            ("display", "driver", VideoDriver::Gles2)
        } else {
            ("rendering", "quality/driver/driver_name", VideoDriver::Gles3)
        };

        match self.config.section(section) {
            Some(section) => VideoDriver::from_name(section.property_or(key, default.name())),
            None => Some(default),
        }
    }

    /// Describes a project file from its `res://` (or root-relative) path.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::Resource` if the resolved path is a directory.
    pub fn resource(&self, path: &str) -> Result<Resource, ProjectError> {
        Ok(Resource::new(resource::resolve_path(&self.root, path))?)
    }

    /// Converts a path inside the project to its `res://` form.
    pub fn resource_path<P: AsRef<Path>>(&self, path: P) -> Option<String> {
        resource::resolve_resource(&self.root, path)
    }

    /// Collects the project metadata into a serializable summary.
    pub fn info(&self) -> ProjectInfo {
        ProjectInfo {
            version: self.version,
            name: self.name().map(str::to_string),
            description: self.description().map(str::to_string),
            main_scene: self.main_scene_path().map(str::to_string),
            icon: self.icon_path().map(str::to_string),
            video_driver: self.video_driver(),
        }
    }
}
