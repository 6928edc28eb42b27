use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::filesystem::{self, FilesystemError};
use crate::ini::{Ini, IniError, VALID_EXTENSIONS};

/// Protocol prefix the engine uses for paths relative to the project root.
pub const RESOURCE_PROTOCOL: &str = "res://";

/// Picture extensions that can be previewed without the engine.
pub const PREVIEW_EXTENSIONS: [&str; 4] = ["bmp", "jpg", "jpeg", "png"];

/// Errors raised while accessing a project resource.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The resource path points to a directory.
    #[error("Target location {0:?} is not a valid file")]
    NotAFile(PathBuf),
    /// The resource cannot be parsed as a configuration document.
    #[error("Resource {0:?} is not readable")]
    NotReadable(PathBuf),
    /// The path could not be resolved.
    #[error("Invalid path: {0}")]
    Path(#[from] FilesystemError),
    /// The resource content failed to load.
    #[error("Failed to load resource content: {0}")]
    Content(#[from] IniError),
}

/// Kind of file found in a project, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Project,
    Scene,
    Picture,
    Script,
    NativeScript,
    Font,
    Model3d,
    Other,
    Unknown,
}

impl ResourceType {
    const TABLE: [(ResourceType, &'static [&'static str]); 8] = [
        (ResourceType::Project, &["cfg", "godot"]),
        (ResourceType::Scene, &["scn", "tscn"]),
        (
            ResourceType::Picture,
            &["bmp", "dds", "exr", "hdr", "jpg", "jpeg", "png", "tga", "svg", "svgz", "webp"],
        ),
        (ResourceType::Script, &["gd", "cs", "c", "cpp", "h", "cxx", "hpp"]),
        (ResourceType::NativeScript, &["gdns"]),
        (ResourceType::Font, &["ttf", "otf"]),
        (ResourceType::Model3d, &["gltf", "glb", "dae", "obj", "escn", "fbx"]),
        (
            ResourceType::Other,
            &["material", "shader", "tres", "res", "atlastex", "anim"],
        ),
    ];

    /// Detects the resource type from a file extension (without the dot).
    pub fn from_extension(extension: &str) -> Self {
        Self::TABLE
            .iter()
            .find(|(_, extensions)| extensions.contains(&extension))
            .map_or(ResourceType::Unknown, |(kind, _)| *kind)
    }

    /// Extensions mapped to this type.
    pub fn extensions(self) -> &'static [&'static str] {
        Self::TABLE
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, extensions)| *extensions)
            .unwrap_or(&[])
    }
}

/// Resolves an engine resource path against the project root.
///
/// A leading `res://` is stripped before joining, so both
/// `res://Scenes/Main.tscn` and `Scenes/Main.tscn` resolve to
/// `<root>/Scenes/Main.tscn`.
pub fn resolve_path<P: AsRef<Path>>(root: P, resource: &str) -> PathBuf {
    let relative = resource.strip_prefix(RESOURCE_PROTOCOL).unwrap_or(resource);
    root.as_ref().join(relative)
}

/// Converts a filesystem path inside `root` back to a `res://` path.
///
/// Returns `None` if `path` is not inside `root`.
pub fn resolve_resource<P: AsRef<Path>, Q: AsRef<Path>>(root: P, path: Q) -> Option<String> {
    let relative = path.as_ref().strip_prefix(root.as_ref()).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Some(format!("{}{}", RESOURCE_PROTOCOL, parts.join("/")))
}

/// A file that belongs to a project.
///
/// Readable resources (project, scene and text resource files) expose their
/// content as an [`Ini`] document, loaded on first access.
#[derive(Debug)]
pub struct Resource {
    path: PathBuf,
    resource_type: ResourceType,
    readable: bool,
    displayable: bool,
    content: Option<Ini>,
}

impl Resource {
    /// Describes the file at `path`. The file does not need to exist yet.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::NotAFile` if `path` is a directory.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ResourceError> {
        let path = filesystem::expand_home(path)?;
        if filesystem::dir_exists(&path) {
            return Err(ResourceError::NotAFile(path));
        }

        let extension = filesystem::extension_of(&path).unwrap_or_default();
        let resource_type = ResourceType::from_extension(&extension);
        let readable = VALID_EXTENSIONS.contains(&extension.as_str());
        let displayable =
            resource_type == ResourceType::Picture && PREVIEW_EXTENSIONS.contains(&extension.as_str());

        Ok(Self {
            path,
            resource_type,
            readable,
            displayable,
            content: None,
        })
    }

    /// Absolute location of the file, with `~` expanded.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Kind of file, decided by its extension.
    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// Returns `true` for `.scn` and `.tscn` files.
    pub fn is_scene(&self) -> bool {
        self.resource_type == ResourceType::Scene
    }

    /// Returns `true` if [`Resource::content`] can parse this file.
    pub fn is_readable(&self) -> bool {
        self.readable
    }

    /// Returns `true` for pictures that can be previewed directly.
    pub fn is_displayable(&self) -> bool {
        self.displayable
    }

    /// Returns `true` if the file currently exists on disk.
    pub fn exists(&self) -> bool {
        filesystem::file_exists(&self.path)
    }

    /// Returns the parsed content, loading it on first call.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::NotReadable` for resources whose extension is
    /// not a configuration format, or `ResourceError::Content` if loading fails.
    pub fn content(&mut self) -> Result<&Ini, ResourceError> {
        if !self.readable {
            return Err(ResourceError::NotReadable(self.path.clone()));
        }
        let ini = match self.content.take() {
            Some(ini) => ini,
            None => Ini::from_path(&self.path)?,
        };
        Ok(self.content.insert(ini))
    }

    /// Reparses the content if it was already loaded.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::Content` if reloading fails.
    pub fn reload_content(&mut self) -> Result<(), ResourceError> {
        if let Some(ini) = self.content.as_mut() {
            ini.update_content()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn detects_resource_types() {
        assert_eq!(ResourceType::from_extension("godot"), ResourceType::Project);
        assert_eq!(ResourceType::from_extension("tscn"), ResourceType::Scene);
        assert_eq!(ResourceType::from_extension("webp"), ResourceType::Picture);
        assert_eq!(ResourceType::from_extension("gd"), ResourceType::Script);
        assert_eq!(ResourceType::from_extension("gdns"), ResourceType::NativeScript);
        assert_eq!(ResourceType::from_extension("otf"), ResourceType::Font);
        assert_eq!(ResourceType::from_extension("glb"), ResourceType::Model3d);
        assert_eq!(ResourceType::from_extension("tres"), ResourceType::Other);
        assert_eq!(ResourceType::from_extension("zip"), ResourceType::Unknown);
        assert_eq!(ResourceType::from_extension("PNG"), ResourceType::Unknown);
    }

    #[test]
    fn lists_extensions_per_type() {
        assert_eq!(ResourceType::Scene.extensions(), &["scn", "tscn"]);
        assert!(ResourceType::Unknown.extensions().is_empty());
    }

    #[test]
    fn resolves_resource_paths() {
        let root = Path::new("/games/platformer");
        assert_eq!(
            resolve_path(root, "res://Scenes/Main.tscn"),
            root.join("Scenes/Main.tscn")
        );
        assert_eq!(resolve_path(root, "icon.png"), root.join("icon.png"));
    }

    #[test]
    fn converts_paths_back_to_resources() {
        let root = Path::new("/games/platformer");
        assert_eq!(
            resolve_resource(root, root.join("Scenes").join("Main.tscn")).as_deref(),
            Some("res://Scenes/Main.tscn")
        );
        assert_eq!(resolve_resource(root, "/elsewhere/icon.png"), None);
    }

    #[test]
    fn classifies_resource_flags() {
        let picture = Resource::new("/games/platformer/icon.png").unwrap();
        assert_eq!(picture.resource_type(), ResourceType::Picture);
        assert!(picture.is_displayable());
        assert!(!picture.is_readable());

        let svg = Resource::new("/games/platformer/logo.svg").unwrap();
        assert!(!svg.is_displayable());

        let scene = Resource::new("/games/platformer/Main.tscn").unwrap();
        assert!(scene.is_scene());
        assert!(scene.is_readable());
        assert!(!scene.is_displayable());
    }

    #[test]
    fn rejects_directories() {
        let dir = tempdir().unwrap();
        assert!(matches!(Resource::new(dir.path()), Err(ResourceError::NotAFile(_))));
    }

    #[test]
    fn loads_scene_content_lazily() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Main.tscn");
        fs::write(
            &path,
            "[gd_scene load_steps=2 format=2]\n\n[node name=\"Main\" type=\"Node2D\"]\n",
        )
        .unwrap();

        let mut scene = Resource::new(&path).unwrap();
        assert!(scene.exists());

        let content = scene.content().unwrap();
        assert_eq!(
            content.section("gd_scene").unwrap().attribute("load_steps"),
            Some("2")
        );
        assert_eq!(content.section("node").unwrap().attribute("name"), Some("Main"));

        fs::write(&path, "[gd_scene load_steps=3 format=2]\n").unwrap();
        assert_eq!(
            scene.content().unwrap().section("gd_scene").unwrap().attribute("load_steps"),
            Some("2")
        );
        scene.reload_content().unwrap();
        assert_eq!(
            scene.content().unwrap().section("gd_scene").unwrap().attribute("load_steps"),
            Some("3")
        );
    }

    #[test]
    fn refuses_content_of_unreadable_resource() {
        let mut picture = Resource::new("/games/platformer/icon.png").unwrap();
        assert!(matches!(picture.content(), Err(ResourceError::NotReadable(_))));
    }

    #[test]
    fn reports_missing_readable_resource() {
        let mut scene = Resource::new("non_existent_scene.tscn").unwrap();
        assert!(matches!(
            scene.content(),
            Err(ResourceError::Content(IniError::NotFound { .. }))
        ));
    }
}
