use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Represents errors that can occur while resolving user-supplied paths.
#[derive(Debug, Error)]
pub enum FilesystemError {
    /// Error for empty path input.
    #[error("Path is empty")]
    EmptyPath,
    /// Error for paths that are not valid UTF-8 and cannot be expanded.
    #[error("Path is not valid UTF-8: {0:?}")]
    NonUtf8Path(PathBuf),
    /// Error when the home directory cannot be determined.
    #[error("Home directory not found")]
    HomeDirNotFound,
    /// Error for unsupported user expansion in paths (e.g., ~user).
    #[error("User expansion (~user) not supported")]
    UserExpansionNotSupported,
}

/// Checks if a directory exists at the given path.
///
/// # Arguments
///
/// * `dir` - Path to check.
///
/// # Returns
///
/// `true` if the directory exists, `false` otherwise.
pub fn dir_exists<P: AsRef<Path>>(dir: P) -> bool {
    dir.as_ref().is_dir()
}

/// Checks if a file exists at the given path.
///
/// # Arguments
///
/// * `file` - Path to check.
///
/// # Returns
///
/// `true` if the file exists, `false` otherwise.
pub fn file_exists<P: AsRef<Path>>(file: P) -> bool {
    file.as_ref().is_file()
}

/// Returns the extension of a file name, without the leading dot.
///
/// `None` is returned for paths without an extension or whose extension is
/// not valid UTF-8.
pub fn extension_of<P: AsRef<Path>>(path: P) -> Option<String> {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_string)
}

/// Opens a file for line-by-line reading.
///
/// # Errors
///
/// Returns an `io::Error` if the file cannot be opened.
pub fn read_lines<P: AsRef<Path>>(path: P) -> io::Result<Lines<BufReader<File>>> {
    let file = File::open(path)?;
    Ok(BufReader::new(file).lines())
}

/// Expands a path that starts with `~` to the user's home directory.
///
/// # Arguments
///
/// * `path` - Path, possibly starting with `~`.
///
/// # Errors
///
/// Returns `FilesystemError` if the path is empty, names another user's home
/// (`~user`), or the home directory cannot be determined.
///
/// # Returns
///
/// The expanded `PathBuf`, or the path unchanged if it does not start with `~`.
pub fn expand_home<P: AsRef<Path>>(path: P) -> Result<PathBuf, FilesystemError> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(FilesystemError::EmptyPath);
    }
    let raw = path
        .to_str()
        .ok_or_else(|| FilesystemError::NonUtf8Path(path.to_path_buf()))?;
    if !raw.starts_with('~') {
        return Ok(path.to_path_buf());
    }
    let home = dirs::home_dir().ok_or(FilesystemError::HomeDirNotFound)?;
    if raw == "~" {
        return Ok(home);
    }
    if let Some(without_tilde) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        return Ok(home.join(without_tilde));
    }
    Err(FilesystemError::UserExpansionNotSupported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn keeps_plain_paths() {
        let path = expand_home("projects/game/project.godot").unwrap();
        assert_eq!(path, PathBuf::from("projects/game/project.godot"));
    }

    #[test]
    fn expands_home_prefix() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~").unwrap(), home);
            assert_eq!(expand_home("~/game").unwrap(), home.join("game"));
        }
    }

    #[test]
    fn rejects_empty_path() {
        assert!(matches!(expand_home(""), Err(FilesystemError::EmptyPath)));
    }

    #[test]
    fn rejects_other_user_expansion() {
        if dirs::home_dir().is_some() {
            assert!(matches!(
                expand_home("~someone/game"),
                Err(FilesystemError::UserExpansionNotSupported)
            ));
        }
    }

    #[test]
    fn reads_extension() {
        assert_eq!(extension_of("scenes/main.tscn").as_deref(), Some("tscn"));
        assert_eq!(extension_of("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(extension_of("README"), None);
    }

    #[test]
    fn checks_existence() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("project.godot");
        fs::write(&file, "config_version=4\n").unwrap();

        assert!(dir_exists(dir.path()));
        assert!(!dir_exists(&file));
        assert!(file_exists(&file));
        assert!(!file_exists(dir.path().join("missing.godot")));
    }

    #[test]
    fn reads_file_lines() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("engine.cfg");
        fs::write(&file, "[application]\r\nname=\"Old\"\n").unwrap();

        let lines: Vec<String> = read_lines(&file).unwrap().map(Result::unwrap).collect();
        assert_eq!(lines, vec!["[application]", "name=\"Old\""]);
    }

    #[test]
    fn read_lines_fails_for_missing_file() {
        assert!(read_lines("non_existent_file.cfg").is_err());
    }
}
