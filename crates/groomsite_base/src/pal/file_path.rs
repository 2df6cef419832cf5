use relative_path::{RelativePath, RelativePathBuf};
use std::path::{Path, PathBuf};

/* 📖 # Why use RelativePathBuf for FilePath?
Every PAL path is relative to the PAL's base directory, never an absolute system path.
The same value identifies a file in RealPal and in MockPal, which is what lets the
change watcher key its snapshots by FilePath on either implementation.
*/

/// File path relative to the PAL base directory.
///
/// ```
/// use groomsite_base::FilePath;
///
/// let site = FilePath::from("clean_site");
/// assert_eq!(site.join("austin/index.html").to_string(), "clean_site/austin/index.html");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilePath(RelativePathBuf);

impl FilePath {
    pub fn as_relative(&self) -> &RelativePath {
        &self.0
    }

    /// Converts to a regular Path (still relative) for use with std::fs operations.
    pub fn as_path(&self) -> &Path {
        Path::new(self.as_relative().as_str())
    }

    pub fn into_path_buf(self) -> PathBuf {
        PathBuf::from(self.0.as_str())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Appends `segment`, normalizing `.` and `..` components.
    pub fn join(&self, segment: impl AsRef<str>) -> FilePath {
        Self(self.0.join_normalized(segment.as_ref()))
    }

    /// Parent directory, or None for a single-component path.
    pub fn parent(&self) -> Option<FilePath> {
        self.0
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .map(FilePath::from)
    }

    pub fn file_name(&self) -> Option<&str> {
        self.0.file_name()
    }

    pub fn extension(&self) -> Option<&str> {
        self.0.extension()
    }

    /// True for the empty path or `.`, both of which denote the base directory.
    pub fn is_base(&self) -> bool {
        self.0.normalize().as_str().is_empty()
    }

    /// True if `base` is a component-wise prefix of this path.
    pub fn starts_with(&self, base: &FilePath) -> bool {
        base.is_base() || self.0.normalize().starts_with(base.0.normalize())
    }
}

impl From<&str> for FilePath {
    fn from(s: &str) -> Self {
        Self(RelativePathBuf::from(s))
    }
}

impl From<String> for FilePath {
    fn from(s: String) -> Self {
        Self(RelativePathBuf::from(s))
    }
}

impl From<RelativePathBuf> for FilePath {
    fn from(p: RelativePathBuf) -> Self {
        Self(p)
    }
}

impl From<&RelativePath> for FilePath {
    fn from(p: &RelativePath) -> Self {
        Self(p.to_relative_path_buf())
    }
}

impl From<&Path> for FilePath {
    fn from(p: &Path) -> Self {
        // RelativePathBuf::from_path rejects absolute paths; fall back to the lossy string
        match RelativePathBuf::from_path(p) {
            Ok(relative) => Self(relative),
            Err(_) => Self(RelativePathBuf::from(p.to_string_lossy().into_owned())),
        }
    }
}

impl std::fmt::Display for FilePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<RelativePath> for FilePath {
    fn as_ref(&self) -> &RelativePath {
        &self.0
    }
}
