use std::io::{Read, Seek, Write};
use std::sync::Arc;
use std::time::SystemTime;

use crate::{GroomsiteError, GroomsiteResult, ResultExt};

use super::file_path::FilePath;
use super::http::{HttpServerConfig, HttpServerHandle, HttpService};

/// Trait combining Read + Seek for file operations.
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/* 📖 # What goes through the Pal trait
Every filesystem access and every listening socket the engine needs.
The site generator, the change watcher and the dev server all take a PalHandle,
so their tests run against MockPal with no disk or network side effects.
*/

/// Platform Abstraction Layer.
///
/// `RealPal` resolves paths against a base directory on disk, `MockPal` keeps everything in memory.
pub trait Pal: std::fmt::Debug + Send + Sync + 'static {
    /// True if a file or directory exists at the given path.
    fn file_exists(&self, path: &FilePath) -> GroomsiteResult<bool>;

    fn read_file(&self, path: &FilePath) -> GroomsiteResult<Box<dyn ReadSeek + 'static>>;

    fn read_file_to_bytes(&self, path: &FilePath) -> GroomsiteResult<Vec<u8>> {
        let mut reader = self.read_file(path)?;
        let mut contents = Vec::new();
        reader
            .read_to_end(&mut contents)
            .map_err(|e| Box::new(GroomsiteError::file_error(path.as_path(), e)))?;
        Ok(contents)
    }

    /// Read entire file contents as a UTF-8 string.
    fn read_file_to_string(&self, path: &FilePath) -> GroomsiteResult<String> {
        let contents = self.read_file_to_bytes(path)?;
        String::from_utf8(contents).map_err(|_e| crate::err!("File is not valid UTF-8: {}", path))
    }

    /// Create a new file, overwriting if it exists. The parent directory must exist.
    fn create_file(&self, path: &FilePath) -> GroomsiteResult<Box<dyn Write>>;

    /// Write a whole file, creating parent directories as needed.
    fn write_file(&self, path: &FilePath, contents: &[u8]) -> GroomsiteResult<()> {
        if let Some(parent) = path.parent() {
            self.create_directory_all(&parent)?;
        }
        let mut writer = self.create_file(path)?;
        writer
            .write_all(contents)
            .and_then(|()| writer.flush())
            .map_err(|e| Box::new(GroomsiteError::file_error(path.as_path(), e)))
            .with_context(|| format!("Failed to write {}", path))
    }

    fn create_directory_all(&self, path: &FilePath) -> GroomsiteResult<()>;

    /// Last modification time of a file.
    fn modified_time(&self, path: &FilePath) -> GroomsiteResult<SystemTime>;

    /// Walk a directory tree, yielding regular files whose path relative to `path`
    /// matches one of the glob patterns.
    fn walk_directory(
        &self,
        path: &FilePath,
        globs: &[String],
    ) -> GroomsiteResult<Box<dyn Iterator<Item = GroomsiteResult<FilePath>> + '_>>;

    /// Start an HTTP server with the given service.
    ///
    /// Fails with `ErrorKind::Bind` if the address cannot be bound.
    fn start_http_server(
        &self,
        service: Box<dyn HttpService>,
        config: HttpServerConfig,
    ) -> GroomsiteResult<HttpServerHandle>;
}

/// Shared handle to a PAL implementation.
#[derive(Debug, Clone)]
pub struct PalHandle(Arc<dyn Pal>);

impl PalHandle {
    pub fn new(pal: impl Pal + 'static) -> Self {
        Self(Arc::new(pal))
    }
}

impl std::ops::Deref for PalHandle {
    type Target = dyn Pal;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pal::mock::MockPal;

    #[test]
    fn test_write_file_creates_parent_directories() {
        let mock = MockPal::new();
        let pal = PalHandle::new(mock.clone());

        pal.write_file(&FilePath::from("clean_site/austin/index.html"), b"<html>")
            .unwrap();

        assert!(mock.has_directory(&FilePath::from("clean_site/austin")));
        assert_eq!(
            pal.read_file_to_string(&FilePath::from("clean_site/austin/index.html"))
                .unwrap(),
            "<html>"
        );
    }

    #[test]
    fn test_read_file_to_string_rejects_invalid_utf8() {
        let mock = MockPal::new();
        mock.add_file(FilePath::from("logo.png"), vec![0xff, 0xfe, 0x00]);

        let error = mock
            .read_file_to_string(&FilePath::from("logo.png"))
            .unwrap_err();
        assert_eq!(error.to_string(), "File is not valid UTF-8: logo.png");
        assert_eq!(
            mock.read_file_to_bytes(&FilePath::from("logo.png")).unwrap(),
            vec![0xff, 0xfe, 0x00]
        );
    }
}
