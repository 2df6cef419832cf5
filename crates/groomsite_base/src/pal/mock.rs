use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

use crate::GroomsiteError;
use crate::GroomsiteResult;
use crate::error::ErrorKind;

use super::FilePath;
use super::http::{HttpRequest, HttpResponse, HttpServerConfig, HttpServerHandle, HttpService};
use super::real_pal::build_glob_set;
use super::traits::{Pal, ReadSeek};

/* 📖 # How MockPal models time
Every write advances a logical clock by one second and stamps the file with it.
Two writes to the same file therefore always produce different modification times,
which keeps change detection tests independent of wall-clock resolution.
*/

/// In-memory PAL implementation for testing.
///
/// Clones share the same storage, so a test can keep one clone for assertions
/// while handing another to the code under test.
///
/// ```
/// use groomsite_base::{pal::MockPal, Pal, FilePath};
///
/// let mock = MockPal::new();
/// mock.add_file(FilePath::from("index.html"), b"<html>".to_vec());
/// let content = mock.read_file_to_string(&FilePath::from("index.html")).unwrap();
/// assert_eq!(content, "<html>");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockPal {
    state: Arc<Mutex<MockState>>,
}

#[derive(Debug, Default)]
struct MockState {
    files: BTreeMap<FilePath, MockFile>,
    directories: HashSet<FilePath>,
    clock_seconds: u64,
    broken_metadata: HashSet<FilePath>,
    occupied_ports: HashSet<u16>,
    http_servers: HashMap<u16, Arc<dyn HttpService>>,
    next_port: u16,
}

#[derive(Debug, Clone)]
struct MockFile {
    content: Vec<u8>,
    modified: SystemTime,
}

impl MockState {
    fn tick(&mut self) -> SystemTime {
        self.clock_seconds += 1;
        SystemTime::UNIX_EPOCH + Duration::from_secs(self.clock_seconds)
    }

    /// Directories exist if created explicitly or implied by a stored file below them.
    fn directory_exists(&self, path: &FilePath) -> bool {
        path.is_base()
            || self.directories.contains(path)
            || self
                .files
                .keys()
                .any(|file| file != path && file.starts_with(path))
    }

    fn store(&mut self, path: FilePath, content: Vec<u8>) {
        let modified = self.tick();
        self.files.insert(path, MockFile { content, modified });
    }
}

impl MockPal {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add (or overwrite) a file, stamping it with the next logical time.
    pub fn add_file(&self, path: FilePath, content: Vec<u8>) {
        self.state().store(path, content);
    }

    /// Bump a file's modification time without changing its content.
    pub fn touch(&self, path: &FilePath) {
        let mut state = self.state();
        let modified = state.tick();
        if let Some(file) = state.files.get_mut(path) {
            file.modified = modified;
        }
    }

    pub fn set_modified(&self, path: &FilePath, modified: SystemTime) {
        if let Some(file) = self.state().files.get_mut(path) {
            file.modified = modified;
        }
    }

    pub fn remove_file(&self, path: &FilePath) {
        self.state().files.remove(path);
    }

    /// Make `modified_time` fail for a file that is still listed by `walk_directory`,
    /// as happens when a file disappears mid-walk.
    pub fn break_metadata(&self, path: FilePath) {
        self.state().broken_metadata.insert(path);
    }

    pub fn has_directory(&self, path: &FilePath) -> bool {
        self.state().directories.contains(path)
    }

    /// All stored file paths in sorted order.
    pub fn file_paths(&self) -> Vec<FilePath> {
        self.state().files.keys().cloned().collect()
    }

    /// Mark a port as taken by some other process.
    pub fn occupy_port(&self, port: u16) {
        self.state().occupied_ports.insert(port);
    }

    /// Hand a request to the service registered on `port`.
    pub fn simulate_request(
        &self,
        port: u16,
        request: HttpRequest,
    ) -> GroomsiteResult<HttpResponse> {
        // Released before handling so the service can read through this PAL.
        let service = self
            .state()
            .http_servers
            .get(&port)
            .cloned()
            .ok_or_else(|| crate::err!("No HTTP server registered on port {}", port))?;
        service.handle_request(request)
    }

    pub fn http_server_count(&self) -> usize {
        self.state().http_servers.len()
    }
}

fn not_found(path: &FilePath) -> Box<GroomsiteError> {
    Box::new(GroomsiteError::file_error(
        path.as_path(),
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path),
        ),
    ))
}

impl Pal for MockPal {
    fn file_exists(&self, path: &FilePath) -> GroomsiteResult<bool> {
        let state = self.state();
        Ok(state.files.contains_key(path) || state.directory_exists(path))
    }

    fn read_file(&self, path: &FilePath) -> GroomsiteResult<Box<dyn ReadSeek + 'static>> {
        let state = self.state();
        let file = state.files.get(path).ok_or_else(|| not_found(path))?;
        Ok(Box::new(Cursor::new(file.content.clone())))
    }

    fn create_file(&self, path: &FilePath) -> GroomsiteResult<Box<dyn Write>> {
        Ok(Box::new(MockFileWriter {
            path: path.clone(),
            state: Arc::clone(&self.state),
            buffer: Vec::new(),
        }))
    }

    fn create_directory_all(&self, path: &FilePath) -> GroomsiteResult<()> {
        let mut state = self.state();
        let mut current = Some(path.clone());
        while let Some(directory) = current {
            current = directory.parent();
            state.directories.insert(directory);
        }
        Ok(())
    }

    fn modified_time(&self, path: &FilePath) -> GroomsiteResult<SystemTime> {
        let state = self.state();
        if state.broken_metadata.contains(path) {
            return Err(not_found(path));
        }
        state
            .files
            .get(path)
            .map(|file| file.modified)
            .ok_or_else(|| not_found(path))
    }

    fn walk_directory(
        &self,
        path: &FilePath,
        globs: &[String],
    ) -> GroomsiteResult<Box<dyn Iterator<Item = GroomsiteResult<FilePath>> + '_>> {
        let glob_set = build_glob_set(globs)?;
        let state = self.state();
        let root = path.as_relative().normalize();
        let matching: Vec<FilePath> = state
            .files
            .keys()
            .filter(|file| file.starts_with(path))
            .filter(|file| {
                let normalized = file.as_relative().normalize();
                let relative = normalized
                    .strip_prefix(&root)
                    .unwrap_or_else(|_| normalized.as_relative_path());
                glob_set.is_match(relative.as_str())
            })
            .cloned()
            .collect();
        if !state.directory_exists(path) {
            return Err(not_found(path));
        }
        Ok(Box::new(matching.into_iter().map(Ok)))
    }

    fn start_http_server(
        &self,
        service: Box<dyn HttpService>,
        config: HttpServerConfig,
    ) -> GroomsiteResult<HttpServerHandle> {
        let mut state = self.state();
        let port = match config.port {
            Some(port) => port,
            None => {
                state.next_port = state.next_port.max(10000) + 1;
                state.next_port
            }
        };
        if state.occupied_ports.contains(&port) || state.http_servers.contains_key(&port) {
            return Err(Box::new(GroomsiteError::new(ErrorKind::Bind {
                address: config.address(),
                source: std::io::Error::new(
                    std::io::ErrorKind::AddrInUse,
                    "address already in use",
                ),
            })));
        }
        state.http_servers.insert(port, Arc::from(service));
        Ok(HttpServerHandle::new(port))
    }
}

/// Buffers writes and stores them in the MockPal when dropped.
struct MockFileWriter {
    path: FilePath,
    state: Arc<Mutex<MockState>>,
    buffer: Vec<u8>,
}

impl Write for MockFileWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Drop for MockFileWriter {
    fn drop(&mut self) {
        let content = std::mem::take(&mut self.buffer);
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .store(self.path.clone(), content);
    }
}
