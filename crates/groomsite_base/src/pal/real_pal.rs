use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, SystemTime};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use crate::{GroomsiteError, GroomsiteResult, error::ErrorKind};

use super::FilePath;
use super::http::{
    HttpMethod, HttpRequest, HttpResponse, HttpServerConfig, HttpServerHandle, HttpService,
    HttpStatusCode,
};
use super::traits::{Pal, ReadSeek};

/// How long the accept loop blocks before re-checking the shutdown flag.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// PAL implementation backed by the real filesystem and real sockets.
///
/// All file paths are resolved relative to the configured base directory.
#[derive(Debug)]
pub struct RealPal {
    base_dir: PathBuf,
}

impl RealPal {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    fn resolve_path(&self, path: &FilePath) -> PathBuf {
        self.base_dir.join(path.as_path())
    }

    fn file_error(path: PathBuf, source: std::io::Error) -> Box<GroomsiteError> {
        Box::new(GroomsiteError::new(ErrorKind::FileError { path, source }))
    }
}

pub(crate) fn build_glob_set(globs: &[String]) -> GroomsiteResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for (idx, glob) in globs.iter().enumerate() {
        let compiled = GlobBuilder::new(glob).build().map_err(|e| {
            debug!(index = idx, pattern = %glob, error = %e, "failed to compile glob pattern");
            crate::err!("Invalid glob pattern '{}': {}", glob, e)
        })?;
        builder.add(compiled);
    }
    builder
        .build()
        .map_err(|e| crate::err!("Failed to build glob set: {}", e))
}

impl Pal for RealPal {
    #[instrument(skip(self), fields(path = %path))]
    fn file_exists(&self, path: &FilePath) -> GroomsiteResult<bool> {
        let resolved = self.resolve_path(path);
        let exists = resolved.exists();
        debug!(exists, resolved = %resolved.display(), "checked file existence");
        Ok(exists)
    }

    #[instrument(skip(self), fields(path = %path))]
    fn read_file(&self, path: &FilePath) -> GroomsiteResult<Box<dyn ReadSeek + 'static>> {
        let resolved = self.resolve_path(path);
        let file = fs::File::open(&resolved).map_err(|e| {
            debug!(error = %e, "failed to open file");
            Self::file_error(resolved, e)
        })?;
        Ok(Box::new(file))
    }

    #[instrument(skip(self), fields(path = %path))]
    fn create_file(&self, path: &FilePath) -> GroomsiteResult<Box<dyn Write>> {
        let resolved = self.resolve_path(path);
        debug!(resolved = %resolved.display(), "creating file");
        let file = fs::File::create(&resolved).map_err(|e| {
            debug!(error = %e, "failed to create file");
            Self::file_error(resolved, e)
        })?;
        Ok(Box::new(file))
    }

    #[instrument(skip(self), fields(path = %path))]
    fn create_directory_all(&self, path: &FilePath) -> GroomsiteResult<()> {
        let resolved = self.resolve_path(path);
        fs::create_dir_all(&resolved).map_err(|e| {
            debug!(error = %e, "failed to create directory");
            Self::file_error(resolved, e)
        })
    }

    fn modified_time(&self, path: &FilePath) -> GroomsiteResult<SystemTime> {
        let resolved = self.resolve_path(path);
        fs::metadata(&resolved)
            .and_then(|metadata| metadata.modified())
            .map_err(|e| Self::file_error(resolved, e))
    }

    #[instrument(skip(self), fields(path = %path, globs = ?globs))]
    fn walk_directory(
        &self,
        path: &FilePath,
        globs: &[String],
    ) -> GroomsiteResult<Box<dyn Iterator<Item = GroomsiteResult<FilePath>> + '_>> {
        let resolved = self.resolve_path(path);
        if !resolved.exists() {
            debug!("directory not found");
            return Err(Self::file_error(
                resolved,
                std::io::Error::new(std::io::ErrorKind::NotFound, "directory not found"),
            ));
        }

        let glob_set = build_glob_set(globs)?;
        let base_path = path.clone();
        let iter = WalkDir::new(&resolved)
            .into_iter()
            .filter_map(move |entry| match entry {
                Ok(e) => {
                    if !e.file_type().is_file() {
                        return None;
                    }
                    let relative = e.path().strip_prefix(&resolved).ok()?;
                    if glob_set.is_match(relative) {
                        Some(Ok(base_path.join(FilePath::from(relative).as_str())))
                    } else {
                        None
                    }
                }
                Err(e) => {
                    debug!(error = %e, "error walking directory");
                    let path = e
                        .path()
                        .map(|p| p.to_path_buf())
                        .unwrap_or_else(|| PathBuf::from("unknown"));
                    Some(Err(Self::file_error(path, std::io::Error::other(e.to_string()))))
                }
            });
        Ok(Box::new(iter))
    }

    #[instrument(skip(self, service), fields(address = %config.address()))]
    fn start_http_server(
        &self,
        service: Box<dyn HttpService>,
        config: HttpServerConfig,
    ) -> GroomsiteResult<HttpServerHandle> {
        let address = config.address();
        let server = tiny_http::Server::http(&address).map_err(|e| bind_error(&address, e))?;
        let port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .or(config.port)
            .unwrap_or_default();
        debug!(port, "http server bound");

        let service: Arc<dyn HttpService> = Arc::from(service);
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);
        let thread = thread::Builder::new()
            .name(format!("{}-accept", config.server_name))
            .spawn(move || accept_loop(server, service, flag))
            .map_err(|e| crate::err!("Failed to spawn accept loop: {}", e))?;

        Ok(HttpServerHandle::with_thread(port, shutdown, thread))
    }
}

/* 📖 # How bind failures are reported
tiny_http returns a boxed std error. When it is an io::Error it is kept as the source of an
ErrorKind::Bind, so callers can ask `is_address_in_use()` and fall back to another port.
*/
fn bind_error(
    address: &str,
    error: Box<dyn std::error::Error + Send + Sync + 'static>,
) -> Box<GroomsiteError> {
    match error.downcast::<std::io::Error>() {
        Ok(io_error) => Box::new(GroomsiteError::new(ErrorKind::Bind {
            address: address.to_string(),
            source: *io_error,
        })),
        Err(other) => crate::err!("Failed to bind {}: {}", address, other),
    }
}

fn accept_loop(server: tiny_http::Server, service: Arc<dyn HttpService>, shutdown: Arc<AtomicBool>) {
    while !shutdown.load(Ordering::SeqCst) {
        match server.recv_timeout(ACCEPT_POLL_INTERVAL) {
            Ok(Some(request)) => {
                let service = Arc::clone(&service);
                let spawned = thread::Builder::new()
                    .name("http-request".to_string())
                    .spawn(move || handle_connection(service.as_ref(), request));
                if let Err(e) = spawned {
                    warn!(error = %e, "failed to spawn request thread");
                }
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "failed to receive request"),
        }
    }
    debug!("accept loop stopped");
}

fn handle_connection(service: &dyn HttpService, mut request: tiny_http::Request) {
    let response = match to_http_request(&mut request) {
        Some(http_request) => match service.handle_request(http_request) {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, url = request.url(), "service failed");
                HttpResponse::text(e.to_string())
                    .with_status(HttpStatusCode::NetworkConnectTimeoutError)
            }
        },
        None => HttpResponse::method_not_allowed(),
    };
    if let Err(e) = request.respond(to_tiny_response(response)) {
        debug!(error = %e, "failed to send response");
    }
}

fn to_http_request(request: &mut tiny_http::Request) -> Option<HttpRequest> {
    let method = HttpMethod::parse(request.method().as_str())?;
    let mut http_request = HttpRequest::new(method, request.url());
    for header in request.headers() {
        http_request =
            http_request.with_header(header.field.as_str().as_str(), header.value.as_str());
    }
    let mut body = Vec::new();
    if let Err(e) = request.as_reader().read_to_end(&mut body) {
        debug!(error = %e, "failed to read request body");
    }
    Some(http_request.with_body(body))
}

fn to_tiny_response(response: HttpResponse) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let (status, headers, body) = response.into_parts();
    let mut tiny_response =
        tiny_http::Response::from_data(body).with_status_code(status.as_u16());
    for (key, value) in headers.iter() {
        match tiny_http::Header::from_bytes(key.as_bytes(), value.as_bytes()) {
            Ok(header) => tiny_response.add_header(header),
            Err(()) => debug!(key, "skipping invalid header"),
        }
    }
    tiny_response
}
