/* 📖 # How the dev server maps URLs to files
The generated site uses clean URLs: `/austin` is stored as `austin/index.html`.
`StaticSiteService` resolves a request the same way the production host does:

- `/` serves `index.html`
- a trailing slash is removed with a permanent redirect, keeping the query string
- a last segment without a `.` serves `<path>/index.html` when that file exists
- anything else is looked up as a plain file below the root

Paths are percent-decoded before they are split, and any `..` segment is rejected,
so no request can reach outside the served directory.
*/

use percent_encoding::percent_decode_str;
use tracing::{debug, info, instrument, warn};

use groomsite_base::pal::http::{
    HttpMethod, HttpRequest, HttpResponse, HttpServerConfig, HttpServerHandle, HttpService,
};
use groomsite_base::{FilePath, GroomsiteResult, PalHandle};

use crate::config::SiteConfig;
use crate::render::render_not_found_page;
use crate::watcher::{ChangeWatcher, ChangeWatcherHandle};

const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "*"),
];

fn guess_content_type(path: &FilePath) -> &'static str {
    let extension = path.extension().map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") | Some("mjs") => "application/javascript",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("txt") => "text/plain; charset=utf-8",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}

/// Serves the generated site from a directory read through the PAL.
#[derive(Debug, Clone)]
pub struct StaticSiteService {
    pal: PalHandle,
    root: FilePath,
    site_name: String,
}

impl StaticSiteService {
    pub fn new(pal: PalHandle, root: FilePath, site_name: impl Into<String>) -> Self {
        Self {
            pal,
            root,
            site_name: site_name.into(),
        }
    }

    /// File to serve for a decoded request path, or None if the path is not acceptable.
    fn resolve(&self, decoded: &str) -> Option<FilePath> {
        let mut segments = Vec::new();
        for segment in decoded.split('/') {
            match segment {
                "" | "." => {}
                ".." => return None,
                _ => segments.push(segment),
            }
        }
        let Some(last) = segments.last() else {
            return Some(self.root.join("index.html"));
        };
        let candidate = self.root.join(segments.join("/"));
        if !last.contains('.') {
            let index = candidate.join("index.html");
            if self.pal.file_exists(&index).unwrap_or(false) {
                return Some(index);
            }
        }
        Some(candidate)
    }

    fn not_found(&self) -> HttpResponse {
        let body = self
            .pal
            .read_file_to_bytes(&self.root.join("404.html"))
            .unwrap_or_else(|_| render_not_found_page(&self.site_name).into_bytes());
        HttpResponse::not_found()
            .with_content_type("text/html; charset=utf-8")
            .with_body(body)
    }

    fn serve(&self, raw_path: &str, query: Option<&str>) -> HttpResponse {
        if raw_path != "/"
            && let Some(without_slash) = raw_path.strip_suffix('/')
        {
            let location = match query {
                Some(query) => format!("{}?{}", without_slash, query),
                None => without_slash.to_string(),
            };
            debug!(from = raw_path, to = %location, "redirecting trailing slash");
            return HttpResponse::moved_permanently(location);
        }

        let Ok(decoded) = percent_decode_str(raw_path).decode_utf8() else {
            debug!(path = raw_path, "path is not valid UTF-8");
            return HttpResponse::bad_request();
        };
        let Some(file) = self.resolve(&decoded) else {
            warn!(path = raw_path, "rejected path outside the site root");
            return HttpResponse::bad_request();
        };

        match self.pal.read_file_to_bytes(&file) {
            Ok(content) => {
                debug!(path = raw_path, file = %file, size = content.len(), "serving file");
                HttpResponse::ok()
                    .with_content_type(guess_content_type(&file))
                    .with_body(content)
            }
            Err(e) => {
                debug!(path = raw_path, file = %file, error = %e, "file not found");
                self.not_found()
            }
        }
    }
}

impl HttpService for StaticSiteService {
    fn handle_request(&self, request: HttpRequest) -> GroomsiteResult<HttpResponse> {
        let (raw_path, query) = request.path_and_query();
        let mut response = match request.method() {
            HttpMethod::Get => self.serve(raw_path, query),
            HttpMethod::Head => {
                let (status, headers, _) = self.serve(raw_path, query).into_parts();
                let mut response = HttpResponse::new(status);
                for (key, value) in headers.iter() {
                    response = response.with_header(key, value);
                }
                response
            }
            HttpMethod::Post if raw_path == "/reload" => {
                info!("reload requested");
                HttpResponse::text("OK")
            }
            method => {
                debug!(%method, path = raw_path, "method not allowed");
                HttpResponse::method_not_allowed()
            }
        };
        for (key, value) in CORS_HEADERS {
            response = response.with_header(key, value);
        }
        Ok(response)
    }
}

/// The running server and its change watcher.
#[derive(Debug)]
pub struct DevServer {
    server: HttpServerHandle,
    watcher: ChangeWatcherHandle,
}

impl DevServer {
    pub fn port(&self) -> u16 {
        self.server.port()
    }

    /// Stops the accept loop and the watcher, waiting for both threads.
    pub fn stop(self) {
        self.server.stop();
        self.watcher.stop();
        info!("dev server stopped");
    }
}

/// Bind the primary port, or the fallback port if the primary is taken.
fn bind_with_fallback(
    pal: &PalHandle,
    config: &SiteConfig,
    make_service: impl Fn() -> StaticSiteService,
) -> GroomsiteResult<HttpServerHandle> {
    let server = &config.server;
    let primary = HttpServerConfig::new(server.host.as_str()).with_port(server.primary_port);
    match pal.start_http_server(Box::new(make_service()), primary) {
        Ok(handle) => Ok(handle),
        Err(e) if e.is_address_in_use() => {
            warn!(
                port = server.primary_port,
                fallback = server.fallback_port,
                "primary port in use, trying fallback"
            );
            let fallback = HttpServerConfig::new(server.host.as_str()).with_port(server.fallback_port);
            pal.start_http_server(Box::new(make_service()), fallback)
        }
        Err(e) => Err(e),
    }
}

/// Serve `server.root` and watch it for changes until the returned handle is stopped.
#[instrument(skip_all, fields(root = %config.server.root))]
pub fn start_dev_server(pal: &PalHandle, config: &SiteConfig) -> GroomsiteResult<DevServer> {
    let root = FilePath::from(config.server.root.as_str());
    if !pal.file_exists(&root)? {
        warn!(root = %root, "site directory does not exist yet, run generate first");
    }

    let server = bind_with_fallback(pal, config, || {
        StaticSiteService::new(pal.clone(), root.clone(), config.site_name.as_str())
    })?;
    let port = server.port();
    info!(url = %format!("http://localhost:{}", port), "dev server running");
    for page in ["", "austin", "privacy", "terms"] {
        debug!(url = %format!("http://localhost:{}/{}", port, page), "available page");
    }

    let watcher = ChangeWatcher::new(pal.clone(), root, &config.watch).start()?;
    Ok(DevServer { server, watcher })
}

#[cfg(test)]
mod tests {
    use super::*;
    use groomsite_base::MockPal;
    use groomsite_base::pal::http::HttpStatusCode;

    fn setup() -> (MockPal, StaticSiteService) {
        let mock = MockPal::new();
        for (path, content) in [
            ("site/index.html", "<h1>home</h1>"),
            ("site/austin/index.html", "<h1>austin</h1>"),
            ("site/style.css", "body {}"),
            ("site/sitemap.xml", "<urlset/>"),
            ("site/_redirects", "/austin.html /austin 301"),
            ("site/my page.html", "<p>spaced</p>"),
        ] {
            mock.add_file(FilePath::from(path), content.as_bytes().to_vec());
        }
        let service = StaticSiteService::new(
            PalHandle::new(mock.clone()),
            FilePath::from("site"),
            "Local Pet Grooming",
        );
        (mock, service)
    }

    fn get(service: &StaticSiteService, path: &str) -> HttpResponse {
        service.handle_request(HttpRequest::get(path)).unwrap()
    }

    #[test]
    fn test_root_serves_index() {
        let (_mock, service) = setup();
        let response = get(&service, "/");
        assert_eq!(response.status(), HttpStatusCode::Ok);
        assert_eq!(response.body_as_string(), "<h1>home</h1>");
        assert_eq!(
            response.headers().get("content-type"),
            Some("text/html; charset=utf-8")
        );
    }

    #[test]
    fn test_clean_url_serves_directory_index() {
        let (_mock, service) = setup();
        assert_eq!(get(&service, "/austin").body_as_string(), "<h1>austin</h1>");
        assert_eq!(
            get(&service, "/austin?ref=home").body_as_string(),
            "<h1>austin</h1>"
        );
    }

    #[test]
    fn test_trailing_slash_redirects() {
        let (_mock, service) = setup();
        let response = get(&service, "/austin/");
        assert_eq!(response.status(), HttpStatusCode::MovedPermanently);
        assert_eq!(response.headers().get("location"), Some("/austin"));

        let response = get(&service, "/austin/?ref=home");
        assert_eq!(response.headers().get("location"), Some("/austin?ref=home"));
    }

    #[test]
    fn test_plain_files_and_content_types() {
        let (_mock, service) = setup();
        let css = get(&service, "/style.css");
        assert_eq!(css.body_as_string(), "body {}");
        assert_eq!(css.headers().get("content-type"), Some("text/css; charset=utf-8"));

        let sitemap = get(&service, "/sitemap.xml");
        assert_eq!(sitemap.headers().get("content-type"), Some("application/xml"));

        let redirects = get(&service, "/_redirects");
        assert_eq!(redirects.status(), HttpStatusCode::Ok);
        assert_eq!(redirects.body_as_string(), "/austin.html /austin 301");
    }

    #[test]
    fn test_percent_encoded_path() {
        let (_mock, service) = setup();
        assert_eq!(get(&service, "/my%20page.html").body_as_string(), "<p>spaced</p>");
    }

    #[test]
    fn test_parent_segments_are_rejected() {
        let (mock, service) = setup();
        mock.add_file(FilePath::from("secret.txt"), b"secret".to_vec());
        for path in ["/../secret.txt", "/%2e%2e/secret.txt", "/austin/../../secret.txt"] {
            assert_eq!(get(&service, path).status(), HttpStatusCode::BadRequest, "{path}");
        }
    }

    #[test]
    fn test_missing_file_uses_site_404_page() {
        let (mock, service) = setup();
        let response = get(&service, "/nowhere");
        assert_eq!(response.status(), HttpStatusCode::NotFound);
        assert!(response.body_as_string().contains("Page Not Found | Local Pet Grooming"));

        mock.add_file(FilePath::from("site/404.html"), b"custom 404".to_vec());
        let response = get(&service, "/nowhere.html");
        assert_eq!(response.status(), HttpStatusCode::NotFound);
        assert_eq!(response.body_as_string(), "custom 404");
    }

    #[test]
    fn test_cors_headers_on_every_response() {
        let (_mock, service) = setup();
        for path in ["/", "/austin/", "/nowhere"] {
            let response = get(&service, path);
            assert_eq!(
                response.headers().get("access-control-allow-origin"),
                Some("*"),
                "{path}"
            );
            assert_eq!(
                response.headers().get("access-control-allow-methods"),
                Some("GET, POST, OPTIONS")
            );
            assert_eq!(response.headers().get("access-control-allow-headers"), Some("*"));
        }
    }

    #[test]
    fn test_methods() {
        let (_mock, service) = setup();
        let reload = service
            .handle_request(HttpRequest::new(HttpMethod::Post, "/reload"))
            .unwrap();
        assert_eq!(reload.status(), HttpStatusCode::Ok);
        assert_eq!(reload.body_as_string(), "OK");

        let head = service
            .handle_request(HttpRequest::new(HttpMethod::Head, "/austin"))
            .unwrap();
        assert_eq!(head.status(), HttpStatusCode::Ok);
        assert!(head.body().is_empty());
        assert_eq!(head.headers().get("content-type"), Some("text/html; charset=utf-8"));

        for method in [HttpMethod::Put, HttpMethod::Delete] {
            let response = service.handle_request(HttpRequest::new(method, "/")).unwrap();
            assert_eq!(response.status(), HttpStatusCode::MethodNotAllowed);
        }
        let response = service
            .handle_request(HttpRequest::new(HttpMethod::Post, "/austin"))
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::MethodNotAllowed);
    }

    fn dev_config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.server.root = "site".to_string();
        config
    }

    #[test]
    fn test_dev_server_binds_primary_port() {
        let (mock, _service) = setup();
        let server = start_dev_server(&PalHandle::new(mock.clone()), &dev_config()).unwrap();

        assert_eq!(server.port(), 8080);
        let response = mock.simulate_request(8080, HttpRequest::get("/austin")).unwrap();
        assert_eq!(response.body_as_string(), "<h1>austin</h1>");
        server.stop();
    }

    #[test]
    fn test_dev_server_falls_back_when_primary_in_use() {
        let (mock, _service) = setup();
        mock.occupy_port(8080);

        let server = start_dev_server(&PalHandle::new(mock.clone()), &dev_config()).unwrap();

        assert_eq!(server.port(), 8081);
        assert_eq!(mock.http_server_count(), 1);
        let response = mock.simulate_request(8081, HttpRequest::get("/")).unwrap();
        assert_eq!(response.body_as_string(), "<h1>home</h1>");
        server.stop();
    }

    #[test]
    fn test_dev_server_fails_when_both_ports_in_use() {
        let (mock, _service) = setup();
        mock.occupy_port(8080);
        mock.occupy_port(8081);

        let error = start_dev_server(&PalHandle::new(mock), &dev_config()).unwrap_err();
        assert!(error.is_address_in_use());
    }
}
