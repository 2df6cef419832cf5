use serde::Deserialize;
use tracing::{debug, info, instrument};

use groomsite_base::{FilePath, GroomsiteError, GroomsiteResult, PalHandle, ResultExt};

/// Environment variable that overrides `places.api_key`.
pub const PLACES_API_KEY_ENV: &str = "GROOMSITE_PLACES_API_KEY";

/// Configuration loaded from `groomsite.toml`. Every key is optional.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub site_name: String,
    /// Absolute URL prefix for canonical links, sitemap and robots.txt. No trailing slash.
    pub base_url: String,
    pub cities_file: String,
    pub business_data_file: String,
    pub output_dir: String,
    /// Seed for every random choice. Absent means fresh entropy per run.
    pub seed: Option<u64>,
    pub places: PlacesConfig,
    pub server: ServerConfig,
    pub watch: WatchConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_name: "Local Pet Grooming".to_string(),
            base_url: "https://local-pet-grooming.com".to_string(),
            cities_file: "cities.csv".to_string(),
            business_data_file: "scraped_businesses.json".to_string(),
            output_dir: "clean_site".to_string(),
            seed: None,
            places: PlacesConfig::default(),
            server: ServerConfig::default(),
            watch: WatchConfig::default(),
        }
    }
}

impl SiteConfig {
    /// `base_url` without any trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn output_path(&self) -> FilePath {
        FilePath::from(self.output_dir.as_str())
    }

    pub fn cities_path(&self) -> FilePath {
        FilePath::from(self.cities_file.as_str())
    }

    pub fn business_data_path(&self) -> FilePath {
        FilePath::from(self.business_data_file.as_str())
    }

    /// Replace the API key when an override is present and non-empty.
    pub fn with_api_key_override(mut self, api_key: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|key| !key.trim().is_empty()) {
            self.places.api_key = Some(key);
        }
        self
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PlacesConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub search_terms: Vec<String>,
    pub request_delay_ms: u64,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://maps.googleapis.com/maps/api/place".to_string(),
            search_terms: [
                "mobile pet grooming",
                "mobile dog grooming",
                "mobile cat grooming",
                "traveling pet groomer",
                "at home pet grooming",
                "mobile dog washing",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            request_delay_ms: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub primary_port: u16,
    pub fallback_port: u16,
    /// Directory served and watched by `serve`.
    pub root: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            primary_port: 8080,
            fallback_port: 8081,
            root: "clean_site".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct WatchConfig {
    pub interval_ms: u64,
    /// Extensions without the leading dot.
    pub extensions: Vec<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            extensions: vec!["html".to_string(), "css".to_string(), "js".to_string()],
        }
    }
}

/// Parse a configuration document.
pub fn parse_config(contents: &str) -> GroomsiteResult<SiteConfig> {
    toml::from_str(contents).map_err(|e| Box::new(GroomsiteError::message(e.to_string())))
}

/// Load the configuration at `path`, falling back to defaults when the file does not exist.
///
/// The API key environment override is applied on top of whatever was loaded.
#[instrument(skip(pal), fields(path = %path))]
pub fn load_config(pal: &PalHandle, path: &FilePath) -> GroomsiteResult<SiteConfig> {
    let config = if pal.file_exists(path)? {
        let contents = pal.read_file_to_string(path)?;
        parse_config(&contents).with_context(|| format!("Failed to parse {}", path))?
    } else {
        info!("no config file found, using defaults");
        SiteConfig::default()
    };
    debug!(?config.output_dir, ?config.seed, "configuration loaded");
    Ok(config.with_api_key_override(std::env::var(PLACES_API_KEY_ENV).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use groomsite_base::MockPal;

    #[test]
    fn test_defaults() {
        let config = SiteConfig::default();
        assert_eq!(config.base_url(), "https://local-pet-grooming.com");
        assert_eq!(config.business_data_file, "scraped_businesses.json");
        assert_eq!(config.output_dir, "clean_site");
        assert_eq!(config.server.primary_port, 8080);
        assert_eq!(config.server.fallback_port, 8081);
        assert_eq!(config.watch.interval_ms, 1000);
        assert_eq!(config.watch.extensions, ["html", "css", "js"]);
        assert_eq!(config.places.search_terms.len(), 6);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = parse_config(
            r#"
            base_url = "https://groomers.example/"
            seed = 7

            [server]
            primary_port = 9000

            [watch]
            extensions = ["html"]
            "#,
        )
        .unwrap();

        assert_eq!(config.base_url(), "https://groomers.example");
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.server.primary_port, 9000);
        assert_eq!(config.server.fallback_port, 8081);
        assert_eq!(config.watch.extensions, ["html"]);
        assert_eq!(config.watch.interval_ms, 1000);
        assert_eq!(config.site_name, "Local Pet Grooming");
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        assert!(parse_config("output_directory = \"site\"").is_err());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let pal = PalHandle::new(MockPal::new());
        let config = load_config(&pal, &FilePath::from("groomsite.toml")).unwrap();
        assert_eq!(config.output_dir, SiteConfig::default().output_dir);
    }

    #[test]
    fn test_load_malformed_file_is_an_error() {
        let mock = MockPal::new();
        mock.add_file(FilePath::from("groomsite.toml"), b"seed = [".to_vec());
        let pal = PalHandle::new(mock);

        let error = load_config(&pal, &FilePath::from("groomsite.toml")).unwrap_err();
        assert!(error.to_string().starts_with("Failed to parse groomsite.toml"));
    }

    #[test]
    fn test_api_key_override() {
        let config = SiteConfig::default().with_api_key_override(Some("from-env".to_string()));
        assert_eq!(config.places.api_key.as_deref(), Some("from-env"));

        let config = parse_config("[places]\napi_key = \"from-file\"")
            .unwrap()
            .with_api_key_override(Some("  ".to_string()));
        assert_eq!(config.places.api_key.as_deref(), Some("from-file"));
    }
}
